use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, trace};

/// A single token bucket: capacity `max_tokens`, refilling at `refill_rate`
/// whole tokens per second.
#[derive(Debug)]
struct TokenBucket {
    tokens: u32,
    last_refill: Instant,
    max_tokens: u32,
    refill_rate: u32,
}

impl TokenBucket {
    fn new(max_rps: u32) -> Self {
        TokenBucket {
            tokens: max_rps,
            last_refill: Instant::now(),
            max_tokens: max_rps,
            refill_rate: max_rps,
        }
    }

    /// Credit `floor(elapsed_secs * rate)` tokens, capped at capacity.
    ///
    /// `last_refill` only advances when at least one whole token accrues,
    /// otherwise sub-second progress would be discarded on every call and a
    /// frequently-polled bucket would never refill.
    fn refill(&mut self, now: Instant) {
        let elapsed = now.duration_since(self.last_refill).as_secs_f64();
        let accrued = (elapsed * f64::from(self.refill_rate)).floor() as u32;
        if accrued > 0 {
            self.tokens = (self.tokens + accrued).min(self.max_tokens);
            self.last_refill = now;
        }
    }
}

/// Per-source rate limiter shared by every job in the process.
///
/// Buckets are created lazily when a job resolves its source and are swept
/// once they have been idle for the configured period. All bucket mutation
/// happens under one mutex so concurrent jobs cannot over-debit.
#[derive(Clone)]
pub struct RateLimiter {
    buckets: Arc<Mutex<HashMap<String, TokenBucket>>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        RateLimiter {
            buckets: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Install a bucket for a source, starting full. Re-initialization
    /// replaces any existing bucket for the same source.
    pub async fn init_bucket(&self, source_id: &str, max_rps: u32) {
        let mut buckets = self.buckets.lock().await;
        buckets.insert(source_id.to_string(), TokenBucket::new(max_rps.max(1)));
    }

    /// Install a bucket only if the source has none yet. Jobs call this on
    /// every pass; a live bucket must keep its debt rather than snap back
    /// to full.
    pub async fn ensure_bucket(&self, source_id: &str, max_rps: u32) {
        let mut buckets = self.buckets.lock().await;
        buckets
            .entry(source_id.to_string())
            .or_insert_with(|| TokenBucket::new(max_rps.max(1)));
    }

    /// Take one token from the source's bucket if available.
    ///
    /// Unknown sources are not limited and always acquire.
    pub async fn try_acquire(&self, source_id: &str) -> bool {
        let mut buckets = self.buckets.lock().await;
        let Some(bucket) = buckets.get_mut(source_id) else {
            return true;
        };

        bucket.refill(Instant::now());
        if bucket.tokens > 0 {
            bucket.tokens -= 1;
            true
        } else {
            trace!("rate limit hit for source {}", source_id);
            false
        }
    }

    /// Milliseconds until the next token accrues: `ceil(1000 / rate)` when
    /// the bucket is empty, zero otherwise or for unknown sources.
    pub async fn wait_time_ms(&self, source_id: &str) -> u64 {
        let buckets = self.buckets.lock().await;
        match buckets.get(source_id) {
            Some(bucket) if bucket.tokens == 0 => {
                (1000 + u64::from(bucket.refill_rate) - 1) / u64::from(bucket.refill_rate)
            }
            _ => 0,
        }
    }

    /// Drop buckets that have not refilled within `max_idle`.
    pub async fn sweep_idle(&self, max_idle: Duration) {
        let mut buckets = self.buckets.lock().await;
        let before = buckets.len();
        let now = Instant::now();
        buckets.retain(|_, bucket| now.duration_since(bucket.last_refill) < max_idle);
        let removed = before - buckets.len();
        if removed > 0 {
            debug!("swept {} idle rate-limit buckets", removed);
        }
    }

    /// Spawn the periodic sweeper; runs for the life of the process.
    pub fn spawn_sweeper(&self, interval: Duration) -> tokio::task::JoinHandle<()> {
        let limiter = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick of `interval` fires immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                limiter.sweep_idle(interval).await;
            }
        })
    }

    #[cfg(test)]
    pub async fn bucket_count(&self) -> usize {
        self.buckets.lock().await.len()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}
