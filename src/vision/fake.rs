use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::imaging::{CardSide, DetectionMethod, SideDetection};
use crate::vision::checker::{VisionChecker, VisionRequest};
use crate::vision::error::VisionError;

/// A fake in-memory implementation of the VisionChecker trait for testing
#[derive(Clone)]
pub struct FakeVisionChecker {
    verdict: Arc<RwLock<SideDetection>>,
    fail: Arc<RwLock<bool>>,
    calls: Arc<AtomicUsize>,
}

impl FakeVisionChecker {
    pub fn new() -> Self {
        FakeVisionChecker {
            verdict: Arc::new(RwLock::new(SideDetection {
                side: CardSide::Unknown,
                confidence: 0.5,
                method: DetectionMethod::Vision,
            })),
            fail: Arc::new(RwLock::new(false)),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Set the verdict every check returns.
    pub fn fake_set_verdict(&self, side: CardSide, confidence: f64) {
        *self.verdict.write().unwrap() = SideDetection {
            side,
            confidence,
            method: DetectionMethod::Vision,
        };
    }

    /// Make every check fail.
    pub fn fake_fail(&self) {
        *self.fail.write().unwrap() = true;
    }

    pub fn fake_call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for FakeVisionChecker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VisionChecker for FakeVisionChecker {
    async fn check(
        &self,
        _bytes: &[u8],
        _content_type: &str,
        _request: &VisionRequest,
    ) -> Result<SideDetection, VisionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if *self.fail.read().unwrap() {
            return Err(VisionError::Network("injected vision failure".to_string()));
        }
        Ok(*self.verdict.read().unwrap())
    }
}
