/// Fraction of confident tier-2 results that still get a vision check.
pub const DEFAULT_SAMPLE_RATE: f64 = 0.1;

/// Decide whether a job's side verdict goes to the vision model.
///
/// Trusted sources (tier 1) never do; untrusted sources (tier 3) always
/// do. Tier 2 checks whenever the heuristic landed in the ambiguous
/// confidence band, and otherwise samples a small fraction for drift
/// monitoring.
pub fn should_run_vision_check(
    trust_tier: i16,
    confidence: f64,
    lower_bound: f64,
    upper_bound: f64,
    sample_rate: f64,
) -> bool {
    match trust_tier {
        1 => false,
        2 => {
            if confidence >= lower_bound && confidence < upper_bound {
                true
            } else {
                rand::random::<f64>() < sample_rate
            }
        }
        _ => true,
    }
}
