//! Deterministic offline double.
//!
//! Answers from a string hash instead of the network, so the same domain
//! always gets the same verdict. Roughly 62% of inputs come back available.

use crate::types::CheckResult;
use rand::Rng;
use std::time::Duration;

/// Verdicts with `hash % 100` below this are available.
const AVAILABLE_BELOW: u32 = 62;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OfflineChecker {
    min_delay: Duration,
    jitter: Duration,
}

impl OfflineChecker {
    /// Double with the usual 50-150 ms simulated latency.
    pub fn new() -> Self {
        Self::with_latency(Duration::from_millis(50), Duration::from_millis(100))
    }

    /// Simulated latency of `min_delay` plus up to `jitter`.
    pub fn with_latency(min_delay: Duration, jitter: Duration) -> Self {
        Self { min_delay, jitter }
    }

    /// 32-bit string hash: `h = h * 31 + unit` over UTF-16 code units with
    /// wrap-around, then the absolute value.
    pub fn stable_hash(domain: &str) -> u32 {
        let h = domain
            .encode_utf16()
            .fold(0i32, |h, unit| h.wrapping_mul(31).wrapping_add(i32::from(unit)));
        h.unsigned_abs()
    }

    /// The verdict for `domain`, without the simulated latency.
    pub fn is_available(domain: &str) -> bool {
        Self::stable_hash(domain) % 100 < AVAILABLE_BELOW
    }

    pub async fn check(&self, domain: &str) -> CheckResult {
        tokio::time::sleep(self.sample_delay()).await;
        CheckResult::new(domain, Self::is_available(domain))
    }

    fn sample_delay(&self) -> Duration {
        let jitter_ms = self.jitter.as_millis() as u64;
        if jitter_ms == 0 {
            return self.min_delay;
        }
        let extra = rand::thread_rng().gen_range(0..=jitter_ms);
        self.min_delay + Duration::from_millis(extra)
    }
}

impl Default for OfflineChecker {
    fn default() -> Self {
        Self::new()
    }
}
