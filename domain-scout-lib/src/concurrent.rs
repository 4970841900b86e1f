//! Windowed batch processing.
//!
//! Domains are split into consecutive windows of `concurrency` entries. All
//! lookups of a window run together and are collected before the next window
//! starts; the configured pause sits between windows, never after the last.

use crate::backends::CheckerBackend;
use crate::types::{BatchConfig, CheckResult};
use futures_util::future::join_all;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Runs a list of domains through a backend, one window at a time.
#[derive(Debug, Clone, Copy)]
pub struct ConcurrentProcessor {
    config: BatchConfig,
}

impl ConcurrentProcessor {
    pub fn new(config: BatchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> BatchConfig {
        self.config
    }

    /// Number of windows needed for `len` domains.
    pub fn window_count(&self, len: usize) -> usize {
        len.div_ceil(self.config.concurrency.max(1))
    }

    /// Check every domain and return results in input order.
    ///
    /// `on_window` is called once per window with its index and results.
    /// With a `deadline`, lookups still running at expiry and windows not yet
    /// started are reported unavailable without being checked.
    pub async fn run<F>(
        &self,
        backend: &CheckerBackend,
        domains: &[String],
        deadline: Option<Instant>,
        mut on_window: F,
    ) -> Vec<CheckResult>
    where
        F: FnMut(usize, &[CheckResult]),
    {
        let mut results = Vec::with_capacity(domains.len());
        let width = self.config.concurrency.max(1);
        let windows: Vec<&[String]> = domains.chunks(width).collect();
        let last = windows.len().saturating_sub(1);

        for (index, window) in windows.iter().enumerate() {
            let expired = deadline.is_some_and(|d| Instant::now() >= d);

            let window_results: Vec<CheckResult> = if expired {
                warn!(window = index, skipped = window.len(), "deadline passed, window not checked");
                window.iter().map(CheckResult::unavailable).collect()
            } else {
                debug!(window = index, size = window.len(), "starting window");
                join_all(window.iter().map(|domain| check_one(backend, domain, deadline))).await
            };

            on_window(index, &window_results);
            results.extend(window_results);

            if index < last && !expired {
                self.pause(deadline).await;
            }
        }

        results
    }

    async fn pause(&self, deadline: Option<Instant>) {
        let wake = Instant::now() + self.config.inter_batch_delay;
        match deadline {
            Some(d) if d < wake => tokio::time::sleep_until(d).await,
            _ => tokio::time::sleep_until(wake).await,
        }
    }
}

async fn check_one(backend: &CheckerBackend, domain: &str, deadline: Option<Instant>) -> CheckResult {
    match deadline {
        None => backend.check(domain).await,
        Some(d) => match tokio::time::timeout_at(d, backend.check(domain)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(domain, "deadline passed during lookup, reporting as unavailable");
                CheckResult::unavailable(domain)
            }
        },
    }
}
