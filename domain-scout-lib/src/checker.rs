//! Main domain checker implementation.
//!
//! `DomainChecker` ties a backend to its batch parameters and runs lists of
//! domains through the windowed processor.

use crate::backends::CheckerBackend;
use crate::concurrent::ConcurrentProcessor;
use crate::types::{BackendKind, BatchConfig, CheckConfig, CheckResult};
use std::time::Duration;
use tokio::time::Instant;
use tracing::info;

/// Batch availability and price checker.
///
/// The backend and batch parameters are fixed at construction. Every
/// operation returns one result per input, in input order, and never fails.
///
/// # Example
///
/// ```rust,no_run
/// use domain_scout_lib::{CheckConfig, DomainChecker};
///
/// #[tokio::main]
/// async fn main() {
///     let checker = DomainChecker::with_config(CheckConfig::default().with_offline(true));
///     let domains = vec!["brandly.io".to_string(), "nova.ai".to_string()];
///
///     for result in checker.check_domains(&domains).await {
///         println!("{} {} {:.2} {}", result.domain, result.available, result.price, result.currency);
///     }
/// }
/// ```
#[derive(Debug, Clone)]
pub struct DomainChecker {
    backend: CheckerBackend,
    processor: ConcurrentProcessor,
}

impl DomainChecker {
    /// Checker with default configuration (live WHOIS).
    pub fn new() -> Self {
        Self::with_config(CheckConfig::default())
    }

    /// Resolve `config` into a backend and batch parameters.
    pub fn with_config(config: CheckConfig) -> Self {
        let batch = config.batch_config();
        Self::with_backend(CheckerBackend::from_config(&config), batch)
    }

    /// Checker over an already constructed backend.
    pub fn with_backend(backend: CheckerBackend, batch: BatchConfig) -> Self {
        Self {
            backend,
            processor: ConcurrentProcessor::new(batch),
        }
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    pub fn batch_config(&self) -> BatchConfig {
        self.processor.config()
    }

    /// Check one domain.
    pub async fn check_domain(&self, domain: &str) -> CheckResult {
        self.backend.check(domain).await
    }

    /// Check a list of domains window by window.
    ///
    /// The output has the same length and order as `domains`. An empty list
    /// returns immediately.
    pub async fn check_domains(&self, domains: &[String]) -> Vec<CheckResult> {
        self.run(domains, None, |_, _| {}).await
    }

    /// Like [`check_domains`](Self::check_domains), calling `on_window` with
    /// the index and results of each window as soon as it completes.
    pub async fn check_domains_with_progress<F>(&self, domains: &[String], on_window: F) -> Vec<CheckResult>
    where
        F: FnMut(usize, &[CheckResult]),
    {
        self.run(domains, None, on_window).await
    }

    /// Like [`check_domains`](Self::check_domains), bounded by `budget`.
    ///
    /// Lookups still running when the budget runs out, and windows that
    /// never got to start, are reported unavailable.
    pub async fn check_domains_with_deadline(&self, domains: &[String], budget: Duration) -> Vec<CheckResult> {
        let deadline = Instant::now() + budget;
        self.run(domains, Some(deadline), |_, _| {}).await
    }

    async fn run<F>(&self, domains: &[String], deadline: Option<Instant>, on_window: F) -> Vec<CheckResult>
    where
        F: FnMut(usize, &[CheckResult]),
    {
        let batch = self.processor.config();
        info!(
            backend = %self.backend.kind(),
            domains = domains.len(),
            concurrency = batch.concurrency,
            windows = self.processor.window_count(domains.len()),
            "checking batch"
        );
        self.processor.run(&self.backend, domains, deadline, on_window).await
    }
}

impl Default for DomainChecker {
    fn default() -> Self {
        Self::new()
    }
}
