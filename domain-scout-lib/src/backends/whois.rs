//! Live WHOIS-backed checker.

use crate::classify::{classify, text_confirms_absence};
use crate::error::DomainCheckError;
use crate::protocols::{RegistryLookup, WhoisClient};
use crate::types::{CheckResult, RegistryRecord};
use crate::utils::validate_domain;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Default budget for one complete lookup, referral included.
pub const DEFAULT_WHOIS_TIMEOUT: Duration = Duration::from_secs(5);

/// Checks one domain against its registry's WHOIS server.
///
/// Any failure (timeout, refused connection, garbled or rate-limited
/// response, unknown TLD) produces `available: false`. A domain that cannot
/// be verified is never reported as purchasable.
#[derive(Clone)]
pub struct WhoisChecker {
    lookup: Arc<dyn RegistryLookup>,
    timeout: Duration,
}

impl WhoisChecker {
    /// Checker over the public WHOIS servers with the default timeout.
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_WHOIS_TIMEOUT)
    }

    /// Checker over the public WHOIS servers with a custom timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_lookup(Arc::new(WhoisClient::new()), timeout)
    }

    /// Checker over any registry lookup implementation.
    pub fn with_lookup(lookup: Arc<dyn RegistryLookup>, timeout: Duration) -> Self {
        Self { lookup, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Check one domain. Never fails.
    pub async fn check(&self, domain: &str) -> CheckResult {
        match self.lookup_record(domain).await {
            Ok(record) => {
                let available = classify(record.as_ref());
                let confirmed = record.as_ref().is_some_and(text_confirms_absence);
                debug!(domain, available, has_record = record.is_some(), confirmed, "WHOIS verdict");
                CheckResult::new(domain, available)
            }
            Err(e) => {
                if e.is_transport() {
                    warn!(domain, error = %e, "WHOIS lookup failed, reporting as unavailable");
                } else {
                    debug!(domain, error = %e, "domain rejected, reporting as unavailable");
                }
                CheckResult::unavailable(domain)
            }
        }
    }

    async fn lookup_record(&self, domain: &str) -> Result<Option<RegistryRecord>, DomainCheckError> {
        let normalized = validate_domain(domain)?;

        match tokio::time::timeout(self.timeout, self.lookup.lookup(&normalized)).await {
            Ok(result) => result,
            Err(_) => Err(DomainCheckError::timeout("WHOIS query", self.timeout)),
        }
    }
}

impl Default for WhoisChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for WhoisChecker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WhoisChecker")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
