//! Registrar API checker.
//!
//! Holds the registrar credentials but has no real API client yet: every
//! check is answered by the live WHOIS checker.

use super::whois::WhoisChecker;
use crate::types::{CheckResult, RegistrarCredentials};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct RegistrarChecker {
    credentials: RegistrarCredentials,
    fallback: WhoisChecker,
    warned: Arc<AtomicBool>,
}

impl RegistrarChecker {
    pub fn new(credentials: RegistrarCredentials, fallback: WhoisChecker) -> Self {
        Self {
            credentials,
            fallback,
            warned: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn api_key(&self) -> &str {
        &self.credentials.api_key
    }

    // TODO: call the registrar availability endpoint once its contract is published.
    pub async fn check(&self, domain: &str) -> CheckResult {
        if !self.warned.swap(true, Ordering::Relaxed) {
            warn!(
                api_key = %self.credentials.api_key,
                "registrar API client not implemented, falling back to WHOIS"
            );
        }
        self.fallback.check(domain).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DomainCheckError;
    use crate::protocols::RegistryLookup;
    use crate::types::RegistryRecord;
    use async_trait::async_trait;
    use std::time::Duration;

    struct NoRecord;

    #[async_trait]
    impl RegistryLookup for NoRecord {
        async fn lookup(&self, _domain: &str) -> Result<Option<RegistryRecord>, DomainCheckError> {
            Ok(None)
        }
    }

    fn credentials() -> RegistrarCredentials {
        RegistrarCredentials::from_parts(Some("key-123".into()), Some("s3cret".into())).unwrap()
    }

    #[tokio::test]
    async fn test_delegates_to_whois() {
        let fallback = WhoisChecker::with_lookup(Arc::new(NoRecord), Duration::from_secs(1));
        let checker = RegistrarChecker::new(credentials(), fallback);

        let result = checker.check("brandly.io").await;
        assert!(result.available);
        assert_eq!(result.price, 35.0);

        let again = checker.check("brandly.io").await;
        assert_eq!(result, again);
        assert!(checker.warned.load(Ordering::Relaxed));
    }

    #[test]
    fn test_debug_hides_secret() {
        let checker = RegistrarChecker::new(credentials(), WhoisChecker::new());
        let printed = format!("{:?}", checker);
        assert!(printed.contains("key-123"));
        assert!(!printed.contains("s3cret"));
        assert_eq!(checker.api_key(), "key-123");
    }
}
