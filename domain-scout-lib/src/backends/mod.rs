//! Checker implementations.
//!
//! A backend turns one domain into one [`CheckResult`] and never fails:
//! anything that goes wrong underneath becomes `available: false`.

pub mod offline;
pub mod registrar;
pub mod whois;

pub use offline::OfflineChecker;
pub use registrar::RegistrarChecker;
pub use whois::{WhoisChecker, DEFAULT_WHOIS_TIMEOUT};

use crate::types::{BackendKind, CheckConfig, CheckResult};
use tracing::info;

/// The active checker, chosen once per run.
#[derive(Debug, Clone)]
pub enum CheckerBackend {
    Whois(WhoisChecker),
    Registrar(RegistrarChecker),
    Offline(OfflineChecker),
}

impl CheckerBackend {
    /// Select the backend described by `config`.
    ///
    /// Offline wins over registrar credentials, which win over live WHOIS.
    pub fn from_config(config: &CheckConfig) -> Self {
        let backend = match (config.offline, &config.registrar) {
            (true, _) => Self::Offline(OfflineChecker::new()),
            (false, Some(credentials)) => Self::Registrar(RegistrarChecker::new(
                credentials.clone(),
                WhoisChecker::with_timeout(config.whois_timeout),
            )),
            (false, None) => Self::Whois(WhoisChecker::with_timeout(config.whois_timeout)),
        };
        info!(backend = %backend.kind(), "selected checker backend");
        backend
    }

    pub fn kind(&self) -> BackendKind {
        match self {
            Self::Whois(_) => BackendKind::Whois,
            Self::Registrar(_) => BackendKind::Registrar,
            Self::Offline(_) => BackendKind::Offline,
        }
    }

    /// Check one domain.
    pub async fn check(&self, domain: &str) -> CheckResult {
        match self {
            Self::Whois(checker) => checker.check(domain).await,
            Self::Registrar(checker) => checker.check(domain).await,
            Self::Offline(checker) => checker.check(domain).await,
        }
    }
}

impl From<WhoisChecker> for CheckerBackend {
    fn from(checker: WhoisChecker) -> Self {
        Self::Whois(checker)
    }
}

impl From<OfflineChecker> for CheckerBackend {
    fn from(checker: OfflineChecker) -> Self {
        Self::Offline(checker)
    }
}
