//! Core data types for domain availability checking.
//!
//! This module defines the result record handed back to callers, the
//! ephemeral registry record parsed from WHOIS, and the configuration values
//! that pick a backend and its batching behaviour.

use crate::pricing::estimate_price;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Currency used for every estimated price.
pub const CURRENCY: &str = "EUR";

/// Result of checking one candidate domain.
///
/// Created exactly once per candidate by a checker backend and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    /// The domain exactly as the caller supplied it
    pub domain: String,

    /// Whether the domain appears to be free for registration.
    /// Unverifiable domains are always reported as `false`.
    pub available: bool,

    /// Estimated registration price for the domain's TLD
    pub price: f64,

    /// Three-letter currency code of `price`
    pub currency: String,
}

impl CheckResult {
    /// Build a result for `domain`, pricing it from the static price table.
    pub fn new<D: Into<String>>(domain: D, available: bool) -> Self {
        let domain = domain.into();
        let price = estimate_price(&domain);
        Self {
            domain,
            available,
            price,
            currency: CURRENCY.to_string(),
        }
    }

    /// Conservative result used whenever a domain could not be verified.
    pub fn unavailable<D: Into<String>>(domain: D) -> Self {
        Self::new(domain, false)
    }
}

/// Structured view of one WHOIS answer.
///
/// Registries disagree wildly on output format, so every field is optional.
/// Built per lookup and consumed immediately by the classifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryRecord {
    /// The canonical "Domain Name" field, if the registry returned one
    pub registered_name: Option<String>,

    /// Values of "Domain Status" style fields
    pub statuses: Option<Vec<String>>,

    /// Lines that were not `key: value` pairs
    pub text: Option<Vec<String>>,
}

impl RegistryRecord {
    /// Record carrying only a registered name.
    pub fn with_name<N: Into<String>>(name: N) -> Self {
        Self {
            registered_name: Some(name.into()),
            ..Default::default()
        }
    }

    /// Attach status tokens.
    pub fn statuses<I, S>(mut self, statuses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.statuses = Some(statuses.into_iter().map(Into::into).collect());
        self
    }

    /// Attach free-text lines.
    pub fn text<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.text = Some(lines.into_iter().map(Into::into).collect());
        self
    }
}

/// Batching parameters for one orchestration run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchConfig {
    /// Window size: how many lookups may be in flight at once (always > 0)
    pub concurrency: usize,

    /// Pause between consecutive windows
    pub inter_batch_delay: Duration,
}

/// Pause used between windows for every backend.
pub const DEFAULT_INTER_BATCH_DELAY: Duration = Duration::from_millis(500);

impl BatchConfig {
    /// Create a batch configuration. Concurrency is clamped to 1..=100.
    pub fn new(concurrency: usize, inter_batch_delay: Duration) -> Self {
        Self {
            concurrency: concurrency.clamp(1, 100),
            inter_batch_delay,
        }
    }

    /// Defaults tied to a backend: loosest for the offline double,
    /// moderate for the registrar API, most conservative for public WHOIS.
    pub fn for_backend(kind: BackendKind) -> Self {
        let concurrency = match kind {
            BackendKind::Offline => 20,
            BackendKind::Registrar => 5,
            BackendKind::Whois => 3,
        };
        Self::new(concurrency, DEFAULT_INTER_BATCH_DELAY)
    }

    /// Override the window size.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.clamp(1, 100);
        self
    }

    /// Override the pause between windows.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.inter_batch_delay = delay;
        self
    }
}

/// Which checker implementation is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Live WHOIS lookups against public registry servers
    Whois,
    /// Authenticated registrar API (currently delegates to WHOIS)
    Registrar,
    /// Deterministic offline double, no network
    Offline,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Whois => write!(f, "WHOIS"),
            BackendKind::Registrar => write!(f, "Registrar API"),
            BackendKind::Offline => write!(f, "Offline"),
        }
    }
}

/// API key/secret pair for the registrar backend.
#[derive(Clone, PartialEq, Eq)]
pub struct RegistrarCredentials {
    pub api_key: String,
    pub api_secret: String,
}

impl RegistrarCredentials {
    /// Build credentials, returning `None` unless both parts are non-empty.
    pub fn from_parts(api_key: Option<String>, api_secret: Option<String>) -> Option<Self> {
        match (api_key, api_secret) {
            (Some(key), Some(secret)) if !key.trim().is_empty() && !secret.trim().is_empty() => {
                Some(Self {
                    api_key: key.trim().to_string(),
                    api_secret: secret.trim().to_string(),
                })
            }
            _ => None,
        }
    }
}

impl fmt::Debug for RegistrarCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrarCredentials")
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

/// Fully resolved configuration for one checking run.
///
/// Built once (defaults, then config files, environment and CLI flags) and
/// handed to [`crate::DomainChecker::with_config`]; never read from ambient
/// state afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckConfig {
    /// Use the deterministic offline double
    pub offline: bool,

    /// Registrar credentials; selects the registrar backend when present
    pub registrar: Option<RegistrarCredentials>,

    /// Explicit window size, replacing the backend default
    pub concurrency: Option<usize>,

    /// Explicit pause between windows, replacing the default
    pub inter_batch_delay: Option<Duration>,

    /// Timeout for one complete WHOIS lookup
    pub whois_timeout: Duration,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            offline: false,
            registrar: None,
            concurrency: None,
            inter_batch_delay: None,
            whois_timeout: Duration::from_secs(5),
        }
    }
}

impl CheckConfig {
    /// Select the offline double.
    pub fn with_offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    /// Provide registrar credentials.
    pub fn with_registrar(mut self, credentials: RegistrarCredentials) -> Self {
        self.registrar = Some(credentials);
        self
    }

    /// Override the window size. Capped to 1..=100.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = Some(concurrency.clamp(1, 100));
        self
    }

    /// Override the pause between windows.
    pub fn with_inter_batch_delay(mut self, delay: Duration) -> Self {
        self.inter_batch_delay = Some(delay);
        self
    }

    /// Set the WHOIS lookup timeout.
    pub fn with_whois_timeout(mut self, timeout: Duration) -> Self {
        self.whois_timeout = timeout;
        self
    }

    /// Which backend this configuration selects.
    ///
    /// Priority: offline flag, then registrar credentials, then live WHOIS.
    pub fn backend_kind(&self) -> BackendKind {
        if self.offline {
            BackendKind::Offline
        } else if self.registrar.is_some() {
            BackendKind::Registrar
        } else {
            BackendKind::Whois
        }
    }

    /// Batch parameters for the selected backend, with overrides applied.
    pub fn batch_config(&self) -> BatchConfig {
        let mut batch = BatchConfig::for_backend(self.backend_kind());
        if let Some(concurrency) = self.concurrency {
            batch = batch.with_concurrency(concurrency);
        }
        if let Some(delay) = self.inter_batch_delay {
            batch = batch.with_delay(delay);
        }
        batch
    }
}

/// Totals over a finished batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub available: usize,
    pub taken: usize,
    /// Sum of the estimated prices of every available domain
    pub available_price_total: f64,
}

impl BatchSummary {
    pub fn from_results(results: &[CheckResult]) -> Self {
        results.iter().fold(Self::default(), |mut acc, r| {
            acc.total += 1;
            if r.available {
                acc.available += 1;
                acc.available_price_total += r.price;
            } else {
                acc.taken += 1;
            }
            acc
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_result_prices_by_tld() {
        let result = CheckResult::new("example.com", false);
        assert_eq!(result.price, 12.0);
        assert_eq!(result.currency, "EUR");

        let result = CheckResult::unavailable("startup.io");
        assert!(!result.available);
        assert_eq!(result.price, 35.0);
    }

    #[test]
    fn test_backend_selection_priority() {
        let creds = RegistrarCredentials::from_parts(Some("key".into()), Some("secret".into()))
            .unwrap();

        assert_eq!(CheckConfig::default().backend_kind(), BackendKind::Whois);
        assert_eq!(
            CheckConfig::default()
                .with_registrar(creds.clone())
                .backend_kind(),
            BackendKind::Registrar
        );
        // Offline wins over credentials
        assert_eq!(
            CheckConfig::default()
                .with_registrar(creds)
                .with_offline(true)
                .backend_kind(),
            BackendKind::Offline
        );
    }

    #[test]
    fn test_batch_defaults_per_backend() {
        assert_eq!(BatchConfig::for_backend(BackendKind::Whois).concurrency, 3);
        assert_eq!(BatchConfig::for_backend(BackendKind::Registrar).concurrency, 5);
        assert_eq!(BatchConfig::for_backend(BackendKind::Offline).concurrency, 20);
        assert_eq!(
            BatchConfig::for_backend(BackendKind::Whois).inter_batch_delay,
            Duration::from_millis(500)
        );
    }

    #[test]
    fn test_batch_overrides() {
        let config = CheckConfig::default()
            .with_concurrency(0)
            .with_inter_batch_delay(Duration::ZERO);
        let batch = config.batch_config();
        assert_eq!(batch.concurrency, 1);
        assert_eq!(batch.inter_batch_delay, Duration::ZERO);
    }

    #[test]
    fn test_credentials_require_both_parts() {
        assert!(RegistrarCredentials::from_parts(Some("key".into()), None).is_none());
        assert!(RegistrarCredentials::from_parts(Some("key".into()), Some("  ".into())).is_none());
        assert!(RegistrarCredentials::from_parts(None, None).is_none());
    }

    #[test]
    fn test_credentials_debug_hides_secret() {
        let creds =
            RegistrarCredentials::from_parts(Some("key".into()), Some("hunter2".into())).unwrap();
        let printed = format!("{:?}", creds);
        assert!(printed.contains("key"));
        assert!(!printed.contains("hunter2"));
    }

    #[test]
    fn test_summary_counts() {
        let results = vec![
            CheckResult::new("a.com", true),
            CheckResult::new("b.io", true),
            CheckResult::new("c.com", false),
        ];
        let summary = BatchSummary::from_results(&results);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.available, 2);
        assert_eq!(summary.taken, 1);
        assert_eq!(summary.available_price_total, 47.0);
    }

    #[test]
    fn test_result_serializes_flat() {
        let json = serde_json::to_value(CheckResult::new("example.com", true)).unwrap();
        assert_eq!(json["domain"], "example.com");
        assert_eq!(json["available"], true);
        assert_eq!(json["price"], 12.0);
        assert_eq!(json["currency"], "EUR");
    }
}
