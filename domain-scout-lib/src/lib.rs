//! # Domain Scout Library
//!
//! Batch domain availability checking with estimated registration prices.
//!
//! A list of candidate domains goes in; the same list comes out, in the same
//! order, each entry marked available or taken and priced by TLD. Checking
//! never fails: a lookup that cannot be completed reports the domain as
//! taken, so nothing unverified is ever offered as purchasable.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use domain_scout_lib::{CheckConfig, DomainChecker};
//!
//! #[tokio::main]
//! async fn main() {
//!     let checker = DomainChecker::new();
//!     let result = checker.check_domain("example.com").await;
//!
//!     println!("{} available={} price={} {}", result.domain, result.available, result.price, result.currency);
//! }
//! ```
//!
//! ## Backends
//!
//! - **Live WHOIS**: TCP port 43 against the TLD registry, one referral hop
//! - **Offline double**: deterministic hash, no network
//! - **Registrar API**: holds credentials, answers through live WHOIS for now

pub use backends::{CheckerBackend, OfflineChecker, RegistrarChecker, WhoisChecker};
pub use checker::DomainChecker;
pub use classify::classify;
pub use config::{
    load_env_config, merge_configs, parse_bool, parse_duration_string, resolve_check_config,
    ConfigManager, EnvConfig, FileConfig, OutputConfig,
};
pub use error::DomainCheckError;
pub use pricing::{estimate_price, known_prices, DEFAULT_PRICE};
pub use protocols::{parse_record, RegistryLookup, WhoisClient};
pub use types::{
    BackendKind, BatchConfig, BatchSummary, CheckConfig, CheckResult, RegistrarCredentials,
    RegistryRecord, CURRENCY,
};
pub use utils::{expand_domain_inputs, validate_domain};

pub mod backends;
pub mod protocols;

mod checker;
mod classify;
mod concurrent;
mod config;
mod error;
mod pricing;
mod types;
mod utils;

// Type alias for convenience
pub type Result<T> = std::result::Result<T, DomainCheckError>;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
