//! Protocol implementations for registry lookups.
//!
//! The live checker talks to registries through the [`RegistryLookup`] seam,
//! so tests and future transports can stand in for the WHOIS client.

use crate::error::DomainCheckError;
use crate::types::RegistryRecord;
use async_trait::async_trait;

/// WHOIS protocol implementation
pub mod whois;

/// WHOIS server mappings and IANA discovery
pub mod registry;

pub use registry::{extract_tld, get_whois_server};
pub use whois::{parse_record, WhoisClient};

/// One registry lookup for one domain.
///
/// `Ok(None)` means the registry answered with nothing at all.
#[async_trait]
pub trait RegistryLookup: Send + Sync {
    async fn lookup(&self, domain: &str) -> Result<Option<RegistryRecord>, DomainCheckError>;
}
