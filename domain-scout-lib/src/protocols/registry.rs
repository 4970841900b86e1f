//! WHOIS server mappings and IANA discovery.
//!
//! The TLDs in the price table have well-known registry servers. Anything
//! else is discovered once through `whois.iana.org` and cached for the
//! lifetime of the process, including negative answers.

use crate::error::DomainCheckError;
use crate::protocols::whois::WhoisClient;
use lazy_static::lazy_static;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::debug;

lazy_static! {
    /// TLD -> discovered WHOIS server. An empty string records "no server".
    static ref WHOIS_SERVER_CACHE: Mutex<HashMap<String, String>> = Mutex::new(HashMap::new());
}

/// Built-in registry WHOIS servers, keyed by TLD without the dot.
pub fn builtin_whois_server(tld: &str) -> Option<&'static str> {
    let server = match tld {
        "com" | "net" => "whois.verisign-grs.com",
        "org" => "whois.pir.org",
        "io" => "whois.nic.io",
        "co" => "whois.nic.co",
        "ai" => "whois.nic.ai",
        "trade" => "whois.nic.trade",
        "finance" => "whois.nic.finance",
        "capital" => "whois.nic.capital",
        "fr" => "whois.nic.fr",
        "de" => "whois.denic.de",
        "es" => "whois.nic.es",
        "it" => "whois.nic.it",
        "nl" => "whois.domain-registry.nl",
        "eu" => "whois.eu",
        "uk" => "whois.nic.uk",
        _ => return None,
    };
    Some(server)
}

/// Cache a discovered WHOIS server for a TLD.
pub fn cache_whois_server(tld: &str, server: &str) -> Result<(), DomainCheckError> {
    let mut cache = WHOIS_SERVER_CACHE.lock().map_err(|_| {
        DomainCheckError::internal("Failed to acquire WHOIS server cache lock for writing")
    })?;

    cache.insert(tld.to_lowercase(), server.to_string());
    Ok(())
}

/// Look up a cached WHOIS server for a TLD.
pub fn get_cached_whois_server(tld: &str) -> Option<String> {
    let cache = WHOIS_SERVER_CACHE.lock().ok()?;
    let server = cache.get(&tld.to_lowercase())?;
    if server.is_empty() {
        None
    } else {
        Some(server.clone())
    }
}

/// Check if a TLD has been negatively cached (no server found).
pub fn is_whois_negatively_cached(tld: &str) -> bool {
    if let Ok(cache) = WHOIS_SERVER_CACHE.lock() {
        matches!(cache.get(&tld.to_lowercase()), Some(s) if s.is_empty())
    } else {
        false
    }
}

/// Get the WHOIS server for a TLD.
///
/// Lookup flow:
/// 1. Built-in table
/// 2. Cache of earlier discoveries
/// 3. IANA referral through `client`, cached either way
pub async fn get_whois_server(tld: &str, client: &WhoisClient) -> Option<String> {
    let tld_lower = tld.to_lowercase();

    if let Some(server) = builtin_whois_server(&tld_lower) {
        return Some(server.to_string());
    }

    if let Some(server) = get_cached_whois_server(&tld_lower) {
        return Some(server);
    }

    if is_whois_negatively_cached(&tld_lower) {
        return None;
    }

    match client.discover_whois_server(&tld_lower).await {
        Some(server) => {
            debug!(tld = %tld_lower, server = %server, "discovered WHOIS server");
            let _ = cache_whois_server(&tld_lower, &server);
            Some(server)
        }
        None => {
            debug!(tld = %tld_lower, "no WHOIS server for TLD");
            let _ = cache_whois_server(&tld_lower, "");
            None
        }
    }
}

/// Extract the TLD (last label, lower-cased, no dot) from a domain name.
pub fn extract_tld(domain: &str) -> Result<String, DomainCheckError> {
    let parts: Vec<&str> = domain.split('.').collect();

    if parts.len() < 2 {
        return Err(DomainCheckError::invalid_domain(
            domain,
            "Domain must contain at least one dot",
        ));
    }

    match parts.last() {
        Some(tld) if !tld.is_empty() => Ok(tld.to_lowercase()),
        _ => Err(DomainCheckError::invalid_domain(domain, "Empty TLD")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_tld() {
        assert_eq!(extract_tld("example.com").unwrap(), "com");
        assert_eq!(extract_tld("test.ORG").unwrap(), "org");
        assert_eq!(extract_tld("sub.example.co.uk").unwrap(), "uk");
        assert!(extract_tld("invalid").is_err());
        assert!(extract_tld("").is_err());
        assert!(extract_tld("trailing.").is_err());
    }

    #[test]
    fn test_every_priced_tld_has_builtin_server() {
        for (tld, _) in crate::pricing::known_prices() {
            let bare = tld.trim_start_matches('.');
            assert!(
                builtin_whois_server(bare).is_some(),
                "priced TLD {} has no WHOIS server",
                tld
            );
        }
        assert!(builtin_whois_server("museum").is_none());
    }

    #[test]
    fn test_whois_server_caching() {
        cache_whois_server("zzcachetest", "whois.nic.zzcachetest").unwrap();
        assert_eq!(
            get_cached_whois_server("ZZCACHETEST"),
            Some("whois.nic.zzcachetest".to_string())
        );

        cache_whois_server("zzfake", "").unwrap();
        assert_eq!(get_cached_whois_server("zzfake"), None);
        assert!(is_whois_negatively_cached("zzfake"));
        assert!(!is_whois_negatively_cached("zzcachetest"));
    }

    #[tokio::test]
    async fn test_builtin_server_needs_no_network() {
        let client = WhoisClient::new();
        assert_eq!(
            get_whois_server("COM", &client).await,
            Some("whois.verisign-grs.com".to_string())
        );
    }

    #[tokio::test]
    async fn test_negative_cache_short_circuits_discovery() {
        cache_whois_server("zznegative", "").unwrap();
        let client = WhoisClient::new();
        assert_eq!(get_whois_server("zznegative", &client).await, None);
    }
}
