//! Utility functions for domain processing and validation.

use crate::error::DomainCheckError;

/// Validate a candidate and return the form used for lookups.
///
/// Trims surrounding whitespace and lower-cases. The candidate must contain
/// a dot, no inner whitespace, no empty labels, and fit in 253 bytes.
pub fn validate_domain(domain: &str) -> Result<String, DomainCheckError> {
    let domain = domain.trim();

    if domain.is_empty() {
        return Err(DomainCheckError::invalid_domain(
            domain,
            "Domain name cannot be empty",
        ));
    }

    if domain.chars().any(char::is_whitespace) {
        return Err(DomainCheckError::invalid_domain(
            domain,
            "Domain name cannot contain whitespace",
        ));
    }

    if !domain.contains('.') {
        return Err(DomainCheckError::invalid_domain(
            domain,
            "Domain name must include a TLD",
        ));
    }

    if domain.len() > 253 {
        return Err(DomainCheckError::invalid_domain(
            domain,
            "Domain name longer than 253 characters",
        ));
    }

    if domain.split('.').any(str::is_empty) {
        return Err(DomainCheckError::invalid_domain(
            domain,
            "Domain name contains an empty label",
        ));
    }

    Ok(domain.to_lowercase())
}

/// Expand domain inputs based on smart detection rules.
///
/// - Domains with dots are treated as FQDNs (no expansion)
/// - Domains without dots get expanded with provided TLDs
/// - Invalid entries are dropped
///
/// # Arguments
///
/// * `domains` - Input domain names
/// * `tlds` - TLDs to use for expansion (defaults to ["com"] if None)
pub fn expand_domain_inputs(domains: &[String], tlds: &Option<Vec<String>>) -> Vec<String> {
    let mut results = Vec::new();

    for domain in domains {
        let trimmed = domain.trim();

        if trimmed.is_empty() {
            continue;
        }

        if trimmed.contains('.') {
            if is_valid_fqdn(trimmed) {
                results.push(trimmed.to_lowercase());
            }
        } else if is_valid_base_name(trimmed) {
            let base = trimmed.to_lowercase();
            match tlds {
                Some(tld_list) => {
                    for tld in tld_list {
                        let tld_clean = tld.trim().trim_start_matches('.');
                        if !tld_clean.is_empty() {
                            results.push(format!("{}.{}", base, tld_clean.to_lowercase()));
                        }
                    }
                }
                None => results.push(format!("{}.com", base)),
            }
        }
    }

    results
}

/// Validate that a base domain name (without TLD) is acceptable.
pub(crate) fn is_valid_base_name(domain: &str) -> bool {
    if domain.len() < 2 {
        return false;
    }

    if domain.starts_with('-') || domain.ends_with('-') {
        return false;
    }

    domain.chars().all(|c| c.is_alphanumeric() || c == '-')
}

/// Validate that an FQDN has basic valid structure.
fn is_valid_fqdn(domain: &str) -> bool {
    if domain.len() < 4 || domain.len() > 253 {
        return false;
    }

    if !domain.contains('.') {
        return false;
    }

    if domain.starts_with('.')
        || domain.ends_with('.')
        || domain.starts_with('-')
        || domain.ends_with('-')
    {
        return false;
    }

    domain.split('.').all(|part| {
        !part.is_empty()
            && part.len() <= 63
            && !part.starts_with('-')
            && !part.ends_with('-')
            && part.chars().all(|c| c.is_alphanumeric() || c == '-')
    })
}
