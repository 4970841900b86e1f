//! Availability heuristic over parsed WHOIS records.
//!
//! Registries vary wildly in WHOIS output format. The only signal common
//! enough to trust is whether the canonical "Domain Name" field is present;
//! free text and status tokens are secondary hints.

use crate::types::RegistryRecord;

/// Phrases in free text that confirm a domain is not registered.
const NOT_FOUND_PHRASES: &[&str] = &[
    "no match",
    "not found",
    "no entries found",
    "no data found",
    "domain not found",
    "status: free",
    "status: available",
];

/// Status tokens that mark a named record as still registrable.
const FREE_STATUS_PHRASES: &[&str] = &["no match", "free", "available"];

/// Decide whether a domain is available from its registry record.
///
/// First match wins:
/// 1. no record: available
/// 2. no registered name: available (free text may only confirm this)
/// 3. registered name, but status mentions "no match"/"free"/"available": available
/// 4. otherwise: taken
pub fn classify(record: Option<&RegistryRecord>) -> bool {
    let record = match record {
        Some(record) => record,
        None => return true,
    };

    let has_name = record
        .registered_name
        .as_deref()
        .is_some_and(|name| !name.is_empty());

    if !has_name {
        // Free text can confirm absence but never overrides it.
        return true;
    }

    let statuses = joined_lowercase(record.statuses.as_deref());
    contains_any(&statuses, FREE_STATUS_PHRASES)
}

/// Whether the record's free text explicitly says the domain is not registered.
pub fn text_confirms_absence(record: &RegistryRecord) -> bool {
    mentions_absence(&joined_lowercase(record.text.as_deref()))
}

/// Whether a line of registry text carries a "not registered" phrase.
pub(crate) fn mentions_absence(text: &str) -> bool {
    contains_any(&text.to_lowercase(), NOT_FOUND_PHRASES)
}

fn joined_lowercase(parts: Option<&[String]>) -> String {
    parts
        .map(|parts| parts.join(" ").to_lowercase())
        .unwrap_or_default()
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}
