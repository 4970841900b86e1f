//! WHOIS protocol implementation for domain availability checking.
//!
//! Speaks the plain-text protocol directly over TCP port 43: send the query
//! followed by CRLF, read until the server closes the connection. Responses
//! are not standardized, so parsing only extracts what the classifier needs.

use crate::classify::mentions_absence;
use crate::error::DomainCheckError;
use crate::protocols::registry::{extract_tld, get_whois_server};
use crate::protocols::RegistryLookup;
use crate::types::RegistryRecord;
use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

/// Well-known WHOIS port.
pub const WHOIS_PORT: u16 = 43;

/// Server that knows the authoritative WHOIS server of every TLD.
pub const IANA_WHOIS_SERVER: &str = "whois.iana.org";

/// Responses larger than this are treated as malformed.
const MAX_RESPONSE_BYTES: u64 = 256 * 1024;

/// Keys that carry the registered domain name.
const NAME_KEYS: &[&str] = &["domain name", "domain", "domainname"];

/// Keys that carry status tokens.
const STATUS_KEYS: &[&str] = &["domain status", "status", "registration status"];

/// Keys that point at a more authoritative WHOIS server.
const REFERRAL_KEYS: &[&str] = &["registrar whois server", "whois server", "refer", "whois"];

const RATE_LIMIT_PATTERNS: &[&str] = &[
    "rate limit exceeded",
    "too many requests",
    "try again later",
    "quota exceeded",
    "limit exceeded",
    "throttled",
    "rate-limited",
    "access control limit",
    "queried interval is too short",
    "has been exceeded",
];

lazy_static! {
    static ref KEY_VALUE: Regex =
        Regex::new(r"^([A-Za-z][A-Za-z0-9 ._/()-]{0,80}?)\s*:\s*(.*)$")
            .expect("key/value pattern is valid");
}

/// Raw WHOIS client.
///
/// By default every query goes to the registry server for the domain's TLD
/// (built-in table or IANA discovery). A pinned server skips discovery.
#[derive(Debug, Clone)]
pub struct WhoisClient {
    port: u16,
    pinned_server: Option<String>,
    max_response_bytes: u64,
}

impl WhoisClient {
    /// Create a client that queries the public registry servers.
    pub fn new() -> Self {
        Self {
            port: WHOIS_PORT,
            pinned_server: None,
            max_response_bytes: MAX_RESPONSE_BYTES,
        }
    }

    /// Create a client that sends every query to `server:port`.
    ///
    /// Referrals are still followed, on the same port.
    pub fn with_server<S: Into<String>>(server: S, port: u16) -> Self {
        Self {
            port,
            pinned_server: Some(server.into()),
            max_response_bytes: MAX_RESPONSE_BYTES,
        }
    }

    /// Send one query to one server and return the decoded response.
    ///
    /// Fails on connection errors, oversized or non-UTF-8 responses, responses
    /// that look like a rate-limit rejection, and responses with no answer in
    /// them (nothing but blank lines and comments).
    pub async fn query(&self, server: &str, query: &str) -> Result<String, DomainCheckError> {
        debug!(server, query, "sending WHOIS query");

        let mut stream = TcpStream::connect((server, self.port))
            .await
            .map_err(|e| {
                DomainCheckError::network_with_source(
                    format!("Failed to connect to {}", server),
                    e.to_string(),
                )
            })?;

        stream.write_all(format!("{}\r\n", query).as_bytes()).await?;

        let mut buf = Vec::new();
        let mut reader = stream.take(self.max_response_bytes + 1);
        reader.read_to_end(&mut buf).await?;

        if buf.len() as u64 > self.max_response_bytes {
            return Err(DomainCheckError::parse(
                format!(
                    "Response from {} exceeds {} bytes",
                    server, self.max_response_bytes
                ),
                None,
            ));
        }

        let text = String::from_utf8(buf).map_err(|e| {
            DomainCheckError::parse(format!("{} returned non-UTF-8 data: {}", server, e), None)
        })?;

        if text.trim().is_empty() {
            return Err(DomainCheckError::whois(
                query,
                format!("{} closed the connection without answering", server),
            ));
        }

        if is_rate_limited(&text) {
            return Err(DomainCheckError::rate_limited(
                server,
                text.lines().find(|l| !l.trim().is_empty()).unwrap_or("").trim(),
            ));
        }

        if !has_answer(&text) {
            return Err(DomainCheckError::whois(
                query,
                format!("{} answered with comments only", server),
            ));
        }

        Ok(text)
    }

    /// Ask IANA which WHOIS server is authoritative for `tld`.
    pub async fn discover_whois_server(&self, tld: &str) -> Option<String> {
        match self.query(IANA_WHOIS_SERVER, tld).await {
            Ok(response) => parse_iana_refer_response(&response),
            Err(e) => {
                debug!(tld, error = %e, "IANA referral query failed");
                None
            }
        }
    }

    async fn registry_server(&self, domain: &str) -> Result<String, DomainCheckError> {
        if let Some(server) = &self.pinned_server {
            return Ok(server.clone());
        }

        let tld = extract_tld(domain)?;
        get_whois_server(&tld, self).await.ok_or_else(|| {
            DomainCheckError::whois(domain, format!("No WHOIS server is known for .{}", tld))
        })
    }
}

impl Default for WhoisClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RegistryLookup for WhoisClient {
    /// Query the registry, follow at most one referral, and parse the answer.
    async fn lookup(&self, domain: &str) -> Result<Option<RegistryRecord>, DomainCheckError> {
        let server = self.registry_server(domain).await?;
        let first = self.query(&server, domain).await?;
        let registry_record = parse_record(&first);

        let referral = match find_referral(&first, &server) {
            Some(referral) => referral,
            None => return Ok(registry_record),
        };

        debug!(domain, from = %server, to = %referral, "following WHOIS referral");
        match self.query(&referral, domain).await {
            Ok(response) => {
                let authoritative = parse_record(&response);
                Ok(merge_records(registry_record, authoritative))
            }
            Err(e) => {
                // The registry answer is still valid on its own.
                debug!(domain, server = %referral, error = %e, "referral failed, using registry answer");
                Ok(registry_record)
            }
        }
    }
}

/// Parse a raw WHOIS response into a [`RegistryRecord`].
///
/// An empty response yields `None`. Comment lines (`%`, `#`) are dropped
/// unless they say the domain was not found, `key: value` lines fill the name
/// and status fields, and every other line is kept as free text.
///
/// A name or status key with nothing after the colon takes its value from the
/// next, more indented line:
///
/// ```text
///     Domain name:
///         google.co.uk
/// ```
pub fn parse_record(response: &str) -> Option<RegistryRecord> {
    if response.trim().is_empty() {
        return None;
    }

    let mut registered_name = None;
    let mut statuses = Vec::new();
    let mut text = Vec::new();
    let mut lines = response.lines().peekable();

    while let Some(raw) = lines.next() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        if is_comment(line) {
            if mentions_absence(line) {
                text.push(line.to_string());
            }
            continue;
        }

        let Some(caps) = KEY_VALUE.captures(line) else {
            text.push(line.to_string());
            continue;
        };

        let key = caps[1].trim().to_lowercase();
        let is_name = NAME_KEYS.contains(&key.as_str());
        let is_status = STATUS_KEYS.contains(&key.as_str());
        let mut value = caps[2].trim().to_string();

        if value.is_empty() && (is_name || is_status) {
            // Skip the blank lines between a key and its block value.
            while lines.next_if(|next| next.trim().is_empty()).is_some() {}
            if let Some(next) = lines.next_if(|next| is_block_value(next, indent(raw))) {
                value = next.trim().to_string();
            }
        }

        if value.is_empty() {
            continue;
        }
        if is_name {
            if registered_name.is_none() {
                registered_name = Some(value);
            }
        } else if is_status {
            statuses.push(value);
        }
    }

    Some(RegistryRecord {
        registered_name,
        statuses: (!statuses.is_empty()).then_some(statuses),
        text: (!text.is_empty()).then_some(text),
    })
}

fn is_comment(line: &str) -> bool {
    line.starts_with('%') || line.starts_with('#')
}

fn indent(raw: &str) -> usize {
    raw.len() - raw.trim_start().len()
}

/// A plain line indented deeper than the key it belongs to.
fn is_block_value(raw: &str, key_indent: usize) -> bool {
    let line = raw.trim();
    !line.is_empty() && !is_comment(line) && indent(raw) > key_indent && !KEY_VALUE.is_match(line)
}

/// Whether a response carries anything beyond blank lines and comments.
///
/// A comment saying the domain was not found counts as an answer.
fn has_answer(response: &str) -> bool {
    response.lines().map(str::trim).any(|line| {
        !line.is_empty() && (!is_comment(line) || mentions_absence(line))
    })
}

/// Find a referral to a different WHOIS server in a response.
fn find_referral(response: &str, current_server: &str) -> Option<String> {
    for line in response.lines() {
        let Some(caps) = KEY_VALUE.captures(line.trim()) else {
            continue;
        };

        let key = caps[1].trim().to_lowercase();
        if !REFERRAL_KEYS.contains(&key.as_str()) {
            continue;
        }

        let host = caps[2]
            .trim()
            .trim_start_matches("whois://")
            .trim_start_matches("rwhois://")
            .split(['/', ' ', '\t'])
            .next()
            .unwrap_or("")
            .to_lowercase();

        if host.contains('.') && !host.eq_ignore_ascii_case(current_server) {
            return Some(host);
        }
    }

    None
}

/// Combine the registry record with the referral's record.
///
/// The registry's own fields win; the referral only fills gaps, so evidence
/// of registration is never lost by following a referral.
fn merge_records(
    registry: Option<RegistryRecord>,
    referral: Option<RegistryRecord>,
) -> Option<RegistryRecord> {
    match (registry, referral) {
        (Some(registry), Some(referral)) => Some(RegistryRecord {
            registered_name: registry.registered_name.or(referral.registered_name),
            statuses: registry.statuses.or(referral.statuses),
            text: registry.text.or(referral.text),
        }),
        (registry, referral) => registry.or(referral),
    }
}

/// Check if the WHOIS output indicates rate limiting.
fn is_rate_limited(output: &str) -> bool {
    let output_lower = output.to_lowercase();
    RATE_LIMIT_PATTERNS
        .iter()
        .any(|pattern| output_lower.contains(pattern))
}

/// Parse an IANA WHOIS response for the authoritative WHOIS server.
///
/// IANA uses either `refer:` or `whois:`; `refer:` wins when both appear.
///
/// ```text
/// whois:        whois.verisign-grs.com
/// refer:        whois.verisign-grs.com
/// ```
pub(crate) fn parse_iana_refer_response(response: &str) -> Option<String> {
    let mut whois_server = None;

    for line in response.lines() {
        let line_trimmed = line.trim();
        if let Some(server) = line_trimmed.strip_prefix("refer:") {
            let server = server.trim();
            if !server.is_empty() {
                return Some(server.to_string());
            }
        } else if let Some(server) = line_trimmed.strip_prefix("whois:") {
            let server = server.trim();
            if !server.is_empty() {
                whois_server = Some(server.to_string());
            }
        }
    }

    whois_server
}

#[cfg(test)]
mod tests {
    use super::*;

    const VERISIGN_TAKEN: &str = "   Domain Name: GOOGLE.COM\r\n   Registry Domain ID: 2138514_DOMAIN_COM-VRSN\r\n   Registrar WHOIS Server: whois.markmonitor.com\r\n   Domain Status: clientDeleteProhibited https://icann.org/epp#clientDeleteProhibited\r\n   Domain Status: serverTransferProhibited https://icann.org/epp#serverTransferProhibited\r\n>>> Last update of whois database: 2024-05-01T10:00:00Z <<<\r\n";

    const VERISIGN_FREE: &str = "No match for \"XYZQWERTY98765.COM\".\r\n>>> Last update of whois database: 2024-05-01T10:00:00Z <<<\r\n";

    const NOMINET_TAKEN: &str = "\r
    Domain name:\r
        google.co.uk\r
\r
    Data validation:\r
        Nominet was able to match the registrant's name and address against a 3rd party data source on 10-Dec-2012\r
\r
    Registrar:\r
        Markmonitor Inc. t/a MarkMonitor Inc. [Tag = MARKMONITOR]\r
        URL: http://www.markmonitor.com\r
\r
    Relevant dates:\r
        Registered on: before Aug-1996\r
        Expiry date:  14-Feb-2025\r
\r
    Registration status:\r
        Registered until expiry date.\r
\r
    Name servers:\r
        ns1.google.com\r
        ns2.google.com\r
";

    const NOMINET_FREE: &str = "\r
    No match for \"zzqxbrand.co.uk\".\r
\r
    This domain name has not been registered.\r
";

    const AFNIC_FREE: &str = "%%\r
%% This is the AFNIC Whois server.\r
%%\r
\r
%% NOT FOUND\r
";

    #[test]
    fn test_parse_taken_record() {
        let record = parse_record(VERISIGN_TAKEN).unwrap();
        assert_eq!(record.registered_name.as_deref(), Some("GOOGLE.COM"));
        assert_eq!(record.statuses.as_ref().map(|s| s.len()), Some(2));
        assert!(record.text.unwrap()[0].starts_with(">>> Last update"));
    }

    #[test]
    fn test_parse_not_found_record() {
        let record = parse_record(VERISIGN_FREE).unwrap();
        assert!(record.registered_name.is_none());
        assert!(record.statuses.is_none());
        assert_eq!(
            record.text.unwrap()[0],
            "No match for \"XYZQWERTY98765.COM\"."
        );
    }

    #[test]
    fn test_parse_denic_style_record() {
        let record = parse_record("% Restricted rights.\n\nDomain: brandneu.de\nStatus: free\n")
            .unwrap();
        assert_eq!(record.registered_name.as_deref(), Some("brandneu.de"));
        assert_eq!(record.statuses, Some(vec!["free".to_string()]));
        assert!(record.text.is_none());
    }

    #[test]
    fn test_parse_empty_response_is_absent() {
        assert!(parse_record("").is_none());
        assert!(parse_record("  \r\n\r\n").is_none());
    }

    #[test]
    fn test_empty_name_value_is_ignored() {
        let record = parse_record("Domain Name:\nDomain Name: real.com\n").unwrap();
        assert_eq!(record.registered_name.as_deref(), Some("real.com"));
    }

    #[test]
    fn test_parse_nominet_block_values() {
        let record = parse_record(NOMINET_TAKEN).unwrap();
        assert_eq!(record.registered_name.as_deref(), Some("google.co.uk"));
        assert_eq!(
            record.statuses,
            Some(vec!["Registered until expiry date.".to_string()])
        );
        let text = record.text.as_ref().unwrap();
        assert!(!text.contains(&"google.co.uk".to_string()));
        assert!(!crate::classify(Some(&record)));

        let free = parse_record(NOMINET_FREE).unwrap();
        assert!(free.registered_name.is_none());
        assert!(crate::classify::text_confirms_absence(&free));
        assert!(crate::classify(Some(&free)));
    }

    #[test]
    fn test_block_value_needs_deeper_indent() {
        let record = parse_record("Domain:\nnext-key-line\n").unwrap();
        assert!(record.registered_name.is_none());
        assert_eq!(record.text, Some(vec!["next-key-line".to_string()]));

        let record = parse_record("  Domain name:\n      Registrar: Example\n").unwrap();
        assert!(record.registered_name.is_none());
    }

    #[test]
    fn test_not_found_comments_are_kept() {
        let record = parse_record(AFNIC_FREE).unwrap();
        assert_eq!(record.text, Some(vec!["%% NOT FOUND".to_string()]));
        assert!(crate::classify::text_confirms_absence(&record));

        let record = parse_record("% Restricted rights.\n% Terms of use apply.\n").unwrap();
        assert!(record.text.is_none());
    }

    #[test]
    fn test_has_answer() {
        assert!(has_answer(VERISIGN_TAKEN));
        assert!(has_answer(VERISIGN_FREE));
        assert!(has_answer(AFNIC_FREE));
        assert!(!has_answer("% Restricted rights.\r\n\r\n# no data\r\n"));
        assert!(!has_answer("%%\r\n%% This is the AFNIC Whois server.\r\n"));
    }

    #[test]
    fn test_find_referral() {
        assert_eq!(
            find_referral(VERISIGN_TAKEN, "whois.verisign-grs.com"),
            Some("whois.markmonitor.com".to_string())
        );
        assert_eq!(find_referral(VERISIGN_FREE, "whois.verisign-grs.com"), None);

        // A referral back to the same server is not a referral
        let self_ref = "Registrar WHOIS Server: whois.nic.io\n";
        assert_eq!(find_referral(self_ref, "whois.nic.io"), None);

        let with_scheme = "refer: whois://whois.example.net/\n";
        assert_eq!(
            find_referral(with_scheme, "whois.iana.org"),
            Some("whois.example.net".to_string())
        );
    }

    #[test]
    fn test_merge_prefers_registry_fields() {
        let registry = RegistryRecord::with_name("GOOGLE.COM").statuses(["clientDeleteProhibited"]);
        let referral = RegistryRecord::default().text(["Registrar: MarkMonitor"]);

        let merged = merge_records(Some(registry), Some(referral)).unwrap();
        assert_eq!(merged.registered_name.as_deref(), Some("GOOGLE.COM"));
        assert_eq!(
            merged.statuses,
            Some(vec!["clientDeleteProhibited".to_string()])
        );
        assert_eq!(merged.text, Some(vec!["Registrar: MarkMonitor".to_string()]));

        assert!(merge_records(None, None).is_none());
    }

    #[test]
    fn test_rate_limit_detection() {
        assert!(is_rate_limited("Rate limit exceeded. Try again later."));
        assert!(is_rate_limited("Too many requests from your IP."));
        assert!(is_rate_limited(
            "% Error: 55000000002 Connection refused; access control limit reached."
        ));
        assert!(is_rate_limited("The queried interval is too short"));
        assert!(is_rate_limited("Query rate of 5000 per day has been exceeded."));
        assert!(!is_rate_limited(NOMINET_TAKEN));
        assert!(!is_rate_limited(AFNIC_FREE));
        assert!(!is_rate_limited("Normal whois response"));
        assert!(!is_rate_limited(VERISIGN_TAKEN));
    }

    #[test]
    fn test_parse_iana_refer_response() {
        let response = "% IANA WHOIS server\n% for more information on IANA, visit http://www.iana.org\n\nrefer:        whois.verisign-grs.com\n\ndomain:       COM\n";
        assert_eq!(
            parse_iana_refer_response(response),
            Some("whois.verisign-grs.com".to_string())
        );

        let no_refer = "% IANA WHOIS server\ndomain: TEST\nstatus: ACTIVE\n";
        assert_eq!(parse_iana_refer_response(no_refer), None);

        let empty_refer = "refer:        \ndomain: COM\n";
        assert_eq!(parse_iana_refer_response(empty_refer), None);

        let both_fields = "whois:        whois.old-server.com\nrefer:        whois.correct-server.com\ndomain:       COM\n";
        assert_eq!(
            parse_iana_refer_response(both_fields),
            Some("whois.correct-server.com".to_string())
        );

        let whois_only = "whois:        whois.nic.museum\n";
        assert_eq!(
            parse_iana_refer_response(whois_only),
            Some("whois.nic.museum".to_string())
        );
    }

    #[test]
    fn test_client_defaults() {
        let client = WhoisClient::new();
        assert_eq!(client.port, WHOIS_PORT);
        assert!(client.pinned_server.is_none());

        let pinned = WhoisClient::with_server("127.0.0.1", 4343);
        assert_eq!(pinned.port, 4343);
        assert_eq!(pinned.pinned_server.as_deref(), Some("127.0.0.1"));
    }
}
