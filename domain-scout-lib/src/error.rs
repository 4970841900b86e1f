//! Error handling for domain checking operations.
//!
//! These errors never cross the checker boundary: every backend folds them
//! into a conservative "unavailable" result. They exist so protocol and
//! configuration code can use `?` and so the failure reason can be logged.

use std::fmt;
use std::time::Duration;

/// Main error type for lookups and configuration.
#[derive(Debug, Clone)]
pub enum DomainCheckError {
    /// Invalid domain name format
    InvalidDomain { domain: String, reason: String },

    /// Network-related errors (connection refused, reset, DNS, ...)
    NetworkError {
        message: String,
        source: Option<String>,
    },

    /// WHOIS protocol specific errors
    WhoisError { domain: String, message: String },

    /// Response could not be decoded or parsed
    ParseError {
        message: String,
        content: Option<String>,
    },

    /// Configuration errors (invalid settings, etc.)
    ConfigError { message: String },

    /// File I/O errors when reading domain lists or config files
    FileError { path: String, message: String },

    /// Timeout errors when operations take too long
    Timeout {
        operation: String,
        duration: Duration,
    },

    /// Rate limiting errors when servers reject requests
    RateLimited { service: String, message: String },

    /// Generic internal errors that don't fit other categories
    Internal { message: String },
}

impl DomainCheckError {
    /// Create a new invalid domain error.
    pub fn invalid_domain<D: Into<String>, R: Into<String>>(domain: D, reason: R) -> Self {
        Self::InvalidDomain {
            domain: domain.into(),
            reason: reason.into(),
        }
    }

    /// Create a new network error.
    pub fn network<M: Into<String>>(message: M) -> Self {
        Self::NetworkError {
            message: message.into(),
            source: None,
        }
    }

    /// Create a new network error with source information.
    pub fn network_with_source<M: Into<String>, S: Into<String>>(message: M, source: S) -> Self {
        Self::NetworkError {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Create a new WHOIS error.
    pub fn whois<D: Into<String>, M: Into<String>>(domain: D, message: M) -> Self {
        Self::WhoisError {
            domain: domain.into(),
            message: message.into(),
        }
    }

    /// Create a new parse error, keeping a short excerpt of the offending content.
    pub fn parse<M: Into<String>>(message: M, content: Option<&str>) -> Self {
        Self::ParseError {
            message: message.into(),
            content: content.map(|c| c.chars().take(200).collect()),
        }
    }

    /// Create a new configuration error.
    pub fn config<M: Into<String>>(message: M) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create a new timeout error.
    pub fn timeout<O: Into<String>>(operation: O, duration: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    /// Create a new rate-limit error.
    pub fn rate_limited<S: Into<String>, M: Into<String>>(service: S, message: M) -> Self {
        Self::RateLimited {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Create a new internal error.
    pub fn internal<M: Into<String>>(message: M) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Create a new file error.
    pub fn file_error<P: Into<String>, M: Into<String>>(path: P, message: M) -> Self {
        Self::FileError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Whether this error came from the transport rather than from bad input.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::NetworkError { .. }
                | Self::Timeout { .. }
                | Self::RateLimited { .. }
                | Self::ParseError { .. }
                | Self::WhoisError { .. }
        )
    }
}

impl fmt::Display for DomainCheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDomain { domain, reason } => {
                write!(f, "Invalid domain '{}': {}", domain, reason)
            }
            Self::NetworkError { message, source } => {
                if let Some(source) = source {
                    write!(f, "Network error: {} (source: {})", message, source)
                } else {
                    write!(f, "Network error: {}", message)
                }
            }
            Self::WhoisError { domain, message } => {
                write!(f, "WHOIS error for '{}': {}", domain, message)
            }
            Self::ParseError { message, content: _ } => {
                write!(f, "Parse error: {}", message)
            }
            Self::ConfigError { message } => {
                write!(f, "Configuration error: {}", message)
            }
            Self::FileError { path, message } => {
                write!(f, "File error at '{}': {}", path, message)
            }
            Self::Timeout {
                operation,
                duration,
            } => {
                write!(f, "Timeout after {:?} during: {}", duration, operation)
            }
            Self::RateLimited { service, message } => {
                write!(f, "Rate limited by {}: {}", service, message)
            }
            Self::Internal { message } => {
                write!(f, "Internal error: {}", message)
            }
        }
    }
}

impl std::error::Error for DomainCheckError {}

impl From<std::io::Error> for DomainCheckError {
    fn from(err: std::io::Error) -> Self {
        use std::io::ErrorKind;

        match err.kind() {
            ErrorKind::ConnectionRefused
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::NotConnected
            | ErrorKind::BrokenPipe
            | ErrorKind::AddrNotAvailable => {
                Self::network_with_source("Connection failed", err.to_string())
            }
            ErrorKind::TimedOut => Self::timeout("socket I/O", Duration::ZERO),
            _ => Self::Internal {
                message: format!("I/O error: {}", err),
            },
        }
    }
}

impl From<regex::Error> for DomainCheckError {
    fn from(err: regex::Error) -> Self {
        Self::Internal {
            message: format!("Regex error: {}", err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = DomainCheckError::whois("example.com", "no server");
        assert_eq!(err.to_string(), "WHOIS error for 'example.com': no server");

        let err = DomainCheckError::timeout("WHOIS query", Duration::from_secs(5));
        assert_eq!(err.to_string(), "Timeout after 5s during: WHOIS query");

        let err = DomainCheckError::network_with_source("Connection failed", "refused");
        assert_eq!(
            err.to_string(),
            "Network error: Connection failed (source: refused)"
        );
    }

    #[test]
    fn test_io_error_mapping() {
        let refused = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "nope");
        assert!(matches!(
            DomainCheckError::from(refused),
            DomainCheckError::NetworkError { .. }
        ));

        let other = std::io::Error::new(std::io::ErrorKind::Other, "weird");
        assert!(matches!(
            DomainCheckError::from(other),
            DomainCheckError::Internal { .. }
        ));
    }

    #[test]
    fn test_parse_error_truncates_content() {
        let long = "x".repeat(1000);
        match DomainCheckError::parse("bad", Some(&long)) {
            DomainCheckError::ParseError { content, .. } => {
                assert_eq!(content.map(|c| c.len()), Some(200));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_transport_classification() {
        assert!(DomainCheckError::rate_limited("whois.nic.io", "slow down").is_transport());
        assert!(!DomainCheckError::config("bad").is_transport());
        assert!(!DomainCheckError::invalid_domain("x", "no dot").is_transport());
    }
}
