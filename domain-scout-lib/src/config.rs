//! Configuration file parsing and management.
//!
//! Settings come from TOML files and `DC_*`/`MAINREG_*` environment
//! variables. Files are merged field by field (XDG, then global, then local),
//! the environment overrides files, and the result is resolved once into an
//! immutable [`CheckConfig`]. CLI flags are applied on top by the caller.

use crate::error::DomainCheckError;
use crate::types::{CheckConfig, RegistrarCredentials};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Configuration loaded from TOML files.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct FileConfig {
    /// Backend selection
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checker: Option<CheckerSection>,

    /// Windowing parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch: Option<BatchSection>,

    /// Live lookup settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whois: Option<WhoisSection>,

    /// Output formatting preferences
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct CheckerSection {
    /// Use the offline double
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mock: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub registrar_api_key: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub registrar_api_secret: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct BatchSection {
    /// Window size, 1-100
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<usize>,

    /// Pause between windows (e.g. "500ms", "1s")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct WhoisSection {
    /// Timeout for one complete lookup (e.g. "5s")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,
}

/// Output formatting configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct OutputConfig {
    /// One of "text", "json", "csv"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_format: Option<String>,

    /// Pretty-print JSON by default
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json_pretty: Option<bool>,
}

const OUTPUT_FORMATS: &[&str] = &["text", "json", "csv"];

/// Configuration discovery and loading functionality.
pub struct ConfigManager {
    /// Report every loaded file at info level instead of debug
    pub verbose: bool,
}

impl ConfigManager {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Load and validate one configuration file.
    pub fn load_file<P: AsRef<Path>>(&self, path: P) -> Result<FileConfig, DomainCheckError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(DomainCheckError::file_error(
                path.to_string_lossy(),
                "Configuration file not found",
            ));
        }

        let content = fs::read_to_string(path).map_err(|e| {
            DomainCheckError::file_error(
                path.to_string_lossy(),
                format!("Failed to read configuration file: {}", e),
            )
        })?;

        let config: FileConfig = toml::from_str(&content)
            .map_err(|e| DomainCheckError::config(format!("Failed to parse TOML configuration: {}", e)))?;

        validate_config(&config)?;

        Ok(config)
    }

    /// Discover and load configuration files in precedence order.
    ///
    /// A discovered file that fails to parse or validate is an error.
    pub fn discover_and_load(&self) -> Result<FileConfig, DomainCheckError> {
        let candidates = [
            self.get_xdg_config_path(),
            self.get_global_config_path(),
            self.get_local_config_path(),
        ];

        let mut merged = FileConfig::default();
        for path in candidates.into_iter().flatten() {
            let config = self.load_file(&path)?;
            if self.verbose {
                info!(path = %path.display(), "loaded config file");
            } else {
                debug!(path = %path.display(), "loaded config file");
            }
            merged = merge_configs(merged, config);
        }

        Ok(merged)
    }

    fn get_local_config_path(&self) -> Option<PathBuf> {
        ["./domain-scout.toml", "./.domain-scout.toml"]
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    fn get_global_config_path(&self) -> Option<PathBuf> {
        let home = env::var_os("HOME")?;
        [".domain-scout.toml", "domain-scout.toml"]
            .iter()
            .map(|name| Path::new(&home).join(name))
            .find(|path| path.exists())
    }

    fn get_xdg_config_path(&self) -> Option<PathBuf> {
        let config_dir = env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| env::var_os("HOME").map(|home| Path::new(&home).join(".config")))?;

        let path = config_dir.join("domain-scout").join("config.toml");
        path.exists().then_some(path)
    }
}

/// Merge two configurations, `higher` winning field by field.
pub fn merge_configs(lower: FileConfig, higher: FileConfig) -> FileConfig {
    FileConfig {
        checker: merge_section(lower.checker, higher.checker, |lo, hi| CheckerSection {
            mock: hi.mock.or(lo.mock),
            registrar_api_key: hi.registrar_api_key.or(lo.registrar_api_key),
            registrar_api_secret: hi.registrar_api_secret.or(lo.registrar_api_secret),
        }),
        batch: merge_section(lower.batch, higher.batch, |lo, hi| BatchSection {
            concurrency: hi.concurrency.or(lo.concurrency),
            delay: hi.delay.or(lo.delay),
        }),
        whois: merge_section(lower.whois, higher.whois, |lo, hi| WhoisSection {
            timeout: hi.timeout.or(lo.timeout),
        }),
        output: merge_section(lower.output, higher.output, |lo, hi| OutputConfig {
            default_format: hi.default_format.or(lo.default_format),
            json_pretty: hi.json_pretty.or(lo.json_pretty),
        }),
    }
}

fn merge_section<T>(lower: Option<T>, higher: Option<T>, merge: impl FnOnce(T, T) -> T) -> Option<T> {
    match (lower, higher) {
        (Some(lo), Some(hi)) => Some(merge(lo, hi)),
        (lo, hi) => hi.or(lo),
    }
}

/// Validate a configuration for out-of-range or malformed values.
fn validate_config(config: &FileConfig) -> Result<(), DomainCheckError> {
    if let Some(batch) = &config.batch {
        if let Some(concurrency) = batch.concurrency {
            if concurrency == 0 || concurrency > 100 {
                return Err(DomainCheckError::config("Concurrency must be between 1 and 100"));
            }
        }
        if let Some(delay) = &batch.delay {
            require_duration("batch.delay", delay)?;
        }
    }

    if let Some(timeout) = config.whois.as_ref().and_then(|w| w.timeout.as_ref()) {
        require_duration("whois.timeout", timeout)?;
    }

    if let Some(format) = config.output.as_ref().and_then(|o| o.default_format.as_ref()) {
        if !OUTPUT_FORMATS.contains(&format.to_lowercase().as_str()) {
            return Err(DomainCheckError::config(format!(
                "Invalid output.default_format '{}'. Use one of: text, json, csv",
                format
            )));
        }
    }

    Ok(())
}

fn require_duration(field: &str, value: &str) -> Result<Duration, DomainCheckError> {
    parse_duration_string(value).ok_or_else(|| {
        DomainCheckError::config(format!(
            "Invalid {} '{}'. Use a format like '500ms', '5s' or '2m'",
            field, value
        ))
    })
}

/// Environment variable configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvConfig {
    pub mock: Option<bool>,
    pub registrar_api_key: Option<String>,
    pub registrar_api_secret: Option<String>,
    pub concurrency: Option<usize>,
    pub batch_delay: Option<Duration>,
    pub timeout: Option<Duration>,
    /// Explicit config file path
    pub config: Option<String>,
}

/// Load configuration from the process environment.
///
/// Invalid values are logged as warnings and ignored.
pub fn load_env_config() -> EnvConfig {
    EnvConfig::from_lookup(|name| env::var(name).ok())
}

impl EnvConfig {
    /// Build from any variable source; `lookup` returns a variable's value.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut env_config = EnvConfig::default();

        if let Some(val) = lookup("DOMAIN_CHECKER_MOCK") {
            match parse_bool(&val) {
                Some(mock) => env_config.mock = Some(mock),
                None => warn!(value = %val, "invalid DOMAIN_CHECKER_MOCK, use true/false"),
            }
        }

        env_config.registrar_api_key = lookup("MAINREG_API_KEY").filter(|v| !v.trim().is_empty());
        env_config.registrar_api_secret = lookup("MAINREG_API_SECRET").filter(|v| !v.trim().is_empty());

        if let Some(val) = lookup("DC_CONCURRENCY") {
            match val.trim().parse::<usize>() {
                Ok(concurrency) if (1..=100).contains(&concurrency) => {
                    env_config.concurrency = Some(concurrency)
                }
                _ => warn!(value = %val, "invalid DC_CONCURRENCY, must be 1-100"),
            }
        }

        if let Some(val) = lookup("DC_BATCH_DELAY") {
            match parse_duration_string(&val) {
                Some(delay) => env_config.batch_delay = Some(delay),
                None => warn!(value = %val, "invalid DC_BATCH_DELAY, use a format like '500ms' or '1s'"),
            }
        }

        if let Some(val) = lookup("DC_TIMEOUT") {
            match parse_duration_string(&val) {
                Some(timeout) => env_config.timeout = Some(timeout),
                None => warn!(value = %val, "invalid DC_TIMEOUT, use a format like '5s' or '2m'"),
            }
        }

        env_config.config = lookup("DC_CONFIG").filter(|v| !v.trim().is_empty());

        env_config
    }
}

/// Resolve file and environment layers into one `CheckConfig`.
///
/// Environment values win over file values. A registrar key without a
/// secret, or a secret without a key, is an error.
pub fn resolve_check_config(file: &FileConfig, env: &EnvConfig) -> Result<CheckConfig, DomainCheckError> {
    let checker = file.checker.clone().unwrap_or_default();
    let batch = file.batch.clone().unwrap_or_default();

    let mut config = CheckConfig::default();

    if let Some(mock) = env.mock.or(checker.mock) {
        config = config.with_offline(mock);
    }

    let key = env
        .registrar_api_key
        .clone()
        .or(checker.registrar_api_key)
        .filter(|v| !v.trim().is_empty());
    let secret = env
        .registrar_api_secret
        .clone()
        .or(checker.registrar_api_secret)
        .filter(|v| !v.trim().is_empty());
    match (key.is_some(), secret.is_some()) {
        (true, false) => {
            return Err(DomainCheckError::config(
                "Registrar API key is set but the API secret is missing",
            ))
        }
        (false, true) => {
            return Err(DomainCheckError::config(
                "Registrar API secret is set but the API key is missing",
            ))
        }
        _ => {}
    }
    if let Some(credentials) = RegistrarCredentials::from_parts(key, secret) {
        config = config.with_registrar(credentials);
    }

    if let Some(concurrency) = env.concurrency.or(batch.concurrency) {
        config = config.with_concurrency(concurrency);
    }

    let delay = match env.batch_delay {
        Some(delay) => Some(delay),
        None => batch.delay.as_deref().map(|d| require_duration("batch.delay", d)).transpose()?,
    };
    if let Some(delay) = delay {
        config = config.with_inter_batch_delay(delay);
    }

    let file_timeout = file.whois.as_ref().and_then(|w| w.timeout.as_deref());
    let timeout = match env.timeout {
        Some(timeout) => Some(timeout),
        None => file_timeout.map(|t| require_duration("whois.timeout", t)).transpose()?,
    };
    if let Some(timeout) = timeout {
        config = config.with_whois_timeout(timeout);
    }

    Ok(config)
}

/// Parse a duration like "500ms", "5s", "2m" or a bare number of seconds.
pub fn parse_duration_string(value: &str) -> Option<Duration> {
    let value = value.trim().to_lowercase();

    if let Some(ms) = value.strip_suffix("ms") {
        ms.trim().parse::<u64>().ok().map(Duration::from_millis)
    } else if let Some(secs) = value.strip_suffix('s') {
        secs.trim().parse::<u64>().ok().map(Duration::from_secs)
    } else if let Some(mins) = value.strip_suffix('m') {
        mins.trim()
            .parse::<u64>()
            .ok()
            .and_then(|m| m.checked_mul(60))
            .map(Duration::from_secs)
    } else {
        value.parse::<u64>().ok().map(Duration::from_secs)
    }
}

/// Parse the boolean spellings accepted in environment variables.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
