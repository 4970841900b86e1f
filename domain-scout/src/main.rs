//! Domain Scout CLI Application
//!
//! Checks a batch of candidate domains for availability and estimated price.
//! A thin shell over domain-scout-lib: argument parsing, configuration
//! layering, logging setup and output formatting.

mod ui;

use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::Parser;
use domain_scout_lib::{
    expand_domain_inputs, load_env_config, parse_duration_string, resolve_check_config,
    BatchSummary, CheckConfig, CheckResult, ConfigManager, DomainChecker, FileConfig,
};
use std::error::Error;
use std::process;
use std::time::Instant;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

/// CLI arguments for domain-scout
#[derive(Parser, Debug)]
#[command(name = "domain-scout")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Check domain availability and estimated registration prices")]
#[command(
    long_about = "Check a batch of candidate domains for availability over WHOIS and attach an estimated registration price.\n\nDomains that cannot be verified are always reported as taken."
)]
#[command(styles = STYLES)]
pub struct Args {
    /// Domain names to check (base names or FQDNs)
    #[arg(value_name = "DOMAINS", help_heading = "Domain Selection")]
    pub domains: Vec<String>,

    /// TLDs for base names (comma-separated or multiple -t flags)
    #[arg(short = 't', long = "tld", value_name = "TLD", value_delimiter = ',', action = clap::ArgAction::Append, help_heading = "Domain Selection")]
    pub tlds: Option<Vec<String>>,

    /// Read domains from a file (one per line, # comments)
    #[arg(short = 'f', long = "file", value_name = "FILE", help_heading = "Domain Selection")]
    pub file: Option<String>,

    /// Use the offline checker (deterministic, no network)
    #[arg(long = "mock", help_heading = "Checking")]
    pub mock: bool,

    /// Lookups per window (1-100, default depends on backend)
    #[arg(short = 'c', long = "concurrency", value_name = "N", help_heading = "Checking")]
    pub concurrency: Option<usize>,

    /// Pause between windows (e.g. 500ms, 1s)
    #[arg(long = "delay", value_name = "DURATION", help_heading = "Checking")]
    pub delay: Option<String>,

    /// Timeout for one WHOIS lookup (e.g. 5s)
    #[arg(long = "timeout", value_name = "DURATION", help_heading = "Checking")]
    pub timeout: Option<String>,

    /// Output results as a JSON array
    #[arg(short = 'j', long = "json", help_heading = "Output Format")]
    pub json: bool,

    /// Output results as CSV
    #[arg(long = "csv", help_heading = "Output Format")]
    pub csv: bool,

    /// Print each window's results as soon as it completes
    #[arg(long = "streaming", help_heading = "Output Format")]
    pub streaming: bool,

    /// Use specific config file instead of automatic discovery
    #[arg(long = "config", value_name = "FILE", help_heading = "Configuration")]
    pub config: Option<String>,

    /// Debug logging
    #[arg(short = 'd', long = "debug", help_heading = "Configuration")]
    pub debug: bool,

    /// Verbose logging
    #[arg(short = 'v', long = "verbose", help_heading = "Configuration")]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
    Csv,
}

/// Everything resolved from files, environment and flags before checking.
#[derive(Debug)]
struct RunSettings {
    check: CheckConfig,
    format: OutputFormat,
    json_pretty: bool,
}

#[tokio::main]
async fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            process::exit(code);
        }
    };

    init_logging(&args);

    if let Err(e) = validate_args(&args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    if let Err(e) = run_domain_check(args).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Install the stderr tracing subscriber. `RUST_LOG` wins over the flags.
fn init_logging(args: &Args) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_log_level(args)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn default_log_level(args: &Args) -> &'static str {
    if args.debug {
        "debug"
    } else if args.verbose {
        "info"
    } else {
        "warn"
    }
}

/// Validate command line arguments
fn validate_args(args: &Args) -> Result<(), String> {
    if args.domains.is_empty() && args.file.is_none() {
        return Err("You must specify domain names or a file with --file".to_string());
    }

    if args.json && args.csv {
        return Err("Cannot specify multiple output formats (--json, --csv)".to_string());
    }

    if args.streaming && (args.json || args.csv) {
        return Err("Cannot use --streaming with --json or --csv".to_string());
    }

    if let Some(concurrency) = args.concurrency {
        if concurrency == 0 || concurrency > 100 {
            return Err("Concurrency must be between 1 and 100".to_string());
        }
    }

    for (flag, value) in [("--delay", &args.delay), ("--timeout", &args.timeout)] {
        if let Some(value) = value {
            if parse_duration_string(value).is_none() {
                return Err(format!(
                    "Invalid {} '{}'. Use a format like '500ms', '5s' or '2m'",
                    flag, value
                ));
            }
        }
    }

    Ok(())
}

async fn run_domain_check(args: Args) -> Result<(), Box<dyn Error>> {
    let settings = build_settings(&args)?;
    let domains = get_domains_to_check(&args)?;

    let checker = DomainChecker::with_config(settings.check.clone());
    info!(
        backend = %checker.backend_kind(),
        domains = domains.len(),
        "starting check"
    );

    if args.streaming {
        run_streaming_check(&checker, &domains).await;
        return Ok(());
    }

    run_batch_check(&checker, &domains, &settings).await
}

/// Resolve configuration.
///
/// Precedence order (highest to lowest):
/// 1. CLI arguments
/// 2. Environment variables (DOMAIN_CHECKER_MOCK, MAINREG_*, DC_*)
/// 3. Config files (explicit --config/DC_CONFIG, or discovered local > global > XDG)
/// 4. Built-in defaults
fn build_settings(args: &Args) -> Result<RunSettings, Box<dyn Error>> {
    let env_config = load_env_config();
    let manager = ConfigManager::new(args.verbose);

    let file_config: FileConfig = match args.config.as_ref().or(env_config.config.as_ref()) {
        Some(path) => manager.load_file(path)?,
        None => manager.discover_and_load()?,
    };

    let check = apply_cli_args(resolve_check_config(&file_config, &env_config)?, args);
    debug!(?check, "resolved configuration");

    let output = file_config.output.unwrap_or_default();
    let format = if args.json {
        OutputFormat::Json
    } else if args.csv {
        OutputFormat::Csv
    } else {
        match output.default_format.as_deref().map(str::to_lowercase).as_deref() {
            Some("json") if !args.streaming => OutputFormat::Json,
            Some("csv") if !args.streaming => OutputFormat::Csv,
            _ => OutputFormat::Text,
        }
    };

    Ok(RunSettings {
        check,
        format,
        json_pretty: output.json_pretty.unwrap_or(true),
    })
}

/// Apply explicit flags on top of the file/environment configuration.
fn apply_cli_args(mut config: CheckConfig, args: &Args) -> CheckConfig {
    if args.mock {
        config = config.with_offline(true);
    }
    if let Some(concurrency) = args.concurrency {
        config = config.with_concurrency(concurrency);
    }
    if let Some(delay) = args.delay.as_deref().and_then(parse_duration_string) {
        config = config.with_inter_batch_delay(delay);
    }
    if let Some(timeout) = args.timeout.as_deref().and_then(parse_duration_string) {
        config = config.with_whois_timeout(timeout);
    }
    config
}

/// Collect positional and file domains, then expand base names with TLDs.
fn get_domains_to_check(args: &Args) -> Result<Vec<String>, Box<dyn Error>> {
    let mut raw = args.domains.clone();
    if let Some(path) = &args.file {
        raw.extend(read_domains_from_file(path)?);
    }

    let domains = expand_domain_inputs(&raw, &args.tlds);
    if domains.is_empty() {
        return Err("No valid domains to check".into());
    }
    Ok(domains)
}

fn read_domains_from_file(file_path: &str) -> Result<Vec<String>, Box<dyn Error>> {
    let content = std::fs::read_to_string(file_path)
        .map_err(|e| format!("Cannot read {}: {}", file_path, e))?;

    let domains: Vec<String> = content
        .lines()
        .map(|line| line.split('#').next().unwrap_or("").trim())
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect();

    if domains.is_empty() {
        return Err(format!("No domains found in {}", file_path).into());
    }
    Ok(domains)
}

/// Print every window's results as it completes, then a summary.
async fn run_streaming_check(checker: &DomainChecker, domains: &[String]) {
    ui::print_header(domains.len(), checker.backend_kind(), checker.batch_config());

    let total = domains.len();
    let mut completed = 0usize;
    let start_time = Instant::now();

    let results = checker
        .check_domains_with_progress(domains, |_, window| {
            for result in window {
                completed += 1;
                ui::print_result(result, Some((completed, total)));
            }
        })
        .await;

    println!();
    ui::print_summary(&BatchSummary::from_results(&results), start_time.elapsed());
}

/// Collect all results first, then print them in the chosen format.
async fn run_batch_check(
    checker: &DomainChecker,
    domains: &[String],
    settings: &RunSettings,
) -> Result<(), Box<dyn Error>> {
    let is_text = settings.format == OutputFormat::Text;

    let spinner = if is_text && domains.len() > 1 {
        ui::Spinner::start(format!("Checking {} domains...", domains.len()))
    } else {
        None
    };

    let start_time = Instant::now();
    let results = checker.check_domains(domains).await;
    let duration = start_time.elapsed();

    if let Some(s) = spinner {
        s.stop().await;
    }

    match settings.format {
        OutputFormat::Json => println!("{}", format_json(&results, settings.json_pretty)?),
        OutputFormat::Csv => print!("{}", format_csv(&results)),
        OutputFormat::Text => display_text_results(&results, duration),
    }

    Ok(())
}

fn format_json(results: &[CheckResult], pretty: bool) -> Result<String, serde_json::Error> {
    if pretty {
        serde_json::to_string_pretty(results)
    } else {
        serde_json::to_string(results)
    }
}

fn format_csv(results: &[CheckResult]) -> String {
    let mut out = String::from("domain,available,price,currency\n");
    for result in results {
        out.push_str(&format!(
            "{},{},{:.2},{}\n",
            result.domain, result.available, result.price, result.currency
        ));
    }
    out
}

fn display_text_results(results: &[CheckResult], duration: std::time::Duration) {
    for result in results {
        ui::print_result(result, None);
    }

    if results.len() > 1 {
        println!();
        ui::print_summary(&BatchSummary::from_results(results), duration);
    }
}
