//! Text-mode display logic for the domain-scout CLI.
//!
//! Colored result lines, spinner animation, progress counters, headers and
//! summaries. Everything decorative goes through the `console` crate; the
//! spinner writes to stderr so stdout stays clean for piping.

use console::{pad_str, style, Alignment, Term};
use domain_scout_lib::{BackendKind, BatchConfig, BatchSummary, CheckResult, CURRENCY};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

const DOMAIN_WIDTH: usize = 30;

// ── Spinner ──────────────────────────────────────────────────────────────────

const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// An async braille-dot spinner on stderr.
pub struct Spinner {
    running: Arc<AtomicBool>,
    handle: Option<tokio::task::JoinHandle<()>>,
}

impl Spinner {
    /// Start a spinner with the given message, or `None` if stderr is not a terminal.
    pub fn start(message: String) -> Option<Self> {
        if !Term::stderr().is_term() {
            return None;
        }

        let running = Arc::new(AtomicBool::new(true));
        let running_clone = running.clone();

        let handle = tokio::spawn(async move {
            let term = Term::stderr();
            let mut idx = 0usize;
            while running_clone.load(Ordering::Relaxed) {
                let frame = SPINNER_FRAMES[idx % SPINNER_FRAMES.len()];
                let _ = term.clear_line();
                let _ = term.write_str(&format!("{} {}", style(frame).cyan(), message));
                idx += 1;
                tokio::time::sleep(Duration::from_millis(80)).await;
            }
            let _ = term.clear_line();
        });

        Some(Self {
            running,
            handle: Some(handle),
        })
    }

    /// Stop the spinner and clear the line.
    pub async fn stop(mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(h) = self.handle.take() {
            let _ = h.await;
        }
    }
}

// ── Header ───────────────────────────────────────────────────────────────────

/// Print a styled header at the start of a text run.
pub fn print_header(domain_count: usize, backend: BackendKind, batch: BatchConfig) {
    println!(
        "{} {} {}",
        style("domain-scout").bold(),
        style(format!("v{}", env!("CARGO_PKG_VERSION"))).dim(),
        style(format!(
            "· Checking {} domain{}",
            domain_count,
            plural(domain_count)
        ))
        .dim(),
    );
    println!(
        "{}",
        style(format!(
            "Backend: {} | Concurrency: {} | Pause: {}ms",
            backend,
            batch.concurrency,
            batch.inter_batch_delay.as_millis()
        ))
        .dim()
    );
    println!();
}

// ── Result lines ─────────────────────────────────────────────────────────────

/// Price with two decimals and its currency, e.g. `12.00 EUR`.
pub fn format_price(price: f64, currency: &str) -> String {
    format!("{:.2} {}", price, currency)
}

/// One result line. `counter` adds a `[current/total]` prefix.
pub fn format_result_line(result: &CheckResult, counter: Option<(usize, usize)>) -> String {
    let padded_domain = pad_str(&result.domain, DOMAIN_WIDTH, Alignment::Left, Some(".."));

    let prefix = match counter {
        Some((cur, total)) => format!("{} ", style(format!("[{}/{}]", cur, total)).dim()),
        None => String::new(),
    };

    let status = if result.available {
        style(pad_str("AVAILABLE", 9, Alignment::Left, None).to_string())
            .green()
            .bold()
    } else {
        style(pad_str("TAKEN", 9, Alignment::Left, None).to_string())
            .red()
            .bold()
    };

    format!(
        "  {}{}  {}  {}",
        prefix,
        style(&padded_domain).white(),
        status,
        style(format_price(result.price, &result.currency)).dim(),
    )
}

pub fn print_result(result: &CheckResult, counter: Option<(usize, usize)>) {
    println!("{}", format_result_line(result, counter));
}

// ── Summary ──────────────────────────────────────────────────────────────────

/// Print the final summary bar with colored counts.
pub fn print_summary(summary: &BatchSummary, duration: Duration) {
    println!(
        "  {}",
        style("────────────────────────────────────────────────────").dim()
    );
    println!("  {}", format_summary(summary, duration));
}

pub fn format_summary(summary: &BatchSummary, duration: Duration) -> String {
    format!(
        "{} domain{} in {:.1}s  {}  {}  {}  {}  {}  {}",
        style(summary.total).bold(),
        plural(summary.total),
        duration.as_secs_f64(),
        style("|").dim(),
        style(format!("{} available", summary.available)).green(),
        style("|").dim(),
        style(format!("{} taken", summary.taken)).red(),
        style("|").dim(),
        style(format!(
            "{} to register all available",
            format_price(summary.available_price_total, CURRENCY)
        ))
        .cyan(),
    )
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use console::strip_ansi_codes;

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(12.0, "EUR"), "12.00 EUR");
        assert_eq!(format_price(7.5, "EUR"), "7.50 EUR");
    }

    #[test]
    fn test_result_line_available() {
        let line = format_result_line(&CheckResult::new("brandly.io", true), None);
        let plain = strip_ansi_codes(&line);
        assert!(plain.contains("brandly.io"));
        assert!(plain.contains("AVAILABLE"));
        assert!(plain.contains("35.00 EUR"));
    }

    #[test]
    fn test_result_line_taken_with_counter() {
        let line = format_result_line(&CheckResult::new("example.com", false), Some((3, 8)));
        let plain = strip_ansi_codes(&line);
        assert!(plain.contains("[3/8]"));
        assert!(plain.contains("TAKEN"));
        assert!(plain.contains("12.00 EUR"));
    }

    #[test]
    fn test_long_domain_is_truncated() {
        let long = format!("{}.com", "x".repeat(60));
        let line = format_result_line(&CheckResult::new(long.as_str(), true), None);
        assert!(strip_ansi_codes(&line).contains(".."));
    }

    #[test]
    fn test_summary_text() {
        let results = vec![
            CheckResult::new("brandly.io", true),
            CheckResult::new("nova.ai", false),
            CheckResult::new("foo.rare", true),
        ];
        let summary = BatchSummary::from_results(&results);
        let plain = strip_ansi_codes(&format_summary(&summary, Duration::from_millis(1500))).to_string();
        assert!(plain.starts_with("3 domains in 1.5s"));
        assert!(plain.contains("2 available"));
        assert!(plain.contains("1 taken"));
        assert!(plain.contains("50.00 EUR"));
    }
}
