// domain-scout/tests/cli_integration.rs

//! End-to-end CLI tests. Everything runs against the offline checker so no
//! test touches the network.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::{NamedTempFile, TempDir};

const SCOUT_ENV: &[&str] = &[
    "DOMAIN_CHECKER_MOCK",
    "MAINREG_API_KEY",
    "MAINREG_API_SECRET",
    "DC_CONCURRENCY",
    "DC_BATCH_DELAY",
    "DC_TIMEOUT",
    "DC_CONFIG",
    "RUST_LOG",
];

/// Command isolated from the caller's config files and environment.
fn scout() -> (Command, TempDir) {
    let home = TempDir::new().expect("Failed to create temp dir");
    let mut cmd = Command::cargo_bin("domain-scout").unwrap();
    cmd.current_dir(home.path())
        .env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join(".config"));
    for var in SCOUT_ENV {
        cmd.env_remove(var);
    }
    (cmd, home)
}

/// Helper to create a test domains file
fn create_test_domains_file(lines: &[&str]) -> NamedTempFile {
    let file = NamedTempFile::new().expect("Failed to create temp file");
    fs::write(file.path(), lines.join("\n")).expect("Failed to write to temp file");
    file
}

#[test]
fn test_help_lists_flags() {
    let (mut cmd, _home) = scout();
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("--mock"))
        .stdout(predicate::str::contains("--concurrency"))
        .stdout(predicate::str::contains("--streaming"))
        .stdout(predicate::str::contains("--csv"));
}

#[test]
fn test_no_domains_is_an_error() {
    let (mut cmd, _home) = scout();

    cmd.assert()
        .code(1)
        .stderr(predicate::str::contains("You must specify domain names"));
}

#[test]
fn test_conflicting_formats_rejected() {
    let (mut cmd, _home) = scout();
    cmd.args(["example.com", "--json", "--csv"]);

    cmd.assert()
        .code(1)
        .stderr(predicate::str::contains("multiple output formats"));
}

#[test]
fn test_unknown_flag_exits_with_one() {
    let (mut cmd, _home) = scout();
    cmd.args(["example.com", "--no-such-flag"]);

    cmd.assert().code(1);
}

#[test]
fn test_invalid_concurrency_rejected() {
    let (mut cmd, _home) = scout();
    cmd.args(["example.com", "--mock", "-c", "0"]);

    cmd.assert()
        .code(1)
        .stderr(predicate::str::contains("between 1 and 100"));
}

#[test]
fn test_mock_json_output() {
    let (mut cmd, _home) = scout();
    cmd.args(["example.com", "nova.ai", "--mock", "--json"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(r#""domain": "example.com""#))
        .stdout(predicate::str::contains(r#""available": true"#))
        .stdout(predicate::str::contains(r#""domain": "nova.ai""#))
        .stdout(predicate::str::contains(r#""price": 45.0"#))
        .stdout(predicate::str::contains(r#""currency": "EUR""#));
}

#[test]
fn test_mock_csv_output_keeps_order() {
    let (mut cmd, _home) = scout();
    cmd.args([
        "swiftledger.com",
        "brandly.io",
        "foo.rare",
        "--mock",
        "--csv",
        "-c",
        "2",
        "--delay",
        "0ms",
    ]);

    cmd.assert().success().stdout(
        "domain,available,price,currency\n\
         swiftledger.com,false,12.00,EUR\n\
         brandly.io,true,35.00,EUR\n\
         foo.rare,false,15.00,EUR\n",
    );
}

#[test]
fn test_base_names_expand_with_tlds() {
    let (mut cmd, _home) = scout();
    cmd.args(["nova", "-t", "ai,io", "--mock", "--csv"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("nova.ai,false,45.00,EUR"))
        .stdout(predicate::str::contains("nova.io,"));
}

#[test]
fn test_domains_from_file() {
    let file = create_test_domains_file(&["# shortlist", "brandly.io", "", "example.com # classic"]);
    let (mut cmd, _home) = scout();
    cmd.args(["--file", file.path().to_str().unwrap(), "--mock", "--csv"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("brandly.io,true,35.00,EUR"))
        .stdout(predicate::str::contains("example.com,true,12.00,EUR"));
}

#[test]
fn test_text_output_with_summary() {
    let (mut cmd, _home) = scout();
    cmd.args(["brandly.io", "nova.ai", "--mock", "--delay", "0ms"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("AVAILABLE"))
        .stdout(predicate::str::contains("TAKEN"))
        .stdout(predicate::str::contains("35.00 EUR"))
        .stdout(predicate::str::contains("1 available"))
        .stdout(predicate::str::contains("1 taken"));
}

#[test]
fn test_streaming_shows_progress() {
    let (mut cmd, _home) = scout();
    cmd.args([
        "a1.com", "a2.com", "a3.com", "--mock", "--streaming", "-c", "2", "--delay", "0ms",
    ]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Backend: Offline"))
        .stdout(predicate::str::contains("[1/3]"))
        .stdout(predicate::str::contains("[3/3]"))
        .stdout(predicate::str::contains("3 domains"));
}

#[test]
fn test_config_file_selects_offline_and_csv() {
    let (mut cmd, home) = scout();
    let config_path = home.path().join("scout.toml");
    fs::write(
        &config_path,
        "[checker]\nmock = true\n\n[batch]\ndelay = \"0ms\"\n\n[output]\ndefault_format = \"csv\"\n",
    )
    .unwrap();
    cmd.args(["brandly.io", "--config", config_path.to_str().unwrap()]);

    cmd.assert()
        .success()
        .stdout("domain,available,price,currency\nbrandly.io,true,35.00,EUR\n");
}

#[test]
fn test_local_config_is_discovered() {
    let (mut cmd, home) = scout();
    fs::write(
        home.path().join("domain-scout.toml"),
        "[checker]\nmock = true\n[output]\ndefault_format = \"json\"\njson_pretty = false\n",
    )
    .unwrap();
    cmd.arg("nova.ai");

    cmd.assert().success().stdout(
        predicate::str::contains(r#"{"domain":"nova.ai","available":false,"price":45.0,"currency":"EUR"}"#),
    );
}

#[test]
fn test_mock_from_environment() {
    let (mut cmd, _home) = scout();
    cmd.env("DOMAIN_CHECKER_MOCK", "true")
        .args(["swiftledger.com", "--csv"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("swiftledger.com,false,12.00,EUR"));
}

#[test]
fn test_invalid_config_file_is_an_error() {
    let (mut cmd, home) = scout();
    let config_path = home.path().join("broken.toml");
    fs::write(&config_path, "[batch]\nconcurrency = 500\n").unwrap();
    cmd.args(["example.com", "--mock", "--config", config_path.to_str().unwrap()]);

    cmd.assert()
        .code(1)
        .stderr(predicate::str::contains("Concurrency must be between 1 and 100"));
}

#[test]
fn test_registrar_key_without_secret_is_an_error() {
    let (mut cmd, _home) = scout();
    cmd.env("MAINREG_API_KEY", "key-only").args(["example.com"]);

    cmd.assert()
        .code(1)
        .stderr(predicate::str::contains("API secret is missing"));
}
