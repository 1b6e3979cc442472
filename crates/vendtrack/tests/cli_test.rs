//! Integration tests for the `vendtrack` CLI binary.
//!
//! Argument parsing, help output, completions and error handling run
//! without a backend; the data commands run against a wiremock server.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `vendtrack` binary with env isolation.
///
/// Clears all `VENDTRACK_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn vendtrack_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("vendtrack");
    cmd.env("HOME", "/tmp/vendtrack-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/vendtrack-cli-test-nonexistent")
        .env_remove("VENDTRACK_PROFILE")
        .env_remove("VENDTRACK_API_URL")
        .env_remove("VENDTRACK_USERNAME")
        .env_remove("VENDTRACK_PASSWORD")
        .env_remove("VENDTRACK_OUTPUT")
        .env_remove("VENDTRACK_INSECURE")
        .env_remove("VENDTRACK_TIMEOUT")
        .env_remove("VENDTRACK_NO_CACHE")
        .env_remove("VENDTRACK_DEFAULT_PROFILE");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = vendtrack_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    vendtrack_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("vending")
            .and(predicate::str::contains("inventory"))
            .and(predicate::str::contains("analytics"))
            .and(predicate::str::contains("visit")),
    );
}

#[test]
fn test_version_flag() {
    vendtrack_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("vendtrack"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    vendtrack_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    vendtrack_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let output = vendtrack_cmd().arg("foobar").output().unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("unrecognized") || text.contains("foobar"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_locations_list_without_config() {
    vendtrack_cmd()
        .args(["locations", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("config").or(predicate::str::contains("api-url")));
}

#[test]
fn test_unknown_profile() {
    vendtrack_cmd()
        .args(["--profile", "nowhere", "locations", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nowhere"));
}

#[test]
fn test_invalid_output_format() {
    let output = vendtrack_cmd()
        .args(["--output", "invalid", "locations", "list"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(
        text.contains("invalid") || text.contains("possible values"),
        "Expected error about invalid output format:\n{text}"
    );
}

#[test]
fn test_inventory_dates_require_each_other() {
    vendtrack_cmd()
        .args(["inventory", "--start-date", "2025-01-01"])
        .assert()
        .failure()
        .code(2);
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_show_no_config() {
    // `config show` falls back to the default config when no file exists.
    vendtrack_cmd()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[defaults]"));
}

#[test]
fn test_config_path() {
    vendtrack_cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[cfg(target_os = "linux")]
#[test]
fn test_config_show_masks_password() {
    let dir = tempfile::tempdir().unwrap();
    let config_dir = dir.path().join("vendtrack");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(
        config_dir.join("config.toml"),
        r#"
default_profile = "north"

[profiles.north]
api_url = "https://north.example.com/api/"
username = "driver1"
password = "hunter2"
"#,
    )
    .unwrap();

    vendtrack_cmd()
        .env("XDG_CONFIG_HOME", dir.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("[profiles.north]")
                .and(predicate::str::contains("****"))
                .and(predicate::str::contains("hunter2").not()),
        );
}

// ── Against a backend ───────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_locations_list_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/locations/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "name": "Depot", "route": "North" },
            { "id": 2, "name": "Library" }
        ])))
        .mount(&server)
        .await;

    let api_url = format!("{}/api", server.uri());
    let output = vendtrack_cmd()
        .args(["--api-url", api_url.as_str()])
        .args(["locations", "list", "-o", "json"])
        .output()
        .unwrap();

    assert!(output.status.success(), "{}", combined_output(&output));
    let body: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(body[0]["name"], "Depot");
    assert_eq!(body[1]["id"], 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_dashboard_partial_failure_exits_partial() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/locations/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "name": "Depot" }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/dashboard/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let api_url = format!("{}/api", server.uri());
    let output = vendtrack_cmd()
        .args(["--api-url", api_url.as_str()])
        .args(["dashboard", "-o", "json"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(9), "{}", combined_output(&output));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Failed to load dashboard data"),
        "Expected dashboard failure message:\n{stderr}"
    );
}
