#![allow(clippy::unwrap_used, clippy::expect_used)]

//! CLI smoke tests for the zesty-server binary: help and version output,
//! configuration validation and the effective-config dump.

use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

const LEGACY_VARS: [&str; 6] = [
    "PORT",
    "VITE_CORS_ORIGIN",
    "QLOO_BASE_URL",
    "VITE_QLOO_API_KEY",
    "VITE_GEMINI_API_URL",
    "VITE_GEMINI_API_KEY",
];

fn run_zesty_server(args: &[&str], envs: &[(&str, &str)]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_zesty-server"));
    for var in LEGACY_VARS {
        cmd.env_remove(var);
    }
    cmd.args(args)
        .envs(envs.iter().copied())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .expect("Failed to execute zesty-server")
}

fn write_config(dir: &TempDir, name: &str, body: &str) -> String {
    let path = dir.path().join(name);
    std::fs::write(&path, body).expect("Failed to write config file");
    path.to_str().unwrap().to_owned()
}

#[test]
fn help_lists_commands_and_options() {
    let output = run_zesty_server(&["--help"], &[]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage:"));
    assert!(stdout.contains("run"));
    assert!(stdout.contains("check"));
    assert!(stdout.contains("--config"));
    assert!(stdout.contains("--print-config"));
}

#[test]
fn version_is_printed() {
    let output = run_zesty_server(&["--version"], &[]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("zesty-server"));
    assert!(stdout.chars().any(|c| c.is_ascii_digit()));
}

#[test]
fn unknown_subcommand_fails() {
    let output = run_zesty_server(&["serve-forever"], &[]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error"));
}

#[test]
fn missing_config_file_fails() {
    let output = run_zesty_server(&["--config", "/nonexistent/zesty.yaml", "check"], &[]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("does not exist"), "{stderr}");
}

#[test]
fn unknown_config_key_fails() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "typo.yaml", "server:\n  prot: 4000\n");

    let output = run_zesty_server(&["--config", &path, "check"], &[]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("prot"), "{stderr}");
}

#[test]
fn wildcard_origin_with_credentials_fails_check() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        "cors.yaml",
        "server:\n  cors:\n    allowed_origins: [\"*\"]\n    allow_credentials: true\n",
    );

    let output = run_zesty_server(&["--config", &path, "check"], &[]);

    assert!(!output.status.success());
}

#[test]
fn valid_config_passes_check() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        "valid.yaml",
        r#"
server:
  port: 4100
  request_timeout: 15s
  rate_limit:
    max_requests: 50
    window: 10m
taste_graph:
  timeout: 5s
discomfort:
  min_cards: 12
logging:
  level: warn
  format: json
"#,
    );

    let output = run_zesty_server(&["--config", &path, "check"], &[]);

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success(), "{stderr}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Configuration is valid"));
    assert!(stdout.contains("4100"));
}

#[test]
fn print_config_applies_every_layer() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "base.yaml", "server:\n  port: 4000\n");

    let output = run_zesty_server(
        &["--config", &path, "--port", "4500", "--print-config"],
        &[
            ("PORT", "4200"),
            ("VITE_QLOO_API_KEY", "qloo-secret"),
            ("VITE_CORS_ORIGIN", "https://zesty.example"),
        ],
    );

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("qloo-secret"));

    let printed: serde_json::Value = serde_saphyr::from_str(&stdout).unwrap();
    assert_eq!(printed["server"]["port"], 4500);
    assert_eq!(printed["server"]["cors"]["allowed_origins"][0], "https://zesty.example");
    assert_eq!(printed["taste_graph"]["api_key"], "[REDACTED]");
}
