// crates/values-gate-cli/tests/env_commands.rs
// ============================================================================
// Module: CLI Env Command Tests
// Description: Integration tests for env reference listing and verification.
// Purpose: Ensure rendered env wiring is checked against resolved values.
// Dependencies: values-gate-cli binary
// ============================================================================

//! ## Overview
//! Runs `env refs` and `env verify` against a complete enterprise OIDC
//! configuration and hand-written container env lists.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::process::Output;

use tempfile::TempDir;

// ============================================================================
// SECTION: Helpers
// ============================================================================

const OIDC_VALUES: &str = "
global:
  edition: enterprise
  auth:
    instanceAdmin:
      firstName: Octavia
      lastName: Squidington
    identityProvider:
      secretName: sso-secrets
      type: oidc
      oidc:
        domain: sso.example.com
        appName: example-app
        clientIdSecretKey: client-id
        clientSecretSecretKey: client-secret
";

fn values_gate_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_values-gate"))
}

fn run(args: &[&str]) -> Output {
    Command::new(values_gate_bin())
        .args(args)
        .env_remove("VALUES_GATE_CONFIG")
        .env_remove("VALUES_GATE_LOG")
        .output()
        .expect("run values-gate")
}

fn write(dir: &TempDir, name: &str, content: &str) -> String {
    let path = dir.path().join(name);
    fs::write(&path, content).expect("write fixture");
    path.to_string_lossy().into_owned()
}

fn config_map_entry(name: &str, release: &str) -> String {
    format!(
        "- name: {name}\n  valueFrom:\n    configMapKeyRef:\n      name: \
         {release}-airbyte-env\n      key: {name}\n"
    )
}

fn secret_entry(name: &str, secret: &str, key: &str) -> String {
    format!(
        "- name: {name}\n  valueFrom:\n    secretKeyRef:\n      name: {secret}\n      key: {key}\n"
    )
}

fn keycloak_env(release: &str, email_secret: &str) -> String {
    let mut env = String::new();
    env.push_str(&config_map_entry("AIRBYTE_URL", release));
    env.push_str(&config_map_entry("INITIAL_USER_FIRST_NAME", release));
    env.push_str(&config_map_entry("INITIAL_USER_LAST_NAME", release));
    env.push_str(&secret_entry("INITIAL_USER_EMAIL", email_secret, "instance-admin-email"));
    env.push_str(&secret_entry(
        "INITIAL_USER_PASSWORD",
        "airbyte-config-secrets",
        "instance-admin-password",
    ));
    env.push_str(&config_map_entry("IDENTITY_PROVIDER_TYPE", release));
    env.push_str(&config_map_entry("OIDC_DOMAIN", release));
    env.push_str(&config_map_entry("OIDC_APP_NAME", release));
    env.push_str(&secret_entry("OIDC_CLIENT_ID", "sso-secrets", "client-id"));
    env.push_str(&secret_entry("OIDC_CLIENT_SECRET", "sso-secrets", "client-secret"));
    env
}

// ============================================================================
// SECTION: Tests
// ============================================================================

/// Verifies the server workload lists the license key first.
#[test]
fn env_refs_lists_server_wiring() {
    let dir = tempfile::tempdir().expect("tempdir");
    let values = write(&dir, "values.yaml", OIDC_VALUES);
    let output = run(&["env", "refs", "--workload", "server", "-f", &values]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 11);
    assert_eq!(lines[0], "AIRBYTE_LICENSE_KEY\tsecret\tairbyte-config-secrets\tlicense-key");
    assert_eq!(lines[1], "AIRBYTE_URL\tconfig_map\tairbyte-airbyte-env\tAIRBYTE_URL");
    assert_eq!(lines[9], "OIDC_CLIENT_ID\tsecret\tsso-secrets\tclient-id");
}

/// Verifies the release override prefixes config map names.
#[test]
fn env_refs_json_uses_release_override() {
    let dir = tempfile::tempdir().expect("tempdir");
    let values = write(&dir, "values.yaml", OIDC_VALUES);
    let output = run(&[
        "env",
        "refs",
        "--workload",
        "keycloak-setup",
        "--release",
        "prod",
        "--format",
        "json",
        "-f",
        &values,
    ]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let refs: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json output");
    let refs = refs.as_array().expect("array");
    assert_eq!(refs.len(), 10);
    assert_eq!(refs[0]["variable"], "AIRBYTE_URL");
    assert_eq!(refs[0]["reference"]["kind"], "config_map");
    assert_eq!(refs[0]["reference"]["name"], "prod-airbyte-env");
}

/// Verifies an invalid release override fails closed.
#[test]
fn env_refs_rejects_invalid_release() {
    let output = run(&["env", "refs", "--workload", "server", "--release", "Not_A_Label"]);
    assert!(!output.status.success());
}

/// Verifies unresolved secret references are reported.
#[test]
fn env_refs_reports_unresolved_secret() {
    let output = run(&["env", "refs", "--workload", "keycloak-setup"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to resolve env references"), "stderr: {stderr}");
}

/// Verifies matching wiring passes.
#[test]
fn env_verify_accepts_matching_env() {
    let dir = tempfile::tempdir().expect("tempdir");
    let values = write(&dir, "values.yaml", OIDC_VALUES);
    let actual = write(&dir, "env.yaml", &keycloak_env("airbyte", "airbyte-config-secrets"));
    let output = run(&[
        "env",
        "verify",
        "--workload",
        "keycloak-setup",
        "--actual",
        &actual,
        "-f",
        &values,
    ]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        "Environment references for keycloak-setup match."
    );
}

/// Verifies a container spec with extra fields is accepted.
#[test]
fn env_verify_accepts_container_spec() {
    let dir = tempfile::tempdir().expect("tempdir");
    let values = write(&dir, "values.yaml", OIDC_VALUES);
    let entries = keycloak_env("airbyte", "airbyte-config-secrets");
    let indented: String = entries.lines().map(|line| format!("  {line}\n")).collect();
    let container =
        format!("name: keycloak-setup\nimage: airbyte/keycloak-setup\nenv:\n{indented}");
    let actual = write(&dir, "container.yaml", &container);
    let output = run(&[
        "env",
        "verify",
        "--workload",
        "keycloak-setup",
        "--actual",
        &actual,
        "-f",
        &values,
    ]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
}

/// Verifies mismatched and missing wiring is reported and fails.
#[test]
fn env_verify_reports_mismatches() {
    let dir = tempfile::tempdir().expect("tempdir");
    let values = write(&dir, "values.yaml", OIDC_VALUES);
    let actual = write(&dir, "env.yaml", &keycloak_env("airbyte", "wrong-secret"));
    let output = run(&[
        "env",
        "verify",
        "--workload",
        "server",
        "--actual",
        &actual,
        "-f",
        &values,
    ]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    let lines: Vec<&str> = stderr.lines().collect();
    assert_eq!(
        lines,
        vec![
            "`AIRBYTE_LICENSE_KEY` should be declared as an environment variable",
            "`INITIAL_USER_EMAIL` references `wrong-secret`, expected `airbyte-config-secrets`",
        ]
    );
}

/// Verifies JSON mismatch output.
#[test]
fn env_verify_json_output() {
    let dir = tempfile::tempdir().expect("tempdir");
    let values = write(&dir, "values.yaml", OIDC_VALUES);
    let actual = write(&dir, "env.json", "[{\"name\": \"AIRBYTE_URL\", \"value\": \"http://x\"}]");
    let output = run(&[
        "env",
        "verify",
        "--workload",
        "keycloak-setup",
        "--actual",
        &actual,
        "--format",
        "json",
        "-f",
        &values,
    ]);
    assert!(!output.status.success());
    let mismatches: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("json output");
    let mismatches = mismatches.as_array().expect("array");
    assert_eq!(mismatches.len(), 10);
    assert_eq!(mismatches[0]["mismatch"], "wrong_source");
    assert_eq!(mismatches[0]["variable"], "AIRBYTE_URL");
    assert_eq!(mismatches[1]["mismatch"], "missing");
}
