// crates/values-gate-config/tests/common/mod.rs
// =============================================================================
// Module: Config Test Helpers
// Description: Shared helpers for values gate config tests.
// Purpose: Reduce duplication across integration tests for values-gate-config.
// =============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;
use values_gate_config::GateConfig;

/// Result type used by config suites.
pub type TestResult = Result<(), String>;

/// Parses a TOML string into a `GateConfig` for tests.
pub fn config_from_toml(toml_str: &str) -> Result<GateConfig, toml::de::Error> {
    toml::from_str(toml_str)
}

/// Writes `content` to `name` inside `dir` and returns the path.
pub fn write_file(dir: &TempDir, name: &str, content: &str) -> Result<PathBuf, String> {
    let path = dir.path().join(name);
    fs::write(&path, content).map_err(|err| err.to_string())?;
    Ok(path)
}

/// Creates a fresh temporary directory.
pub fn temp_dir() -> Result<TempDir, String> {
    tempfile::tempdir().map_err(|err| err.to_string())
}

/// Asserts that `result` failed with a message containing `needle`.
pub fn assert_err_contains<T, E: std::fmt::Display>(
    result: Result<T, E>,
    needle: &str,
) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(_) => Err(format!("expected an error containing {needle}")),
    }
}
