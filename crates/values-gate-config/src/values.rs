// crates/values-gate-config/src/values.rs
// ============================================================================
// Module: Values Gate Values Resolution
// Description: Layered resolution of chart values into a configuration.
// Purpose: Apply defaults, values files, and overrides in a fixed order.
// Dependencies: crate::{defaults, overrides}, values-gate-core, serde_yaml, thiserror, tracing
// ============================================================================

//! ## Overview
//! Resolution order is fixed: chart defaults, then values files in the
//! order given, then `--set`/`--set-string` overrides in the order given.
//! Later layers win. A `null` anywhere in a values file removes the key and
//! its subtree, which is how a user unsets a chart default. Arrays replace
//! the previous array wholesale.
//!
//! The validator never sees an unresolved layer; it receives the final
//! [`Configuration`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use thiserror::Error;
use tracing::debug;
use values_gate_core::Configuration;
use values_gate_core::KeyPath;
use values_gate_core::Value;

use crate::defaults::chart_defaults;
use crate::overrides::OverrideMode;
use crate::overrides::parse_overrides;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum size of a values file in bytes.
pub const MAX_VALUES_FILE_SIZE: usize = 1024 * 1024;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Values resolution errors.
#[derive(Debug, Error)]
pub enum ValuesError {
    /// I/O failure reading a values file.
    #[error("values io error: {path}: {message}")]
    Io {
        /// File path.
        path: String,
        /// Underlying error text.
        message: String,
    },
    /// Values file failed to parse.
    #[error("values parse error: {path}: {message}")]
    Parse {
        /// File path.
        path: String,
        /// Underlying error text.
        message: String,
    },
    /// Values file violates limits or shape.
    #[error("invalid values file: {path}: {message}")]
    Invalid {
        /// File path.
        path: String,
        /// Reason.
        message: String,
    },
    /// Override expression is malformed.
    #[error("invalid override `{expression}`: {reason}")]
    InvalidOverride {
        /// Offending expression.
        expression: String,
        /// Reason.
        reason: String,
    },
}

// ============================================================================
// SECTION: Resolver
// ============================================================================

/// Layered values resolver.
#[derive(Debug, Clone)]
pub struct ValuesResolver {
    /// Whether chart defaults seed the configuration.
    apply_defaults: bool,
    /// Values files in application order.
    files: Vec<PathBuf>,
    /// Override expressions in application order.
    overrides: Vec<(String, OverrideMode)>,
}

impl Default for ValuesResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ValuesResolver {
    /// Creates a resolver that applies chart defaults.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            apply_defaults: true,
            files: Vec::new(),
            overrides: Vec::new(),
        }
    }

    /// Enables or disables chart defaults.
    #[must_use]
    pub const fn apply_defaults(mut self, apply: bool) -> Self {
        self.apply_defaults = apply;
        self
    }

    /// Adds a values file.
    #[must_use]
    pub fn values_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.files.push(path.into());
        self
    }

    /// Adds a `--set` expression.
    #[must_use]
    pub fn set(mut self, expression: impl Into<String>) -> Self {
        self.overrides.push((expression.into(), OverrideMode::Typed));
        self
    }

    /// Adds a `--set-string` expression.
    #[must_use]
    pub fn set_string(mut self, expression: impl Into<String>) -> Self {
        self.overrides.push((expression.into(), OverrideMode::String));
        self
    }

    /// Resolves every layer into a configuration.
    ///
    /// # Errors
    /// Returns [`ValuesError`] when a values file cannot be read or parsed,
    /// or an override is malformed.
    pub fn resolve(&self) -> Result<Configuration, ValuesError> {
        let mut config = if self.apply_defaults { chart_defaults() } else { Configuration::new() };
        for path in &self.files {
            let tree = read_values_file(path)?;
            apply_tree(&mut config, "", &tree).map_err(|message| ValuesError::Invalid {
                path: path.display().to_string(),
                message,
            })?;
            debug!(path = %path.display(), "applied values file");
        }
        for (expression, mode) in &self.overrides {
            for item in parse_overrides(expression, *mode)? {
                item.apply(&mut config);
            }
        }
        debug!(keys = config.len(), "values resolved");
        Ok(config)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads and parses a YAML (or JSON) values file.
fn read_values_file(path: &Path) -> Result<serde_json::Value, ValuesError> {
    let display = path.display().to_string();
    let bytes = fs::read(path).map_err(|err| ValuesError::Io {
        path: display.clone(),
        message: err.to_string(),
    })?;
    if bytes.len() > MAX_VALUES_FILE_SIZE {
        return Err(ValuesError::Invalid {
            path: display,
            message: "values file exceeds size limit".to_string(),
        });
    }
    let content = std::str::from_utf8(&bytes).map_err(|_| ValuesError::Invalid {
        path: display.clone(),
        message: "values file must be utf-8".to_string(),
    })?;
    if content.trim().is_empty() {
        return Ok(serde_json::Value::Null);
    }
    let tree: serde_json::Value = serde_yaml::from_str(content).map_err(|err| ValuesError::Parse {
        path: display.clone(),
        message: err.to_string(),
    })?;
    match tree {
        serde_json::Value::Object(_) | serde_json::Value::Null => Ok(tree),
        _ => Err(ValuesError::Invalid {
            path: display,
            message: "values file must contain a mapping".to_string(),
        }),
    }
}

/// Applies a values tree at `prefix` on top of `config`.
fn apply_tree(
    config: &mut Configuration,
    prefix: &str,
    node: &serde_json::Value,
) -> Result<(), String> {
    match node {
        serde_json::Value::Null => {
            if !prefix.is_empty() {
                config.remove_section(&section(prefix)?);
            }
        }
        serde_json::Value::Bool(flag) => {
            config.insert(prefix, Value::Bool(*flag));
        }
        serde_json::Value::Number(number) => {
            config.insert(prefix, Value::String(number.to_string()));
        }
        serde_json::Value::String(text) => {
            config.insert(prefix, Value::String(text.clone()));
        }
        serde_json::Value::Array(items) => {
            config.remove_section(&section(prefix)?);
            for (index, item) in items.iter().enumerate() {
                apply_tree(config, &format!("{prefix}[{index}]"), item)?;
            }
        }
        serde_json::Value::Object(map) => {
            for (key, child) in map {
                let path = if prefix.is_empty() { key.clone() } else { format!("{prefix}.{key}") };
                apply_tree(config, &path, child)?;
            }
        }
    }
    Ok(())
}

/// Parses a section prefix.
fn section(prefix: &str) -> Result<KeyPath, String> {
    KeyPath::parse(prefix).map_err(|err| err.to_string())
}
