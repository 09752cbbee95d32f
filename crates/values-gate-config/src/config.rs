// crates/values-gate-config/src/config.rs
// ============================================================================
// Module: Values Gate Configuration
// Description: Configuration loading and validation for the values gate tool.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: values-gate-core, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! An explicit path (CLI or environment) must exist; when neither is given and
//! the default file is absent, built-in defaults apply.
//! Security posture: config inputs are untrusted and invalid data fails closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;
use values_gate_core::DEFAULT_RELEASE_NAME;
use values_gate_core::ReportMode;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
pub const DEFAULT_CONFIG_NAME: &str = "values-gate.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "VALUES_GATE_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum release name length (chart fullname budget).
pub const MAX_RELEASE_NAME_LENGTH: usize = 53;
/// Rules value selecting the built-in catalog.
pub const BUILTIN_RULES: &str = "builtin";

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Values gate tool configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateConfig {
    /// Release settings.
    #[serde(default)]
    pub release: ReleaseConfig,
    /// Validation settings.
    #[serde(default)]
    pub validation: ValidationConfig,
}

impl GateConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (resolved, explicit) = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = match fs::read(&resolved) {
            Ok(bytes) => bytes,
            Err(err) if !explicit && err.kind() == ErrorKind::NotFound => {
                debug!(path = %resolved.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(err) => return Err(ConfigError::Io(err.to_string())),
        };
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        debug!(path = %resolved.display(), "config loaded");
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.release.validate()?;
        self.validation.validate()?;
        Ok(())
    }
}

/// Release settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseConfig {
    /// Release name prefixing config map and workload names.
    #[serde(default = "default_release_name")]
    pub name: String,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            name: default_release_name(),
        }
    }
}

impl ReleaseConfig {
    /// Validates the release name as a DNS-1123 label.
    fn validate(&self) -> Result<(), ConfigError> {
        let name = self.name.as_str();
        if name.is_empty() {
            return Err(ConfigError::Invalid("release.name must be non-empty".to_string()));
        }
        if name.len() > MAX_RELEASE_NAME_LENGTH {
            return Err(ConfigError::Invalid(format!(
                "release.name exceeds {MAX_RELEASE_NAME_LENGTH} characters"
            )));
        }
        let valid_chars = name
            .bytes()
            .all(|byte| byte.is_ascii_lowercase() || byte.is_ascii_digit() || byte == b'-');
        if !valid_chars || name.starts_with('-') || name.ends_with('-') {
            return Err(ConfigError::Invalid(
                "release.name must be a lowercase DNS-1123 label".to_string(),
            ));
        }
        Ok(())
    }
}

/// Validation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// How violations are reported.
    #[serde(default)]
    pub report: ReportMode,
    /// `builtin` or a path to a rule file.
    #[serde(default = "default_rules")]
    pub rules: String,
    /// Whether chart defaults seed values resolution.
    #[serde(default = "default_true")]
    pub apply_chart_defaults: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            report: ReportMode::default(),
            rules: default_rules(),
            apply_chart_defaults: true,
        }
    }
}

impl ValidationConfig {
    /// Validates the rules source.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.rules.trim() == BUILTIN_RULES {
            return Ok(());
        }
        validate_path_string("validation.rules", &self.rules)
    }

    /// Returns the configured rules source.
    #[must_use]
    pub fn rules_source(&self) -> RulesSource {
        RulesSource::parse(&self.rules)
    }
}

/// Where the rule set comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RulesSource {
    /// Built-in chart catalog.
    Builtin,
    /// Rule file on disk.
    File(PathBuf),
}

impl RulesSource {
    /// Parses a rules setting (`builtin` or a path).
    #[must_use]
    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed == BUILTIN_RULES { Self::Builtin } else { Self::File(PathBuf::from(trimmed)) }
    }
}

/// Default release name.
fn default_release_name() -> String {
    DEFAULT_RELEASE_NAME.to_string()
}

/// Default rules source.
fn default_rules() -> String {
    BUILTIN_RULES.to_string()
}

/// Serde helper returning true.
const fn default_true() -> bool {
    true
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI or environment defaults.
///
/// The flag is true when the path was given explicitly.
fn resolve_path(path: Option<&Path>) -> Result<(PathBuf, bool), ConfigError> {
    if let Some(path) = path {
        return Ok((path.to_path_buf(), true));
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok((PathBuf::from(env_path), true));
    }
    Ok((PathBuf::from(DEFAULT_CONFIG_NAME), false))
}

/// Validates the resolved path against security limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    let path = Path::new(trimmed);
    for component in path.components() {
        let component_value = component.as_os_str().to_string_lossy();
        if component_value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}
