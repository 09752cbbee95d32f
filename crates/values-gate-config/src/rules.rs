// crates/values-gate-config/src/rules.rs
// ============================================================================
// Module: Values Gate Rule Files
// Description: Rule file parsing and compilation into a rule set.
// Purpose: Let operators declare scoped requirements outside the binary.
// Dependencies: crate::config, values-gate-core, values-gate-logic, serde, toml, serde_yaml
// ============================================================================

//! ## Overview
//! A rule file declares `scopes` and `rules` in TOML, YAML, or JSON, chosen
//! by file extension. `when` strings use the guard DSL. Setting
//! `extends = "builtin"` appends the file's declarations to the built-in
//! catalog, so a file can add rules inside the `enterprise`, `sso`, or `oidc`
//! scopes.
//!
//! ```toml
//! extends = "builtin"
//!
//! [[scopes]]
//! name = "audit"
//! within = "enterprise"
//! when = "global.audit.enabled"
//! describe = "enabling audit logging"
//!
//! [[rules]]
//! scope = "audit"
//! key = "global.audit.bucket"
//! ```
//!
//! Unknown fields are rejected at parse time, so a misspelled `scope` or
//! `when` cannot silently drop a gate. Compilation fails closed on any
//! malformed key, guard, or scope graph.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;
use values_gate_core::CatalogError;
use values_gate_core::Condition;
use values_gate_core::KeyPath;
use values_gate_core::KeyPathError;
use values_gate_core::MessageTemplate;
use values_gate_core::RuleSet;
use values_gate_core::RuleSetBuilder;
use values_gate_core::RuleSetError;
use values_gate_core::RuleSpec;
use values_gate_core::ScopeSpec;
use values_gate_core::builtin_rule_set;
use values_gate_core::builtin_rules;
use values_gate_core::parse_when;
use values_gate_logic::DslError;
use values_gate_logic::Guard;

use crate::config::BUILTIN_RULES;
use crate::config::RulesSource;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum rule file size in bytes.
pub const MAX_RULE_FILE_SIZE: usize = 1024 * 1024;

// ============================================================================
// SECTION: File Model
// ============================================================================

/// Parsed rule file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleFile {
    /// Base catalog to extend (`builtin`), if any.
    #[serde(default)]
    pub extends: Option<String>,
    /// Scope declarations.
    #[serde(default)]
    pub scopes: Vec<ScopeEntry>,
    /// Rule declarations in reporting order.
    #[serde(default)]
    pub rules: Vec<RuleEntry>,
}

/// Scope declaration as written in a rule file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScopeEntry {
    /// Scope name.
    pub name: String,
    /// Enclosing scope.
    #[serde(default)]
    pub within: Option<String>,
    /// Guard expression; an absent guard is always open.
    #[serde(default)]
    pub when: Option<String>,
    /// Description inherited by rules.
    #[serde(default)]
    pub describe: Option<String>,
}

/// Rule declaration as written in a rule file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleEntry {
    /// Key that must be set.
    pub key: String,
    /// Explicit identifier.
    #[serde(default)]
    pub id: Option<String>,
    /// Enclosing scope.
    #[serde(default)]
    pub scope: Option<String>,
    /// Rule-local guard expression.
    #[serde(default)]
    pub when: Option<String>,
    /// Description overriding the scope's.
    #[serde(default)]
    pub describe: Option<String>,
    /// Message template with `{key}` and `{when}` placeholders.
    #[serde(default)]
    pub message: Option<String>,
}

/// Supported rule file encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RuleFormat {
    /// TOML.
    Toml,
    /// YAML.
    Yaml,
    /// JSON.
    Json,
}

impl RuleFormat {
    /// Selects the format from a file extension.
    fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "toml" => Some(Self::Toml),
            "yaml" | "yml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Rule file loading or compilation errors.
#[derive(Debug, Error)]
pub enum RuleFileError {
    /// I/O failure reading the file.
    #[error("rule file io error: {0}")]
    Io(String),
    /// The file failed to parse.
    #[error("rule file parse error: {0}")]
    Parse(String),
    /// The file extension is not recognized.
    #[error("unsupported rule file format: {0}")]
    UnsupportedFormat(String),
    /// The file exceeds the size limit or is not UTF-8.
    #[error("invalid rule file: {0}")]
    Invalid(String),
    /// The `extends` value is not recognized.
    #[error("unknown base catalog `{0}`")]
    UnknownBase(String),
    /// A rule key is malformed.
    #[error("rule key `{key}` invalid: {source}")]
    Key {
        /// Key as written.
        key: String,
        /// Underlying error.
        source: KeyPathError,
    },
    /// A guard expression failed to parse.
    #[error("{context}: {source}")]
    Guard {
        /// Where the guard was declared.
        context: String,
        /// Underlying error.
        source: DslError,
    },
    /// The declarations failed to compile.
    #[error(transparent)]
    Compile(#[from] RuleSetError),
    /// The built-in catalog failed to compile.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

// ============================================================================
// SECTION: Loading
// ============================================================================

impl RuleFile {
    /// Reads and parses a rule file.
    ///
    /// # Errors
    ///
    /// Returns [`RuleFileError`] when the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, RuleFileError> {
        let format = RuleFormat::from_path(path)
            .ok_or_else(|| RuleFileError::UnsupportedFormat(path.display().to_string()))?;
        let bytes = fs::read(path).map_err(|err| RuleFileError::Io(err.to_string()))?;
        if bytes.len() > MAX_RULE_FILE_SIZE {
            return Err(RuleFileError::Invalid("rule file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| RuleFileError::Invalid("rule file must be utf-8".to_string()))?;
        Self::parse_str(content, format)
    }

    /// Parses rule file content in the given encoding.
    fn parse_str(content: &str, format: RuleFormat) -> Result<Self, RuleFileError> {
        match format {
            RuleFormat::Toml => {
                toml::from_str(content).map_err(|err| RuleFileError::Parse(err.to_string()))
            }
            RuleFormat::Yaml => {
                serde_yaml::from_str(content).map_err(|err| RuleFileError::Parse(err.to_string()))
            }
            RuleFormat::Json => {
                serde_json::from_str(content).map_err(|err| RuleFileError::Parse(err.to_string()))
            }
        }
    }

    /// Parses TOML rule file content.
    ///
    /// # Errors
    ///
    /// Returns [`RuleFileError::Parse`] when the content is not a valid rule file.
    pub fn from_toml(content: &str) -> Result<Self, RuleFileError> {
        Self::parse_str(content, RuleFormat::Toml)
    }

    /// Compiles the declarations into a rule set.
    ///
    /// # Errors
    ///
    /// Returns [`RuleFileError`] when a key, guard, or scope graph is invalid.
    pub fn compile(&self) -> Result<RuleSet, RuleFileError> {
        let mut builder = match self.extends.as_deref().map(str::trim) {
            None => RuleSetBuilder::new(),
            Some(BUILTIN_RULES) => builtin_rules()?,
            Some(other) => return Err(RuleFileError::UnknownBase(other.to_string())),
        };
        for entry in &self.scopes {
            builder = builder.scope(entry.to_spec()?);
        }
        for entry in &self.rules {
            builder = builder.rule(entry.to_spec()?);
        }
        let rule_set = builder.build()?;
        debug!(rules = rule_set.len(), scopes = self.scopes.len(), "rule file compiled");
        Ok(rule_set)
    }
}

impl ScopeEntry {
    /// Converts the entry into a scope declaration.
    fn to_spec(&self) -> Result<ScopeSpec, RuleFileError> {
        let guard =
            parse_optional_guard(self.when.as_deref(), || format!("scope `{}`", self.name))?;
        let mut spec = ScopeSpec::new(self.name.clone(), guard);
        if let Some(parent) = &self.within {
            spec = spec.within(parent.clone());
        }
        if let Some(describe) = &self.describe {
            spec = spec.describe(describe.clone());
        }
        Ok(spec)
    }
}

impl RuleEntry {
    /// Converts the entry into a rule declaration.
    fn to_spec(&self) -> Result<RuleSpec, RuleFileError> {
        let key = KeyPath::parse(&self.key).map_err(|source| RuleFileError::Key {
            key: self.key.clone(),
            source,
        })?;
        let guard = parse_optional_guard(self.when.as_deref(), || format!("rule `{}`", self.key))?;
        let mut spec = RuleSpec::new(key).when(guard);
        if let Some(id) = &self.id {
            spec = spec.id(id.clone());
        }
        if let Some(scope) = &self.scope {
            spec = spec.in_scope(scope.clone());
        }
        if let Some(describe) = &self.describe {
            spec = spec.describe(describe.clone());
        }
        if let Some(message) = &self.message {
            spec = spec.message(MessageTemplate::new(message.clone()));
        }
        Ok(spec)
    }
}

/// Parses an optional guard, defaulting to an open guard.
fn parse_optional_guard(
    when: Option<&str>,
    context: impl FnOnce() -> String,
) -> Result<Guard<Condition>, RuleFileError> {
    match when {
        None => Ok(Guard::always()),
        Some(expression) => parse_when(expression).map_err(|source| RuleFileError::Guard {
            context: context(),
            source,
        }),
    }
}

/// Loads the rule set selected by a rules source.
///
/// # Errors
///
/// Returns [`RuleFileError`] when the rule file or built-in catalog fails.
pub fn load_rule_set(source: &RulesSource) -> Result<RuleSet, RuleFileError> {
    match source {
        RulesSource::Builtin => Ok(builtin_rule_set()?),
        RulesSource::File(path) => RuleFile::load(path)?.compile(),
    }
}
