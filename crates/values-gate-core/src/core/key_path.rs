// crates/values-gate-core/src/core/key_path.rs
// ============================================================================
// Module: Values Gate Key Paths
// Description: Validated dotted key paths into a flattened configuration.
// Purpose: Provide a typed key with segment-aware prefix checks.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! A [`KeyPath`] names one value in a flattened configuration, for example
//! `global.auth.identityProvider.oidc.domain`. Array elements are addressed
//! with a bracketed index attached to the segment (`extraEnv[0].name`).
//! Paths are validated at construction boundaries so the rest of the crate
//! can treat them as well-formed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum length of a key path in bytes.
pub const MAX_KEY_PATH_LENGTH: usize = 512;

// ============================================================================
// SECTION: Key Path
// ============================================================================

/// Dotted key path into a flattened configuration.
///
/// # Invariants
/// - Non-empty and at most [`MAX_KEY_PATH_LENGTH`] bytes.
/// - No empty segments and no whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct KeyPath(String);

impl KeyPath {
    /// Parses and validates a key path.
    ///
    /// # Errors
    /// Returns [`KeyPathError`] when the path is empty, too long, contains
    /// whitespace, or has an empty segment.
    pub fn parse(raw: &str) -> Result<Self, KeyPathError> {
        validate_key_path(raw)?;
        Ok(Self(raw.to_string()))
    }

    /// Returns the path as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the dot-separated segments of the path.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }

    /// Returns true when `candidate` is this path or nested beneath it.
    ///
    /// Matching is segment-aware: `a.b` contains `a.b.c` and `a.b[0]` but
    /// not `a.bc`.
    #[must_use]
    pub fn contains(&self, candidate: &str) -> bool {
        candidate.strip_prefix(self.0.as_str()).is_some_and(|rest| {
            rest.is_empty() || rest.starts_with('.') || rest.starts_with('[')
        })
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for KeyPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for KeyPath {
    type Err = KeyPathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for KeyPath {
    type Error = KeyPathError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        validate_key_path(&value)?;
        Ok(Self(value))
    }
}

impl From<KeyPath> for String {
    fn from(value: KeyPath) -> Self {
        value.0
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Key path validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyPathError {
    /// Path was empty.
    #[error("key path must be non-empty")]
    Empty,
    /// Path exceeded the length limit.
    #[error("key path exceeds {max} bytes (actual: {actual})")]
    TooLong {
        /// Maximum allowed bytes.
        max: usize,
        /// Actual length in bytes.
        actual: usize,
    },
    /// Path contained whitespace.
    #[error("key path contains whitespace: `{0}`")]
    Whitespace(String),
    /// Path contained an empty segment.
    #[error("key path has an empty segment: {0}")]
    EmptySegment(String),
}

// ============================================================================
// SECTION: Validation
// ============================================================================

/// Validates raw key path text.
fn validate_key_path(raw: &str) -> Result<(), KeyPathError> {
    if raw.is_empty() {
        return Err(KeyPathError::Empty);
    }
    if raw.len() > MAX_KEY_PATH_LENGTH {
        return Err(KeyPathError::TooLong {
            max: MAX_KEY_PATH_LENGTH,
            actual: raw.len(),
        });
    }
    if raw.chars().any(char::is_whitespace) {
        return Err(KeyPathError::Whitespace(raw.to_string()));
    }
    if raw.split('.').any(str::is_empty) {
        return Err(KeyPathError::EmptySegment(raw.to_string()));
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::panic, reason = "Test fixtures use explicit asserts and panics for clarity.")]

    use super::KeyPath;
    use super::KeyPathError;

    #[test]
    fn rejects_malformed_paths() {
        assert_eq!(KeyPath::parse(""), Err(KeyPathError::Empty));
        assert!(matches!(KeyPath::parse("a..b"), Err(KeyPathError::EmptySegment(_))));
        assert!(matches!(KeyPath::parse(".a"), Err(KeyPathError::EmptySegment(_))));
        assert!(matches!(KeyPath::parse("a b"), Err(KeyPathError::Whitespace(_))));
    }

    #[test]
    fn contains_is_segment_aware() {
        let Ok(path) = KeyPath::parse("global.auth.identityProvider") else {
            panic!("valid path rejected");
        };
        assert!(path.contains("global.auth.identityProvider"));
        assert!(path.contains("global.auth.identityProvider.type"));
        assert!(path.contains("global.auth.identityProvider[0]"));
        assert!(!path.contains("global.auth.identityProviders"));
        assert!(!path.contains("global.auth"));
    }
}
