// crates/values-gate-config/src/overrides.rs
// ============================================================================
// Module: Values Gate Overrides
// Description: Parser for `--set` and `--set-string` expressions.
// Purpose: Turn command-line overrides into typed configuration edits.
// Dependencies: values-gate-core
// ============================================================================

//! ## Overview
//! An override expression is a comma-separated list of `key=value` pairs,
//! for example `global.edition=enterprise,global.auth.enabled=true`. A
//! backslash escapes a comma inside a value. In [`OverrideMode::Typed`]
//! mode `true`/`false` become booleans and `null` removes the key and its
//! subtree; [`OverrideMode::String`] keeps every value as a string.

// ============================================================================
// SECTION: Imports
// ============================================================================

use values_gate_core::Configuration;
use values_gate_core::KeyPath;
use values_gate_core::Value;

use crate::values::ValuesError;

// ============================================================================
// SECTION: Types
// ============================================================================

/// How override values are typed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverrideMode {
    /// `--set`: booleans and `null` are recognized.
    Typed,
    /// `--set-string`: every value is a string.
    String,
}

/// Single parsed override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Override {
    /// Set a key to a value.
    Set(KeyPath, Value),
    /// Remove a key and everything nested under it.
    Remove(KeyPath),
}

impl Override {
    /// Applies the override to a configuration.
    pub fn apply(self, config: &mut Configuration) {
        match self {
            Self::Set(key, value) => {
                config.insert(String::from(key), value);
            }
            Self::Remove(key) => {
                config.remove_section(&key);
            }
        }
    }
}

// ============================================================================
// SECTION: Parsing
// ============================================================================

/// Parses an override expression into ordered overrides.
///
/// # Errors
/// Returns [`ValuesError::InvalidOverride`] when a pair lacks `=` or its key
/// is not a valid key path.
pub fn parse_overrides(expression: &str, mode: OverrideMode) -> Result<Vec<Override>, ValuesError> {
    split_unescaped(expression)
        .into_iter()
        .filter(|pair| !pair.is_empty())
        .map(|pair| parse_pair(expression, &pair, mode))
        .collect()
}

/// Parses one `key=value` pair.
fn parse_pair(expression: &str, pair: &str, mode: OverrideMode) -> Result<Override, ValuesError> {
    let Some((raw_key, raw_value)) = pair.split_once('=') else {
        return Err(ValuesError::InvalidOverride {
            expression: expression.to_string(),
            reason: format!("`{pair}` is not a key=value pair"),
        });
    };
    let key = KeyPath::parse(raw_key).map_err(|err| ValuesError::InvalidOverride {
        expression: expression.to_string(),
        reason: err.to_string(),
    })?;
    Ok(match (mode, raw_value) {
        (OverrideMode::Typed, "null") => Override::Remove(key),
        (OverrideMode::Typed, "true") => Override::Set(key, Value::Bool(true)),
        (OverrideMode::Typed, "false") => Override::Set(key, Value::Bool(false)),
        (_, value) => Override::Set(key, Value::from(value)),
    })
}

/// Splits on commas not preceded by a backslash, unescaping `\,`.
fn split_unescaped(expression: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut chars = expression.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' if chars.peek() == Some(&',') => {
                current.push(',');
                chars.next();
            }
            ',' => parts.push(std::mem::take(&mut current)),
            other => current.push(other),
        }
    }
    parts.push(current);
    parts
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        reason = "Test fixtures use explicit asserts and unwraps for clarity."
    )]

    use values_gate_core::KeyPath;
    use values_gate_core::Value;

    use super::Override;
    use super::OverrideMode;
    use super::parse_overrides;

    fn key(raw: &str) -> KeyPath {
        KeyPath::parse(raw).unwrap()
    }

    #[test]
    fn typed_mode_recognizes_booleans_and_null() {
        let parsed = parse_overrides("a=true,b=false,c=null,d=", OverrideMode::Typed).unwrap();
        assert_eq!(
            parsed,
            vec![
                Override::Set(key("a"), Value::Bool(true)),
                Override::Set(key("b"), Value::Bool(false)),
                Override::Remove(key("c")),
                Override::Set(key("d"), Value::from("")),
            ]
        );
    }

    #[test]
    fn string_mode_keeps_literals() {
        let parsed = parse_overrides("a=true,b=null", OverrideMode::String).unwrap();
        assert_eq!(
            parsed,
            vec![
                Override::Set(key("a"), Value::from("true")),
                Override::Set(key("b"), Value::from("null")),
            ]
        );
    }

    #[test]
    fn escaped_commas_and_equals_in_values() {
        let parsed = parse_overrides(r"a=x\,y,b=k=v", OverrideMode::Typed).unwrap();
        assert_eq!(
            parsed,
            vec![
                Override::Set(key("a"), Value::from("x,y")),
                Override::Set(key("b"), Value::from("k=v")),
            ]
        );
    }

    #[test]
    fn rejects_pairs_without_equals_or_bad_keys() {
        assert!(parse_overrides("novalue", OverrideMode::Typed).is_err());
        assert!(parse_overrides("a..b=1", OverrideMode::Typed).is_err());
    }
}
