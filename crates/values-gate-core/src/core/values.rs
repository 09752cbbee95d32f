// crates/values-gate-core/src/core/values.rs
// ============================================================================
// Module: Values Gate Configuration
// Description: Flattened, fully resolved chart configuration.
// Purpose: Provide key lookups, presence checks, and tree flattening.
// Dependencies: crate::core::key_path, serde, serde_json
// ============================================================================

//! ## Overview
//! A [`Configuration`] maps dotted key paths to scalar [`Value`]s. Nested
//! value trees are flattened on the way in: maps join with `.`, array
//! elements with `[index]`, and `null` leaves are dropped so that an unset
//! value and an absent value look the same to every rule.
//!
//! Inserting a key keeps the flattened view consistent with its tree shape:
//! any entries nested beneath the key and any scalar ancestors it would
//! shadow are removed first.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Bound;

use serde::Deserialize;
use serde::Serialize;

use crate::core::key_path::KeyPath;

// ============================================================================
// SECTION: Value
// ============================================================================

/// Scalar configuration value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Boolean value.
    Bool(bool),
    /// String value; numbers are stored in their decimal rendering.
    String(String),
}

impl Value {
    /// Renders the value the way a template would print it.
    #[must_use]
    pub fn render(&self) -> Cow<'_, str> {
        match self {
            Self::Bool(true) => Cow::Borrowed("true"),
            Self::Bool(false) => Cow::Borrowed("false"),
            Self::String(value) => Cow::Borrowed(value.as_str()),
        }
    }

    /// Returns true for the exact empty string.
    #[must_use]
    pub const fn is_empty_string(&self) -> bool {
        match self {
            Self::Bool(_) => false,
            Self::String(value) => value.is_empty(),
        }
    }

    /// Returns template truthiness: `true`, or a non-empty string other than
    /// `"false"`.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Bool(flag) => *flag,
            Self::String(value) => !value.is_empty() && value != "false",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Fully resolved configuration keyed by dotted path.
///
/// # Invariants
/// - No key is stored together with one of its ancestors or descendants.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Configuration {
    /// Flattened entries.
    entries: BTreeMap<String, Value>,
}

impl Configuration {
    /// Creates an empty configuration.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Flattens a nested value tree into a configuration.
    ///
    /// Empty maps and arrays contribute no keys.
    #[must_use]
    pub fn from_tree(tree: &serde_json::Value) -> Self {
        let mut config = Self::new();
        flatten_into("", tree, &mut config.entries);
        config
    }

    /// Returns the configuration with one more entry, for fluent construction.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Inserts a value, replacing any nested entries or shadowed ancestors.
    ///
    /// Returns the previous value stored under exactly this key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        self.remove_nested(&key);
        for ancestor in ancestors(&key) {
            self.entries.remove(ancestor);
        }
        self.entries.insert(key, value.into())
    }

    /// Returns the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Returns true when `key` is present and not the exact empty string.
    ///
    /// Whitespace-only strings and boolean `false` count as set.
    #[must_use]
    pub fn is_set(&self, key: &str) -> bool {
        self.entries.get(key).is_some_and(|value| !value.is_empty_string())
    }

    /// Returns true when `prefix` holds a section under template truthiness.
    ///
    /// Any key nested under `prefix` counts, even if its value is empty. A
    /// scalar stored exactly at `prefix` counts only when it is truthy, so
    /// `identityProvider: false` or an empty override disables the section.
    #[must_use]
    pub fn has_section(&self, prefix: &KeyPath) -> bool {
        self.entries
            .range::<str, _>((Bound::Included(prefix.as_str()), Bound::Unbounded))
            .take_while(|(key, _)| key.starts_with(prefix.as_str()))
            .any(|(key, value)| {
                if key.as_str() == prefix.as_str() {
                    value.is_truthy()
                } else {
                    prefix.contains(key)
                }
            })
    }

    /// Removes a single key.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.remove(key)
    }

    /// Removes `prefix` and everything nested under it, returning the count.
    pub fn remove_section(&mut self, prefix: &KeyPath) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| !prefix.contains(key));
        before - self.entries.len()
    }

    /// Applies `overlay` on top of this configuration; overlay entries win.
    pub fn merge(&mut self, overlay: Self) {
        for (key, value) in overlay.entries {
            self.insert(key, value);
        }
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when the configuration has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Removes entries strictly nested under `key`.
    fn remove_nested(&mut self, key: &str) {
        self.entries.retain(|existing, _| {
            existing
                .strip_prefix(key)
                .is_none_or(|rest| !(rest.starts_with('.') || rest.starts_with('[')))
        });
    }
}

impl<K, V> FromIterator<(K, V)> for Configuration
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut config = Self::new();
        for (key, value) in iter {
            config.insert(key, value);
        }
        config
    }
}

// ============================================================================
// SECTION: Flattening
// ============================================================================

/// Recursively flattens `node` under `prefix`.
fn flatten_into(prefix: &str, node: &serde_json::Value, out: &mut BTreeMap<String, Value>) {
    match node {
        serde_json::Value::Null => {}
        serde_json::Value::Bool(flag) => {
            out.insert(prefix.to_string(), Value::Bool(*flag));
        }
        serde_json::Value::Number(number) => {
            out.insert(prefix.to_string(), Value::String(number.to_string()));
        }
        serde_json::Value::String(text) => {
            out.insert(prefix.to_string(), Value::String(text.clone()));
        }
        serde_json::Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                flatten_into(&format!("{prefix}[{index}]"), item, out);
            }
        }
        serde_json::Value::Object(map) => {
            for (key, child) in map {
                let path = if prefix.is_empty() { key.clone() } else { format!("{prefix}.{key}") };
                flatten_into(&path, child, out);
            }
        }
    }
}

/// Yields every proper ancestor path of `key`, shortest first.
fn ancestors(key: &str) -> impl Iterator<Item = &str> {
    key.char_indices()
        .filter(|(index, ch)| *index > 0 && (*ch == '.' || *ch == '['))
        .map(move |(index, _)| &key[.. index])
}

// ============================================================================
// SECTION: Tests
// ============================================================================
