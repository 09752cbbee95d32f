// crates/values-gate-core/src/core/condition.rs
// ============================================================================
// Module: Values Gate Conditions
// Description: Leaf conditions evaluated against a configuration.
// Purpose: Bind the guard algebra to configuration lookups and the guard DSL.
// Dependencies: crate::core::{key_path, values}, values-gate-logic, serde
// ============================================================================

//! ## Overview
//! A [`Condition`] is the leaf of a rule guard. Conditions are pure lookups
//! against a [`Configuration`]; the guard algebra composes them. The
//! [`ConditionParser`] maps guard DSL atoms onto conditions:
//!
//! | DSL atom | Condition |
//! |----------|-----------|
//! | `key` | [`Condition::IsTruthy`] |
//! | `set(key)` | [`Condition::IsSet`] |
//! | `present(key)` | [`Condition::SectionPresent`] |
//! | `key == 'v'` | [`Condition::Equals`] |
//! | `key != 'v'` | [`Condition::NotEquals`] |

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use values_gate_logic::Atom;
use values_gate_logic::CompareOp;
use values_gate_logic::ConditionEval;
use values_gate_logic::ConditionResolver;
use values_gate_logic::DslError;
use values_gate_logic::Guard;
use values_gate_logic::QuotedLiteral;
use values_gate_logic::parse_guard;

use crate::core::key_path::KeyPath;
use crate::core::values::Configuration;
use crate::core::values::Value;

// ============================================================================
// SECTION: Condition
// ============================================================================

/// Leaf condition over a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Condition {
    /// Key is present and renders exactly as `value`.
    Equals {
        /// Key to compare.
        key: KeyPath,
        /// Expected rendering.
        value: String,
    },
    /// Negation of [`Condition::Equals`]; an absent key is not equal.
    NotEquals {
        /// Key to compare.
        key: KeyPath,
        /// Rejected rendering.
        value: String,
    },
    /// Key is present and not the exact empty string.
    IsSet {
        /// Key to check.
        key: KeyPath,
    },
    /// Key is present and truthy.
    IsTruthy {
        /// Key to check.
        key: KeyPath,
    },
    /// Some key nested under `prefix` exists, or `prefix` holds a truthy scalar.
    SectionPresent {
        /// Section prefix.
        prefix: KeyPath,
    },
}

impl Condition {
    /// Builds an [`Condition::Equals`] condition.
    #[must_use]
    pub fn equals(key: KeyPath, value: impl Into<String>) -> Self {
        Self::Equals {
            key,
            value: value.into(),
        }
    }

    /// Builds a [`Condition::NotEquals`] condition.
    #[must_use]
    pub fn not_equals(key: KeyPath, value: impl Into<String>) -> Self {
        Self::NotEquals {
            key,
            value: value.into(),
        }
    }

    /// Builds an [`Condition::IsSet`] condition.
    #[must_use]
    pub const fn is_set(key: KeyPath) -> Self {
        Self::IsSet {
            key,
        }
    }

    /// Builds an [`Condition::IsTruthy`] condition.
    #[must_use]
    pub const fn is_truthy(key: KeyPath) -> Self {
        Self::IsTruthy {
            key,
        }
    }

    /// Builds a [`Condition::SectionPresent`] condition.
    #[must_use]
    pub const fn section_present(prefix: KeyPath) -> Self {
        Self::SectionPresent {
            prefix,
        }
    }

    /// Returns the key or prefix the condition reads.
    #[must_use]
    pub const fn key(&self) -> &KeyPath {
        match self {
            Self::Equals {
                key,
                ..
            }
            | Self::NotEquals {
                key,
                ..
            }
            | Self::IsSet {
                key,
            }
            | Self::IsTruthy {
                key,
            } => key,
            Self::SectionPresent {
                prefix,
            } => prefix,
        }
    }

    /// Evaluates the condition against a configuration.
    #[must_use]
    pub fn holds(&self, config: &Configuration) -> bool {
        match self {
            Self::Equals {
                key,
                value,
            } => config.get(key.as_str()).is_some_and(|actual| actual.render() == value.as_str()),
            Self::NotEquals {
                key,
                value,
            } => !config.get(key.as_str()).is_some_and(|actual| actual.render() == value.as_str()),
            Self::IsSet {
                key,
            } => config.is_set(key.as_str()),
            Self::IsTruthy {
                key,
            } => config.get(key.as_str()).is_some_and(Value::is_truthy),
            Self::SectionPresent {
                prefix,
            } => config.has_section(prefix),
        }
    }
}

impl ConditionEval for Condition {
    type Reader<'a> = Configuration;

    fn eval(&self, reader: &Self::Reader<'_>) -> bool {
        self.holds(reader)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equals {
                key,
                value,
            } => write!(f, "{key} == {}", QuotedLiteral(value)),
            Self::NotEquals {
                key,
                value,
            } => write!(f, "{key} != {}", QuotedLiteral(value)),
            Self::IsSet {
                key,
            } => write!(f, "set({key})"),
            Self::IsTruthy {
                key,
            } => write!(f, "{key}"),
            Self::SectionPresent {
                prefix,
            } => write!(f, "present({prefix})"),
        }
    }
}

// ============================================================================
// SECTION: DSL Binding
// ============================================================================

/// Resolves guard DSL atoms into [`Condition`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConditionParser;

impl ConditionResolver<Condition> for ConditionParser {
    fn resolve(&self, atom: &Atom<'_>) -> Option<Condition> {
        match *atom {
            Atom::Symbol(name) => KeyPath::parse(name).ok().map(Condition::is_truthy),
            Atom::Call {
                function,
                argument,
            } => {
                let key = KeyPath::parse(argument).ok()?;
                match function {
                    "set" => Some(Condition::is_set(key)),
                    "present" | "configured" => Some(Condition::section_present(key)),
                    _ => None,
                }
            }
            Atom::Compare {
                key,
                op,
                literal,
            } => {
                let key = KeyPath::parse(key).ok()?;
                Some(match op {
                    CompareOp::Eq => Condition::equals(key, literal),
                    CompareOp::Ne => Condition::not_equals(key, literal),
                })
            }
        }
    }
}

/// Parses a `when` expression into a condition guard.
///
/// # Errors
/// Returns [`DslError`] when the expression is malformed, references an
/// unknown function, or violates structural limits.
pub fn parse_when(input: &str) -> Result<Guard<Condition>, DslError> {
    parse_guard(input, &ConditionParser)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
