// crates/values-gate-core/src/core/mod.rs
// ============================================================================
// Module: Values Gate Core Types
// Description: Configuration, key path, condition, and rule types.
// Purpose: Provide the data model consumed by the validator.
// Dependencies: values-gate-logic, serde
// ============================================================================

//! ## Overview
//! Core types describe what is validated ([`Configuration`]) and what it is
//! validated against ([`RuleSet`]). Both are immutable once built.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod condition;
pub mod key_path;
pub mod rule;
pub mod values;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use condition::Condition;
pub use condition::ConditionParser;
pub use condition::parse_when;
pub use key_path::KeyPath;
pub use key_path::KeyPathError;
pub use key_path::MAX_KEY_PATH_LENGTH;
pub use rule::DEFAULT_MESSAGE_TEMPLATE;
pub use rule::MAX_RULES;
pub use rule::MAX_SCOPE_DEPTH;
pub use rule::MessageTemplate;
pub use rule::Rule;
pub use rule::RuleSet;
pub use rule::RuleSetBuilder;
pub use rule::RuleSetError;
pub use rule::RuleSpec;
pub use rule::ScopeSpec;
pub use values::Configuration;
pub use values::Value;
