// crates/values-gate-config/src/lib.rs
// ============================================================================
// Module: Values Gate Config Library
// Description: Tool configuration, values resolution, and rule files.
// Purpose: Turn files and command-line overrides into inputs for the validator.
// Dependencies: values-gate-core, serde, serde_yaml, toml
// ============================================================================

//! ## Overview
//! `values-gate-config` owns everything that touches the filesystem before
//! validation runs: the `values-gate.toml` tool configuration, the values
//! resolution stage (chart defaults, values files, `--set` overrides), and
//! rule files that compile into a [`values_gate_core::RuleSet`].
//!
//! Security posture: every input here is untrusted; loaders enforce size
//! limits and fail closed.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod defaults;
pub mod overrides;
pub mod rules;
pub mod values;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use defaults::CHART_DEFAULTS;
pub use defaults::chart_defaults;
pub use overrides::Override;
pub use overrides::OverrideMode;
pub use overrides::parse_overrides;
pub use rules::MAX_RULE_FILE_SIZE;
pub use rules::RuleEntry;
pub use rules::RuleFile;
pub use rules::RuleFileError;
pub use rules::ScopeEntry;
pub use rules::load_rule_set;
pub use values::MAX_VALUES_FILE_SIZE;
pub use values::ValuesError;
pub use values::ValuesResolver;
