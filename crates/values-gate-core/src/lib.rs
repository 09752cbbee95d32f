// crates/values-gate-core/src/lib.rs
// ============================================================================
// Module: Values Gate Core Library
// Description: Public API surface for the values gate core.
// Purpose: Expose configuration types, rules, the validator, and env refs.
// Dependencies: crate::{catalog, core, runtime}
// ============================================================================

//! ## Overview
//! Values gate core checks a fully resolved chart configuration against an
//! ordered set of conditional requirements. Each rule is gated by a
//! [`values_gate_logic::Guard`] over [`Condition`] leaves; a rule fires when
//! its guard is open and its target key is absent or empty. The crate also
//! computes the environment variable references a rendered workload must
//! carry. It never applies defaults; callers hand it a resolved
//! [`Configuration`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod catalog;
pub mod core;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use catalog::CatalogError;
pub use catalog::builtin_rules;
pub use catalog::builtin_rule_set;
pub use runtime::DEFAULT_RELEASE_NAME;
pub use runtime::EnvMismatch;
pub use runtime::EnvRef;
pub use runtime::EnvRefResolver;
pub use runtime::EnvVar;
pub use runtime::EnvVarSource;
pub use runtime::ExpectedEnv;
pub use runtime::KeyRef;
pub use runtime::ReportMode;
pub use runtime::ResolveError;
pub use runtime::RuleExplanation;
pub use runtime::RuleOutcome;
pub use runtime::SourceKind;
pub use runtime::ValidationError;
pub use runtime::ValidationResult;
pub use runtime::Violation;
pub use runtime::Workload;
pub use runtime::explain;
pub use runtime::validate;
pub use runtime::verify_env;
