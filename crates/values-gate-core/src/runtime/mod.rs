// crates/values-gate-core/src/runtime/mod.rs
// ============================================================================
// Module: Values Gate Runtime
// Description: Rule evaluation and env reference verification.
// Purpose: Run rule sets against configurations and check rendered wiring.
// Dependencies: crate::core, values-gate-logic, tracing
// ============================================================================

//! ## Overview
//! Runtime helpers are pure functions of their inputs. Nothing here reads
//! files or environment; callers resolve values first.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod env_refs;
pub mod validator;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use env_refs::DEFAULT_RELEASE_NAME;
pub use env_refs::EnvMismatch;
pub use env_refs::EnvRef;
pub use env_refs::EnvRefResolver;
pub use env_refs::EnvVar;
pub use env_refs::EnvVarSource;
pub use env_refs::ExpectedEnv;
pub use env_refs::KeyRef;
pub use env_refs::ResolveError;
pub use env_refs::SourceKind;
pub use env_refs::Workload;
pub use env_refs::verify_env;
pub use validator::ReportMode;
pub use validator::RuleExplanation;
pub use validator::RuleOutcome;
pub use validator::ValidationError;
pub use validator::ValidationResult;
pub use validator::Violation;
pub use validator::explain;
pub use validator::validate;
