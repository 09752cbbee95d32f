// crates/values-gate-logic/src/lib.rs
// ============================================================================
// Module: Guard Logic Root
// Description: Public API surface for the guard subsystem.
// Purpose: Wire together core modules, re-exports, and the guard macro.
// Dependencies: crate::{builder, dsl, guard, trace, traits, validate}
// ============================================================================

//! ## Overview
//! `values-gate-logic` provides the boolean algebra used to gate rules: a
//! [`Guard`] tree over domain conditions, structural validation, evaluation
//! tracing, fluent builders, and a compact expression DSL. It knows nothing
//! about configuration values; domains supply conditions through
//! [`ConditionEval`] and [`ConditionResolver`].

// ============================================================================
// SECTION: Core Modules
// ============================================================================

pub mod builder;
pub mod dsl;
pub mod guard;
pub mod trace;
pub mod traits;
pub mod validate;


// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use builder::AllBuilder;
pub use builder::AnyBuilder;
pub use builder::GuardBuilder;
pub use dsl::Atom;
pub use dsl::CompareOp;
pub use dsl::ConditionResolver;
pub use dsl::DslError;
pub use dsl::QuotedLiteral;
pub use dsl::parse_guard;
pub use guard::Guard;
pub use trace::GuardTrace;
pub use trace::NoopTrace;
pub use trace::RecordingTrace;
pub use traits::ConditionEval;
pub use validate::DEFAULT_MAX_GUARD_DEPTH;
pub use validate::GuardError;
pub use validate::GuardLimits;
pub use validate::GuardValidator;

// ============================================================================
// SECTION: Guard Macro
// ============================================================================

/// Macro for ergonomic guard construction.
///
/// ```
/// use values_gate_logic::guard;
///
/// let g: values_gate_logic::Guard<u8> = guard! {
///     all [
///         condition(1),
///         any [ condition(2), not(condition(3)) ]
///     ]
/// };
/// assert_eq!(g.depth(), 4);
/// ```
#[macro_export]
macro_rules! guard {
    (condition($cond:expr)) => {
        $crate::guard::Guard::condition($cond)
    };

    (not($inner:tt $($rest:tt)*)) => {
        $crate::guard::Guard::negate($crate::guard!($inner $($rest)*))
    };

    (all [$($name:ident $body:tt),* $(,)?]) => {
        $crate::guard::Guard::all(vec![$($crate::guard!($name $body)),*])
    };

    (any [$($name:ident $body:tt),* $(,)?]) => {
        $crate::guard::Guard::any(vec![$($crate::guard!($name $body)),*])
    };
}
