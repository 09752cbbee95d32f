// crates/values-gate-logic/src/traits.rs
// ============================================================================
// Module: Guard Traits
// Description: Evaluation contract between guard trees and domain conditions.
// Purpose: Let domains plug their own condition type and reader into guards.
// Dependencies: none
// ============================================================================

//! ## Overview
//! Domains implement [`ConditionEval`] for their leaf condition type. The
//! associated reader is whatever the domain evaluates against: a flat
//! configuration map, a record, or a test fixture.

// ============================================================================
// SECTION: Condition Trait
// ============================================================================

/// Core trait for condition evaluation.
///
/// Implementations must be pure: the same reader must always yield the same
/// outcome so guard evaluation stays deterministic.
pub trait ConditionEval {
    /// Domain-specific reader the condition is evaluated against.
    type Reader<'a>: ?Sized;

    /// Returns `true` when the condition holds for the reader.
    fn eval(&self, reader: &Self::Reader<'_>) -> bool;
}
