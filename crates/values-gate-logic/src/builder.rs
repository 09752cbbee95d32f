// crates/values-gate-logic/src/builder.rs
// ============================================================================
// Module: Guard Builders
// Description: Fluent builders over the guard tree.
// Purpose: Provide ergonomic APIs for composing guards in code.
// Dependencies: crate::guard::Guard
// ============================================================================

//! ## Overview
//! Fluent builders simplify composing guard trees in code, keeping the same
//! invariants as the core [`Guard`] algebra.

use std::ops::Not;

use crate::guard::Guard;

// ============================================================================
// SECTION: Fluent Builder API
// ============================================================================

/// Fluent builder for a guard rooted at an arbitrary node.
pub struct GuardBuilder<C> {
    /// Root guard under construction.
    guard: Guard<C>,
}

impl<C> GuardBuilder<C> {
    /// Creates a new builder with the given guard as the root.
    pub const fn new(guard: Guard<C>) -> Self {
        Self {
            guard,
        }
    }

    /// Creates a builder starting with a condition.
    #[must_use]
    pub const fn condition(condition: C) -> Self {
        Self::new(Guard::Condition(condition))
    }

    /// Creates an `All` builder.
    #[must_use]
    pub const fn all() -> AllBuilder<C> {
        AllBuilder::new()
    }

    /// Creates an `Any` builder.
    #[must_use]
    pub const fn any() -> AnyBuilder<C> {
        AnyBuilder::new()
    }

    /// Combines this guard with another using `All`.
    #[must_use]
    pub fn and_also(self, other: Guard<C>) -> Self {
        Self::new(Guard::conjoin([self.guard, other]))
    }

    /// Combines this guard with another using `Any`.
    #[must_use]
    pub fn or_else(self, other: Guard<C>) -> Self {
        Self::new(Guard::any(vec![self.guard, other]))
    }

    /// Builds the final guard.
    pub fn build(self) -> Guard<C> {
        self.guard
    }
}

impl<C> Not for GuardBuilder<C> {
    type Output = Self;

    fn not(self) -> Self::Output {
        Self::new(Guard::negate(self.guard))
    }
}

// ============================================================================
// SECTION: All Builder
// ============================================================================

/// Builder for `All` guards.
pub struct AllBuilder<C> {
    /// Guards collected for the clause.
    guards: Vec<Guard<C>>,
}

impl<C> AllBuilder<C> {
    /// Creates an empty `All` builder.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            guards: Vec::new(),
        }
    }

    /// Adds a guard to the clause.
    #[must_use]
    pub fn with(mut self, guard: Guard<C>) -> Self {
        self.guards.push(guard);
        self
    }

    /// Adds a condition to the clause.
    #[must_use]
    pub fn with_condition(mut self, condition: C) -> Self {
        self.guards.push(Guard::Condition(condition));
        self
    }

    /// Builds the `All` guard.
    #[must_use]
    pub fn build(self) -> Guard<C> {
        Guard::all(self.guards)
    }
}

impl<C> Default for AllBuilder<C> {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// SECTION: Any Builder
// ============================================================================

/// Builder for `Any` guards.
pub struct AnyBuilder<C> {
    /// Guards collected for the clause.
    guards: Vec<Guard<C>>,
}

impl<C> AnyBuilder<C> {
    /// Creates an empty `Any` builder.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            guards: Vec::new(),
        }
    }

    /// Adds a guard to the clause.
    #[must_use]
    pub fn with(mut self, guard: Guard<C>) -> Self {
        self.guards.push(guard);
        self
    }

    /// Adds a condition to the clause.
    #[must_use]
    pub fn with_condition(mut self, condition: C) -> Self {
        self.guards.push(Guard::Condition(condition));
        self
    }

    /// Builds the `Any` guard.
    #[must_use]
    pub fn build(self) -> Guard<C> {
        Guard::any(self.guards)
    }
}

impl<C> Default for AnyBuilder<C> {
    fn default() -> Self {
        Self::new()
    }
}
