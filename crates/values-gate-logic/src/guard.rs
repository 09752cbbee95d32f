// crates/values-gate-logic/src/guard.rs
// ============================================================================
// Module: Guard Core Types
// Description: Boolean algebra over typed conditions.
// Purpose: Define the `Guard` tree, its evaluation paths, and analysis helpers.
// Dependencies: serde::{Deserialize, Serialize}, smallvec::SmallVec
// ============================================================================

//! ## Overview
//! A [`Guard`] is the enabling predicate of a rule. The logical operators
//! (`All`, `Any`, `Not`) are domain-agnostic while the `Condition` leaf is where
//! domain semantics are injected through [`ConditionEval`].
//!
//! Evaluation is top-down and short-circuiting: children of `All` are visited
//! in declaration order and evaluation stops at the first closed child. Scope
//! composition relies on this ordering so that a leaf condition is never
//! evaluated when an ancestor condition is closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use smallvec::SmallVec;

use crate::trace::GuardTrace;
use crate::trace::NoopTrace;
use crate::traits::ConditionEval;

// ============================================================================
// SECTION: Guard Definition
// ============================================================================

/// Composable guard tree with domain-specific leaves.
///
/// # Invariants
/// - Empty `All` is trivially open (mathematical identity).
/// - Empty `Any` is trivially closed (no alternatives).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Guard<C> {
    /// Logical AND: every child must be open.
    All(SmallVec<[Box<Self>; 4]>),

    /// Logical OR: at least one child must be open.
    Any(SmallVec<[Box<Self>; 4]>),

    /// Logical NOT: inverts the child.
    Not(Box<Self>),

    /// Domain-specific atomic condition.
    Condition(C),
}

// ============================================================================
// SECTION: Evaluation
// ============================================================================

impl<C> Guard<C> {
    /// Evaluates the guard with short-circuiting.
    pub fn eval(&self, reader: &C::Reader<'_>) -> bool
    where
        C: ConditionEval,
    {
        let mut trace = NoopTrace;
        self.eval_with_trace(reader, &mut trace)
    }

    /// Evaluates the guard and reports every condition actually visited.
    ///
    /// Conditions skipped by short-circuiting never reach the trace.
    pub fn eval_with_trace<T>(&self, reader: &C::Reader<'_>, trace: &mut T) -> bool
    where
        C: ConditionEval,
        T: GuardTrace<C>,
    {
        match self {
            Self::Condition(condition) => {
                let outcome = condition.eval(reader);
                trace.on_condition_evaluated(condition, outcome);
                outcome
            }
            Self::Not(inner) => !inner.eval_with_trace(reader, trace),
            Self::All(children) => {
                for child in children {
                    if !child.eval_with_trace(reader, trace) {
                        return false;
                    }
                }
                true
            }
            Self::Any(children) => {
                for child in children {
                    if child.eval_with_trace(reader, trace) {
                        return true;
                    }
                }
                false
            }
        }
    }

    // ========================================================================
    // SECTION: Static Analysis
    // ========================================================================

    /// Returns true when the guard is open regardless of the reader.
    pub fn is_trivially_open(&self) -> bool {
        match self {
            Self::All(children) => children.iter().all(|child| child.is_trivially_open()),
            Self::Any(children) => children.iter().any(|child| child.is_trivially_open()),
            Self::Not(inner) => inner.is_trivially_closed(),
            Self::Condition(_) => false,
        }
    }

    /// Returns true when the guard is closed regardless of the reader.
    pub fn is_trivially_closed(&self) -> bool {
        match self {
            Self::All(children) => children.iter().any(|child| child.is_trivially_closed()),
            Self::Any(children) => children.iter().all(|child| child.is_trivially_closed()),
            Self::Not(inner) => inner.is_trivially_open(),
            Self::Condition(_) => false,
        }
    }

    /// Returns the number of nodes in the tree.
    pub fn complexity(&self) -> usize {
        match self {
            Self::Condition(_) => 1,
            Self::Not(inner) => 1 + inner.complexity(),
            Self::All(children) | Self::Any(children) => {
                1 + children.iter().map(|child| child.complexity()).sum::<usize>()
            }
        }
    }

    /// Returns the depth of the tree (a lone condition has depth 1).
    pub fn depth(&self) -> usize {
        match self {
            Self::Condition(_) => 1,
            Self::Not(inner) => 1 + inner.depth(),
            Self::All(children) | Self::Any(children) => {
                1 + children.iter().map(|child| child.depth()).max().unwrap_or(0)
            }
        }
    }

    /// Collects every leaf condition in declaration order.
    pub fn conditions(&self) -> Vec<&C> {
        let mut out = Vec::new();
        self.collect_conditions(&mut out);
        out
    }

    /// Recursive helper for [`Guard::conditions`].
    fn collect_conditions<'a>(&'a self, out: &mut Vec<&'a C>) {
        match self {
            Self::Condition(condition) => out.push(condition),
            Self::Not(inner) => inner.collect_conditions(out),
            Self::All(children) | Self::Any(children) => {
                for child in children {
                    child.collect_conditions(out);
                }
            }
        }
    }
}

// ============================================================================
// SECTION: Rendering
// ============================================================================

/// Renders the guard in the function-call form accepted by the DSL
/// (`all(..)`, `any(..)`, `not(..)`), with leaves rendered by `C`.
impl<C: fmt::Display> fmt::Display for Guard<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (name, children) = match self {
            Self::All(children) => ("all", children),
            Self::Any(children) => ("any", children),
            Self::Not(child) => return write!(f, "not({child})"),
            Self::Condition(condition) => return condition.fmt(f),
        };
        f.write_str(name)?;
        f.write_str("(")?;
        for (index, child) in children.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            child.fmt(f)?;
        }
        f.write_str(")")
    }
}

// ============================================================================
// SECTION: Constructor Helpers
// ============================================================================

impl<C> Guard<C> {
    /// Returns the always-open guard (empty `All`).
    #[must_use]
    pub fn always() -> Self {
        Self::All(SmallVec::new())
    }

    /// Creates a logical AND of the given guards.
    pub fn all(guards: Vec<Self>) -> Self {
        Self::All(guards.into_iter().map(Box::new).collect())
    }

    /// Creates a logical OR of the given guards.
    pub fn any(guards: Vec<Self>) -> Self {
        Self::Any(guards.into_iter().map(Box::new).collect())
    }

    /// Creates a logical NOT of the given guard.
    pub fn negate(guard: Self) -> Self {
        Self::Not(Box::new(guard))
    }

    /// Creates a guard from a single condition.
    pub const fn condition(condition: C) -> Self {
        Self::Condition(condition)
    }

    /// Conjoins guards in order, flattening nested `All` nodes and dropping
    /// empty ones.
    ///
    /// The result preserves evaluation order: the first guard supplied is the
    /// first evaluated. A single surviving guard is returned unwrapped.
    pub fn conjoin<I>(guards: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        let mut flat: SmallVec<[Box<Self>; 4]> = SmallVec::new();
        for guard in guards {
            match guard {
                Self::All(children) => flat.extend(children),
                other => flat.push(Box::new(other)),
            }
        }
        if flat.len() == 1 {
            if let Some(only) = flat.pop() {
                return *only;
            }
        }
        Self::All(flat)
    }
}

impl<C> std::ops::Not for Guard<C> {
    type Output = Self;

    fn not(self) -> Self::Output {
        Self::Not(Box::new(self))
    }
}

impl<C> Default for Guard<C> {
    /// Creates an empty `All` guard (trivially open).
    fn default() -> Self {
        Self::always()
    }
}
