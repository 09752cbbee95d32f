// crates/values-gate-logic/src/validate.rs
// ============================================================================
// Module: Guard Structural Validation
// Description: Depth and shape limits for guard trees.
// Purpose: Reject guards that are too deep or structurally meaningless.
// Dependencies: crate::guard, std::fmt
// ============================================================================

//! ## Overview
//! Guards arrive from rule files and are untrusted. [`GuardValidator`] checks
//! structure only; whether a condition is meaningful is the domain's concern.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use crate::guard::Guard;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Default maximum guard depth.
pub const DEFAULT_MAX_GUARD_DEPTH: usize = 32;

/// Structural limits applied to guard trees.
///
/// # Invariants
/// - No invariants are enforced; callers should choose safe bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuardLimits {
    /// Maximum allowed depth (a lone condition has depth 1).
    pub max_depth: usize,
    /// Whether an empty `Any` (never open) is accepted.
    pub allow_empty_any: bool,
}

impl Default for GuardLimits {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_GUARD_DEPTH,
            allow_empty_any: false,
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Structural validation failures for guard trees.
///
/// # Invariants
/// - None. Variants capture structured validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardError {
    /// Guard tree exceeded the depth limit.
    TooDeep {
        /// Maximum allowed depth.
        max_depth: usize,
        /// Depth reached when the limit tripped.
        actual_depth: usize,
    },
    /// An `Any` node had no children and can never be open.
    EmptyAny,
}

impl fmt::Display for GuardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooDeep {
                max_depth,
                actual_depth,
            } => write!(f, "guard too deep: {actual_depth} levels (max {max_depth})"),
            Self::EmptyAny => write!(f, "guard contains an empty `any` that can never be open"),
        }
    }
}

impl std::error::Error for GuardError {}

// ============================================================================
// SECTION: Validator
// ============================================================================

/// Validator for guard trees.
///
/// # Invariants
/// - Uses the stored [`GuardLimits`] for all validation decisions.
#[derive(Debug, Clone, Copy, Default)]
pub struct GuardValidator {
    /// Limits enforced by this validator.
    limits: GuardLimits,
}

impl GuardValidator {
    /// Creates a validator with the given limits.
    #[must_use]
    pub const fn new(limits: GuardLimits) -> Self {
        Self {
            limits,
        }
    }

    /// Returns the configured limits.
    #[must_use]
    pub const fn limits(&self) -> GuardLimits {
        self.limits
    }

    /// Validates a guard tree.
    ///
    /// # Errors
    /// Returns [`GuardError`] when the guard violates structural limits.
    pub fn validate<C>(&self, guard: &Guard<C>) -> Result<(), GuardError> {
        self.visit(guard, 1)
    }

    /// Walks the tree, tracking depth.
    fn visit<C>(&self, guard: &Guard<C>, depth: usize) -> Result<(), GuardError> {
        if depth > self.limits.max_depth {
            return Err(GuardError::TooDeep {
                max_depth: self.limits.max_depth,
                actual_depth: depth,
            });
        }
        match guard {
            Guard::Condition(_) => Ok(()),
            Guard::Not(inner) => self.visit(inner, depth + 1),
            Guard::Any(children) if children.is_empty() && !self.limits.allow_empty_any => {
                Err(GuardError::EmptyAny)
            }
            Guard::All(children) | Guard::Any(children) => {
                for child in children {
                    self.visit(child, depth + 1)?;
                }
                Ok(())
            }
        }
    }
}
