// crates/values-gate-logic/src/trace.rs
// ============================================================================
// Module: Guard Evaluation Tracing
// Description: Hooks observing which conditions a guard evaluation visited.
// Purpose: Support explain output without burdening the hot evaluation path.
// Dependencies: none
// ============================================================================

//! ## Overview
//! [`GuardTrace`] receives one callback per condition that evaluation actually
//! reached. Because guards short-circuit, a trace doubles as a record of which
//! ancestor condition closed a nested rule.

// ============================================================================
// SECTION: Trace Hook
// ============================================================================

/// Observer invoked for each evaluated condition.
pub trait GuardTrace<C> {
    /// Called after a condition is evaluated.
    fn on_condition_evaluated(&mut self, condition: &C, outcome: bool);
}

/// Trace that discards all events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTrace;

impl<C> GuardTrace<C> for NoopTrace {
    fn on_condition_evaluated(&mut self, _condition: &C, _outcome: bool) {}
}

// ============================================================================
// SECTION: Recording Trace
// ============================================================================

/// Trace that records evaluated conditions in visit order.
///
/// # Invariants
/// - `entries` are appended in the order evaluation visited them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingTrace<C> {
    /// Evaluated conditions paired with their outcomes.
    entries: Vec<(C, bool)>,
}

impl<C> RecordingTrace<C> {
    /// Creates an empty recording trace.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Returns the recorded entries.
    #[must_use]
    pub fn entries(&self) -> &[(C, bool)] {
        &self.entries
    }

    /// Consumes the trace, returning the recorded entries.
    #[must_use]
    pub fn into_entries(self) -> Vec<(C, bool)> {
        self.entries
    }

    /// Returns the first condition that evaluated to `false`, if any.
    #[must_use]
    pub fn first_closed(&self) -> Option<&C> {
        self.entries.iter().find(|(_, outcome)| !outcome).map(|(condition, _)| condition)
    }
}

impl<C> Default for RecordingTrace<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clone> GuardTrace<C> for RecordingTrace<C> {
    fn on_condition_evaluated(&mut self, condition: &C, outcome: bool) {
        self.entries.push((condition.clone(), outcome));
    }
}
