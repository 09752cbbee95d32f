// crates/values-gate-logic/tests/support/mod.rs
// ============================================================================
// Module: Test Support
// Description: Shared result helpers and mock conditions for guard tests.
// ============================================================================
//! ## Overview
//! Shared test helpers for consistent Result-based assertions plus a mock
//! condition evaluated against a fixed set of enabled flags.

#![allow(
    dead_code,
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::collections::BTreeSet;
use std::error::Error;
use std::fmt;

use values_gate_logic::ConditionEval;

// ========================================================================
// Test Result Helpers
// ========================================================================

/// Standard result type used across guard integration tests.
pub type TestResult<T = ()> = Result<T, Box<dyn Error>>;

/// Lightweight error type for test assertions.
#[derive(Debug)]
struct TestError {
    /// Human-readable failure message.
    message: String,
}

impl fmt::Display for TestError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.message)
    }
}

impl Error for TestError {}

/// Returns an error when a test condition fails.
///
/// # Errors
/// Returns a `TestError` when the condition is false.
pub fn ensure(condition: bool, message: impl Into<String>) -> TestResult {
    if condition {
        Ok(())
    } else {
        Err(Box::new(TestError {
            message: message.into(),
        }))
    }
}

// ========================================================================
// Mock Conditions
// ========================================================================

/// Named flags that are either enabled or not.
pub struct Flags(BTreeSet<&'static str>);

impl Flags {
    /// Creates a flag set with the given names enabled.
    pub fn on(names: &[&'static str]) -> Self {
        Self(names.iter().copied().collect())
    }
}

/// Mock condition checking a single named flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Flag(pub &'static str);

impl ConditionEval for Flag {
    type Reader<'a> = Flags;

    fn eval(&self, reader: &Self::Reader<'_>) -> bool {
        reader.0.contains(self.0)
    }
}
