// crates/values-gate-cli/src/tests/logging.rs
// ============================================================================
// Module: CLI Logging Tests
// Description: Unit tests for log filter selection.
// Purpose: Ensure invalid directives fall back to the default filter.
// Dependencies: values-gate-cli logging module
// ============================================================================

//! ## Overview
//! Checks filter construction without installing a global subscriber.

use crate::logging::DEFAULT_LOG_FILTER;
use crate::logging::filter_from;

#[test]
fn unset_directive_uses_default() {
    assert_eq!(filter_from(None).to_string(), DEFAULT_LOG_FILTER);
}

#[test]
fn valid_directive_is_kept() {
    assert_eq!(filter_from(Some("values_gate_core=debug")).to_string(), "values_gate_core=debug");
}

#[test]
fn invalid_directive_falls_back() {
    assert_eq!(filter_from(Some("values_gate_core=loud")).to_string(), DEFAULT_LOG_FILTER);
}
