// crates/values-gate-cli/src/lib.rs
// ============================================================================
// Module: Values Gate CLI Library
// Description: Shared helpers for the values gate command-line interface.
// Purpose: Provide reusable components (i18n, logging) for the CLI binary and tests.
// Dependencies: tracing-subscriber
// ============================================================================

//! ## Overview
//! This library module houses shared CLI utilities: the message catalog
//! behind the [`t!`] macro and the logging bootstrap. The binary entry point
//! (`src/main.rs`) imports these helpers to keep all user-facing output
//! consistent.
//!
//! Security posture: CLI inputs are untrusted and must be validated.

// ============================================================================
// SECTION: Modules
// ============================================================================

/// Internationalization helpers and message catalog.
pub mod i18n;
/// Diagnostic logging bootstrap.
pub mod logging;
