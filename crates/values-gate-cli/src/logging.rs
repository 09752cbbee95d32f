// crates/values-gate-cli/src/logging.rs
// ============================================================================
// Module: CLI Logging
// Description: Installs the tracing subscriber for diagnostic output.
// Purpose: Route library tracing events to stderr under an env filter.
// Dependencies: tracing-subscriber
// ============================================================================

//! ## Overview
//! Diagnostics go to stderr so stdout stays machine-readable. The filter is
//! read from [`LOG_ENV`] and defaults to [`DEFAULT_LOG_FILTER`], for example
//! `VALUES_GATE_LOG=values_gate_core=debug`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::util::TryInitError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Environment variable holding the log filter directive.
pub const LOG_ENV: &str = "VALUES_GATE_LOG";
/// Filter used when [`LOG_ENV`] is unset or invalid.
pub const DEFAULT_LOG_FILTER: &str = "warn";

// ============================================================================
// SECTION: Initialization
// ============================================================================

/// Builds the filter from a directive, falling back to the default.
#[must_use]
pub fn filter_from(directive: Option<&str>) -> EnvFilter {
    directive
        .and_then(|value| EnvFilter::try_new(value).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Installs the global subscriber.
///
/// # Errors
///
/// Returns [`TryInitError`] when a global subscriber is already set.
pub fn init() -> Result<(), TryInitError> {
    let directive = std::env::var(LOG_ENV).ok();
    tracing_subscriber::registry()
        .with(filter_from(directive.as_deref()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_target(true))
        .try_init()
}
