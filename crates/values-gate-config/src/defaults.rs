// crates/values-gate-config/src/defaults.rs
// ============================================================================
// Module: Values Gate Chart Defaults
// Description: Default values shipped with the chart.
// Purpose: Seed the values resolution stage before user input is applied.
// Dependencies: values-gate-core
// ============================================================================

//! ## Overview
//! Only defaults that influence validation or env wiring are listed. Users
//! unset a default with an empty string or a `null` override.

use values_gate_core::Configuration;

/// Chart defaults as (key path, value) pairs.
pub const CHART_DEFAULTS: &[(&str, &str)] = &[
    ("global.edition", "community"),
    ("global.enterprise.secretName", "airbyte-config-secrets"),
    ("global.enterprise.licenseKeySecretKey", "license-key"),
    ("global.auth.instanceAdmin.secretName", "airbyte-config-secrets"),
    ("global.auth.instanceAdmin.emailSecretKey", "instance-admin-email"),
    ("global.auth.instanceAdmin.passwordSecretKey", "instance-admin-password"),
    ("keycloak-setup.initContainers.keycloakReadinessCheck.image", "curlimages/curl:8.1.1"),
];

/// Returns the chart defaults as a configuration.
#[must_use]
pub fn chart_defaults() -> Configuration {
    CHART_DEFAULTS.iter().copied().collect()
}
