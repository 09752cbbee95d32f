// crates/values-gate-core/tests/support/mod.rs
// ============================================================================
// Module: Core Test Support
// Description: Shared fixtures for values gate core integration tests.
// ============================================================================
//! ## Overview
//! Result helpers and chart-shaped configuration fixtures. Fixtures include
//! the chart defaults, mirroring what a rendering pipeline hands the
//! validator after resolution.

#![allow(
    dead_code,
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test helpers are selectively used across suites."
)]

use std::error::Error;

use values_gate_core::Configuration;
use values_gate_core::RuleSet;
use values_gate_core::builtin_rule_set;

/// Result type for integration tests.
pub type TestResult<T = ()> = Result<T, Box<dyn Error>>;

/// Fails the test with `message` when `condition` is false.
pub fn ensure(condition: bool, message: impl Into<String>) -> TestResult {
    if condition { Ok(()) } else { Err(message.into().into()) }
}

/// Compiles the built-in rule set.
pub fn catalog() -> RuleSet {
    builtin_rule_set().expect("built-in catalog compiles")
}

/// Chart defaults as resolved before any user override.
pub fn chart_defaults() -> Configuration {
    Configuration::new()
        .with("global.edition", "community")
        .with("global.enterprise.secretName", "airbyte-config-secrets")
        .with("global.enterprise.licenseKeySecretKey", "license-key")
        .with("global.auth.instanceAdmin.secretName", "airbyte-config-secrets")
        .with("global.auth.instanceAdmin.emailSecretKey", "instance-admin-email")
        .with("global.auth.instanceAdmin.passwordSecretKey", "instance-admin-password")
}

/// Enterprise edition with an instance admin name, no SSO block.
pub fn enterprise() -> Configuration {
    chart_defaults()
        .with("global.edition", "enterprise")
        .with("global.auth.instanceAdmin.firstName", "Octavia")
        .with("global.auth.instanceAdmin.lastName", "Squidington")
}

/// Enterprise edition with a complete OIDC identity provider.
pub fn enterprise_oidc() -> Configuration {
    enterprise()
        .with("global.auth.identityProvider.secretName", "sso-secrets")
        .with("global.auth.identityProvider.type", "oidc")
        .with("global.auth.identityProvider.oidc.domain", "sso.example.com")
        .with("global.auth.identityProvider.oidc.appName", "example-app")
        .with("global.auth.identityProvider.oidc.clientIdSecretKey", "client-id")
        .with("global.auth.identityProvider.oidc.clientSecretSecretKey", "client-secret")
}
