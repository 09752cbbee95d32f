// crates/values-gate-core/src/catalog.rs
// ============================================================================
// Module: Values Gate Built-in Catalog
// Description: Enterprise edition requirements for the Airbyte chart.
// Purpose: Provide the default rule set used when no rule file is configured.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! The built-in catalog encodes the chart's enterprise requirements as three
//! nested scopes:
//!
//! - `enterprise`: `global.edition == 'enterprise'`
//! - `sso` (within `enterprise`): the `global.auth.identityProvider` block
//!   is configured
//! - `oidc` (within `sso`): `global.auth.identityProvider.type == 'oidc'`
//!
//! OIDC rules inherit the `sso` description, so their messages read
//! "when enabling SSO".

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;
use values_gate_logic::DslError;

use crate::core::KeyPath;
use crate::core::KeyPathError;
use crate::core::RuleSet;
use crate::core::RuleSetBuilder;
use crate::core::RuleSetError;
use crate::core::RuleSpec;
use crate::core::ScopeSpec;
use crate::core::parse_when;

// ============================================================================
// SECTION: Catalog Tables
// ============================================================================

/// Scope declarations: (name, within, when, describe).
const SCOPES: &[(&str, Option<&str>, &str, Option<&str>)] = &[
    (
        "enterprise",
        None,
        "global.edition == 'enterprise'",
        Some("`global.edition` is 'enterprise'"),
    ),
    ("sso", Some("enterprise"), "present(global.auth.identityProvider)", Some("enabling SSO")),
    ("oidc", Some("sso"), "global.auth.identityProvider.type == 'oidc'", None),
];

/// Rule declarations in reporting order: (scope, key).
const RULES: &[(&str, &str)] = &[
    ("enterprise", "global.enterprise.secretName"),
    ("enterprise", "global.enterprise.licenseKeySecretKey"),
    ("enterprise", "global.auth.instanceAdmin.secretName"),
    ("enterprise", "global.auth.instanceAdmin.firstName"),
    ("enterprise", "global.auth.instanceAdmin.lastName"),
    ("enterprise", "global.auth.instanceAdmin.emailSecretKey"),
    ("enterprise", "global.auth.instanceAdmin.passwordSecretKey"),
    ("sso", "global.auth.identityProvider.secretName"),
    ("sso", "global.auth.identityProvider.type"),
    ("oidc", "global.auth.identityProvider.oidc.domain"),
    ("oidc", "global.auth.identityProvider.oidc.appName"),
    ("oidc", "global.auth.identityProvider.oidc.clientIdSecretKey"),
    ("oidc", "global.auth.identityProvider.oidc.clientSecretSecretKey"),
];

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors compiling the built-in catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A catalog key failed validation.
    #[error("catalog key invalid: {0}")]
    Key(#[from] KeyPathError),
    /// A catalog guard failed to parse.
    #[error("catalog guard invalid: {0}")]
    Guard(#[from] DslError),
    /// The catalog failed to compile.
    #[error("catalog rule set invalid: {0}")]
    RuleSet(#[from] RuleSetError),
}

// ============================================================================
// SECTION: Builders
// ============================================================================

/// Returns the built-in scope and rule declarations.
///
/// # Errors
/// Returns [`CatalogError`] if a catalog entry is malformed.
pub fn builtin_rules() -> Result<RuleSetBuilder, CatalogError> {
    let mut builder = RuleSetBuilder::new();
    for (name, within, when, describe) in SCOPES {
        let mut scope = ScopeSpec::new(*name, parse_when(when)?);
        if let Some(parent) = within {
            scope = scope.within(*parent);
        }
        if let Some(describe) = describe {
            scope = scope.describe(*describe);
        }
        builder = builder.scope(scope);
    }
    for (scope, key) in RULES {
        builder = builder.rule(RuleSpec::new(KeyPath::parse(key)?).in_scope(*scope));
    }
    Ok(builder)
}

/// Compiles the built-in rule set.
///
/// # Errors
/// Returns [`CatalogError`] if the catalog fails to compile.
pub fn builtin_rule_set() -> Result<RuleSet, CatalogError> {
    Ok(builtin_rules()?.build()?)
}
