// crates/values-gate-core/tests/validator.rs
// ============================================================================
// Module: Requirement Validator Tests
// Description: Enterprise, SSO, and OIDC requirement scenarios.
// ============================================================================
//! ## Overview
//! Exercises the built-in catalog against chart-shaped configurations: one
//! missing field per scenario, nested gating, and fully valid installs.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::panic_in_result_fn,
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod support;

use support::TestResult;
use support::catalog;
use support::chart_defaults;
use support::ensure;
use support::enterprise;
use support::enterprise_oidc;
use values_gate_core::ReportMode;
use values_gate_core::RuleOutcome;
use values_gate_core::ValidationError;
use values_gate_core::ValidationResult;
use values_gate_core::Value;
use values_gate_core::explain;
use values_gate_core::validate;

/// Asserts that the result carries exactly `expected`.
fn expect_single(result: &ValidationResult, expected: &str) -> TestResult {
    let messages = result.messages();
    ensure(messages == [expected], format!("expected [{expected}], got {messages:?}"))
}

#[test]
fn community_edition_is_valid_without_enterprise_fields() -> TestResult {
    let config = chart_defaults().with("global.enterprise.secretName", "");
    ensure(validate(&config, &catalog()).is_valid(), "community edition should be valid")
}

#[test]
fn non_enterprise_edition_never_fires_enterprise_rules() -> TestResult {
    let config = support::enterprise()
        .with("global.edition", "cloud")
        .with("global.auth.identityProvider.secretName", "")
        .with("global.auth.instanceAdmin.firstName", "");
    ensure(validate(&config, &catalog()).is_valid(), "non-enterprise edition should be valid")
}

#[test]
fn enterprise_requires_each_base_field() -> TestResult {
    let cases = [
        "global.enterprise.secretName",
        "global.enterprise.licenseKeySecretKey",
        "global.auth.instanceAdmin.secretName",
        "global.auth.instanceAdmin.firstName",
        "global.auth.instanceAdmin.lastName",
        "global.auth.instanceAdmin.emailSecretKey",
        "global.auth.instanceAdmin.passwordSecretKey",
    ];
    let rules = catalog();
    for key in cases {
        let config = enterprise().with(key, "");
        let expected = format!("You must set `{key}` when `global.edition` is 'enterprise'");
        expect_single(&validate(&config, &rules), &expected)?;
    }
    Ok(())
}

#[test]
fn absent_key_fires_like_empty_string() -> TestResult {
    let mut config = enterprise();
    config.remove("global.auth.instanceAdmin.lastName");
    expect_single(
        &validate(&config, &catalog()),
        "You must set `global.auth.instanceAdmin.lastName` when `global.edition` is 'enterprise'",
    )
}

#[test]
fn empty_identity_provider_block_enables_sso() -> TestResult {
    let config = enterprise().with("global.auth.identityProvider.secretName", "");
    let result = validate(&config, &catalog());
    let messages = result.messages();
    ensure(
        messages
            == [
                "You must set `global.auth.identityProvider.secretName` when enabling SSO",
                "You must set `global.auth.identityProvider.type` when enabling SSO",
            ],
        format!("unexpected messages {messages:?}"),
    )
}

#[test]
fn falsy_identity_provider_scalar_disables_sso() -> TestResult {
    let rules = catalog();
    let cases: [(&str, Value); 3] = [
        ("boolean false", false.into()),
        ("string false", "false".into()),
        ("empty override", "".into()),
    ];
    for (label, value) in cases {
        let config = enterprise().with("global.auth.identityProvider", value);
        let result = validate(&config, &rules);
        let messages = result.messages();
        ensure(messages.is_empty(), format!("{label} should disable SSO, got {messages:?}"))?;
    }
    let enabled = enterprise().with("global.auth.identityProvider", true);
    let result = validate(&enabled, &rules);
    let messages = result.messages();
    ensure(
        messages
            == [
                "You must set `global.auth.identityProvider.secretName` when enabling SSO",
                "You must set `global.auth.identityProvider.type` when enabling SSO",
            ],
        format!("truthy scalar should enable SSO, got {messages:?}"),
    )
}

#[test]
fn sso_without_type_reports_only_type() -> TestResult {
    let config = enterprise_oidc().with("global.auth.identityProvider.type", "");
    expect_single(
        &validate(&config, &catalog()),
        "You must set `global.auth.identityProvider.type` when enabling SSO",
    )
}

#[test]
fn oidc_requires_each_field() -> TestResult {
    let rules = catalog();
    for field in ["domain", "appName", "clientIdSecretKey", "clientSecretSecretKey"] {
        let key = format!("global.auth.identityProvider.oidc.{field}");
        let config = enterprise_oidc().with(key.as_str(), "");
        let expected = format!("You must set `{key}` when enabling SSO");
        expect_single(&validate(&config, &rules), &expected)?;
    }
    Ok(())
}

#[test]
fn non_oidc_provider_skips_oidc_fields() -> TestResult {
    let config = enterprise()
        .with("global.auth.identityProvider.secretName", "sso-secrets")
        .with("global.auth.identityProvider.type", "generic-oidc");
    ensure(validate(&config, &catalog()).is_valid(), "oidc fields gated by provider type")
}

#[test]
fn complete_enterprise_oidc_install_is_valid() -> TestResult {
    let config = enterprise_oidc()
        .with("global.enterprise.secretName", "airbyte-license")
        .with("global.auth.instanceAdmin.secretName", "sso-secrets");
    let rules = catalog();
    let first = validate(&config, &rules);
    ensure(first == ValidationResult::Valid, format!("expected valid, got {first:?}"))?;
    ensure(validate(&config, &rules) == first, "validation must be idempotent")
}

#[test]
fn violations_follow_declaration_order_across_scopes() -> TestResult {
    let config = enterprise_oidc()
        .with("global.auth.identityProvider.oidc.appName", "")
        .with("global.enterprise.secretName", "")
        .with("global.auth.identityProvider.secretName", "");
    let result = validate(&config, &catalog());
    let ids: Vec<&str> =
        result.violations().iter().map(|violation| violation.rule_id.as_str()).collect();
    ensure(
        ids == [
            "global.enterprise.secretName",
            "global.auth.identityProvider.secretName",
            "global.auth.identityProvider.oidc.appName",
        ],
        format!("unexpected order {ids:?}"),
    )
}

#[test]
fn whitespace_and_false_count_as_set() -> TestResult {
    let config = enterprise()
        .with("global.auth.instanceAdmin.firstName", " ")
        .with("global.auth.instanceAdmin.lastName", false);
    ensure(validate(&config, &catalog()).is_valid(), "whitespace and false are set")
}

#[test]
fn report_modes_shape_errors() -> TestResult {
    let config = enterprise()
        .with("global.enterprise.secretName", "")
        .with("global.auth.instanceAdmin.firstName", "");
    let rules = catalog();
    let Err(ValidationError::Invalid {
        messages,
    }) = validate(&config, &rules).into_result(ReportMode::Aggregate)
    else {
        return Err("aggregate mode should fail".into());
    };
    ensure(messages.len() == 2, format!("aggregate carries all messages: {messages:?}"))?;

    let Err(err) = validate(&config, &rules).into_result(ReportMode::FailFast) else {
        return Err("fail-fast mode should fail".into());
    };
    ensure(
        err.to_string()
            == "You must set `global.enterprise.secretName` when `global.edition` is 'enterprise'",
        format!("fail-fast carries the first message: {err}"),
    )
}

#[test]
fn explain_shows_short_circuit_at_outer_scope() -> TestResult {
    let explanations = explain(&chart_defaults(), &catalog());
    let Some(oidc_domain) = explanations
        .iter()
        .find(|explanation| explanation.rule_id == "global.auth.identityProvider.oidc.domain")
    else {
        return Err("oidc domain rule missing".into());
    };
    let RuleOutcome::Gated {
        evaluated,
    } = &oidc_domain.outcome
    else {
        return Err(format!("expected gated outcome, got {:?}", oidc_domain.outcome).into());
    };
    ensure(evaluated.len() == 1, format!("only the edition check should run: {evaluated:?}"))?;
    ensure(!evaluated[0].1, "edition check should be closed")
}

#[test]
fn explain_reports_satisfied_and_violated() -> TestResult {
    let config = enterprise().with("global.auth.instanceAdmin.lastName", "");
    let explanations = explain(&config, &catalog());
    ensure(explanations.len() == catalog().len(), "one explanation per rule")?;
    ensure(matches!(explanations[0].outcome, RuleOutcome::Satisfied), "first rule satisfied")?;
    ensure(
        matches!(explanations[4].outcome, RuleOutcome::Violated { .. }),
        "lastName rule violated",
    )
}
