// crates/values-gate-core/tests/rule_set.rs
// ============================================================================
// Module: Rule Set Compilation Tests
// Description: Scope resolution, description inheritance, and fail-closed errors.
// ============================================================================
//! ## Overview
//! Compiles hand-built scope and rule declarations and checks both the
//! compiled guards and every rejection path.

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
use support::ensure;
use values_gate_core::Condition;
use values_gate_core::Configuration;
use values_gate_core::KeyPath;
use values_gate_core::MessageTemplate;
use values_gate_core::RuleSetBuilder;
use values_gate_core::RuleSetError;
use values_gate_core::RuleSpec;
use values_gate_core::ScopeSpec;
use values_gate_core::parse_when;
use values_gate_core::validate;
use values_gate_logic::Guard;

/// Parses a key path.
fn key(raw: &str) -> KeyPath {
    KeyPath::parse(raw).unwrap()
}

/// Parses a guard expression.
fn when(raw: &str) -> Guard<Condition> {
    parse_when(raw).unwrap()
}

#[test]
fn scope_guards_are_conjoined_outermost_first() -> TestResult {
    let rules = RuleSetBuilder::new()
        .scope(ScopeSpec::new("outer", when("a == 'x'")).describe("outer on"))
        .scope(ScopeSpec::new("inner", when("set(b)")).within("outer"))
        .rule(RuleSpec::new(key("c")).in_scope("inner").when(when("d")))
        .build()?;
    let rule = &rules.rules()[0];
    let expected = Guard::all(vec![
        Guard::condition(Condition::equals(key("a"), "x")),
        Guard::condition(Condition::is_set(key("b"))),
        Guard::condition(Condition::is_truthy(key("d"))),
    ]);
    ensure(rule.guard() == &expected, format!("unexpected guard {:?}", rule.guard()))?;
    ensure(rule.when() == "outer on", "description inherited from nearest scope")?;
    ensure(rule.id() == "c", "id defaults to key")
}

#[test]
fn rule_description_and_message_override_scope() -> TestResult {
    let rules = RuleSetBuilder::new()
        .scope(ScopeSpec::new("s", Guard::always()).describe("scope text"))
        .rule(
            RuleSpec::new(key("k"))
                .in_scope("s")
                .id("custom")
                .describe("rule text")
                .message(MessageTemplate::new("{key} is required ({when})")),
        )
        .build()?;
    let result = validate(&Configuration::new(), &rules);
    ensure(result.messages() == ["k is required (rule text)"], format!("got {result:?}"))?;
    ensure(result.violations()[0].rule_id == "custom", "explicit id used")
}

#[test]
fn unscoped_rule_without_description_is_rejected() -> TestResult {
    let result = RuleSetBuilder::new().rule(RuleSpec::new(key("k"))).build();
    ensure(matches!(result, Err(RuleSetError::MissingDescription(_))), format!("got {result:?}"))?;
    let custom = RuleSetBuilder::new()
        .rule(RuleSpec::new(key("k")).message(MessageTemplate::new("{key} is always required")))
        .build();
    ensure(custom.is_ok(), "message without {when} needs no description")
}

#[test]
fn rejects_unknown_scope_and_parent() -> TestResult {
    let unknown = RuleSetBuilder::new().rule(RuleSpec::new(key("k")).in_scope("nope")).build();
    ensure(matches!(unknown, Err(RuleSetError::UnknownScope { .. })), format!("got {unknown:?}"))?;
    let orphan = RuleSetBuilder::new()
        .scope(ScopeSpec::new("child", Guard::always()).within("missing"))
        .build();
    ensure(matches!(orphan, Err(RuleSetError::UnknownParent { .. })), format!("got {orphan:?}"))
}

#[test]
fn rejects_scope_cycles_and_duplicates() -> TestResult {
    let cycle = RuleSetBuilder::new()
        .scope(ScopeSpec::new("a", Guard::always()).within("b"))
        .scope(ScopeSpec::new("b", Guard::always()).within("a"))
        .build();
    ensure(matches!(cycle, Err(RuleSetError::ScopeCycle(_))), format!("got {cycle:?}"))?;
    let duplicate_scope = RuleSetBuilder::new()
        .scope(ScopeSpec::new("a", Guard::always()))
        .scope(ScopeSpec::new("a", Guard::always()))
        .build();
    ensure(
        matches!(duplicate_scope, Err(RuleSetError::DuplicateScope(_))),
        format!("got {duplicate_scope:?}"),
    )?;
    let duplicate_rule = RuleSetBuilder::new()
        .rule(RuleSpec::new(key("k")).describe("x"))
        .rule(RuleSpec::new(key("k")).describe("y"))
        .build();
    ensure(
        matches!(duplicate_rule, Err(RuleSetError::DuplicateRule(_))),
        format!("got {duplicate_rule:?}"),
    )
}

#[test]
fn rejects_scope_chains_past_depth_limit() -> TestResult {
    let mut builder = RuleSetBuilder::new().scope(ScopeSpec::new("s0", Guard::always()));
    for level in 1 ..= values_gate_core::MAX_SCOPE_DEPTH {
        builder = builder.scope(
            ScopeSpec::new(format!("s{level}"), Guard::always())
                .within(format!("s{}", level - 1)),
        );
    }
    let result = builder.build();
    ensure(matches!(result, Err(RuleSetError::ScopeTooDeep { .. })), format!("got {result:?}"))
}

#[test]
fn rejects_guards_past_depth_limit() -> TestResult {
    let mut guard = Guard::condition(Condition::is_set(key("a")));
    for _ in 0 .. 40 {
        guard = Guard::negate(guard);
    }
    let result =
        RuleSetBuilder::new().rule(RuleSpec::new(key("k")).describe("x").when(guard)).build();
    ensure(matches!(result, Err(RuleSetError::InvalidGuard { .. })), format!("got {result:?}"))
}
