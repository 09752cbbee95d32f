// crates/values-gate-logic/tests/guard.rs
// ============================================================================
// Module: Guard Evaluation Tests
// Description: Evaluation, short-circuit, and analysis tests for guard trees.
// ============================================================================
//! ## Overview
//! Integration tests for the core guard type.

#![allow(
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

mod support;

use support::Flag;
use support::Flags;
use support::TestResult;
use support::ensure;
use values_gate_logic::Guard;
use values_gate_logic::GuardError;
use values_gate_logic::GuardLimits;
use values_gate_logic::GuardValidator;
use values_gate_logic::RecordingTrace;

/// Shorthand for a flag condition guard.
fn flag(name: &'static str) -> Guard<Flag> {
    Guard::condition(Flag(name))
}

// ============================================================================
// SECTION: Evaluation
// ============================================================================

#[test]
fn empty_all_is_open_and_empty_any_is_closed() -> TestResult {
    let flags = Flags::on(&[]);
    ensure(Guard::<Flag>::always().eval(&flags), "empty all should be open")?;
    ensure(!Guard::<Flag>::any(vec![]).eval(&flags), "empty any should be closed")?;
    Ok(())
}

#[test]
fn all_requires_every_child() -> TestResult {
    let guard = Guard::all(vec![flag("enterprise"), flag("sso")]);
    ensure(guard.eval(&Flags::on(&["enterprise", "sso"])), "both on should open")?;
    ensure(!guard.eval(&Flags::on(&["enterprise"])), "one off should close")?;
    Ok(())
}

#[test]
fn any_requires_one_child() -> TestResult {
    let guard = Guard::any(vec![flag("oidc"), flag("saml")]);
    ensure(guard.eval(&Flags::on(&["saml"])), "one on should open")?;
    ensure(!guard.eval(&Flags::on(&[])), "none on should close")?;
    Ok(())
}

#[test]
fn not_operator_inverts() -> TestResult {
    let guard = !flag("community");
    ensure(guard.eval(&Flags::on(&[])), "negated absent flag should open")?;
    ensure(!guard.eval(&Flags::on(&["community"])), "negated present flag should close")?;
    Ok(())
}

// ============================================================================
// SECTION: Short-Circuit Tracing
// ============================================================================

#[test]
fn closed_ancestor_skips_leaf_conditions() -> TestResult {
    let guard = Guard::conjoin([flag("enterprise"), flag("sso"), flag("oidc")]);
    let mut trace = RecordingTrace::new();
    let open = guard.eval_with_trace(&Flags::on(&["sso", "oidc"]), &mut trace);

    ensure(!open, "guard should be closed")?;
    ensure(
        trace.entries() == [(Flag("enterprise"), false)],
        format!("only the ancestor should be evaluated, got {:?}", trace.entries()),
    )?;
    ensure(trace.first_closed() == Some(&Flag("enterprise")), "first closed should be ancestor")?;
    Ok(())
}

#[test]
fn open_chain_visits_conditions_top_down() -> TestResult {
    let guard = Guard::conjoin([flag("enterprise"), flag("sso"), flag("oidc")]);
    let mut trace = RecordingTrace::new();
    let open = guard.eval_with_trace(&Flags::on(&["enterprise", "sso", "oidc"]), &mut trace);

    ensure(open, "guard should be open")?;
    let visited: Vec<&str> = trace.entries().iter().map(|(flag, _)| flag.0).collect();
    ensure(visited == ["enterprise", "sso", "oidc"], format!("unexpected order {visited:?}"))?;
    ensure(trace.first_closed().is_none(), "no condition should be closed")?;
    Ok(())
}

#[test]
fn any_stops_at_first_open_child() -> TestResult {
    let guard = Guard::any(vec![flag("a"), flag("b")]);
    let mut trace = RecordingTrace::new();
    let open = guard.eval_with_trace(&Flags::on(&["a", "b"]), &mut trace);
    ensure(open, "first alternative should open the guard")?;
    ensure(trace.entries().len() == 1, "second alternative should be skipped")?;
    Ok(())
}

// ============================================================================
// SECTION: Conjoin
// ============================================================================

#[test]
fn conjoin_flattens_nested_all_nodes() -> TestResult {
    let nested = Guard::all(vec![flag("a"), flag("b")]);
    let guard = Guard::conjoin([nested, Guard::always(), flag("c")]);
    ensure(
        guard == Guard::all(vec![flag("a"), flag("b"), flag("c")]),
        format!("unexpected shape {guard:?}"),
    )?;
    Ok(())
}

#[test]
fn conjoin_unwraps_single_guard() -> TestResult {
    let guard = Guard::conjoin([Guard::always(), flag("only")]);
    ensure(guard == flag("only"), "single survivor should be unwrapped")?;
    ensure(Guard::<Flag>::conjoin([]).is_trivially_open(), "empty conjoin should be open")?;
    Ok(())
}

#[test]
fn conjoin_keeps_any_nodes_intact() -> TestResult {
    let alternatives = Guard::any(vec![flag("a"), flag("b")]);
    let guard = Guard::conjoin([flag("root"), alternatives.clone()]);
    ensure(guard == Guard::all(vec![flag("root"), alternatives]), "any must not be flattened")?;
    Ok(())
}

// ============================================================================
// SECTION: Static Analysis
// ============================================================================

#[test]
fn trivial_analysis_matches_identities() -> TestResult {
    ensure(Guard::<Flag>::always().is_trivially_open(), "always is open")?;
    ensure(Guard::<Flag>::any(vec![]).is_trivially_closed(), "empty any is closed")?;
    ensure(Guard::negate(Guard::<Flag>::any(vec![])).is_trivially_open(), "not closed is open")?;
    ensure(!flag("x").is_trivially_open(), "conditions are never trivially open")?;
    ensure(!flag("x").is_trivially_closed(), "conditions are never trivially closed")?;
    Ok(())
}

#[test]
fn complexity_depth_and_conditions() -> TestResult {
    let guard = Guard::all(vec![flag("a"), Guard::any(vec![flag("b"), !flag("c")])]);
    ensure(guard.complexity() == 6, format!("complexity was {}", guard.complexity()))?;
    ensure(guard.depth() == 4, format!("depth was {}", guard.depth()))?;
    let names: Vec<&str> = guard.conditions().iter().map(|flag| flag.0).collect();
    ensure(names == ["a", "b", "c"], format!("conditions were {names:?}"))?;
    Ok(())
}

// ============================================================================
// SECTION: Structural Validation
// ============================================================================

#[test]
fn validator_rejects_deep_trees() -> TestResult {
    let mut guard = flag("leaf");
    for _ in 0 .. 5 {
        guard = Guard::negate(guard);
    }
    let validator = GuardValidator::new(GuardLimits {
        max_depth: 4,
        allow_empty_any: false,
    });
    ensure(
        validator.validate(&guard)
            == Err(GuardError::TooDeep {
                max_depth: 4,
                actual_depth: 5,
            }),
        "depth limit should trip at the fifth level",
    )?;
    ensure(GuardValidator::default().validate(&guard).is_ok(), "default limit is 32")?;
    Ok(())
}

#[test]
fn validator_rejects_empty_any_unless_allowed() -> TestResult {
    let guard = Guard::all(vec![flag("a"), Guard::any(vec![])]);
    ensure(
        GuardValidator::default().validate(&guard) == Err(GuardError::EmptyAny),
        "empty any should be rejected by default",
    )?;
    let permissive = GuardValidator::new(GuardLimits {
        allow_empty_any: true,
        ..GuardLimits::default()
    });
    ensure(permissive.validate(&guard).is_ok(), "empty any allowed when configured")?;
    Ok(())
}

#[test]
fn guard_round_trips_through_serde() -> TestResult {
    let guard = Guard::all(vec![Guard::condition(1u8), !Guard::condition(2u8)]);
    let json = serde_json::to_string(&guard)?;
    let back: Guard<u8> = serde_json::from_str(&json)?;
    ensure(back == guard, "serde round trip should preserve the tree")?;
    ensure(json.contains("\"all\""), format!("snake_case tags expected in {json}"))?;
    Ok(())
}
