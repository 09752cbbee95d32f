// crates/values-gate-logic/tests/builder.rs
// ============================================================================
// Module: Guard Builder Tests
// Description: Fluent builder and macro construction tests.
// ============================================================================
//! ## Overview
//! Ensures builders and the `guard!` macro produce the same trees as the
//! constructor helpers.

mod support;

use support::Flag;
use support::Flags;
use support::TestResult;
use support::ensure;
use values_gate_logic::Guard;
use values_gate_logic::GuardBuilder;
use values_gate_logic::guard;

#[test]
fn all_builder_matches_constructor() -> TestResult {
    let built =
        GuardBuilder::all().with_condition(Flag("a")).with(Guard::condition(Flag("b"))).build();
    ensure(
        built == Guard::all(vec![Guard::condition(Flag("a")), Guard::condition(Flag("b"))]),
        "all builder shape",
    )?;
    Ok(())
}

#[test]
fn any_builder_matches_constructor() -> TestResult {
    let built = GuardBuilder::any().with_condition(Flag("a")).with_condition(Flag("b")).build();
    ensure(
        built == Guard::any(vec![Guard::condition(Flag("a")), Guard::condition(Flag("b"))]),
        "any builder shape",
    )?;
    Ok(())
}

#[test]
fn chained_builder_evaluates() -> TestResult {
    let guard = (!GuardBuilder::condition(Flag("community")))
        .and_also(Guard::condition(Flag("sso")))
        .build();
    ensure(guard.eval(&Flags::on(&["sso"])), "sso without community should open")?;
    ensure(!guard.eval(&Flags::on(&["sso", "community"])), "community should close")?;

    let either = GuardBuilder::condition(Flag("a")).or_else(Guard::condition(Flag("b"))).build();
    ensure(either.eval(&Flags::on(&["b"])), "or_else should open on second")?;
    Ok(())
}

#[test]
fn macro_matches_constructor() -> TestResult {
    let from_macro: Guard<Flag> = guard! {
        all [
            condition(Flag("a")),
            any [ condition(Flag("b")), not(condition(Flag("c"))) ]
        ]
    };
    let expected = Guard::all(vec![
        Guard::condition(Flag("a")),
        Guard::any(vec![Guard::condition(Flag("b")), !Guard::condition(Flag("c"))]),
    ]);
    ensure(from_macro == expected, "macro shape")?;
    Ok(())
}
