//! Property tests for the parser and the `An+B` evaluator.

use quickcheck::TestResult;
use quickcheck_macros::quickcheck;
use selkie_select::{Nth, parse};

/// Fragments that glue into mostly-valid selector text.
const FRAGMENTS: &[&str] = &[
    "div", "p", "*", ".a", "#b", "[x]", "[y=\"z\" i]", "[lang|=en]", " ", " > ", " + ", " ~ ",
    ", ", ":first-child", ":checked", ":disabled", ":not(", ":is(", ":has(> ", ")", ":nth-child(2n+1)",
    ":text", ":header", "::before",
];

#[quickcheck]
fn parse_never_panics(input: String) -> bool {
    let _ = parse(&input);
    true
}

#[quickcheck]
fn canonical_text_reparses_to_same_selector(picks: Vec<u8>) -> TestResult {
    let text: String = picks
        .iter()
        .map(|&i| FRAGMENTS[usize::from(i) % FRAGMENTS.len()])
        .collect();
    let Ok(first) = parse(&text) else {
        return TestResult::discard();
    };
    let canonical = first.to_string();
    match parse(&canonical) {
        Ok(second) => TestResult::from_bool(first == second && second.to_string() == canonical),
        Err(e) => TestResult::error(format!("{text:?} -> {canonical:?}: {e}")),
    }
}

#[quickcheck]
fn nth_matches_agrees_with_enumeration(a: i8, b: i8, position: u8) -> TestResult {
    if position == 0 {
        return TestResult::discard();
    }
    let nth = Nth {
        a: i32::from(a),
        b: i32::from(b),
    };
    let target = i32::from(position);
    let expected = (0..=400).any(|n| nth.a * n + nth.b == target);
    TestResult::from_bool(nth.matches(usize::from(position)) == expected)
}

#[quickcheck]
fn nth_display_parses_back(a: i8, b: i8) -> bool {
    let nth = Nth {
        a: i32::from(a),
        b: i32::from(b),
    };
    Nth::parse(&nth.to_string()) == Some(nth)
}
