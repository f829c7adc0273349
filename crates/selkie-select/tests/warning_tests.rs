//! Warnings printed while compiling selectors.
//!
//! The warning set is process-wide, so these tests live in their own binary
//! and only compile selectors whose warnings they check.

use selkie_common::has_warned;
use selkie_select::{ParseError, compile, parse};

const VISITED: &str = "':visited' never matches a static tree";

#[test]
fn test_aliases_compile_without_warnings() {
    // `:link` expands to `:any-link:not(:visited)`.
    assert!(compile("div").is_ok());
    assert!(compile(":link, :enabled").is_ok());
    assert!(!has_warned("Select", VISITED));
}

#[test]
fn test_argument_errors_do_not_warn() {
    assert_eq!(
        parse(":hover(x)"),
        Err(ParseError::UnexpectedArgument {
            name: "hover".into()
        })
    );
    assert_eq!(
        parse(":after(x)"),
        Err(ParseError::UnexpectedArgument {
            name: "after".into()
        })
    );
    assert_eq!(
        parse(":checked(x)"),
        Err(ParseError::UnexpectedArgument {
            name: "checked".into()
        })
    );
    assert!(!has_warned("Select", "':hover' never matches a static tree"));
    assert!(!has_warned(
        "Select",
        "pseudo-element '::after' never matches an element"
    ));
}

#[test]
fn test_user_written_state_warns() {
    assert!(compile("a:focus").is_ok());
    assert!(has_warned("Select", "':focus' never matches a static tree"));
}
