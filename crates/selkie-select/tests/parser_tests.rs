//! Integration tests for selector parsing, canonical serialization and
//! compile-time errors.

use selkie_select::{
    AttributeOperator, CaseSensitivity, Combinator, CompileOptions, Nth, ParseError, PseudoClass,
    SimpleSelector, compile, compile_with, parse,
};

// ========== Structure ==========

#[test]
fn test_parse_compound() {
    let group = parse("div.card#main[data-x]").unwrap();
    assert_eq!(group.sequences.len(), 1);
    let subject = &group.sequences[0].subject;
    assert_eq!(subject.simple_selectors.len(), 4);
    assert!(matches!(&subject.simple_selectors[0], SimpleSelector::Type(name) if name == "div"));
    assert!(matches!(&subject.simple_selectors[1], SimpleSelector::Class(name) if name == "card"));
    assert!(matches!(&subject.simple_selectors[2], SimpleSelector::Id(name) if name == "main"));
    assert!(matches!(
        &subject.simple_selectors[3],
        SimpleSelector::Attribute(attr) if attr.name == "data-x" && attr.operator == AttributeOperator::Exists
    ));
}

#[test]
fn test_parse_combinators_right_to_left() {
    let group = parse("a > b c").unwrap();
    let sequence = &group.sequences[0];
    assert_eq!(sequence.subject.type_name(), Some("c"));
    assert_eq!(sequence.combinators.len(), 2);
    assert_eq!(sequence.combinators[0].0, Combinator::Descendant);
    assert_eq!(sequence.combinators[0].1.type_name(), Some("b"));
    assert_eq!(sequence.combinators[1].0, Combinator::Child);
    assert_eq!(sequence.combinators[1].1.type_name(), Some("a"));
    assert_eq!(sequence.leftmost().type_name(), Some("a"));
    assert_eq!(sequence.anchor, None);
}

#[test]
fn test_parse_sibling_combinators_without_spaces() {
    let group = parse("h1+p~ul").unwrap();
    let sequence = &group.sequences[0];
    assert_eq!(sequence.combinators[0].0, Combinator::GeneralSibling);
    assert_eq!(sequence.combinators[1].0, Combinator::AdjacentSibling);
}

#[test]
fn test_parse_selector_list() {
    let group = parse("h1 , h2,h3").unwrap();
    let names: Vec<_> = group
        .sequences
        .iter()
        .map(|s| s.subject.type_name().unwrap())
        .collect();
    assert_eq!(names, vec!["h1", "h2", "h3"]);
}

#[test]
fn test_parse_attribute_forms() {
    let group = parse("[lang|=\"en\" i][title~=a]").unwrap();
    let simple = &group.sequences[0].subject.simple_selectors;
    let SimpleSelector::Attribute(lang) = &simple[0] else {
        panic!("expected attribute selector");
    };
    assert_eq!(lang.operator, AttributeOperator::DashMatch);
    assert_eq!(lang.value.as_deref(), Some("en"));
    assert_eq!(lang.case, CaseSensitivity::AsciiInsensitive);
    let SimpleSelector::Attribute(title) = &simple[1] else {
        panic!("expected attribute selector");
    };
    assert_eq!(title.operator, AttributeOperator::Includes);
    assert_eq!(title.case, CaseSensitivity::Sensitive);
}

#[test]
fn test_parse_has_anchors() {
    let group = parse(":has(> li, img, + p)").unwrap();
    let SimpleSelector::PseudoClass(PseudoClass::Has(argument)) =
        &group.sequences[0].subject.simple_selectors[0]
    else {
        panic!("expected :has()");
    };
    let anchors: Vec<_> = argument.sequences.iter().map(|s| s.anchor).collect();
    assert_eq!(
        anchors,
        vec![
            Some(Combinator::Child),
            Some(Combinator::Descendant),
            Some(Combinator::AdjacentSibling)
        ]
    );
}

#[test]
fn test_parse_nth_arguments() {
    let group = parse("li:nth-child(2n + 1):nth-last-of-type(-n+3)").unwrap();
    let simple = &group.sequences[0].subject.simple_selectors;
    assert!(matches!(
        &simple[1],
        SimpleSelector::PseudoClass(PseudoClass::NthChild(Nth { a: 2, b: 1 }))
    ));
    assert!(matches!(
        &simple[2],
        SimpleSelector::PseudoClass(PseudoClass::NthLastOfType(Nth { a: -1, b: 3 }))
    ));
}

#[test]
fn test_pseudo_class_names_are_case_insensitive() {
    assert!(parse(":FIRST-CHILD").is_ok());
    assert!(parse(":Checked").is_ok());
    assert!(parse(":NOT(p)").is_ok());
}

#[test]
fn test_alias_is_spliced_as_is() {
    let group = parse(":checkbox").unwrap();
    let SimpleSelector::PseudoClass(PseudoClass::Is(expansion)) =
        &group.sequences[0].subject.simple_selectors[0]
    else {
        panic!("alias should expand to :is()");
    };
    assert!(matches!(
        &expansion.sequences[0].subject.simple_selectors[0],
        SimpleSelector::Attribute(attr) if attr.name == "type" && attr.value.as_deref() == Some("checkbox")
    ));
}

#[test]
fn test_pseudo_elements_and_user_actions_parse() {
    assert!(parse("p::before").is_ok());
    assert!(parse("p:after").is_ok());
    assert!(parse("a:hover").is_ok());
}

// ========== Canonical text ==========

#[test]
fn test_display_canonical_text() {
    let cases = [
        ("div  >  p.x", "div > p.x"),
        ("a  b", "a b"),
        ("h1+p", "h1 + p"),
        ("[type=checkbox]", "[type=\"checkbox\"]"),
        ("[lang|=en i]", "[lang|=\"en\" i]"),
        (":where(a)", ":is(a)"),
        ("li:nth-child(odd)", "li:nth-child(2n+1)"),
        (":has(+ p)", ":has(+ p)"),
        (":has(p)", ":has(p)"),
        (":checkbox", ":is([type=\"checkbox\"])"),
        ("a,b", "a, b"),
    ];
    for (input, expected) in cases {
        assert_eq!(compile(input).unwrap().to_string(), expected, "input: {input}");
    }
}

#[test]
fn test_display_reparses_to_same_ast() {
    for input in [
        "div.a > ul li:first-child",
        ":not(:disabled)",
        ":selected",
        "#x\\:y",
        "#\\31 a",
        ".\\31 0",
        "[title=\"a \\\"quoted\\\" word\"]",
        "section:has(> h2 + p)",
    ] {
        let first = parse(input).unwrap();
        let second = parse(&first.to_string()).unwrap();
        assert_eq!(first, second, "input: {input}");
    }
}

#[test]
fn test_compiled_keeps_source() {
    let selector = compile("  :checked ").unwrap();
    assert_eq!(selector.source(), "  :checked ");
    assert_eq!(selector.group().sequences.len(), 1);
}

// ========== Errors ==========

#[test]
fn test_empty_selector() {
    assert_eq!(parse(""), Err(ParseError::Empty));
    assert_eq!(parse("   "), Err(ParseError::Empty));
    assert_eq!(parse("/* nothing */"), Err(ParseError::Empty));
}

#[test]
fn test_unclosed_paren() {
    assert_eq!(parse(":is(a,"), Err(ParseError::UnclosedParen { position: 1 }));
    assert_eq!(parse(":is(a"), Err(ParseError::UnclosedParen { position: 1 }));
    assert!(matches!(
        parse("p:not(:has(a)"),
        Err(ParseError::UnclosedParen { position: 2 })
    ));
    assert!(matches!(
        parse(":nth-child(2n"),
        Err(ParseError::UnclosedParen { .. })
    ));
}

#[test]
fn test_unclosed_bracket() {
    assert_eq!(parse("[href"), Err(ParseError::UnclosedBracket { position: 0 }));
    assert_eq!(parse("a[href="), Err(ParseError::UnclosedBracket { position: 1 }));
}

#[test]
fn test_unterminated_string() {
    assert_eq!(
        parse("[a=\"x"),
        Err(ParseError::UnterminatedString { position: 3 })
    );
}

#[test]
fn test_unknown_pseudo_class() {
    assert_eq!(
        parse(":bogus"),
        Err(ParseError::UnknownPseudoClass {
            name: "bogus".into()
        })
    );
    assert!(matches!(
        parse(":bogus(a)"),
        Err(ParseError::UnknownPseudoClass { .. })
    ));
}

#[test]
fn test_argument_mismatches() {
    assert_eq!(
        parse(":checked(x)"),
        Err(ParseError::UnexpectedArgument {
            name: "checked".into()
        })
    );
    assert_eq!(
        parse(":first-child(1)"),
        Err(ParseError::UnexpectedArgument {
            name: "first-child".into()
        })
    );
    assert_eq!(
        parse(":not"),
        Err(ParseError::MissingArgument { name: "not".into() })
    );
}

#[test]
fn test_invalid_nth() {
    assert_eq!(
        parse(":nth-child(foo)"),
        Err(ParseError::InvalidNth { text: "foo".into() })
    );
}

#[test]
fn test_dangling_combinators_and_commas() {
    assert_eq!(parse("div >"), Err(ParseError::UnexpectedEnd));
    assert_eq!(parse("a,"), Err(ParseError::UnexpectedEnd));
    assert!(matches!(
        parse("a,,b"),
        Err(ParseError::UnexpectedToken { position: 2, .. })
    ));
    assert!(matches!(
        parse("> a"),
        Err(ParseError::UnexpectedToken { position: 0, .. })
    ));
    assert!(matches!(
        parse("a > > b"),
        Err(ParseError::UnexpectedToken { .. })
    ));
}

#[test]
fn test_unexpected_tokens() {
    // `!=` is not a CSS attribute operator.
    assert!(matches!(
        parse("[type!=text]"),
        Err(ParseError::UnexpectedToken { .. })
    ));
    assert!(matches!(parse("a b)"), Err(ParseError::UnexpectedToken { .. })));
    assert!(matches!(parse("1a"), Err(ParseError::UnexpectedToken { .. })));
    assert!(matches!(
        parse(".1a"),
        Err(ParseError::UnexpectedToken { position: 1, .. })
    ));
    assert!(matches!(
        parse("p#1a"),
        Err(ParseError::UnexpectedToken { position: 1, .. })
    ));
    assert!(matches!(parse("a.b*"), Err(ParseError::UnexpectedToken { .. })));
}

#[test]
fn test_nesting_limit() {
    let options = CompileOptions::default().with_max_nesting(2);
    assert!(compile_with(":is(:is(a))", &options).is_ok());
    assert_eq!(
        compile_with(":is(:is(:is(a)))", &options).unwrap_err(),
        ParseError::NestingTooDeep { limit: 2 }
    );

    let deep = format!("{}a{}", ":not(".repeat(40), ")".repeat(40));
    assert_eq!(
        compile(&deep).unwrap_err(),
        ParseError::NestingTooDeep {
            limit: CompileOptions::DEFAULT_MAX_NESTING
        }
    );
}

#[test]
fn test_alias_depth_limit() {
    let options = CompileOptions::default().with_max_alias_depth(1);
    assert!(compile_with(":any-link", &options).is_ok());
    assert_eq!(
        compile_with(":link", &options).unwrap_err(),
        ParseError::AliasCycle {
            chain: "link -> any-link".into()
        }
    );
}

#[test]
fn test_error_messages() {
    assert_eq!(
        parse(":is(a,").unwrap_err().to_string(),
        "missing ')' for the group opened at position 1"
    );
    assert_eq!(
        parse(":bogus").unwrap_err().to_string(),
        "unknown pseudo-class ':bogus'"
    );
}
