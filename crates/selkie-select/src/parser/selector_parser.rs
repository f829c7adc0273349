use std::sync::Arc;

use selkie_common::warn_once;

use crate::ast::{
    AttributeOperator, AttributeSelector, CaseSensitivity, Combinator, CompoundSelector, Nth,
    PseudoClass, SelectorGroup, SelectorSequence, SimpleSelector,
};
use crate::error::ParseError;
use crate::options::CompileOptions;
use crate::tokenizer::{SelectorToken, SelectorTokenizer, Token};

/// Source of alias expansions for the parser.
///
/// Returning `Ok(None)` means the name is not an alias.
pub trait AliasResolver {
    /// Look up the pre-parsed expansion of an alias pseudo-class.
    fn resolve(&mut self, name: &str) -> Result<Option<Arc<SelectorGroup>>, ParseError>;

    /// Whether `name` is an alias, without expanding it.
    fn is_alias(&self, name: &str) -> bool;
}

/// Recursive-descent selector parser over the token stream.
///
/// [§ 18 Grammar](https://www.w3.org/TR/selectors-4/#grammar)
///
/// ```text
/// <selector-list>          = <complex-selector>#
/// <relative-selector-list> = <relative-selector>#
/// <relative-selector>      = <combinator>? <complex-selector>
/// <complex-selector>       = <compound-selector> [ <combinator>? <compound-selector> ]*
/// ```
pub struct SelectorParser<'r> {
    tokenizer: SelectorTokenizer,
    position: usize,
    options: CompileOptions,
    resolver: &'r mut dyn AliasResolver,
    /// Current nesting of functional pseudo-class arguments.
    depth: usize,
    /// Offsets of the function tokens whose `)` is still outstanding.
    open_parens: Vec<usize>,
    /// Report never-matching pseudo-classes and pseudo-elements.
    warnings: bool,
}

impl<'r> SelectorParser<'r> {
    /// Create a parser for `input`. Alias names are looked up in `resolver`.
    pub fn new(input: &str, options: CompileOptions, resolver: &'r mut dyn AliasResolver) -> Self {
        let mut tokenizer = SelectorTokenizer::new(input);
        tokenizer.run();
        Self {
            tokenizer,
            position: 0,
            options,
            resolver,
            depth: 0,
            open_parens: Vec::new(),
            warnings: true,
        }
    }

    /// Parse without printing warnings, for selectors the user did not write.
    #[must_use]
    pub const fn without_warnings(mut self) -> Self {
        self.warnings = false;
        self
    }

    /// Parse the whole input as a selector list.
    pub fn parse(mut self) -> Result<SelectorGroup, ParseError> {
        let _ = self.skip_whitespace();
        if self.peek().is_eof() {
            return Err(ParseError::Empty);
        }

        let group = self.parse_group(false)?;

        if self.peek().is_eof() {
            Ok(group)
        } else {
            Err(self.error_here())
        }
    }

    // Token access

    fn current(&self) -> &Token {
        let tokens = self.tokenizer.tokens();
        // The tokenizer always ends the stream with EOF.
        &tokens[self.position.min(tokens.len() - 1)]
    }

    fn peek(&self) -> &SelectorToken {
        &self.current().kind
    }

    fn advance(&mut self) {
        if !self.peek().is_eof() {
            self.position += 1;
        }
    }

    /// Skip whitespace tokens, reporting whether any were skipped.
    fn skip_whitespace(&mut self) -> bool {
        let mut skipped = false;
        while self.peek().is_whitespace() {
            self.advance();
            skipped = true;
        }
        skipped
    }

    /// The error to report for the current token.
    fn error_here(&self) -> ParseError {
        let token = self.current();
        match &token.kind {
            SelectorToken::EOF => self
                .open_parens
                .last()
                .map_or(ParseError::UnexpectedEnd, |&position| ParseError::UnclosedParen {
                    position,
                }),
            SelectorToken::BadString => ParseError::UnterminatedString {
                position: token.start,
            },
            kind => ParseError::UnexpectedToken {
                found: kind.to_string(),
                position: token.start,
            },
        }
    }

    // Selector lists and sequences

    fn parse_group(&mut self, relative: bool) -> Result<SelectorGroup, ParseError> {
        let mut sequences = Vec::new();
        loop {
            let _ = self.skip_whitespace();
            sequences.push(self.parse_sequence(relative)?);
            let _ = self.skip_whitespace();
            if *self.peek() == SelectorToken::Comma {
                self.advance();
                continue;
            }
            break;
        }
        Ok(SelectorGroup { sequences })
    }

    fn consume_combinator(&mut self) -> Option<Combinator> {
        let combinator = match self.peek() {
            SelectorToken::Delim('>') => Combinator::Child,
            SelectorToken::Delim('+') => Combinator::AdjacentSibling,
            SelectorToken::Delim('~') => Combinator::GeneralSibling,
            _ => return None,
        };
        self.advance();
        Some(combinator)
    }

    /// [§ 3.2 Complex selectors](https://www.w3.org/TR/selectors-4/#complex)
    ///
    /// Compounds are collected left-to-right and then reversed so the subject
    /// comes first, matching the right-to-left evaluation order.
    fn parse_sequence(&mut self, relative: bool) -> Result<SelectorSequence, ParseError> {
        // [§ 3.3 Relative selectors](https://www.w3.org/TR/selectors-4/#relative)
        // "If a relative selector does not begin with a combinator, a descendant
        // combinator is implied."
        let anchor = if relative {
            let combinator = self.consume_combinator();
            let _ = self.skip_whitespace();
            Some(combinator.unwrap_or(Combinator::Descendant))
        } else {
            None
        };

        let mut compounds = Vec::new();
        let mut combinators_between = Vec::new();

        loop {
            compounds.push(self.parse_compound()?);

            let saw_whitespace = self.skip_whitespace();
            if let Some(combinator) = self.consume_combinator() {
                let _ = self.skip_whitespace();
                combinators_between.push(combinator);
                continue;
            }

            match self.peek() {
                SelectorToken::Comma | SelectorToken::RightParen | SelectorToken::EOF => break,
                _ if saw_whitespace => combinators_between.push(Combinator::Descendant),
                _ => return Err(self.error_here()),
            }
        }

        // For "A > B C": compounds [A, B, C], combinators [Child, Descendant]
        // → subject C, chain [(Descendant, B), (Child, A)]
        let Some(subject) = compounds.pop() else {
            return Err(self.error_here());
        };
        let combinators = compounds
            .into_iter()
            .zip(combinators_between)
            .rev()
            .map(|(compound, combinator)| (combinator, compound))
            .collect();

        Ok(SelectorSequence {
            subject,
            combinators,
            anchor,
        })
    }

    // Compound selectors

    /// [§ 3.1 Compound selectors](https://www.w3.org/TR/selectors-4/#compound)
    ///
    /// A type or universal selector may only come first.
    fn parse_compound(&mut self) -> Result<CompoundSelector, ParseError> {
        let mut simple_selectors = Vec::new();

        loop {
            let token = self.current().clone();
            let simple = match token.kind {
                SelectorToken::Ident(name) if simple_selectors.is_empty() => {
                    if self.starts_with_digit(token.start, token.end) {
                        return Err(self.error_here());
                    }
                    self.advance();
                    SimpleSelector::Type(name)
                }
                SelectorToken::Delim('*') if simple_selectors.is_empty() => {
                    self.advance();
                    SimpleSelector::Universal
                }
                SelectorToken::Hash(id) => {
                    if self.starts_with_digit(token.start + 1, token.end) {
                        return Err(self.error_here());
                    }
                    self.advance();
                    SimpleSelector::Id(id)
                }
                SelectorToken::Delim('.') => {
                    self.advance();
                    let class = self.current().clone();
                    let numeric = self.starts_with_digit(class.start, class.end);
                    match class.kind {
                        SelectorToken::Ident(name) if !numeric => {
                            self.advance();
                            SimpleSelector::Class(name)
                        }
                        _ => return Err(self.error_here()),
                    }
                }
                SelectorToken::LeftBracket => self.parse_attribute(token.start)?,
                SelectorToken::Colon => self.parse_pseudo()?,
                _ => break,
            };
            simple_selectors.push(simple);
        }

        if simple_selectors.is_empty() {
            return Err(self.error_here());
        }
        Ok(CompoundSelector { simple_selectors })
    }

    /// Whether the source text in `start..end` begins with a digit. Such text
    /// is a number, not an identifier; an escaped digit (`\31 0`) is fine.
    fn starts_with_digit(&self, start: usize, end: usize) -> bool {
        self.tokenizer
            .source(start, end)
            .starts_with(|c: char| c.is_ascii_digit())
    }

    /// [§ 6 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
    ///
    /// `[name]`, `[name op value]`, `[name op value i]`, `[name op value s]`
    fn parse_attribute(&mut self, open: usize) -> Result<SimpleSelector, ParseError> {
        self.advance(); // [
        let _ = self.skip_whitespace();

        let SelectorToken::Ident(name) = self.peek().clone() else {
            return Err(self.bracket_error(open));
        };
        self.advance();
        let _ = self.skip_whitespace();

        let operator = match self.peek() {
            SelectorToken::RightBracket => {
                self.advance();
                return Ok(SimpleSelector::Attribute(AttributeSelector::exists(name)));
            }
            SelectorToken::Delim('=') => AttributeOperator::Equals,
            SelectorToken::Delim(c @ ('~' | '|' | '^' | '$' | '*')) => {
                let operator = match *c {
                    '~' => AttributeOperator::Includes,
                    '|' => AttributeOperator::DashMatch,
                    '^' => AttributeOperator::Prefix,
                    '$' => AttributeOperator::Suffix,
                    _ => AttributeOperator::Substring,
                };
                self.advance();
                if *self.peek() != SelectorToken::Delim('=') {
                    return Err(self.bracket_error(open));
                }
                operator
            }
            _ => return Err(self.bracket_error(open)),
        };
        self.advance(); // =
        let _ = self.skip_whitespace();

        let value = match self.peek().clone() {
            SelectorToken::Ident(value) | SelectorToken::String(value) => value,
            _ => return Err(self.bracket_error(open)),
        };
        self.advance();
        let _ = self.skip_whitespace();

        let case = match self.peek() {
            SelectorToken::Ident(flag) if flag.eq_ignore_ascii_case("i") => {
                CaseSensitivity::AsciiInsensitive
            }
            SelectorToken::Ident(flag) if flag.eq_ignore_ascii_case("s") => {
                CaseSensitivity::ExplicitSensitive
            }
            _ => CaseSensitivity::Sensitive,
        };
        if case != CaseSensitivity::Sensitive {
            self.advance();
            let _ = self.skip_whitespace();
        }

        if *self.peek() != SelectorToken::RightBracket {
            return Err(self.bracket_error(open));
        }
        self.advance();

        Ok(SimpleSelector::Attribute(AttributeSelector {
            name,
            operator,
            value: Some(value),
            case,
        }))
    }

    fn bracket_error(&self, open: usize) -> ParseError {
        if self.peek().is_eof() {
            ParseError::UnclosedBracket { position: open }
        } else {
            self.error_here()
        }
    }

    // Pseudo-classes and pseudo-elements

    fn parse_pseudo(&mut self) -> Result<SimpleSelector, ParseError> {
        self.advance(); // :

        let token = self.current().clone();
        match token.kind {
            // [§ 3.6 Pseudo-elements](https://www.w3.org/TR/selectors-4/#pseudo-elements)
            SelectorToken::Colon => {
                self.advance();
                let SelectorToken::Ident(name) = self.peek().clone() else {
                    return Err(self.error_here());
                };
                self.advance();
                Ok(self.pseudo_element(&name))
            }
            SelectorToken::Ident(name) => {
                self.advance();
                self.pseudo_class(&name)
            }
            SelectorToken::Function(name) => {
                self.advance();
                self.pseudo_function(&name, token.start)
            }
            _ => Err(self.error_here()),
        }
    }

    /// A pseudo-class written without parentheses.
    fn pseudo_class(&mut self, name: &str) -> Result<SimpleSelector, ParseError> {
        let lower = name.to_ascii_lowercase();

        if let Some(pseudo) = simple_pseudo_class(&lower) {
            if pseudo.is_user_action() {
                self.warn(&format!("':{lower}' never matches a static tree"));
            }
            return Ok(SimpleSelector::PseudoClass(pseudo));
        }
        if is_legacy_pseudo_element(&lower) {
            // CSS 2 pseudo-elements may be written with a single colon.
            return Ok(self.pseudo_element(&lower));
        }
        if is_functional(&lower) {
            return Err(ParseError::MissingArgument { name: lower });
        }
        match self.resolver.resolve(&lower)? {
            Some(expansion) => Ok(SimpleSelector::PseudoClass(PseudoClass::Is(expansion))),
            None => Err(ParseError::UnknownPseudoClass { name: lower }),
        }
    }

    /// A pseudo-class written as a function: `:not(...)`, `:nth-child(...)`.
    fn pseudo_function(&mut self, name: &str, open: usize) -> Result<SimpleSelector, ParseError> {
        let lower = name.to_ascii_lowercase();

        let pseudo = match lower.as_str() {
            // [§ 4.2](https://www.w3.org/TR/selectors-4/#matches) / [§ 4.4](https://www.w3.org/TR/selectors-4/#zero-matches)
            // `:where()` differs from `:is()` only in specificity, which is not
            // computed here.
            "is" | "where" | "matches" | "-moz-any" | "-webkit-any" => {
                PseudoClass::Is(self.parse_nested(open, false)?)
            }
            "not" => PseudoClass::Not(self.parse_nested(open, false)?),
            "has" => PseudoClass::Has(self.parse_nested(open, true)?),
            "nth-child" => PseudoClass::NthChild(self.parse_nth(open)?),
            "nth-last-child" => PseudoClass::NthLastChild(self.parse_nth(open)?),
            "nth-of-type" => PseudoClass::NthOfType(self.parse_nth(open)?),
            "nth-last-of-type" => PseudoClass::NthLastOfType(self.parse_nth(open)?),
            _ => {
                let known = simple_pseudo_class(&lower).is_some()
                    || is_legacy_pseudo_element(&lower)
                    || self.resolver.is_alias(&lower);
                return Err(if known {
                    ParseError::UnexpectedArgument { name: lower }
                } else {
                    ParseError::UnknownPseudoClass { name: lower }
                });
            }
        };
        Ok(SimpleSelector::PseudoClass(pseudo))
    }

    /// Parse a parenthesized selector list; the function token is consumed.
    fn parse_nested(&mut self, open: usize, relative: bool) -> Result<Arc<SelectorGroup>, ParseError> {
        if self.depth >= self.options.max_nesting {
            return Err(ParseError::NestingTooDeep {
                limit: self.options.max_nesting,
            });
        }
        self.depth += 1;
        self.open_parens.push(open);

        let _ = self.skip_whitespace();
        let group = self.parse_group(relative)?;

        match self.peek() {
            SelectorToken::RightParen => self.advance(),
            SelectorToken::EOF => return Err(ParseError::UnclosedParen { position: open }),
            _ => return Err(self.error_here()),
        }

        let _ = self.open_parens.pop();
        self.depth -= 1;
        Ok(Arc::new(group))
    }

    /// Collect the raw argument text up to `)` and read it as `An+B`.
    fn parse_nth(&mut self, open: usize) -> Result<Nth, ParseError> {
        let start = self.current().start;
        let mut end = start;

        loop {
            match self.peek() {
                SelectorToken::RightParen => break,
                SelectorToken::EOF => return Err(ParseError::UnclosedParen { position: open }),
                SelectorToken::Ident(_)
                | SelectorToken::Delim('+' | '-')
                | SelectorToken::Whitespace => {
                    end = self.current().end;
                    self.advance();
                }
                _ => return Err(self.error_here()),
            }
        }
        self.advance(); // )

        let text = self.tokenizer.source(start, end);
        Nth::parse(&text).ok_or_else(|| ParseError::InvalidNth {
            text: text.trim().to_string(),
        })
    }

    fn pseudo_element(&self, name: &str) -> SimpleSelector {
        let lower = name.to_ascii_lowercase();
        self.warn(&format!("pseudo-element '::{lower}' never matches an element"));
        SimpleSelector::PseudoElement(lower)
    }

    fn warn(&self, message: &str) {
        if self.warnings {
            warn_once("Select", message);
        }
    }
}

/// Primitive pseudo-classes written without an argument.
fn simple_pseudo_class(name: &str) -> Option<PseudoClass> {
    Some(match name {
        "root" => PseudoClass::Root,
        "empty" => PseudoClass::Empty,
        "first-child" => PseudoClass::FirstChild,
        "last-child" => PseudoClass::LastChild,
        "only-child" => PseudoClass::OnlyChild,
        "first-of-type" => PseudoClass::FirstOfType,
        "last-of-type" => PseudoClass::LastOfType,
        "only-of-type" => PseudoClass::OnlyOfType,
        "visited" => PseudoClass::Visited,
        "hover" => PseudoClass::Hover,
        "active" => PseudoClass::Active,
        "focus" => PseudoClass::Focus,
        "focus-within" => PseudoClass::FocusWithin,
        "focus-visible" => PseudoClass::FocusVisible,
        "target" => PseudoClass::Target,
        _ => return None,
    })
}

fn is_legacy_pseudo_element(name: &str) -> bool {
    matches!(name, "before" | "after" | "first-line" | "first-letter")
}

/// Names that are only valid with an argument.
fn is_functional(name: &str) -> bool {
    matches!(
        name,
        "is" | "where"
            | "matches"
            | "-moz-any"
            | "-webkit-any"
            | "not"
            | "has"
            | "nth-child"
            | "nth-last-child"
            | "nth-of-type"
            | "nth-last-of-type"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Resolver with a single alias, `:odd` → `:nth-child(odd)`.
    struct OneAlias;

    impl AliasResolver for OneAlias {
        fn resolve(&mut self, name: &str) -> Result<Option<Arc<SelectorGroup>>, ParseError> {
            if name != "odd" {
                return Ok(None);
            }
            let mut none = NoAliases;
            SelectorParser::new(":nth-child(odd)", CompileOptions::default(), &mut none)
                .parse()
                .map(|group| Some(Arc::new(group)))
        }

        fn is_alias(&self, name: &str) -> bool {
            name == "odd"
        }
    }

    struct NoAliases;

    impl AliasResolver for NoAliases {
        fn resolve(&mut self, _name: &str) -> Result<Option<Arc<SelectorGroup>>, ParseError> {
            Ok(None)
        }

        fn is_alias(&self, _name: &str) -> bool {
            false
        }
    }

    fn parse(input: &str) -> Result<SelectorGroup, ParseError> {
        SelectorParser::new(input, CompileOptions::default(), &mut OneAlias).parse()
    }

    #[test]
    fn test_resolver_supplies_aliases() {
        let group = parse("li:odd").unwrap();
        assert_eq!(group.to_string(), "li:is(:nth-child(2n+1))");
        assert_eq!(
            parse("li:even"),
            Err(ParseError::UnknownPseudoClass {
                name: "even".into()
            })
        );
    }

    #[test]
    fn test_alias_with_argument_is_unexpected_argument() {
        assert_eq!(
            parse("li:odd(2)"),
            Err(ParseError::UnexpectedArgument { name: "odd".into() })
        );
        assert_eq!(
            parse(":before(x)"),
            Err(ParseError::UnexpectedArgument {
                name: "before".into()
            })
        );
    }

    #[test]
    fn test_whitespace_before_combinator_is_not_descendant() {
        let group = parse("a >b").unwrap();
        assert_eq!(group.sequences[0].combinators.len(), 1);
        assert_eq!(group.sequences[0].combinators[0].0, Combinator::Child);
    }

    #[test]
    fn test_nth_accepts_spaced_signs() {
        let group = parse(":nth-of-type( -2n - 1 )").unwrap();
        assert_eq!(group.to_string(), ":nth-of-type(-2n-1)");
    }

    #[test]
    fn test_nested_groups_close_in_order() {
        let group = parse(":not(:is(a, b), c) d").unwrap();
        assert_eq!(group.to_string(), ":not(:is(a, b), c) d");
    }

    #[test]
    fn test_relative_selector_only_inside_has() {
        assert!(parse(":has(> a)").is_ok());
        assert!(matches!(
            parse(":is(> a)"),
            Err(ParseError::UnexpectedToken { position: 4, .. })
        ));
    }

    #[test]
    fn test_error_inside_nested_group_reports_innermost_paren() {
        assert_eq!(
            parse(":is(:not(a"),
            Err(ParseError::UnclosedParen { position: 5 })
        );
    }
}
