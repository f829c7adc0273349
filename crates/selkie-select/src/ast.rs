//! Selector AST.
//!
//! The canonical in-memory form of a selector per
//! [Selectors Level 4](https://www.w3.org/TR/selectors-4/). Alias names never
//! appear here: the parser splices each alias in as an `:is()` over its
//! pre-parsed expansion, so every node is a primitive.
//!
//! All types are immutable values after parsing. Nested groups are held in
//! [`Arc`] so alias expansions are shared between selectors and threads.

use core::fmt;
use std::sync::Arc;

use strum_macros::{Display, IntoStaticStr};

/// [§ 5 Elemental selectors](https://www.w3.org/TR/selectors-4/#elemental-selectors)
/// [§ 6 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
///
/// A simple selector is a single condition on an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimpleSelector {
    /// [§ 5.1 Type selector](https://www.w3.org/TR/selectors-4/#type-selectors)
    ///
    /// Examples: `div`, `option`, `h1`
    Type(String),

    /// [§ 5.2 Universal selector](https://www.w3.org/TR/selectors-4/#universal-selector)
    ///
    /// Example: `*`
    Universal,

    /// [§ 6.7 ID selector](https://www.w3.org/TR/selectors-4/#id-selectors)
    ///
    /// Example: `#main`
    Id(String),

    /// [§ 6.6 Class selector](https://www.w3.org/TR/selectors-4/#class-html)
    ///
    /// Example: `.highlight`
    Class(String),

    /// [§ 6.4 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
    ///
    /// Examples: `[href]`, `[type=checkbox]`, `[lang|=en i]`
    Attribute(AttributeSelector),

    /// [§ 3.5 Pseudo-classes](https://www.w3.org/TR/selectors-4/#pseudo-classes)
    ///
    /// Examples: `:first-of-type`, `:not(.a)`, `:has(> option[selected])`
    PseudoClass(PseudoClass),

    /// [§ 3.6 Pseudo-elements](https://www.w3.org/TR/selectors-4/#pseudo-elements)
    ///
    /// Pseudo-elements are not elements of the tree, so a compound containing
    /// one never matches.
    ///
    /// Example: `::before`
    PseudoElement(String),
}

/// Operator of an attribute selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum AttributeOperator {
    /// `[att]`: "Represents an element with the att attribute"
    #[strum(to_string = "")]
    Exists,
    /// `[att=val]`: value is exactly `val`
    #[strum(to_string = "=")]
    Equals,
    /// `[att~=val]`: value is a whitespace-separated list containing `val`
    #[strum(to_string = "~=")]
    Includes,
    /// `[att|=val]`: value is `val` or begins with `val-`
    #[strum(to_string = "|=")]
    DashMatch,
    /// `[att^=val]`: value begins with `val`
    #[strum(to_string = "^=")]
    Prefix,
    /// `[att$=val]`: value ends with `val`
    #[strum(to_string = "$=")]
    Suffix,
    /// `[att*=val]`: value contains `val`
    #[strum(to_string = "*=")]
    Substring,
}

/// [§ 6.3 Case-sensitivity](https://www.w3.org/TR/selectors-4/#attribute-case)
///
/// Attribute values compare case-sensitively unless the selector carries
/// the `i` flag. The `s` flag states the default explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaseSensitivity {
    /// No flag given.
    #[default]
    Sensitive,
    /// `[att=val s]`
    ExplicitSensitive,
    /// `[att=val i]`
    AsciiInsensitive,
}

/// An attribute test: `[name operator value flag]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSelector {
    /// Attribute name, compared exactly.
    pub name: String,
    /// The comparison to perform.
    pub operator: AttributeOperator,
    /// Value to compare against; `None` only for [`AttributeOperator::Exists`].
    pub value: Option<String>,
    /// How values are compared.
    pub case: CaseSensitivity,
}

impl AttributeSelector {
    /// `[name]`
    #[must_use]
    pub fn exists(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            operator: AttributeOperator::Exists,
            value: None,
            case: CaseSensitivity::Sensitive,
        }
    }

    /// Test an attribute value (`None` when the attribute is absent).
    #[must_use]
    pub fn matches_value(&self, actual: Option<&str>) -> bool {
        let Some(actual) = actual else {
            return false;
        };
        let expected = self.value.as_deref().unwrap_or_default();

        let (actual, expected) = if self.case == CaseSensitivity::AsciiInsensitive {
            (actual.to_ascii_lowercase(), expected.to_ascii_lowercase())
        } else {
            (actual.to_string(), expected.to_string())
        };

        match self.operator {
            AttributeOperator::Exists => true,
            AttributeOperator::Equals => actual == expected,
            // "If 'val' contains whitespace, it will never represent anything
            // (since the words are separated by spaces). Also if 'val' is the
            // empty string, it will never represent anything."
            AttributeOperator::Includes => {
                !expected.is_empty()
                    && !expected.contains(|c: char| c.is_ascii_whitespace())
                    && actual.split_ascii_whitespace().any(|w| w == expected)
            }
            AttributeOperator::DashMatch => {
                actual == expected
                    || actual
                        .strip_prefix(expected.as_str())
                        .is_some_and(|rest| rest.starts_with('-'))
            }
            // "If 'val' is the empty string then the selector does not represent anything."
            AttributeOperator::Prefix => !expected.is_empty() && actual.starts_with(&expected),
            AttributeOperator::Suffix => !expected.is_empty() && actual.ends_with(&expected),
            AttributeOperator::Substring => !expected.is_empty() && actual.contains(&expected),
        }
    }
}

/// An `An+B` formula for the `:nth-*` pseudo-classes.
///
/// [CSS Syntax § 6 The An+B microsyntax](https://www.w3.org/TR/css-syntax-3/#anb-microsyntax)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Nth {
    /// Step.
    pub a: i32,
    /// Offset.
    pub b: i32,
}

impl Nth {
    /// Parse `odd`, `even`, `B`, `An`, `An+B`, `-n+B`, ... (whitespace ignored).
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let compact: String = text
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();

        match compact.as_str() {
            "odd" => return Some(Self { a: 2, b: 1 }),
            "even" => return Some(Self { a: 2, b: 0 }),
            "" => return None,
            _ => {}
        }

        let Some((a_part, b_part)) = compact.split_once('n') else {
            return Some(Self {
                a: 0,
                b: parse_signed(&compact)?,
            });
        };

        let a = match a_part {
            "" | "+" => 1,
            "-" => -1,
            other => parse_signed(other)?,
        };
        let b = if b_part.is_empty() {
            0
        } else if b_part.starts_with(['+', '-']) {
            parse_signed(b_part)?
        } else {
            return None;
        };
        Some(Self { a, b })
    }

    /// Whether a 1-based position satisfies `a*n + b` for some `n >= 0`.
    #[must_use]
    pub fn matches(self, position: usize) -> bool {
        let Ok(position) = i64::try_from(position) else {
            return false;
        };
        let (a, b) = (i64::from(self.a), i64::from(self.b));
        if a == 0 {
            return position == b;
        }
        let diff = position - b;
        diff % a == 0 && diff / a >= 0
    }
}

/// Parse an optionally signed decimal integer (`+3`, `-2`, `7`).
fn parse_signed(text: &str) -> Option<i32> {
    let digits = text.strip_prefix('+').unwrap_or(text);
    if digits.is_empty() || digits.starts_with('+') {
        return None;
    }
    digits.parse().ok()
}

impl fmt::Display for Nth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.a, self.b) {
            (0, b) => write!(f, "{b}"),
            (a, 0) => write!(f, "{a}n"),
            (a, b) if b > 0 => write!(f, "{a}n+{b}"),
            (a, b) => write!(f, "{a}n{b}"),
        }
    }
}

/// The closed set of primitive pseudo-classes the matcher understands.
///
/// Alias pseudo-classes (`:checked`, `:disabled`, ...) are not listed: they
/// parse to [`PseudoClass::Is`] over their expansion.
#[derive(Debug, Clone, PartialEq, Eq, IntoStaticStr)]
#[strum(serialize_all = "kebab-case")]
pub enum PseudoClass {
    /// [§ 4.2 :is()](https://www.w3.org/TR/selectors-4/#matches) (also `:where()` and `:matches()`)
    Is(Arc<SelectorGroup>),
    /// [§ 4.3 :not()](https://www.w3.org/TR/selectors-4/#negation)
    Not(Arc<SelectorGroup>),
    /// [§ 4.5 :has()](https://www.w3.org/TR/selectors-4/#relational)
    ///
    /// Sequences of the argument carry an anchor combinator.
    Has(Arc<SelectorGroup>),

    /// [§ 14.1 :root](https://www.w3.org/TR/selectors-4/#the-root-pseudo)
    Root,
    /// [§ 14.2 :empty](https://www.w3.org/TR/selectors-4/#the-empty-pseudo)
    Empty,
    /// `:first-child`
    FirstChild,
    /// `:last-child`
    LastChild,
    /// `:only-child`
    OnlyChild,
    /// `:first-of-type`
    FirstOfType,
    /// `:last-of-type`
    LastOfType,
    /// `:only-of-type`
    OnlyOfType,
    /// `:nth-child(An+B)`
    NthChild(Nth),
    /// `:nth-last-child(An+B)`
    NthLastChild(Nth),
    /// `:nth-of-type(An+B)`
    NthOfType(Nth),
    /// `:nth-last-of-type(An+B)`
    NthLastOfType(Nth),

    /// User-action and history states. A static tree has no visited links,
    /// no pointer, and no focus, so these never match.
    Visited,
    /// `:hover`
    Hover,
    /// `:active`
    Active,
    /// `:focus`
    Focus,
    /// `:focus-within`
    FocusWithin,
    /// `:focus-visible`
    FocusVisible,
    /// `:target`
    Target,
}

impl PseudoClass {
    /// The pseudo-class name as written after the colon.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.into()
    }

    /// The nested selector argument of `:is()`, `:not()` and `:has()`.
    #[must_use]
    pub fn argument(&self) -> Option<&SelectorGroup> {
        match self {
            Self::Is(group) | Self::Not(group) | Self::Has(group) => Some(group.as_ref()),
            _ => None,
        }
    }

    /// Whether this pseudo-class depends on state a static tree never has.
    #[must_use]
    pub const fn is_user_action(&self) -> bool {
        matches!(
            self,
            Self::Visited
                | Self::Hover
                | Self::Active
                | Self::Focus
                | Self::FocusWithin
                | Self::FocusVisible
                | Self::Target
        )
    }
}

/// [§ 3.1 Compound selectors](https://www.w3.org/TR/selectors-4/#compound)
///
/// "A compound selector is a sequence of simple selectors that are not
/// separated by a combinator, and represents a set of simultaneous
/// conditions on a single element."
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompoundSelector {
    /// The simple selectors, all of which must match.
    pub simple_selectors: Vec<SimpleSelector>,
}

impl CompoundSelector {
    /// The type selector of this compound, if it has one.
    #[must_use]
    pub fn type_name(&self) -> Option<&str> {
        self.simple_selectors.iter().find_map(|s| match s {
            SimpleSelector::Type(name) => Some(name.as_str()),
            _ => None,
        })
    }
}

/// [§ 15 Combinators](https://www.w3.org/TR/selectors-4/#combinators)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Combinator {
    /// `A B`: B is an arbitrary descendant of A.
    #[strum(to_string = " ")]
    Descendant,
    /// `A > B`: B is a direct child of A.
    #[strum(to_string = ">")]
    Child,
    /// `A + B`: B immediately follows A among element siblings.
    #[strum(to_string = "+")]
    AdjacentSibling,
    /// `A ~ B`: B follows A among element siblings.
    #[strum(to_string = "~")]
    GeneralSibling,
}

/// A chain of compound selectors joined by combinators.
///
/// Example: `div.container > ul li` is stored as
/// ```text
/// subject: li
/// combinators: [(Descendant, ul), (Child, div.container)]
/// ```
/// The order is right-to-left because matching walks outward from the subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorSequence {
    /// The rightmost compound selector; the element reported as a match.
    pub subject: CompoundSelector,

    /// `(combinator, compound)` pairs going left from the subject.
    pub combinators: Vec<(Combinator, CompoundSelector)>,

    /// For relative selectors inside `:has()`: how the leftmost compound
    /// relates to the `:has()` element. `None` everywhere else.
    pub anchor: Option<Combinator>,
}

impl SelectorSequence {
    /// The leftmost compound of the chain.
    #[must_use]
    pub fn leftmost(&self) -> &CompoundSelector {
        self.combinators
            .last()
            .map_or(&self.subject, |(_, compound)| compound)
    }

    /// Compounds in source (left-to-right) order, each with the combinator
    /// that links it to the next compound.
    #[must_use]
    pub fn left_to_right(&self) -> Vec<(&CompoundSelector, Option<Combinator>)> {
        let mut out: Vec<(&CompoundSelector, Option<Combinator>)> = self
            .combinators
            .iter()
            .rev()
            .map(|(combinator, compound)| (compound, Some(*combinator)))
            .collect();
        out.push((&self.subject, None));
        out
    }
}

/// A comma-separated list of sequences; matches when any sequence matches.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectorGroup {
    /// The alternatives, in source order.
    pub sequences: Vec<SelectorSequence>,
}

// Serialization back to selector text. Aliases are already expanded, so the
// output is the canonical primitive form.

impl fmt::Display for SelectorGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, sequence) in self.sequences.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{sequence}")?;
        }
        Ok(())
    }
}

impl fmt::Display for SelectorSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(anchor) = self.anchor.filter(|&c| c != Combinator::Descendant) {
            write!(f, "{anchor} ")?;
        }
        for (compound, next) in self.left_to_right() {
            write!(f, "{compound}")?;
            match next {
                Some(Combinator::Descendant) => f.write_str(" ")?,
                Some(combinator) => write!(f, " {combinator} ")?,
                None => {}
            }
        }
        Ok(())
    }
}

impl fmt::Display for CompoundSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.simple_selectors.is_empty() {
            return f.write_str("*");
        }
        for simple in &self.simple_selectors {
            write!(f, "{simple}")?;
        }
        Ok(())
    }
}

impl fmt::Display for SimpleSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Type(name) => write_ident(f, name),
            Self::Universal => f.write_str("*"),
            Self::Id(id) => {
                f.write_str("#")?;
                write_ident(f, id)
            }
            Self::Class(class) => {
                f.write_str(".")?;
                write_ident(f, class)
            }
            Self::Attribute(attr) => write!(f, "{attr}"),
            Self::PseudoClass(pc) => write!(f, "{pc}"),
            Self::PseudoElement(name) => {
                f.write_str("::")?;
                write_ident(f, name)
            }
        }
    }
}

impl fmt::Display for AttributeSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        write_ident(f, &self.name)?;
        if let Some(value) = &self.value {
            write!(f, "{}", self.operator)?;
            write_string(f, value)?;
            match self.case {
                CaseSensitivity::Sensitive => {}
                CaseSensitivity::ExplicitSensitive => f.write_str(" s")?,
                CaseSensitivity::AsciiInsensitive => f.write_str(" i")?,
            }
        }
        f.write_str("]")
    }
}

impl fmt::Display for PseudoClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ":{}", self.name())?;
        match self {
            Self::Is(group) | Self::Not(group) | Self::Has(group) => write!(f, "({group})"),
            Self::NthChild(nth)
            | Self::NthLastChild(nth)
            | Self::NthOfType(nth)
            | Self::NthLastOfType(nth) => write!(f, "({nth})"),
            _ => Ok(()),
        }
    }
}

/// Write an identifier, escaping code points that would end it.
fn write_ident(f: &mut fmt::Formatter<'_>, ident: &str) -> fmt::Result {
    for (i, c) in ident.chars().enumerate() {
        let plain = c.is_ascii_alphabetic()
            || c == '_'
            || !c.is_ascii()
            || (i > 0 && (c.is_ascii_digit() || c == '-'))
            || (i == 0 && c == '-' && ident.len() > 1);
        if plain {
            write!(f, "{c}")?;
        } else if c.is_ascii_digit() {
            write!(f, "\\{:x} ", u32::from(c))?;
        } else {
            write!(f, "\\{c}")?;
        }
    }
    Ok(())
}

/// Write a double-quoted string.
fn write_string(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
    f.write_str("\"")?;
    for c in value.chars() {
        match c {
            '"' | '\\' => write!(f, "\\{c}")?,
            '\n' => f.write_str("\\a ")?,
            c => write!(f, "{c}")?,
        }
    }
    f.write_str("\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nth_parse_keywords() {
        assert_eq!(Nth::parse("odd"), Some(Nth { a: 2, b: 1 }));
        assert_eq!(Nth::parse(" EVEN "), Some(Nth { a: 2, b: 0 }));
    }

    #[test]
    fn test_nth_parse_forms() {
        assert_eq!(Nth::parse("3"), Some(Nth { a: 0, b: 3 }));
        assert_eq!(Nth::parse("+3"), Some(Nth { a: 0, b: 3 }));
        assert_eq!(Nth::parse("2n"), Some(Nth { a: 2, b: 0 }));
        assert_eq!(Nth::parse("2n + 1"), Some(Nth { a: 2, b: 1 }));
        assert_eq!(Nth::parse("-n+3"), Some(Nth { a: -1, b: 3 }));
        assert_eq!(Nth::parse("n"), Some(Nth { a: 1, b: 0 }));
        assert_eq!(Nth::parse("3n-2"), Some(Nth { a: 3, b: -2 }));
    }

    #[test]
    fn test_nth_parse_rejects_garbage() {
        assert_eq!(Nth::parse(""), None);
        assert_eq!(Nth::parse("x"), None);
        assert_eq!(Nth::parse("2n1"), None);
        assert_eq!(Nth::parse("++1"), None);
        assert_eq!(Nth::parse("2nn"), None);
    }

    #[test]
    fn test_nth_matches() {
        let odd = Nth { a: 2, b: 1 };
        assert!(odd.matches(1));
        assert!(!odd.matches(2));
        assert!(odd.matches(3));

        let first_three = Nth { a: -1, b: 3 };
        assert!(first_three.matches(1));
        assert!(first_three.matches(3));
        assert!(!first_three.matches(4));

        let exact = Nth { a: 0, b: 2 };
        assert!(exact.matches(2));
        assert!(!exact.matches(4));
    }

    #[test]
    fn test_nth_display() {
        assert_eq!(Nth { a: 2, b: 1 }.to_string(), "2n+1");
        assert_eq!(Nth { a: -1, b: 3 }.to_string(), "-1n+3");
        assert_eq!(Nth { a: 3, b: -2 }.to_string(), "3n-2");
        assert_eq!(Nth { a: 0, b: 5 }.to_string(), "5");
    }

    #[test]
    fn test_attribute_operators() {
        let attr = |operator, value: &str| AttributeSelector {
            name: "x".into(),
            operator,
            value: Some(value.into()),
            case: CaseSensitivity::Sensitive,
        };
        assert!(attr(AttributeOperator::Includes, "b").matches_value(Some("a b c")));
        assert!(!attr(AttributeOperator::Includes, "").matches_value(Some("a b")));
        assert!(attr(AttributeOperator::DashMatch, "en").matches_value(Some("en-US")));
        assert!(!attr(AttributeOperator::DashMatch, "en").matches_value(Some("english")));
        assert!(attr(AttributeOperator::Prefix, "ht").matches_value(Some("https")));
        assert!(!attr(AttributeOperator::Prefix, "").matches_value(Some("https")));
        assert!(attr(AttributeOperator::Suffix, ".png").matches_value(Some("a.png")));
        assert!(attr(AttributeOperator::Substring, "ark").matches_value(Some("dark")));
        assert!(!attr(AttributeOperator::Equals, "a").matches_value(None));
    }

    #[test]
    fn test_attribute_case_flag() {
        let mut attr = AttributeSelector {
            name: "type".into(),
            operator: AttributeOperator::Equals,
            value: Some("checkbox".into()),
            case: CaseSensitivity::Sensitive,
        };
        assert!(!attr.matches_value(Some("CHECKBOX")));
        attr.case = CaseSensitivity::AsciiInsensitive;
        assert!(attr.matches_value(Some("CHECKBOX")));
    }

    #[test]
    fn test_pseudo_class_names() {
        assert_eq!(PseudoClass::FirstOfType.name(), "first-of-type");
        assert_eq!(PseudoClass::NthLastChild(Nth { a: 1, b: 0 }).name(), "nth-last-child");
        assert_eq!(PseudoClass::FocusWithin.name(), "focus-within");
    }
}
