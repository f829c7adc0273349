//! Selector token types.
//!
//! A reduced form of the [CSS Syntax § 4](https://www.w3.org/TR/css-syntax-3/#tokenization)
//! token set, covering what selector text can contain. Numbers are not
//! tokenized separately: digits are ident code points here, so `An+B`
//! arguments come through as raw source text.

use core::fmt;

/// Selector tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorToken {
    /// An identifier: `div`, `first-child`, `2n`, `-webkit-any`
    Ident(String),

    /// An identifier immediately followed by `(`: `is(`, `nth-child(`
    Function(String),

    /// `#` followed by an identifier: `#main`
    Hash(String),

    /// A quoted string with escapes resolved.
    String(String),

    /// A string that hit a newline or the end of input before its closing quote.
    BadString,

    /// A single code point with no other meaning: `.`, `*`, `>`, `+`, `~`, `=`, `|`, ...
    Delim(char),

    /// `:`
    Colon,

    /// `,`
    Comma,

    /// `[`
    LeftBracket,

    /// `]`
    RightBracket,

    /// `(`
    LeftParen,

    /// `)`
    RightParen,

    /// One or more whitespace code points.
    Whitespace,

    /// End of input.
    EOF,
}

impl SelectorToken {
    /// Check if this is an EOF token.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self, Self::EOF)
    }

    /// Check if this is a whitespace token.
    #[must_use]
    pub const fn is_whitespace(&self) -> bool {
        matches!(self, Self::Whitespace)
    }
}

impl fmt::Display for SelectorToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ident(s) => write!(f, "identifier '{s}'"),
            Self::Function(s) => write!(f, "function '{s}('"),
            Self::Hash(s) => write!(f, "'#{s}'"),
            Self::String(s) => write!(f, "string \"{s}\""),
            Self::BadString => write!(f, "unterminated string"),
            Self::Delim(c) => write!(f, "'{c}'"),
            Self::Colon => write!(f, "':'"),
            Self::Comma => write!(f, "','"),
            Self::LeftBracket => write!(f, "'['"),
            Self::RightBracket => write!(f, "']'"),
            Self::LeftParen => write!(f, "'('"),
            Self::RightParen => write!(f, "')'"),
            Self::Whitespace => write!(f, "whitespace"),
            Self::EOF => write!(f, "end of input"),
        }
    }
}

/// A token together with the character range it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// What was read.
    pub kind: SelectorToken,
    /// Character offset of the first code point.
    pub start: usize,
    /// Character offset one past the last code point.
    pub end: usize,
}
