//! Error types for selector compilation and matching.

use thiserror::Error;

use crate::adapter::AdapterError;

/// A selector that could not be compiled.
///
/// Parse errors are never recovered from: a selector that fails to parse
/// matches nothing rather than partially matching.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The selector text (or a comma-separated part of it) was empty.
    #[error("empty selector")]
    Empty,

    /// A token that cannot appear at this point.
    #[error("unexpected {found} at position {position}")]
    UnexpectedToken {
        /// Description of the offending token.
        found: String,
        /// Character offset of the token.
        position: usize,
    },

    /// Input ended where a compound selector was required (`div >`).
    #[error("unexpected end of selector")]
    UnexpectedEnd,

    /// A functional pseudo-class was never closed (`:is(a,`).
    #[error("missing ')' for the group opened at position {position}")]
    UnclosedParen {
        /// Character offset of the function token.
        position: usize,
    },

    /// An attribute selector was never closed (`[href`).
    #[error("missing ']' for the attribute selector opened at position {position}")]
    UnclosedBracket {
        /// Character offset of the `[`.
        position: usize,
    },

    /// A quoted value hit a newline or the end of input.
    #[error("unterminated string at position {position}")]
    UnterminatedString {
        /// Character offset of the opening quote.
        position: usize,
    },

    /// Neither a primitive pseudo-class nor an alias.
    #[error("unknown pseudo-class ':{name}'")]
    UnknownPseudoClass {
        /// The name as written.
        name: String,
    },

    /// A non-functional pseudo-class was given an argument (`:checked(x)`).
    #[error("pseudo-class ':{name}' does not take an argument")]
    UnexpectedArgument {
        /// The pseudo-class name.
        name: String,
    },

    /// A functional pseudo-class was used without one (`:not`).
    #[error("pseudo-class ':{name}' requires an argument")]
    MissingArgument {
        /// The pseudo-class name.
        name: String,
    },

    /// An `:nth-*` argument that is not a valid `An+B` expression.
    #[error("invalid An+B expression '{text}'")]
    InvalidNth {
        /// The argument text.
        text: String,
    },

    /// Alias definitions refer to each other in a loop, or nest deeper than
    /// the configured alias depth.
    #[error("alias expansion cycle: {chain}")]
    AliasCycle {
        /// The alias names involved, joined with `->`.
        chain: String,
    },

    /// Functional pseudo-classes nest deeper than the configured limit.
    #[error("selector nesting exceeds the limit of {limit}")]
    NestingTooDeep {
        /// The configured limit.
        limit: usize,
    },
}

/// A match invocation that could not complete.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    /// The tree adapter reported a failure. Not retried.
    #[error(transparent)]
    Adapter(#[from] AdapterError),

    /// Evaluation recursed deeper than the configured limit.
    #[error("match recursion exceeds the limit of {limit}")]
    DepthExceeded {
        /// The configured limit.
        limit: usize,
    },
}

/// Failure of the one-shot [`select_all`](crate::select_all) helper.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectError {
    /// The selector text did not compile.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Matching failed.
    #[error(transparent)]
    Match(#[from] MatchError),
}
