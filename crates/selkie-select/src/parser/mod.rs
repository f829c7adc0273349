//! Selector parser.
//!
//! Turns selector text into a [`SelectorGroup`]. Alias pseudo-classes are
//! resolved while parsing, so the result only contains primitives.

/// Recursive-descent selector parser per [§ 18 Grammar](https://www.w3.org/TR/selectors-4/#grammar).
pub mod selector_parser;

pub use selector_parser::{AliasResolver, SelectorParser};

use crate::alias;
use crate::ast::SelectorGroup;
use crate::error::ParseError;
use crate::options::CompileOptions;

/// Parse selector text with the default limits and the built-in aliases.
pub fn parse(input: &str) -> Result<SelectorGroup, ParseError> {
    parse_with(input, &CompileOptions::default())
}

/// Parse selector text with explicit limits and the built-in aliases.
pub fn parse_with(input: &str, options: &CompileOptions) -> Result<SelectorGroup, ParseError> {
    let mut resolver = alias::table()?.resolver(options.max_alias_depth);
    SelectorParser::new(input, *options, &mut resolver).parse()
}
