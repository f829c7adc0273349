//! Selector parsing and matching for the Selkie selector engine.
//!
//! # Scope
//!
//! This crate implements:
//! - **Selector Tokenizer** ([CSS Syntax § 4](https://www.w3.org/TR/css-syntax-3/#tokenization))
//!   - Identifiers, hashes, strings, delimiters, functions
//!   - Comment handling and escape sequences
//!
//! - **Selector Parser** ([Selectors Level 4 § 18](https://www.w3.org/TR/selectors-4/#grammar))
//!   - Type, universal, id, class and attribute selectors (all operators, `i`/`s` flags)
//!   - Descendant, child, next-sibling and subsequent-sibling combinators
//!   - `:is()`, `:where()`, `:not()`, `:has()` with relative selectors
//!   - Structural pseudo-classes including `:nth-*(An+B)`
//!
//! - **Alias pseudo-classes** (`:checked`, `:disabled`, `:selected`, `:header`, ...)
//!   - Defined as selectors over primitives, parsed once and spliced in as `:is()`
//!
//! - **Matcher**
//!   - Right-to-left evaluation with backtracking
//!   - Runs against any tree through [`TreeAdapter`]
//!
//! # Example
//!
//! ```
//! use selkie_dom::{DomTree, NodeId};
//!
//! let mut tree = DomTree::new();
//! let form = tree.append_element(NodeId::ROOT, "form", &[]);
//! let boxed = tree.append_element(form, "input", &[("type", "checkbox"), ("checked", "")]);
//! let _ = tree.append_element(form, "input", &[("type", "text")]);
//!
//! let selector = selkie_select::compile(":checked").unwrap();
//! assert_eq!(selector.match_all(&tree, NodeId::ROOT).unwrap(), vec![boxed]);
//! ```

pub mod adapter;
pub mod alias;
pub mod ast;
pub mod compiled;
pub mod error;
pub mod matcher;
pub mod options;
pub mod parser;
/// Selector tokenizer per [§ 4 Tokenization](https://www.w3.org/TR/css-syntax-3/#tokenization).
pub mod tokenizer;

pub use adapter::{AdapterError, AdapterResult, TreeAdapter};
pub use ast::{
    AttributeOperator, AttributeSelector, CaseSensitivity, Combinator, CompoundSelector, Nth,
    PseudoClass, SelectorGroup, SelectorSequence, SimpleSelector,
};
pub use compiled::CompiledSelector;
pub use error::{MatchError, ParseError, SelectError};
pub use options::{CompileOptions, MatchOptions};
pub use parser::{parse, parse_with};

/// Compile selector text with the default limits.
pub fn compile(text: &str) -> Result<CompiledSelector, ParseError> {
    compile_with(text, &CompileOptions::default())
}

/// Compile selector text with explicit limits.
pub fn compile_with(text: &str, options: &CompileOptions) -> Result<CompiledSelector, ParseError> {
    CompiledSelector::new(text, options)
}

/// Compile `text` and return every matching element at or under `root`.
pub fn select_all<A: TreeAdapter + ?Sized>(
    text: &str,
    adapter: &A,
    root: A::Node,
) -> Result<Vec<A::Node>, SelectError> {
    Ok(compile(text)?.match_all(adapter, root)?)
}
