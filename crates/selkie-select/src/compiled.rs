//! Compiled selectors.

use core::fmt;

use crate::adapter::TreeAdapter;
use crate::ast::SelectorGroup;
use crate::error::{MatchError, ParseError};
use crate::matcher::{Matcher, Prefilter};
use crate::options::{CompileOptions, MatchOptions};
use crate::parser;

/// A parsed, alias-expanded selector ready to run against any tree.
///
/// Compiled selectors are immutable. They can be reused across trees and
/// shared between threads.
#[derive(Debug, Clone)]
pub struct CompiledSelector {
    source: String,
    group: SelectorGroup,
    prefilter: Prefilter,
    match_options: MatchOptions,
}

impl CompiledSelector {
    /// Parse `text` with the given limits.
    pub fn new(text: &str, options: &CompileOptions) -> Result<Self, ParseError> {
        let group = parser::parse_with(text, options)?;
        Ok(Self {
            source: text.to_string(),
            prefilter: Prefilter::for_group(&group),
            group,
            match_options: MatchOptions::default(),
        })
    }

    /// Use different limits when matching.
    #[must_use]
    pub const fn with_match_options(mut self, match_options: MatchOptions) -> Self {
        self.match_options = match_options;
        self
    }

    /// Every element at or under `root` that matches, in document order.
    pub fn match_all<A: TreeAdapter + ?Sized>(
        &self,
        adapter: &A,
        root: A::Node,
    ) -> Result<Vec<A::Node>, MatchError> {
        Matcher::new(adapter, self.match_options).select_all(&self.group, &self.prefilter, root)
    }

    /// The first element at or under `root` that matches.
    pub fn match_first<A: TreeAdapter + ?Sized>(
        &self,
        adapter: &A,
        root: A::Node,
    ) -> Result<Option<A::Node>, MatchError> {
        Ok(self.match_all(adapter, root)?.into_iter().next())
    }

    /// Whether `node` is an element this selector matches.
    pub fn matches_element<A: TreeAdapter + ?Sized>(
        &self,
        adapter: &A,
        node: A::Node,
    ) -> Result<bool, MatchError> {
        Matcher::new(adapter, self.match_options).matches(&self.group, node)
    }

    /// The parsed selector, aliases expanded.
    #[must_use]
    pub const fn group(&self) -> &SelectorGroup {
        &self.group
    }

    /// The selector text as given.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }
}

/// Renders the canonical, alias-expanded selector text.
impl fmt::Display for CompiledSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.group)
    }
}
