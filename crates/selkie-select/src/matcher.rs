//! Selector matching.
//!
//! [§ 4.1 Selector Matching](https://www.w3.org/TR/selectors-4/#match-a-selector-against-an-element)
//!
//! Sequences are evaluated right-to-left: the subject compound is tested
//! against the candidate, then each combinator is followed outward. Unlike a
//! greedy walk, a failed step backtracks to the next candidate ancestor or
//! sibling, so `a > b c` finds a `b` under an `a` even when a closer `b` is
//! not under one. Failures carry how far back the search may resume, which
//! keeps chains of descendant combinators from retrying every ancestor.

use std::collections::HashSet;

use crate::adapter::TreeAdapter;
use crate::ast::{
    Combinator, CompoundSelector, PseudoClass, SelectorGroup, SelectorSequence, SimpleSelector,
};
use crate::error::MatchError;
use crate::options::MatchOptions;

/// Result alias for matcher calls.
pub type MatchResult<T> = Result<T, MatchError>;

/// Subject type names of a group, used to skip elements that cannot match
/// before running the full evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prefilter {
    /// Lowercased tag names; `None` when some subject accepts any tag.
    tags: Option<HashSet<String>>,
}

impl Prefilter {
    /// Collect the subject type names of every sequence in `group`.
    #[must_use]
    pub fn for_group(group: &SelectorGroup) -> Self {
        let mut tags = HashSet::new();
        for sequence in &group.sequences {
            match sequence.subject.type_name() {
                Some(name) => {
                    let _ = tags.insert(name.to_ascii_lowercase());
                }
                None => return Self { tags: None },
            }
        }
        Self { tags: Some(tags) }
    }

    /// Whether an element with this tag may match.
    #[must_use]
    pub fn accepts(&self, tag: &str) -> bool {
        self.tags
            .as_ref()
            .is_none_or(|tags| tags.contains(&tag.to_ascii_lowercase()))
    }
}

/// The element a relative selector inside `:has()` is anchored to.
#[derive(Clone, Copy)]
struct Scope<N> {
    anchor: Combinator,
    element: N,
}

/// Outcome of matching a sequence from one compound leftward.
///
/// A failure records where the search may resume. Once a descendant step
/// runs out of ancestors, no element further out can match either, so the
/// outer steps stop instead of retrying every remaining ancestor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Matched,
    /// Try the next candidate of the nearest sibling or descendant step.
    RetryLaterSibling,
    /// Sibling candidates are used up; resume at the nearest descendant step.
    RetryDescendant,
    /// No candidate anywhere further out can match.
    Failed,
}

/// Evaluates selectors against one tree through a [`TreeAdapter`].
pub struct Matcher<'a, A: TreeAdapter + ?Sized> {
    adapter: &'a A,
    options: MatchOptions,
}

impl<'a, A: TreeAdapter + ?Sized> Matcher<'a, A> {
    /// Create a matcher over `adapter`.
    #[must_use]
    pub const fn new(adapter: &'a A, options: MatchOptions) -> Self {
        Self { adapter, options }
    }

    /// All elements at or under `root` matched by `group`, in document order.
    pub fn select_all(
        &self,
        group: &SelectorGroup,
        prefilter: &Prefilter,
        root: A::Node,
    ) -> MatchResult<Vec<A::Node>> {
        let mut matches = Vec::new();
        // Pre-order walk: children are pushed in reverse so the first child
        // is visited next.
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            let candidate = self
                .adapter
                .tag_name(node)?
                .is_some_and(|tag| prefilter.accepts(tag));
            if candidate && self.matches(group, node)? {
                matches.push(node);
            }
            let children = self.adapter.children(node)?;
            stack.extend(children.into_iter().rev());
        }
        Ok(matches)
    }

    /// Whether `node` is an element matched by any sequence of `group`.
    pub fn matches(&self, group: &SelectorGroup, node: A::Node) -> MatchResult<bool> {
        self.group(group, node, 0)
    }

    /// Count one more level of recursion.
    fn enter(&self, depth: usize) -> MatchResult<usize> {
        let depth = depth + 1;
        if depth > self.options.max_depth {
            return Err(MatchError::DepthExceeded {
                limit: self.options.max_depth,
            });
        }
        Ok(depth)
    }

    fn group(&self, group: &SelectorGroup, node: A::Node, depth: usize) -> MatchResult<bool> {
        for sequence in &group.sequences {
            if self.step(sequence, 0, node, depth, None)? == Step::Matched {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Match compound `index` of `sequence` (0 is the subject) against `node`,
    /// then follow the combinator to its left.
    fn step(
        &self,
        sequence: &SelectorSequence,
        index: usize,
        node: A::Node,
        depth: usize,
        scope: Option<Scope<A::Node>>,
    ) -> MatchResult<Step> {
        let depth = self.enter(depth)?;

        let compound = match index {
            0 => &sequence.subject,
            i => &sequence.combinators[i - 1].1,
        };
        if !self.compound(compound, node, depth)? {
            return Ok(Step::RetryLaterSibling);
        }

        let Some(&(combinator, _)) = sequence.combinators.get(index) else {
            // Leftmost compound: a relative selector must also sit in the
            // right place relative to the `:has()` element.
            return Ok(match scope {
                Some(scope) if !self.related(scope.anchor, scope.element, node)? => {
                    Step::RetryLaterSibling
                }
                _ => Step::Matched,
            });
        };

        let (candidates, exhausted) = match combinator {
            // [§ 16.1 Descendant combinator](https://www.w3.org/TR/selectors-4/#descendant-combinators)
            // "A selector of the form 'A B' represents an element B that is an
            // arbitrary descendant of some ancestor element A."
            Combinator::Descendant => (self.element_ancestors(node)?, Step::Failed),

            // [§ 16.2 Child combinator](https://www.w3.org/TR/selectors-4/#child-combinators)
            Combinator::Child => (
                self.parent_element(node)?.into_iter().collect(),
                Step::Failed,
            ),

            // [§ 16.3 Next-sibling combinator](https://www.w3.org/TR/selectors-4/#adjacent-sibling-combinators)
            Combinator::AdjacentSibling => (
                self.previous_element_siblings(node)?
                    .into_iter()
                    .take(1)
                    .collect(),
                Step::RetryDescendant,
            ),

            // [§ 16.4 Subsequent-sibling combinator](https://www.w3.org/TR/selectors-4/#general-sibling-combinators)
            Combinator::GeneralSibling => {
                (self.previous_element_siblings(node)?, Step::RetryDescendant)
            }
        };

        for candidate in candidates {
            let result = self.step(sequence, index + 1, candidate, depth, scope)?;
            match (result, combinator) {
                (Step::Matched | Step::Failed, _)
                | (_, Combinator::AdjacentSibling)
                | (Step::RetryDescendant, Combinator::GeneralSibling) => return Ok(result),
                (_, Combinator::Child) => return Ok(Step::RetryDescendant),
                _ => {}
            }
        }
        Ok(exhausted)
    }

    /// "A compound selector ... represents a set of simultaneous conditions
    /// on a single element."
    fn compound(
        &self,
        compound: &CompoundSelector,
        node: A::Node,
        depth: usize,
    ) -> MatchResult<bool> {
        let Some(tag) = self.adapter.tag_name(node)? else {
            return Ok(false);
        };
        for simple in &compound.simple_selectors {
            if !self.simple(simple, node, tag, depth)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn simple(
        &self,
        simple: &SimpleSelector,
        node: A::Node,
        tag: &str,
        depth: usize,
    ) -> MatchResult<bool> {
        Ok(match simple {
            // Type selectors are ASCII case-insensitive for HTML elements.
            SimpleSelector::Type(name) => tag.eq_ignore_ascii_case(name),
            SimpleSelector::Universal => true,
            SimpleSelector::Id(id) => self.adapter.id(node)? == Some(id.as_str()),
            SimpleSelector::Class(class) => self.adapter.has_class(node, class)?,
            SimpleSelector::Attribute(attr) => {
                attr.matches_value(self.adapter.attribute(node, &attr.name)?)
            }
            SimpleSelector::PseudoClass(pseudo) => return self.pseudo_class(pseudo, node, tag, depth),
            SimpleSelector::PseudoElement(_) => false,
        })
    }

    /// [§ 4 Pseudo-classes](https://www.w3.org/TR/selectors-4/#pseudo-classes)
    fn pseudo_class(
        &self,
        pseudo: &PseudoClass,
        node: A::Node,
        tag: &str,
        depth: usize,
    ) -> MatchResult<bool> {
        Ok(match pseudo {
            PseudoClass::Is(group) => self.group(group, node, depth)?,
            PseudoClass::Not(group) => !self.group(group, node, depth)?,
            PseudoClass::Has(group) => self.has(group, node, depth)?,

            // [§ 14.1 :root](https://www.w3.org/TR/selectors-4/#the-root-pseudo)
            PseudoClass::Root => match self.adapter.parent(node)? {
                None => true,
                Some(parent) => self.adapter.tag_name(parent)?.is_none(),
            },

            // [§ 14.2 :empty](https://www.w3.org/TR/selectors-4/#the-empty-pseudo)
            // Comments do not count; any text, even whitespace, does.
            PseudoClass::Empty => {
                for child in self.adapter.children(node)? {
                    if self.adapter.tag_name(child)?.is_some()
                        || self.adapter.text(child)?.is_some_and(|text| !text.is_empty())
                    {
                        return Ok(false);
                    }
                }
                true
            }

            // [§ 14.3 Child-indexed pseudo-classes](https://www.w3.org/TR/selectors-4/#child-index)
            PseudoClass::FirstChild => self.position(node, None)?.0 == 1,
            PseudoClass::LastChild => {
                let (index, count) = self.position(node, None)?;
                index == count
            }
            PseudoClass::OnlyChild => self.position(node, None)?.1 == 1,
            PseudoClass::NthChild(nth) => nth.matches(self.position(node, None)?.0),
            PseudoClass::NthLastChild(nth) => {
                let (index, count) = self.position(node, None)?;
                nth.matches(count - index + 1)
            }

            // [§ 14.4 Typed child-indexed pseudo-classes](https://www.w3.org/TR/selectors-4/#typed-child-index)
            PseudoClass::FirstOfType => self.position(node, Some(tag))?.0 == 1,
            PseudoClass::LastOfType => {
                let (index, count) = self.position(node, Some(tag))?;
                index == count
            }
            PseudoClass::OnlyOfType => self.position(node, Some(tag))?.1 == 1,
            PseudoClass::NthOfType(nth) => nth.matches(self.position(node, Some(tag))?.0),
            PseudoClass::NthLastOfType(nth) => {
                let (index, count) = self.position(node, Some(tag))?;
                nth.matches(count - index + 1)
            }

            PseudoClass::Visited
            | PseudoClass::Hover
            | PseudoClass::Active
            | PseudoClass::Focus
            | PseudoClass::FocusWithin
            | PseudoClass::FocusVisible
            | PseudoClass::Target => false,
        })
    }

    /// [§ 4.5 :has()](https://www.w3.org/TR/selectors-4/#relational)
    ///
    /// "The relational pseudo-class, :has(), is a functional pseudo-class
    /// taking a <relative-selector-list> as an argument. It represents an
    /// element if any of the relative selectors would match at least one
    /// element when anchored against this element."
    fn has(&self, group: &SelectorGroup, node: A::Node, depth: usize) -> MatchResult<bool> {
        for sequence in &group.sequences {
            let anchor = sequence.anchor.unwrap_or(Combinator::Descendant);
            let single = sequence.combinators.is_empty();

            let candidates = match anchor {
                Combinator::Descendant => self.descendant_elements(node)?,
                Combinator::Child if single => self.child_elements(node)?,
                Combinator::Child => self.descendant_elements(node)?,
                Combinator::AdjacentSibling if single => self
                    .next_element_siblings(node)?
                    .into_iter()
                    .take(1)
                    .collect(),
                Combinator::GeneralSibling if single => self.next_element_siblings(node)?,
                Combinator::AdjacentSibling | Combinator::GeneralSibling => {
                    let mut region = Vec::new();
                    for sibling in self.next_element_siblings(node)? {
                        region.push(sibling);
                        region.extend(self.descendant_elements(sibling)?);
                    }
                    region
                }
            };

            let scope = Some(Scope {
                anchor,
                element: node,
            });
            for candidate in candidates {
                if self.step(sequence, 0, candidate, depth, scope)? == Step::Matched {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    /// Whether `node` stands in `anchor` relation to `scope`
    /// (`scope <anchor> node`).
    fn related(&self, anchor: Combinator, scope: A::Node, node: A::Node) -> MatchResult<bool> {
        Ok(match anchor {
            Combinator::Descendant => {
                let mut current = self.adapter.parent(node)?;
                while let Some(ancestor) = current {
                    if ancestor == scope {
                        return Ok(true);
                    }
                    current = self.adapter.parent(ancestor)?;
                }
                false
            }
            Combinator::Child => self.adapter.parent(node)? == Some(scope),
            Combinator::AdjacentSibling => {
                self.previous_element_siblings(node)?.first() == Some(&scope)
            }
            Combinator::GeneralSibling => self.previous_element_siblings(node)?.contains(&scope),
        })
    }

    // Tree navigation restricted to elements

    fn is_element(&self, node: A::Node) -> MatchResult<bool> {
        Ok(self.adapter.tag_name(node)?.is_some())
    }

    fn only_elements(&self, nodes: Vec<A::Node>) -> MatchResult<Vec<A::Node>> {
        let mut elements = Vec::with_capacity(nodes.len());
        for node in nodes {
            if self.is_element(node)? {
                elements.push(node);
            }
        }
        Ok(elements)
    }

    fn parent_element(&self, node: A::Node) -> MatchResult<Option<A::Node>> {
        match self.adapter.parent(node)? {
            Some(parent) if self.is_element(parent)? => Ok(Some(parent)),
            _ => Ok(None),
        }
    }

    /// Element ancestors, nearest first.
    fn element_ancestors(&self, node: A::Node) -> MatchResult<Vec<A::Node>> {
        let mut ancestors = Vec::new();
        let mut current = self.adapter.parent(node)?;
        while let Some(ancestor) = current {
            if self.is_element(ancestor)? {
                ancestors.push(ancestor);
            }
            current = self.adapter.parent(ancestor)?;
        }
        Ok(ancestors)
    }

    fn child_elements(&self, node: A::Node) -> MatchResult<Vec<A::Node>> {
        self.only_elements(self.adapter.children(node)?)
    }

    /// Element descendants in document order.
    fn descendant_elements(&self, node: A::Node) -> MatchResult<Vec<A::Node>> {
        let mut descendants = Vec::new();
        let mut stack: Vec<A::Node> = self.adapter.children(node)?.into_iter().rev().collect();
        while let Some(current) = stack.pop() {
            if self.is_element(current)? {
                descendants.push(current);
            }
            stack.extend(self.adapter.children(current)?.into_iter().rev());
        }
        Ok(descendants)
    }

    /// Element siblings before `node`, nearest first.
    fn previous_element_siblings(&self, node: A::Node) -> MatchResult<Vec<A::Node>> {
        self.only_elements(self.adapter.previous_siblings(node)?)
    }

    /// Element siblings after `node`, nearest first.
    fn next_element_siblings(&self, node: A::Node) -> MatchResult<Vec<A::Node>> {
        self.only_elements(self.adapter.next_siblings(node)?)
    }

    /// 1-based index of `node` among its element siblings and their count,
    /// optionally only counting siblings with the same tag. An element with
    /// no parent is its own only sibling.
    fn position(&self, node: A::Node, of_type: Option<&str>) -> MatchResult<(usize, usize)> {
        let Some(parent) = self.adapter.parent(node)? else {
            return Ok((1, 1));
        };

        let mut index = 0;
        let mut count = 0;
        for sibling in self.adapter.children(parent)? {
            let Some(tag) = self.adapter.tag_name(sibling)? else {
                continue;
            };
            if of_type.is_some_and(|wanted| !tag.eq_ignore_ascii_case(wanted)) {
                continue;
            }
            count += 1;
            if sibling == node {
                index = count;
            }
        }
        Ok((index, count))
    }
}
