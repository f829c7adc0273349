//! Alias pseudo-classes.
//!
//! jQuery-style and HTML form-state pseudo-classes (`:checked`, `:disabled`,
//! `:header`, ...) are shorthand for selectors built from primitives. Each
//! expansion is parsed once, on first use, and shared from then on: the
//! parser splices an alias in as `:is(<expansion>)`.
//!
//! Expansions may refer to other aliases (`:link` uses `:any-link`). The
//! table is built depth-first, so a loop between definitions is reported as
//! [`ParseError::AliasCycle`] instead of recursing forever.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use crate::ast::SelectorGroup;
use crate::error::ParseError;
use crate::options::CompileOptions;
use crate::parser::{AliasResolver, SelectorParser};

/// Alias name and expansion text, in the order [`names`] reports them.
const ALIASES: &[(&str, &str)] = &[
    ("any-link", ":is(a, area, link)[href]"),
    ("link", ":any-link:not(:visited)"),
    (
        "disabled",
        ":is(\
            :is(button, input, select, textarea, optgroup, option, fieldset)[disabled], \
            optgroup[disabled] > option, \
            fieldset[disabled] > :not(legend:first-of-type), \
            fieldset[disabled] > :not(legend:first-of-type) *\
        )",
    ),
    ("enabled", ":not(:disabled)"),
    (
        "checked",
        ":is(:is(input[type=radio], input[type=checkbox])[checked], :selected)",
    ),
    ("required", ":is(input, select, textarea)[required]"),
    ("optional", ":is(input, select, textarea):not([required])"),
    (
        "selected",
        "option:is(\
            [selected], \
            select:not([multiple]):not(:has(option[selected])) > :first-of-type\
        )",
    ),
    ("checkbox", "[type=checkbox]"),
    ("file", "[type=file]"),
    ("password", "[type=password]"),
    ("radio", "[type=radio]"),
    ("reset", "[type=reset]"),
    ("image", "[type=image]"),
    ("submit", "[type=submit]"),
    ("parent", ":not(:empty)"),
    ("header", ":is(h1, h2, h3, h4, h5, h6)"),
    ("button", ":is(button, input[type=button])"),
    ("input", ":is(input, textarea, select, button)"),
    ("text", "input:is(:not([type]), [type=''], [type=text])"),
];

static TABLE: LazyLock<Result<AliasTable, ParseError>> =
    LazyLock::new(|| AliasTable::build(ALIASES));

/// The expansion text of an alias, if `name` is one. Lookup is exact.
#[must_use]
pub fn resolve(name: &str) -> Option<&'static str> {
    table().ok()?.entries.get(name).map(|entry| entry.expansion)
}

/// Every alias name.
#[must_use]
pub fn names() -> impl Iterator<Item = &'static str> {
    ALIASES.iter().map(|&(name, _)| name)
}

/// The process-wide table, built on first use.
pub(crate) fn table() -> Result<&'static AliasTable, ParseError> {
    TABLE.as_ref().map_err(Clone::clone)
}

struct AliasEntry {
    expansion: &'static str,
    group: Arc<SelectorGroup>,
    /// 1 for an alias over primitives only, otherwise one more than its
    /// deepest alias reference.
    depth: usize,
    /// The alias reference that gave `depth`.
    via: Option<&'static str>,
}

/// Pre-parsed alias expansions.
pub(crate) struct AliasTable {
    entries: HashMap<&'static str, AliasEntry>,
}

impl AliasTable {
    fn build(definitions: &[(&'static str, &'static str)]) -> Result<Self, ParseError> {
        let mut builder = AliasBuilder {
            definitions: definitions.iter().copied().collect(),
            entries: HashMap::new(),
            stack: Vec::new(),
        };
        for &(name, _) in definitions {
            let _ = builder.build_entry(name)?;
        }
        Ok(Self {
            entries: builder.entries,
        })
    }

    /// A resolver that rejects aliases nested deeper than `max_depth`.
    pub(crate) const fn resolver(&self, max_depth: usize) -> TableResolver<'_> {
        TableResolver {
            table: self,
            max_depth,
        }
    }

    /// `name -> ... ` along the deepest chain of alias references.
    fn chain(&self, name: &'static str) -> String {
        let mut names = vec![name];
        let mut current = self.entries.get(name).and_then(|entry| entry.via);
        while let Some(next) = current {
            names.push(next);
            current = self.entries.get(next).and_then(|entry| entry.via);
        }
        names.join(" -> ")
    }
}

/// Resolves aliases from the built table while parsing user selectors.
pub(crate) struct TableResolver<'t> {
    table: &'t AliasTable,
    max_depth: usize,
}

impl AliasResolver for TableResolver<'_> {
    fn resolve(&mut self, name: &str) -> Result<Option<Arc<SelectorGroup>>, ParseError> {
        let Some((&key, entry)) = self.table.entries.get_key_value(name) else {
            return Ok(None);
        };
        if entry.depth > self.max_depth {
            return Err(ParseError::AliasCycle {
                chain: self.table.chain(key),
            });
        }
        Ok(Some(Arc::clone(&entry.group)))
    }

    fn is_alias(&self, name: &str) -> bool {
        self.table.entries.contains_key(name)
    }
}

/// Depth-first table construction. Each stack frame is an alias whose
/// expansion is being parsed, with the deepest reference seen so far.
struct AliasBuilder {
    definitions: HashMap<&'static str, &'static str>,
    entries: HashMap<&'static str, AliasEntry>,
    stack: Vec<Frame>,
}

struct Frame {
    name: &'static str,
    depth: usize,
    via: Option<&'static str>,
}

impl AliasBuilder {
    fn build_entry(&mut self, name: &'static str) -> Result<(Arc<SelectorGroup>, usize), ParseError> {
        if let Some(entry) = self.entries.get(name) {
            return Ok((Arc::clone(&entry.group), entry.depth));
        }

        let looped = self.stack.iter().any(|frame| frame.name == name);
        if looped || self.stack.len() >= CompileOptions::DEFAULT_MAX_ALIAS_DEPTH {
            let mut names: Vec<&str> = self.stack.iter().map(|frame| frame.name).collect();
            names.push(name);
            return Err(ParseError::AliasCycle {
                chain: names.join(" -> "),
            });
        }

        let Some(&expansion) = self.definitions.get(name) else {
            return Err(ParseError::UnknownPseudoClass {
                name: name.to_string(),
            });
        };

        self.stack.push(Frame {
            name,
            depth: 0,
            via: None,
        });
        let parsed = SelectorParser::new(expansion, CompileOptions::default(), self)
            .without_warnings()
            .parse();
        let frame = self.stack.pop();
        let group = Arc::new(parsed?);

        let (depth, via) = frame.map_or((1, None), |frame| (frame.depth + 1, frame.via));
        let _ = self.entries.insert(
            name,
            AliasEntry {
                expansion,
                group: Arc::clone(&group),
                depth,
                via,
            },
        );
        Ok((group, depth))
    }
}

impl AliasResolver for AliasBuilder {
    fn resolve(&mut self, name: &str) -> Result<Option<Arc<SelectorGroup>>, ParseError> {
        let Some((&key, _)) = self.definitions.get_key_value(name) else {
            return Ok(None);
        };
        let (group, depth) = self.build_entry(key)?;
        if let Some(frame) = self.stack.last_mut().filter(|frame| depth > frame.depth) {
            frame.depth = depth;
            frame.via = Some(key);
        }
        Ok(Some(group))
    }

    fn is_alias(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table_builds() {
        let table = table().expect("built-in aliases must parse");
        assert_eq!(table.entries.len(), ALIASES.len());
        assert_eq!(table.entries["any-link"].depth, 1);
        assert_eq!(table.entries["link"].depth, 2);
        assert_eq!(table.chain("link"), "link -> any-link");
        assert_eq!(table.chain("checked"), "checked -> selected");
    }

    #[test]
    fn test_resolve_is_exact() {
        assert_eq!(resolve("checkbox"), Some("[type=checkbox]"));
        assert_eq!(resolve("CHECKBOX"), None);
        assert_eq!(resolve("nope"), None);
    }

    #[test]
    fn test_names_cover_table() {
        let names: Vec<&str> = names().collect();
        assert!(names.contains(&"selected"));
        assert!(names.contains(&"text"));
        assert!(names.iter().all(|name| resolve(name).is_some()));
    }

    #[test]
    fn test_cycle_is_detected() {
        let result = AliasTable::build(&[("a", "div:b"), ("b", "span:not(:a)")]);
        assert!(matches!(
            result,
            Err(ParseError::AliasCycle { chain }) if chain == "a -> b -> a"
        ));
    }

    #[test]
    fn test_self_reference_is_a_cycle() {
        let result = AliasTable::build(&[("loop", ":is(:loop)")]);
        assert!(matches!(result, Err(ParseError::AliasCycle { .. })));
    }

    #[test]
    fn test_depth_limit_on_resolve() {
        let table = AliasTable::build(&[("a", ":b"), ("b", ":c"), ("c", "p")])
            .expect("acyclic definitions");
        let mut shallow = table.resolver(2);
        assert!(matches!(shallow.resolve("b"), Ok(Some(_))));
        assert!(matches!(
            shallow.resolve("a"),
            Err(ParseError::AliasCycle { chain }) if chain == "a -> b -> c"
        ));
        assert!(matches!(shallow.resolve("p"), Ok(None)));
    }
}
