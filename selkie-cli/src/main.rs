//! Selkie CLI: run a selector against a JSON element tree.
//!
//! Usage:
//!   selkie <tree.json> <selector>            Print matching elements
//!   selkie --tree-json '<json>' <selector>   Read the tree from an argument
//!   selkie --expand <selector>               Print the alias-expanded selector
//!
//! Examples:
//!   selkie page.json ':checked'
//!   selkie page.json 'form :disabled' --json
//!   selkie --expand ':selected'

use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use owo_colors::OwoColorize;
use selkie_dom::{DomTree, NodeId};
use selkie_select::{CompileOptions, MatchOptions, TreeAdapter, compile_with};

/// Selkie: CSS selectors with jQuery-style pseudo-classes over JSON trees
#[derive(Parser, Debug)]
#[command(name = "selkie")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Select checked form controls
    selkie page.json ':checked'

    # Emit matches as JSON subtrees
    selkie page.json 'fieldset :disabled' --json

    # Inline tree
    selkie --tree-json '{"type":"element","tagName":"p"}' 'p'

    # Show what an alias expands to
    selkie --expand ':selected'
"#)]
struct Cli {
    /// Tree file followed by the selector, or only the selector when
    /// `--tree-json` or `--expand` is given
    #[arg(value_names = ["TREE.json", "SELECTOR"], num_args = 1..=2, required = true)]
    inputs: Vec<String>,

    /// Read the tree from this JSON string instead of a file
    #[arg(long, value_name = "JSON")]
    tree_json: Option<String>,

    /// Print the canonical, alias-expanded selector and exit
    #[arg(long)]
    expand: bool,

    /// Print each match as a JSON subtree
    #[arg(long)]
    json: bool,

    /// Matcher recursion limit
    #[arg(long, default_value_t = MatchOptions::DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Limit on nested :is()/:not()/:has() arguments
    #[arg(long, default_value_t = CompileOptions::DEFAULT_MAX_NESTING)]
    max_nesting: usize,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let (tree_path, selector) = match cli.inputs.as_slice() {
        [selector] => (None, selector.as_str()),
        [path, selector] => (Some(PathBuf::from(path)), selector.as_str()),
        _ => bail!("expected a tree file and a selector"),
    };

    let options = CompileOptions::default().with_max_nesting(cli.max_nesting);
    let compiled = compile_with(selector, &options)
        .with_context(|| format!("invalid selector '{selector}'"))?
        .with_match_options(MatchOptions::default().with_max_depth(cli.max_depth));

    if cli.expand {
        println!("{compiled}");
        return Ok(());
    }

    let tree = load_tree(tree_path, cli.tree_json.as_deref())?;
    let matches = compiled
        .match_all(&tree, NodeId::ROOT)
        .with_context(|| format!("matching '{selector}' failed"))?;

    if cli.json {
        let nodes: Vec<_> = matches.iter().filter_map(|&id| tree.to_json(id)).collect();
        println!("{}", serde_json::to_string_pretty(&nodes)?);
        return Ok(());
    }

    for &id in &matches {
        println!("{} {}", format!("{:>4}", id.0).dimmed(), describe(&tree, id)?);
    }
    eprintln!(
        "{}",
        format!("{} match(es) for {compiled}", matches.len()).bold()
    );
    Ok(())
}

/// Load the tree from `--tree-json` or from a file.
fn load_tree(path: Option<PathBuf>, inline: Option<&str>) -> Result<DomTree> {
    let json = match (inline, path) {
        (Some(json), None) => json.to_string(),
        (None, Some(path)) => fs::read_to_string(&path)
            .with_context(|| format!("reading '{}'", path.display()))?,
        (Some(_), Some(_)) => bail!("give either a tree file or --tree-json, not both"),
        (None, None) => bail!("a tree file or --tree-json is required"),
    };
    DomTree::from_json_str(&json).context("loading tree")
}

/// Render an element as an opening tag, attributes sorted by name.
fn describe(tree: &DomTree, id: NodeId) -> Result<String> {
    let tag = tree.tag_name(id)?.unwrap_or_default();
    let mut attributes = tree.attributes(id)?;
    attributes.sort_unstable();

    let mut out = format!("<{}", tag.green());
    for (name, value) in attributes {
        if value.is_empty() {
            write!(out, " {}", name.cyan())?;
        } else {
            write!(out, " {}=\"{}\"", name.cyan(), value)?;
        }
    }
    out.push('>');
    Ok(out)
}
