//! Tree adapter: the read-only view of a tree the matcher works through.
//!
//! Any tree can be queried by implementing [`TreeAdapter`]. The matcher never
//! mutates nodes and only calls the methods below. An implementation for
//! [`selkie_dom::DomTree`] is provided.

use core::fmt::Debug;

use selkie_dom::{DomTree, Node, NodeId, NodeType};
use thiserror::Error;

/// Failure reported by a tree adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdapterError {
    /// The node handle does not refer to a node of this tree.
    #[error("unknown node {0}")]
    UnknownNode(String),

    /// Any other failure of the underlying tree.
    #[error("tree adapter failure: {0}")]
    Backend(String),
}

/// Result alias for adapter calls.
pub type AdapterResult<T> = Result<T, AdapterError>;

/// Primitive tree operations needed by the matcher.
///
/// Nodes of every kind (elements, text, comments, document) are handed out
/// by `parent` and `children`; [`tag_name`](Self::tag_name) returning `None`
/// marks a node as a non-element.
pub trait TreeAdapter {
    /// Node handle.
    type Node: Copy + Eq + Debug;

    /// Local name of an element, `None` for non-element nodes.
    fn tag_name(&self, node: Self::Node) -> AdapterResult<Option<&str>>;

    /// All `(name, value)` attribute pairs of an element; empty for other nodes.
    fn attributes(&self, node: Self::Node) -> AdapterResult<Vec<(&str, &str)>>;

    /// Parent node, `None` for the root.
    fn parent(&self, node: Self::Node) -> AdapterResult<Option<Self::Node>>;

    /// Children in document order.
    fn children(&self, node: Self::Node) -> AdapterResult<Vec<Self::Node>>;

    /// Character data of a text node, `None` for other nodes.
    fn text(&self, node: Self::Node) -> AdapterResult<Option<&str>>;

    /// Value of one attribute, compared by exact name.
    fn attribute(&self, node: Self::Node, name: &str) -> AdapterResult<Option<&str>> {
        Ok(self
            .attributes(node)?
            .into_iter()
            .find_map(|(key, value)| (key == name).then_some(value)))
    }

    /// The `id` attribute.
    fn id(&self, node: Self::Node) -> AdapterResult<Option<&str>> {
        self.attribute(node, "id")
    }

    /// Whether `class_name` is a whitespace-separated token of the `class`
    /// attribute.
    fn has_class(&self, node: Self::Node, class_name: &str) -> AdapterResult<bool> {
        Ok(self
            .attribute(node, "class")?
            .is_some_and(|list| list.split_ascii_whitespace().any(|c| c == class_name)))
    }

    /// Siblings before `node`, nearest first.
    fn previous_siblings(&self, node: Self::Node) -> AdapterResult<Vec<Self::Node>> {
        let Some(parent) = self.parent(node)? else {
            return Ok(Vec::new());
        };
        let siblings = self.children(parent)?;
        let index = position_in(&siblings, node)?;
        Ok(siblings[..index].iter().rev().copied().collect())
    }

    /// Siblings after `node`, nearest first.
    fn next_siblings(&self, node: Self::Node) -> AdapterResult<Vec<Self::Node>> {
        let Some(parent) = self.parent(node)? else {
            return Ok(Vec::new());
        };
        let siblings = self.children(parent)?;
        let index = position_in(&siblings, node)?;
        Ok(siblings[index + 1..].to_vec())
    }
}

/// Index of `node` among its parent's children.
fn position_in<N: Copy + Eq + Debug>(siblings: &[N], node: N) -> AdapterResult<usize> {
    siblings
        .iter()
        .position(|&s| s == node)
        .ok_or_else(|| AdapterError::Backend(format!("{node:?} missing from its parent's children")))
}

fn lookup(tree: &DomTree, id: NodeId) -> AdapterResult<&Node> {
    tree.get(id)
        .ok_or_else(|| AdapterError::UnknownNode(id.0.to_string()))
}

impl TreeAdapter for DomTree {
    type Node = NodeId;

    fn tag_name(&self, node: NodeId) -> AdapterResult<Option<&str>> {
        Ok(match &lookup(self, node)?.node_type {
            NodeType::Element(data) => Some(data.tag_name.as_str()),
            _ => None,
        })
    }

    fn attributes(&self, node: NodeId) -> AdapterResult<Vec<(&str, &str)>> {
        Ok(match &lookup(self, node)?.node_type {
            NodeType::Element(data) => data
                .attrs
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str()))
                .collect(),
            _ => Vec::new(),
        })
    }

    fn parent(&self, node: NodeId) -> AdapterResult<Option<NodeId>> {
        Ok(lookup(self, node)?.parent)
    }

    fn children(&self, node: NodeId) -> AdapterResult<Vec<NodeId>> {
        Ok(lookup(self, node)?.children.clone())
    }

    fn text(&self, node: NodeId) -> AdapterResult<Option<&str>> {
        Ok(match &lookup(self, node)?.node_type {
            NodeType::Text(text) => Some(text.as_str()),
            _ => None,
        })
    }

    fn attribute(&self, node: NodeId, name: &str) -> AdapterResult<Option<&str>> {
        Ok(match &lookup(self, node)?.node_type {
            NodeType::Element(data) => data.attrs.get(name).map(String::as_str),
            _ => None,
        })
    }

    fn id(&self, node: NodeId) -> AdapterResult<Option<&str>> {
        let _ = lookup(self, node)?;
        Ok(self.as_element(node).and_then(|e| e.id()))
    }

    fn has_class(&self, node: NodeId, class_name: &str) -> AdapterResult<bool> {
        let _ = lookup(self, node)?;
        Ok(self.as_element(node).is_some_and(|e| e.has_class(class_name)))
    }

    fn previous_siblings(&self, node: NodeId) -> AdapterResult<Vec<NodeId>> {
        let _ = lookup(self, node)?;
        Ok(self.preceding_siblings(node).collect())
    }

    fn next_siblings(&self, node: NodeId) -> AdapterResult<Vec<NodeId>> {
        let _ = lookup(self, node)?;
        Ok(self.following_siblings(node).collect())
    }
}
