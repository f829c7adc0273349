//! JSON form of a tree.
//!
//! ```json
//! {"type": "element", "tagName": "select", "attributes": {"multiple": ""},
//!  "children": [{"type": "text", "content": "hi"}]}
//! ```
//!
//! A document may be given either as a single top-level node or wrapped in
//! `{"type": "document", "children": [...]}`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{DomTree, ElementData, NodeId, NodeType};

/// Errors raised while loading a tree from JSON.
#[derive(Debug, Error)]
pub enum TreeLoadError {
    /// The input was not valid JSON or did not follow the node schema.
    #[error("invalid tree JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A document node appeared somewhere other than the top level.
    #[error("document node nested inside another node")]
    NestedDocument,
}

/// A serialized tree node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum JsonNode {
    /// The document root.
    Document {
        /// Top-level nodes.
        #[serde(default)]
        children: Vec<JsonNode>,
    },
    /// An element with attributes and children.
    Element {
        /// Local name of the element.
        #[serde(rename = "tagName")]
        tag_name: String,
        /// Attribute list, sorted by name when serialized.
        #[serde(default)]
        attributes: BTreeMap<String, String>,
        /// Child nodes in document order.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        children: Vec<JsonNode>,
    },
    /// A text node.
    Text {
        /// Character data.
        content: String,
    },
    /// A comment node.
    Comment {
        /// Comment data.
        content: String,
    },
}

impl DomTree {
    /// Build a tree from its JSON form.
    pub fn from_json_str(input: &str) -> Result<Self, TreeLoadError> {
        let node: JsonNode = serde_json::from_str(input)?;
        let mut tree = Self::new();
        match node {
            JsonNode::Document { children } => {
                for child in children {
                    tree.insert_json(NodeId::ROOT, child)?;
                }
            }
            other => tree.insert_json(NodeId::ROOT, other)?,
        }
        Ok(tree)
    }

    fn insert_json(&mut self, parent: NodeId, node: JsonNode) -> Result<(), TreeLoadError> {
        let (node_type, children) = match node {
            JsonNode::Document { .. } => return Err(TreeLoadError::NestedDocument),
            JsonNode::Element {
                tag_name,
                attributes,
                children,
            } => (
                NodeType::Element(ElementData {
                    tag_name,
                    attrs: attributes.into_iter().collect(),
                }),
                children,
            ),
            JsonNode::Text { content } => (NodeType::Text(content), Vec::new()),
            JsonNode::Comment { content } => (NodeType::Comment(content), Vec::new()),
        };
        let id = self.alloc(node_type);
        self.append_child(parent, id);
        for child in children {
            self.insert_json(id, child)?;
        }
        Ok(())
    }

    /// Serialize the subtree rooted at `id`.
    #[must_use]
    pub fn to_json(&self, id: NodeId) -> Option<JsonNode> {
        let node = self.get(id)?;
        let children = || {
            node.children
                .iter()
                .filter_map(|&child| self.to_json(child))
                .collect()
        };
        Some(match &node.node_type {
            NodeType::Document => JsonNode::Document {
                children: children(),
            },
            NodeType::Element(data) => JsonNode::Element {
                tag_name: data.tag_name.clone(),
                attributes: data
                    .attrs
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect(),
                children: children(),
            },
            NodeType::Text(content) => JsonNode::Text {
                content: content.clone(),
            },
            NodeType::Comment(content) => JsonNode::Comment {
                content: content.clone(),
            },
        })
    }
}
