//! Ref table: static name to node resolution over the compiled tree

use std::collections::BTreeMap;

use serde::Serialize;

use crate::parser::ast::{NodeId, Span};

use super::compiled::CompiledNode;

/// Name declared by a `ref="..."` attribute
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct RefName(String);

impl RefName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RefName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::borrow::Borrow<str> for RefName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RefName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Resolution of one ref name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefEntry {
    pub name: RefName,
    /// Winning node: last declaration in depth-first order
    pub node: NodeId,
    pub tag: String,
    pub span: Span,
    /// Every node declaring this name, in depth-first order
    pub candidates: Vec<NodeId>,
}

/// All ref names a compiled template can ever bind
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RefTable {
    entries: BTreeMap<RefName, RefEntry>,
    #[serde(skip)]
    by_node: BTreeMap<NodeId, RefName>,
}

impl RefTable {
    /// Collect refs from a compiled tree in depth-first pre-order.
    ///
    /// Branch constructs contribute every entry and the default, whether or
    /// not they would be selected at render time. Later declarations
    /// overwrite earlier ones.
    pub fn build(nodes: &[CompiledNode]) -> Self {
        let mut table = Self::default();
        for node in nodes {
            node.walk(&mut |n| {
                if let CompiledNode::Element(el) = n {
                    if let Some(name) = &el.reference {
                        table.declare(name, el.id, &el.tag, el.span.clone());
                    }
                }
            });
        }
        table
    }

    fn declare(&mut self, name: &RefName, node: NodeId, tag: &str, span: Span) {
        self.by_node.insert(node, name.clone());
        match self.entries.get_mut(name) {
            Some(entry) => {
                tracing::debug!(
                    name = %name,
                    previous = %entry.node,
                    winner = %node,
                    "ref declared again, later node wins"
                );
                entry.node = node;
                entry.tag = tag.to_string();
                entry.span = span;
                entry.candidates.push(node);
            }
            None => {
                self.entries.insert(
                    name.clone(),
                    RefEntry {
                        name: name.clone(),
                        node,
                        tag: tag.to_string(),
                        span,
                        candidates: vec![node],
                    },
                );
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&RefEntry> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Ref name declared by a node, if it declares one
    pub fn name_of(&self, node: NodeId) -> Option<&RefName> {
        self.by_node.get(&node)
    }

    /// Names in lexicographic order
    pub fn names(&self) -> impl Iterator<Item = &RefName> {
        self.entries.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RefEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
