//! Live ref binding for one completed render pass

use std::collections::BTreeMap;

use thiserror::Error;

use crate::compiler::{CompiledTemplate, RefName};
use crate::parser::ast::NodeId;

/// A node the renderer materialized, with its opaque handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedNode<H> {
    pub id: NodeId,
    pub handle: H,
}

impl<H> RenderedNode<H> {
    pub fn new(id: NodeId, handle: H) -> Self {
        Self { id, handle }
    }
}

/// Kind of write attempted on the read-only view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    Insert,
    Update,
    Delete,
}

impl std::fmt::Display for Mutation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mutation::Insert => write!(f, "insert"),
            Mutation::Update => write!(f, "update"),
            Mutation::Delete => write!(f, "delete"),
        }
    }
}

/// Errors raised by the runtime ref view
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    #[error("cannot {operation} ref '{name}': refs are read-only")]
    ReadOnlyMutation { name: String, operation: Mutation },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Bound<H> {
    node: NodeId,
    handle: H,
}

/// Name to rendered handle map for one render pass of one template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveRefBinding<H> {
    bound: BTreeMap<RefName, Bound<H>>,
}

impl<H> Default for LiveRefBinding<H> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<H> LiveRefBinding<H> {
    pub fn empty() -> Self {
        Self {
            bound: BTreeMap::new(),
        }
    }

    /// Bind the ref nodes rendered in one pass.
    ///
    /// Names come from the compiled template. When several rendered nodes
    /// declare the same name, the one latest in depth-first order wins.
    pub fn from_render<I>(template: &CompiledTemplate, rendered: I) -> Self
    where
        I: IntoIterator<Item = RenderedNode<H>>,
    {
        let mut bound: BTreeMap<RefName, Bound<H>> = BTreeMap::new();

        for RenderedNode { id, handle } in rendered {
            let Some(name) = template.ref_name_of(id) else {
                if !template.contains_node(id) {
                    tracing::warn!(
                        node = %id,
                        "rendered node is not part of the active template"
                    );
                }
                continue;
            };

            match bound.get(name) {
                Some(existing) if existing.node > id => {
                    tracing::trace!(
                        name = %name,
                        kept = %existing.node,
                        skipped = %id,
                        "earlier duplicate ref ignored"
                    );
                }
                _ => {
                    bound.insert(name.clone(), Bound { node: id, handle });
                }
            }
        }

        Self { bound }
    }

    /// Read-only view over the binding
    pub fn refs(&self) -> Refs<'_, H> {
        Refs { binding: self }
    }

    pub fn len(&self) -> usize {
        self.bound.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bound.is_empty()
    }
}

/// Read-only lookup of ref names
///
/// Missing names read as `None`. Every write is rejected.
pub struct Refs<'a, H> {
    binding: &'a LiveRefBinding<H>,
}

impl<H> Clone for Refs<'_, H> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<H> Copy for Refs<'_, H> {}

impl<H: std::fmt::Debug> std::fmt::Debug for Refs<'_, H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a, H> Refs<'a, H> {
    /// Handle bound to `name`, or `None` if it did not render
    pub fn get(&self, name: &str) -> Option<&'a H> {
        self.binding.bound.get(name).map(|b| &b.handle)
    }

    /// Node ordinal bound to `name`
    pub fn node(&self, name: &str) -> Option<NodeId> {
        self.binding.bound.get(name).map(|b| b.node)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.binding.bound.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &'a str> {
        self.binding.bound.keys().map(RefName::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a H)> {
        self.binding
            .bound
            .iter()
            .map(|(name, b)| (name.as_str(), &b.handle))
    }

    pub fn len(&self) -> usize {
        self.binding.len()
    }

    pub fn is_empty(&self) -> bool {
        self.binding.is_empty()
    }

    /// Always fails: refs cannot be assigned from outside
    pub fn insert(&self, name: &str, _handle: H) -> Result<(), RuntimeError> {
        let operation = if self.contains(name) {
            Mutation::Update
        } else {
            Mutation::Insert
        };
        Err(RuntimeError::ReadOnlyMutation {
            name: name.to_string(),
            operation,
        })
    }

    /// Always fails: refs cannot be deleted from outside
    pub fn remove(&self, name: &str) -> Result<H, RuntimeError> {
        Err(RuntimeError::ReadOnlyMutation {
            name: name.to_string(),
            operation: Mutation::Delete,
        })
    }
}
