//! Compiled template artifact and the branch evaluation contract

use std::collections::BTreeSet;

use serde::Serialize;

use crate::parser::ast::{Attribute, Expression, NodeId, Span};

use super::directive::{Condition, Polarity};
use super::refs::{RefName, RefTable};

/// Node of the compiled tree
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CompiledNode {
    Element(CompiledElement),
    Text {
        id: NodeId,
        content: String,
        span: Span,
    },
    Comment {
        id: NodeId,
        content: String,
        span: Span,
    },
    /// A conditional chain collapsed into one construct
    Branch(BranchConstruct),
}

/// Element with directive attributes stripped
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledElement {
    pub id: NodeId,
    pub tag: String,
    /// Non-directive attributes in source order
    pub attributes: Vec<Attribute>,
    #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<RefName>,
    pub children: Vec<CompiledNode>,
    pub span: Span,
}

/// One `if`/`elseif` arm
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BranchEntry {
    pub condition: Condition,
    pub subtree: Box<CompiledNode>,
}

impl BranchEntry {
    pub fn expression(&self) -> &Expression {
        &self.condition.expression
    }

    pub fn polarity(&self) -> Polarity {
        self.condition.polarity
    }
}

/// Compiled conditional chain.
///
/// Entries are tried in source order. Each predicate is evaluated at most
/// once, and none after the first match.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BranchConstruct {
    pub entries: Vec<BranchEntry>,
    /// Subtree of the terminating `else`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Box<CompiledNode>>,
    /// From the start of the `if` node to the end of the last member
    pub span: Span,
}

impl BranchConstruct {
    /// Pick the subtree to render this pass, if any.
    ///
    /// `evaluate` returns the truthiness of an expression and is called
    /// for each entry up to and including the first match.
    pub fn select<F>(&self, mut evaluate: F) -> Option<&CompiledNode>
    where
        F: FnMut(&Expression) -> bool,
    {
        for entry in &self.entries {
            if entry.polarity().accepts(evaluate(entry.expression())) {
                return Some(&entry.subtree);
            }
        }
        self.default.as_deref()
    }

    /// All subtrees in chain order: entries, then the default
    pub fn subtrees(&self) -> impl Iterator<Item = &CompiledNode> {
        self.entries
            .iter()
            .map(|entry| entry.subtree.as_ref())
            .chain(self.default.as_deref())
    }
}

impl CompiledNode {
    /// Ordinal of the source node; branch constructs have none
    pub fn id(&self) -> Option<NodeId> {
        match self {
            CompiledNode::Element(el) => Some(el.id),
            CompiledNode::Text { id, .. } | CompiledNode::Comment { id, .. } => Some(*id),
            CompiledNode::Branch(_) => None,
        }
    }

    pub fn span(&self) -> &Span {
        match self {
            CompiledNode::Element(el) => &el.span,
            CompiledNode::Text { span, .. } | CompiledNode::Comment { span, .. } => span,
            CompiledNode::Branch(branch) => &branch.span,
        }
    }

    /// Visit this node and every node below it in depth-first pre-order,
    /// descending into every branch subtree.
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a CompiledNode)) {
        visit(self);
        match self {
            CompiledNode::Element(el) => {
                for child in &el.children {
                    child.walk(visit);
                }
            }
            CompiledNode::Branch(branch) => {
                for subtree in branch.subtrees() {
                    subtree.walk(visit);
                }
            }
            CompiledNode::Text { .. } | CompiledNode::Comment { .. } => {}
        }
    }

    fn materialize_into<F>(&self, evaluate: &mut F, out: &mut Vec<NodeId>)
    where
        F: FnMut(&Expression) -> bool,
    {
        match self {
            CompiledNode::Element(el) => {
                out.push(el.id);
                for child in &el.children {
                    child.materialize_into(evaluate, out);
                }
            }
            CompiledNode::Text { id, .. } | CompiledNode::Comment { id, .. } => out.push(*id),
            CompiledNode::Branch(branch) => {
                if let Some(selected) = branch.select(&mut *evaluate) {
                    selected.materialize_into(evaluate, out);
                }
            }
        }
    }
}

/// Immutable output of directive compilation for one template source
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledTemplate {
    nodes: Vec<CompiledNode>,
    refs: RefTable,
    #[serde(skip)]
    node_ids: BTreeSet<NodeId>,
}

impl CompiledTemplate {
    pub(crate) fn new(nodes: Vec<CompiledNode>) -> Self {
        let refs = RefTable::build(&nodes);
        let mut node_ids = BTreeSet::new();
        for node in &nodes {
            node.walk(&mut |n| {
                if let Some(id) = n.id() {
                    node_ids.insert(id);
                }
            });
        }
        Self {
            nodes,
            refs,
            node_ids,
        }
    }

    /// Top-level compiled nodes
    pub fn nodes(&self) -> &[CompiledNode] {
        &self.nodes
    }

    pub fn ref_table(&self) -> &RefTable {
        &self.refs
    }

    /// Ref name declared by a compiled node
    pub fn ref_name_of(&self, node: NodeId) -> Option<&RefName> {
        self.refs.name_of(node)
    }

    /// Whether a node with this ordinal survives in the compiled tree
    pub fn contains_node(&self, node: NodeId) -> bool {
        self.node_ids.contains(&node)
    }

    /// Simulate one render pass.
    ///
    /// Returns the ordinals of every node materialized in depth-first order.
    /// Only the selected subtree of each branch construct is entered.
    pub fn materialize<F>(&self, mut evaluate: F) -> Vec<NodeId>
    where
        F: FnMut(&Expression) -> bool,
    {
        let mut out = Vec::new();
        for node in &self.nodes {
            node.materialize_into(&mut evaluate, &mut out);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn text(id: usize, content: &str) -> CompiledNode {
        CompiledNode::Text {
            id: NodeId(id),
            content: content.to_string(),
            span: 0..0,
        }
    }

    fn entry(expr: &str, polarity: Polarity, subtree: CompiledNode) -> BranchEntry {
        BranchEntry {
            condition: Condition::new(Expression::new(expr, 0..0), polarity),
            subtree: Box::new(subtree),
        }
    }

    fn chain() -> BranchConstruct {
        BranchConstruct {
            entries: vec![
                entry("a", Polarity::True, text(1, "X")),
                entry("b", Polarity::False, text(2, "Y")),
            ],
            default: Some(Box::new(text(3, "Z"))),
            span: 0..0,
        }
    }

    #[test]
    fn test_select_first_match_short_circuits() {
        let branch = chain();
        let mut seen = Vec::new();
        let selected = branch.select(|expr| {
            seen.push(expr.as_str().to_string());
            true
        });
        assert_eq!(selected.and_then(CompiledNode::id), Some(NodeId(1)));
        assert_eq!(seen, vec!["a"]);
    }

    #[test]
    fn test_select_false_polarity() {
        let branch = chain();
        let selected = branch.select(|_| false);
        assert_eq!(selected.and_then(CompiledNode::id), Some(NodeId(2)));
    }

    #[test]
    fn test_select_default() {
        let branch = chain();
        let selected = branch.select(|expr| expr.as_str() == "b");
        assert_eq!(selected.and_then(CompiledNode::id), Some(NodeId(3)));
    }

    #[test]
    fn test_select_nothing_without_default() {
        let mut branch = chain();
        branch.default = None;
        assert!(branch.select(|expr| expr.as_str() == "b").is_none());
    }

    #[test]
    fn test_materialize_enters_selected_branch_only() {
        let template = CompiledTemplate::new(vec![
            text(0, "head"),
            CompiledNode::Branch(chain()),
            text(4, "tail"),
        ]);
        let ids = template.materialize(|expr| expr.as_str() == "a");
        assert_eq!(ids, vec![NodeId(0), NodeId(1), NodeId(4)]);
        assert!(template.contains_node(NodeId(3)));
        assert!(!template.contains_node(NodeId(9)));
    }
}
