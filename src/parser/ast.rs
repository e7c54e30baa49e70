//! Syntax tree for parsed markup templates

use serde::Serialize;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// AST node with source location
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }
}

/// Depth-first document position of a node.
///
/// Assigned once after parsing; used for tie-breaking between duplicate refs
/// and as the stable handle the renderer reports back at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Raw source of a bound expression, e.g. `user.isAdmin` for `{user.isAdmin}`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Expression {
    pub source: String,
    pub span: Span,
}

impl Expression {
    pub fn new(source: impl Into<String>, span: Span) -> Self {
        Self {
            source: source.into(),
            span,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl std::fmt::Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{{}}}", self.source)
    }
}

/// Attribute value: a quoted literal or a braced expression
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AttributeValue {
    Literal(String),
    Expression(Expression),
}

/// A single attribute on an element
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attribute {
    pub name: Spanned<String>,
    /// `None` for bare attributes such as `else`
    pub value: Option<Spanned<AttributeValue>>,
    pub span: Span,
}

impl Attribute {
    pub fn name(&self) -> &str {
        &self.name.node
    }

    /// The literal value, if the attribute carries one
    pub fn literal(&self) -> Option<&str> {
        match self.value.as_ref().map(|v| &v.node) {
            Some(AttributeValue::Literal(s)) => Some(s),
            _ => None,
        }
    }
}

/// Tag of the grouping element that renders only its children
pub const TEMPLATE_TAG: &str = "template";

/// Tag of the slot-projection element
pub const SLOT_TAG: &str = "slot";

/// Attribute that turns on comment preservation for a template's subtree
pub const PRESERVE_COMMENTS_ATTR: &str = "preserve-comments";

/// A node in the parsed tree
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateNode {
    pub id: NodeId,
    pub span: Span,
    pub kind: NodeKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeKind {
    Element(Element),
    Text { content: String },
    Comment { content: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Element {
    pub tag: Spanned<String>,
    pub attributes: Vec<Attribute>,
    pub children: Vec<TemplateNode>,
    /// Whether comments among this element's children are significant
    pub preserve_comments: bool,
}

impl Element {
    pub fn tag(&self) -> &str {
        &self.tag.node
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name() == name)
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    pub fn is_template(&self) -> bool {
        self.tag() == TEMPLATE_TAG
    }
}

impl TemplateNode {
    pub fn as_element(&self) -> Option<&Element> {
        match &self.kind {
            NodeKind::Element(el) => Some(el),
            _ => None,
        }
    }

    /// True for text nodes made only of whitespace
    pub fn is_whitespace(&self) -> bool {
        matches!(&self.kind, NodeKind::Text { content } if content.trim().is_empty())
    }

    pub fn is_comment(&self) -> bool {
        matches!(self.kind, NodeKind::Comment { .. })
    }
}

/// Root of a parsed template source: the top-level sibling list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Template {
    pub nodes: Vec<TemplateNode>,
}

impl Template {
    /// Number every node in depth-first pre-order and propagate
    /// comment-preserving scopes down the tree.
    ///
    /// Trees built outside [`parse`](crate::parser::parse) must go through
    /// this before their ordinals mean anything; `compile` does it on demand.
    pub fn finalize(&mut self) {
        let mut next = 0;
        for node in &mut self.nodes {
            finalize_node(node, false, &mut next);
        }
    }

    /// Whether ordinals and comment scopes already match what
    /// [`Template::finalize`] would assign
    pub fn is_finalized(&self) -> bool {
        let mut next = 0;
        self.nodes
            .iter()
            .all(|node| is_finalized_node(node, false, &mut next))
    }

    /// Total number of nodes in the tree
    pub fn node_count(&self) -> usize {
        fn count(nodes: &[TemplateNode]) -> usize {
            nodes
                .iter()
                .map(|n| 1 + n.as_element().map_or(0, |el| count(&el.children)))
                .sum()
        }
        count(&self.nodes)
    }
}

fn preserves_comments(el: &Element, inherited_preserve: bool) -> bool {
    inherited_preserve || (el.is_template() && el.has_attribute(PRESERVE_COMMENTS_ATTR))
}

fn is_finalized_node(node: &TemplateNode, inherited_preserve: bool, next: &mut usize) -> bool {
    if node.id != NodeId(*next) {
        return false;
    }
    *next += 1;
    match &node.kind {
        NodeKind::Element(el) => {
            el.preserve_comments == preserves_comments(el, inherited_preserve)
                && el
                    .children
                    .iter()
                    .all(|child| is_finalized_node(child, el.preserve_comments, next))
        }
        NodeKind::Text { .. } | NodeKind::Comment { .. } => true,
    }
}

fn finalize_node(node: &mut TemplateNode, inherited_preserve: bool, next: &mut usize) {
    node.id = NodeId(*next);
    *next += 1;
    if let NodeKind::Element(el) = &mut node.kind {
        el.preserve_comments = preserves_comments(el, inherited_preserve);
        let scope = el.preserve_comments;
        for child in &mut el.children {
            finalize_node(child, scope, next);
        }
    }
}
