//! Per-node directive classification
//!
//! Classification is context free: it only looks at one element's own
//! attributes. Placement rules that depend on siblings live in `chain`.

use serde::Serialize;

use crate::parser::ast::{
    Attribute, AttributeValue, Element, Expression, NodeId, NodeKind, Spanned, TemplateNode,
    PRESERVE_COMMENTS_ATTR, SLOT_TAG, TEMPLATE_TAG,
};

use super::config::CompileOptions;
use super::error::{CompileError, ValueShape};
use super::refs::RefName;

pub const IF_TRUE: &str = "if:true";
pub const IF_FALSE: &str = "if:false";
pub const ELSEIF_TRUE: &str = "elseif:true";
pub const ELSEIF_FALSE: &str = "elseif:false";
pub const ELSE: &str = "else";
pub const REF: &str = "ref";

/// Whether a conditional tests for a truthy or a falsy value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    True,
    False,
}

impl Polarity {
    /// Does an evaluated expression select this branch?
    pub fn accepts(self, value: bool) -> bool {
        match self {
            Polarity::True => value,
            Polarity::False => !value,
        }
    }
}

impl std::fmt::Display for Polarity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Polarity::True => write!(f, "true"),
            Polarity::False => write!(f, "false"),
        }
    }
}

/// Expression and testing mode of an `if`/`elseif`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Condition {
    pub expression: Expression,
    pub polarity: Polarity,
}

impl Condition {
    pub fn new(expression: Expression, polarity: Polarity) -> Self {
        Self {
            expression,
            polarity,
        }
    }
}

/// Directive role of a single node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "directive", rename_all = "snake_case")]
pub enum DirectiveTag {
    None,
    If(Condition),
    ElseIf(Condition),
    Else,
    Ref { name: RefName },
}

impl DirectiveTag {
    pub fn is_conditional(&self) -> bool {
        matches!(
            self,
            DirectiveTag::If(_) | DirectiveTag::ElseIf(_) | DirectiveTag::Else
        )
    }
}

/// Conditional directive names paired with their chain position and polarity
fn conditional_kind(name: &str) -> Option<(ConditionalKind, Polarity)> {
    match name {
        IF_TRUE => Some((ConditionalKind::If, Polarity::True)),
        IF_FALSE => Some((ConditionalKind::If, Polarity::False)),
        ELSEIF_TRUE => Some((ConditionalKind::ElseIf, Polarity::True)),
        ELSEIF_FALSE => Some((ConditionalKind::ElseIf, Polarity::False)),
        ELSE => Some((ConditionalKind::Else, Polarity::True)),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConditionalKind {
    If,
    ElseIf,
    Else,
}

/// Attributes consumed by the compiler and removed from the compiled element
pub fn is_directive_attribute(element: &Element, name: &str) -> bool {
    conditional_kind(name).is_some()
        || name == REF
        || (element.is_template() && name == PRESERVE_COMMENTS_ATTR)
}

/// Full classifier result, including a best-effort tag when validation failed
#[derive(Debug, Clone)]
pub(crate) struct Classification {
    pub tag: DirectiveTag,
    /// Valid ref name carried alongside (or instead of) a conditional
    pub reference: Option<RefName>,
    /// Name and full span of the conditional attribute the tag was derived from
    pub directive: Option<Spanned<String>>,
    pub errors: Vec<CompileError>,
}

/// Classify a node by its directive attributes
///
/// Text and comment nodes are never directives.
pub fn classify(
    node: &TemplateNode,
    options: &CompileOptions,
) -> Result<DirectiveTag, Vec<CompileError>> {
    let NodeKind::Element(element) = &node.kind else {
        return Ok(DirectiveTag::None);
    };
    let classification = analyze(node.id, element, options);
    if classification.errors.is_empty() {
        Ok(classification.tag)
    } else {
        Err(classification.errors)
    }
}

/// Lenient classification used by the compiler.
///
/// Always yields a tag so sibling placement can still be checked for nodes
/// whose own attributes are invalid. The first conditional in attribute order
/// decides the tag when there are several.
pub(crate) fn analyze(id: NodeId, element: &Element, options: &CompileOptions) -> Classification {
    let mut errors = Vec::new();

    let conditionals: Vec<&Attribute> = element
        .attributes
        .iter()
        .filter(|a| conditional_kind(a.name()).is_some())
        .collect();

    if conditionals.len() > 1 {
        errors.push(CompileError::MultipleConditionalDirectives {
            tag: element.tag().to_string(),
            directives: conditionals.iter().map(|a| a.name().to_string()).collect(),
            span: element.tag.span.clone(),
            node: id,
        });
    }

    let reference = classify_ref(id, element, options, &mut errors);

    let (tag, directive) = match conditionals.first() {
        Some(attr) => (
            conditional_tag(id, element, attr, &mut errors),
            Some(Spanned::new(attr.name().to_string(), attr.span.clone())),
        ),
        None => match &reference {
            Some(name) => (DirectiveTag::Ref { name: name.clone() }, None),
            None => (DirectiveTag::None, None),
        },
    };

    Classification {
        tag,
        reference,
        directive,
        errors,
    }
}

fn conditional_tag(
    id: NodeId,
    element: &Element,
    attr: &Attribute,
    errors: &mut Vec<CompileError>,
) -> DirectiveTag {
    let Some((kind, polarity)) = conditional_kind(attr.name()) else {
        return DirectiveTag::None;
    };

    if kind == ConditionalKind::Else {
        if attr.value.is_some() {
            errors.push(CompileError::ElseWithValue {
                tag: element.tag().to_string(),
                span: attr.span.clone(),
                node: id,
            });
        }
        return DirectiveTag::Else;
    }

    let expression = match &attr.value {
        Some(Spanned {
            node: AttributeValue::Expression(expr),
            ..
        }) => expr.clone(),
        other => {
            errors.push(CompileError::DynamicRefValue {
                directive: attr.name().to_string(),
                tag: element.tag().to_string(),
                expected: ValueShape::Expression,
                span: attr.span.clone(),
                node: id,
            });
            // Keep going with the literal text so placement is still checked
            match other {
                Some(Spanned {
                    node: AttributeValue::Literal(text),
                    span,
                }) => Expression::new(text.clone(), span.clone()),
                _ => Expression::new("", attr.span.clone()),
            }
        }
    };

    let condition = Condition::new(expression, polarity);
    match kind {
        ConditionalKind::If => DirectiveTag::If(condition),
        _ => DirectiveTag::ElseIf(condition),
    }
}

fn classify_ref(
    id: NodeId,
    element: &Element,
    options: &CompileOptions,
    errors: &mut Vec<CompileError>,
) -> Option<RefName> {
    let attr = element.attribute(REF)?;

    let name = match attr.literal() {
        Some(name) if !name.is_empty() => Some(RefName::new(name)),
        _ => {
            errors.push(CompileError::DynamicRefValue {
                directive: REF.to_string(),
                tag: element.tag().to_string(),
                expected: ValueShape::Literal,
                span: attr.span.clone(),
                node: id,
            });
            None
        }
    };

    let disallowed = match element.tag() {
        TEMPLATE_TAG => Some("a <template> renders only its children"),
        SLOT_TAG if options.light_mode => {
            Some("a <slot> has no element of its own in light rendering mode")
        }
        _ => None,
    };
    if let Some(reason) = disallowed {
        errors.push(CompileError::RefOnDisallowedElement {
            tag: element.tag().to_string(),
            reason: reason.to_string(),
            span: attr.span.clone(),
            node: id,
        });
        return None;
    }

    name
}
