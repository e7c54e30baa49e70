//! Error types for directive compilation

use serde::Serialize;
use thiserror::Error;

use crate::error::render_report;
use crate::parser::ast::{NodeId, Span};

/// Value shape a directive attribute must carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueShape {
    /// A braced `{expression}`
    Expression,
    /// A non-empty quoted string
    Literal,
}

impl std::fmt::Display for ValueShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueShape::Expression => write!(f, "an {{expression}} value"),
            ValueShape::Literal => write!(f, "a non-empty string literal"),
        }
    }
}

/// Errors that make a template fail to compile
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "error", rename_all = "snake_case")]
pub enum CompileError {
    /// More than one of `if:*`, `elseif:*`, `else` on one node
    #[error("<{tag}> carries multiple conditional directives: {}", .directives.join(", "))]
    MultipleConditionalDirectives {
        tag: String,
        directives: Vec<String>,
        span: Span,
        node: NodeId,
    },

    /// Directive value has the wrong shape (dynamic `ref`, literal `if`, ...)
    #[error("'{directive}' on <{tag}> requires {expected}")]
    DynamicRefValue {
        directive: String,
        tag: String,
        expected: ValueShape,
        span: Span,
        node: NodeId,
    },

    /// `else` written with a value
    #[error("'else' on <{tag}> must not have a value")]
    ElseWithValue { tag: String, span: Span, node: NodeId },

    /// `ref` on an element that can never be bound
    #[error("'ref' is not allowed on <{tag}>: {reason}")]
    RefOnDisallowedElement {
        tag: String,
        reason: String,
        span: Span,
        node: NodeId,
    },

    /// `elseif`/`else` with no open `if` chain on the same level
    #[error("'{directive}' on <{tag}> has no preceding 'if' on the same level")]
    OrphanedElseDirective {
        directive: String,
        tag: String,
        span: Span,
        node: NodeId,
    },

    /// `elseif`/`else` separated from its chain by other content
    #[error("'{directive}' on <{tag}> is not adjacent to the preceding conditional")]
    NonAdjacentConditional {
        directive: String,
        tag: String,
        span: Span,
        node: NodeId,
    },
}

impl CompileError {
    /// Source span of the offending directive or element
    pub fn span(&self) -> &Span {
        match self {
            Self::MultipleConditionalDirectives { span, .. }
            | Self::DynamicRefValue { span, .. }
            | Self::ElseWithValue { span, .. }
            | Self::RefOnDisallowedElement { span, .. }
            | Self::OrphanedElseDirective { span, .. }
            | Self::NonAdjacentConditional { span, .. } => span,
        }
    }

    /// Ordinal of the offending node
    pub fn node(&self) -> NodeId {
        match self {
            Self::MultipleConditionalDirectives { node, .. }
            | Self::DynamicRefValue { node, .. }
            | Self::ElseWithValue { node, .. }
            | Self::RefOnDisallowedElement { node, .. }
            | Self::OrphanedElseDirective { node, .. }
            | Self::NonAdjacentConditional { node, .. } => *node,
        }
    }

    /// Short hint attached to the highlighted span
    fn label(&self) -> String {
        match self {
            Self::MultipleConditionalDirectives { .. } => {
                "keep exactly one of if, elseif or else".to_string()
            }
            Self::DynamicRefValue { expected, .. } => format!("expected {}", expected),
            Self::ElseWithValue { .. } => "remove the value".to_string(),
            Self::RefOnDisallowedElement { .. } => "ref declared here".to_string(),
            Self::OrphanedElseDirective { .. } => {
                "move this directly after an element with if:true or if:false".to_string()
            }
            Self::NonAdjacentConditional { .. } => {
                "only whitespace may separate chained conditionals".to_string()
            }
        }
    }

    /// Format the error with source context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        render_report(source, filename, self.span(), &self.to_string(), &self.label())
    }
}
