//! Directive compiler
//!
//! Turns a parsed template into a [`CompiledTemplate`]:
//! 1. every element is classified on its own attributes ([`directive`])
//! 2. each sibling list is scanned for conditional chains (`chain`)
//! 3. refs are collected over the compiled tree ([`refs`])
//!
//! Compilation either succeeds completely or returns every error found.

mod chain;
pub mod compiled;
pub mod config;
pub mod directive;
pub mod error;
pub mod refs;

pub use compiled::{BranchConstruct, BranchEntry, CompiledElement, CompiledNode, CompiledTemplate};
pub use config::{CompileOptions, ConfigError};
pub use directive::{classify, Condition, DirectiveTag, Polarity};
pub use error::{CompileError, ValueShape};
pub use refs::{RefEntry, RefName, RefTable};

use std::borrow::Cow;

use crate::parser::ast::{NodeKind, Template, TemplateNode};

use chain::{build_chains, ConditionalChain, Emitted, Sibling, Site};
use directive::Classification;

/// Compile a parsed template
///
/// Trees whose ordinals or comment scopes were not assigned by
/// [`Template::finalize`] are renumbered on a copy first, so hand-built trees
/// compile the same as parsed ones. Compilation recurses once per nesting
/// level; [`parse`](crate::parser::parse) caps that at
/// [`MAX_NESTING_DEPTH`](crate::parser::MAX_NESTING_DEPTH), hand-built trees
/// should stay within the same bound.
pub fn compile(
    template: &Template,
    options: &CompileOptions,
) -> Result<CompiledTemplate, Vec<CompileError>> {
    let template = if template.is_finalized() {
        Cow::Borrowed(template)
    } else {
        tracing::debug!("template tree is not numbered, finalizing a copy");
        let mut owned = template.clone();
        owned.finalize();
        Cow::Owned(owned)
    };

    let mut errors = Vec::new();
    let nodes = compile_siblings(&template.nodes, options.preserve_comments, options, &mut errors);

    if !errors.is_empty() {
        // Report in document order
        errors.sort_by_key(CompileError::node);
        tracing::debug!(errors = errors.len(), "template failed to compile");
        return Err(errors);
    }

    let compiled = CompiledTemplate::new(nodes);
    tracing::debug!(
        nodes = compiled.nodes().len(),
        refs = compiled.ref_table().len(),
        "compiled template"
    );
    Ok(compiled)
}

fn compile_siblings(
    nodes: &[TemplateNode],
    preserve_comments: bool,
    options: &CompileOptions,
    errors: &mut Vec<CompileError>,
) -> Vec<CompiledNode> {
    let siblings: Vec<_> = nodes
        .iter()
        .map(|node| compile_sibling(node, preserve_comments, options, errors))
        .collect();

    let (output, placement_errors) = build_chains(siblings);
    errors.extend(placement_errors);

    output
        .into_iter()
        .map(|emitted| match emitted {
            Emitted::Node(node) => node,
            Emitted::Chain(chain) => CompiledNode::Branch(into_branch(chain)),
        })
        .collect()
}

fn compile_sibling(
    node: &TemplateNode,
    preserve_comments: bool,
    options: &CompileOptions,
    errors: &mut Vec<CompileError>,
) -> Sibling<CompiledNode> {
    let element = match &node.kind {
        NodeKind::Text { content } => {
            let text = CompiledNode::Text {
                id: node.id,
                content: content.clone(),
                span: node.span.clone(),
            };
            return if node.is_whitespace() {
                Sibling::Gap(Some(text))
            } else {
                Sibling::Content(text)
            };
        }
        NodeKind::Comment { content } => {
            return if preserve_comments {
                Sibling::Content(CompiledNode::Comment {
                    id: node.id,
                    content: content.clone(),
                    span: node.span.clone(),
                })
            } else {
                Sibling::Gap(None)
            };
        }
        NodeKind::Element(element) => element,
    };

    let Classification {
        tag,
        reference,
        directive: conditional,
        errors: classify_errors,
    } = directive::analyze(node.id, element, options);
    errors.extend(classify_errors);

    let scope = element.preserve_comments || options.preserve_comments;
    let children = compile_siblings(&element.children, scope, options, errors);

    let compiled = CompiledNode::Element(CompiledElement {
        id: node.id,
        tag: element.tag().to_string(),
        attributes: element
            .attributes
            .iter()
            .filter(|a| !directive::is_directive_attribute(element, a.name()))
            .cloned()
            .collect(),
        reference,
        children,
        span: node.span.clone(),
    });

    match conditional {
        Some(attr) if tag.is_conditional() => Sibling::Conditional {
            tag,
            site: Site {
                directive: attr.node,
                tag: element.tag().to_string(),
                span: attr.span,
                extent: node.span.clone(),
                node: node.id,
            },
            item: compiled,
        },
        _ => Sibling::Content(compiled),
    }
}

fn into_branch(chain: ConditionalChain<CompiledNode>) -> BranchConstruct {
    BranchConstruct {
        entries: chain
            .branches
            .into_iter()
            .map(|(condition, subtree)| BranchEntry {
                condition,
                subtree: Box::new(subtree),
            })
            .collect(),
        default: chain.default.map(Box::new),
        span: chain.span,
    }
}
