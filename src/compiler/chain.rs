//! Conditional chain builder
//!
//! Scans one sibling list left to right and groups an `if` with the
//! `elseif`/`else` siblings that directly follow it. Only whitespace (and
//! comments, outside comment-preserving scopes) may sit between members.

use crate::parser::ast::{NodeId, Span};

use super::directive::{Condition, DirectiveTag};
use super::error::CompileError;

/// Where a conditional directive was written, for diagnostics
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Site {
    pub directive: String,
    pub tag: String,
    /// Span of the directive attribute
    pub span: Span,
    /// Span of the whole node
    pub extent: Span,
    pub node: NodeId,
}

/// A sibling after classification
#[derive(Debug)]
pub(crate) enum Sibling<T> {
    /// Anything that separates chain members
    Content(T),
    /// Whitespace text, or a comment in a scope that does not preserve them.
    /// `None` is never emitted.
    Gap(Option<T>),
    /// Node tagged `If`, `ElseIf` or `Else`
    Conditional {
        tag: DirectiveTag,
        site: Site,
        item: T,
    },
}

/// A closed chain
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ConditionalChain<T> {
    pub branches: Vec<(Condition, T)>,
    pub default: Option<T>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Emitted<T> {
    Node(T),
    Chain(ConditionalChain<T>),
}

enum State<T> {
    /// No chain seen on this level
    Idle,
    /// Chain accepting further members; gaps since the last member are pending
    Open {
        chain: ConditionalChain<T>,
        terminated: bool,
        pending: Vec<T>,
    },
    /// A chain existed but content closed it
    Closed { terminated: bool },
}

struct Builder<T> {
    state: State<T>,
    output: Vec<Emitted<T>>,
    errors: Vec<CompileError>,
}

impl<T> Builder<T> {
    /// Emit an open chain followed by its trailing gaps
    fn close(&mut self) {
        let state = std::mem::replace(&mut self.state, State::Idle);
        self.state = match state {
            State::Open {
                chain,
                terminated,
                pending,
            } => {
                tracing::trace!(
                    branches = chain.branches.len(),
                    has_default = chain.default.is_some(),
                    "closed conditional chain"
                );
                self.output.push(Emitted::Chain(chain));
                self.output.extend(pending.into_iter().map(Emitted::Node));
                State::Closed { terminated }
            }
            other => other,
        };
    }

    fn content(&mut self, item: T) {
        self.close();
        self.output.push(Emitted::Node(item));
    }

    fn gap(&mut self, item: Option<T>) {
        match (&mut self.state, item) {
            (State::Open { pending, .. }, Some(item)) => pending.push(item),
            (_, Some(item)) => self.output.push(Emitted::Node(item)),
            (_, None) => {}
        }
    }

    fn open(&mut self, condition: Condition, site: &Site, item: T) {
        self.close();
        self.state = State::Open {
            chain: ConditionalChain {
                branches: vec![(condition, item)],
                default: None,
                span: site.extent.clone(),
            },
            terminated: false,
            pending: Vec::new(),
        };
    }

    /// Attach an `elseif` (condition given) or `else` to the open chain
    fn extend(&mut self, condition: Option<Condition>, site: Site, item: T) {
        match &mut self.state {
            State::Open {
                chain,
                terminated,
                pending,
            } if !*terminated => {
                // Gaps between members are absorbed
                pending.clear();
                chain.span.end = site.extent.end;
                match condition {
                    Some(condition) => chain.branches.push((condition, item)),
                    None => {
                        chain.default = Some(item);
                        *terminated = true;
                    }
                }
            }
            State::Closed { terminated: false } => {
                self.errors.push(CompileError::NonAdjacentConditional {
                    directive: site.directive,
                    tag: site.tag,
                    span: site.span,
                    node: site.node,
                });
                self.content(item);
            }
            State::Idle | State::Open { .. } | State::Closed { .. } => {
                self.errors.push(CompileError::OrphanedElseDirective {
                    directive: site.directive,
                    tag: site.tag,
                    span: site.span,
                    node: site.node,
                });
                self.content(item);
            }
        }
    }
}

/// Group conditional siblings into chains.
///
/// Returns the output sibling list and the placement errors. A node that
/// cannot join a chain is emitted as plain content.
pub(crate) fn build_chains<T>(
    siblings: impl IntoIterator<Item = Sibling<T>>,
) -> (Vec<Emitted<T>>, Vec<CompileError>) {
    let mut builder = Builder {
        state: State::Idle,
        output: Vec::new(),
        errors: Vec::new(),
    };

    for sibling in siblings {
        match sibling {
            Sibling::Content(item) => builder.content(item),
            Sibling::Gap(item) => builder.gap(item),
            Sibling::Conditional { tag, site, item } => match tag {
                DirectiveTag::If(condition) => builder.open(condition, &site, item),
                DirectiveTag::ElseIf(condition) => builder.extend(Some(condition), site, item),
                DirectiveTag::Else => builder.extend(None, site, item),
                DirectiveTag::None | DirectiveTag::Ref { .. } => builder.content(item),
            },
        }
    }
    builder.close();

    (builder.output, builder.errors)
}
