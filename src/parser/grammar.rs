//! Parser implementation using chumsky

use std::collections::HashSet;

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

use crate::parser::ast::*;
use crate::parser::lexer::Token;

/// Deepest element nesting accepted by [`parse`]
pub const MAX_NESTING_DEPTH: usize = 256;

/// Parse template markup into a tree of nodes
///
/// Elements nested deeper than [`MAX_NESTING_DEPTH`] are a syntax error.
pub fn parse(input: &str) -> Result<Template, Vec<crate::ParseError>> {
    let len = input.len();

    let tokens = crate::parser::lexer::lex(input);
    check_nesting(&tokens).map_err(|e| vec![e])?;

    let token_iter = tokens
        .into_iter()
        .map(|(tok, span)| (tok, span.into()));

    // Turn the token iterator into a stream that chumsky can use
    let token_stream = Stream::from_iter(token_iter)
        // Split (Token, SimpleSpan) into token and span parts
        .map((len..len).into(), |(t, s): (_, _)| (t, s));

    let mut template = template_parser()
        .parse(token_stream)
        .into_result()
        .map_err(|errs| errs.into_iter().map(|e| e.into()).collect::<Vec<_>>())?;

    template.finalize();
    tracing::trace!(nodes = template.node_count(), "parsed template");
    Ok(template)
}

/// Reject element nesting the recursive parser and compiler cannot descend safely
fn check_nesting(tokens: &[(Token, std::ops::Range<usize>)]) -> Result<(), crate::ParseError> {
    let mut depth = 0usize;
    let mut open_start = None;

    for (token, span) in tokens {
        match token {
            Token::TagOpen => open_start = Some(span.start),
            Token::TagClose => {
                if let Some(start) = open_start.take() {
                    depth += 1;
                    if depth > MAX_NESTING_DEPTH {
                        return Err(crate::ParseError::Syntax {
                            span: start..span.end,
                            message: format!(
                                "elements nested deeper than {} levels",
                                MAX_NESTING_DEPTH
                            ),
                            expected: Vec::new(),
                        });
                    }
                }
            }
            Token::SelfClose => open_start = None,
            Token::CloseTagOpen => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    Ok(())
}

/// Helper to extract span range from chumsky's MapExtra
fn span_range(e: &impl chumsky::span::Span<Offset = usize>) -> std::ops::Range<usize> {
    e.start()..e.end()
}

/// Opening tag plus, for non-void elements, the children and closing name
type ElementParts = (
    (Spanned<String>, Vec<Attribute>),
    Option<(Vec<TemplateNode>, Spanned<String>)>,
);

fn template_parser<'a, I>() -> impl Parser<'a, I, Template, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    let name = select! {
        Token::Name(n) => n,
    }
    .map_with(|n, e| Spanned::new(n, span_range(&e.span())));

    let value = select! {
        Token::Str(s) => s,
    }
    .map(AttributeValue::Literal)
    .or(select! {
        Token::Expr(x) => x,
    }
    .map_with(|x, e| AttributeValue::Expression(Expression::new(x, span_range(&e.span())))))
    .map_with(|v, e| Spanned::new(v, span_range(&e.span())))
    .labelled("attribute value");

    let attribute = name
        .clone()
        .then(just(Token::Equals).ignore_then(value).or_not())
        .map_with(|(name, value), e| Attribute {
            name,
            value,
            span: span_range(&e.span()),
        })
        .labelled("attribute");

    let node = recursive(|node| {
        let text = select! {
            Token::Text(t) => NodeKind::Text { content: t },
        };

        let comment = select! {
            Token::Comment(c) => NodeKind::Comment { content: c },
        };

        let open_tag = just(Token::TagOpen)
            .ignore_then(name.clone().labelled("tag name"))
            .then(attribute.clone().repeated().collect::<Vec<_>>());

        let body = just(Token::TagClose)
            .ignore_then(node.repeated().collect::<Vec<_>>())
            .then_ignore(just(Token::CloseTagOpen))
            .then(name.clone().labelled("closing tag name"))
            .then_ignore(just(Token::TagClose))
            .map(Some);

        let element = open_tag
            .then(choice((just(Token::SelfClose).to(None), body)))
            .try_map(|parts: ElementParts, span: SimpleSpan| {
                let ((tag, attributes), rest) = parts;
                let children = match rest {
                    Some((children, closing)) => {
                        if closing.node != tag.node {
                            return Err(Rich::custom(
                                span,
                                format!(
                                    "closing tag </{}> does not match <{}>",
                                    closing.node, tag.node
                                ),
                            ));
                        }
                        children
                    }
                    None => Vec::new(),
                };

                let mut seen = HashSet::new();
                for attr in &attributes {
                    if !seen.insert(attr.name()) {
                        return Err(Rich::custom(
                            span,
                            format!("duplicate attribute '{}' on <{}>", attr.name(), tag.node),
                        ));
                    }
                }

                Ok(NodeKind::Element(Element {
                    tag,
                    attributes,
                    children,
                    preserve_comments: false,
                }))
            });

        choice((element, comment, text))
            .map_with(|kind, e| TemplateNode {
                id: NodeId(0),
                span: span_range(&e.span()),
                kind,
            })
            .boxed()
    });

    node.repeated()
        .collect::<Vec<_>>()
        .then_ignore(end())
        .map(|nodes| Template { nodes })
}
