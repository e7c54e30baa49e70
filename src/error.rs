//! Error types for parsing markup

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

use crate::parser::lexer::Token;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Parse error at {span:?}: {message}")]
    Syntax {
        span: Span,
        message: String,
        expected: Vec<String>,
    },
}

impl ParseError {
    pub fn span(&self) -> &Span {
        match self {
            ParseError::Syntax { span, .. } => span,
        }
    }

    /// Format the error with source context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        let ParseError::Syntax {
            span,
            message,
            expected,
        } = self;

        let expected_str = if expected.is_empty() {
            String::new()
        } else {
            format!("\nExpected: {}", expected.join(", "))
        };

        render_report(
            source,
            filename,
            span,
            message,
            &format!("{}{}", message, expected_str),
        )
    }
}

/// Render a single-label ariadne error report to a string
pub(crate) fn render_report(
    source: &str,
    filename: &str,
    span: &Span,
    message: &str,
    label: &str,
) -> String {
    // ariadne counts characters, spans count bytes
    let chars = char_offset(source, span.start)..char_offset(source, span.end);

    let mut buf = Vec::new();
    let written = Report::build(ReportKind::Error, filename, chars.start)
        .with_message(message)
        .with_label(
            Label::new((filename, chars))
                .with_message(label)
                .with_color(Color::Red),
        )
        .finish()
        .write((filename, Source::from(source)), &mut buf);

    match written {
        Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
        // Writing to a Vec only fails on a malformed span; fall back to the bare message
        Err(_) => format!("error: {} at {:?}", message, span),
    }
}

/// Number of characters that start before byte `index`
fn char_offset(source: &str, index: usize) -> usize {
    source
        .char_indices()
        .take_while(|(byte, _)| *byte < index)
        .count()
}

impl<'a> From<chumsky::error::Rich<'a, Token>> for ParseError {
    fn from(err: chumsky::error::Rich<'a, Token>) -> Self {
        use chumsky::error::{RichPattern, RichReason};

        let message = match err.reason() {
            RichReason::ExpectedFound { found, .. } => match found {
                Some(tok) => format!("Unexpected {}", format_token(tok)),
                None => "Unexpected end of input".to_string(),
            },
            RichReason::Custom(msg) => msg.to_string(),
            #[allow(unreachable_patterns)]
            _ => err.to_string(),
        };

        let expected: Vec<String> = err
            .expected()
            .filter_map(|e| match e {
                RichPattern::Token(tok) => Some(format_token(tok)),
                RichPattern::Label(label) => Some(label.to_string()),
                RichPattern::EndOfInput => Some("end of input".to_string()),
                _ => None,
            })
            .collect();

        ParseError::Syntax {
            span: err.span().into_range(),
            message,
            expected,
        }
    }
}

/// Format a token for human-readable error messages
fn format_token(tok: &Token) -> String {
    match tok {
        Token::Text(s) if s.trim().is_empty() => "whitespace".to_string(),
        Token::Text(s) => format!("text \"{}\"", s.trim()),
        other => other.to_string(),
    }
}
