//! Lexer for template markup using logos
//!
//! Markup is context sensitive: outside of a tag everything up to the next `<`
//! is text, inside a tag whitespace separates names and values. The lexer runs
//! two logos machines and morphs between them at tag boundaries.

use logos::Logos;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// Tokens seen by the parser
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Token {
    /// Character data between tags
    Text(String),
    /// Body of `<!-- ... -->`
    Comment(String),
    /// `<`
    TagOpen,
    /// `</`
    CloseTagOpen,
    /// `>`
    TagClose,
    /// `/>`
    SelfClose,
    /// Tag or attribute name
    Name(String),
    /// `=`
    Equals,
    /// Quoted literal, quotes removed
    Str(String),
    /// Braced expression, braces removed and trimmed
    Expr(String),
    /// Anything the lexer could not recognize
    Error,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Text(_) => write!(f, "text"),
            Token::Comment(_) => write!(f, "comment"),
            Token::TagOpen => write!(f, "'<'"),
            Token::CloseTagOpen => write!(f, "'</'"),
            Token::TagClose => write!(f, "'>'"),
            Token::SelfClose => write!(f, "'/>'"),
            Token::Name(n) => write!(f, "name '{}'", n),
            Token::Equals => write!(f, "'='"),
            Token::Str(s) => write!(f, "string \"{}\"", s),
            Token::Expr(e) => write!(f, "expression {{{}}}", e),
            Token::Error => write!(f, "invalid input"),
        }
    }
}

#[derive(Logos, Debug, Clone, PartialEq)]
enum ContentToken {
    #[token("<!--", lex_comment)]
    Comment(String),

    #[token("</")]
    CloseTagOpen,

    #[token("<")]
    TagOpen,

    #[regex(r"[^<]+", |lex| lex.slice().to_string())]
    Text(String),
}

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r]+")]
enum TagToken {
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_:.\-]*", |lex| lex.slice().to_string())]
    Name(String),

    #[token("=")]
    Equals,

    #[regex(r#""[^"]*""#, |lex| {
        let s = lex.slice();
        s[1..s.len() - 1].to_string()
    })]
    #[regex(r"'[^']*'", |lex| {
        let s = lex.slice();
        s[1..s.len() - 1].to_string()
    })]
    Str(String),

    #[token("{", lex_expression)]
    Expr(String),

    #[token(">")]
    TagClose,

    #[token("/>")]
    SelfClose,
}

/// Consume a comment body up to and including `-->`
fn lex_comment(lex: &mut logos::Lexer<ContentToken>) -> Option<String> {
    let rest = lex.remainder();
    let end = rest.find("-->")?;
    let body = rest[..end].to_string();
    lex.bump(end + 3);
    Some(body)
}

/// Consume an expression body up to the matching `}`
fn lex_expression(lex: &mut logos::Lexer<TagToken>) -> Option<String> {
    let rest = lex.remainder();
    let mut depth = 1usize;
    for (i, c) in rest.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    let body = rest[..i].trim().to_string();
                    lex.bump(i + 1);
                    return Some(body);
                }
            }
            _ => {}
        }
    }
    None
}

/// Lex markup into tokens with spans
pub fn lex(input: &str) -> Vec<(Token, Span)> {
    let mut tokens = Vec::new();
    let mut content = ContentToken::lexer(input);

    loop {
        let mut in_tag = false;
        while let Some(result) = content.next() {
            let span = content.span();
            match result {
                Ok(ContentToken::Text(t)) => tokens.push((Token::Text(t), span)),
                Ok(ContentToken::Comment(c)) => tokens.push((Token::Comment(c), span)),
                Ok(ContentToken::TagOpen) => {
                    tokens.push((Token::TagOpen, span));
                    in_tag = true;
                    break;
                }
                Ok(ContentToken::CloseTagOpen) => {
                    tokens.push((Token::CloseTagOpen, span));
                    in_tag = true;
                    break;
                }
                Err(()) => tokens.push((Token::Error, span)),
            }
        }
        if !in_tag {
            break;
        }

        let mut tag = content.morph::<TagToken>();
        let mut closed = false;
        while let Some(result) = tag.next() {
            let span = tag.span();
            match result {
                Ok(TagToken::Name(n)) => tokens.push((Token::Name(n), span)),
                Ok(TagToken::Equals) => tokens.push((Token::Equals, span)),
                Ok(TagToken::Str(s)) => tokens.push((Token::Str(s), span)),
                Ok(TagToken::Expr(e)) => tokens.push((Token::Expr(e), span)),
                Ok(TagToken::TagClose) => {
                    tokens.push((Token::TagClose, span));
                    closed = true;
                    break;
                }
                Ok(TagToken::SelfClose) => {
                    tokens.push((Token::SelfClose, span));
                    closed = true;
                    break;
                }
                Err(()) => tokens.push((Token::Error, span)),
            }
        }
        if !closed {
            break;
        }
        content = tag.morph::<ContentToken>();
    }

    tokens
}
