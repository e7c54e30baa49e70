//! Template Directives - a compiler for structural template directives
//!
//! Resolves conditional chains (`if:true`/`if:false`, `elseif:true`/`elseif:false`,
//! `else`) and element refs (`ref="name"`) in HTML-like templates into an
//! immutable [`CompiledTemplate`], and keeps a read-only ref lookup per
//! component instance at runtime.
//!
//! # Example
//!
//! ```rust
//! use template_directives::{compile_source, CompileOptions};
//!
//! let compiled = compile_source(
//!     r#"<div><p if:true={ready} ref="msg">ok</p><p else>wait</p></div>"#,
//!     &CompileOptions::default(),
//! )
//! .unwrap();
//! assert!(compiled.ref_table().contains("msg"));
//! ```

pub mod compiler;
pub mod error;
pub mod outline;
pub mod parser;
pub mod runtime;

pub use compiler::{
    classify, compile, BranchConstruct, BranchEntry, CompileError, CompileOptions,
    CompiledElement, CompiledNode, CompiledTemplate, Condition, ConfigError, DirectiveTag,
    Polarity, RefEntry, RefName, RefTable, ValueShape,
};
pub use error::ParseError;
pub use parser::{parse, NodeId, Template};
pub use runtime::{ComponentRefs, LiveRefBinding, Mutation, Refs, RenderedNode, RuntimeError};

use thiserror::Error;

/// Errors that can occur while compiling template source
#[derive(Debug, Error)]
pub enum Error {
    /// Error during parsing
    #[error("parse errors: {}", join_errors(.0))]
    Parse(Vec<ParseError>),

    /// Error during directive compilation
    #[error("compile errors: {}", join_errors(.0))]
    Compile(Vec<CompileError>),
}

impl From<Vec<ParseError>> for Error {
    fn from(errors: Vec<ParseError>) -> Self {
        Error::Parse(errors)
    }
}

impl From<Vec<CompileError>> for Error {
    fn from(errors: Vec<CompileError>) -> Self {
        Error::Compile(errors)
    }
}

impl Error {
    /// Render every contained error as an ariadne report
    pub fn format(&self, source: &str, filename: &str) -> String {
        match self {
            Error::Parse(errors) => errors
                .iter()
                .map(|e| e.format(source, filename))
                .collect::<Vec<_>>()
                .join("\n"),
            Error::Compile(errors) => errors
                .iter()
                .map(|e| e.format(source, filename))
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }

    /// Number of individual errors
    pub fn len(&self) -> usize {
        match self {
            Error::Parse(errors) => errors.len(),
            Error::Compile(errors) => errors.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn join_errors<E: std::fmt::Display>(errors: &[E]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Parse and compile template source
///
/// # Example
///
/// ```rust
/// use template_directives::{compile_source, CompileOptions, Error};
///
/// let result = compile_source("<p else>orphan</p>", &CompileOptions::default());
/// assert!(matches!(result, Err(Error::Compile(_))));
/// ```
pub fn compile_source(source: &str, options: &CompileOptions) -> Result<CompiledTemplate, Error> {
    let template = parse(source)?;
    let compiled = compile(&template, options)?;
    Ok(compiled)
}
