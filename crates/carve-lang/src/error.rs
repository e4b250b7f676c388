//! Error types for Carve

use std::fmt;

use thiserror::Error;

use crate::token::Span;

/// Result type alias using Carve's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Diagnostics produced by the compilation pipeline.
///
/// Every variant is terminal: the stage that raises it stops the pipeline and
/// no partial AST, IR or shader is returned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A character outside the language's alphabet
    #[error("unexpected character '{found}' at {span}")]
    Lex { span: Span, found: char },

    /// Malformed syntax
    #[error("expected {expected}, found {found} at {span}")]
    Parse {
        span: Span,
        expected: String,
        found: String,
    },

    /// Call to a name missing from the builtin table
    #[error("undefined function '{name}' at {span}")]
    UndefinedFunction { span: Span, name: String },

    /// Arity or type mismatch, or a root that is not a solid
    #[error("{message} at {span}")]
    Type { span: Span, message: String },
}

/// The stage a diagnostic came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    Lex,
    Parse,
    UndefinedFunction,
    Type,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DiagnosticKind::Lex => "lex error",
            DiagnosticKind::Parse => "parse error",
            DiagnosticKind::UndefinedFunction => "undefined function",
            DiagnosticKind::Type => "type error",
        })
    }
}

impl Error {
    pub(crate) fn parse(span: Span, expected: impl Into<String>, found: impl fmt::Display) -> Self {
        Error::Parse {
            span,
            expected: expected.into(),
            found: found.to_string(),
        }
    }

    pub(crate) fn type_error(span: Span, message: impl Into<String>) -> Self {
        Error::Type {
            span,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> DiagnosticKind {
        match self {
            Error::Lex { .. } => DiagnosticKind::Lex,
            Error::Parse { .. } => DiagnosticKind::Parse,
            Error::UndefinedFunction { .. } => DiagnosticKind::UndefinedFunction,
            Error::Type { .. } => DiagnosticKind::Type,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Error::Lex { span, .. }
            | Error::Parse { span, .. }
            | Error::UndefinedFunction { span, .. }
            | Error::Type { span, .. } => *span,
        }
    }

    /// The message without the trailing position, for renderers that show
    /// the span themselves
    pub fn message(&self) -> String {
        match self {
            Error::Lex { found, .. } => format!("unexpected character '{}'", found),
            Error::Parse {
                expected, found, ..
            } => format!("expected {}, found {}", expected, found),
            Error::UndefinedFunction { name, .. } => format!("undefined function '{}'", name),
            Error::Type { message, .. } => message.clone(),
        }
    }

    /// Render as `line:col: kind: message` against the source text
    pub fn render(&self, source: &str) -> String {
        let (line, col) = self.span().line_col(source);
        format!("{}:{}: {}: {}", line, col, self.kind(), self.message())
    }
}
