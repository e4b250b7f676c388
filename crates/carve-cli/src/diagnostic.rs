//! Source-annotated rendering of compile errors

use miette::{Diagnostic, GraphicalReportHandler, NamedSource, SourceSpan};
use thiserror::Error;

/// A compile error together with the source it points into
#[derive(Error, Debug, Diagnostic)]
#[error("{message}")]
pub struct SourceError {
    pub message: String,

    #[source_code]
    pub src: NamedSource<String>,

    #[label("{label}")]
    pub span: SourceSpan,

    pub label: String,
}

impl SourceError {
    pub fn new(err: &carve_lang::Error, name: &str, source: &str) -> Self {
        let span = err.span();
        Self {
            message: err.message(),
            src: NamedSource::new(name, source.to_string()),
            span: (span.start, span.len()).into(),
            label: err.kind().to_string(),
        }
    }

    /// Render with source context and an underlined span
    pub fn render(&self) -> String {
        let mut out = String::new();
        if GraphicalReportHandler::new().render_report(&mut out, self).is_err() {
            out = format!("{}: {}\n", self.label, self.message);
        }
        out
    }
}

/// Render a compile error against the source it came from
pub fn render(err: &carve_lang::Error, name: &str, source: &str) -> String {
    SourceError::new(err, name, source).render()
}
