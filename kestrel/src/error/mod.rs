//! Error types and reporting

use crate::ast::Span;
use crate::interp::RuntimeError;
use thiserror::Error;

/// Result type alias for the whole lex/parse/eval pipeline
pub type Result<T> = std::result::Result<T, KestrelError>;

/// A single recoverable parse failure.
///
/// The parser records these and keeps going, so one pass can report several.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ParseError {
    pub message: String,
    pub span: Span,
}

impl ParseError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        ParseError {
            message: message.into(),
            span,
        }
    }
}

/// Pipeline error
#[derive(Debug, Error)]
pub enum KestrelError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Every error from one parse pass; evaluation never ran
    #[error("{} parse error(s), first: {}", .0.len(), first_message(.0))]
    Parse(Vec<ParseError>),

    #[error("{0}")]
    Runtime(#[from] RuntimeError),
}

fn first_message(errors: &[ParseError]) -> &str {
    errors.first().map(|e| e.message.as_str()).unwrap_or("")
}

impl KestrelError {
    /// Parse errors carried by this error, empty for other kinds
    pub fn parse_errors(&self) -> &[ParseError] {
        match self {
            KestrelError::Parse(errors) => errors,
            _ => &[],
        }
    }
}

/// Report parse errors with ariadne, one report per error
pub fn report_parse_errors(
    filename: &str,
    source: &str,
    errors: &[ParseError],
) -> std::io::Result<()> {
    use ariadne::{Color, Label, Report, ReportKind, Source};

    for error in errors {
        // Eof errors sit one past the end; ariadne wants a non-empty range
        let start = error.span.start.min(source.len());
        let end = if error.span.is_empty() {
            start + 1
        } else {
            error.span.end
        };
        Report::build(ReportKind::Error, (filename, start..end))
            .with_message("Parse error")
            .with_label(
                Label::new((filename, start..end))
                    .with_message(&error.message)
                    .with_color(Color::Red),
            )
            .finish()
            .eprint((filename, Source::from(source)))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display_is_message() {
        let err = ParseError::new("expected token to be IDENT, got = instead", Span::new(4, 5));
        assert_eq!(err.to_string(), "expected token to be IDENT, got = instead");
    }

    #[test]
    fn test_kestrel_error_parse_summary() {
        let err = KestrelError::Parse(vec![
            ParseError::new("first", Span::new(0, 1)),
            ParseError::new("second", Span::new(2, 3)),
        ]);
        assert_eq!(err.to_string(), "2 parse error(s), first: first");
        assert_eq!(err.parse_errors().len(), 2);
    }

    #[test]
    fn test_runtime_error_converts() {
        let err: KestrelError = RuntimeError::division_by_zero().into();
        assert!(err.parse_errors().is_empty());
        assert_eq!(err.to_string(), "division by zero");
    }
}
