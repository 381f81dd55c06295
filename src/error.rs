//! Error types for reading input documents

use ariadne::{Color, Label, Report, ReportKind, Source};
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

#[derive(Error, Debug)]
pub enum InputError {
    /// Malformed JSON, or JSON that does not match the expected shape
    #[error("invalid input at line {line}, column {column}: {message}")]
    Json {
        span: Span,
        line: usize,
        column: usize,
        message: String,
    },
}

impl InputError {
    /// Locate a serde_json error in `source`
    pub fn from_json(err: &serde_json::Error, source: &str) -> Self {
        let offset = byte_offset(source, err.line(), err.column());
        let end = (offset + 1).min(source.len()).max(offset);
        InputError::Json {
            span: offset..end,
            line: err.line(),
            column: err.column(),
            message: strip_position(&err.to_string()),
        }
    }

    pub fn span(&self) -> Span {
        match self {
            InputError::Json { span, .. } => span.clone(),
        }
    }

    /// Format the error with source context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        let mut buf = Vec::new();
        match self {
            InputError::Json { span, message, .. } => {
                let written = Report::build(ReportKind::Error, filename, span.start)
                    .with_message("invalid input")
                    .with_label(
                        Label::new((filename, span.clone()))
                            .with_message(message)
                            .with_color(Color::Red),
                    )
                    .finish()
                    .write((filename, Source::from(source)), &mut buf);
                if written.is_err() {
                    return self.to_string();
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }
}

/// Deserialize a JSON document, keeping the error position
pub fn parse_json<T: DeserializeOwned>(source: &str) -> Result<T, InputError> {
    serde_json::from_str(source).map_err(|err| InputError::from_json(&err, source))
}

/// Byte offset of a 1-based line and column, clamped to the source
fn byte_offset(source: &str, line: usize, column: usize) -> usize {
    let line_start: usize = source
        .split_inclusive('\n')
        .take(line.saturating_sub(1))
        .map(str::len)
        .sum();
    (line_start + column.saturating_sub(1)).min(source.len())
}

/// serde_json appends " at line X column Y"; the report shows it already
fn strip_position(message: &str) -> String {
    match message.rfind(" at line ") {
        Some(idx) => message[..idx].to_string(),
        None => message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutGraph;

    #[test]
    fn test_byte_offset() {
        let source = "{\n  \"id\": 1,\n}";
        assert_eq!(byte_offset(source, 1, 1), 0);
        assert_eq!(byte_offset(source, 2, 3), 4);
        assert_eq!(byte_offset(source, 9, 9), source.len());
    }

    #[test]
    fn test_syntax_error_position() {
        let source = "{\n  \"id\": \"root\",\n  \"children\": [,]\n}";
        let err = parse_json::<LayoutGraph>(source).unwrap_err();
        let InputError::Json { line, message, .. } = &err;
        assert_eq!(*line, 3);
        assert!(!message.contains("at line"));
        assert!(err.to_string().starts_with("invalid input at line 3"));
    }

    #[test]
    fn test_format_includes_filename() {
        let source = "{\"id\": 5}";
        let err = parse_json::<LayoutGraph>(source).unwrap_err();
        let report = err.format(source, "layout.json");
        assert!(report.contains("layout.json"));
        assert!(report.contains("invalid input"));
    }
}
