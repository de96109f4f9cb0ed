use super::Format;
use crate::core::field::FieldError;
use std::path::PathBuf;
use thiserror::Error;

/// A malformed-input failure in one of the text formats.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to parse {format} data: {details} (at line ~{line})")]
    Line {
        format: Format,
        line: usize,
        details: String,
    },

    #[error("failed to parse {format} data: {details}")]
    Content { format: Format, details: String },

    #[error("invalid {format} grid: {source}")]
    Grid {
        format: Format,
        #[source]
        source: FieldError,
    },
}

impl ParseError {
    /// Builds a line-anchored error. `line` is 1-based.
    pub fn line(format: Format, line: usize, details: impl Into<String>) -> Self {
        Self::Line {
            format,
            line,
            details: details.into(),
        }
    }

    pub fn content(format: Format, details: impl Into<String>) -> Self {
        Self::Content {
            format,
            details: details.into(),
        }
    }

    pub fn format(&self) -> Format {
        match self {
            Self::Line { format, .. } | Self::Content { format, .. } | Self::Grid { format, .. } => {
                *format
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("failed to read '{path}': {source}", path = path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse '{path}': {source}", path = path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },
}

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("failed to write '{path}': {source}", path = path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize JSON for '{path}': {source}", path = path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
