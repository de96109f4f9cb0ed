use super::error::{ParseError, ReadError};
use std::path::Path;

/// Defines the interface shared by the text formats the pipeline consumes.
///
/// Implementors only supply [`TextFormat::parse`]; reading from disk and attaching the
/// path to failures is provided.
pub trait TextFormat {
    /// The structured value a successful parse produces.
    type Output;

    /// Parses the full text of a file.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] describing the first malformed construct found.
    fn parse(text: &str) -> Result<Self::Output, ParseError>;

    /// Reads a file into memory and parses it.
    ///
    /// # Errors
    ///
    /// Returns [`ReadError::Io`] if the file cannot be read and [`ReadError::Parse`]
    /// if its content is malformed.
    fn read_from_path<P: AsRef<Path>>(path: P) -> Result<Self::Output, ReadError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ReadError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&text).map_err(|e| ReadError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }
}
