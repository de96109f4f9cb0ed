use super::error::WriteError;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Serializes `value` as compact JSON into the file at `path`, replacing any existing file.
///
/// # Errors
///
/// Returns [`WriteError::Io`] if the file cannot be created or flushed and
/// [`WriteError::Json`] if serialization fails.
pub fn write_json_file<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), WriteError> {
    let io_err = |source| WriteError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, value).map_err(|source| WriteError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    writer.flush().map_err(io_err)
}
