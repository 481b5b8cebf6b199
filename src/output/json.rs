//! JSON serialization for significance results.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::Result;
use crate::result::SignificanceResult;

/// Serialize a result to a compact JSON string.
///
/// # Errors
///
/// Returns an error if serialization fails (should not happen for
/// `SignificanceResult`).
pub fn to_json(result: &SignificanceResult) -> serde_json::Result<String> {
    serde_json::to_string(result)
}

/// Serialize a result to a pretty-printed JSON string.
///
/// # Errors
///
/// Returns an error if serialization fails (should not happen for
/// `SignificanceResult`).
pub fn to_json_pretty(result: &SignificanceResult) -> serde_json::Result<String> {
    serde_json::to_string_pretty(result)
}

/// Write a pretty-printed result to `path`, creating parent directories.
pub fn write_json(result: &SignificanceResult, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(fs::File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, result)?;
    writer.flush()?;
    Ok(())
}
