//! Delimited text output, one header line then one line per pair.
//!
//! Fields are quoted as needed, so feature names containing the delimiter,
//! quotes or newlines stay in a single column.

use std::fs;
use std::io::Write;
use std::path::Path;

use ::csv::WriterBuilder;

use crate::error::Result;
use crate::result::CorrelationTable;

/// Write `table` to `writer`, fields separated by `delimiter`.
pub fn write_delimited<W: Write>(table: &CorrelationTable, writer: W, delimiter: u8) -> Result<()> {
    let mut out = WriterBuilder::new().delimiter(delimiter).from_writer(writer);
    out.write_record(table.header())?;
    for record in table.records() {
        out.write_record(record.to_row())?;
    }
    out.flush()?;
    Ok(())
}

/// Render `table` as tab-separated text.
pub fn to_tsv(table: &CorrelationTable) -> Result<String> {
    let mut buf = Vec::new();
    write_delimited(table, &mut buf, b'\t')?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Write `table` as tab-separated text to `path`, creating parent directories.
pub fn write_tsv(table: &CorrelationTable, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    write_delimited(table, fs::File::create(path)?, b'\t')
}
