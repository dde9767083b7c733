//! CSV serialization of merged tables

use crate::error::{Error, Result};
use crate::merger::MergedTable;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Options controlling how a merged table is written
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOptions {
    /// Prepend an unnamed column holding each row's index within its source file
    pub include_index: bool,
}

/// Write a merged table to `path`, replacing any existing file
///
/// Returns the number of data rows written.
pub fn write_csv<P: AsRef<Path>>(
    table: &MergedTable,
    path: P,
    options: &WriteOptions,
) -> Result<usize> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| Error::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })?;

    write_to(table, BufWriter::new(file), options).map_err(|e| Error::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Render a merged table as a CSV string
pub fn to_csv_string(table: &MergedTable, options: &WriteOptions) -> Result<String> {
    let mut buf = Vec::new();
    write_to(table, &mut buf, options)?;
    String::from_utf8(buf)
        .map_err(|e| Error::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}

fn write_to<W: Write>(
    table: &MergedTable,
    out: W,
    options: &WriteOptions,
) -> std::io::Result<usize> {
    let mut writer = csv::Writer::from_writer(out);

    let mut header: Vec<&str> = Vec::with_capacity(table.columns.len() + 1);
    if options.include_index {
        header.push("");
    }
    header.extend(table.columns.iter().map(|c| c.name.as_str()));
    writer.write_record(&header)?;

    let mut record: Vec<String> = Vec::with_capacity(header.len());
    for row in &table.rows {
        record.clear();
        if options.include_index {
            record.push(row.source_index.to_string());
        }
        record.extend(row.cells.iter().map(|c| c.to_string_value()));
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(table.rows.len())
}
