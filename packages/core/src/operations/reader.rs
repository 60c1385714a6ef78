//! Operation Sheet Reader
//!
//! Header-keyed CSV/TSV parsing into [`OperationRecord`]s. Column order in
//! the sheet is irrelevant; recognized columns are matched by header name,
//! unrecognized columns are ignored, and recognized columns missing from
//! the header default to the empty string.
//!
//! Schema-level failures (invalid `action` or `redirect` value) are latched
//! onto the row rather than raised: one bad column must not abort the row,
//! and a bad row must not abort the sheet. Delimiter detection is the
//! caller's concern; pass the delimiter explicitly.

use crate::models::{OperationRecord, RECOGNIZED_COLUMNS};
use anyhow::Context;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Sheet parsing options.
#[derive(Debug, Clone, Copy)]
pub struct ReaderOptions {
    /// Field delimiter; `b','` for CSV, `b'\t'` for TSV.
    pub delimiter: u8,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl ReaderOptions {
    pub fn csv() -> Self {
        Self { delimiter: b',' }
    }

    pub fn tsv() -> Self {
        Self { delimiter: b'\t' }
    }
}

/// Parse an operation sheet into rows.
///
/// The returned vector contains every data row of the sheet, including rows
/// that failed schema validation (their `error` is set) and rows with no
/// action (the engine skips those). An `Err` is only returned for I/O or
/// structural CSV failures, which make the whole sheet unusable.
pub fn read_operations<R: Read>(
    input: R,
    options: ReaderOptions,
) -> anyhow::Result<Vec<OperationRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    // Map each recognized column to its position in this sheet's header.
    let headers = reader.headers().context("reading sheet header row")?.clone();
    let mut columns: Vec<(usize, &'static str)> = Vec::new();
    for (position, header) in headers.iter().enumerate() {
        if let Some(column) = RECOGNIZED_COLUMNS.iter().find(|c| **c == header.trim()) {
            columns.push((position, column));
        }
    }

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.context("reading sheet data row")?;
        let mut record = OperationRecord::default();
        for &(position, column) in &columns {
            let value = row.get(position).unwrap_or_default();
            if let Err(err) = record.set_column(column, value) {
                record.record_error(err.to_string());
            }
        }
        records.push(record);
    }
    tracing::debug!(rows = records.len(), "operation sheet parsed");
    Ok(records)
}

/// Parse an operation sheet from a file path.
pub fn read_operations_from_path(
    path: impl AsRef<Path>,
    options: ReaderOptions,
) -> anyhow::Result<Vec<OperationRecord>> {
    let path = path.as_ref();
    let file =
        File::open(path).with_context(|| format!("opening operation sheet {}", path.display()))?;
    read_operations(file, options)
}

// Comprehensive tests in separate module
#[cfg(test)]
#[path = "reader_test.rs"]
mod reader_test;
