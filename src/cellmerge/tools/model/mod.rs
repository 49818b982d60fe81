use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A single output column: the header label and the cell it is read from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderEntry {
    /// Column label written to the header row of the merged sheet.
    pub name: String,
    /// Cell address (for example `B3`) read from every input file.
    pub cell: String,
}

impl HeaderEntry {
    /// Creates a new entry.
    pub fn new(name: impl Into<String>, cell: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cell: cell.into(),
        }
    }
}

/// Ordered header → cell mapping. Output columns follow the entry order and
/// duplicate names yield duplicate columns.
///
/// Cell addresses are stored verbatim and only validated when a workbook is
/// read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderMapping {
    pub headers: Vec<HeaderEntry>,
}

impl HeaderMapping {
    /// Creates an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mapping from the provided entries.
    pub fn from_entries(headers: Vec<HeaderEntry>) -> Self {
        Self { headers }
    }

    /// Column labels in output order.
    pub fn column_names(&self) -> Vec<String> {
        self.headers.iter().map(|entry| entry.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }
}

/// Value read from a cell, keeping the spreadsheet type so it can be written
/// back unchanged.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Blank or out-of-range cell.
    Empty,
    String(String),
    Float(f64),
    Int(i64),
    Bool(bool),
    /// Excel serial date/time.
    DateTime(f64),
    /// Error literal such as `#DIV/0!`.
    Error(String),
}

/// The assembled merge output: one column per mapping entry and one row per
/// successfully read input file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergedTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl MergedTable {
    /// Creates an empty table with the provided header labels.
    pub fn with_columns(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// An input file that did not yield a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    pub file_name: String,
    pub reason: String,
}

/// Outcome of a successful merge run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeResult {
    /// Path of the written workbook.
    pub output_path: PathBuf,
    /// Number of data rows written, which may be lower than the number of
    /// input files.
    pub row_count: usize,
    /// Files skipped during extraction, in processing order.
    pub failures: Vec<FileFailure>,
}
