use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, ToolError>;

/// Error type covering the different failure cases that can occur when the
/// tool manages mapping records or merges spreadsheets.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when JSON parsing or serialization fails.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors bubbled up from the Excel writer implementation.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Errors bubbled up from the Excel reader implementation.
    #[error("Excel read error: {0}")]
    ExcelRead(#[from] calamine::Error),

    /// Raised when the source directory holds no spreadsheet to merge.
    #[error("no spreadsheet files found in {}", .0.display())]
    NoInputFiles(PathBuf),

    /// Raised when a single input file cannot be opened or read.
    #[error("failed to read {file}: {reason}")]
    FileRead { file: String, reason: String },

    /// Raised when a workbook does not contain any worksheet.
    #[error("workbook {} has no worksheet", .0.display())]
    MissingSheet(PathBuf),

    /// Raised when a mapping entry does not hold a single-cell address.
    #[error("invalid cell address '{0}'")]
    InvalidCellAddress(String),

    /// Raised when a mapping record does not exist.
    #[error("mapping '{0}' not found")]
    NotFound(String),

    /// Raised when a mapping record would be overwritten.
    #[error("mapping '{0}' already exists")]
    AlreadyExists(String),

    /// Raised when a mapping record cannot be decoded.
    #[error("mapping '{name}' is corrupt: {reason}")]
    Corrupt { name: String, reason: String },

    /// Raised when a mapping name cannot be used as a record file name.
    #[error("invalid mapping name '{0}'")]
    InvalidName(String),

    /// Raised when the merged workbook could not be persisted.
    #[error("failed to write {}: {reason}", path.display())]
    WriteFailed { path: PathBuf, reason: String },

    /// Raised when the user provides a path that does not exist.
    #[error("input directory not found: {}", .0.display())]
    MissingInput(PathBuf),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}
