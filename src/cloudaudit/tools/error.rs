use std::path::PathBuf;

use thiserror::Error;

use crate::cloudaudit::tools::model::ResourceKind;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, ToolError>;

/// Error type covering the different failure cases that can occur when the
/// tool loads inventory exports, transforms them, or emits the workbook.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when a CSV export cannot be parsed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Raised when JSON parsing or serialization fails.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors bubbled up from the Excel writer implementation.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Errors bubbled up from the Excel reader implementation.
    #[error("Excel read error: {0}")]
    ExcelRead(#[from] calamine::XlsxError),

    /// Raised when a workbook read back for comparison is not usable.
    #[error("invalid workbook structure: {0}")]
    InvalidWorkbook(String),

    /// Raised when the user provides a path that does not exist.
    #[error("input path not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when a source table lacks a column a sheet cannot do without.
    #[error("table '{}' has no column '{column}'", .kind.key())]
    MissingColumn { kind: ResourceKind, column: String },

    /// Raised when the run configuration is inconsistent.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Raised when the relational source cannot be reached.
    #[cfg(feature = "postgres")]
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}

/// Cell-level failure raised while flattening a nested attribute.
///
/// An absent attribute is not an error: flatteners return their designed
/// placeholder for it. These variants only describe input that is present
/// but does not have the expected shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlattenError {
    /// The value is valid JSON but not of the shape the attribute expects.
    #[error("expected {expected}, found {found}")]
    UnexpectedShape {
        expected: &'static str,
        found: &'static str,
    },

    /// The raw cell text could not be decoded into a structured value.
    #[error("unparseable nested value: {0}")]
    Unparseable(String),
}
