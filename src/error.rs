//! Error types for the analysis pipeline.

use thiserror::Error;

/// Everything a pipeline stage can report back to the presentation layer.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Neither the delimited-text parser nor the workbook parser accepted the upload.
    #[error("Unsupported file format (delimited text: {delimited}; workbook: {workbook})")]
    UnsupportedFormat { delimited: String, workbook: String },

    #[error("Required columns not found: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Cannot summarize an empty table")]
    EmptyTable,

    #[error("Unknown column '{0}'")]
    UnknownColumn(String),

    /// A delimited record with more fields than the header. `record` counts
    /// data rows from 1.
    #[error("Record {record} has {found} fields but the header has {expected}")]
    RaggedRecord {
        record: u64,
        found: usize,
        expected: usize,
    },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error("Spreadsheet export error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;
