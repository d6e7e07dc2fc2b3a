use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecpamError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[cfg(feature = "xlsx")]
    #[error("XLSX error: {0}")]
    Xlsx(#[from] calamine::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Missing required column '{0}'")]
    MissingColumn(String),

    #[error("Invalid date '{value}' in row {row}")]
    InvalidDate { row: usize, value: String },

    #[error("Invalid amount '{value}' in row {row}")]
    InvalidAmount { row: usize, value: String },

    #[error("Invalid index value '{value}' in row {row}: must be a positive number")]
    InvalidIndexValue { row: usize, value: String },

    #[error(
        "No index value for the closing date {} (period {}). Choose a closing date covered by the index table.",
        .0.format("%d/%m/%Y"),
        .0.format("%Y-%m")
    )]
    ClosingIndexNotFound(NaiveDate),

    #[error("Unsupported file format: {0} (expected .csv or .xlsx)")]
    UnsupportedFormat(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, RecpamError>;
