use thiserror::Error;

#[derive(Error, Debug)]
pub enum JournalError {
    #[error("Failed to read or write CSV data: {0}")]
    Csv(#[from] csv::Error),

    #[error("An error occurred during JSON serialization: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error while exporting: {0}")]
    Io(#[from] std::io::Error),

    #[error("Exported data was not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    #[error("Invalid trade on line {line}: {reason}")]
    InvalidRecord { line: u64, reason: String },
}
