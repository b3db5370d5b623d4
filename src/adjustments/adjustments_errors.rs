use thiserror::Error;

pub type Result<T> = std::result::Result<T, AdjustmentError>;

#[derive(Error, Debug)]
pub enum AdjustmentError {
    #[error("Failed to access the adjusted tradebook cache: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read or write the adjusted tradebook CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Malformed cache row at line {line}: {reason}")]
    MalformedCacheRow { line: u64, reason: String },
}
