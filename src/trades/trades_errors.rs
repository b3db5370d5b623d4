use thiserror::Error;

pub type Result<T> = std::result::Result<T, TradeError>;

/// Errors raised while ingesting tradebook files.
///
/// The file-level variants (`Io`, `Csv`) abort the affected file; the
/// record-level variants become the rejection reason of a single row while
/// the rest of the batch keeps processing.
#[derive(Error, Debug)]
pub enum TradeError {
    #[error("Failed to read tradebook file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse tradebook CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Unparseable timestamp '{0}'")]
    InvalidTimestamp(String),

    #[error("Invalid price '{0}': price must be a non-negative number")]
    InvalidPrice(String),

    #[error("Invalid quantity '{0}': quantity must be a non-zero number")]
    InvalidQuantity(String),

    #[error("Unknown trade kind: {0}")]
    UnknownKind(String),
}
