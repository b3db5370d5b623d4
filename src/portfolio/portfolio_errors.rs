use thiserror::Error;

pub type Result<T> = std::result::Result<T, PortfolioError>;

#[derive(Error, Debug)]
pub enum PortfolioError {
    #[error("Failed to read portfolio input file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse portfolio CSV: {0}")]
    Csv(#[from] csv::Error),
}
