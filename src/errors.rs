use thiserror::Error;

use crate::adjustments::AdjustmentError;
use crate::portfolio::PortfolioError;
use crate::trades::TradeError;

// Create a type alias for Result using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the ledger pipeline
#[derive(Error, Debug)]
pub enum Error {
    #[error("Tradebook ingestion failed: {0}")]
    Trade(#[from] TradeError),

    #[error("Corporate-action adjustment failed: {0}")]
    Adjustment(#[from] AdjustmentError),

    #[error("Portfolio operation failed: {0}")]
    Portfolio(#[from] PortfolioError),
}
