pub mod portfolio_errors;
pub mod portfolio_model;
pub mod portfolio_service;

pub use portfolio_errors::PortfolioError;
pub use portfolio_model::{ActualHolding, HoldingLedger};
pub use portfolio_service::{
    load_actual_holdings, load_benchmark_series, read_actual_holdings, read_benchmark_series,
    PortfolioService,
};
