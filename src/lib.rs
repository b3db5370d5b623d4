pub mod adjustments;
pub mod benchmarks;
pub mod constants;
pub mod dividends;
pub mod errors;
pub mod ledger;
pub mod portfolio;
pub mod reference;
pub mod taxlots;
pub mod trades;
pub mod utils;

pub use errors::{Error, Result};
pub use ledger::{LedgerCalculator, PositionLedger, PositionState, RealizedEvent, TrendPoint};
pub use portfolio::{HoldingLedger, PortfolioService};
pub use trades::{Trade, TradeKind};
