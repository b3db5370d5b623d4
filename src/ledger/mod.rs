pub mod ledger_calculator;
pub mod ledger_model;

// Re-export the main public entry points and types
pub use ledger_calculator::LedgerCalculator;
pub use ledger_model::{PositionLedger, PositionState, RealizedEvent, TrendPoint};

#[cfg(test)]
pub(crate) mod tests;
