pub mod trades_errors;
pub mod trades_model;
pub mod trades_service;

// Re-export the main public entry points and types
pub use trades_errors::TradeError;
pub use trades_model::{RejectedRecord, Trade, TradeKind};
pub use trades_service::{load_manual_trades, load_tradebook, TradebookLoad};
