use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::trades::Trade;
use crate::utils::decimal_serde::{decimal_serde, decimal_serde_option};

/// Direction of the net position. Driven as an explicit state machine by the
/// calculator: one transition per (state, trade-kind) pair.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PositionState {
    Flat,
    Long,
    Short,
}

/// One entry of a date-ordered trend series. Multiple trades on the same
/// calendar date collapse into a single end-of-day entry.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub date: NaiveDate,
    #[serde(with = "decimal_serde")]
    pub value: Decimal,
}

impl TrendPoint {
    pub fn new(date: NaiveDate, value: Decimal) -> Self {
        TrendPoint { date, value }
    }
}

/// Profit locked in by a single closing trade, recorded against the trade's
/// timestamp. Every event is retained for reporting; the running total lives
/// on the ledger.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RealizedEvent {
    pub timestamp: NaiveDateTime,
    #[serde(with = "decimal_serde")]
    pub amount: Decimal,
}

/// The position history of one symbol, produced by [`LedgerCalculator`] and
/// read-only for every downstream consumer.
///
/// `quantity` is signed (positive long, negative short); `investment` is the
/// non-negative magnitude of capital at risk. `average_cost` is derived from
/// the two and the three are only ever updated together. A `None` price or
/// unrealized profit means the metric is unavailable, which callers must
/// treat as distinct from zero.
///
/// [`LedgerCalculator`]: super::LedgerCalculator
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PositionLedger {
    pub symbol: String,
    pub state: PositionState,
    #[serde(with = "decimal_serde")]
    pub quantity: Decimal,
    #[serde(with = "decimal_serde")]
    pub investment: Decimal,
    #[serde(with = "decimal_serde")]
    pub average_cost: Decimal,
    #[serde(with = "decimal_serde_option")]
    pub current_price: Option<Decimal>,
    #[serde(with = "decimal_serde_option")]
    pub unrealized_profit: Option<Decimal>,

    /// Canonical adjusted trade list, sorted by timestamp. Consumers that
    /// need to mutate quantities (lot matching) must take their own copy.
    pub trades: Vec<Trade>,

    pub quantity_trend: Vec<TrendPoint>,
    pub investment_trend: Vec<TrendPoint>,
    pub realized_profit_history: Vec<RealizedEvent>,
    #[serde(with = "decimal_serde")]
    pub realized_profit: Decimal,
}
