use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::utils::decimal_serde::decimal_serde;

pub const TRADE_KIND_BUY: &str = "buy";
pub const TRADE_KIND_SELL: &str = "sell";
pub const TRADE_KIND_BONUS: &str = "bonus";

/// Direction of a tradebook entry. `Bonus` entries are synthetic: they add
/// shares without a cash leg and are produced by the corporate-action
/// normalizer, never by a broker export.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TradeKind {
    Buy,
    Sell,
    Bonus,
}

impl TradeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeKind::Buy => TRADE_KIND_BUY,
            TradeKind::Sell => TRADE_KIND_SELL,
            TradeKind::Bonus => TRADE_KIND_BONUS,
        }
    }

    /// Buys and bonus issues add shares; sells remove them.
    pub fn is_buy_side(&self) -> bool {
        matches!(self, TradeKind::Buy | TradeKind::Bonus)
    }
}

impl FromStr for TradeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            s if s == TRADE_KIND_BUY => Ok(TradeKind::Buy),
            s if s == TRADE_KIND_SELL => Ok(TradeKind::Sell),
            s if s == TRADE_KIND_BONUS => Ok(TradeKind::Bonus),
            _ => Err(format!("Unknown trade kind: {}", s)),
        }
    }
}

/// A single tradebook entry. Created once by ingestion and treated as
/// read-only everywhere downstream; the quantity is always positive with the
/// direction carried by `kind`.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub order_id: String,
    pub symbol: String,
    #[serde(with = "decimal_serde")]
    pub quantity: Decimal,
    #[serde(with = "decimal_serde")]
    pub price: Decimal,
    pub kind: TradeKind,
    pub timestamp: NaiveDateTime,
    pub remark: String,
}

/// A tradebook row that failed validation. The rest of the batch still
/// processes; rejected rows are surfaced to the caller with their reason.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RejectedRecord {
    pub file: String,
    pub line: u64,
    pub reason: String,
}
