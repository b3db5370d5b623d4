use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::trades::TradeKind;
use crate::utils::decimal_serde::{decimal_serde, decimal_serde_option};

/// Capital-gains class of an open lot, split at the 365-day holding
/// threshold.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum TaxClass {
    LongTerm,
    ShortTerm,
}

/// The residual quantity of one trade not yet offset by an opposite trade,
/// classified as of the evaluation instant.
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct OpenLot {
    pub order_id: String,
    pub kind: TradeKind,
    pub opened_at: NaiveDateTime,
    #[serde(with = "decimal_serde")]
    pub quantity: Decimal,
    #[serde(with = "decimal_serde")]
    pub price: Decimal,
    pub tax_class: TaxClass,
}

/// Open lots plus running unrealized gain per tax class. The gains are
/// unavailable (not zero) when the symbol has no current price.
#[derive(Serialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct TaxLotReport {
    pub open_lots: Vec<OpenLot>,
    #[serde(with = "decimal_serde_option")]
    pub long_term_gain: Option<Decimal>,
    #[serde(with = "decimal_serde_option")]
    pub short_term_gain: Option<Decimal>,
}

impl TaxLotReport {
    /// Signed sum of open-lot quantities; equals the ledger's net quantity.
    pub fn net_open_quantity(&self) -> Decimal {
        self.open_lots.iter().fold(Decimal::ZERO, |acc, lot| {
            if lot.kind.is_buy_side() {
                acc + lot.quantity
            } else {
                acc - lot.quantity
            }
        })
    }
}
