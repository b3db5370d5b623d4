use rust_decimal::Decimal;
use serde::Serialize;

use crate::ledger::TrendPoint;
use crate::utils::decimal_serde::decimal_serde;

/// Dividend revenue attributed to one symbol: one history entry per captured
/// ex-date (`qty held × amount per share`) plus the running total.
#[derive(Serialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct DividendIncome {
    pub history: Vec<TrendPoint>,
    #[serde(with = "decimal_serde")]
    pub total: Decimal,
}
