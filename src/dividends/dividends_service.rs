use rust_decimal::Decimal;

use crate::ledger::TrendPoint;
use crate::reference::DividendEvent;

use super::dividends_model::DividendIncome;

/// Joins a symbol's dividend events against its quantity trend to work out
/// how much each ex-date actually paid.
#[derive(Default, Debug, Clone)]
pub struct DividendAllocator {}

impl DividendAllocator {
    pub fn new() -> Self {
        DividendAllocator {}
    }

    /// Two-pointer walk over the (ascending) dividend events and the
    /// date-ordered quantity trend.
    ///
    /// The trend pointer advances while the dividend's ex-date is strictly
    /// after the trend entry, so a dividend is always attributed with the
    /// quantity at the *previous* entry: the holding in force through the
    /// ex-date. Dividends that fall before the first trade are skipped, and
    /// the walk ends once the trend is exhausted.
    pub fn allocate(
        &self,
        dividends: &[DividendEvent],
        quantity_trend: &[TrendPoint],
    ) -> DividendIncome {
        let mut ordered: Vec<&DividendEvent> = dividends.iter().collect();
        ordered.sort_by_key(|d| d.ex_date);

        let mut history = Vec::new();
        let mut total = Decimal::ZERO;
        let (mut dividend_ptr, mut trend_ptr) = (0usize, 0usize);

        while trend_ptr < quantity_trend.len() && dividend_ptr < ordered.len() {
            let dividend = ordered[dividend_ptr];
            if dividend.ex_date > quantity_trend[trend_ptr].date {
                trend_ptr += 1;
            } else if trend_ptr > 0 {
                let held = quantity_trend[trend_ptr - 1].value;
                let payout = held * dividend.amount;
                history.push(TrendPoint::new(dividend.ex_date, payout));
                total += payout;
                dividend_ptr += 1;
            } else {
                // Ex-date precedes the first trade; nothing was held.
                dividend_ptr += 1;
            }
        }

        DividendIncome { history, total }
    }
}
