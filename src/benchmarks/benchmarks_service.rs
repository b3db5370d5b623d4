use chrono::NaiveDate;
use log::warn;
use rust_decimal::Decimal;

use crate::constants::{DAYS_PER_YEAR, RISK_FREE_ANNUAL_RATE};
use crate::ledger::TrendPoint;

use super::benchmarks_model::{BenchmarkReturns, BenchmarkSeries};

/// Computes the per-interval index and risk-free returns a symbol's deployed
/// capital would have earned, interval by interval along the investment
/// trend.
#[derive(Default, Debug, Clone)]
pub struct BenchmarkReturnEngine {}

impl BenchmarkReturnEngine {
    pub fn new() -> Self {
        BenchmarkReturnEngine {}
    }

    /// Walks consecutive investment-trend entries `(d0, v0) -> (d1, v1)` and
    /// appends, at `d1`, the return `v0` would have earned over the interval
    /// in each index: `(level(d1) - level(lookback(d0))) * v0`, where the
    /// lookback resolves `d0` to the nearest covered trading date at or
    /// before it. The risk-free leg accrues `v0 * days * rate / 365` over
    /// the same interval.
    ///
    /// A final interval runs from the last trend entry to the newest date in
    /// the series. Intervals whose lookups cannot resolve are skipped with a
    /// warning; whatever resolved remains usable.
    pub fn compute(
        &self,
        investment_trend: &[TrendPoint],
        series: &BenchmarkSeries,
    ) -> BenchmarkReturns {
        let first = match investment_trend.first() {
            Some(point) => point,
            None => return BenchmarkReturns::default(),
        };
        let rate: Decimal = RISK_FREE_ANNUAL_RATE
            .parse()
            .unwrap_or_else(|_| Decimal::new(75, 3));

        let mut returns = BenchmarkReturns::seeded(first.date);
        for pair in investment_trend.windows(2) {
            self.append_interval(&mut returns, series, pair[0].date, pair[1].date, pair[0].value, rate);
        }

        // Terminal interval: from the last trade to the end of the dataset.
        if let (Some(last_point), Some(last_available)) =
            (investment_trend.last(), series.last_date())
        {
            if last_available >= last_point.date {
                self.append_interval(
                    &mut returns,
                    series,
                    last_point.date,
                    last_available,
                    last_point.value,
                    rate,
                );
            } else {
                warn!(
                    "benchmark series ends {} before the last trade on {}; skipping terminal interval",
                    last_available, last_point.date
                );
            }
        }

        returns
    }

    fn append_interval(
        &self,
        returns: &mut BenchmarkReturns,
        series: &BenchmarkSeries,
        from: NaiveDate,
        to: NaiveDate,
        capital: Decimal,
        rate: Decimal,
    ) {
        let current = match series.levels_on(to) {
            Some(levels) => levels,
            None => {
                warn!("missing benchmark levels for {}; skipping interval", to);
                return;
            }
        };
        let baseline = match series
            .nearest_trading_date_at_or_before(from)
            .and_then(|date| series.levels_on(date))
        {
            Some(levels) => levels,
            None => {
                warn!(
                    "no benchmark coverage at or before {}; skipping interval",
                    from
                );
                return;
            }
        };

        let days = Decimal::from((to - from).num_days());
        returns.risk_free.push(TrendPoint::new(
            to,
            capital * days * rate / Decimal::from(DAYS_PER_YEAR),
        ));
        returns
            .nifty50
            .push(TrendPoint::new(to, (current.nifty50 - baseline.nifty50) * capital));
        returns.bsesensex.push(TrendPoint::new(
            to,
            (current.bsesensex - baseline.bsesensex) * capital,
        ));
        returns.niftybank.push(TrendPoint::new(
            to,
            (current.niftybank - baseline.niftybank) * capital,
        ));
    }
}
