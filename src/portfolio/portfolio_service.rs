use std::collections::HashMap;
use std::io::Read;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;

use chrono::{NaiveDate, NaiveTime};
use csv::ReaderBuilder;
use log::{debug, error, warn};
use rayon::prelude::*;

use crate::adjustments::CorporateActionNormalizer;
use crate::benchmarks::{BenchmarkReturnEngine, BenchmarkRow, BenchmarkSeries};
use crate::dividends::{DividendAllocator, DividendIncome};
use crate::ledger::LedgerCalculator;
use crate::reference::ReferenceStore;
use crate::taxlots::TaxLotMatcher;
use crate::trades::Trade;

use super::portfolio_errors::Result;
use super::portfolio_model::{ActualHolding, HoldingLedger};

/// Orchestrates the full trade-to-position pipeline: corporate-action
/// normalization (cached by evaluation date), then the per-symbol ledger,
/// tax-lot, dividend and benchmark computations.
///
/// Symbols are computed independently and in parallel; a failure in one
/// symbol is logged and drops that symbol only, never the batch.
#[derive(Default, Debug, Clone)]
pub struct PortfolioService {
    normalizer: CorporateActionNormalizer,
    calculator: LedgerCalculator,
    matcher: TaxLotMatcher,
    allocator: DividendAllocator,
    engine: BenchmarkReturnEngine,
}

impl PortfolioService {
    pub fn new() -> Self {
        PortfolioService::default()
    }

    /// Runs the whole pipeline for one evaluation date.
    pub fn compute(
        &self,
        tradebook: &[Trade],
        store: &ReferenceStore,
        series: &BenchmarkSeries,
        metadata_dir: &Path,
        as_of: NaiveDate,
    ) -> crate::Result<Vec<HoldingLedger>> {
        let adjusted = self
            .normalizer
            .adjusted_tradebook(tradebook, store, metadata_dir, as_of)?;
        Ok(self.generate_holdings(&adjusted, store, series, as_of))
    }

    /// Groups an adjusted trade stream by symbol and derives each symbol's
    /// holding ledger. Output is sorted by symbol for stable presentation.
    pub fn generate_holdings(
        &self,
        adjusted: &[Trade],
        store: &ReferenceStore,
        series: &BenchmarkSeries,
        as_of: NaiveDate,
    ) -> Vec<HoldingLedger> {
        let mut by_symbol: HashMap<String, Vec<Trade>> = HashMap::new();
        for trade in adjusted {
            by_symbol
                .entry(trade.symbol.clone())
                .or_default()
                .push(trade.clone());
        }
        debug!("Generating holdings for {} symbols", by_symbol.len());

        let mut holdings: Vec<HoldingLedger> = by_symbol
            .into_par_iter()
            .filter_map(|(symbol, trades)| {
                self.compute_symbol(&symbol, trades, store, series, as_of)
            })
            .collect();
        holdings.sort_by(|a, b| a.symbol().cmp(b.symbol()));
        holdings
    }

    fn compute_symbol(
        &self,
        symbol: &str,
        trades: Vec<Trade>,
        store: &ReferenceStore,
        series: &BenchmarkSeries,
        as_of: NaiveDate,
    ) -> Option<HoldingLedger> {
        let outcome = catch_unwind(AssertUnwindSafe(|| {
            let profile = store.get(symbol).cloned();
            let current_price = profile.as_ref().and_then(|p| p.previous_close);

            let position = self.calculator.calculate(symbol, trades, current_price);
            let tax_lots = self.matcher.match_open_lots(
                &position.trades,
                current_price,
                as_of.and_time(NaiveTime::MIN),
            );
            let dividends = match profile.as_ref() {
                Some(p) => self.allocator.allocate(&p.dividends, &position.quantity_trend),
                None => DividendIncome::default(),
            };
            let benchmark_returns = self.engine.compute(&position.investment_trend, series);

            HoldingLedger {
                position,
                tax_lots,
                dividends,
                benchmark_returns,
                profile,
            }
        }));

        match outcome {
            Ok(holding) => Some(holding),
            Err(_) => {
                error!("Holding computation for {} failed; dropping the symbol", symbol);
                None
            }
        }
    }

    /// Partitions computed holdings into the two views the presentation
    /// layer shows: currently held (non-zero quantity) and past (anything
    /// with realized history). A symbol can appear in both.
    pub fn split_holdings<'a>(
        &self,
        holdings: &'a [HoldingLedger],
    ) -> (Vec<&'a HoldingLedger>, Vec<&'a HoldingLedger>) {
        let current = holdings
            .iter()
            .filter(|h| !h.position.quantity.is_zero())
            .collect();
        let past = holdings
            .iter()
            .filter(|h| !h.position.realized_profit_history.is_empty())
            .collect();
        (current, past)
    }
}

/// Parses a broker holdings snapshot from any reader. Malformed rows are
/// skipped with a warning; the rest of the snapshot still loads.
pub fn read_actual_holdings<R: Read>(reader: R) -> Result<Vec<ActualHolding>> {
    let mut csv_reader = ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut rows = Vec::new();
    for record in csv_reader.deserialize() {
        match record {
            Ok(row) => rows.push(row),
            Err(err) => warn!("Skipping holdings snapshot row: {}", err),
        }
    }
    Ok(rows)
}

/// Loads the broker holdings snapshot used to reconcile the computed
/// ledgers.
pub fn load_actual_holdings(path: &Path) -> Result<Vec<ActualHolding>> {
    let file = std::fs::File::open(path)?;
    read_actual_holdings(file)
}

/// Parses a benchmark levels CSV (`date,nifty50,bsesensex,niftybank`) from
/// any reader. Malformed rows are skipped with a warning; the surviving rows
/// still form a usable series.
pub fn read_benchmark_series<R: Read>(reader: R, file_label: &str) -> Result<BenchmarkSeries> {
    let mut csv_reader = ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut series = BenchmarkSeries::new();
    for record in csv_reader.deserialize::<BenchmarkRow>() {
        match record {
            Ok(row) => series.insert(row),
            Err(err) => warn!("Skipping benchmark row in {}: {}", file_label, err),
        }
    }
    Ok(series)
}

/// Loads the daily benchmark levels dataset.
pub fn load_benchmark_series(path: &Path) -> Result<BenchmarkSeries> {
    let file = std::fs::File::open(path)?;
    read_benchmark_series(file, &path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::PositionState;
    use crate::reference::{DividendEvent, SecurityProfile};
    use crate::trades::TradeKind;
    use chrono::NaiveDateTime;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn trade(symbol: &str, kind: TradeKind, qty: Decimal, price: Decimal, ts: &str) -> Trade {
        Trade {
            order_id: format!("{}-{}", symbol, ts),
            symbol: symbol.to_string(),
            quantity: qty,
            price,
            kind,
            timestamp: dt(ts),
            remark: String::new(),
        }
    }

    #[test]
    fn holdings_are_computed_per_symbol_and_sorted() {
        let trades = vec![
            trade("TCS", TradeKind::Buy, dec!(10), dec!(3000), "2023-01-02 10:00:00"),
            trade("INFY", TradeKind::Buy, dec!(20), dec!(1400), "2023-01-03 10:00:00"),
            trade("TCS", TradeKind::Sell, dec!(4), dec!(3200), "2023-02-01 10:00:00"),
        ];
        let mut store = ReferenceStore::new();
        let mut profile = SecurityProfile::new("TCS");
        profile.previous_close = Some(dec!(3300));
        store.insert(profile);

        let holdings = PortfolioService::new().generate_holdings(
            &trades,
            &store,
            &BenchmarkSeries::new(),
            date("2023-06-01"),
        );

        assert_eq!(holdings.len(), 2);
        assert_eq!(holdings[0].symbol(), "INFY");
        assert_eq!(holdings[1].symbol(), "TCS");

        let tcs = &holdings[1];
        assert_eq!(tcs.position.quantity, dec!(6));
        assert_eq!(tcs.position.realized_profit, dec!(800));
        assert_eq!(tcs.tax_lots.net_open_quantity(), dec!(6));

        // INFY has no profile: price-dependent metrics are unavailable.
        let infy = &holdings[0];
        assert_eq!(infy.position.unrealized_profit, None);
        assert_eq!(infy.tax_lots.long_term_gain, None);
        assert!(infy.dividends.history.is_empty());
    }

    #[test]
    fn dividends_flow_from_the_profile_into_the_holding() {
        let trades = vec![
            trade("TCS", TradeKind::Buy, dec!(50), dec!(3000), "2023-01-02 10:00:00"),
            trade("TCS", TradeKind::Buy, dec!(10), dec!(3100), "2023-06-01 10:00:00"),
        ];
        let mut store = ReferenceStore::new();
        let mut profile = SecurityProfile::new("TCS");
        profile.dividends = vec![DividendEvent {
            ex_date: date("2023-03-01"),
            amount: dec!(2.00),
        }];
        store.insert(profile);

        let holdings = PortfolioService::new().generate_holdings(
            &trades,
            &store,
            &BenchmarkSeries::new(),
            date("2023-07-01"),
        );

        assert_eq!(holdings[0].dividends.total, dec!(100.00));
    }

    #[test]
    fn split_holdings_partitions_current_and_past() {
        let trades = vec![
            trade("TCS", TradeKind::Buy, dec!(10), dec!(3000), "2023-01-02 10:00:00"),
            trade("INFY", TradeKind::Buy, dec!(5), dec!(1400), "2023-01-03 10:00:00"),
            trade("INFY", TradeKind::Sell, dec!(5), dec!(1500), "2023-02-01 10:00:00"),
        ];
        let service = PortfolioService::new();
        let holdings = service.generate_holdings(
            &trades,
            &ReferenceStore::new(),
            &BenchmarkSeries::new(),
            date("2023-06-01"),
        );

        let (current, past) = service.split_holdings(&holdings);

        assert_eq!(current.len(), 1);
        assert_eq!(current[0].symbol(), "TCS");
        assert_eq!(current[0].position.state, PositionState::Long);
        assert_eq!(past.len(), 1);
        assert_eq!(past[0].symbol(), "INFY");
        assert_eq!(past[0].position.state, PositionState::Flat);
    }

    #[test]
    fn actual_holdings_snapshot_parses_broker_columns() {
        let csv = "\
Instrument,Qty.,Avg. cost
TCS,10,3210.55
INFY,25,1388.10
";
        let rows = read_actual_holdings(csv.as_bytes()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].symbol, "TCS");
        assert_eq!(rows[0].quantity, dec!(10));
        assert_eq!(rows[1].average_cost, dec!(1388.10));
    }

    #[test]
    fn malformed_snapshot_rows_are_skipped_not_fatal() {
        let csv = "\
Instrument,Qty.,Avg. cost
TCS,10,3210.55
INFY,25
WIPRO,not-a-number,400.00
HDFC,5,1650.00
";
        let rows = read_actual_holdings(csv.as_bytes()).unwrap();

        // The short row and the unparseable quantity each drop one row.
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].symbol, "TCS");
        assert_eq!(rows[1].symbol, "HDFC");
    }

    #[test]
    fn benchmark_series_loader_skips_malformed_rows() {
        let csv = "\
date,nifty50,bsesensex,niftybank
2023-01-02,18000,60000,42000
not-a-date,18100,60100,42100
2023-01-03,18200,60200,42200
";
        let series = read_benchmark_series(csv.as_bytes(), "index.csv").unwrap();

        assert_eq!(series.len(), 2);
        assert_eq!(series.first_date(), Some(date("2023-01-02")));
        assert_eq!(series.last_date(), Some(date("2023-01-03")));
    }
}
