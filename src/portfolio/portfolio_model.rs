use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::benchmarks::BenchmarkReturns;
use crate::dividends::DividendIncome;
use crate::ledger::PositionLedger;
use crate::reference::SecurityProfile;
use crate::taxlots::TaxLotReport;
use crate::utils::decimal_serde::decimal_serde;

/// Everything the pipeline derives for one symbol: the position ledger, its
/// open tax lots, attributed dividend income, benchmark comparisons, and the
/// reference profile when the market-data feed had one.
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct HoldingLedger {
    pub position: PositionLedger,
    pub tax_lots: TaxLotReport,
    pub dividends: DividendIncome,
    pub benchmark_returns: BenchmarkReturns,
    pub profile: Option<SecurityProfile>,
}

impl HoldingLedger {
    pub fn symbol(&self) -> &str {
        &self.position.symbol
    }
}

/// One row of the broker's holdings snapshot, loaded for reconciliation
/// against the computed ledgers. Column names follow the broker export.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ActualHolding {
    #[serde(rename = "Instrument")]
    pub symbol: String,
    #[serde(rename = "Qty.", with = "decimal_serde")]
    pub quantity: Decimal,
    #[serde(rename = "Avg. cost", with = "decimal_serde")]
    pub average_cost: Decimal,
}
