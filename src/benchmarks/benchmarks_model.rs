use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ledger::TrendPoint;
use crate::utils::decimal_serde::decimal_serde;

/// One daily row of the benchmark dataset: closing levels of the three
/// tracked market indices.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkRow {
    pub date: NaiveDate,
    #[serde(with = "decimal_serde")]
    pub nifty50: Decimal,
    #[serde(with = "decimal_serde")]
    pub bsesensex: Decimal,
    #[serde(with = "decimal_serde")]
    pub niftybank: Decimal,
}

/// Index levels for a single trading date.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexLevels {
    pub nifty50: Decimal,
    pub bsesensex: Decimal,
    pub niftybank: Decimal,
}

/// Date-keyed benchmark levels. Gaps are expected (weekends, market
/// holidays, feed outages); lookups resolve to the nearest earlier trading
/// date instead of assuming a dense calendar.
#[derive(Debug, Clone, Default)]
pub struct BenchmarkSeries {
    levels: BTreeMap<NaiveDate, IndexLevels>,
}

impl BenchmarkSeries {
    pub fn new() -> Self {
        BenchmarkSeries::default()
    }

    pub fn from_rows(rows: impl IntoIterator<Item = BenchmarkRow>) -> Self {
        let mut series = BenchmarkSeries::new();
        for row in rows {
            series.insert(row);
        }
        series
    }

    pub fn insert(&mut self, row: BenchmarkRow) {
        self.levels.insert(
            row.date,
            IndexLevels {
                nifty50: row.nifty50,
                bsesensex: row.bsesensex,
                niftybank: row.niftybank,
            },
        );
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.levels.keys().next().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.levels.keys().next_back().copied()
    }

    pub fn levels_on(&self, date: NaiveDate) -> Option<&IndexLevels> {
        self.levels.get(&date)
    }

    /// Walks backward from `date`, one day at a time and skipping Saturdays
    /// and Sundays, until it hits a date present in the series. The walk is
    /// bounded by the earliest covered date, so a sparse or empty dataset
    /// yields `None` instead of looping.
    pub fn nearest_trading_date_at_or_before(&self, date: NaiveDate) -> Option<NaiveDate> {
        let earliest = self.first_date()?;
        let mut cursor = date;
        loop {
            if self.levels.contains_key(&cursor) {
                return Some(cursor);
            }
            if cursor <= earliest {
                return None;
            }
            cursor = cursor - Duration::days(1);
            while matches!(cursor.weekday(), Weekday::Sat | Weekday::Sun) {
                cursor = cursor - Duration::days(1);
            }
        }
    }
}

/// Per-symbol benchmark comparison: what the capital deployed in this symbol
/// would have returned in each index, plus a synthetic risk-free leg. Every
/// trend starts with a zero entry at the first investment date.
#[derive(Serialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkReturns {
    pub risk_free: Vec<TrendPoint>,
    pub nifty50: Vec<TrendPoint>,
    pub bsesensex: Vec<TrendPoint>,
    pub niftybank: Vec<TrendPoint>,
}

impl BenchmarkReturns {
    pub fn seeded(date: NaiveDate) -> Self {
        let zero = TrendPoint::new(date, Decimal::ZERO);
        BenchmarkReturns {
            risk_free: vec![zero.clone()],
            nifty50: vec![zero.clone()],
            bsesensex: vec![zero.clone()],
            niftybank: vec![zero],
        }
    }
}
