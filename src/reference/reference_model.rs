use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::utils::decimal_serde::{decimal_serde, decimal_serde_option};

/// A split or bonus issue: holders receive `ratio` shares for every share
/// held at the effective date.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SplitEvent {
    pub effective_date: NaiveDate,
    #[serde(with = "decimal_serde")]
    pub ratio: Decimal,
}

/// A cash dividend: `amount` per share to holders as of `ex_date`.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DividendEvent {
    pub ex_date: NaiveDate,
    #[serde(with = "decimal_serde")]
    pub amount: Decimal,
}

/// Reference data for one security, as supplied by an external market-data
/// feed. Every field beyond the symbol may legitimately be missing; the
/// pipeline degrades to "unavailable" metrics rather than defaulting to zero.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct SecurityProfile {
    pub symbol: String,
    pub name: String,
    pub sector: String,
    pub industry: String,
    #[serde(with = "decimal_serde_option")]
    pub market_cap: Option<Decimal>,
    #[serde(with = "decimal_serde_option")]
    pub previous_close: Option<Decimal>,
    #[serde(with = "decimal_serde_option")]
    pub fifty_two_week_high: Option<Decimal>,
    #[serde(with = "decimal_serde_option")]
    pub fifty_two_week_low: Option<Decimal>,
    pub splits: Vec<SplitEvent>,
    pub dividends: Vec<DividendEvent>,
}

impl SecurityProfile {
    pub fn new(symbol: impl Into<String>) -> Self {
        SecurityProfile {
            symbol: symbol.into(),
            ..Default::default()
        }
    }
}

/// Read-only collection of security profiles keyed by symbol. Shared across
/// symbols during a computation run; absence of a profile means the affected
/// metrics become unavailable and the symbol's corporate-action and dividend
/// inputs are empty.
#[derive(Debug, Clone, Default)]
pub struct ReferenceStore {
    profiles: HashMap<String, SecurityProfile>,
}

impl ReferenceStore {
    pub fn new() -> Self {
        ReferenceStore::default()
    }

    pub fn insert(&mut self, profile: SecurityProfile) {
        self.profiles.insert(profile.symbol.clone(), profile);
    }

    pub fn get(&self, symbol: &str) -> Option<&SecurityProfile> {
        self.profiles.get(symbol)
    }

    pub fn profiles(&self) -> impl Iterator<Item = &SecurityProfile> {
        self.profiles.values()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}
