use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use log::{debug, warn};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::constants::{ADJUSTED_TRADEBOOK_PREFIX, BONUS_REMARK};
use crate::reference::ReferenceStore;
use crate::trades::{Trade, TradeKind};

use super::adjustments_errors::{AdjustmentError, Result};

/// Timestamp format used inside the cache artifact.
const CACHE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Converts a raw tradebook plus split/bonus calendars into a single
/// chronologically ordered adjusted trade stream.
///
/// Buys and sells pass through verbatim; wherever a positive quantity was
/// held at a corporate action's effective date, a synthetic zero-price
/// `bonus` trade for the entitlement is inserted. The adjusted stream is
/// cached on disk keyed by the evaluation date, so re-running within the same
/// date reuses the earlier output byte for byte.
#[derive(Default, Debug, Clone)]
pub struct CorporateActionNormalizer {}

impl CorporateActionNormalizer {
    pub fn new() -> Self {
        CorporateActionNormalizer {}
    }

    /// Cache-aware entry point: returns the cached adjusted stream for
    /// `as_of` when one exists, otherwise normalizes and writes the cache.
    pub fn adjusted_tradebook(
        &self,
        trades: &[Trade],
        store: &ReferenceStore,
        metadata_dir: &Path,
        as_of: NaiveDate,
    ) -> Result<Vec<Trade>> {
        let cache = cache_path(metadata_dir, as_of);
        if cache.exists() {
            match read_cache(&cache) {
                Ok(cached) => {
                    debug!("Reusing adjusted tradebook cache {}", cache.display());
                    return Ok(cached);
                }
                Err(err) => {
                    warn!(
                        "Adjusted tradebook cache {} is unreadable ({}); recomputing",
                        cache.display(),
                        err
                    );
                }
            }
        }

        let adjusted = self.normalize(trades, store);
        std::fs::create_dir_all(metadata_dir)?;
        write_cache(&cache, &adjusted)?;
        Ok(adjusted)
    }

    /// Pure normalization pass, no cache involved.
    pub fn normalize(&self, trades: &[Trade], store: &ReferenceStore) -> Vec<Trade> {
        let mut working: Vec<Trade> = trades.to_vec();

        // Zero-quantity markers carry the split ratio in the price field;
        // they are consumed by the walk below and never reach the output.
        for profile in store.profiles() {
            for split in &profile.splits {
                if !split.ratio.is_sign_positive() || split.ratio.is_zero() {
                    warn!(
                        "Skipping split with non-positive ratio {} for {}",
                        split.ratio, profile.symbol
                    );
                    continue;
                }
                working.push(Trade {
                    order_id: Uuid::new_v4().to_string(),
                    symbol: profile.symbol.clone(),
                    quantity: Decimal::ZERO,
                    price: split.ratio,
                    kind: TradeKind::Bonus,
                    timestamp: NaiveDateTime::new(split.effective_date, NaiveTime::MIN),
                    remark: String::new(),
                });
            }
        }

        working.sort_by_key(|t| t.timestamp);

        let mut open_quantity: HashMap<String, Decimal> = HashMap::new();
        let mut adjusted = Vec::with_capacity(working.len());

        for trade in working {
            let held = open_quantity.entry(trade.symbol.clone()).or_insert(Decimal::ZERO);
            match trade.kind {
                TradeKind::Buy => {
                    *held += trade.quantity;
                    adjusted.push(trade);
                }
                TradeKind::Sell => {
                    *held -= trade.quantity;
                    adjusted.push(trade);
                }
                TradeKind::Bonus => {
                    if !held.is_sign_positive() || held.is_zero() {
                        // No entitlement on a flat or short position.
                        continue;
                    }
                    // Whole-share unit convention: a fractional entitlement
                    // never creates a fractional share.
                    let bonus_quantity = (*held * (trade.price - Decimal::ONE)).floor();
                    if bonus_quantity.is_zero() || bonus_quantity.is_sign_negative() {
                        continue;
                    }
                    *held += bonus_quantity;
                    adjusted.push(Trade {
                        order_id: Uuid::new_v4().to_string(),
                        symbol: trade.symbol,
                        quantity: bonus_quantity,
                        price: Decimal::ZERO,
                        kind: TradeKind::Bonus,
                        timestamp: trade.timestamp,
                        remark: BONUS_REMARK.to_string(),
                    });
                }
            }
        }

        adjusted
    }
}

fn cache_path(metadata_dir: &Path, as_of: NaiveDate) -> PathBuf {
    metadata_dir.join(format!(
        "{}_{}.csv",
        ADJUSTED_TRADEBOOK_PREFIX,
        as_of.format("%Y-%m-%d")
    ))
}

fn read_cache(path: &Path) -> Result<Vec<Trade>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut trades = Vec::new();

    for record in reader.records() {
        let record = record?;
        let line = record.position().map_or(0, |p| p.line());
        let malformed = |reason: &str| AdjustmentError::MalformedCacheRow {
            line,
            reason: reason.to_string(),
        };

        let field = |idx: usize| record.get(idx).ok_or_else(|| malformed("missing column"));

        let quantity =
            Decimal::from_str(field(2)?).map_err(|_| malformed("unparseable quantity"))?;
        let price = Decimal::from_str(field(3)?).map_err(|_| malformed("unparseable price"))?;
        let kind =
            TradeKind::from_str(field(4)?).map_err(|_| malformed("unknown trade kind"))?;
        let timestamp = NaiveDateTime::parse_from_str(field(5)?, CACHE_TIMESTAMP_FORMAT)
            .map_err(|_| malformed("unparseable timestamp"))?;

        trades.push(Trade {
            order_id: field(0)?.to_string(),
            symbol: field(1)?.to_string(),
            quantity,
            price,
            kind,
            timestamp,
            remark: record.get(6).unwrap_or_default().to_string(),
        });
    }
    Ok(trades)
}

fn write_cache(path: &Path, trades: &[Trade]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record([
        "order_id",
        "symbol",
        "quantity",
        "price",
        "kind",
        "timestamp",
        "remark",
    ])?;
    for trade in trades {
        writer.write_record([
            trade.order_id.as_str(),
            trade.symbol.as_str(),
            &trade.quantity.to_string(),
            &trade.price.to_string(),
            trade.kind.as_str(),
            &trade.timestamp.format(CACHE_TIMESTAMP_FORMAT).to_string(),
            trade.remark.as_str(),
        ])?;
    }
    writer.flush().map_err(AdjustmentError::Io)?;
    debug!("Wrote adjusted tradebook cache {}", path.display());
    Ok(())
}
