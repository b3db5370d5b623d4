use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use csv::ReaderBuilder;
use log::{debug, warn};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use super::trades_errors::{Result, TradeError};
use super::trades_model::{RejectedRecord, Trade, TradeKind};

/// Timestamp format of broker order-execution times.
const BROKER_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
/// Date format of manually entered trades.
const MANUAL_DATE_FORMAT: &str = "%Y-%m-%d";

/// Result of loading one or more tradebook files: the accepted trades plus
/// every rejected row with its reason (reject-and-continue).
#[derive(Debug, Default)]
pub struct TradebookLoad {
    pub trades: Vec<Trade>,
    pub rejected: Vec<RejectedRecord>,
}

impl TradebookLoad {
    fn merge(&mut self, other: TradebookLoad) {
        self.trades.extend(other.trades);
        self.rejected.extend(other.rejected);
    }
}

#[derive(Debug, Deserialize)]
struct BrokerRow {
    order_id: String,
    symbol: String,
    quantity: String,
    price: String,
    trade_type: String,
    order_execution_time: String,
}

#[derive(Debug, Deserialize)]
struct ManualRow {
    symbol: String,
    quantity: String,
    price: String,
    trade_date: String,
    #[serde(default)]
    remarks: String,
}

/// Strips the exchange series suffix from a symbol, e.g. `TCS-EQ` -> `TCS`.
fn normalize_symbol(raw: &str) -> String {
    raw.split('-').next().unwrap_or(raw).trim().to_string()
}

fn parse_quantity(raw: &str) -> Result<Decimal> {
    let quantity =
        Decimal::from_str(raw.trim()).map_err(|_| TradeError::InvalidQuantity(raw.to_string()))?;
    if quantity.is_zero() {
        return Err(TradeError::InvalidQuantity(raw.to_string()));
    }
    Ok(quantity)
}

fn parse_price(raw: &str) -> Result<Decimal> {
    let price =
        Decimal::from_str(raw.trim()).map_err(|_| TradeError::InvalidPrice(raw.to_string()))?;
    if price.is_sign_negative() {
        return Err(TradeError::InvalidPrice(raw.to_string()));
    }
    Ok(price)
}

fn parse_broker_row(row: &BrokerRow) -> Result<Trade> {
    let timestamp = NaiveDateTime::parse_from_str(&row.order_execution_time, BROKER_TIMESTAMP_FORMAT)
        .map_err(|_| TradeError::InvalidTimestamp(row.order_execution_time.clone()))?;
    let kind = TradeKind::from_str(row.trade_type.trim()).map_err(TradeError::UnknownKind)?;
    let quantity = parse_quantity(&row.quantity)?;
    if quantity.is_sign_negative() {
        return Err(TradeError::InvalidQuantity(row.quantity.clone()));
    }

    Ok(Trade {
        order_id: row.order_id.clone(),
        symbol: normalize_symbol(&row.symbol),
        quantity,
        price: parse_price(&row.price)?,
        kind,
        timestamp,
        remark: String::new(),
    })
}

fn parse_manual_row(row: &ManualRow) -> Result<Trade> {
    let date = NaiveDate::parse_from_str(row.trade_date.trim(), MANUAL_DATE_FORMAT)
        .map_err(|_| TradeError::InvalidTimestamp(row.trade_date.clone()))?;
    let quantity = parse_quantity(&row.quantity)?;

    // Manual entries carry the direction in the quantity's sign and default
    // to a midnight timestamp.
    Ok(Trade {
        order_id: Uuid::new_v4().to_string(),
        symbol: normalize_symbol(&row.symbol),
        quantity: quantity.abs(),
        price: parse_price(&row.price)?,
        kind: if quantity.is_sign_positive() {
            TradeKind::Buy
        } else {
            TradeKind::Sell
        },
        timestamp: NaiveDateTime::new(date, NaiveTime::MIN),
        remark: row.remarks.trim().to_string(),
    })
}

fn read_rows<R, Row, F>(reader: R, file_label: &str, parse: F) -> Result<TradebookLoad>
where
    R: Read,
    Row: for<'de> Deserialize<'de>,
    F: Fn(&Row) -> Result<Trade>,
{
    let mut csv_reader = ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let headers = csv_reader.headers()?.clone();

    let mut load = TradebookLoad::default();
    for record in csv_reader.records() {
        let record = match record {
            Ok(record) => record,
            Err(err) => {
                // Structurally broken row (e.g. wrong field count): reject
                // it like any other bad record, the reader resumes on the
                // next row.
                let line = err.position().map_or(0, |p| p.line());
                warn!("Rejecting {} line {}: {}", file_label, line, err);
                load.rejected.push(RejectedRecord {
                    file: file_label.to_string(),
                    line,
                    reason: err.to_string(),
                });
                continue;
            }
        };
        let line = record.position().map_or(0, |p| p.line());

        let row: Row = match record.deserialize(Some(&headers)) {
            Ok(row) => row,
            Err(err) => {
                warn!("Rejecting {} line {}: {}", file_label, line, err);
                load.rejected.push(RejectedRecord {
                    file: file_label.to_string(),
                    line,
                    reason: err.to_string(),
                });
                continue;
            }
        };

        match parse(&row) {
            Ok(trade) => load.trades.push(trade),
            Err(err) => {
                warn!("Rejecting {} line {}: {}", file_label, line, err);
                load.rejected.push(RejectedRecord {
                    file: file_label.to_string(),
                    line,
                    reason: err.to_string(),
                });
            }
        }
    }
    Ok(load)
}

/// Parses a broker tradebook export from any reader. Exposed for the
/// file-based loaders below.
pub fn read_broker_tradebook<R: Read>(reader: R, file_label: &str) -> Result<TradebookLoad> {
    read_rows(reader, file_label, parse_broker_row)
}

/// Parses a manual-trades file (IPO allotments, ESOPs, gifts and the like)
/// from any reader.
pub fn read_manual_trades<R: Read>(reader: R, file_label: &str) -> Result<TradebookLoad> {
    read_rows(reader, file_label, parse_manual_row)
}

/// Loads manually entered trades from a CSV file.
pub fn load_manual_trades(path: &Path) -> Result<TradebookLoad> {
    let file = std::fs::File::open(path)?;
    read_manual_trades(file, &path.display().to_string())
}

/// Loads the full tradebook: one broker export per fiscal year plus an
/// optional manual-trades file, merged and globally re-sorted by timestamp.
pub fn load_tradebook(broker_files: &[&Path], manual_trades: Option<&Path>) -> Result<TradebookLoad> {
    let mut load = TradebookLoad::default();

    for path in broker_files {
        let file = std::fs::File::open(path)?;
        load.merge(read_broker_tradebook(file, &path.display().to_string())?);
    }

    if let Some(path) = manual_trades {
        load.merge(load_manual_trades(path)?);
    }

    load.trades.sort_by_key(|t| t.timestamp);
    debug!(
        "Loaded {} trades ({} rejected) from {} broker file(s)",
        load.trades.len(),
        load.rejected.len(),
        broker_files.len()
    );
    Ok(load)
}
