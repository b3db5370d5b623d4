// Tests for the position-ledger state machine.

use crate::ledger::{LedgerCalculator, PositionState};
use crate::trades::{Trade, TradeKind};

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// Helper to create NaiveDateTime from string for tests
fn dt(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
}

fn trade(kind: TradeKind, qty: Decimal, price: Decimal, ts: &str) -> Trade {
    Trade {
        order_id: format!("T-{}", ts),
        symbol: "TCS".to_string(),
        quantity: qty,
        price,
        kind,
        timestamp: dt(ts),
        remark: String::new(),
    }
}

#[test]
fn single_buy_opens_long_position() {
    let trades = vec![trade(TradeKind::Buy, dec!(10), dec!(100), "2023-01-02 10:00:00")];
    let ledger = LedgerCalculator::new().calculate("TCS", trades, Some(dec!(120)));

    assert_eq!(ledger.state, PositionState::Long);
    assert_eq!(ledger.quantity, dec!(10));
    assert_eq!(ledger.investment, dec!(1000));
    assert_eq!(ledger.average_cost, dec!(100));
    assert_eq!(ledger.unrealized_profit, Some(dec!(200)));
    assert!(ledger.realized_profit_history.is_empty());
}

#[test]
fn buys_accumulate_quantity_and_investment() {
    let trades = vec![
        trade(TradeKind::Buy, dec!(10), dec!(100), "2023-01-02 10:00:00"),
        trade(TradeKind::Buy, dec!(10), dec!(200), "2023-01-03 10:00:00"),
    ];
    let ledger = LedgerCalculator::new().calculate("TCS", trades, None);

    assert_eq!(ledger.quantity, dec!(20));
    assert_eq!(ledger.investment, dec!(3000));
    assert_eq!(ledger.average_cost, dec!(150));
}

#[test]
fn partial_sell_realizes_profit_and_keeps_average_cost() {
    let trades = vec![
        trade(TradeKind::Buy, dec!(100), dec!(100), "2023-01-02 10:00:00"),
        trade(TradeKind::Sell, dec!(40), dec!(150), "2023-02-01 10:00:00"),
    ];
    let ledger = LedgerCalculator::new().calculate("TCS", trades, None);

    assert_eq!(ledger.quantity, dec!(60));
    // Proportional reduction: 60 shares still carried at cost 100.
    assert_eq!(ledger.average_cost, dec!(100));
    assert_eq!(ledger.investment, dec!(6000));
    assert_eq!(ledger.realized_profit, dec!(2000));
    assert_eq!(ledger.realized_profit_history.len(), 1);
    assert_eq!(
        ledger.realized_profit_history[0].timestamp,
        dt("2023-02-01 10:00:00")
    );
}

#[test]
fn full_sell_returns_to_flat_with_zero_investment() {
    let trades = vec![
        trade(TradeKind::Buy, dec!(100), dec!(100), "2023-01-02 10:00:00"),
        trade(TradeKind::Sell, dec!(100), dec!(150), "2023-02-01 10:00:00"),
    ];
    let ledger = LedgerCalculator::new().calculate("TCS", trades, None);

    assert_eq!(ledger.state, PositionState::Flat);
    assert_eq!(ledger.quantity, Decimal::ZERO);
    assert_eq!(ledger.investment, Decimal::ZERO);
    assert_eq!(ledger.average_cost, Decimal::ZERO);
    assert_eq!(ledger.realized_profit, dec!(5000));
    // No price feed: unrealized profit is unavailable, not zero.
    assert_eq!(ledger.unrealized_profit, None);
}

#[test]
fn oversized_sell_flips_long_to_short() {
    let trades = vec![
        trade(TradeKind::Buy, dec!(100), dec!(100), "2023-01-02 10:00:00"),
        trade(TradeKind::Sell, dec!(150), dec!(120), "2023-02-01 10:00:00"),
    ];
    let ledger = LedgerCalculator::new().calculate("TCS", trades, None);

    assert_eq!(ledger.state, PositionState::Short);
    assert_eq!(ledger.quantity, dec!(-50));
    // The remainder opens a fresh short at the trade price.
    assert_eq!(ledger.investment, dec!(6000));
    assert_eq!(ledger.average_cost, dec!(120));
    // Only the closed 100 shares realize profit.
    assert_eq!(ledger.realized_profit, dec!(2000));
}

#[test]
fn short_position_mirrors_long_accounting() {
    let trades = vec![
        trade(TradeKind::Sell, dec!(50), dec!(200), "2023-01-02 10:00:00"),
        trade(TradeKind::Buy, dec!(50), dec!(150), "2023-02-01 10:00:00"),
    ];
    let ledger = LedgerCalculator::new().calculate("TCS", trades, None);

    assert_eq!(ledger.state, PositionState::Flat);
    assert_eq!(ledger.quantity, Decimal::ZERO);
    // Short covered below entry: profit of 50 * (200 - 150).
    assert_eq!(ledger.realized_profit, dec!(2500));
}

#[test]
fn short_unrealized_profit_uses_quantity_magnitude() {
    let trades = vec![trade(TradeKind::Sell, dec!(50), dec!(200), "2023-01-02 10:00:00")];
    let ledger = LedgerCalculator::new().calculate("TCS", trades, Some(dec!(180)));

    assert_eq!(ledger.state, PositionState::Short);
    assert_eq!(ledger.unrealized_profit, Some(dec!(1000)));
}

#[test]
fn bonus_shares_halve_average_cost() {
    let trades = vec![
        trade(TradeKind::Buy, dec!(10), dec!(50), "2023-01-02 10:00:00"),
        trade(TradeKind::Bonus, dec!(10), dec!(0), "2023-01-05 00:00:00"),
    ];
    let ledger = LedgerCalculator::new().calculate("TCS", trades, None);

    assert_eq!(ledger.quantity, dec!(20));
    assert_eq!(ledger.investment, dec!(500));
    assert_eq!(ledger.average_cost, dec!(25));
}

#[test]
fn bonus_covering_a_short_realizes_against_average_cost() {
    let trades = vec![
        trade(TradeKind::Sell, dec!(10), dec!(80), "2023-01-02 10:00:00"),
        trade(TradeKind::Bonus, dec!(4), dec!(0), "2023-01-05 00:00:00"),
    ];
    let ledger = LedgerCalculator::new().calculate("TCS", trades, None);

    assert_eq!(ledger.quantity, dec!(-6));
    // Zero-price cover: realizes 4 * (80 - 0).
    assert_eq!(ledger.realized_profit, dec!(320));
}

#[test]
fn same_day_trades_collapse_into_one_trend_entry() {
    let trades = vec![
        trade(TradeKind::Buy, dec!(10), dec!(100), "2023-01-02 10:00:00"),
        trade(TradeKind::Buy, dec!(5), dec!(110), "2023-01-02 14:00:00"),
        trade(TradeKind::Sell, dec!(5), dec!(120), "2023-01-09 10:00:00"),
    ];
    let ledger = LedgerCalculator::new().calculate("TCS", trades, None);

    assert_eq!(ledger.quantity_trend.len(), 2);
    assert_eq!(ledger.quantity_trend[0].value, dec!(15));
    assert_eq!(ledger.quantity_trend[1].value, dec!(10));
    assert_eq!(ledger.investment_trend[0].value, dec!(1550));
}

#[test]
fn misordered_input_is_sorted_before_processing() {
    let trades = vec![
        trade(TradeKind::Sell, dec!(10), dec!(150), "2023-02-01 10:00:00"),
        trade(TradeKind::Buy, dec!(10), dec!(100), "2023-01-02 10:00:00"),
    ];
    let ledger = LedgerCalculator::new().calculate("TCS", trades, None);

    // Processed as buy-then-sell, not as an opening short.
    assert_eq!(ledger.state, PositionState::Flat);
    assert_eq!(ledger.realized_profit, dec!(500));
    assert_eq!(ledger.trades[0].kind, TradeKind::Buy);
}

#[test]
fn realized_plus_unrealized_reconciles_with_cash_flows() {
    let current_price = dec!(130);
    let trades = vec![
        trade(TradeKind::Buy, dec!(100), dec!(100), "2023-01-02 10:00:00"),
        trade(TradeKind::Sell, dec!(40), dec!(150), "2023-02-01 10:00:00"),
        trade(TradeKind::Buy, dec!(20), dec!(110), "2023-03-01 10:00:00"),
    ];
    let ledger = LedgerCalculator::new().calculate("TCS", trades.clone(), Some(current_price));

    // Paper total return: signed cash flows plus final market value.
    let mut cash = Decimal::ZERO;
    for t in &trades {
        match t.kind {
            TradeKind::Buy | TradeKind::Bonus => cash -= t.quantity * t.price,
            TradeKind::Sell => cash += t.quantity * t.price,
        }
    }
    let paper = cash + ledger.quantity * current_price;
    let total = ledger.realized_profit + ledger.unrealized_profit.unwrap();

    assert_eq!(total.round_dp(6), paper.round_dp(6));
}

#[test]
fn investment_trend_never_goes_negative() {
    let trades = vec![
        trade(TradeKind::Buy, dec!(10), dec!(100), "2023-01-02 10:00:00"),
        trade(TradeKind::Sell, dec!(25), dec!(90), "2023-01-10 10:00:00"),
        trade(TradeKind::Buy, dec!(40), dec!(95), "2023-01-20 10:00:00"),
        trade(TradeKind::Sell, dec!(25), dec!(105), "2023-02-05 10:00:00"),
    ];
    let ledger = LedgerCalculator::new().calculate("TCS", trades, None);

    assert!(ledger
        .investment_trend
        .iter()
        .all(|p| !p.value.is_sign_negative()));
    assert!(!ledger.investment.is_sign_negative());
}
