use chrono::NaiveDate;
use log::debug;
use rust_decimal::Decimal;

use crate::trades::{Trade, TradeKind};

use super::ledger_model::{PositionLedger, PositionState, RealizedEvent, TrendPoint};

/// Builds a [`PositionLedger`] from one symbol's adjusted trade stream.
///
/// The trades are processed in timestamp order (the calculator sorts its
/// input, so a misordered stream is a corrected precondition rather than an
/// error) and drive a finite-state machine over {Flat, Long, Short}.
#[derive(Default, Debug, Clone)]
pub struct LedgerCalculator {}

impl LedgerCalculator {
    pub fn new() -> Self {
        LedgerCalculator {}
    }

    /// Runs the state machine and finalizes the ledger. `current_price` is
    /// the symbol's latest market price if reference data exists; without it
    /// the unrealized profit is left unavailable rather than defaulted.
    pub fn calculate(
        &self,
        symbol: &str,
        mut trades: Vec<Trade>,
        current_price: Option<Decimal>,
    ) -> PositionLedger {
        trades.sort_by_key(|t| t.timestamp);
        debug!("Building ledger for {} from {} trades", symbol, trades.len());

        let mut state = LedgerState::new(symbol);
        for trade in &trades {
            state.apply(trade);
        }
        state.finalize(trades, current_price)
    }
}

/// Mutable working state of the calculator, one instance per symbol.
#[derive(Debug)]
struct LedgerState {
    symbol: String,
    state: PositionState,
    quantity: Decimal,
    investment: Decimal,
    average_cost: Decimal,
    quantity_trend: Vec<TrendPoint>,
    investment_trend: Vec<TrendPoint>,
    realized_profit_history: Vec<RealizedEvent>,
    realized_profit: Decimal,
}

impl LedgerState {
    fn new(symbol: &str) -> Self {
        LedgerState {
            symbol: symbol.to_string(),
            state: PositionState::Flat,
            quantity: Decimal::ZERO,
            investment: Decimal::ZERO,
            average_cost: Decimal::ZERO,
            quantity_trend: Vec::new(),
            investment_trend: Vec::new(),
            realized_profit_history: Vec::new(),
            realized_profit: Decimal::ZERO,
        }
    }

    /// One transition per (state, trade-kind) pair.
    fn apply(&mut self, trade: &Trade) {
        match (self.state, trade.kind) {
            (PositionState::Flat, TradeKind::Buy | TradeKind::Bonus) => {
                self.open(PositionState::Long, trade)
            }
            (PositionState::Flat, TradeKind::Sell) => self.open(PositionState::Short, trade),
            (PositionState::Long, TradeKind::Buy | TradeKind::Bonus) => self.extend(trade),
            (PositionState::Short, TradeKind::Sell) => self.extend(trade),
            (PositionState::Long, TradeKind::Sell) => self.close(trade),
            (PositionState::Short, TradeKind::Buy | TradeKind::Bonus) => self.close(trade),
        }
        self.record_trend(trade.timestamp.date());
    }

    fn open(&mut self, direction: PositionState, trade: &Trade) {
        let signed = if direction == PositionState::Long {
            trade.quantity
        } else {
            -trade.quantity
        };
        self.state = direction;
        self.set_position(signed, trade.quantity * trade.price);
    }

    fn extend(&mut self, trade: &Trade) {
        let signed = if self.state == PositionState::Long {
            trade.quantity
        } else {
            -trade.quantity
        };
        self.set_position(
            self.quantity + signed,
            self.investment + trade.quantity * trade.price,
        );
    }

    /// A trade against the open direction: realizes profit on the closed
    /// portion and, when it overshoots, flips the remainder into a fresh
    /// position opened at the trade's price.
    fn close(&mut self, trade: &Trade) {
        let held = self.quantity.abs();
        let closed = trade.quantity.min(held);
        let remainder = trade.quantity - closed;

        let profit = match self.state {
            PositionState::Long => closed * (trade.price - self.average_cost),
            PositionState::Short => closed * (self.average_cost - trade.price),
            // `close` is only dispatched from Long or Short.
            PositionState::Flat => Decimal::ZERO,
        };
        self.realized_profit_history.push(RealizedEvent {
            timestamp: trade.timestamp,
            amount: profit,
        });
        self.realized_profit += profit;

        if remainder.is_zero() {
            // Proportional reduction keeps the average cost invariant and
            // zeroes the investment on a full close.
            let signed = if self.state == PositionState::Long {
                self.quantity - closed
            } else {
                self.quantity + closed
            };
            let investment = if signed.is_zero() {
                Decimal::ZERO
            } else {
                // Clamped: the derived average cost can carry a rounding
                // epsilon at full Decimal scale.
                (self.investment - closed * self.average_cost).max(Decimal::ZERO)
            };
            self.state = match signed {
                q if q.is_zero() => PositionState::Flat,
                q if q.is_sign_positive() => PositionState::Long,
                _ => PositionState::Short,
            };
            self.set_position(signed, investment);
        } else {
            // Direction flip: the remainder opens the opposite position at
            // this trade's price.
            let flipped = if self.state == PositionState::Long {
                PositionState::Short
            } else {
                PositionState::Long
            };
            self.open(flipped, &flipped_remainder(trade, remainder));
        }
    }

    /// Quantity, investment and average cost only ever change together.
    fn set_position(&mut self, quantity: Decimal, investment: Decimal) {
        self.quantity = quantity;
        self.investment = investment;
        self.average_cost = if quantity.is_zero() {
            Decimal::ZERO
        } else {
            (investment / quantity).abs()
        };
    }

    /// Appends to the quantity and investment trends, collapsing same-day
    /// trades into one end-of-day entry.
    fn record_trend(&mut self, date: NaiveDate) {
        match self.quantity_trend.last_mut() {
            Some(last) if last.date == date => {
                last.value = self.quantity;
                if let Some(inv) = self.investment_trend.last_mut() {
                    inv.value = self.investment;
                }
            }
            _ => {
                self.quantity_trend.push(TrendPoint::new(date, self.quantity));
                self.investment_trend.push(TrendPoint::new(date, self.investment));
            }
        }
    }

    fn finalize(self, trades: Vec<Trade>, current_price: Option<Decimal>) -> PositionLedger {
        let unrealized_profit = current_price.map(|price| match self.state {
            PositionState::Flat => Decimal::ZERO,
            PositionState::Long => (price - self.average_cost) * self.quantity,
            PositionState::Short => (self.average_cost - price) * self.quantity.abs(),
        });

        PositionLedger {
            symbol: self.symbol,
            state: self.state,
            quantity: self.quantity,
            investment: self.investment,
            average_cost: self.average_cost,
            current_price,
            unrealized_profit,
            trades,
            quantity_trend: self.quantity_trend,
            investment_trend: self.investment_trend,
            realized_profit_history: self.realized_profit_history,
            realized_profit: self.realized_profit,
        }
    }
}

/// The residual leg of an overshooting closing trade, reused by `open`.
fn flipped_remainder(trade: &Trade, remainder: Decimal) -> Trade {
    Trade {
        quantity: remainder,
        ..trade.clone()
    }
}
