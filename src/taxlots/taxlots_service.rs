use std::collections::VecDeque;

use chrono::{Duration, NaiveDateTime};
use rust_decimal::Decimal;

use crate::constants::LONG_TERM_HOLDING_DAYS;
use crate::trades::{Trade, TradeKind};

use super::taxlots_model::{OpenLot, TaxClass, TaxLotReport};

/// FIFO matcher that derives the currently open tax lots from a symbol's
/// full trade history.
///
/// Matching decrements residual quantities, so the matcher works on its own
/// copies of the trades' quantities; the ledger's canonical trade list is
/// never touched.
#[derive(Default, Debug, Clone)]
pub struct TaxLotMatcher {}

/// Private working copy of one trade's residual quantity.
#[derive(Debug, Clone)]
struct ResidualLot {
    order_id: String,
    kind: TradeKind,
    opened_at: NaiveDateTime,
    quantity: Decimal,
    price: Decimal,
}

impl ResidualLot {
    fn from_trade(trade: &Trade) -> Self {
        ResidualLot {
            order_id: trade.order_id.clone(),
            kind: trade.kind,
            opened_at: trade.timestamp,
            quantity: trade.quantity,
            price: trade.price,
        }
    }
}

impl TaxLotMatcher {
    pub fn new() -> Self {
        TaxLotMatcher {}
    }

    /// Replays the trade history through a FIFO queue of residual lots and
    /// classifies whatever remains open against `as_of` (the evaluation
    /// instant, not the last trade's timestamp).
    pub fn match_open_lots(
        &self,
        trades: &[Trade],
        current_price: Option<Decimal>,
        as_of: NaiveDateTime,
    ) -> TaxLotReport {
        let mut ordered: Vec<&Trade> = trades.iter().collect();
        ordered.sort_by_key(|t| t.timestamp);

        let mut queue: VecDeque<ResidualLot> = VecDeque::new();
        for trade in ordered {
            if trade.quantity.is_zero() {
                continue;
            }
            let mut incoming = ResidualLot::from_trade(trade);

            let same_side = queue
                .front()
                .map_or(true, |head| head.kind.is_buy_side() == incoming.kind.is_buy_side());
            if same_side {
                queue.push_back(incoming);
                continue;
            }

            // Opposite sense: offset against the queue head(s) until the
            // incoming trade is exhausted or the queue drains.
            while !incoming.quantity.is_zero() {
                match queue.front_mut() {
                    Some(head) => {
                        let offset = head.quantity.min(incoming.quantity);
                        head.quantity -= offset;
                        incoming.quantity -= offset;
                        if head.quantity.is_zero() {
                            queue.pop_front();
                        }
                    }
                    None => {
                        // Queue drained: the remainder flips the open side.
                        queue.push_back(incoming);
                        break;
                    }
                }
            }
        }

        let cutoff = as_of - Duration::days(LONG_TERM_HOLDING_DAYS);
        let open_lots: Vec<OpenLot> = queue
            .into_iter()
            .map(|lot| OpenLot {
                tax_class: if lot.opened_at < cutoff {
                    TaxClass::LongTerm
                } else {
                    TaxClass::ShortTerm
                },
                order_id: lot.order_id,
                kind: lot.kind,
                opened_at: lot.opened_at,
                quantity: lot.quantity,
                price: lot.price,
            })
            .collect();

        let (long_term_gain, short_term_gain) = match current_price {
            Some(price) => {
                let mut long_term = Decimal::ZERO;
                let mut short_term = Decimal::ZERO;
                for lot in &open_lots {
                    let gain = (price - lot.price) * lot.quantity;
                    match lot.tax_class {
                        TaxClass::LongTerm => long_term += gain,
                        TaxClass::ShortTerm => short_term += gain,
                    }
                }
                (Some(long_term), Some(short_term))
            }
            None => (None, None),
        };

        TaxLotReport {
            open_lots,
            long_term_gain,
            short_term_gain,
        }
    }
}
