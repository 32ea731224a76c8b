//! Cash and position accounting.
//!
//! The portfolio tracks cash, per-symbol positions with aggregate cost
//! basis, and an ordered log of realized fills. All monetary math is
//! `Decimal` so that the conservation invariant holds exactly: every
//! fill changes `cash + Σ cost_basis` by precisely its realized P&L
//! (zero for buys).
//!
//! Sells reduce the cost basis proportionally: selling `q` shares from
//! a position with average cost `a` removes `q·a` of basis, never
//! `q·sell_price`. The difference is the realized P&L recorded in the
//! trade log.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::warn;
use uuid::Uuid;

use crate::types::OrderSide;

/// Current inventory for a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    /// Shares held. Never negative.
    pub quantity: i64,
    /// Aggregate acquisition cost of the held shares.
    pub cost_basis: Decimal,
}

impl Position {
    /// Average acquisition cost per share; zero for an empty position.
    pub fn average_cost(&self) -> Decimal {
        if self.quantity > 0 {
            self.cost_basis / Decimal::from(self.quantity)
        } else {
            Decimal::ZERO
        }
    }
}

/// A single realized fill in the portfolio's trade log.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeRecord {
    /// Unique trade identifier.
    pub trade_id: Uuid,
    /// Wall-clock timestamp of the fill.
    pub timestamp: DateTime<Utc>,
    pub symbol: String,
    pub side: OrderSide,
    pub quantity: i64,
    pub price: Decimal,
    /// price * quantity.
    pub value: Decimal,
    /// Realized profit and loss; `None` on buys.
    pub realized_pnl: Option<Decimal>,
}

/// Cash + positions accumulator owned by the engine's execution stage.
#[derive(Debug, Default)]
pub struct Portfolio {
    cash: Decimal,
    positions: HashMap<String, Position>,
    trade_count: u64,
    trade_log: Vec<TradeRecord>,
}

impl Portfolio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_cash(&mut self, amount: Decimal) {
        self.cash = amount;
    }

    pub fn cash(&self) -> Decimal {
        self.cash
    }

    pub fn add_cash(&mut self, amount: Decimal) {
        self.cash += amount;
    }

    /// Reduce cash without rejecting overdrafts; a negative balance is
    /// logged and expected to be transient.
    pub fn reduce_cash(&mut self, amount: Decimal) {
        self.cash -= amount;
        if self.cash < Decimal::ZERO {
            warn!(cash = %self.cash, "portfolio cash balance negative");
        }
    }

    /// Shares held for `symbol`; zero when absent.
    pub fn position(&self, symbol: &str) -> i64 {
        self.positions.get(symbol).map_or(0, |p| p.quantity)
    }

    /// Cost basis for `symbol`; zero when absent.
    pub fn position_cost(&self, symbol: &str) -> Decimal {
        self.positions.get(symbol).map_or(Decimal::ZERO, |p| p.cost_basis)
    }

    /// Average acquisition cost for `symbol`; zero when absent.
    pub fn average_cost(&self, symbol: &str) -> Decimal {
        self.positions.get(symbol).map_or(Decimal::ZERO, Position::average_cost)
    }

    /// Add `quantity` shares acquired for `cost` total, creating the
    /// position if needed. Appends a BUY record to the trade log.
    pub fn add_position(&mut self, symbol: &str, quantity: i64, cost: Decimal) {
        if quantity <= 0 {
            warn!(symbol, quantity, "ignoring non-positive buy quantity");
            return;
        }
        let position = self.positions.entry(symbol.to_string()).or_default();
        position.quantity += quantity;
        position.cost_basis += cost;

        self.trade_count += 1;
        self.trade_log.push(TradeRecord {
            trade_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            symbol: symbol.to_string(),
            side: OrderSide::Buy,
            quantity,
            price: cost / Decimal::from(quantity),
            value: cost,
            realized_pnl: None,
        });
    }

    /// Sell `quantity` shares at `price`. The cost basis shrinks
    /// proportionally and the realized P&L against the average cost is
    /// appended as a SELL record. A missing or under-quantity position
    /// is a warning and a no-op; the engine truncates oversized sells
    /// before they reach this layer.
    pub fn reduce_position(&mut self, symbol: &str, quantity: i64, price: Decimal) {
        if quantity <= 0 {
            warn!(symbol, quantity, "ignoring non-positive sell quantity");
            return;
        }
        let Some(position) = self.positions.get_mut(symbol) else {
            warn!(symbol, quantity, "sell for unknown symbol ignored");
            return;
        };
        if position.quantity < quantity {
            warn!(
                symbol,
                requested = quantity,
                held = position.quantity,
                "sell exceeds position, ignored"
            );
            return;
        }

        let average_cost = position.average_cost();
        let basis_removed = average_cost * Decimal::from(quantity);
        let realized = Decimal::from(quantity) * (price - average_cost);

        position.quantity -= quantity;
        position.cost_basis -= basis_removed;
        if position.quantity == 0 {
            self.positions.remove(symbol);
        }

        self.trade_count += 1;
        self.trade_log.push(TradeRecord {
            trade_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            symbol: symbol.to_string(),
            side: OrderSide::Sell,
            quantity,
            price,
            value: price * Decimal::from(quantity),
            realized_pnl: Some(realized),
        });
    }

    /// Cost-based valuation: cash plus the aggregate cost basis of all
    /// open positions. Open inventory is not marked to market here.
    pub fn total_value(&self) -> Decimal {
        self.cash
            + self
                .positions
                .values()
                .map(|p| p.cost_basis)
                .sum::<Decimal>()
    }

    pub fn trade_count(&self) -> u64 {
        self.trade_count
    }

    pub fn trade_log(&self) -> &[TradeRecord] {
        &self.trade_log
    }

    /// Open symbols and their positions.
    pub fn positions(&self) -> impl Iterator<Item = (&str, &Position)> {
        self.positions.iter().map(|(s, p)| (s.as_str(), p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_buy_accounting() {
        let mut pf = Portfolio::new();
        pf.set_cash(dec!(1000));
        pf.reduce_cash(dec!(100));
        pf.add_position("X", 10, dec!(100));

        assert_eq!(pf.cash(), dec!(900));
        assert_eq!(pf.position("X"), 10);
        assert_eq!(pf.position_cost("X"), dec!(100));
        assert_eq!(pf.average_cost("X"), dec!(10));
        assert_eq!(pf.total_value(), dec!(1000));
        assert_eq!(pf.trade_count(), 1);
    }

    #[test]
    fn test_full_sell_realizes_profit() {
        let mut pf = Portfolio::new();
        pf.set_cash(dec!(900));
        pf.add_position("X", 10, dec!(100));

        pf.reduce_position("X", 10, dec!(12));
        pf.add_cash(dec!(120));

        assert_eq!(pf.position("X"), 0);
        assert_eq!(pf.position_cost("X"), dec!(0));
        assert_eq!(pf.cash(), dec!(1020));
        assert_eq!(pf.total_value(), dec!(1020));

        let last = pf.trade_log().last().unwrap();
        assert_eq!(last.side, OrderSide::Sell);
        assert_eq!(last.realized_pnl, Some(dec!(20)));
    }

    #[test]
    fn test_partial_sell_reduces_basis_proportionally() {
        let mut pf = Portfolio::new();
        pf.set_cash(dec!(900));
        pf.add_position("X", 10, dec!(100));

        pf.reduce_position("X", 4, dec!(11));
        pf.add_cash(dec!(44));

        assert_eq!(pf.position("X"), 6);
        assert_eq!(pf.position_cost("X"), dec!(60));
        assert_eq!(pf.cash(), dec!(944));
        let last = pf.trade_log().last().unwrap();
        assert_eq!(last.realized_pnl, Some(dec!(4)));
    }

    #[test]
    fn test_sell_unknown_symbol_is_noop() {
        let mut pf = Portfolio::new();
        pf.set_cash(dec!(100));
        pf.reduce_position("GHOST", 5, dec!(10));
        assert_eq!(pf.cash(), dec!(100));
        assert_eq!(pf.trade_count(), 0);
        assert!(pf.trade_log().is_empty());
    }

    #[test]
    fn test_oversized_sell_is_noop() {
        let mut pf = Portfolio::new();
        pf.add_position("X", 3, dec!(30));
        pf.reduce_position("X", 5, dec!(12));
        assert_eq!(pf.position("X"), 3);
        assert_eq!(pf.position_cost("X"), dec!(30));
    }

    #[test]
    fn test_buy_upserts_existing_position() {
        let mut pf = Portfolio::new();
        pf.add_position("X", 10, dec!(100));
        pf.add_position("X", 5, dec!(60));
        assert_eq!(pf.position("X"), 15);
        assert_eq!(pf.position_cost("X"), dec!(160));
        assert_eq!(pf.trade_count(), 2);
    }

    #[test]
    fn test_conservation_across_fills() {
        let mut pf = Portfolio::new();
        pf.set_cash(dec!(10_000));

        // BUY leaves cash + basis unchanged.
        pf.reduce_cash(dec!(500));
        pf.add_position("A", 50, dec!(500));
        assert_eq!(pf.total_value(), dec!(10_000));

        // SELL moves total by exactly the realized P&L.
        pf.reduce_position("A", 20, dec!(13));
        pf.add_cash(dec!(260));
        // realized = 20 * (13 - 10) = 60
        assert_eq!(pf.total_value(), dec!(10_060));
    }

    #[test]
    fn test_negative_cash_allowed_but_logged() {
        let mut pf = Portfolio::new();
        pf.set_cash(dec!(10));
        pf.reduce_cash(dec!(25));
        assert_eq!(pf.cash(), dec!(-15));
    }
}
