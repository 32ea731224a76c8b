//! Common Types Module
//!
//! Shared domain types used across the engine, strategies and backtester
//! to avoid circular dependencies.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One executed trade print from the market data feed.
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    /// The trading symbol (e.g., "AAPL").
    pub symbol: String,
    /// The trade price. Always positive.
    pub price: Decimal,
    /// The trade size in shares.
    pub volume: u64,
    /// Event timestamp in microseconds.
    pub timestamp: i64,
}

impl Tick {
    pub fn new(symbol: impl Into<String>, price: Decimal, volume: u64, timestamp: i64) -> Self {
        Self {
            symbol: symbol.into(),
            price,
            volume,
            timestamp,
        }
    }
}

/// Strategy intent for a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalKind {
    Buy,
    Sell,
    /// Close whatever position is currently held.
    Exit,
    Neutral,
}

/// A trading signal produced by a strategy.
///
/// Signals have no identity and no size; position sizing happens in the
/// engine. The z-score that triggered the signal rides along so that
/// downstream observers can annotate trade logs without reaching back
/// into strategy state.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    pub symbol: String,
    pub kind: SignalKind,
    /// Signal conviction in [0, 1].
    pub strength: f64,
    pub price: Decimal,
    pub z_score: f64,
}

impl Signal {
    pub fn new(symbol: impl Into<String>, kind: SignalKind, strength: f64, price: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            kind,
            strength: strength.clamp(0.0, 1.0),
            price,
            z_score: 0.0,
        }
    }

    #[must_use]
    pub fn with_z_score(mut self, z_score: f64) -> Self {
        self.z_score = z_score;
        self
    }
}

/// Order side (buy or sell).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderSide {
    Buy,
    Sell,
}

impl std::fmt::Display for OrderSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderSide::Buy => write!(f, "BUY"),
            OrderSide::Sell => write!(f, "SELL"),
        }
    }
}

/// Order type. The core pipeline only emits market orders; the limit
/// variant exists for observer-side consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderType {
    Market,
    Limit,
}

/// A portfolio-sized, side-resolved instruction derived from a signal.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub symbol: String,
    pub side: OrderSide,
    pub order_type: OrderType,
    /// Number of shares. Always positive.
    pub quantity: i64,
    pub price: Decimal,
    /// Z-score carried over from the originating signal.
    pub z_score: f64,
}

impl Order {
    pub fn market(
        symbol: impl Into<String>,
        side: OrderSide,
        quantity: i64,
        price: Decimal,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            order_type: OrderType::Market,
            quantity,
            price,
            z_score: 0.0,
        }
    }

    #[must_use]
    pub fn with_z_score(mut self, z_score: f64) -> Self {
        self.z_score = z_score;
        self
    }

    /// Notional value of the order.
    pub fn total_value(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// The portfolio-side application of an order.
///
/// Handed to the order observer after each applied fill. `quantity` is
/// the executed quantity, which may be smaller than the order's on a
/// partial sell.
#[derive(Debug, Clone, PartialEq)]
pub struct Fill {
    pub symbol: String,
    pub side: OrderSide,
    pub quantity: i64,
    pub price: Decimal,
    /// price * quantity for the executed quantity.
    pub value: Decimal,
    /// Realized profit and loss; `None` on buys.
    pub realized_pnl: Option<Decimal>,
    pub z_score: f64,
    pub timestamp: DateTime<Utc>,
}
