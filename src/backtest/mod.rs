//! Backtesting engine for trading strategies.
//!
//! Replays historical ticks through a strategy synchronously — no
//! rings, no threads — so that two runs over the same file produce
//! identical fills, equity curves and metrics. Signals convert to
//! fills at the signal price against a private ledger that mirrors the
//! live portfolio accounting but stamps synthetic tick timestamps
//! instead of wall-clock time.

pub mod loader;
pub mod metrics;

pub use loader::load_ticks_csv;
pub use metrics::PerformanceMetrics;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use thiserror::Error;
use tracing::warn;

use crate::strategy::Strategy;
use crate::types::{OrderSide, Signal, SignalKind, Tick};

#[derive(Debug, Error)]
pub enum BacktestError {
    #[error("failed to read data file: {0}")]
    Io(#[from] std::io::Error),
    #[error("no usable rows in data file")]
    NoData,
}

#[derive(Debug, Clone)]
pub struct BacktestConfig {
    pub initial_capital: Decimal,
    /// Fraction of cash committed per BUY signal.
    pub buy_cash_fraction: Decimal,
    /// Trading days assumed for annualisation.
    pub trading_days: u32,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            initial_capital: dec!(100_000),
            buy_cash_fraction: dec!(0.01),
            trading_days: 252,
        }
    }
}

impl BacktestConfig {
    pub fn with_capital(initial_capital: Decimal) -> Self {
        Self {
            initial_capital,
            ..Self::default()
        }
    }
}

/// One applied fill, on the synthetic backtest clock.
#[derive(Debug, Clone, PartialEq)]
pub struct BacktestFill {
    pub timestamp: i64,
    pub symbol: String,
    pub side: OrderSide,
    pub quantity: i64,
    pub price: Decimal,
    pub value: Decimal,
    /// `None` on buys.
    pub realized_pnl: Option<Decimal>,
    pub z_score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquityPoint {
    pub timestamp: i64,
    pub equity: Decimal,
}

/// Everything a backtest run produces.
#[derive(Debug)]
pub struct BacktestReport {
    pub metrics: PerformanceMetrics,
    pub fills: Vec<BacktestFill>,
    pub equity_curve: Vec<EquityPoint>,
    pub ticks_processed: usize,
    pub strategy_errors: usize,
}

#[derive(Default)]
struct LedgerPosition {
    quantity: i64,
    cost_basis: Decimal,
}

impl LedgerPosition {
    fn average_cost(&self) -> Decimal {
        if self.quantity > 0 {
            self.cost_basis / Decimal::from(self.quantity)
        } else {
            Decimal::ZERO
        }
    }
}

pub struct BacktestDriver {
    config: BacktestConfig,
}

impl BacktestDriver {
    pub fn new(config: BacktestConfig) -> Self {
        Self { config }
    }

    /// Run `strategy` over `ticks`, which must already carry the
    /// loader's synthetic monotone timestamps.
    pub fn run(
        &self,
        strategy: &mut (dyn Strategy + Send),
        ticks: &[Tick],
    ) -> Result<BacktestReport, BacktestError> {
        if ticks.is_empty() {
            return Err(BacktestError::NoData);
        }

        let mut cash = self.config.initial_capital;
        let mut positions: HashMap<String, LedgerPosition> = HashMap::new();
        let mut last_prices: HashMap<String, Decimal> = HashMap::new();
        let mut fills: Vec<BacktestFill> = Vec::new();
        let mut equity_curve = vec![EquityPoint {
            timestamp: 0,
            equity: self.config.initial_capital,
        }];
        let mut strategy_errors = 0usize;

        strategy.initialize();

        for tick in ticks {
            last_prices.insert(tick.symbol.clone(), tick.price);

            let signals = match strategy.process_tick(tick) {
                Ok(signals) => signals,
                Err(err) => {
                    strategy_errors += 1;
                    warn!(symbol = %tick.symbol, %err, "strategy error, tick skipped");
                    continue;
                }
            };

            for signal in &signals {
                if let Some(fill) =
                    apply_signal(signal, tick.timestamp, &mut cash, &mut positions, self.config.buy_cash_fraction)
                {
                    let equity =
                        cash + positions.values().map(|p| p.cost_basis).sum::<Decimal>();
                    equity_curve.push(EquityPoint {
                        timestamp: fill.timestamp,
                        equity,
                    });
                    fills.push(fill);
                }
            }
        }

        strategy.shutdown();

        // Remaining open inventory is valued at the last trade price.
        let open_value: Decimal = positions
            .iter()
            .filter_map(|(symbol, p)| {
                last_prices
                    .get(symbol)
                    .map(|price| *price * Decimal::from(p.quantity))
            })
            .sum();
        let final_capital = cash + open_value;

        let metrics = PerformanceMetrics::compute(
            self.config.initial_capital,
            final_capital,
            &fills,
            &equity_curve,
            self.config.trading_days,
        );

        Ok(BacktestReport {
            metrics,
            fills,
            equity_curve,
            ticks_processed: ticks.len(),
            strategy_errors,
        })
    }
}

/// Convert one signal into a fill against the ledger, using the same
/// sizing rules as the live engine (full-position sells, cash-fraction
/// buys) but with immediate execution at the signal price.
fn apply_signal(
    signal: &Signal,
    timestamp: i64,
    cash: &mut Decimal,
    positions: &mut HashMap<String, LedgerPosition>,
    buy_cash_fraction: Decimal,
) -> Option<BacktestFill> {
    if signal.price <= Decimal::ZERO {
        return None;
    }

    match signal.kind {
        SignalKind::Neutral => None,
        SignalKind::Buy => {
            let budget = *cash * buy_cash_fraction;
            let quantity = (budget / signal.price).floor().to_i64().unwrap_or(0);
            if quantity <= 0 {
                return None;
            }
            let cost = signal.price * Decimal::from(quantity);
            if cost > *cash {
                return None;
            }
            *cash -= cost;
            let position = positions.entry(signal.symbol.clone()).or_default();
            position.quantity += quantity;
            position.cost_basis += cost;
            Some(BacktestFill {
                timestamp,
                symbol: signal.symbol.clone(),
                side: OrderSide::Buy,
                quantity,
                price: signal.price,
                value: cost,
                realized_pnl: None,
                z_score: signal.z_score,
            })
        }
        SignalKind::Sell | SignalKind::Exit => {
            let position = positions.get_mut(&signal.symbol)?;
            let quantity = position.quantity;
            if quantity <= 0 {
                return None;
            }
            let average_cost = position.average_cost();
            let proceeds = signal.price * Decimal::from(quantity);
            let realized = Decimal::from(quantity) * (signal.price - average_cost);

            *cash += proceeds;
            positions.remove(&signal.symbol);

            Some(BacktestFill {
                timestamp,
                symbol: signal.symbol.clone(),
                side: OrderSide::Sell,
                quantity,
                price: signal.price,
                value: proceeds,
                realized_pnl: Some(realized),
                z_score: signal.z_score,
            })
        }
    }
}
