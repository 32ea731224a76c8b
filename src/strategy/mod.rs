//! Strategy contract and implementations.
//!
//! A strategy is a pure signal generator: it consumes ticks, mutates
//! only its own state and returns zero or more signals. It never sees
//! the portfolio; position sizing belongs to the engine. Failures are
//! values — an `Err` from `process_tick` makes the engine skip that
//! tick and leave the strategy enabled.

pub mod mean_reversion;
pub mod registry;
pub mod stat_arb;

pub use mean_reversion::MeanReversionStrategy;
pub use registry::StrategyRegistry;
pub use stat_arb::StatArbStrategy;

use std::collections::HashMap;
use thiserror::Error;

use crate::types::{Signal, Tick};

#[derive(Debug, Error)]
pub enum StrategyError {
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },
    #[error("strategy fault: {0}")]
    Fault(String),
}

/// Contract every trading strategy implements.
///
/// `process_tick` must be deterministic given the strategy's state and
/// the tick, must not block and must not perform I/O.
pub trait Strategy: Send {
    fn name(&self) -> &str;

    fn is_enabled(&self) -> bool {
        true
    }

    fn set_enabled(&mut self, _enabled: bool) {}

    /// Called once before the engine starts delivering ticks.
    fn initialize(&mut self) {}

    /// Called after the engine has stopped.
    fn shutdown(&mut self) {}

    /// Apply string-keyed parameters. Unknown keys are ignored so a
    /// shared config section can feed several strategies.
    fn configure(&mut self, _params: &HashMap<String, String>) {}

    fn process_tick(&mut self, tick: &Tick) -> Result<Vec<Signal>, StrategyError>;
}

/// Parse helper shared by the strategy `configure` implementations.
pub(crate) fn parse_param<T: std::str::FromStr>(
    params: &HashMap<String, String>,
    key: &str,
    current: T,
) -> T {
    params
        .get(key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(current)
}
