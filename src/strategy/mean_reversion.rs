//! Mean-reversion strategy on a rolling z-score.
//!
//! Keeps a rolling window of recent prices per symbol and fades large
//! deviations: a price far above the rolling mean is a sell, far below
//! a buy, and a return towards the mean exits. Signals only start once
//! a symbol's window is full, and a degenerate window (zero deviation)
//! stays silent.

use rust_decimal::prelude::ToPrimitive;
use std::collections::HashMap;

use crate::math::RollingWindow;
use crate::types::{Signal, SignalKind, Tick};

use super::{parse_param, Strategy, StrategyError};

const DEFAULT_WINDOW: usize = 20;
const DEFAULT_ENTRY_THRESHOLD: f64 = 2.0;
const DEFAULT_EXIT_THRESHOLD: f64 = 0.5;

pub struct MeanReversionStrategy {
    name: String,
    enabled: bool,
    window_size: usize,
    entry_threshold: f64,
    exit_threshold: f64,
    windows: HashMap<String, RollingWindow>,
}

impl Default for MeanReversionStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl MeanReversionStrategy {
    pub fn new() -> Self {
        Self::with_params(DEFAULT_WINDOW, DEFAULT_ENTRY_THRESHOLD, DEFAULT_EXIT_THRESHOLD)
    }

    pub fn with_params(window_size: usize, entry_threshold: f64, exit_threshold: f64) -> Self {
        Self {
            name: "MeanReversion".to_string(),
            enabled: true,
            window_size: window_size.max(2),
            entry_threshold,
            exit_threshold,
            windows: HashMap::new(),
        }
    }
}

impl Strategy for MeanReversionStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn configure(&mut self, params: &HashMap<String, String>) {
        self.window_size = parse_param(params, "window", self.window_size).max(2);
        self.entry_threshold = parse_param(params, "entry_threshold", self.entry_threshold);
        self.exit_threshold = parse_param(params, "exit_threshold", self.exit_threshold);
        // Window size changes only apply to symbols seen afterwards.
    }

    fn process_tick(&mut self, tick: &Tick) -> Result<Vec<Signal>, StrategyError> {
        let price = tick.price.to_f64().ok_or_else(|| {
            StrategyError::Fault(format!("price {} not representable as f64", tick.price))
        })?;

        let window = self
            .windows
            .entry(tick.symbol.clone())
            .or_insert_with(|| RollingWindow::new(self.window_size));
        window.push(price);

        if !window.is_full() {
            return Ok(Vec::new());
        }

        let z = window.z_score(price);
        if window.std_dev() < 1e-10 {
            // Flat window: no information, no signal.
            return Ok(Vec::new());
        }

        let mut signals = Vec::new();
        if z > self.entry_threshold {
            let strength = ((z - self.entry_threshold) / 2.0).min(1.0);
            signals.push(
                Signal::new(&tick.symbol, SignalKind::Sell, strength, tick.price).with_z_score(z),
            );
        } else if z < -self.entry_threshold {
            let strength = ((-z - self.entry_threshold) / 2.0).min(1.0);
            signals.push(
                Signal::new(&tick.symbol, SignalKind::Buy, strength, tick.price).with_z_score(z),
            );
        } else if z.abs() < self.exit_threshold {
            let strength = 1.0 - z.abs() / self.exit_threshold;
            signals.push(
                Signal::new(&tick.symbol, SignalKind::Exit, strength, tick.price).with_z_score(z),
            );
        }

        Ok(signals)
    }
}
