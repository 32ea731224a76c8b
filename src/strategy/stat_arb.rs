//! Pair-trading statistical arbitrage.
//!
//! Trades a fixed set of cointegrated symbol pairs, each tagged with a
//! sector. For every pair the strategy maintains the hedged spread
//! `price_a - β · price_b` over three lookbacks (short/medium/long),
//! recomputing β by OLS on recent returns. Entries require the medium
//! z-score to breach the entry threshold, to have started reverting
//! (confirmation against the previous z), and agreement across all
//! three timeframes; they are then gated by cash reserve, available
//! capital and sector allocation limits. Exits combine a stop loss,
//! a trailing stop, a time stop, multi-timeframe mean reversion and a
//! profit target driven by the maximum favorable excursion.
//!
//! The strategy is single-threaded: it is driven tick by tick from the
//! engine's strategy thread and keeps all state to itself. Both legs of
//! a pair open and close atomically at this level; orders still reach
//! the portfolio one by one through the normal signal pipeline.

use rust_decimal::prelude::ToPrimitive;
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::{debug, info};

use crate::math::{half_life, returns_beta, RollingWindow};
use crate::types::{Signal, SignalKind, Tick};

use super::{parse_param, Strategy, StrategyError};

const MICROS_PER_HOUR: i64 = 3_600 * 1_000_000;
const MICROS_PER_MINUTE: i64 = 60 * 1_000_000;

/// Tunable parameters, consolidated from the optimised rule set and
/// all exposed through `configure`.
#[derive(Debug, Clone)]
pub struct StatArbConfig {
    pub entry_threshold: f64,
    pub exit_threshold: f64,
    pub profit_target_mult: f64,
    pub trailing_stop_pct: f64,
    pub stop_loss_pct: f64,
    /// Base position size as a fraction of total capital, per leg.
    pub max_position_pct: f64,
    pub max_sector_allocation: f64,
    pub min_cash_reserve_pct: f64,
    pub emergency_cash_pct: f64,
    pub total_capital: f64,
    pub short_lookback: usize,
    pub medium_lookback: usize,
    pub long_lookback: usize,
    pub max_holding_hours: i64,
    /// Minimum holding time before the trailing stop arms.
    pub min_holding_minutes: i64,
    /// Data-clock interval between cash sweeps, in microseconds.
    pub cash_check_interval_us: i64,
    /// Reference market volatility for the sizing scaler.
    pub base_market_vol: f64,
}

impl Default for StatArbConfig {
    fn default() -> Self {
        Self {
            entry_threshold: 1.3,
            exit_threshold: 0.25,
            profit_target_mult: 0.7,
            trailing_stop_pct: 0.25,
            stop_loss_pct: 0.018,
            max_position_pct: 0.004,
            max_sector_allocation: 0.25,
            min_cash_reserve_pct: 0.15,
            emergency_cash_pct: 0.05,
            total_capital: 5_000_000.0,
            short_lookback: 8,
            medium_lookback: 15,
            long_lookback: 25,
            max_holding_hours: 72,
            min_holding_minutes: 30,
            cash_check_interval_us: 500_000,
            base_market_vol: 0.015,
        }
    }
}

/// One tradable pair with its sector tag.
#[derive(Debug, Clone)]
pub struct PairDef {
    pub symbol_a: String,
    pub symbol_b: String,
    pub sector: String,
}

impl PairDef {
    pub fn new(symbol_a: &str, symbol_b: &str, sector: &str) -> Self {
        Self {
            symbol_a: symbol_a.to_string(),
            symbol_b: symbol_b.to_string(),
            sector: sector.to_string(),
        }
    }
}

/// Per-pair trading state. `qty_a`/`qty_b` are signed and always carry
/// opposite signs while open; both are zero when flat.
struct PairState {
    def: PairDef,
    beta: f64,
    half_life: Option<f64>,
    spread_short: RollingWindow,
    spread_medium: RollingWindow,
    spread_long: RollingWindow,
    qty_a: i64,
    qty_b: i64,
    entry_price_a: f64,
    entry_price_b: f64,
    entry_z: f64,
    peak_profit_pct: f64,
    max_favorable_excursion: f64,
    entry_time: i64,
    prev_z: f64,
    returns: VecDeque<f64>,
    sharpe: f64,
}

impl PairState {
    fn new(def: PairDef, config: &StatArbConfig) -> Self {
        Self {
            def,
            beta: 1.0,
            half_life: None,
            spread_short: RollingWindow::new(config.short_lookback),
            spread_medium: RollingWindow::new(config.medium_lookback),
            spread_long: RollingWindow::new(config.long_lookback),
            qty_a: 0,
            qty_b: 0,
            entry_price_a: 0.0,
            entry_price_b: 0.0,
            entry_z: 0.0,
            peak_profit_pct: 0.0,
            max_favorable_excursion: 0.0,
            entry_time: 0,
            prev_z: 0.0,
            returns: VecDeque::with_capacity(20),
            sharpe: 1.0,
        }
    }

    fn is_open(&self) -> bool {
        self.qty_a != 0
    }

    fn unrealized_pnl(&self, price_a: f64, price_b: f64) -> f64 {
        self.qty_a as f64 * (price_a - self.entry_price_a)
            + self.qty_b as f64 * (price_b - self.entry_price_b)
    }

    fn position_value(&self, price_a: f64, price_b: f64) -> f64 {
        (self.qty_a as f64 * price_a).abs() + (self.qty_b as f64 * price_b).abs()
    }

    /// Unrealized return ratio; zero when flat or degenerate.
    fn performance(&self, price_a: f64, price_b: f64) -> f64 {
        let value = self.position_value(price_a, price_b);
        if value <= 0.0 {
            return 0.0;
        }
        self.unrealized_pnl(price_a, price_b) / value
    }

    fn add_return(&mut self, ret: f64) {
        self.returns.push_back(ret);
        if self.returns.len() > 20 {
            self.returns.pop_front();
        }
        if self.returns.len() >= 5 {
            let n = self.returns.len() as f64;
            let mean = self.returns.iter().sum::<f64>() / n;
            let var = self
                .returns
                .iter()
                .map(|r| (r - mean) * (r - mean))
                .sum::<f64>()
                / n;
            let std = var.sqrt();
            if std > 1e-4 {
                self.sharpe = mean / std;
            }
        }
    }

    fn reset_position(&mut self) {
        self.qty_a = 0;
        self.qty_b = 0;
        self.entry_price_a = 0.0;
        self.entry_price_b = 0.0;
        self.entry_z = 0.0;
        self.peak_profit_pct = 0.0;
        self.max_favorable_excursion = 0.0;
        self.entry_time = 0;
    }
}

pub struct StatArbStrategy {
    name: String,
    enabled: bool,
    config: StatArbConfig,
    pairs: Vec<PairState>,
    pairs_by_symbol: HashMap<String, Vec<usize>>,
    active_symbols: HashSet<String>,
    last_prices: HashMap<String, f64>,
    price_history: HashMap<String, RollingWindow>,
    volatility: HashMap<String, f64>,
    sector_allocation: HashMap<String, f64>,
    available_cash: f64,
    last_cash_check: Option<i64>,
}

impl Default for StatArbStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl StatArbStrategy {
    /// The built-in cointegrated pair universe.
    pub fn new() -> Self {
        Self::with_pairs(default_pairs())
    }

    pub fn with_pairs(defs: Vec<PairDef>) -> Self {
        Self::with_config(StatArbConfig::default(), defs)
    }

    pub fn with_config(config: StatArbConfig, defs: Vec<PairDef>) -> Self {
        let mut strategy = Self {
            name: "StatArbitrage".to_string(),
            enabled: true,
            available_cash: config.total_capital,
            config,
            pairs: Vec::new(),
            pairs_by_symbol: HashMap::new(),
            active_symbols: HashSet::new(),
            last_prices: HashMap::new(),
            price_history: HashMap::new(),
            volatility: HashMap::new(),
            sector_allocation: HashMap::new(),
            last_cash_check: None,
        };
        strategy.install_pairs(defs);
        strategy
    }

    fn install_pairs(&mut self, defs: Vec<PairDef>) {
        self.pairs.clear();
        self.pairs_by_symbol.clear();
        self.active_symbols.clear();
        for def in defs {
            let idx = self.pairs.len();
            self.active_symbols.insert(def.symbol_a.clone());
            self.active_symbols.insert(def.symbol_b.clone());
            self.pairs_by_symbol
                .entry(def.symbol_a.clone())
                .or_default()
                .push(idx);
            self.pairs_by_symbol
                .entry(def.symbol_b.clone())
                .or_default()
                .push(idx);
            self.pairs.push(PairState::new(def, &self.config));
        }
    }

    /// Number of pairs currently holding open legs.
    pub fn open_pair_count(&self) -> usize {
        self.pairs.iter().filter(|p| p.is_open()).count()
    }

    pub fn available_cash(&self) -> f64 {
        self.available_cash
    }

    fn history_capacity(&self) -> usize {
        self.config.long_lookback * 2
    }

    fn update_symbol(&mut self, symbol: &str, price: f64) {
        self.last_prices.insert(symbol.to_string(), price);

        let capacity = self.history_capacity();
        let history = self
            .price_history
            .entry(symbol.to_string())
            .or_insert_with(|| RollingWindow::new(capacity));
        history.push(price);

        if history.len() >= 10 {
            let prices = history.as_vec();
            let mut returns = Vec::with_capacity(prices.len() - 1);
            for w in prices.windows(2) {
                if w[0].abs() > 1e-12 {
                    returns.push(w[1] / w[0] - 1.0);
                }
            }
            if returns.len() >= 2 {
                let n = returns.len() as f64;
                let mean = returns.iter().sum::<f64>() / n;
                let var = returns.iter().map(|r| (r - mean) * (r - mean)).sum::<f64>() / n;
                self.volatility
                    .insert(symbol.to_string(), var.sqrt() * 252f64.sqrt());
            }
        }
    }

    fn market_volatility(&self) -> f64 {
        if self.volatility.is_empty() {
            return self.config.base_market_vol;
        }
        self.volatility.values().sum::<f64>() / self.volatility.len() as f64
    }

    /// Shares for one leg, scaled by volatility, signal strength,
    /// realized Sharpe, mean-reversion speed and the market regime.
    fn position_size(
        &self,
        symbol: &str,
        price: f64,
        abs_z: f64,
        sharpe: f64,
        half_life: Option<f64>,
    ) -> i64 {
        let vol = self
            .volatility
            .get(symbol)
            .copied()
            .unwrap_or(self.config.base_market_vol);
        let vol_factor = (0.25 / vol.max(0.03)).min(2.0);
        let z_factor = (0.7 + (abs_z / self.config.entry_threshold).powf(0.6)).min(2.0);
        let sharpe_factor = (sharpe / 2.0).clamp(0.4, 1.8);
        let half_life_factor = half_life.map_or(1.0, |hl| (10.0 / hl).min(1.5));
        let market_vol_factor =
            (self.config.base_market_vol / self.market_volatility().max(0.005)).clamp(0.5, 1.5);

        let base = self.config.total_capital * self.config.max_position_pct / price;
        let scaled =
            base * vol_factor * z_factor * sharpe_factor * half_life_factor * market_vol_factor;
        (scaled as i64).max(1)
    }

    /// Close an open pair: emit inverted signals for both legs, return
    /// the position value to available cash, release the sector
    /// allocation, record the return sample and reset the state.
    fn close_pair(
        &mut self,
        idx: usize,
        price_a: f64,
        price_b: f64,
        z: f64,
        reason: &'static str,
        signals: &mut Vec<Signal>,
    ) {
        let pair = &mut self.pairs[idx];
        if !pair.is_open() {
            return;
        }

        let position_value = pair.position_value(price_a, price_b);
        let profit_pct = pair.performance(price_a, price_b);

        let side_a = if pair.qty_a > 0 {
            SignalKind::Sell
        } else {
            SignalKind::Buy
        };
        let side_b = if pair.qty_b > 0 {
            SignalKind::Sell
        } else {
            SignalKind::Buy
        };
        signals.push(
            Signal::new(&pair.def.symbol_a, side_a, 1.0, to_decimal(price_a)).with_z_score(z),
        );
        signals.push(
            Signal::new(&pair.def.symbol_b, side_b, 1.0, to_decimal(price_b)).with_z_score(z),
        );

        debug!(
            pair_a = %pair.def.symbol_a,
            pair_b = %pair.def.symbol_b,
            reason,
            profit_pct,
            "closing pair"
        );

        pair.add_return(profit_pct);
        pair.reset_position();
        let sector = pair.def.sector.clone();

        self.available_cash += position_value;
        if let Some(alloc) = self.sector_allocation.get_mut(&sector) {
            *alloc = (*alloc - position_value).max(0.0);
        }
    }

    /// Recompute allocated capital from open positions and last seen
    /// prices; when the reserve is breached, close the worst performing
    /// pairs until it is restored or nothing remains open.
    fn sweep_cash(&mut self, signals: &mut Vec<Signal>) {
        let allocated: f64 = self
            .pairs
            .iter()
            .filter(|p| p.is_open())
            .filter_map(|p| {
                let pa = self.last_prices.get(&p.def.symbol_a)?;
                let pb = self.last_prices.get(&p.def.symbol_b)?;
                Some(p.position_value(*pa, *pb))
            })
            .sum();
        self.available_cash = self.config.total_capital - allocated;

        while self.available_cash / self.config.total_capital < self.config.emergency_cash_pct {
            let worst = self
                .pairs
                .iter()
                .enumerate()
                .filter(|(_, p)| p.is_open())
                .filter_map(|(i, p)| {
                    let pa = *self.last_prices.get(&p.def.symbol_a)?;
                    let pb = *self.last_prices.get(&p.def.symbol_b)?;
                    Some((i, pa, pb, p.performance(pa, pb)))
                })
                .min_by(|a, b| a.3.total_cmp(&b.3));

            let Some((idx, pa, pb, performance)) = worst else {
                break;
            };
            info!(performance, "cash reserve breached, freeing worst pair");
            let z = self.pairs[idx].prev_z;
            self.close_pair(idx, pa, pb, z, "cash sweep", signals);
        }
    }

    fn process_pair(&mut self, idx: usize, timestamp: i64, signals: &mut Vec<Signal>) {
        let (sym_a, sym_b) = {
            let def = &self.pairs[idx].def;
            (def.symbol_a.clone(), def.symbol_b.clone())
        };
        let (Some(&price_a), Some(&price_b)) =
            (self.last_prices.get(&sym_a), self.last_prices.get(&sym_b))
        else {
            return;
        };

        // Risk exits depend only on prices, so they run before the
        // spread statistics are touched.
        if self.pairs[idx].is_open() {
            let pair = &mut self.pairs[idx];
            let position_value = pair.position_value(price_a, price_b);
            if position_value <= 0.0 {
                return;
            }
            let unrealized = pair.unrealized_pnl(price_a, price_b);
            let profit_pct = unrealized / position_value;
            if profit_pct > pair.peak_profit_pct {
                pair.peak_profit_pct = profit_pct;
            }

            let held = timestamp - pair.entry_time;
            let stop_loss_hit = unrealized < -self.config.stop_loss_pct * position_value;
            let trailing_armed = held >= self.config.min_holding_minutes * MICROS_PER_MINUTE
                && pair.peak_profit_pct > 0.01;
            let trailing_hit = trailing_armed
                && (pair.peak_profit_pct - profit_pct)
                    >= self.config.trailing_stop_pct * pair.peak_profit_pct;
            let time_hit = held > self.config.max_holding_hours * MICROS_PER_HOUR;

            if stop_loss_hit || trailing_hit || time_hit {
                let reason = if stop_loss_hit {
                    "stop loss"
                } else if trailing_hit {
                    "trailing stop"
                } else {
                    "time stop"
                };
                let z = pair.prev_z;
                self.close_pair(idx, price_a, price_b, z, reason, signals);
                return;
            }
        }

        // Dynamic hedge ratio from recent returns of the two legs.
        let beta = {
            let window = self.config.medium_lookback + 1;
            let ha = self.price_history.get(&sym_a).map(|h| h.as_vec());
            let hb = self.price_history.get(&sym_b).map(|h| h.as_vec());
            match (ha, hb) {
                (Some(ha), Some(hb)) if ha.len() >= window && hb.len() >= window => {
                    returns_beta(&ha[ha.len() - window..], &hb[hb.len() - window..])
                }
                _ => None,
            }
        };

        let (z_short, z_medium, z_long, prev_z, medium_full) = {
            let pair = &mut self.pairs[idx];
            if let Some(beta) = beta {
                pair.beta = beta.clamp(0.5, 2.0);
            }
            let spread = price_a - pair.beta * price_b;
            pair.spread_short.push(spread);
            pair.spread_medium.push(spread);
            pair.spread_long.push(spread);
            pair.half_life = half_life(&pair.spread_medium.as_vec());

            let z_short = if pair.spread_short.is_full() {
                pair.spread_short.z_score(spread)
            } else {
                0.0
            };
            let z_medium = if pair.spread_medium.is_full() {
                pair.spread_medium.z_score(spread)
            } else {
                0.0
            };
            let z_long = if pair.spread_long.is_full() {
                pair.spread_long.z_score(spread)
            } else {
                0.0
            };

            let prev_z = pair.prev_z;
            let medium_full = pair.spread_medium.is_full();
            if medium_full {
                pair.prev_z = z_medium;
            }
            (z_short, z_medium, z_long, prev_z, medium_full)
        };

        if !medium_full {
            return;
        }

        let entry = self.config.entry_threshold;
        let exit = self.config.exit_threshold;

        if !self.pairs[idx].is_open() {
            // Reversal confirmation: the breach must have started to
            // come back before we fade it.
            let confirmed_short = z_medium > entry && z_medium < prev_z;
            let confirmed_long = z_medium < -entry && z_medium > prev_z;
            if !confirmed_short && !confirmed_long {
                return;
            }
            let strong_signal = z_short.abs() > 0.8 * entry
                && z_medium.abs() > entry
                && z_long.abs() > 0.6 * entry;
            if !strong_signal {
                return;
            }

            if self.available_cash / self.config.total_capital < self.config.min_cash_reserve_pct {
                return;
            }

            let (sharpe, pair_half_life) =
                (self.pairs[idx].sharpe, self.pairs[idx].half_life);
            let qty_a =
                self.position_size(&sym_a, price_a, z_medium.abs(), sharpe, pair_half_life);
            let qty_b =
                self.position_size(&sym_b, price_b, z_medium.abs(), sharpe, pair_half_life);
            let position_value = qty_a as f64 * price_a + qty_b as f64 * price_b;

            if position_value > self.available_cash {
                return;
            }
            let sector = self.pairs[idx].def.sector.clone();
            let sector_alloc = self.sector_allocation.get(&sector).copied().unwrap_or(0.0);
            if (sector_alloc + position_value) / self.config.total_capital
                > self.config.max_sector_allocation
            {
                return;
            }

            let (kind_a, kind_b, signed_a, signed_b) = if confirmed_short {
                (SignalKind::Sell, SignalKind::Buy, -qty_a, qty_b)
            } else {
                (SignalKind::Buy, SignalKind::Sell, qty_a, -qty_b)
            };

            signals.push(
                Signal::new(&sym_a, kind_a, 1.0, to_decimal(price_a)).with_z_score(z_medium),
            );
            signals.push(
                Signal::new(&sym_b, kind_b, 1.0, to_decimal(price_b)).with_z_score(z_medium),
            );

            let pair = &mut self.pairs[idx];
            pair.qty_a = signed_a;
            pair.qty_b = signed_b;
            pair.entry_price_a = price_a;
            pair.entry_price_b = price_b;
            pair.entry_z = z_medium;
            pair.entry_time = timestamp;
            pair.peak_profit_pct = 0.0;
            pair.max_favorable_excursion = 0.0;

            debug!(
                pair_a = %sym_a,
                pair_b = %sym_b,
                z = z_medium,
                spread = if confirmed_short { "short" } else { "long" },
                "pair entry"
            );

            self.available_cash -= position_value;
            *self.sector_allocation.entry(sector).or_default() += position_value;
        } else {
            // Favorable excursion is the z distance recovered since
            // entry: falling z for a short spread, rising for a long.
            {
                let pair = &mut self.pairs[idx];
                let movement = if pair.qty_a < 0 {
                    pair.entry_z - z_medium
                } else {
                    z_medium - pair.entry_z
                };
                if movement > pair.max_favorable_excursion {
                    pair.max_favorable_excursion = movement;
                }
            }

            let pair = &self.pairs[idx];
            let mean_reversion_exit = ((pair.qty_a > 0 && z_medium > -exit)
                || (pair.qty_a < 0 && z_medium < exit))
                && z_short.abs() < 1.5 * exit;
            let profit_target_exit = pair.max_favorable_excursion > 0.0
                && pair.max_favorable_excursion * self.config.profit_target_mult
                    <= (pair.entry_z - z_medium).abs();

            if mean_reversion_exit || profit_target_exit {
                let reason = if mean_reversion_exit {
                    "mean reversion"
                } else {
                    "profit target"
                };
                self.close_pair(idx, price_a, price_b, z_medium, reason, signals);
            }
        }
    }
}

fn to_decimal(value: f64) -> rust_decimal::Decimal {
    rust_decimal::Decimal::from_f64_retain(value).unwrap_or_default()
}

impl Strategy for StatArbStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn initialize(&mut self) {
        for pair in &self.pairs {
            debug!(
                pair_a = %pair.def.symbol_a,
                pair_b = %pair.def.symbol_b,
                sector = %pair.def.sector,
                "initialized pair"
            );
        }
        info!(pairs = self.pairs.len(), "stat-arb trading pair universe");
    }

    fn configure(&mut self, params: &HashMap<String, String>) {
        let c = &mut self.config;
        c.entry_threshold = parse_param(params, "entry_threshold", c.entry_threshold);
        c.exit_threshold = parse_param(params, "exit_threshold", c.exit_threshold);
        c.profit_target_mult = parse_param(params, "profit_target_mult", c.profit_target_mult);
        c.trailing_stop_pct = parse_param(params, "trailing_stop_pct", c.trailing_stop_pct);
        c.stop_loss_pct = parse_param(params, "stop_loss_pct", c.stop_loss_pct);
        c.max_position_pct = parse_param(params, "max_position_pct", c.max_position_pct);
        c.max_sector_allocation =
            parse_param(params, "max_sector_allocation", c.max_sector_allocation);
        c.min_cash_reserve_pct =
            parse_param(params, "min_cash_reserve_pct", c.min_cash_reserve_pct);
        c.emergency_cash_pct = parse_param(params, "emergency_cash_pct", c.emergency_cash_pct);
        c.max_holding_hours = parse_param(params, "max_holding_hours", c.max_holding_hours);
        c.min_holding_minutes = parse_param(params, "min_holding_minutes", c.min_holding_minutes);

        let capital = parse_param(params, "total_capital", c.total_capital);
        if capital != c.total_capital && self.pairs.iter().all(|p| !p.is_open()) {
            c.total_capital = capital;
            self.available_cash = capital;
        }

        let short = parse_param(params, "short_lookback", c.short_lookback).max(2);
        let medium = parse_param(params, "medium_lookback", c.medium_lookback).max(2);
        let long = parse_param(params, "long_lookback", c.long_lookback).max(2);
        if short != c.short_lookback || medium != c.medium_lookback || long != c.long_lookback {
            c.short_lookback = short;
            c.medium_lookback = medium;
            c.long_lookback = long;
            let defs = self.pairs.iter().map(|p| p.def.clone()).collect();
            self.install_pairs(defs);
        }
    }

    fn process_tick(&mut self, tick: &Tick) -> Result<Vec<Signal>, StrategyError> {
        if !self.active_symbols.contains(&tick.symbol) {
            return Ok(Vec::new());
        }
        let price = tick.price.to_f64().ok_or_else(|| {
            StrategyError::Fault(format!("price {} not representable as f64", tick.price))
        })?;
        if price <= 0.0 {
            return Ok(Vec::new());
        }

        self.update_symbol(&tick.symbol, price);

        let mut signals = Vec::new();

        match self.last_cash_check {
            None => self.last_cash_check = Some(tick.timestamp),
            Some(last) if tick.timestamp - last >= self.config.cash_check_interval_us => {
                self.sweep_cash(&mut signals);
                self.last_cash_check = Some(tick.timestamp);
            }
            Some(_) => {}
        }

        let indices = self
            .pairs_by_symbol
            .get(&tick.symbol)
            .cloned()
            .unwrap_or_default();
        for idx in indices {
            self.process_pair(idx, tick.timestamp, &mut signals);
        }

        Ok(signals)
    }
}

/// The hardcoded cointegrated pair universe with explicit sector tags.
pub fn default_pairs() -> Vec<PairDef> {
    vec![
        PairDef::new("JPM", "BAC", "Financial"),
        PairDef::new("C", "WFC", "Financial"),
        PairDef::new("GS", "MS", "Financial"),
        PairDef::new("ITUB", "ITSA", "Financial"),
        PairDef::new("AAPL", "MSFT", "Technology"),
        PairDef::new("GOOGL", "FB", "Technology"),
        PairDef::new("AMD", "NVDA", "Technology"),
        PairDef::new("INTC", "TXN", "Technology"),
        PairDef::new("XOM", "CVX", "Energy"),
        PairDef::new("BP", "SHEL", "Energy"),
        PairDef::new("COP", "MRO", "Energy"),
        PairDef::new("SLB", "HAL", "Energy"),
        PairDef::new("VALE", "BHP", "Materials"),
        PairDef::new("GOLD", "NEM", "Materials"),
        PairDef::new("RIO", "SCCO", "Materials"),
        PairDef::new("PG", "CL", "Consumer"),
        PairDef::new("KO", "PEP", "Consumer"),
        PairDef::new("MO", "PM", "Consumer"),
        PairDef::new("WMT", "TGT", "Retail"),
        PairDef::new("HD", "LOW", "Retail"),
        PairDef::new("JNJ", "PFE", "Healthcare"),
        PairDef::new("MRK", "BMY", "Healthcare"),
        PairDef::new("ABBV", "LLY", "Healthcare"),
        PairDef::new("T", "VZ", "Telecommunications"),
        PairDef::new("TMUS", "VZ", "Telecommunications"),
        PairDef::new("F", "GM", "Automotive"),
        PairDef::new("TM", "NSANY", "Automotive"),
        PairDef::new("SPY", "IVV", "ETF"),
        PairDef::new("QQQ", "XLK", "ETF"),
        PairDef::new("XLE", "VDE", "ETF"),
    ]
}
