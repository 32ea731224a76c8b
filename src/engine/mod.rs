//! The tick-to-order pipeline.
//!
//! The engine owns two bounded SPSC rings and two worker threads. The
//! strategy thread drains the market-data ring, fans each tick out to
//! every enabled strategy, sizes the resulting signals against the
//! portfolio and pushes orders. The execution thread drains the order
//! ring, applies fills to the portfolio and notifies the observer.
//!
//! Back-pressure is drop-on-full at both rings: a full ring costs a
//! counted drop, never a stall. Position sizing lives here rather than
//! in the strategies, which keeps strategies pure signal generators and
//! makes the engine the only hot-path reader of the portfolio.

mod affinity;
mod ring;

pub use ring::BoundedRing;

use chrono::Utc;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::thread::JoinHandle;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::portfolio::Portfolio;
use crate::strategy::Strategy;
use crate::types::{Fill, Order, OrderSide, Signal, SignalKind, Tick};

/// Drops between capacity warnings; intermediate drops log at debug.
const DROP_LOG_INTERVAL: u64 = 1_000;

/// A strategy handle shared between the registration site and the
/// engine. Only the strategy thread takes the lock on the hot path, so
/// it is effectively uncontended.
pub type SharedStrategy = Arc<Mutex<Box<dyn Strategy + Send>>>;

/// Callback invoked on the execution thread after each applied fill.
/// Must be fast and non-blocking.
pub type OrderObserver = dyn Fn(&Fill) + Send + Sync;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("engine is already running")]
    AlreadyRunning,
    #[error("operation requires a stopped engine")]
    Running,
    #[error("queue capacity must be positive")]
    InvalidQueueSize,
    #[error("failed to spawn {0} thread: {1}")]
    ThreadSpawn(&'static str, std::io::Error),
}

/// Engine tuning parameters. Queue capacities are fixed once the
/// engine has started.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub market_data_queue_size: usize,
    pub order_queue_size: usize,
    /// Items drained from a ring per batch before re-checking the
    /// running flag.
    pub batch_size: usize,
    /// Fraction of available cash committed per BUY signal.
    pub buy_cash_fraction: Decimal,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            market_data_queue_size: 31_000,
            order_queue_size: 5_000,
            batch_size: 1_000,
            buy_cash_fraction: dec!(0.10),
        }
    }
}

pub struct Engine {
    config: EngineConfig,
    strategies: Vec<SharedStrategy>,
    portfolio: Arc<RwLock<Portfolio>>,
    market_data: Arc<BoundedRing<Tick>>,
    orders: Arc<BoundedRing<Order>>,
    running: Arc<AtomicBool>,
    dropped_ticks: Arc<AtomicU64>,
    dropped_orders: Arc<AtomicU64>,
    observer: Option<Arc<OrderObserver>>,
    strategy_handle: Option<JoinHandle<()>>,
    execution_handle: Option<JoinHandle<()>>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            market_data: Arc::new(BoundedRing::with_capacity(
                config.market_data_queue_size.max(1),
            )),
            orders: Arc::new(BoundedRing::with_capacity(config.order_queue_size.max(1))),
            config,
            strategies: Vec::new(),
            portfolio: Arc::new(RwLock::new(Portfolio::new())),
            running: Arc::new(AtomicBool::new(false)),
            dropped_ticks: Arc::new(AtomicU64::new(0)),
            dropped_orders: Arc::new(AtomicU64::new(0)),
            observer: None,
            strategy_handle: None,
            execution_handle: None,
        }
    }

    /// Replace the tuning parameters, rebuilding the rings. Fails once
    /// the engine has started.
    pub fn configure(&mut self, config: EngineConfig) -> Result<(), EngineError> {
        if self.running.load(Ordering::Acquire) {
            return Err(EngineError::Running);
        }
        if config.market_data_queue_size == 0 || config.order_queue_size == 0 {
            return Err(EngineError::InvalidQueueSize);
        }
        self.market_data = Arc::new(BoundedRing::with_capacity(config.market_data_queue_size));
        self.orders = Arc::new(BoundedRing::with_capacity(config.order_queue_size));
        self.config = config;
        Ok(())
    }

    /// Register a strategy for this run. Returns the shared handle so
    /// the caller can keep observing it. Fails once started.
    pub fn add_strategy(
        &mut self,
        strategy: Box<dyn Strategy + Send>,
    ) -> Result<SharedStrategy, EngineError> {
        if self.running.load(Ordering::Acquire) {
            return Err(EngineError::Running);
        }
        let shared: SharedStrategy = Arc::new(Mutex::new(strategy));
        self.strategies.push(Arc::clone(&shared));
        Ok(shared)
    }

    /// Names of the registered strategies, in registration order.
    pub fn strategy_names(&self) -> Vec<String> {
        self.strategies
            .iter()
            .map(|s| lock_strategy(s).name().to_string())
            .collect()
    }

    pub fn portfolio(&self) -> Arc<RwLock<Portfolio>> {
        Arc::clone(&self.portfolio)
    }

    /// Store the fill observer. Must be called before `start`.
    pub fn set_order_observer(&mut self, observer: Box<OrderObserver>) {
        self.observer = Some(Arc::from(observer));
    }

    /// Offer one tick to the pipeline. Never blocks; a full ring drops
    /// the tick and bumps the drop counter.
    pub fn submit_tick(&self, tick: Tick) {
        if let Err(tick) = self.market_data.try_push(tick) {
            let dropped = self.dropped_ticks.fetch_add(1, Ordering::Relaxed) + 1;
            if dropped == 1 || dropped % DROP_LOG_INTERVAL == 0 {
                warn!(
                    symbol = %tick.symbol,
                    dropped,
                    "market data ring full, dropping ticks"
                );
            } else {
                debug!(symbol = %tick.symbol, "market data ring full, tick dropped");
            }
        }
    }

    /// Submit a batch of ticks. The submit step itself is serialised
    /// by the single-producer contract of the ring.
    pub fn submit_batch(&self, ticks: Vec<Tick>) {
        for tick in ticks {
            self.submit_tick(tick);
        }
    }

    /// Buffered item counts for the market-data and order rings.
    /// Approximate while the pipeline is running.
    pub fn queue_depths(&self) -> (usize, usize) {
        (self.market_data.len(), self.orders.len())
    }

    pub fn market_data_capacity(&self) -> usize {
        self.market_data.capacity()
    }

    pub fn dropped_ticks(&self) -> u64 {
        self.dropped_ticks.load(Ordering::Relaxed)
    }

    pub fn dropped_orders(&self) -> u64 {
        self.dropped_orders.load(Ordering::Relaxed)
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Spawn the strategy and execution threads, optionally pinning
    /// each to a CPU core (best effort, non-fatal).
    pub fn start(
        &mut self,
        strategy_core: Option<usize>,
        execution_core: Option<usize>,
    ) -> Result<(), EngineError> {
        if self.running.swap(true, Ordering::AcqRel) {
            warn!("engine already running");
            return Err(EngineError::AlreadyRunning);
        }

        for strategy in &self.strategies {
            lock_strategy(strategy).initialize();
        }

        let strategy_ctx = StrategyLoop {
            running: Arc::clone(&self.running),
            market_data: Arc::clone(&self.market_data),
            orders: Arc::clone(&self.orders),
            portfolio: Arc::clone(&self.portfolio),
            strategies: self.strategies.clone(),
            dropped_orders: Arc::clone(&self.dropped_orders),
            batch_size: self.config.batch_size.max(1),
            buy_cash_fraction: self.config.buy_cash_fraction,
        };
        let execution_ctx = ExecutionLoop {
            running: Arc::clone(&self.running),
            orders: Arc::clone(&self.orders),
            portfolio: Arc::clone(&self.portfolio),
            observer: self.observer.clone(),
            batch_size: self.config.batch_size.max(1),
        };

        let strategy_handle = std::thread::Builder::new()
            .name("cs-strategy".into())
            .spawn(move || {
                if let Some(core) = strategy_core {
                    affinity::pin_current_thread(core);
                }
                strategy_ctx.run();
            })
            .map_err(|e| {
                self.running.store(false, Ordering::Release);
                EngineError::ThreadSpawn("strategy", e)
            })?;

        let execution_handle = std::thread::Builder::new()
            .name("cs-execution".into())
            .spawn(move || {
                if let Some(core) = execution_core {
                    affinity::pin_current_thread(core);
                }
                execution_ctx.run();
            })
            .map_err(|e| {
                self.running.store(false, Ordering::Release);
                EngineError::ThreadSpawn("execution", e)
            })?;

        self.strategy_handle = Some(strategy_handle);
        self.execution_handle = Some(execution_handle);
        info!("engine started");
        Ok(())
    }

    /// Stop the pipeline: clear the running flag, join both threads,
    /// then run strategy shutdown hooks. Idempotent; outstanding ring
    /// items are discarded while applied fills persist.
    pub fn stop(&mut self) {
        if !self.running.swap(false, Ordering::AcqRel) {
            return;
        }
        if let Some(handle) = self.strategy_handle.take() {
            if handle.join().is_err() {
                error!("strategy thread panicked");
            }
        }
        if let Some(handle) = self.execution_handle.take() {
            if handle.join().is_err() {
                error!("execution thread panicked");
            }
        }
        for strategy in &self.strategies {
            lock_strategy(strategy).shutdown();
        }
        info!("engine stopped");
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.stop();
    }
}

/// A poisoned strategy mutex means the strategy panicked mid-tick; the
/// fault policy keeps the strategy active, so the poison is discarded.
fn lock_strategy(strategy: &SharedStrategy) -> std::sync::MutexGuard<'_, Box<dyn Strategy + Send>> {
    strategy
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}

fn read_portfolio(portfolio: &RwLock<Portfolio>) -> std::sync::RwLockReadGuard<'_, Portfolio> {
    portfolio
        .read()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}

fn write_portfolio(portfolio: &RwLock<Portfolio>) -> std::sync::RwLockWriteGuard<'_, Portfolio> {
    portfolio
        .write()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}

/// Translate a signal into a sized order against the current portfolio
/// snapshot, or `None` when the signal cannot produce a viable order.
pub(crate) fn signal_to_order(
    portfolio: &RwLock<Portfolio>,
    signal: &Signal,
    buy_cash_fraction: Decimal,
) -> Option<Order> {
    if signal.price <= Decimal::ZERO {
        debug!(symbol = %signal.symbol, "signal with non-positive price ignored");
        return None;
    }

    let order = match signal.kind {
        SignalKind::Neutral => None,
        SignalKind::Buy => {
            let cash = read_portfolio(portfolio).cash();
            let budget = cash * buy_cash_fraction;
            let quantity = (budget / signal.price).floor().to_i64().unwrap_or(0);
            if quantity > 0 {
                Some(Order::market(&signal.symbol, OrderSide::Buy, quantity, signal.price))
            } else {
                debug!(symbol = %signal.symbol, "buy signal sized to zero, dropped");
                None
            }
        }
        SignalKind::Sell => {
            let held = read_portfolio(portfolio).position(&signal.symbol);
            if held > 0 {
                Some(Order::market(&signal.symbol, OrderSide::Sell, held, signal.price))
            } else {
                None
            }
        }
        SignalKind::Exit => {
            let held = read_portfolio(portfolio).position(&signal.symbol);
            match held.cmp(&0) {
                std::cmp::Ordering::Greater => {
                    Some(Order::market(&signal.symbol, OrderSide::Sell, held, signal.price))
                }
                std::cmp::Ordering::Less => {
                    Some(Order::market(&signal.symbol, OrderSide::Buy, -held, signal.price))
                }
                std::cmp::Ordering::Equal => None,
            }
        }
    };

    order.map(|o| o.with_z_score(signal.z_score))
}

/// Apply one order to the portfolio, returning the fill when anything
/// executed. Buys require full cash cover; sells are truncated to the
/// held position (partial fill) and silently dropped when flat.
pub(crate) fn apply_order(portfolio: &RwLock<Portfolio>, order: &Order) -> Option<Fill> {
    match order.side {
        OrderSide::Buy => {
            let mut pf = write_portfolio(portfolio);
            let cost = order.total_value();
            if pf.cash() < cost {
                warn!(
                    symbol = %order.symbol,
                    cost = %cost,
                    cash = %pf.cash(),
                    "insufficient cash for order"
                );
                return None;
            }
            pf.reduce_cash(cost);
            pf.add_position(&order.symbol, order.quantity, cost);
            drop(pf);
            Some(Fill {
                symbol: order.symbol.clone(),
                side: OrderSide::Buy,
                quantity: order.quantity,
                price: order.price,
                value: cost,
                realized_pnl: None,
                z_score: order.z_score,
                timestamp: Utc::now(),
            })
        }
        OrderSide::Sell => {
            let mut pf = write_portfolio(portfolio);
            let held = pf.position(&order.symbol);
            if held == 0 {
                debug!(symbol = %order.symbol, "sell with no position ignored");
                return None;
            }
            let quantity = held.min(order.quantity);
            if quantity < order.quantity {
                info!(
                    symbol = %order.symbol,
                    requested = order.quantity,
                    available = held,
                    "partial position, selling available shares"
                );
            }
            let average_cost = pf.average_cost(&order.symbol);
            let proceeds = order.price * Decimal::from(quantity);
            pf.reduce_position(&order.symbol, quantity, order.price);
            pf.add_cash(proceeds);
            drop(pf);
            Some(Fill {
                symbol: order.symbol.clone(),
                side: OrderSide::Sell,
                quantity,
                price: order.price,
                value: proceeds,
                realized_pnl: Some(Decimal::from(quantity) * (order.price - average_cost)),
                z_score: order.z_score,
                timestamp: Utc::now(),
            })
        }
    }
}

struct StrategyLoop {
    running: Arc<AtomicBool>,
    market_data: Arc<BoundedRing<Tick>>,
    orders: Arc<BoundedRing<Order>>,
    portfolio: Arc<RwLock<Portfolio>>,
    strategies: Vec<SharedStrategy>,
    dropped_orders: Arc<AtomicU64>,
    batch_size: usize,
    buy_cash_fraction: Decimal,
}

impl StrategyLoop {
    fn run(self) {
        debug!("strategy thread started");
        let mut batch: Vec<Tick> = Vec::with_capacity(self.batch_size);

        while self.running.load(Ordering::Acquire) {
            batch.clear();
            while batch.len() < self.batch_size {
                match self.market_data.try_pop() {
                    Some(tick) => batch.push(tick),
                    None => break,
                }
            }

            if batch.is_empty() {
                std::thread::yield_now();
                continue;
            }

            for tick in &batch {
                self.process_tick(tick);
            }
        }
        debug!("strategy thread exiting");
    }

    fn process_tick(&self, tick: &Tick) {
        for strategy in &self.strategies {
            let mut guard = lock_strategy(strategy);
            if !guard.is_enabled() {
                continue;
            }
            let signals = match guard.process_tick(tick) {
                Ok(signals) => signals,
                Err(err) => {
                    warn!(
                        strategy = guard.name(),
                        symbol = %tick.symbol,
                        %err,
                        "strategy error, tick skipped"
                    );
                    continue;
                }
            };
            drop(guard);

            for signal in signals {
                let Some(order) =
                    signal_to_order(&self.portfolio, &signal, self.buy_cash_fraction)
                else {
                    continue;
                };
                if let Err(order) = self.orders.try_push(order) {
                    let dropped = self.dropped_orders.fetch_add(1, Ordering::Relaxed) + 1;
                    if dropped == 1 || dropped % DROP_LOG_INTERVAL == 0 {
                        warn!(symbol = %order.symbol, dropped, "order ring full, dropping orders");
                    } else {
                        debug!(symbol = %order.symbol, "order ring full, order dropped");
                    }
                }
            }
        }
    }
}

struct ExecutionLoop {
    running: Arc<AtomicBool>,
    orders: Arc<BoundedRing<Order>>,
    portfolio: Arc<RwLock<Portfolio>>,
    observer: Option<Arc<OrderObserver>>,
    batch_size: usize,
}

impl ExecutionLoop {
    fn run(self) {
        debug!("execution thread started");
        let mut batch: Vec<Order> = Vec::with_capacity(self.batch_size);

        while self.running.load(Ordering::Acquire) {
            batch.clear();
            while batch.len() < self.batch_size {
                match self.orders.try_pop() {
                    Some(order) => batch.push(order),
                    None => break,
                }
            }

            if batch.is_empty() {
                std::thread::yield_now();
                continue;
            }

            for order in &batch {
                if let Some(fill) = apply_order(&self.portfolio, order) {
                    if let Some(observer) = &self.observer {
                        observer(&fill);
                    }
                }
            }
        }
        debug!("execution thread exiting");
    }
}
