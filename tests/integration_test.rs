//! End-to-end pipeline scenarios: ticks in through the rings, fills
//! out through the observer, portfolio accounting checked at the end.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use coldstream::engine::{Engine, EngineConfig};
use coldstream::strategy::{Strategy, StrategyError};
use coldstream::types::{Fill, Signal, SignalKind, Tick};

/// Emits a scripted list of signal kinds, one entry per tick.
struct ScriptedStrategy {
    script: VecDeque<Vec<SignalKind>>,
}

impl ScriptedStrategy {
    fn new(script: Vec<Vec<SignalKind>>) -> Self {
        Self {
            script: script.into_iter().collect(),
        }
    }
}

impl Strategy for ScriptedStrategy {
    fn name(&self) -> &str {
        "Scripted"
    }

    fn process_tick(&mut self, tick: &Tick) -> Result<Vec<Signal>, StrategyError> {
        let kinds = self.script.pop_front().unwrap_or_default();
        Ok(kinds
            .into_iter()
            .map(|kind| Signal::new(&tick.symbol, kind, 1.0, tick.price))
            .collect())
    }
}

/// A strategy that fails on every tick.
struct FaultyStrategy;

impl Strategy for FaultyStrategy {
    fn name(&self) -> &str {
        "Faulty"
    }

    fn process_tick(&mut self, _tick: &Tick) -> Result<Vec<Signal>, StrategyError> {
        Err(StrategyError::Fault("synthetic failure".to_string()))
    }
}

fn collecting_observer(engine: &mut Engine) -> Arc<Mutex<Vec<Fill>>> {
    let fills: Arc<Mutex<Vec<Fill>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&fills);
    engine.set_order_observer(Box::new(move |fill: &Fill| {
        sink.lock().unwrap().push(fill.clone());
    }));
    fills
}

fn wait_for_fills(fills: &Mutex<Vec<Fill>>, count: usize) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while fills.lock().unwrap().len() < count {
        assert!(
            Instant::now() < deadline,
            "timed out waiting for {count} fills"
        );
        std::thread::sleep(Duration::from_millis(1));
    }
}

fn tick(symbol: &str, price: Decimal, ts: i64) -> Tick {
    Tick::new(symbol, price, 100, ts)
}

#[test]
fn buy_fill_accounting_through_the_pipeline() {
    let mut engine = Engine::new();
    engine
        .add_strategy(Box::new(ScriptedStrategy::new(vec![vec![SignalKind::Buy]])))
        .unwrap();
    engine.portfolio().write().unwrap().set_cash(dec!(1000));
    let fills = collecting_observer(&mut engine);

    engine.start(None, None).unwrap();
    engine.submit_tick(tick("X", dec!(10), 1));
    wait_for_fills(&fills, 1);
    engine.stop();

    // 10% of 1000 = 100 budget at price 10 => 10 shares.
    let fills = fills.lock().unwrap();
    assert_eq!(fills[0].quantity, 10);
    assert_eq!(fills[0].value, dec!(100));
    assert_eq!(fills[0].realized_pnl, None);

    let portfolio = engine.portfolio();
    let portfolio = portfolio.read().unwrap();
    assert_eq!(portfolio.cash(), dec!(900));
    assert_eq!(portfolio.position("X"), 10);
    assert_eq!(portfolio.position_cost("X"), dec!(100));
    assert_eq!(portfolio.total_value(), dec!(1000));
    assert_eq!(portfolio.trade_count(), 1);
}

#[test]
fn sell_fill_realizes_profit() {
    let mut engine = Engine::new();
    engine
        .add_strategy(Box::new(ScriptedStrategy::new(vec![
            vec![SignalKind::Buy],
            vec![SignalKind::Sell],
        ])))
        .unwrap();
    engine.portfolio().write().unwrap().set_cash(dec!(1000));
    let fills = collecting_observer(&mut engine);

    engine.start(None, None).unwrap();
    engine.submit_tick(tick("X", dec!(10), 1));
    wait_for_fills(&fills, 1);
    engine.submit_tick(tick("X", dec!(12), 2));
    wait_for_fills(&fills, 2);
    engine.stop();

    let fills = fills.lock().unwrap();
    assert_eq!(fills[1].quantity, 10);
    assert_eq!(fills[1].value, dec!(120));
    assert_eq!(fills[1].realized_pnl, Some(dec!(20)));

    let portfolio = engine.portfolio();
    let portfolio = portfolio.read().unwrap();
    assert_eq!(portfolio.cash(), dec!(1020));
    assert_eq!(portfolio.position("X"), 0);
    assert_eq!(portfolio.total_value(), dec!(1020));
    let last = portfolio.trade_log().last().unwrap().clone();
    assert_eq!(last.realized_pnl, Some(dec!(20)));
}

#[test]
fn exit_signal_flattens_position() {
    let mut engine = Engine::new();
    engine
        .add_strategy(Box::new(ScriptedStrategy::new(vec![
            vec![SignalKind::Buy],
            vec![SignalKind::Exit],
        ])))
        .unwrap();
    engine.portfolio().write().unwrap().set_cash(dec!(1000));
    let fills = collecting_observer(&mut engine);

    engine.start(None, None).unwrap();
    engine.submit_tick(tick("X", dec!(10), 1));
    wait_for_fills(&fills, 1);
    engine.submit_tick(tick("X", dec!(11), 2));
    wait_for_fills(&fills, 2);
    engine.stop();

    let portfolio = engine.portfolio();
    let portfolio = portfolio.read().unwrap();
    assert_eq!(portfolio.position("X"), 0);
    assert_eq!(portfolio.cash(), dec!(1010));
}

#[test]
fn fills_observed_in_application_order() {
    // One tick producing two buys: the observer must see them in
    // emission order.
    struct TwoBuys;
    impl Strategy for TwoBuys {
        fn name(&self) -> &str {
            "TwoBuys"
        }
        fn process_tick(&mut self, tick: &Tick) -> Result<Vec<Signal>, StrategyError> {
            Ok(vec![
                Signal::new("FIRST", SignalKind::Buy, 1.0, tick.price),
                Signal::new("SECOND", SignalKind::Buy, 1.0, tick.price),
            ])
        }
    }

    let mut engine = Engine::new();
    engine.add_strategy(Box::new(TwoBuys)).unwrap();
    engine.portfolio().write().unwrap().set_cash(dec!(1000));
    let fills = collecting_observer(&mut engine);

    engine.start(None, None).unwrap();
    engine.submit_tick(tick("X", dec!(10), 1));
    wait_for_fills(&fills, 2);
    engine.stop();

    let fills = fills.lock().unwrap();
    assert_eq!(fills[0].symbol, "FIRST");
    assert_eq!(fills[1].symbol, "SECOND");
}

#[test]
fn full_market_data_ring_drops_and_counts() {
    let mut engine = Engine::new();
    engine
        .configure(EngineConfig {
            market_data_queue_size: 2,
            ..EngineConfig::default()
        })
        .unwrap();

    // No consumer is running, so the third tick must be dropped.
    engine.submit_tick(tick("X", dec!(10), 1));
    engine.submit_tick(tick("X", dec!(10), 2));
    engine.submit_tick(tick("X", dec!(10), 3));

    assert_eq!(engine.queue_depths().0, 2);
    assert_eq!(engine.dropped_ticks(), 1);
}

#[test]
fn strategy_fault_skips_tick_but_keeps_strategy_active() {
    let mut engine = Engine::new();
    engine.add_strategy(Box::new(FaultyStrategy)).unwrap();
    let healthy = engine
        .add_strategy(Box::new(ScriptedStrategy::new(vec![
            vec![SignalKind::Buy],
            vec![SignalKind::Buy],
        ])))
        .unwrap();
    engine.portfolio().write().unwrap().set_cash(dec!(1000));
    let fills = collecting_observer(&mut engine);

    engine.start(None, None).unwrap();
    engine.submit_tick(tick("X", dec!(10), 1));
    engine.submit_tick(tick("Y", dec!(10), 2));
    wait_for_fills(&fills, 2);
    engine.stop();

    // The faulty strategy never killed the loop; both healthy fills
    // landed and the faulty strategy is still enabled.
    assert_eq!(fills.lock().unwrap().len(), 2);
    assert!(healthy.lock().unwrap().is_enabled());
    assert_eq!(engine.portfolio().read().unwrap().trade_count(), 2);
}

#[test]
fn backtest_is_idempotent_over_the_same_csv() {
    use coldstream::backtest::{load_ticks_csv, BacktestConfig, BacktestDriver};
    use coldstream::strategy::MeanReversionStrategy;
    use std::io::Write;

    let mut csv = String::from("Time,Symbol,Market Center,Price,Size\n");
    // A quiet stretch, a crash (buy) and a reversion (exit): enough to
    // open and close a position.
    for i in 0..30 {
        let price = 100.0 + ((i % 5) as f64) * 0.2;
        csv.push_str(&format!("09:30:{i:02},ACME,Q,{price:.2},100\n"));
    }
    csv.push_str("09:31:00,ACME,Q,92.00,100\n");
    for i in 0..10 {
        csv.push_str(&format!("09:31:{:02},ACME,Q,100.40,100\n", i + 1));
    }

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(csv.as_bytes()).unwrap();

    let run = || {
        let (ticks, _) = load_ticks_csv(file.path()).unwrap();
        let mut strategy = MeanReversionStrategy::with_params(20, 2.0, 0.5);
        let driver = BacktestDriver::new(BacktestConfig::with_capital(dec!(100_000)));
        driver.run(&mut strategy, &ticks).unwrap()
    };

    let first = run();
    let second = run();
    assert_eq!(first.fills, second.fills);
    assert_eq!(first.equity_curve, second.equity_curve);
    assert_eq!(first.metrics, second.metrics);
    assert!(!first.fills.is_empty(), "scenario should produce trades");
}
