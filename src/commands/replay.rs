//! Trade replay command handler.
//!
//! Drives the full two-thread pipeline with ticks streamed from a
//! historical CSV: same rings, same sizing, same execution path as a
//! live session, only the tick source differs. Fills are collected
//! from the order observer and written to the trade-log CSV at the
//! end.

use rust_decimal::Decimal;
use std::error::Error;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::info;

use crate::backtest::load_ticks_csv;
use crate::config::Config;
use crate::engine::Engine;
use crate::logging::{TradeLogRow, TradeLogWriter};
use crate::strategy::StrategyRegistry;
use crate::types::Fill;

/// Poll interval while waiting for the rings to drain.
const DRAIN_POLL: Duration = Duration::from_millis(5);

pub fn run(
    strategy_id: &str,
    csv: &str,
    initial_balance: f64,
    config: &Config,
) -> Result<(), Box<dyn Error>> {
    let registry = StrategyRegistry::with_builtins();
    let strategy = super::resolve_strategy(&registry, config, strategy_id)?;
    info!(strategy = strategy.name(), data = csv, "running trade replay");

    let (ticks, skipped) = load_ticks_csv(Path::new(csv))?;
    let tick_count = ticks.len();

    let initial_capital = Decimal::from_f64_retain(initial_balance)
        .ok_or("initial balance is not a valid number")?;

    let mut engine = Engine::new();
    engine.add_strategy(strategy)?;
    engine
        .portfolio()
        .write()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
        .set_cash(initial_capital);

    let fills: Arc<Mutex<Vec<Fill>>> = Arc::new(Mutex::new(Vec::new()));
    let observer_fills = Arc::clone(&fills);
    engine.set_order_observer(Box::new(move |fill: &Fill| {
        match fill.realized_pnl {
            Some(pnl) => info!(
                "{} {} {} @ ${:.2} | P&L: ${:.2}",
                fill.side, fill.quantity, fill.symbol, fill.price, pnl
            ),
            None => info!(
                "{} {} {} @ ${:.2}",
                fill.side, fill.quantity, fill.symbol, fill.price
            ),
        }
        observer_fills
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(fill.clone());
    }));

    // Strategy on core 0, execution on core 1 (best effort).
    engine.start(Some(0), Some(1))?;

    let md_capacity = engine.market_data_capacity();
    for tick in ticks {
        // Drop-on-full is the live contract; a replay prefers complete
        // delivery, so it waits for headroom instead.
        while engine.queue_depths().0 >= md_capacity {
            std::thread::sleep(DRAIN_POLL);
        }
        engine.submit_tick(tick);
    }

    // A batch can be in flight between the rings while both depths
    // read zero, so require the rings to stay empty for a while before
    // stopping.
    let mut quiet_polls = 0;
    while quiet_polls < 10 {
        if engine.queue_depths() == (0, 0) {
            quiet_polls += 1;
        } else {
            quiet_polls = 0;
        }
        std::thread::sleep(DRAIN_POLL);
    }
    engine.stop();

    let portfolio = engine.portfolio();
    let portfolio = portfolio
        .read()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    let final_balance = portfolio.total_value();
    let pnl = final_balance - initial_capital;

    info!("--- Replay Results ---");
    info!("Initial Balance: ${:.2}", initial_capital);
    info!("Final Balance:   ${:.2}", final_balance);
    info!("P&L:             ${:.2}", pnl);
    info!("Total Trades:    {}", portfolio.trade_count());
    info!(
        "Data Points:     {} ({} rows skipped, {} ticks dropped)",
        tick_count,
        skipped,
        engine.dropped_ticks()
    );
    info!("----------------------");

    let trades_path = Path::new(csv).with_extension("replay_trades.csv");
    let mut writer = TradeLogWriter::create(&trades_path)?;
    let fills = fills
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    for fill in fills.iter() {
        writer.write_row(&TradeLogRow::from_fill(fill))?;
    }
    writer.write_summary(initial_capital, final_balance)?;
    info!(path = %trades_path.display(), "trade log written");

    Ok(())
}
