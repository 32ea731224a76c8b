//! Live trading command handler.
//!
//! Connects to the market data socket, feeds ticks into the engine
//! until the stream ends, Ctrl+C arrives or the portfolio runs out of
//! funds, then writes the session's trade log and a summary.

use rust_decimal::Decimal;
use std::error::Error;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

use crate::config::Config;
use crate::engine::Engine;
use crate::feed::{MarketStream, WebSocketFeed};
use crate::logging::{TradeLogRow, TradeLogWriter};
use crate::strategy::StrategyRegistry;
use crate::types::Fill;

const TRADES_FILE: &str = "coldstream_trades.csv";

pub async fn run(
    endpoint: &str,
    initial_balance: f64,
    config: &Config,
) -> Result<(), Box<dyn Error>> {
    let registry = StrategyRegistry::with_builtins();

    let mut mappings = config.strategy_mappings();
    if mappings.is_empty() {
        mappings.insert(1, "MeanReversion".to_string());
    }

    let initial_capital = Decimal::from_f64_retain(initial_balance)
        .ok_or("initial balance is not a valid number")?;

    let mut engine = Engine::new();
    for name in mappings.values() {
        let mut strategy = registry
            .create(name)
            .ok_or_else(|| format!("unknown strategy '{name}' (known: {:?})", registry.names()))?;
        strategy.configure(config.values());
        info!(strategy = %name, "loaded strategy");
        engine.add_strategy(strategy)?;
    }
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
                "{} {} {} @ ${:.2} | Z: {:.4} | P&L: ${:.2}",
                fill.side, fill.quantity, fill.symbol, fill.price, fill.z_score, pnl
            ),
            None => info!(
                "{} {} {} @ ${:.2} | Z: {:.4}",
                fill.side, fill.quantity, fill.symbol, fill.price, fill.z_score
            ),
        }
        observer_fills
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(fill.clone());
    }));

    // Strategy on core 0, execution on core 1 (best effort).
    engine.start(Some(0), Some(1))?;
    info!(balance = %initial_capital, "live session started, press Ctrl+C to stop");

    let mut feed = WebSocketFeed::connect(endpoint).await?;
    let mut data_count = 0u64;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("interrupt received, stopping session");
                break;
            }
            tick = feed.next_tick() => {
                match tick {
                    Ok(Some(tick)) => {
                        engine.submit_tick(tick);
                        data_count += 1;

                        let cash = engine
                            .portfolio()
                            .read()
                            .unwrap_or_else(std::sync::PoisonError::into_inner)
                            .cash();
                        if cash <= Decimal::ZERO {
                            warn!("out of funds, stopping session");
                            break;
                        }
                    }
                    Ok(None) => {
                        info!("feed ended");
                        break;
                    }
                    Err(e) => {
                        warn!(error = %e, "feed failure, stopping session");
                        break;
                    }
                }
            }
        }
    }

    engine.stop();

    let portfolio = engine.portfolio();
    let portfolio = portfolio
        .read()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    let final_balance = portfolio.total_value();
    let pnl = final_balance - initial_capital;

    info!("--- Session Results ---");
    info!("Initial Balance: ${:.2}", initial_capital);
    info!("Final Balance:   ${:.2}", final_balance);
    info!("P&L:             ${:.2}", pnl);
    info!("Total Trades:    {}", portfolio.trade_count());
    info!(
        "Data Points:     {} ({} dropped)",
        data_count,
        engine.dropped_ticks()
    );
    info!("-----------------------");

    let mut writer = TradeLogWriter::create(Path::new(TRADES_FILE))?;
    let fills = fills
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    for fill in fills.iter() {
        writer.write_row(&TradeLogRow::from_fill(fill))?;
    }
    writer.write_summary(initial_capital, final_balance)?;
    info!(path = TRADES_FILE, "trade log written");

    Ok(())
}
