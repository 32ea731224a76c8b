//! Backtest command handler.
//!
//! Loads a historical tick CSV, replays it synchronously through the
//! selected strategy, logs the performance metrics and writes the
//! trade-log CSV plus a JSON results summary next to it.

use rust_decimal::Decimal;
use serde::Serialize;
use std::error::Error;
use std::path::Path;
use tracing::info;

use crate::backtest::{load_ticks_csv, BacktestConfig, BacktestDriver, PerformanceMetrics};
use crate::config::Config;
use crate::logging::{TradeLogRow, TradeLogWriter};
use crate::strategy::StrategyRegistry;

/// Backtest results in JSON-serializable form.
#[derive(Debug, Serialize)]
struct BacktestOutput<'a> {
    strategy: String,
    data_file: String,
    ticks_processed: usize,
    rows_skipped: usize,
    metrics: &'a PerformanceMetrics,
}

pub fn run(
    strategy_id: &str,
    csv: &str,
    initial_balance: f64,
    config: &Config,
) -> Result<(), Box<dyn Error>> {
    let registry = StrategyRegistry::with_builtins();
    let mut strategy = super::resolve_strategy(&registry, config, strategy_id)?;
    info!(strategy = strategy.name(), data = csv, "running backtest");

    let (ticks, skipped) = load_ticks_csv(Path::new(csv))?;

    let initial_capital = Decimal::from_f64_retain(initial_balance)
        .ok_or("initial balance is not a valid number")?;
    let driver = BacktestDriver::new(BacktestConfig::with_capital(initial_capital));
    let report = driver.run(strategy.as_mut(), &ticks)?;

    let m = &report.metrics;
    info!("--- Backtest Results ---");
    info!("Initial Capital: ${:.2}", m.initial_capital);
    info!("Final Capital:   ${:.2}", m.final_capital);
    info!(
        "Total Return:    ${:.2} ({:.2}%)",
        m.total_return, m.total_return_pct
    );
    info!("Annualized:      {:.2}%", m.annualized_return * 100.0);
    info!("Sharpe Ratio:    {:.2}", m.sharpe_ratio);
    info!(
        "Max Drawdown:    ${:.2} ({:.2}%)",
        m.max_drawdown, m.max_drawdown_pct
    );
    info!("Total Trades:    {}", m.total_trades);
    info!("Win Rate:        {:.2}%", m.win_rate * 100.0);
    info!("Profit Factor:   {:.2}", m.profit_factor);
    info!(
        "Streaks:         {} wins / {} losses",
        m.max_consecutive_wins, m.max_consecutive_losses
    );
    info!("------------------------");

    let trades_path = Path::new(csv).with_extension("trades.csv");
    let mut writer = TradeLogWriter::create(&trades_path)?;
    for fill in &report.fills {
        writer.write_row(&TradeLogRow::from_backtest_fill(fill))?;
    }
    writer.write_summary(
        initial_capital,
        Decimal::from_f64_retain(m.final_capital).unwrap_or(initial_capital),
    )?;
    info!(path = %trades_path.display(), "trade log written");

    let results_path = Path::new(csv).with_extension("results.json");
    let output = BacktestOutput {
        strategy: strategy.name().to_string(),
        data_file: csv.to_string(),
        ticks_processed: report.ticks_processed,
        rows_skipped: skipped,
        metrics: m,
    };
    std::fs::write(&results_path, serde_json::to_string_pretty(&output)?)?;
    info!(path = %results_path.display(), "results written");

    Ok(())
}
