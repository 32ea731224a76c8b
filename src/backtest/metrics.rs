//! Performance metrics over a completed backtest run.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;

use super::{BacktestFill, EquityPoint};

/// Aggregated results of a backtest.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceMetrics {
    pub initial_capital: f64,
    pub final_capital: f64,
    pub total_return: f64,
    pub total_return_pct: f64,
    pub annualized_return: f64,
    /// Mean over std of per-trade returns, annualised by sqrt(252).
    pub sharpe_ratio: f64,
    pub max_drawdown: f64,
    pub max_drawdown_pct: f64,
    pub total_trades: u64,
    pub winning_trades: u64,
    pub losing_trades: u64,
    pub win_rate: f64,
    pub profit_factor: f64,
    pub max_consecutive_wins: u32,
    pub max_consecutive_losses: u32,
}

impl PerformanceMetrics {
    pub fn compute(
        initial_capital: Decimal,
        final_capital: Decimal,
        fills: &[BacktestFill],
        equity_curve: &[EquityPoint],
        trading_days: u32,
    ) -> Self {
        let initial = initial_capital.to_f64().unwrap_or(0.0);
        let final_ = final_capital.to_f64().unwrap_or(0.0);
        let total_return = final_ - initial;
        let total_return_pct = if initial != 0.0 {
            total_return / initial * 100.0
        } else {
            0.0
        };

        let years = trading_days as f64 / 252.0;
        let annualized_return = if years > 0.0 && initial > 0.0 && final_ > 0.0 {
            (final_ / initial).powf(1.0 / years) - 1.0
        } else {
            0.0
        };

        // Per-trade returns come from closed (sell) fills.
        let mut returns: Vec<f64> = Vec::new();
        let mut gross_profit = 0.0;
        let mut gross_loss = 0.0;
        let mut winning_trades = 0u64;
        let mut losing_trades = 0u64;
        let mut consecutive_wins = 0u32;
        let mut consecutive_losses = 0u32;
        let mut max_consecutive_wins = 0u32;
        let mut max_consecutive_losses = 0u32;

        for fill in fills {
            let Some(pnl) = fill.realized_pnl else {
                continue;
            };
            let pnl = pnl.to_f64().unwrap_or(0.0);
            let value = fill.value.to_f64().unwrap_or(0.0);
            if value > 0.0 {
                returns.push(pnl / value);
            }
            if pnl > 0.0 {
                gross_profit += pnl;
                winning_trades += 1;
                consecutive_wins += 1;
                consecutive_losses = 0;
                max_consecutive_wins = max_consecutive_wins.max(consecutive_wins);
            } else {
                gross_loss += pnl.abs();
                losing_trades += 1;
                consecutive_losses += 1;
                consecutive_wins = 0;
                max_consecutive_losses = max_consecutive_losses.max(consecutive_losses);
            }
        }

        let closed = winning_trades + losing_trades;
        let win_rate = if closed > 0 {
            winning_trades as f64 / closed as f64
        } else {
            0.0
        };
        let profit_factor = if gross_loss > 0.0 {
            gross_profit / gross_loss
        } else {
            0.0
        };

        Self {
            initial_capital: initial,
            final_capital: final_,
            total_return,
            total_return_pct,
            annualized_return,
            sharpe_ratio: sharpe(&returns),
            max_drawdown: max_drawdown(equity_curve),
            max_drawdown_pct: if initial != 0.0 {
                max_drawdown(equity_curve) / initial * 100.0
            } else {
                0.0
            },
            total_trades: fills.len() as u64,
            winning_trades,
            losing_trades,
            win_rate,
            profit_factor,
            max_consecutive_wins,
            max_consecutive_losses,
        }
    }
}

/// Annualised Sharpe ratio of per-trade returns.
fn sharpe(returns: &[f64]) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }
    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean) * (r - mean)).sum::<f64>() / n;
    let std = variance.sqrt();
    if std <= 0.0 {
        return 0.0;
    }
    mean / std * 252f64.sqrt()
}

/// Largest peak-to-trough equity decline over the run, in dollars.
fn max_drawdown(equity_curve: &[EquityPoint]) -> f64 {
    let mut peak = f64::MIN;
    let mut max_dd = 0.0f64;
    for point in equity_curve {
        let equity = point.equity.to_f64().unwrap_or(0.0);
        if equity > peak {
            peak = equity;
        }
        max_dd = max_dd.max(peak - equity);
    }
    max_dd
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OrderSide;
    use rust_decimal_macros::dec;

    fn sell(pnl: Decimal, value: Decimal) -> BacktestFill {
        BacktestFill {
            timestamp: 0,
            symbol: "X".to_string(),
            side: OrderSide::Sell,
            quantity: 1,
            price: dec!(1),
            value,
            realized_pnl: Some(pnl),
            z_score: 0.0,
        }
    }

    fn equity(points: &[(i64, Decimal)]) -> Vec<EquityPoint> {
        points
            .iter()
            .map(|(ts, e)| EquityPoint {
                timestamp: *ts,
                equity: *e,
            })
            .collect()
    }

    #[test]
    fn test_total_and_annualized_return() {
        let m = PerformanceMetrics::compute(dec!(1000), dec!(1100), &[], &[], 252);
        assert!((m.total_return - 100.0).abs() < 1e-9);
        assert!((m.total_return_pct - 10.0).abs() < 1e-9);
        // One 252-day year: annualized equals total ratio - 1.
        assert!((m.annualized_return - 0.10).abs() < 1e-9);
    }

    #[test]
    fn test_win_rate_and_profit_factor() {
        let fills = vec![
            sell(dec!(30), dec!(130)),
            sell(dec!(-10), dec!(90)),
            sell(dec!(20), dec!(120)),
        ];
        let m = PerformanceMetrics::compute(dec!(1000), dec!(1040), &fills, &[], 252);
        assert_eq!(m.winning_trades, 2);
        assert_eq!(m.losing_trades, 1);
        assert!((m.win_rate - 2.0 / 3.0).abs() < 1e-12);
        assert!((m.profit_factor - 5.0).abs() < 1e-12);
        assert_eq!(m.total_trades, 3);
    }

    #[test]
    fn test_consecutive_win_loss_streaks() {
        let fills = vec![
            sell(dec!(1), dec!(10)),
            sell(dec!(1), dec!(10)),
            sell(dec!(1), dec!(10)),
            sell(dec!(-1), dec!(10)),
            sell(dec!(-1), dec!(10)),
            sell(dec!(2), dec!(10)),
        ];
        let m = PerformanceMetrics::compute(dec!(100), dec!(103), &fills, &[], 252);
        assert_eq!(m.max_consecutive_wins, 3);
        assert_eq!(m.max_consecutive_losses, 2);
    }

    #[test]
    fn test_max_drawdown_tracks_running_peak() {
        let curve = equity(&[
            (0, dec!(1000)),
            (1, dec!(1200)),
            (2, dec!(900)),
            (3, dec!(1100)),
            (4, dec!(950)),
        ]);
        let m = PerformanceMetrics::compute(dec!(1000), dec!(950), &[], &curve, 252);
        assert!((m.max_drawdown - 300.0).abs() < 1e-9);
        assert!((m.max_drawdown_pct - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_sharpe_zero_for_uniform_returns() {
        // All identical returns: zero deviation, Sharpe defined as 0.
        let fills = vec![sell(dec!(10), dec!(100)), sell(dec!(10), dec!(100))];
        let m = PerformanceMetrics::compute(dec!(1000), dec!(1020), &fills, &[], 252);
        assert_eq!(m.sharpe_ratio, 0.0);
    }

    #[test]
    fn test_buys_do_not_count_as_closed_trades() {
        let buy = BacktestFill {
            timestamp: 0,
            symbol: "X".to_string(),
            side: OrderSide::Buy,
            quantity: 1,
            price: dec!(1),
            value: dec!(1),
            realized_pnl: None,
            z_score: 0.0,
        };
        let m = PerformanceMetrics::compute(dec!(100), dec!(100), &[buy], &[], 252);
        assert_eq!(m.total_trades, 1);
        assert_eq!(m.winning_trades + m.losing_trades, 0);
        assert_eq!(m.win_rate, 0.0);
    }
}
