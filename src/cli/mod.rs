//! CLI argument parsing using clap.
//!
//! One binary drives the three modes: a live session against a socket
//! feed (the default), a batch backtest over a historical CSV, and a
//! full-pipeline trade replay over the same CSV format.

use clap::Parser;

/// coldstream - low-latency market data trading engine
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// WebSocket endpoint delivering live tick messages
    #[arg(long, default_value = "ws://127.0.0.1:5555")]
    pub socket_endpoint: String,

    /// Starting cash balance
    #[arg(long, default_value_t = 100_000.0)]
    pub initial_balance: f64,

    /// Run a batch backtest: <STRATEGY_ID> <CSV_FILE>
    #[arg(long, num_args = 2, value_names = ["STRATEGY_ID", "CSV_FILE"])]
    pub backtest: Option<Vec<String>>,

    /// Run a trade replay through the full pipeline: <STRATEGY_ID> <CSV_FILE>
    #[arg(long, num_args = 2, value_names = ["STRATEGY_ID", "CSV_FILE"])]
    pub trade: Option<Vec<String>>,

    /// Configuration file (key = value; numeric keys map strategy ids)
    #[arg(long, default_value = "coldstream.conf")]
    pub config: String,

    /// Set the verbosity level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    pub verbose: String,
}

/// Resolved run mode.
#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    Live,
    Backtest { strategy_id: String, csv: String },
    Replay { strategy_id: String, csv: String },
}

impl Cli {
    /// Pick the mode from the mutually exclusive flags; `--backtest`
    /// wins over `--trade` if both are given.
    pub fn mode(&self) -> Mode {
        if let Some(args) = &self.backtest {
            return Mode::Backtest {
                strategy_id: args[0].clone(),
                csv: args[1].clone(),
            };
        }
        if let Some(args) = &self.trade {
            return Mode::Replay {
                strategy_id: args[0].clone(),
                csv: args[1].clone(),
            };
        }
        Mode::Live
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_mode_is_live() {
        let cli = Cli::parse_from(["coldstream"]);
        assert_eq!(cli.mode(), Mode::Live);
        assert_eq!(cli.socket_endpoint, "ws://127.0.0.1:5555");
        assert_eq!(cli.initial_balance, 100_000.0);
    }

    #[test]
    fn test_backtest_mode() {
        let cli = Cli::parse_from(["coldstream", "--backtest", "1", "data.csv"]);
        assert_eq!(
            cli.mode(),
            Mode::Backtest {
                strategy_id: "1".to_string(),
                csv: "data.csv".to_string()
            }
        );
    }

    #[test]
    fn test_trade_mode() {
        let cli = Cli::parse_from(["coldstream", "--trade", "2", "ticks.csv"]);
        assert_eq!(
            cli.mode(),
            Mode::Replay {
                strategy_id: "2".to_string(),
                csv: "ticks.csv".to_string()
            }
        );
    }

    #[test]
    fn test_backtest_requires_both_values() {
        assert!(Cli::try_parse_from(["coldstream", "--backtest", "1"]).is_err());
    }

    #[test]
    fn test_custom_balance_and_endpoint() {
        let cli = Cli::parse_from([
            "coldstream",
            "--socket-endpoint",
            "ws://feed:9000",
            "--initial-balance",
            "250000",
        ]);
        assert_eq!(cli.socket_endpoint, "ws://feed:9000");
        assert_eq!(cli.initial_balance, 250_000.0);
    }
}
