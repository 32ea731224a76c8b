//! Trade Recording
//!
//! Writes applied fills to a CSV trade log. Suitable for post-run
//! analysis of both live sessions and backtests.

pub mod trade_log;

pub use trade_log::{TradeLogRow, TradeLogWriter};
