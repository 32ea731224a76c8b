//! CSV Trade Log
//!
//! One row per applied fill under the header
//! `Time,Symbol,Side,Quantity,Price,Value,P&L,Z-Score`. Monetary
//! values carry two decimals, z-scores four, and the P&L column stays
//! blank on BUY rows. Fields containing commas, double quotes or
//! newlines are wrapped in double quotes with inner quotes doubled;
//! `parse_csv_line` reverses the escaping so a written log reads back
//! into the same records.

use rust_decimal::Decimal;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use crate::backtest::BacktestFill;
use crate::types::{Fill, OrderSide};

/// One line of the trade log.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeLogRow {
    /// Preformatted time column: wall-clock `HH:MM:SS` in live mode,
    /// the synthetic tick timestamp in backtests.
    pub time: String,
    pub symbol: String,
    pub side: OrderSide,
    pub quantity: i64,
    pub price: Decimal,
    pub value: Decimal,
    /// Blank on buys.
    pub realized_pnl: Option<Decimal>,
    pub z_score: f64,
}

impl TradeLogRow {
    pub fn csv_header() -> &'static str {
        "Time,Symbol,Side,Quantity,Price,Value,P&L,Z-Score"
    }

    pub fn from_fill(fill: &Fill) -> Self {
        Self {
            time: fill.timestamp.format("%H:%M:%S").to_string(),
            symbol: fill.symbol.clone(),
            side: fill.side,
            quantity: fill.quantity,
            price: fill.price,
            value: fill.value,
            realized_pnl: fill.realized_pnl,
            z_score: fill.z_score,
        }
    }

    pub fn from_backtest_fill(fill: &BacktestFill) -> Self {
        Self {
            time: fill.timestamp.to_string(),
            symbol: fill.symbol.clone(),
            side: fill.side,
            quantity: fill.quantity,
            price: fill.price,
            value: fill.value,
            realized_pnl: fill.realized_pnl,
            z_score: fill.z_score,
        }
    }

    pub fn to_csv_line(&self) -> String {
        let pnl = self
            .realized_pnl
            .map(|p| format!("{:.2}", p))
            .unwrap_or_default();
        format!(
            "{},{},{},{},{:.2},{:.2},{},{:.4}",
            escape_field(&self.time),
            escape_field(&self.symbol),
            self.side,
            self.quantity,
            self.price,
            self.value,
            pnl,
            self.z_score,
        )
    }

    /// Parse a data line written by `to_csv_line`. Returns `None` for
    /// the header, blank lines or malformed rows.
    pub fn parse_csv_line(line: &str) -> Option<Self> {
        let fields = split_csv_fields(line);
        if fields.len() != 8 {
            return None;
        }
        let side = match fields[2].as_str() {
            "BUY" => OrderSide::Buy,
            "SELL" => OrderSide::Sell,
            _ => return None,
        };
        let realized_pnl = if fields[6].is_empty() {
            None
        } else {
            Some(Decimal::from_str(&fields[6]).ok()?)
        };
        Some(Self {
            time: fields[0].clone(),
            symbol: fields[1].clone(),
            side,
            quantity: fields[3].parse().ok()?,
            price: Decimal::from_str(&fields[4]).ok()?,
            value: Decimal::from_str(&fields[5]).ok()?,
            realized_pnl,
            z_score: fields[7].parse().ok()?,
        })
    }
}

/// Quote a field when it contains a comma, double quote or newline,
/// doubling any inner quotes.
fn escape_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Split one CSV line into unescaped fields.
fn split_csv_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    current.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' => in_quotes = true,
            ',' if !in_quotes => {
                fields.push(std::mem::take(&mut current));
            }
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}

/// Buffered CSV writer that emits the header on creation.
pub struct TradeLogWriter {
    writer: BufWriter<File>,
}

impl TradeLogWriter {
    pub fn create(path: &Path) -> std::io::Result<Self> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        writeln!(writer, "{}", TradeLogRow::csv_header())?;
        Ok(Self { writer })
    }

    pub fn write_row(&mut self, row: &TradeLogRow) -> std::io::Result<()> {
        writeln!(self.writer, "{}", row.to_csv_line())
    }

    /// Append the end-of-run summary block and flush.
    pub fn write_summary(
        &mut self,
        initial_balance: Decimal,
        final_balance: Decimal,
    ) -> std::io::Result<()> {
        writeln!(self.writer)?;
        writeln!(self.writer, "Summary")?;
        writeln!(self.writer, "Initial Balance:,{:.2}", initial_balance)?;
        writeln!(self.writer, "Final Balance:,{:.2}", final_balance)?;
        writeln!(
            self.writer,
            "P&L:,{:.2}",
            final_balance - initial_balance
        )?;
        self.writer.flush()
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_row() -> TradeLogRow {
        TradeLogRow {
            time: "09:31:05".to_string(),
            symbol: "AAPL".to_string(),
            side: OrderSide::Sell,
            quantity: 10,
            price: dec!(12.00),
            value: dec!(120.00),
            realized_pnl: Some(dec!(20.00)),
            z_score: -2.1734,
        }
    }

    #[test]
    fn test_row_formatting() {
        let line = sample_row().to_csv_line();
        assert_eq!(line, "09:31:05,AAPL,SELL,10,12.00,120.00,20.00,-2.1734");
    }

    #[test]
    fn test_buy_row_has_blank_pnl() {
        let row = TradeLogRow {
            side: OrderSide::Buy,
            realized_pnl: None,
            ..sample_row()
        };
        let line = row.to_csv_line();
        assert_eq!(line, "09:31:05,AAPL,BUY,10,12.00,120.00,,-2.1734");
    }

    #[test]
    fn test_escaping_of_special_fields() {
        let row = TradeLogRow {
            symbol: "WEIRD,\"SYM\"".to_string(),
            ..sample_row()
        };
        let line = row.to_csv_line();
        assert!(line.contains("\"WEIRD,\"\"SYM\"\"\""));
        let parsed = TradeLogRow::parse_csv_line(&line).unwrap();
        assert_eq!(parsed.symbol, "WEIRD,\"SYM\"");
    }

    #[test]
    fn test_round_trip() {
        let row = sample_row();
        let parsed = TradeLogRow::parse_csv_line(&row.to_csv_line()).unwrap();
        assert_eq!(parsed, row);
    }

    #[test]
    fn test_header_does_not_parse_as_row() {
        assert!(TradeLogRow::parse_csv_line(TradeLogRow::csv_header()).is_none());
    }

    #[test]
    fn test_writer_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trades.csv");

        let rows = vec![
            TradeLogRow {
                side: OrderSide::Buy,
                realized_pnl: None,
                ..sample_row()
            },
            sample_row(),
        ];

        let mut writer = TradeLogWriter::create(&path).unwrap();
        for row in &rows {
            writer.write_row(row).unwrap();
        }
        writer.write_summary(dec!(100000), dec!(100020)).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with(TradeLogRow::csv_header()));
        assert!(contents.contains("Initial Balance:,100000.00"));

        let parsed: Vec<TradeLogRow> = contents
            .lines()
            .filter_map(TradeLogRow::parse_csv_line)
            .collect();
        assert_eq!(parsed, rows);
    }
}
