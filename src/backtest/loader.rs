//! Historical tick CSV loading.
//!
//! The expected layout is `time,symbol,market_center,price,size,...`
//! with a header row; only the time, symbol, price and size columns
//! are used and any trailing columns are ignored. Rows that fail to
//! parse are skipped, not fatal. Each surviving row gets a synthetic
//! monotonically increasing timestamp in file order, which lets the
//! rows be parsed in parallel batches and stably re-sorted afterwards
//! without losing the total order.

use rust_decimal::Decimal;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;
use tracing::info;

use super::BacktestError;
use crate::types::Tick;

/// Rows per parallel parse batch.
const PARSE_CHUNK: usize = 100_000;

/// Load ticks from `csv_path`. Returns the ticks, sorted by their
/// synthetic timestamps, plus the number of skipped rows. A missing or
/// unreadable file is fatal.
pub fn load_ticks_csv(csv_path: &Path) -> Result<(Vec<Tick>, usize), BacktestError> {
    let file = std::fs::File::open(csv_path)?;
    let reader = BufReader::new(file);

    let mut lines = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if i == 0 {
            continue; // header
        }
        lines.push(line);
    }

    let mut ticks: Vec<Option<Tick>> = vec![None; lines.len()];

    // Parse in parallel batches; the synthetic timestamp is the global
    // row index, so ordering survives the fan-out.
    std::thread::scope(|scope| {
        for (chunk_index, (chunk, out)) in lines
            .chunks(PARSE_CHUNK)
            .zip(ticks.chunks_mut(PARSE_CHUNK))
            .enumerate()
        {
            let base = chunk_index * PARSE_CHUNK;
            scope.spawn(move || {
                for (offset, line) in chunk.iter().enumerate() {
                    out[offset] = parse_row(line, (base + offset) as i64);
                }
            });
        }
    });

    let total = lines.len();
    let mut ticks: Vec<Tick> = ticks.into_iter().flatten().collect();
    let skipped = total - ticks.len();
    ticks.sort_by_key(|t| t.timestamp);

    info!(
        path = %csv_path.display(),
        rows = total,
        loaded = ticks.len(),
        skipped,
        "loaded historical ticks"
    );

    Ok((ticks, skipped))
}

/// Parse a single data row into a tick, or `None` when any required
/// field is missing, empty or malformed.
fn parse_row(line: &str, timestamp: i64) -> Option<Tick> {
    let mut fields = line.split(',');
    let time = fields.next()?.trim();
    let symbol = fields.next()?.trim();
    let _market_center = fields.next()?;
    let price = fields.next()?.trim();
    let size = fields.next()?.trim();

    if time.is_empty() || symbol.is_empty() || price.is_empty() || size.is_empty() {
        return None;
    }

    let price = Decimal::from_str(price).ok()?;
    if price <= Decimal::ZERO {
        return None;
    }
    let volume: u64 = size.parse().ok()?;

    Some(Tick::new(symbol, price, volume, timestamp))
}
