//! Live market data feed.
//!
//! Subscribes to a WebSocket endpoint delivering framed JSON messages
//! of the shape `{"Symbol": "AAPL", "Price": 150.25, "Size": 100}`.
//! Each frame becomes a tick stamped with the wall-clock microsecond
//! time of receipt; unparseable frames are skipped.

use async_trait::async_trait;
use chrono::Utc;
use futures_util::StreamExt;
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use crate::types::Tick;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("failed to connect to {endpoint}: {reason}")]
    Connect { endpoint: String, reason: String },
    #[error("transport error: {0}")]
    Transport(String),
}

/// A source of live ticks. Abstracting the transport keeps the live
/// command testable against scripted streams.
#[async_trait]
pub trait MarketStream: Send {
    /// Next tick, or `None` when the stream has ended cleanly.
    async fn next_tick(&mut self) -> Result<Option<Tick>, FeedError>;
}

#[derive(Debug, Deserialize)]
struct TickMessage {
    #[serde(rename = "Symbol")]
    symbol: String,
    #[serde(rename = "Price")]
    price: f64,
    #[serde(rename = "Size")]
    size: u64,
}

/// Parse one feed frame into a tick stamped with `timestamp`.
/// Returns `None` for malformed frames or non-positive prices.
pub fn parse_tick_message(text: &str, timestamp: i64) -> Option<Tick> {
    let message: TickMessage = serde_json::from_str(text).ok()?;
    if !(message.price > 0.0) {
        return None;
    }
    let price = Decimal::from_f64_retain(message.price)?;
    Some(Tick::new(message.symbol, price, message.size, timestamp))
}

/// WebSocket-backed market stream.
pub struct WebSocketFeed {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl WebSocketFeed {
    pub async fn connect(endpoint: &str) -> Result<Self, FeedError> {
        let (stream, _) = connect_async(endpoint)
            .await
            .map_err(|e| FeedError::Connect {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            })?;
        info!(endpoint, "connected to market data feed");
        Ok(Self { stream })
    }
}

#[async_trait]
impl MarketStream for WebSocketFeed {
    async fn next_tick(&mut self) -> Result<Option<Tick>, FeedError> {
        while let Some(message) = self.stream.next().await {
            match message {
                Ok(Message::Text(text)) => {
                    let now = Utc::now().timestamp_micros();
                    match parse_tick_message(&text, now) {
                        Some(tick) => return Ok(Some(tick)),
                        None => debug!("skipping unparseable feed frame"),
                    }
                }
                Ok(Message::Close(_)) => {
                    info!("market data feed closed");
                    return Ok(None);
                }
                Ok(_) => {} // ping/pong/binary frames ignored
                Err(e) => {
                    warn!(error = %e, "market data feed transport error");
                    return Err(FeedError::Transport(e.to_string()));
                }
            }
        }
        Ok(None)
    }
}
