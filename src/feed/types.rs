//! Price feed types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::codec::CodecError;

/// A single raw trade observation from an exchange feed
#[derive(Debug, Clone)]
pub struct PriceObservation {
    /// Trading symbol as reported by the exchange (e.g., "BTCUSDT")
    pub symbol: String,
    /// Reported trade price
    pub price: Decimal,
    /// Exchange event time in milliseconds
    pub event_time_millis: i64,
    /// Local timestamp when the tick was received
    pub received_at: DateTime<Utc>,
}

/// Observation reduced to whole seconds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalTick {
    pub symbol: String,
    pub price: Decimal,
    pub timestamp_secs: u64,
}

/// Canonical tick with price and timestamp packed into fixed-width big-endian bytes
///
/// `price_value` and `timestamp_secs` are always the decoded form of the
/// packed bytes, so every consumer sees the same integers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedTick {
    pub symbol: String,
    pub price_value: u32,
    pub timestamp_secs: u64,
    pub price_bytes: [u8; 4],
    pub timestamp_bytes: [u8; 8],
}

/// Errors produced while turning raw feed payloads into ticks
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("malformed tick payload: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("unexpected event type {0:?}")]
    UnexpectedEvent(String),
    #[error("negative event time {0}")]
    NegativeTimestamp(i64),
    #[error("negative price {0}")]
    NegativePrice(Decimal),
    #[error("price {0} cannot be packed: {1}")]
    Unpackable(Decimal, CodecError),
}
