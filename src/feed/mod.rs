//! Price feed module
//!
//! Exchange tick ingestion and normalization into canonical, packed ticks.

mod binance;
mod normalize;
mod types;

pub use binance::{BinanceFeed, BINANCE_WS_URL};
pub use normalize::normalize;
pub use types::{CanonicalTick, FeedError, PackedTick, PriceObservation};

use async_trait::async_trait;
use tokio::sync::mpsc;

/// Trait for price feed implementations
#[async_trait]
pub trait PriceFeed: Send + Sync {
    /// Subscribe to all tracked symbols, merged into one stream of observations
    async fn subscribe(&self) -> anyhow::Result<mpsc::Receiver<PriceObservation>>;
}
