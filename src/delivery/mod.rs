//! Delivery channel
//!
//! Fire-and-forget delivery of encoded relay messages to the consensus
//! application's local endpoint. Delivery is at most once: failures are
//! reported to the caller and never retried.

mod consensus;
mod memory;

pub use consensus::{ConsensusChannel, ConsensusChannelConfig};
pub use memory::MemorySink;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::ws::WsError;

/// Delivery errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    #[error("delivery channel closed")]
    Closed,
    #[error("transport error: {0}")]
    Transport(#[from] WsError),
    #[error("no send confirmation within {0:?}")]
    Timeout(Duration),
}

/// Destination for encoded relay messages
#[async_trait]
pub trait MessageSink: Send + Sync {
    /// Send one encoded message; resolves with the transport-level result
    async fn deliver(&self, payload: Vec<u8>) -> Result<(), DeliveryError>;
}
