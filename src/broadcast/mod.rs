//! Broadcast gate
//!
//! Decides whether this relay instance also submits accepted price updates
//! to the network as transactions, and performs that submission after a
//! fixed delay on its own task. Submissions are never retried or cancelled.

mod rpc;
mod types;

pub use rpc::RpcBroadcaster;
pub use types::{BroadcastError, BroadcastMode, NodeRole};

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::message::PriceUpdate;
use crate::telemetry::{self, CounterMetric};

/// Network transaction submission
#[async_trait]
pub trait TxSubmitter: Send + Sync {
    /// Submit one serialized transaction
    async fn submit(&self, tx: &[u8]) -> Result<(), BroadcastError>;
}

/// Role-gated, delayed broadcaster
pub struct BroadcastGate {
    role: NodeRole,
    delay: Duration,
    submitter: Arc<dyn TxSubmitter>,
}

impl BroadcastGate {
    pub fn new(role: NodeRole, delay: Duration, submitter: Arc<dyn TxSubmitter>) -> Self {
        Self {
            role,
            delay,
            submitter,
        }
    }

    pub fn role(&self) -> NodeRole {
        self.role
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule a delayed broadcast of `update` if this instance is the broadcaster
    pub fn schedule(&self, update: PriceUpdate) -> Option<JoinHandle<()>> {
        if !self.role.is_broadcaster() {
            return None;
        }

        let delay = self.delay;
        let submitter = self.submitter.clone();

        Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            let tx = match update.encode_transaction() {
                Ok(tx) => tx,
                Err(e) => {
                    tracing::error!(feed = %update.feed_key, error = %e, "Failed to encode transaction");
                    return;
                }
            };

            tracing::info!(
                feed = %update.feed_key,
                value = update.value,
                timestamp = update.timestamp_secs,
                "Broadcasting price transaction"
            );

            match submitter.submit(&tx).await {
                Ok(()) => telemetry::increment(CounterMetric::Broadcasts),
                Err(e) => {
                    telemetry::increment(CounterMetric::BroadcastFailures);
                    tracing::error!(feed = %update.feed_key, error = %e, "Broadcast failed");
                }
            }
        }))
    }
}
