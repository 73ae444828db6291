//! In-memory message sink

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{DeliveryError, MessageSink};

/// Records delivered payloads instead of sending them
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    delivered: Arc<RwLock<Vec<Vec<u8>>>>,
    fail_with: Option<DeliveryError>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose every delivery fails with `error`
    pub fn failing(error: DeliveryError) -> Self {
        Self {
            delivered: Arc::default(),
            fail_with: Some(error),
        }
    }

    /// Payloads delivered so far, in order
    pub async fn delivered(&self) -> Vec<Vec<u8>> {
        self.delivered.read().await.clone()
    }
}

#[async_trait]
impl MessageSink for MemorySink {
    async fn deliver(&self, payload: Vec<u8>) -> Result<(), DeliveryError> {
        if let Some(error) = &self.fail_with {
            return Err(error.clone());
        }
        self.delivered.write().await.push(payload);
        Ok(())
    }
}
