//! HTTP transaction broadcaster

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use super::types::{BroadcastError, BroadcastMode};
use super::TxSubmitter;
use crate::codec::to_hex;

/// Submits transactions through the node's RPC broadcast route
pub struct RpcBroadcaster {
    client: Client,
    rpc_url: String,
    mode: BroadcastMode,
}

impl RpcBroadcaster {
    pub fn new(
        rpc_url: impl Into<String>,
        mode: BroadcastMode,
        timeout: Duration,
    ) -> Result<Self, BroadcastError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            rpc_url: rpc_url.into().trim_end_matches('/').to_string(),
            mode,
        })
    }

    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    /// `<rpc>/broadcast_tx_*?tx=0x<hex>`
    pub fn broadcast_url(&self, tx: &[u8]) -> String {
        format!("{}/{}?tx=0x{}", self.rpc_url, self.mode.path(), to_hex(tx))
    }
}

#[async_trait]
impl TxSubmitter for RpcBroadcaster {
    async fn submit(&self, tx: &[u8]) -> Result<(), BroadcastError> {
        let url = self.broadcast_url(tx);
        tracing::debug!(%url, "Broadcasting transaction");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(BroadcastError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!(%status, %body, "Broadcast accepted by node");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_broadcast_url() {
        let broadcaster = RpcBroadcaster::new(
            "http://192.167.10.6:26657/",
            BroadcastMode::Async,
            Duration::from_secs(5),
        )
        .unwrap();

        assert_eq!(broadcaster.rpc_url(), "http://192.167.10.6:26657");
        assert_eq!(
            broadcaster.broadcast_url(&[0x7b, 0x7d]),
            "http://192.167.10.6:26657/broadcast_tx_async?tx=0x7b7d"
        );
    }

    #[test]
    fn test_broadcast_url_sync_mode() {
        let broadcaster =
            RpcBroadcaster::new("http://node:26657", BroadcastMode::Sync, Duration::from_secs(5))
                .unwrap();
        assert_eq!(
            broadcaster.broadcast_url(b"{}"),
            "http://node:26657/broadcast_tx_sync?tx=0x7b7d"
        );
    }
}
