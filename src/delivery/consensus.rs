//! WebSocket link to the consensus application

use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::mpsc;

use super::{DeliveryError, MessageSink};
use crate::ws::{Outbound, WsClient, WsConfig, WsMessage};

/// Consensus channel configuration
#[derive(Debug, Clone)]
pub struct ConsensusChannelConfig {
    /// Host of the consensus application
    pub host: String,
    /// Port of its message endpoint
    pub port: u16,
    /// How long to wait for a frame to be written
    pub ack_timeout: Duration,
}

impl ConsensusChannelConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ack_timeout: Duration::from_secs(5),
        }
    }

    pub fn ack_timeout(mut self, d: Duration) -> Self {
        self.ack_timeout = d;
        self
    }

    /// `ws://<host>:<port>`
    pub fn url(&self) -> String {
        format!("ws://{}:{}", self.host, self.port)
    }
}

/// Persistent connection delivering one binary frame per message
pub struct ConsensusChannel {
    url: String,
    outbound: mpsc::Sender<Outbound>,
    ack_timeout: Duration,
}

impl ConsensusChannel {
    /// Open the connection in the background and return the channel handle
    pub fn connect(config: ConsensusChannelConfig) -> Self {
        let url = config.url();
        let ws_config = WsConfig::new(url.clone())
            .max_reconnects(0)
            .initial_delay(Duration::from_millis(500))
            .max_delay(Duration::from_secs(10));

        let (inbound, outbound) = WsClient::new(ws_config).connect_bidirectional();
        tokio::spawn(Self::log_inbound(url.clone(), inbound));

        Self {
            url,
            outbound,
            ack_timeout: config.ack_timeout,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn log_inbound(url: String, mut inbound: mpsc::Receiver<WsMessage>) {
        while let Some(msg) = inbound.recv().await {
            match msg {
                WsMessage::Connected => tracing::info!(%url, "Consensus application connected"),
                WsMessage::Disconnected => {
                    tracing::warn!(%url, "Consensus application disconnected");
                    break;
                }
                WsMessage::Reconnecting { attempt } => {
                    tracing::warn!(%url, attempt, "Reconnecting to consensus application")
                }
                WsMessage::Text(text) => tracing::debug!(%url, received = %text, "Consensus message"),
                WsMessage::Binary(data) => tracing::debug!(
                    %url,
                    received = %String::from_utf8_lossy(&data),
                    "Consensus message"
                ),
            }
        }
    }
}

#[async_trait]
impl MessageSink for ConsensusChannel {
    async fn deliver(&self, payload: Vec<u8>) -> Result<(), DeliveryError> {
        let (outbound, ack) = Outbound::new(payload);

        // A dropped `ack` makes the writer discard the frame if still queued
        let attempt = async {
            self.outbound
                .send(outbound)
                .await
                .map_err(|_| DeliveryError::Closed)?;
            match ack.await {
                Ok(result) => result.map_err(DeliveryError::from),
                Err(_) => Err(DeliveryError::Closed),
            }
        };

        tokio::time::timeout(self.ack_timeout, attempt)
            .await
            .map_err(|_| DeliveryError::Timeout(self.ack_timeout))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_url() {
        let config = ConsensusChannelConfig::new("192.167.10.6", 8088);
        assert_eq!(config.url(), "ws://192.167.10.6:8088");
        assert_eq!(config.ack_timeout, Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_deliver_times_out_without_connection() {
        let channel = ConsensusChannel::connect(
            ConsensusChannelConfig::new("127.0.0.1", 1).ack_timeout(Duration::from_millis(50)),
        );

        let result = channel.deliver(b"{}".to_vec()).await;
        assert_eq!(result, Err(DeliveryError::Timeout(Duration::from_millis(50))));
    }

    #[tokio::test]
    async fn test_full_queue_times_out_instead_of_blocking() {
        let channel = ConsensusChannel::connect(
            ConsensusChannelConfig::new("127.0.0.1", 1).ack_timeout(Duration::from_millis(50)),
        );

        // More deliveries than the outbound queue holds
        let deliveries = (0..300).map(|i| channel.deliver(vec![i as u8]));
        let results = tokio::time::timeout(
            Duration::from_secs(5),
            futures_util::future::join_all(deliveries),
        )
        .await
        .expect("every delivery resolves");

        assert!(results
            .iter()
            .all(|r| *r == Err(DeliveryError::Timeout(Duration::from_millis(50)))));
    }
}
