//! WebSocket client with automatic reconnection

use super::types::{Outbound, WsConfig, WsError, WsMessage};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time::sleep;
use tokio_tungstenite::{connect_async, tungstenite::Message};

/// Reusable WebSocket client with automatic reconnection and ping/pong handling
pub struct WsClient {
    config: WsConfig,
}

impl WsClient {
    /// Create a new WebSocket client with the given configuration
    pub fn new(config: WsConfig) -> Self {
        Self { config }
    }

    /// Create a new client with just a URL using default config
    pub fn with_url(url: impl Into<String>) -> Self {
        Self::new(WsConfig::new(url))
    }

    /// Get the configured URL
    pub fn url(&self) -> &str {
        &self.config.url
    }

    /// Connect and return a receiver for inbound messages
    ///
    /// Spawns a background task that owns the socket, reconnects with
    /// exponential backoff and keeps the connection alive with pings.
    /// Connection status changes are delivered on the same channel.
    pub fn connect(&self) -> mpsc::Receiver<WsMessage> {
        let (tx, rx) = mpsc::channel(1024);
        let config = self.config.clone();

        tokio::spawn(async move {
            if let Err(e) = Self::run_connection_loop(config, tx, None).await {
                tracing::error!(error = %e, "WebSocket connection loop failed");
            }
        });

        rx
    }

    /// Connect and return both an inbound receiver and an outbound sender
    ///
    /// Every [`Outbound`] is written as a single binary frame and its
    /// acknowledgement resolves with the transport-level result.
    pub fn connect_bidirectional(&self) -> (mpsc::Receiver<WsMessage>, mpsc::Sender<Outbound>) {
        let (msg_tx, msg_rx) = mpsc::channel(1024);
        let (send_tx, send_rx) = mpsc::channel(256);
        let config = self.config.clone();

        tokio::spawn(async move {
            if let Err(e) = Self::run_connection_loop(config, msg_tx, Some(send_rx)).await {
                tracing::error!(error = %e, "WebSocket bidirectional loop failed");
            }
        });

        (msg_rx, send_tx)
    }

    async fn run_connection_loop(
        config: WsConfig,
        tx: mpsc::Sender<WsMessage>,
        mut send_rx: Option<mpsc::Receiver<Outbound>>,
    ) -> Result<(), WsError> {
        let mut reconnect_attempts = 0;
        let mut reconnect_delay = config.initial_reconnect_delay;

        loop {
            match Self::connect_and_stream(&config, &tx, send_rx.as_mut()).await {
                Ok(()) => {
                    tracing::info!(url = %config.url, "WebSocket connection closed cleanly");
                    let _ = tx.send(WsMessage::Disconnected).await;
                    break;
                }
                Err(e) => {
                    reconnect_attempts += 1;
                    tracing::warn!(
                        url = %config.url,
                        error = %e,
                        attempt = reconnect_attempts,
                        "WebSocket connection error, reconnecting..."
                    );

                    // 0 = reconnect forever
                    if config.max_reconnect_attempts > 0
                        && reconnect_attempts >= config.max_reconnect_attempts
                    {
                        tracing::error!(url = %config.url, "Max reconnection attempts reached");
                        let _ = tx.send(WsMessage::Disconnected).await;
                        return Err(WsError::MaxReconnectsExceeded);
                    }

                    if tx.is_closed() {
                        tracing::info!("Receiver dropped, stopping reconnection");
                        break;
                    }

                    let _ = tx
                        .send(WsMessage::Reconnecting {
                            attempt: reconnect_attempts,
                        })
                        .await;

                    sleep(reconnect_delay).await;
                    reconnect_delay = (reconnect_delay * 2).min(config.max_reconnect_delay);
                }
            }
        }

        Ok(())
    }

    async fn connect_and_stream(
        config: &WsConfig,
        tx: &mpsc::Sender<WsMessage>,
        mut send_rx: Option<&mut mpsc::Receiver<Outbound>>,
    ) -> Result<(), WsError> {
        tracing::info!(url = %config.url, "Connecting to WebSocket");

        let (ws_stream, _response) = connect_async(&config.url)
            .await
            .map_err(|e| WsError::ConnectionFailed(e.to_string()))?;

        let (mut write, mut read) = ws_stream.split();

        if tx.send(WsMessage::Connected).await.is_err() {
            return Ok(());
        }

        let mut ping_interval = tokio::time::interval(config.ping_interval);
        ping_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // first tick completes immediately
        ping_interval.tick().await;
        let mut waiting_for_pong = false;

        loop {
            tokio::select! {
                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            if tx.send(WsMessage::Text(text)).await.is_err() {
                                tracing::debug!("Receiver dropped, closing connection");
                                return Ok(());
                            }
                        }
                        Some(Ok(Message::Binary(data))) => {
                            if tx.send(WsMessage::Binary(data)).await.is_err() {
                                tracing::debug!("Receiver dropped, closing connection");
                                return Ok(());
                            }
                        }
                        Some(Ok(Message::Ping(data))) => {
                            write.send(Message::Pong(data)).await
                                .map_err(|e| WsError::SendFailed(e.to_string()))?;
                        }
                        Some(Ok(Message::Pong(_))) => {
                            waiting_for_pong = false;
                        }
                        Some(Ok(Message::Close(frame))) => {
                            tracing::info!(?frame, "Received close frame");
                            return Err(WsError::ConnectionFailed("closed by peer".into()));
                        }
                        Some(Err(e)) => {
                            return Err(WsError::ConnectionFailed(e.to_string()));
                        }
                        None => {
                            return Err(WsError::ConnectionFailed("Stream ended unexpectedly".into()));
                        }
                        _ => {}
                    }
                }

                outbound = async {
                    match &mut send_rx {
                        Some(rx) => rx.recv().await,
                        None => std::future::pending().await,
                    }
                } => {
                    match outbound {
                        Some(Outbound { ack, .. }) if ack.is_closed() => {
                            tracing::debug!("Sender gave up on frame, discarding");
                        }
                        Some(Outbound { payload, ack }) => {
                            let result = write
                                .send(Message::Binary(payload))
                                .await
                                .map_err(|e| WsError::SendFailed(e.to_string()));
                            let _ = ack.send(result.clone());
                            result?;
                        }
                        None => {
                            // Sender dropped
                            return Ok(());
                        }
                    }
                }

                _ = ping_interval.tick() => {
                    if waiting_for_pong {
                        return Err(WsError::ConnectionFailed("Pong timeout".into()));
                    }
                    write.send(Message::Ping(vec![])).await
                        .map_err(|e| WsError::SendFailed(e.to_string()))?;
                    waiting_for_pong = true;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_ws_client_creation() {
        let client = WsClient::with_url("ws://127.0.0.1:8088");
        assert_eq!(client.url(), "ws://127.0.0.1:8088");
    }

    #[test]
    fn test_ws_client_with_config() {
        let config = WsConfig::new("wss://test.com")
            .max_reconnects(5)
            .ping_interval(Duration::from_secs(15));

        let client = WsClient::new(config);
        assert_eq!(client.url(), "wss://test.com");
        assert_eq!(client.config.max_reconnect_attempts, 5);
        assert_eq!(client.config.ping_interval, Duration::from_secs(15));
    }

    #[tokio::test]
    async fn test_ws_client_connection_failure() {
        // Nothing listens on port 1
        let client = WsClient::new(
            WsConfig::new("ws://127.0.0.1:1")
                .max_reconnects(2)
                .initial_delay(Duration::from_millis(10)),
        );

        let mut rx = client.connect();

        let mut got_disconnect = false;
        let timeout = tokio::time::timeout(Duration::from_secs(5), async {
            while let Some(msg) = rx.recv().await {
                match msg {
                    WsMessage::Disconnected => {
                        got_disconnect = true;
                        break;
                    }
                    WsMessage::Reconnecting { .. } => continue,
                    _ => {}
                }
            }
        });

        timeout.await.expect("Test timed out");
        assert!(got_disconnect, "Should receive Disconnected message");
    }
}
