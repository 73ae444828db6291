//! WebSocket types and configuration

use std::time::Duration;
use thiserror::Error;
use tokio::sync::oneshot;

/// WebSocket client configuration
#[derive(Debug, Clone)]
pub struct WsConfig {
    /// WebSocket URL to connect to
    pub url: String,
    /// Maximum reconnection attempts before giving up (0 = infinite)
    pub max_reconnect_attempts: u32,
    /// Initial delay before first reconnection attempt
    pub initial_reconnect_delay: Duration,
    /// Maximum delay between reconnection attempts
    pub max_reconnect_delay: Duration,
    /// Interval for sending ping frames
    pub ping_interval: Duration,
}

impl Default for WsConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_reconnect_attempts: 10,
            initial_reconnect_delay: Duration::from_secs(1),
            max_reconnect_delay: Duration::from_secs(60),
            ping_interval: Duration::from_secs(30),
        }
    }
}

impl WsConfig {
    /// Create a new config with the given URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Set maximum reconnection attempts
    pub fn max_reconnects(mut self, n: u32) -> Self {
        self.max_reconnect_attempts = n;
        self
    }

    /// Set initial reconnection delay
    pub fn initial_delay(mut self, d: Duration) -> Self {
        self.initial_reconnect_delay = d;
        self
    }

    /// Set maximum reconnection delay
    pub fn max_delay(mut self, d: Duration) -> Self {
        self.max_reconnect_delay = d;
        self
    }

    /// Set ping interval
    pub fn ping_interval(mut self, d: Duration) -> Self {
        self.ping_interval = d;
        self
    }
}

/// Inbound WebSocket events
#[derive(Debug, Clone)]
pub enum WsMessage {
    /// Text message
    Text(String),
    /// Binary message
    Binary(Vec<u8>),
    /// Connection established
    Connected,
    /// Connection closed
    Disconnected,
    /// Reconnecting after failure
    Reconnecting { attempt: u32 },
}

/// A binary frame queued for sending, with a slot for the transport result
#[derive(Debug)]
pub struct Outbound {
    pub payload: Vec<u8>,
    pub ack: oneshot::Sender<Result<(), WsError>>,
}

impl Outbound {
    /// Create an outbound frame and the receiver that resolves once it was written
    pub fn new(payload: Vec<u8>) -> (Self, oneshot::Receiver<Result<(), WsError>>) {
        let (ack, ack_rx) = oneshot::channel();
        (Self { payload, ack }, ack_rx)
    }
}

/// WebSocket errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WsError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Maximum reconnection attempts exceeded")]
    MaxReconnectsExceeded,
    #[error("Channel closed")]
    ChannelClosed,
    #[error("Send failed: {0}")]
    SendFailed(String),
}
