//! WebSocket client library
//!
//! Reconnecting WebSocket client shared by the exchange feeds (inbound only)
//! and the consensus delivery channel (bidirectional, binary frames).

mod client;
mod types;

pub use client::WsClient;
pub use types::{Outbound, WsConfig, WsError, WsMessage};
