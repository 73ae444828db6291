//! oracle-relay: bridges exchange prices and on-chain deposits into a consensus application
//!
//! This library provides the core components for:
//! - Real-time price feeds from Binance
//! - Fixed-width big-endian packing of prices and timestamps
//! - Per-symbol change detection (one update per price and second)
//! - Relay message encoding for the consensus application
//! - Local delivery over a persistent websocket
//! - Role-gated, delayed transaction broadcast
//! - Staking and mint deposit watching on an EVM chain
//! - Logging and Prometheus metrics

pub mod broadcast;
pub mod chain;
pub mod cli;
pub mod codec;
pub mod config;
pub mod dedup;
pub mod delivery;
pub mod error;
pub mod feed;
pub mod message;
pub mod relay;
pub mod telemetry;
pub mod ws;
