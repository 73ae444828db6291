//! Relay message types and their JSON wire layout
//!
//! Field names follow the consensus application's schema (PascalCase).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Discriminant understood by the consensus application's local endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    PriceUpdate = 0,
    Deposit = 1,
}

/// Transaction type of a data-validation transaction
pub const TX_VALIDATE_DATA: u8 = 0;

/// Canonical price update for one feed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceUpdate {
    /// `<Source>|<Symbol>|price`
    pub feed_key: String,
    pub value: u32,
    pub timestamp_secs: u64,
}

/// Deposit as recorded by the consensus application
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositNotice {
    /// `0x`-prefixed lowercase transaction hash
    pub transaction_hash: String,
    /// Uppercase hex account address without prefix
    pub address: String,
    pub scaled_amount: i64,
}

/// Message delivered to the consensus application
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayMessage {
    PriceUpdate(PriceUpdate),
    Deposit(DepositNotice),
}

/// Message encoding errors
#[derive(Debug, Error)]
pub enum MessageError {
    #[error("failed to serialize message: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown message type {0}")]
    UnknownKind(u64),
    #[error("invalid data value {0:?}")]
    InvalidValue(String),
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(super) struct MessageHeaderWire {
    pub message_type: u8,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(super) struct DataMessageWire {
    pub message_type: u8,
    pub data_feed: String,
    pub data_value: String,
    pub data_timestamp: u64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(super) struct DepositInfoWire {
    pub address: String,
    pub amount: i64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(super) struct DepositMessageWire {
    pub message_type: u8,
    pub transaction_hash: String,
    pub deposit_info: DepositInfoWire,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(super) struct ValidateDataTxWire {
    pub transaction_type: u8,
    pub data_feed: String,
    pub data_value: String,
    pub data_timestamp: u64,
}
