//! Deposit watcher types

use ethers::providers::ProviderError;
use ethers::types::{Address, H256, U256};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

use super::contracts::{StakedFilter, TransferFilter};
use crate::delivery::DeliveryError;
use crate::message::MessageError;

/// Which contract event produced a deposit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DepositSource {
    /// `Staked` on the staking contract
    Staked,
    /// `Transfer` from the zero address on the token contract
    EarlyAllocation,
}

impl fmt::Display for DepositSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DepositSource::Staked => write!(f, "staked"),
            DepositSource::EarlyAllocation => write!(f, "early_allocation"),
        }
    }
}

/// A stake credited to an address, in raw token units
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositEvent {
    pub transaction_hash: H256,
    pub address: Address,
    pub raw_amount: U256,
}

impl DepositEvent {
    /// `0x` + lowercase hex of the transaction hash
    pub fn hash_hex(&self) -> String {
        format!("0x{}", hex::encode(self.transaction_hash.as_bytes()))
    }

    /// Deposit for a staking event; the staked amount is used as-is
    pub fn from_staked(transaction_hash: H256, event: &StakedFilter) -> Self {
        Self {
            transaction_hash,
            address: event.account,
            raw_amount: event.amount,
        }
    }

    /// Deposit for a token mint, credited with the fixed early allocation.
    ///
    /// Returns `None` for ordinary transfers.
    pub fn from_mint(
        transaction_hash: H256,
        event: &TransferFilter,
        early_allocation_amount: U256,
    ) -> Option<Self> {
        if !event.from.is_zero() {
            return None;
        }

        Some(Self {
            transaction_hash,
            address: event.to,
            raw_amount: early_allocation_amount,
        })
    }
}

/// Resubscription backoff
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    pub initial: Duration,
    pub max: Duration,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            initial: Duration::from_secs(1),
            max: Duration::from_secs(60),
        }
    }
}

impl Backoff {
    /// Delay before the next attempt after `current`
    pub fn next(&self, current: Duration) -> Duration {
        std::cmp::min(current * 2, self.max)
    }
}

/// Deposit watcher errors
#[derive(Debug, Error)]
pub enum ChainError {
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),
    #[error("failed to decode {source_kind} log: {reason}")]
    Decode {
        source_kind: DepositSource,
        reason: String,
    },
    #[error("log has no transaction hash")]
    MissingTxHash,
    #[error("subscription stream ended")]
    StreamEnded,
    #[error("message error: {0}")]
    Message(#[from] MessageError),
    #[error("delivery error: {0}")]
    Delivery(#[from] DeliveryError),
}
