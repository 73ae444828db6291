//! Deposit watcher
//!
//! Subscribes to staking and token-mint events on an EVM chain and relays
//! each one to the consensus application as a deposit message. Deposits are
//! delivered locally only; they never go through the broadcast gate.

mod contracts;
mod types;
mod watcher;

pub use contracts::{StakedFilter, TransferFilter};
pub use types::{Backoff, ChainError, DepositEvent, DepositSource};
pub use watcher::{DepositWatcher, DepositWatcherConfig};
