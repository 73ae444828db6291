//! Message builder
//!
//! Turns accepted ticks and deposit events into the canonical relay
//! messages understood by the consensus application.

mod builder;
mod types;

pub use builder::{feed_key, scale_amount, MessageBuilder, ScaledAmount};
pub use types::{
    DepositNotice, MessageError, MessageKind, PriceUpdate, RelayMessage, TX_VALIDATE_DATA,
};
