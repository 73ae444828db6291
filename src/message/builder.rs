//! Message construction and serialization

use ethers::types::U256;

use super::types::{
    DataMessageWire, DepositInfoWire, DepositMessageWire, DepositNotice, MessageError,
    MessageHeaderWire, MessageKind, PriceUpdate, RelayMessage, ValidateDataTxWire,
    TX_VALIDATE_DATA,
};
use crate::chain::DepositEvent;
use crate::feed::PackedTick;

/// Build the `<Source>|<Symbol>|price` feed key
pub fn feed_key(source: &str, symbol: &str) -> String {
    format!("{}|{}|price", source, symbol)
}

/// Deposit amount after decimal scaling and narrowing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScaledAmount {
    pub value: i64,
    /// The quotient did not fit in an i64 and was clamped
    pub saturated: bool,
}

/// Divide `raw` by `10^decimals` (floor) and narrow to i64, saturating.
///
/// Loses the remainder below `10^decimals` raw units, and everything above
/// `i64::MAX` scaled units.
pub fn scale_amount(raw: U256, decimals: u32) -> ScaledAmount {
    let quotient = raw / U256::exp10(decimals as usize);
    let limit = U256::from(i64::MAX as u64);

    if quotient > limit {
        ScaledAmount {
            value: i64::MAX,
            saturated: true,
        }
    } else {
        ScaledAmount {
            value: quotient.as_u64() as i64,
            saturated: false,
        }
    }
}

/// Builds relay messages from validated domain data
#[derive(Debug, Clone)]
pub struct MessageBuilder {
    source: String,
    amount_decimals: u32,
}

impl MessageBuilder {
    pub fn new(source: impl Into<String>, amount_decimals: u32) -> Self {
        Self {
            source: source.into(),
            amount_decimals,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Price update for an accepted tick
    pub fn price_update(&self, tick: &PackedTick) -> PriceUpdate {
        PriceUpdate {
            feed_key: feed_key(&self.source, &tick.symbol),
            value: tick.price_value,
            timestamp_secs: tick.timestamp_secs,
        }
    }

    /// Deposit message with the amount scaled down
    pub fn deposit(&self, event: &DepositEvent) -> RelayMessage {
        let scaled = scale_amount(event.raw_amount, self.amount_decimals);
        if scaled.saturated {
            tracing::warn!(
                tx_hash = %event.hash_hex(),
                raw_amount = %event.raw_amount,
                "Deposit amount exceeds i64 after scaling, clamping"
            );
        }

        RelayMessage::Deposit(DepositNotice {
            transaction_hash: event.hash_hex(),
            address: hex::encode_upper(event.address.as_bytes()),
            scaled_amount: scaled.value,
        })
    }
}

impl RelayMessage {
    pub fn kind(&self) -> MessageKind {
        match self {
            RelayMessage::PriceUpdate(_) => MessageKind::PriceUpdate,
            RelayMessage::Deposit(_) => MessageKind::Deposit,
        }
    }

    /// Serialize for the local delivery endpoint
    pub fn encode(&self) -> Result<Vec<u8>, MessageError> {
        let bytes = match self {
            RelayMessage::PriceUpdate(update) => update.encode()?,
            RelayMessage::Deposit(deposit) => serde_json::to_vec(&DepositMessageWire {
                message_type: MessageKind::Deposit as u8,
                transaction_hash: deposit.transaction_hash.clone(),
                deposit_info: DepositInfoWire {
                    address: deposit.address.clone(),
                    amount: deposit.scaled_amount,
                },
            })?,
        };

        Ok(bytes)
    }

    /// Parse bytes produced by [`RelayMessage::encode`]
    pub fn decode(bytes: &[u8]) -> Result<Self, MessageError> {
        let header: MessageHeaderWire = serde_json::from_slice(bytes)?;

        match header.message_type {
            0 => {
                let wire: DataMessageWire = serde_json::from_slice(bytes)?;
                let value = wire
                    .data_value
                    .parse()
                    .map_err(|_| MessageError::InvalidValue(wire.data_value.clone()))?;
                Ok(RelayMessage::PriceUpdate(PriceUpdate {
                    feed_key: wire.data_feed,
                    value,
                    timestamp_secs: wire.data_timestamp,
                }))
            }
            1 => {
                let wire: DepositMessageWire = serde_json::from_slice(bytes)?;
                Ok(RelayMessage::Deposit(DepositNotice {
                    transaction_hash: wire.transaction_hash,
                    address: wire.deposit_info.address,
                    scaled_amount: wire.deposit_info.amount,
                }))
            }
            other => Err(MessageError::UnknownKind(u64::from(other))),
        }
    }
}

impl PriceUpdate {
    /// Serialize for the local delivery endpoint
    pub fn encode(&self) -> Result<Vec<u8>, MessageError> {
        Ok(serde_json::to_vec(&DataMessageWire {
            message_type: MessageKind::PriceUpdate as u8,
            data_feed: self.feed_key.clone(),
            data_value: self.value.to_string(),
            data_timestamp: self.timestamp_secs,
        })?)
    }

    /// Serialize as a data-validation transaction for network broadcast
    pub fn encode_transaction(&self) -> Result<Vec<u8>, MessageError> {
        Ok(serde_json::to_vec(&ValidateDataTxWire {
            transaction_type: TX_VALIDATE_DATA,
            data_feed: self.feed_key.clone(),
            data_value: self.value.to_string(),
            data_timestamp: self.timestamp_secs,
        })?)
    }
}
