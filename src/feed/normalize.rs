//! Feed normalizer: raw observation -> canonical, packed tick

use rust_decimal::prelude::ToPrimitive;

use super::types::{CanonicalTick, FeedError, PackedTick, PriceObservation};
use crate::codec::{decode_be, encode_be, Width};

/// Reduce an observation to `(symbol, price, whole seconds)`
pub fn normalize(observation: &PriceObservation) -> Result<CanonicalTick, FeedError> {
    if observation.event_time_millis < 0 {
        return Err(FeedError::NegativeTimestamp(observation.event_time_millis));
    }

    Ok(CanonicalTick {
        symbol: observation.symbol.clone(),
        price: observation.price,
        timestamp_secs: (observation.event_time_millis / 1000) as u64,
    })
}

impl CanonicalTick {
    /// Pack price (truncated toward zero, 4 bytes) and timestamp (8 bytes)
    pub fn pack(&self) -> Result<PackedTick, FeedError> {
        if self.price.is_sign_negative() && !self.price.is_zero() {
            return Err(FeedError::NegativePrice(self.price));
        }

        let truncated = self.price.trunc().to_u64().unwrap_or(u64::MAX);
        let mut price_bytes = [0u8; 4];
        price_bytes.copy_from_slice(
            &encode_be(truncated, Width::U32).map_err(|e| FeedError::Unpackable(self.price, e))?,
        );
        let mut timestamp_bytes = [0u8; 8];
        timestamp_bytes.copy_from_slice(
            &encode_be(self.timestamp_secs, Width::U64)
                .map_err(|e| FeedError::Unpackable(self.price, e))?,
        );

        let price_value = decode_be(&price_bytes).map_err(|e| FeedError::Unpackable(self.price, e))?;
        let timestamp_secs =
            decode_be(&timestamp_bytes).map_err(|e| FeedError::Unpackable(self.price, e))?;

        Ok(PackedTick {
            symbol: self.symbol.clone(),
            price_value: price_value as u32,
            timestamp_secs,
            price_bytes,
            timestamp_bytes,
        })
    }
}
