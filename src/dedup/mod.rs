//! Change detection
//!
//! Per-symbol memory of the last accepted tick. A tick is emitted only if
//! both its price and its second differ from the last accepted one, which
//! caps every symbol at one update per second and per distinct price.

use std::collections::HashMap;

use crate::feed::PackedTick;

/// Last accepted values for one symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LastAccepted {
    pub price_value: u32,
    pub timestamp_secs: u64,
}

/// Why a tick was not emitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuppressReason {
    /// Price equals the last accepted price
    UnchangedPrice,
    /// Price changed but within the last accepted second
    SameSecond,
}

impl SuppressReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SuppressReason::UnchangedPrice => "unchanged_price",
            SuppressReason::SameSecond => "same_second",
        }
    }
}

/// Outcome of observing a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Accepted,
    Suppressed(SuppressReason),
}

impl Decision {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Decision::Accepted)
    }
}

/// Process-lifetime dedup state, owned by the single ingestion task
#[derive(Debug, Default)]
pub struct ChangeDetector {
    last: HashMap<String, LastAccepted>,
}

impl ChangeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decide whether `tick` is a new update and record it if so.
    ///
    /// The state is updated before returning, so callers can suspend on
    /// delivery without a second tick for the same symbol slipping through.
    pub fn observe(&mut self, tick: &PackedTick) -> Decision {
        if let Some(last) = self.last.get(&tick.symbol) {
            if last.price_value == tick.price_value {
                return Decision::Suppressed(SuppressReason::UnchangedPrice);
            }
            if last.timestamp_secs == tick.timestamp_secs {
                return Decision::Suppressed(SuppressReason::SameSecond);
            }
        }

        self.last.insert(
            tick.symbol.clone(),
            LastAccepted {
                price_value: tick.price_value,
                timestamp_secs: tick.timestamp_secs,
            },
        );
        Decision::Accepted
    }

    /// Last accepted values for a symbol, if any
    pub fn last_accepted(&self, symbol: &str) -> Option<LastAccepted> {
        self.last.get(symbol).copied()
    }

    /// Number of symbols with recorded state
    pub fn tracked_symbols(&self) -> usize {
        self.last.len()
    }
}
