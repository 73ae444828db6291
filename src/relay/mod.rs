//! Relay pipeline
//!
//! Ties the feed, change detector, message builder, delivery channel and
//! broadcast gate together. The change detector has a single owner, the
//! ingestion loop, so no locking is needed.

mod pipeline;
mod service;

pub use pipeline::{DeliveryOutcome, PriceRelay};
pub use service::run_relay;
