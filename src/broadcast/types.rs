//! Broadcast types

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Role of this relay instance in a redundant deployment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum NodeRole {
    /// Delivers locally and broadcasts transactions to the network
    Broadcaster,
    /// Delivers locally only
    Observer,
}

impl NodeRole {
    /// Resolve the role once at startup.
    ///
    /// An explicit role wins. Otherwise the instance broadcasts only when
    /// its identity equals the designated node.
    pub fn resolve(explicit: Option<NodeRole>, identity: &str, designated: Option<&str>) -> Self {
        match (explicit, designated) {
            (Some(role), _) => role,
            (None, Some(designated)) if designated == identity => NodeRole::Broadcaster,
            _ => NodeRole::Observer,
        }
    }

    pub fn is_broadcaster(&self) -> bool {
        matches!(self, NodeRole::Broadcaster)
    }
}

/// Broadcast RPC flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BroadcastMode {
    #[default]
    Async,
    Sync,
}

impl BroadcastMode {
    /// RPC route for this mode
    pub fn path(&self) -> &'static str {
        match self {
            BroadcastMode::Async => "broadcast_tx_async",
            BroadcastMode::Sync => "broadcast_tx_sync",
        }
    }
}

/// Broadcast submission errors
#[derive(Debug, Error)]
pub enum BroadcastError {
    #[error("broadcast request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("broadcast rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },
}
