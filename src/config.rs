//! Configuration types for oracle-relay

use anyhow::Context;
use ethers::types::{Address, U256};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::broadcast::{BroadcastMode, NodeRole};
use crate::chain::{Backoff, DepositWatcherConfig};
use crate::delivery::ConsensusChannelConfig;
use crate::error::RelayError;
use crate::feed::BINANCE_WS_URL;

/// Highest decimal exponent `U256::exp10` can represent
const MAX_AMOUNT_DECIMALS: u32 = 77;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub feed: FeedConfig,
    pub consensus: ConsensusConfig,
    pub broadcast: BroadcastConfig,
    pub deposits: DepositsConfig,
    pub telemetry: TelemetryConfig,
}

/// Price feed configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Source label used in feed keys
    pub source: String,
    /// Stream endpoint, without the `/<symbol>@aggTrade` suffix
    pub base_url: String,
    pub symbols: Vec<String>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            source: "Binance".to_string(),
            base_url: BINANCE_WS_URL.to_string(),
            symbols: vec!["btcusdt".to_string(), "ethusdt".to_string()],
        }
    }
}

/// Consensus application endpoint
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ConsensusConfig {
    pub host: String,
    pub port: u16,
    /// Wait before the first connection attempt (ms)
    pub warmup_ms: u64,
    /// Max wait for a frame to be written (ms)
    pub ack_timeout_ms: u64,
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8088,
            warmup_ms: 2000,
            ack_timeout_ms: 5000,
        }
    }
}

impl ConsensusConfig {
    pub fn warmup(&self) -> Duration {
        Duration::from_millis(self.warmup_ms)
    }

    pub fn channel_config(&self) -> ConsensusChannelConfig {
        ConsensusChannelConfig::new(self.host.clone(), self.port)
            .ack_timeout(Duration::from_millis(self.ack_timeout_ms))
    }
}

/// Network broadcast configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BroadcastConfig {
    /// Explicit role; when unset the role is derived from `designated_node`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<NodeRole>,
    /// Identity compared with `designated_node`; defaults to the consensus host
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_identity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub designated_node: Option<String>,
    /// Host, `host:port` or full URL of the node RPC
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rpc_url: Option<String>,
    pub rpc_port: u16,
    pub mode: BroadcastMode,
    pub delay_ms: u64,
    pub timeout_ms: u64,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            role: None,
            node_identity: None,
            designated_node: Some("192.167.10.6".to_string()),
            rpc_url: None,
            rpc_port: 26657,
            mode: BroadcastMode::Async,
            delay_ms: 2500,
            timeout_ms: 10_000,
        }
    }
}

impl BroadcastConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// On-chain deposit watcher configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DepositsConfig {
    pub enabled: bool,
    pub rpc_ws_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staking_contract: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_contract: Option<String>,
    /// Decimal places removed from raw token amounts
    pub amount_decimals: u32,
    /// Raw amount credited per mint, as a decimal string
    pub early_allocation_amount: String,
    pub backoff_initial_ms: u64,
    pub backoff_max_ms: u64,
}

impl Default for DepositsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            rpc_ws_url: "ws://127.0.0.1:8546".to_string(),
            staking_contract: None,
            token_contract: None,
            amount_decimals: 9,
            early_allocation_amount: "10000000000000000000000".to_string(),
            backoff_initial_ms: 1000,
            backoff_max_ms: 60_000,
        }
    }
}

impl DepositsConfig {
    /// Watcher settings, or `None` when deposits are disabled
    pub fn watcher_config(&self) -> Result<Option<DepositWatcherConfig>, RelayError> {
        if !self.enabled {
            return Ok(None);
        }

        Ok(Some(DepositWatcherConfig {
            rpc_ws_url: self.rpc_ws_url.clone(),
            staking_contract: parse_address("deposits.staking_contract", &self.staking_contract)?,
            token_contract: parse_address("deposits.token_contract", &self.token_contract)?,
            early_allocation_amount: U256::from_dec_str(&self.early_allocation_amount).map_err(
                |e| {
                    RelayError::Config(format!(
                        "deposits.early_allocation_amount {:?}: {}",
                        self.early_allocation_amount, e
                    ))
                },
            )?,
            backoff: Backoff {
                initial: Duration::from_millis(self.backoff_initial_ms),
                max: Duration::from_millis(self.backoff_max_ms),
            },
        }))
    }
}

fn parse_address(field: &str, value: &Option<String>) -> Result<Address, RelayError> {
    let raw = value
        .as_deref()
        .ok_or_else(|| RelayError::Config(format!("{} is required", field)))?;
    raw.parse()
        .map_err(|e| RelayError::Config(format!("{} {:?}: {}", field, raw, e)))
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub log_level: String,
    /// Emit JSON log lines
    pub json: bool,
    /// Serve Prometheus metrics on this port
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics_port: Option<u16>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json: false,
            metrics_port: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: Config =
            toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise use built-in defaults
    pub fn load_or_default(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Apply command-line overrides on top of file values
    pub fn apply_overrides(
        &mut self,
        consensus_host: Option<&str>,
        rpc_host: Option<&str>,
        role: Option<NodeRole>,
    ) {
        if let Some(host) = consensus_host {
            self.consensus.host = host.to_string();
        }
        if let Some(rpc) = rpc_host {
            self.broadcast.rpc_url = Some(rpc.to_string());
        }
        if role.is_some() {
            self.broadcast.role = role;
        }
    }

    /// Reject values the relay cannot run with
    pub fn validate(&self) -> Result<(), RelayError> {
        if self.feed.symbols.is_empty() {
            return Err(RelayError::Config("feed.symbols is empty".to_string()));
        }
        if self.deposits.amount_decimals > MAX_AMOUNT_DECIMALS {
            return Err(RelayError::Config(format!(
                "deposits.amount_decimals must be at most {}",
                MAX_AMOUNT_DECIMALS
            )));
        }
        self.deposits.watcher_config()?;
        Ok(())
    }

    /// Node RPC base URL
    ///
    /// Falls back to the consensus host on the RPC port. A bare host gets the
    /// RPC port, and anything without a scheme gets `http://`.
    pub fn rpc_url(&self) -> String {
        let port = self.broadcast.rpc_port;
        match self.broadcast.rpc_url.as_deref() {
            Some(url) if url.contains("://") => url.to_string(),
            Some(host_port) if host_port.contains(':') => format!("http://{}", host_port),
            Some(host) => format!("http://{}:{}", host, port),
            None => format!("http://{}:{}", self.consensus.host, port),
        }
    }

    /// Identity used for legacy role resolution
    pub fn node_identity(&self) -> &str {
        self.broadcast
            .node_identity
            .as_deref()
            .unwrap_or(&self.consensus.host)
    }

    pub fn node_role(&self) -> NodeRole {
        NodeRole::resolve(
            self.broadcast.role,
            self.node_identity(),
            self.broadcast.designated_node.as_deref(),
        )
    }
}
