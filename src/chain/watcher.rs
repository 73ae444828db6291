//! Contract log subscriptions feeding deposit notices to the consensus application

use ethers::contract::{parse_log, EthEvent};
use ethers::providers::{Middleware, Provider, Ws};
use ethers::types::{Address, Filter, Log, H256, U256};
use futures_util::StreamExt;
use std::sync::Arc;

use super::contracts::{StakedFilter, TransferFilter};
use super::types::{Backoff, ChainError, DepositEvent, DepositSource};
use crate::delivery::MessageSink;
use crate::message::MessageBuilder;
use crate::telemetry::{self, CounterMetric};

/// Deposit watcher settings
#[derive(Debug, Clone)]
pub struct DepositWatcherConfig {
    /// Websocket RPC endpoint of the chain hosting both contracts
    pub rpc_ws_url: String,
    pub staking_contract: Address,
    pub token_contract: Address,
    /// Raw amount credited for every mint, regardless of the minted value
    pub early_allocation_amount: U256,
    pub backoff: Backoff,
}

/// Watches staking and mint events and forwards them as deposit messages
pub struct DepositWatcher {
    config: DepositWatcherConfig,
    builder: MessageBuilder,
    sink: Arc<dyn MessageSink>,
}

impl DepositWatcher {
    pub fn new(
        config: DepositWatcherConfig,
        builder: MessageBuilder,
        sink: Arc<dyn MessageSink>,
    ) -> Self {
        Self {
            config,
            builder,
            sink,
        }
    }

    pub fn config(&self) -> &DepositWatcherConfig {
        &self.config
    }

    /// Log filter for one deposit source
    pub fn filter_for(&self, source: DepositSource) -> Filter {
        match source {
            DepositSource::Staked => Filter::new()
                .address(self.config.staking_contract)
                .event(&StakedFilter::abi_signature()),
            DepositSource::EarlyAllocation => Filter::new()
                .address(self.config.token_contract)
                .event(&TransferFilter::abi_signature())
                .topic1(H256::zero()),
        }
    }

    /// Turn a raw log into a deposit.
    ///
    /// `Ok(None)` means the log is valid but not a deposit: a reorged-out log
    /// or a transfer that is not a mint.
    pub fn event_from_log(
        &self,
        source: DepositSource,
        log: Log,
    ) -> Result<Option<DepositEvent>, ChainError> {
        if log.removed == Some(true) {
            return Ok(None);
        }
        let tx_hash = log.transaction_hash.ok_or(ChainError::MissingTxHash)?;

        let decode_err = |e: ethers::abi::Error| ChainError::Decode {
            source_kind: source,
            reason: e.to_string(),
        };

        match source {
            DepositSource::Staked => {
                let staked: StakedFilter = parse_log(log).map_err(decode_err)?;
                Ok(Some(DepositEvent::from_staked(tx_hash, &staked)))
            }
            DepositSource::EarlyAllocation => {
                let transfer: TransferFilter = parse_log(log).map_err(decode_err)?;
                Ok(DepositEvent::from_mint(
                    tx_hash,
                    &transfer,
                    self.config.early_allocation_amount,
                ))
            }
        }
    }

    /// Build, encode and deliver one deposit message
    pub async fn forward(
        &self,
        source: DepositSource,
        event: &DepositEvent,
    ) -> Result<(), ChainError> {
        let payload = self.builder.deposit(event).encode()?;
        self.sink.deliver(payload).await?;

        telemetry::increment_labeled(CounterMetric::Deposits, "source", source.to_string());
        tracing::info!(
            %source,
            tx_hash = %event.hash_hex(),
            address = ?event.address,
            raw_amount = %event.raw_amount,
            "Deposit relayed"
        );
        Ok(())
    }

    /// Watch both sources until the process stops
    pub async fn run(self) {
        let watcher = Arc::new(self);

        let staked = tokio::spawn(watcher.clone().watch(DepositSource::Staked));
        let mints = tokio::spawn(watcher.watch(DepositSource::EarlyAllocation));

        let (staked, mints) = tokio::join!(staked, mints);
        for result in [staked, mints] {
            if let Err(e) = result {
                tracing::error!(error = %e, "Deposit watch task aborted");
            }
        }
    }

    async fn watch(self: Arc<Self>, source: DepositSource) {
        let backoff = self.config.backoff;
        let mut delay = backoff.initial;

        loop {
            let (handled, error) = self.stream_deposits(source).await;
            if handled > 0 {
                delay = backoff.initial;
            }

            tracing::warn!(
                %source,
                error = %error,
                retry_in_ms = delay.as_millis() as u64,
                "Deposit subscription lost, resubscribing"
            );
            tokio::time::sleep(delay).await;
            delay = backoff.next(delay);
        }
    }

    /// Subscribe once and forward until the stream ends.
    ///
    /// Returns the number of logs seen and the reason the stream stopped.
    async fn stream_deposits(&self, source: DepositSource) -> (u64, ChainError) {
        let provider = match Provider::<Ws>::connect(self.config.rpc_ws_url.as_str()).await {
            Ok(provider) => provider,
            Err(e) => return (0, e.into()),
        };

        let filter = self.filter_for(source);
        let mut stream = match provider.subscribe_logs(&filter).await {
            Ok(stream) => stream,
            Err(e) => return (0, e.into()),
        };
        tracing::info!(%source, url = %self.config.rpc_ws_url, "Subscribed to deposit logs");

        let mut handled = 0u64;
        while let Some(log) = stream.next().await {
            handled += 1;
            match self.event_from_log(source, log) {
                Ok(Some(event)) => {
                    if let Err(e) = self.forward(source, &event).await {
                        tracing::error!(%source, tx_hash = %event.hash_hex(), error = %e, "Failed to relay deposit");
                    }
                }
                Ok(None) => {
                    tracing::debug!(%source, "Ignoring non-deposit log");
                }
                Err(e) => {
                    tracing::warn!(%source, error = %e, "Skipping undecodable log");
                }
            }
        }

        (handled, ChainError::StreamEnded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delivery::{DeliveryError, MemorySink};
    use crate::message::RelayMessage;
    use ethers::abi::{encode, Token};
    use ethers::types::ValueOrArray;

    fn config() -> DepositWatcherConfig {
        DepositWatcherConfig {
            rpc_ws_url: "ws://127.0.0.1:8546".to_string(),
            staking_contract: Address::repeat_byte(0x51),
            token_contract: Address::repeat_byte(0x70),
            early_allocation_amount: U256::from(10_000u64) * U256::exp10(18),
            backoff: Backoff::default(),
        }
    }

    fn watcher(sink: MemorySink) -> DepositWatcher {
        DepositWatcher::new(config(), MessageBuilder::new("Binance", 9), Arc::new(sink))
    }

    fn staked_log(account: Address, amount: U256) -> Log {
        Log {
            address: Address::repeat_byte(0x51),
            topics: vec![StakedFilter::signature(), H256::from(account)],
            data: encode(&[Token::Uint(amount)]).into(),
            transaction_hash: Some(H256::repeat_byte(0xab)),
            ..Default::default()
        }
    }

    fn transfer_log(from: Address, to: Address, value: U256) -> Log {
        Log {
            address: Address::repeat_byte(0x70),
            topics: vec![
                TransferFilter::signature(),
                H256::from(from),
                H256::from(to),
            ],
            data: encode(&[Token::Uint(value)]).into(),
            transaction_hash: Some(H256::repeat_byte(0xcd)),
            ..Default::default()
        }
    }

    #[test]
    fn test_staked_log_decodes() {
        let watcher = watcher(MemorySink::new());
        let log = staked_log(Address::repeat_byte(0x11), U256::from(3_000_000_000u64));

        let event = watcher
            .event_from_log(DepositSource::Staked, log)
            .unwrap()
            .unwrap();
        assert_eq!(event.address, Address::repeat_byte(0x11));
        assert_eq!(event.raw_amount, U256::from(3_000_000_000u64));
        assert_eq!(event.transaction_hash, H256::repeat_byte(0xab));
    }

    #[test]
    fn test_mint_log_uses_fixed_amount() {
        let watcher = watcher(MemorySink::new());
        let log = transfer_log(Address::zero(), Address::repeat_byte(0x22), U256::from(5u64));

        let event = watcher
            .event_from_log(DepositSource::EarlyAllocation, log)
            .unwrap()
            .unwrap();
        assert_eq!(event.address, Address::repeat_byte(0x22));
        assert_eq!(event.raw_amount, U256::from(10_000u64) * U256::exp10(18));
    }

    #[test]
    fn test_non_mint_transfer_is_ignored() {
        let watcher = watcher(MemorySink::new());
        let log = transfer_log(
            Address::repeat_byte(0x01),
            Address::repeat_byte(0x22),
            U256::from(5u64),
        );
        assert!(watcher
            .event_from_log(DepositSource::EarlyAllocation, log)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_removed_log_is_ignored() {
        let watcher = watcher(MemorySink::new());
        let mut log = staked_log(Address::repeat_byte(0x11), U256::one());
        log.removed = Some(true);
        assert!(watcher
            .event_from_log(DepositSource::Staked, log)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_missing_tx_hash() {
        let watcher = watcher(MemorySink::new());
        let mut log = staked_log(Address::repeat_byte(0x11), U256::one());
        log.transaction_hash = None;
        assert!(matches!(
            watcher.event_from_log(DepositSource::Staked, log),
            Err(ChainError::MissingTxHash)
        ));
    }

    #[test]
    fn test_wrong_event_fails_to_decode() {
        let watcher = watcher(MemorySink::new());
        let log = transfer_log(Address::zero(), Address::repeat_byte(0x22), U256::one());
        assert!(matches!(
            watcher.event_from_log(DepositSource::Staked, log),
            Err(ChainError::Decode {
                source_kind: DepositSource::Staked,
                ..
            })
        ));
    }

    #[test]
    fn test_mint_filter_pins_zero_sender() {
        let watcher = watcher(MemorySink::new());
        let filter = watcher.filter_for(DepositSource::EarlyAllocation);

        assert_eq!(
            filter.topics[0],
            Some(ValueOrArray::Value(Some(TransferFilter::signature())))
        );
        assert_eq!(
            filter.topics[1],
            Some(ValueOrArray::Value(Some(H256::zero())))
        );
    }

    #[tokio::test]
    async fn test_forward_delivers_scaled_deposit() {
        let sink = MemorySink::new();
        let watcher = watcher(sink.clone());
        let event = DepositEvent {
            transaction_hash: H256::repeat_byte(0xab),
            address: Address::repeat_byte(0x11),
            raw_amount: U256::from(10_000u64) * U256::exp10(18),
        };

        watcher.forward(DepositSource::EarlyAllocation, &event).await.unwrap();

        let delivered = sink.delivered().await;
        assert_eq!(delivered.len(), 1);
        match RelayMessage::decode(&delivered[0]).unwrap() {
            RelayMessage::Deposit(notice) => {
                assert_eq!(notice.scaled_amount, 10_000_000_000_000);
                assert_eq!(notice.address, "11".repeat(20));
            }
            other => panic!("expected deposit, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_forward_surfaces_delivery_failure() {
        let watcher = watcher(MemorySink::failing(DeliveryError::Closed));
        let event = DepositEvent {
            transaction_hash: H256::zero(),
            address: Address::zero(),
            raw_amount: U256::one(),
        };

        assert!(matches!(
            watcher.forward(DepositSource::Staked, &event).await,
            Err(ChainError::Delivery(DeliveryError::Closed))
        ));
    }
}
