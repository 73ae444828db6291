//! Process wiring for the relay

use std::sync::Arc;

use super::PriceRelay;
use crate::broadcast::{BroadcastGate, RpcBroadcaster};
use crate::chain::DepositWatcher;
use crate::config::Config;
use crate::delivery::{ConsensusChannel, MessageSink};
use crate::feed::{BinanceFeed, PriceFeed};
use crate::message::MessageBuilder;

/// Run the relay until Ctrl-C or until the price feed ends
pub async fn run_relay(config: Config) -> anyhow::Result<()> {
    config.validate()?;

    let role = config.node_role();
    tracing::info!(
        consensus = %config.consensus.channel_config().url(),
        rpc = %config.rpc_url(),
        identity = %config.node_identity(),
        ?role,
        symbols = ?config.feed.symbols,
        "Starting oracle relay"
    );

    // Give the consensus application time to open its endpoint
    tokio::time::sleep(config.consensus.warmup()).await;

    let channel: Arc<dyn MessageSink> =
        Arc::new(ConsensusChannel::connect(config.consensus.channel_config()));
    let builder = MessageBuilder::new(config.feed.source.clone(), config.deposits.amount_decimals);

    let submitter = RpcBroadcaster::new(
        config.rpc_url(),
        config.broadcast.mode,
        config.broadcast.timeout(),
    )?;
    let gate = Arc::new(BroadcastGate::new(
        role,
        config.broadcast.delay(),
        Arc::new(submitter),
    ));

    if let Some(watcher_config) = config.deposits.watcher_config()? {
        tracing::info!(url = %watcher_config.rpc_ws_url, "Starting deposit watcher");
        let watcher = DepositWatcher::new(watcher_config, builder.clone(), channel.clone());
        tokio::spawn(watcher.run());
    }

    let feed = BinanceFeed::with_base_url(config.feed.base_url.clone(), config.feed.symbols.clone());
    let observations = feed.subscribe().await?;
    let relay = PriceRelay::new(builder, channel, gate);

    tokio::select! {
        _ = relay.run(observations) => {
            tracing::warn!("Price feed ended, stopping relay");
        }
        result = tokio::signal::ctrl_c() => {
            result?;
            tracing::info!("Shutdown requested");
        }
    }

    Ok(())
}
