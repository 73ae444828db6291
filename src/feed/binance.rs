//! Binance aggregated-trade WebSocket feed

use super::types::FeedError;
use super::{PriceFeed, PriceObservation};
use crate::telemetry::{self, CounterMetric};
use crate::ws::{WsClient, WsConfig, WsMessage};
use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::mpsc;

/// Public market-data stream endpoint
pub const BINANCE_WS_URL: &str = "wss://data-stream.binance.vision/ws";

/// Minimal trade message; only `s`, `p` and `E` are required
#[derive(Debug, Deserialize)]
struct BinanceTradeMessage {
    /// Event type ("aggTrade" or "trade")
    #[serde(rename = "e", default)]
    event_type: Option<String>,
    /// Event time (milliseconds)
    #[serde(rename = "E")]
    event_time: i64,
    /// Symbol
    #[serde(rename = "s")]
    symbol: String,
    /// Price, sent as a string but numbers are accepted too
    #[serde(rename = "p")]
    price: Decimal,
}

/// Binance feed with one stream subscription per tracked symbol
pub struct BinanceFeed {
    base_url: String,
    symbols: Vec<String>,
}

impl BinanceFeed {
    /// Create a feed for the given symbols against the public endpoint
    pub fn new<S: Into<String>>(symbols: impl IntoIterator<Item = S>) -> Self {
        Self::with_base_url(BINANCE_WS_URL, symbols)
    }

    /// Create a feed against a custom stream endpoint
    pub fn with_base_url<S: Into<String>>(
        base_url: impl Into<String>,
        symbols: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            symbols: symbols
                .into_iter()
                .map(|s| s.into().to_lowercase())
                .collect(),
        }
    }

    /// Tracked symbols (lowercase)
    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    fn build_ws_url(&self, symbol: &str) -> String {
        format!("{}/{}@aggTrade", self.base_url, symbol)
    }

    /// Parse a Binance trade payload into an observation
    pub fn parse_message(msg: &str) -> Result<PriceObservation, FeedError> {
        let trade: BinanceTradeMessage = serde_json::from_str(msg)?;

        if let Some(event_type) = trade.event_type {
            if event_type != "aggTrade" && event_type != "trade" {
                return Err(FeedError::UnexpectedEvent(event_type));
            }
        }

        Ok(PriceObservation {
            symbol: trade.symbol,
            price: trade.price,
            event_time_millis: trade.event_time,
            received_at: Utc::now(),
        })
    }

    async fn run_message_loop(
        symbol: String,
        mut ws_rx: mpsc::Receiver<WsMessage>,
        tick_tx: mpsc::Sender<PriceObservation>,
    ) {
        while let Some(msg) = ws_rx.recv().await {
            match msg {
                WsMessage::Text(text) => match Self::parse_message(&text) {
                    Ok(observation) => {
                        telemetry::increment_labeled(
                            CounterMetric::TicksReceived,
                            "symbol",
                            observation.symbol.clone(),
                        );
                        if tick_tx.send(observation).await.is_err() {
                            tracing::debug!(%symbol, "Tick receiver dropped, stopping feed");
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::warn!(%symbol, error = %e, "Dropping malformed tick");
                    }
                },
                WsMessage::Connected => {
                    tracing::info!(%symbol, "Binance feed connected");
                }
                WsMessage::Disconnected => {
                    tracing::warn!(%symbol, "Binance feed disconnected");
                    break;
                }
                WsMessage::Reconnecting { attempt } => {
                    tracing::warn!(%symbol, attempt, "Binance feed reconnecting...");
                }
                WsMessage::Binary(_) => {}
            }
        }
    }
}

#[async_trait]
impl PriceFeed for BinanceFeed {
    async fn subscribe(&self) -> anyhow::Result<mpsc::Receiver<PriceObservation>> {
        if self.symbols.is_empty() {
            anyhow::bail!("no symbols configured for the Binance feed");
        }

        let (tick_tx, tick_rx) = mpsc::channel(1024);

        for symbol in &self.symbols {
            let url = self.build_ws_url(symbol);
            tracing::info!(%symbol, %url, "Subscribing to Binance feed");

            let config = WsConfig::new(url)
                .max_reconnects(0)
                .initial_delay(Duration::from_secs(1))
                .max_delay(Duration::from_secs(60))
                .ping_interval(Duration::from_secs(30));

            let ws_rx = WsClient::new(config).connect();
            let tick_tx = tick_tx.clone();
            let symbol = symbol.clone();

            tokio::spawn(async move {
                Self::run_message_loop(symbol, ws_rx, tick_tx).await;
            });
        }

        Ok(tick_rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_binance_feed_lowercases_symbols() {
        let feed = BinanceFeed::new(["BTCUSDT", "ethusdt"]);
        assert_eq!(feed.symbols(), ["btcusdt", "ethusdt"]);
    }

    #[test]
    fn test_build_ws_url() {
        let feed = BinanceFeed::new(["btcusdt"]);
        assert_eq!(
            feed.build_ws_url("btcusdt"),
            "wss://data-stream.binance.vision/ws/btcusdt@aggTrade"
        );
    }

    #[test]
    fn test_custom_base_url_trailing_slash() {
        let feed = BinanceFeed::with_base_url("ws://localhost:9000/ws/", ["btcusdt"]);
        assert_eq!(
            feed.build_ws_url("btcusdt"),
            "ws://localhost:9000/ws/btcusdt@aggTrade"
        );
    }

    #[test]
    fn test_parse_agg_trade_message() {
        let msg = r#"{
            "e": "aggTrade",
            "E": 1700000000123,
            "s": "BTCUSDT",
            "a": 26129,
            "p": "27000.5",
            "q": "0.001",
            "f": 100,
            "l": 105,
            "T": 1700000000120,
            "m": true
        }"#;

        let observation = BinanceFeed::parse_message(msg).unwrap();
        assert_eq!(observation.symbol, "BTCUSDT");
        assert_eq!(observation.price, dec!(27000.5));
        assert_eq!(observation.event_time_millis, 1_700_000_000_123);
    }

    #[test]
    fn test_parse_minimal_message_with_numeric_price() {
        let msg = r#"{"s":"ETHUSDT","p":1650.25,"E":1700000000999}"#;
        let observation = BinanceFeed::parse_message(msg).unwrap();
        assert_eq!(observation.symbol, "ETHUSDT");
        assert_eq!(observation.price, dec!(1650.25));
    }

    #[test]
    fn test_parse_unexpected_event_type() {
        let msg = r#"{"e":"kline","E":1700000000000,"s":"BTCUSDT","p":"1"}"#;
        assert!(matches!(
            BinanceFeed::parse_message(msg),
            Err(FeedError::UnexpectedEvent(e)) if e == "kline"
        ));
    }

    #[test]
    fn test_parse_missing_field() {
        let msg = r#"{"e":"aggTrade","s":"BTCUSDT","p":"1"}"#;
        assert!(matches!(
            BinanceFeed::parse_message(msg),
            Err(FeedError::Malformed(_))
        ));
    }

    #[test]
    fn test_parse_invalid_price() {
        let msg = r#"{"E":1700000000000,"s":"BTCUSDT","p":"not_a_number"}"#;
        assert!(BinanceFeed::parse_message(msg).is_err());
    }

    #[tokio::test]
    async fn test_subscribe_without_symbols_fails() {
        let feed = BinanceFeed::new(Vec::<String>::new());
        assert!(feed.subscribe().await.is_err());
    }

    #[tokio::test]
    async fn test_message_loop_skips_malformed_ticks() {
        let (ws_tx, ws_rx) = mpsc::channel(10);
        let (tick_tx, mut tick_rx) = mpsc::channel(10);

        let handle = tokio::spawn(async move {
            BinanceFeed::run_message_loop("btcusdt".to_string(), ws_rx, tick_tx).await;
        });

        ws_tx.send(WsMessage::Connected).await.unwrap();
        ws_tx
            .send(WsMessage::Text("invalid json".to_string()))
            .await
            .unwrap();
        ws_tx
            .send(WsMessage::Text(r#"{"s":"BTCUSDT","E":1}"#.to_string()))
            .await
            .unwrap();

        let msg = r#"{"e":"aggTrade","E":1700000000000,"s":"BTCUSDT","p":"100.00"}"#;
        ws_tx.send(WsMessage::Text(msg.to_string())).await.unwrap();

        // Only the valid tick comes through
        let observation = tick_rx.recv().await.unwrap();
        assert_eq!(observation.price, dec!(100.00));

        ws_tx.send(WsMessage::Disconnected).await.unwrap();
        handle.await.unwrap();
        assert!(tick_rx.recv().await.is_none());
    }
}
