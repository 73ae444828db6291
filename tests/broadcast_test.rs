//! Integration tests for the HTTP broadcast endpoint

use mockito::Matcher;
use oracle_relay::broadcast::{
    BroadcastError, BroadcastGate, BroadcastMode, NodeRole, RpcBroadcaster, TxSubmitter,
};
use oracle_relay::codec::to_hex;
use oracle_relay::message::PriceUpdate;
use std::sync::Arc;
use std::time::Duration;

fn update() -> PriceUpdate {
    PriceUpdate {
        feed_key: "Binance|BTCUSDT|price".to_string(),
        value: 27000,
        timestamp_secs: 1_700_000_000,
    }
}

fn tx_param(update: &PriceUpdate) -> String {
    format!("0x{}", to_hex(&update.encode_transaction().unwrap()))
}

#[tokio::test]
async fn test_submit_hex_encoded_transaction() {
    let mut server = mockito::Server::new_async().await;
    let update = update();

    let mock = server
        .mock("GET", "/broadcast_tx_async")
        .match_query(Matcher::UrlEncoded("tx".into(), tx_param(&update)))
        .with_status(200)
        .with_body(r#"{"jsonrpc":"2.0","id":-1,"result":{"code":0}}"#)
        .create_async()
        .await;

    let broadcaster =
        RpcBroadcaster::new(server.url(), BroadcastMode::Async, Duration::from_secs(5)).unwrap();
    broadcaster
        .submit(&update.encode_transaction().unwrap())
        .await
        .unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_sync_mode_route() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/broadcast_tx_sync")
        .match_query(Matcher::Any)
        .with_status(200)
        .create_async()
        .await;

    let broadcaster =
        RpcBroadcaster::new(server.url(), BroadcastMode::Sync, Duration::from_secs(5)).unwrap();
    broadcaster.submit(b"{}").await.unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_non_success_status_is_rejected_with_body() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/broadcast_tx_async")
        .match_query(Matcher::Any)
        .with_status(500)
        .with_body("tx already exists in cache")
        .create_async()
        .await;

    let broadcaster =
        RpcBroadcaster::new(server.url(), BroadcastMode::Async, Duration::from_secs(5)).unwrap();
    let err = broadcaster.submit(b"{}").await.unwrap_err();

    match err {
        BroadcastError::Rejected { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "tx already exists in cache");
        }
        other => panic!("expected rejection, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unreachable_node_is_http_error() {
    let broadcaster = RpcBroadcaster::new(
        "http://127.0.0.1:1",
        BroadcastMode::Async,
        Duration::from_secs(2),
    )
    .unwrap();
    assert!(matches!(
        broadcaster.submit(b"{}").await,
        Err(BroadcastError::Http(_))
    ));
}

#[tokio::test]
async fn test_gate_submits_once_through_rpc() {
    let mut server = mockito::Server::new_async().await;
    let update = update();

    let mock = server
        .mock("GET", "/broadcast_tx_async")
        .match_query(Matcher::UrlEncoded("tx".into(), tx_param(&update)))
        .with_status(200)
        .expect(1)
        .create_async()
        .await;

    let broadcaster =
        RpcBroadcaster::new(server.url(), BroadcastMode::Async, Duration::from_secs(5)).unwrap();
    let gate = BroadcastGate::new(
        NodeRole::Broadcaster,
        Duration::from_millis(20),
        Arc::new(broadcaster),
    );

    gate.schedule(update).unwrap().await.unwrap();
    mock.assert_async().await;
}
