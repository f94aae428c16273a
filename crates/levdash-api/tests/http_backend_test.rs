//! HTTP backend integration tests.
//!
//! Runs `HttpBackend` against an in-process mock server:
//! - Response schema validation
//! - 404 / non-2xx / transport failure mapping
//! - Request shape (paths, query strings, JSON bodies)

mod integration;
use integration::common::mock_backend::MockBackend;

use levdash_api::{ApiError, BackendApi, BugReport, HttpBackend};
use levdash_core::{PositionStatus, WalletId};
use rust_decimal_macros::dec;
use std::time::Duration;

const WALLET: &str = "0xABCDEF0123456789ABCDEF1234";

fn wallet() -> WalletId {
    WalletId::parse(WALLET).unwrap()
}

fn backend(server: &MockBackend) -> HttpBackend {
    HttpBackend::new(server.url(), Duration::from_secs(2)).unwrap()
}

#[tokio::test]
async fn test_user_positions_single_object() {
    let server = MockBackend::start().await;
    server
        .respond(
            &format!("/api/user-positions/{WALLET}"),
            200,
            r#"{"amount":"12.3","status":"OPENED","start_price":10.5,"multiplier":2,"is_liquidated":false}"#,
        )
        .await;

    let positions = backend(&server).user_positions(&wallet()).await.unwrap();

    assert_eq!(positions.len(), 1);
    assert_eq!(positions[0].amount.value(), Some(dec!(12.3)));
    assert_eq!(positions[0].status, PositionStatus::Opened);
    server.shutdown();
}

#[tokio::test]
async fn test_user_positions_not_found_is_empty() {
    let server = MockBackend::start().await;

    let positions = backend(&server).user_positions(&wallet()).await.unwrap();

    assert!(positions.is_empty());
    server.shutdown();
}

#[tokio::test]
async fn test_close_position_server_error_message() {
    let server = MockBackend::start().await;
    server
        .respond(
            "/api/close-position",
            500,
            r#"{"message":"insufficient balance"}"#,
        )
        .await;

    let err = backend(&server).close_position(&wallet()).await.unwrap_err();

    assert_eq!(
        err,
        ApiError::Server {
            status: 500,
            message: Some("insufficient balance".to_string()),
        }
    );
    let requests = server.requests().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].query.as_deref(), Some(format!("wallet_id={WALLET}").as_str()));
    server.shutdown();
}

#[tokio::test]
async fn test_server_error_without_message() {
    let server = MockBackend::start().await;
    server.respond("/api/withdraw-all", 502, "bad gateway").await;

    let err = backend(&server).withdraw_all(&wallet()).await.unwrap_err();

    assert_eq!(
        err,
        ApiError::Server {
            status: 502,
            message: None,
        }
    );
    server.shutdown();
}

#[tokio::test]
async fn test_dashboard_query_and_parse() {
    let server = MockBackend::start().await;
    server
        .respond(
            "/api/dashboard",
            200,
            r#"{"health_ratio":"1.8","borrowed":"250","balance":"0.75","deposited_data":{"ETH":"0.75"}}"#,
        )
        .await;

    let data = backend(&server).dashboard(&wallet()).await.unwrap();

    assert_eq!(data.health_factor.as_deref(), Some("1.8"));
    assert_eq!(data.borrow_balance.value(), Some(dec!(250)));
    assert_eq!(data.collateral_balance.value(), Some(dec!(0.75)));

    let requests = server.requests().await;
    assert_eq!(requests[0].method, "GET");
    assert_eq!(requests[0].path, "/api/dashboard");
    assert_eq!(requests[0].query.as_deref(), Some(format!("wallet_id={WALLET}").as_str()));
    server.shutdown();
}

#[tokio::test]
async fn test_malformed_dashboard_rejected() {
    let server = MockBackend::start().await;
    server.respond("/api/dashboard", 200, r#""maintenance""#).await;

    let err = backend(&server).dashboard(&wallet()).await.unwrap_err();

    assert!(matches!(err, ApiError::Malformed(_)));
    server.shutdown();
}

#[tokio::test]
async fn test_stats() {
    let server = MockBackend::start().await;
    server
        .respond(
            "/api/get_stats",
            200,
            r#"{"total_opened_amount":1234567.89,"unique_users":42}"#,
        )
        .await;

    let stats = backend(&server).stats().await.unwrap();

    assert_eq!(stats.total_opened_amount.value(), Some(dec!(1234567.89)));
    assert_eq!(stats.unique_users, Some(42));
    server.shutdown();
}

#[tokio::test]
async fn test_bug_report_body() {
    let server = MockBackend::start().await;
    server
        .respond("/api/save-bug-report", 200, r#"{"message":"Saved"}"#)
        .await;

    let report = BugReport {
        wallet_id: wallet(),
        telegram_id: Some("12345".to_string()),
        bug_description: "Close button does nothing".to_string(),
    };
    let ack = backend(&server).save_bug_report(&report).await.unwrap();

    assert_eq!(ack.message.as_deref(), Some("Saved"));
    let requests = server.requests().await;
    assert_eq!(requests[0].method, "POST");
    let body: serde_json::Value = serde_json::from_str(&requests[0].body).unwrap();
    assert_eq!(body["wallet_id"], WALLET);
    assert_eq!(body["telegram_id"], "12345");
    assert_eq!(body["bug_description"], "Close button does nothing");
    server.shutdown();
}

#[tokio::test]
async fn test_subscribe_body() {
    let server = MockBackend::start().await;
    server
        .respond("/api/subscribe-to-notification", 200, "")
        .await;

    let ack = backend(&server)
        .subscribe_notifications(&wallet(), "555")
        .await
        .unwrap();

    assert!(ack.message.is_none());
    let requests = server.requests().await;
    let body: serde_json::Value = serde_json::from_str(&requests[0].body).unwrap();
    assert_eq!(body["telegram_id"], "555");
    server.shutdown();
}

#[tokio::test]
async fn test_transport_failure_is_network_error() {
    // Bind and immediately release a port so nothing is listening on it
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let backend = HttpBackend::new(format!("http://{addr}"), Duration::from_secs(2)).unwrap();
    let err = backend.stats().await.unwrap_err();

    assert!(matches!(err, ApiError::Network(_)));
}
