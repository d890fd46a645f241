//! `HttpSidecar` against a mock sidecar.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use order_gateway_core::{PublishEvent, Record, Sidecar, SidecarError};
use order_gateway_sidecar::{HttpSidecar, RetryPolicy};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> HttpSidecar {
    HttpSidecar::new(&server.uri())
        .unwrap()
        .with_retry_policy(RetryPolicy::new(2, Duration::from_millis(1)))
}

#[tokio::test]
async fn test_publish_posts_event() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/publish"))
        .and(body_json(json!({
            "eventName": "neworder-queue",
            "data": { "orderId": "42", "item": "widget" },
            "to": ["neworder-queue"]
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let event = PublishEvent::to_topic("neworder-queue", json!({ "orderId": "42", "item": "widget" }));
    client_for(&server).publish(&event).await.unwrap();
}

#[tokio::test]
async fn test_publish_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/publish"))
        .respond_with(ResponseTemplate::new(500).set_body_string("broker down"))
        .expect(1)
        .mount(&server)
        .await;

    let event = PublishEvent::to_topic("neworder-queue", json!({ "orderId": "1" }));
    let err = client_for(&server).publish(&event).await.unwrap_err();

    assert_eq!(
        err,
        SidecarError::Rejected {
            status: 500,
            body: "broker down".to_string()
        }
    );
}

#[tokio::test]
async fn test_save_state_posts_record_array() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/state/orders"))
        .and(body_json(json!([
            { "key": "42", "value": { "orderId": 42 } }
        ])))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let records = vec![Record::new("42", json!({ "orderId": 42 }))];
    client_for(&server).save_state("orders", &records).await.unwrap();
}

#[tokio::test]
async fn test_save_state_retries_server_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/state/orders"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/state/orders"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let records = vec![Record::new("7", json!({ "orderId": 7 }))];
    client_for(&server).save_state("orders", &records).await.unwrap();
}

#[tokio::test]
async fn test_save_state_does_not_retry_client_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/state/nowhere"))
        .respond_with(ResponseTemplate::new(404).set_body_string("component not found: nowhere"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client_for(&server)
        .save_state("nowhere", &[Record::new("1", json!({}))])
        .await
        .unwrap_err();

    assert!(matches!(err, SidecarError::Rejected { status: 404, .. }));
}

#[tokio::test]
async fn test_get_state_returns_body_verbatim() {
    let server = MockServer::start().await;
    let raw = br#"[{"key":"42","value":{"orderId":"42","item":"widget"}}]"#;
    Mock::given(method("GET"))
        .and(path("/state/orders/42"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(raw.to_vec(), "application/json"))
        .mount(&server)
        .await;

    let reply = client_for(&server).get_state("orders", "42").await.unwrap();

    assert_eq!(reply.status, 200);
    assert_eq!(reply.body, raw.to_vec());
}

#[tokio::test]
async fn test_get_state_relays_not_found_without_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/state/orders/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("there is no such record"))
        .expect(1)
        .mount(&server)
        .await;

    let reply = client_for(&server).get_state("orders", "missing").await.unwrap();

    assert_eq!(reply.status, 404);
    assert_eq!(reply.body_text(), "there is no such record");
}

#[tokio::test]
async fn test_list_state_hits_store_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/state/orders"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let reply = client_for(&server).list_state("orders").await.unwrap();

    assert_eq!(reply.status, 200);
    assert_eq!(reply.body, b"[]".to_vec());
}

#[tokio::test]
async fn test_delete_state_sends_delete() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/state/orders/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    client_for(&server).delete_state("orders", "42").await.unwrap();
}

#[tokio::test]
async fn test_health_checks_sidecar() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health/check"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    client_for(&server).health().await.unwrap();
}

#[tokio::test]
async fn test_slow_sidecar_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/state/orders/42"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let sidecar = HttpSidecar::new(&server.uri())
        .unwrap()
        .with_timeout(Duration::from_millis(50))
        .with_retry_policy(RetryPolicy::none());

    let err = sidecar.get_state("orders", "42").await.unwrap_err();

    assert_eq!(err, SidecarError::Timeout { after_ms: 50 });
}

#[tokio::test]
async fn test_unreachable_sidecar() {
    let sidecar = HttpSidecar::new("http://127.0.0.1:1")
        .unwrap()
        .with_retry_policy(RetryPolicy::none());

    let err = sidecar.delete_state("orders", "42").await.unwrap_err();

    assert!(matches!(err, SidecarError::Unreachable(_)));
}
