//! Order handling properties over generated payloads.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use axum_test::TestServer;
use order_gateway::config::OrdersConfig;
use order_gateway::server::{AppState, build_router};
use order_gateway::{FailureMode, RouteSet};
use order_gateway_core::Record;
use order_gateway_testing::{RecordingSidecar, SidecarCall};
use proptest::prelude::*;
use serde_json::{Map, Value, json};
use std::sync::Arc;

/// An `orderId` value paired with the record key it must produce.
fn order_id() -> impl Strategy<Value = (Value, String)> {
    prop_oneof![
        "[a-zA-Z0-9-]{1,12}".prop_map(|s| (Value::from(s.clone()), s)),
        any::<u32>().prop_map(|n| (Value::from(n), n.to_string())),
        any::<i32>().prop_map(|n| (Value::from(f64::from(n)), n.to_string())),
    ]
}

fn order_data() -> impl Strategy<Value = (String, Value)> {
    (
        order_id(),
        prop::collection::btree_map("[a-z]{1,8}", "[ -~]{0,16}", 0..4),
    )
        .prop_map(|((id, key), extra)| {
            let mut data: Map<String, Value> = extra
                .into_iter()
                .map(|(k, v)| (k, Value::from(v)))
                .collect();
            data.insert("orderId".to_string(), id);
            (key, Value::Object(data))
        })
}

fn test_server(sidecar: &RecordingSidecar) -> TestServer {
    let state = AppState::new(
        Arc::new(sidecar.clone()),
        OrdersConfig {
            store: "orders".to_string(),
            topic: "neworder-queue".to_string(),
        },
        FailureMode::BestEffort,
    );
    TestServer::new(build_router(state, RouteSet::All)).expect("Failed to start test server")
}

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(future)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn neworder_queue_directive_carries_payload((key, data) in order_data()) {
        let body = block_on(async {
            let sidecar = RecordingSidecar::new();
            test_server(&sidecar)
                .post("/neworder-queue")
                .json(&json!({ "data": data.clone() }))
                .await
                .json::<Value>()
        });

        prop_assert_eq!(&body["state"]["records"][0]["key"], &Value::String(key));
        prop_assert_eq!(&body["state"]["records"][0]["value"], &data);
    }

    #[test]
    fn neworder_node_writes_exactly_one_record((key, data) in order_data()) {
        let calls = block_on(async {
            let sidecar = RecordingSidecar::new();
            test_server(&sidecar)
                .post("/neworder-node")
                .json(&json!({ "data": data.clone() }))
                .await;
            sidecar.calls()
        });

        prop_assert_eq!(
            calls,
            vec![SidecarCall::SaveState {
                store_id: "orders".to_string(),
                records: vec![Record::new(key, data)],
            }]
        );
    }
}
