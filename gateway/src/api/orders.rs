//! Order endpoints.
//!
//! Each handler turns one inbound request into at most one sidecar call.
//!
//! | Route                   | Sidecar call                         |
//! |-------------------------|--------------------------------------|
//! | `POST /neworder`        | publish to the orders topic          |
//! | `POST /neworder-queue`  | none, answers with a state directive |
//! | `POST /neworder-node`   | save one record                      |
//! | `GET /order`            | list the orders store                |
//! | `GET /order/:id`        | read one key                         |
//! | `DELETE /order/:id`     | delete one key                       |

use crate::config::FailureMode;
use crate::server::AppState;
use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use order_gateway_core::{Order, PublishEvent, SidecarError, SidecarReply, StateDirective};
use order_gateway_web::{AppError, CorrelationId, WebResult};
use serde::Deserialize;
use serde_json::{Value, json};

/// Inbound order body: `{"data": <order payload>}`.
#[derive(Debug, Deserialize)]
pub struct OrderRequest {
    /// Opaque order payload
    pub data: Value,
}

/// Publish an order to the orders topic.
///
/// # Endpoint
///
/// ```text
/// POST /neworder
/// ```
///
/// # Errors
///
/// In strict mode, returns 502/504 when the publish fails.
pub async fn publish_order(
    State(state): State<AppState>,
    correlation_id: CorrelationId,
    Json(request): Json<OrderRequest>,
) -> WebResult<Json<Value>> {
    let event = PublishEvent::to_topic(&state.orders.topic, request.data);
    let outcome = state.sidecar.publish(&event).await;

    settle_write(state.failure_mode, "publish", correlation_id, outcome)?;
    Ok(Json(json!({})))
}

/// Accept an order delivered by the sidecar's subscription and answer with
/// the state directive that persists it.
///
/// # Endpoint
///
/// ```text
/// POST /neworder-queue
/// ```
///
/// # Errors
///
/// Returns 422 when `data.orderId` is missing or not a scalar.
pub async fn receive_order(
    State(state): State<AppState>,
    Json(request): Json<OrderRequest>,
) -> WebResult<Json<StateDirective>> {
    let order = Order::from_data(request.data)?;

    tracing::info!(order_id = %order.id(), "got a new order");

    Ok(Json(StateDirective::single(
        state.orders.store.as_str(),
        order.into_record(),
    )))
}

/// Write an order straight into the orders store.
///
/// # Endpoint
///
/// ```text
/// POST /neworder-node
/// ```
///
/// # Errors
///
/// Returns 422 when `data.orderId` is missing or not a scalar, and in
/// strict mode 502/504 when the write fails.
pub async fn persist_order(
    State(state): State<AppState>,
    correlation_id: CorrelationId,
    Json(request): Json<OrderRequest>,
) -> WebResult<Json<Value>> {
    let order = Order::from_data(request.data)?;
    tracing::info!(order_id = %order.id(), "Persisting order");

    let records = [order.into_record()];

    let outcome = state.sidecar.save_state(&state.orders.store, &records).await;

    settle_write(state.failure_mode, "save_state", correlation_id, outcome)?;
    Ok(Json(json!({})))
}

/// Relay the whole orders store.
///
/// # Endpoint
///
/// ```text
/// GET /order
/// ```
///
/// # Errors
///
/// Returns 502/504 when the sidecar gives no reply.
pub async fn list_orders(State(state): State<AppState>) -> WebResult<Response> {
    let reply = state.sidecar.list_state(&state.orders.store).await?;
    Ok(relay(reply))
}

/// Relay one order.
///
/// # Endpoint
///
/// ```text
/// GET /order/:id
/// ```
///
/// # Errors
///
/// Returns 502/504 when the sidecar gives no reply.
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> WebResult<Response> {
    let reply = state.sidecar.get_state(&state.orders.store, &id).await?;
    Ok(relay(reply))
}

/// Delete one order.
///
/// # Endpoint
///
/// ```text
/// DELETE /order/:id
/// ```
///
/// # Errors
///
/// In strict mode, returns 502/504 when the delete fails.
pub async fn delete_order(
    State(state): State<AppState>,
    correlation_id: CorrelationId,
    Path(id): Path<String>,
) -> WebResult<Json<Value>> {
    let outcome = state.sidecar.delete_state(&state.orders.store, &id).await;

    settle_write(state.failure_mode, "delete_state", correlation_id, outcome)?;
    Ok(Json(json!({})))
}

/// Apply the failure mode to the outcome of a sidecar write.
fn settle_write(
    mode: FailureMode,
    operation: &'static str,
    correlation_id: CorrelationId,
    outcome: Result<(), SidecarError>,
) -> Result<(), AppError> {
    let Err(error) = outcome else {
        return Ok(());
    };

    match mode {
        FailureMode::BestEffort => {
            tracing::warn!(
                operation,
                correlation_id = %correlation_id.0,
                error = %error,
                "Sidecar write failed, acknowledging anyway"
            );
            Ok(())
        }
        FailureMode::Strict => Err(error.into()),
    }
}

/// Pass a sidecar reply through with its status and body unchanged.
fn relay(reply: SidecarReply) -> Response {
    tracing::debug!(status = reply.status, body = %reply.body_text(), "Relaying sidecar reply");

    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::BAD_GATEWAY);

    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        reply.body,
    )
        .into_response()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn correlation() -> CorrelationId {
        CorrelationId(Default::default())
    }

    #[test]
    fn test_best_effort_swallows_failures() {
        let outcome = Err(SidecarError::Unreachable("connection refused".into()));

        assert!(settle_write(FailureMode::BestEffort, "publish", correlation(), outcome).is_ok());
    }

    #[test]
    fn test_strict_maps_failures_to_gateway_errors() {
        let timeout = settle_write(
            FailureMode::Strict,
            "publish",
            correlation(),
            Err(SidecarError::Timeout { after_ms: 10 }),
        )
        .unwrap_err();
        assert_eq!(timeout.status(), StatusCode::GATEWAY_TIMEOUT);

        let rejected = settle_write(
            FailureMode::Strict,
            "save_state",
            correlation(),
            Err(SidecarError::Rejected {
                status: 400,
                body: "bad".into(),
            }),
        )
        .unwrap_err();
        assert_eq!(rejected.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_relay_keeps_status_and_body() {
        let response = relay(SidecarReply::new(404, b"no such key".to_vec()));

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"no such key");
    }
}
