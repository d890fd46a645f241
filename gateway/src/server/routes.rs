//! Router configuration for the order gateway.

use super::health::readiness_check;
use super::state::AppState;
use crate::api::orders;
use crate::config::RouteSet;
use axum::{
    Router,
    routing::{get, post},
};
use order_gateway_web::{correlation_id_layer, handlers::health_check};
use tower_http::trace::TraceLayer;

/// Build the Axum router for `routes`.
///
/// Every route set serves `GET /health` and `GET /ready`. `GET /order/:id`
/// belongs to both families and is registered once.
///
/// Requests pass through the correlation-id layer first, then `TraceLayer`.
pub fn build_router(state: AppState, routes: RouteSet) -> Router {
    let mut router = Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check));

    if routes.includes_event_first() {
        router = router
            .route("/neworder", post(orders::publish_order))
            .route("/neworder-queue", post(orders::receive_order));
    }

    let mut order_by_id = get(orders::get_order);

    if routes.includes_direct_write() {
        router = router
            .route("/neworder-node", post(orders::persist_order))
            .route("/order", get(orders::list_orders));
        order_by_id = order_by_id.delete(orders::delete_order);
    }

    router
        .route("/order/:id", order_by_id)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(correlation_id_layer())
}
