//! Application state for the gateway HTTP server.

use crate::config::{FailureMode, OrdersConfig};
use order_gateway_core::Sidecar;
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
///
/// Read-only after startup and cheap to clone, so handlers never contend on
/// a lock.
#[derive(Clone)]
pub struct AppState {
    /// Sidecar every handler forwards to
    pub sidecar: Arc<dyn Sidecar>,
    /// Target store and topic for orders
    pub orders: Arc<OrdersConfig>,
    /// Reaction to failed sidecar writes
    pub failure_mode: FailureMode,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(sidecar: Arc<dyn Sidecar>, orders: OrdersConfig, failure_mode: FailureMode) -> Self {
        Self {
            sidecar,
            orders: Arc::new(orders),
            failure_mode,
        }
    }
}
