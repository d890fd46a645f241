//! # Order Gateway
//!
//! HTTP front door for orders. Clients talk to the gateway; the gateway
//! talks to a co-located sidecar that owns pub/sub delivery and key-value
//! state. Two flows are offered:
//!
//! - **Event first**: `POST /neworder` publishes the order; the sidecar
//!   delivers it back to `POST /neworder-queue`, which answers with the state
//!   directive that stores it.
//! - **Direct write**: `POST /neworder-node` stores the order itself, with
//!   `GET /order`, `GET /order/:id` and `DELETE /order/:id` alongside.
//!
//! Configuration comes from the environment, see [`config::GatewayConfig`].
//!
//! ## Example
//!
//! ```no_run
//! use order_gateway::{GatewayConfig, server::{AppState, build_router}};
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = GatewayConfig::from_env()?;
//! let sidecar = Arc::new(config.sidecar.client()?);
//! let state = AppState::new(sidecar, config.orders.clone(), config.server.failure_mode);
//!
//! let app = build_router(state, config.server.routes);
//! let listener = tokio::net::TcpListener::bind(config.server.bind_address()).await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod lifecycle;
pub mod producer;
pub mod server;

pub use config::{ConfigError, FailureMode, GatewayConfig, ProducerConfig, RouteSet};
pub use producer::OrderProducer;
