//! Axum glue for the order gateway.
//!
//! Handlers in the gateway binary stay thin: they parse the inbound JSON,
//! call the [`Sidecar`](order_gateway_core::Sidecar) and map the outcome to
//! HTTP. This crate holds the pieces those handlers share:
//!
//! - [`AppError`]: the JSON error body and the sidecar-failure to status
//!   mapping (504 for timeouts, 502 for everything else).
//! - [`correlation_id_layer`]: per-request `X-Correlation-ID` and tracing span.
//! - [`CorrelationId`]: extractor for the id inside handlers.
//! - [`handlers::health_check`]: liveness.
//!
//! # Example
//!
//! ```ignore
//! use axum::{Router, routing::get};
//! use order_gateway_web::{correlation_id_layer, handlers::health_check};
//!
//! let app = Router::new()
//!     .route("/health", get(health_check))
//!     .layer(correlation_id_layer());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;

pub use error::AppError;
pub use extractors::CorrelationId;
pub use middleware::{CORRELATION_ID_HEADER, correlation_id_layer};

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
