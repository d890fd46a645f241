//! # Order Gateway Sidecar Client
//!
//! HTTP implementation of the [`Sidecar`](order_gateway_core::Sidecar)
//! contract.
//!
//! ## Example
//!
//! ```no_run
//! use order_gateway_core::{PublishEvent, Sidecar};
//! use order_gateway_sidecar::{HttpSidecar, RetryPolicy};
//! use serde_json::json;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let sidecar = HttpSidecar::new("http://localhost:3501")?
//!         .with_timeout(Duration::from_secs(5))
//!         .with_retry_policy(RetryPolicy::new(2, Duration::from_millis(100)));
//!
//!     let event = PublishEvent::to_topic("neworder-queue", json!({ "orderId": "42" }));
//!     sidecar.publish(&event).await?;
//!
//!     let reply = sidecar.get_state("orders", "42").await?;
//!     println!("{} {}", reply.status, reply.body_text());
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod retry;

pub use client::{DEFAULT_TIMEOUT, HttpSidecar};
pub use retry::RetryPolicy;
