//! # Order Gateway Core
//!
//! Domain types and the sidecar contract for the order gateway.
//!
//! The gateway is a thin HTTP-to-HTTP translator: each inbound request turns
//! into at most one call against a sidecar process that owns pub/sub delivery
//! and key-value state. This crate holds everything about that translation that
//! does not perform I/O:
//!
//! - **Orders**: [`order::OrderId`] and [`order::Order`], extracted from an
//!   otherwise opaque JSON payload
//! - **Wire shapes**: [`order::Record`], [`order::StateDirective`] and
//!   [`order::PublishEvent`], serialized exactly as the sidecar expects them
//! - **The contract**: the [`sidecar::Sidecar`] trait and its
//!   [`sidecar::SidecarError`] taxonomy
//!
//! ## Example
//!
//! ```
//! use order_gateway_core::order::Order;
//! use serde_json::json;
//!
//! let order = Order::from_data(json!({ "orderId": 42, "item": "widget" }))?;
//! let record = order.into_record();
//!
//! assert_eq!(record.key, "42");
//! assert_eq!(record.value, json!({ "orderId": 42, "item": "widget" }));
//! # Ok::<(), order_gateway_core::order::OrderError>(())
//! ```

pub mod order;
pub mod sidecar;

// Re-export the types most callers need
pub use order::{Order, OrderError, OrderId, PublishEvent, Record, StateDirective, StateWrite};
pub use sidecar::{Sidecar, SidecarError, SidecarFuture, SidecarReply};
