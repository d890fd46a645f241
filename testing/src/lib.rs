//! # Order Gateway Testing
//!
//! Test doubles and fixtures for the order gateway.
//!
//! - [`RecordingSidecar`]: in-memory [`Sidecar`](order_gateway_core::Sidecar)
//!   that records calls and can be told to fail
//! - [`sample_order_data`]: a representative order payload
//!
//! ## Example
//!
//! ```ignore
//! use order_gateway_testing::{RecordingSidecar, sample_order_data};
//!
//! #[tokio::test]
//! async fn test_publish_order() {
//!     let sidecar = RecordingSidecar::new();
//!     let server = test_server(sidecar.clone());
//!
//!     server
//!         .post("/neworder")
//!         .json(&json!({ "data": sample_order_data("42") }))
//!         .await
//!         .assert_status_ok();
//!
//!     assert_eq!(sidecar.published().len(), 1);
//! }
//! ```

pub mod sidecar_mock;

pub use sidecar_mock::{RecordingSidecar, SidecarCall};

use serde_json::{Value, json};

/// Order payload `{"orderId": order_id, "item": "widget"}`.
///
/// ```
/// use order_gateway_testing::sample_order_data;
///
/// assert_eq!(sample_order_data(7)["orderId"], 7);
/// assert_eq!(sample_order_data("7")["orderId"], "7");
/// ```
#[must_use]
pub fn sample_order_data(order_id: impl Into<Value>) -> Value {
    json!({ "orderId": order_id.into(), "item": "widget" })
}
