//! The sidecar contract.
//!
//! The sidecar is an external companion process exposing pub/sub publishing
//! and key-value state over local HTTP. The gateway only ever talks to it
//! through the [`Sidecar`] trait so that handlers can be exercised against an
//! in-memory double.
//!
//! # Endpoints
//!
//! ```text
//! POST   /publish                {eventName, data, to}
//! POST   /state/{storeId}        [{key, value}, ...]
//! GET    /state/{storeId}        all records
//! GET    /state/{storeId}/{key}  one record
//! DELETE /state/{storeId}/{key}
//! GET    /health/check
//! ```

use crate::order::{PublishEvent, Record};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Errors produced by an outbound sidecar call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SidecarError {
    /// The sidecar could not be reached (connect or transport failure).
    #[error("sidecar unreachable: {0}")]
    Unreachable(String),

    /// The call did not complete within the configured timeout.
    #[error("sidecar call timed out after {after_ms}ms")]
    Timeout {
        /// Timeout that elapsed, in milliseconds
        after_ms: u64,
    },

    /// The sidecar refused a write-style call.
    #[error("sidecar rejected the call (status {status}): {body}")]
    Rejected {
        /// HTTP status returned by the sidecar
        status: u16,
        /// Response body, as text
        body: String,
    },

    /// The response could not be read.
    #[error("invalid sidecar response: {0}")]
    InvalidResponse(String),

    /// The configured base URL is unusable.
    #[error("invalid sidecar base URL: {0}")]
    InvalidBaseUrl(String),
}

impl SidecarError {
    /// Whether repeating the same call could succeed.
    ///
    /// Transport failures, timeouts and 5xx rejections are transient; 4xx
    /// rejections and local errors are not.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Unreachable(_) | Self::Timeout { .. } => true,
            Self::Rejected { status, .. } => *status >= 500,
            Self::InvalidResponse(_) | Self::InvalidBaseUrl(_) => false,
        }
    }
}

/// A sidecar response kept byte-for-byte so it can be relayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidecarReply {
    /// HTTP status returned by the sidecar.
    pub status: u16,
    /// Raw response body.
    pub body: Vec<u8>,
}

impl SidecarReply {
    /// Create a reply.
    #[must_use]
    pub const fn new(status: u16, body: Vec<u8>) -> Self {
        Self { status, body }
    }

    /// Whether the status is in the 2xx range.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Body as lossy UTF-8, for logging.
    #[must_use]
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Boxed future returned by [`Sidecar`] methods.
pub type SidecarFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, SidecarError>> + Send + 'a>>;

/// Outbound operations the gateway performs against the sidecar.
///
/// Write-style calls ([`publish`](Self::publish), [`save_state`](Self::save_state),
/// [`delete_state`](Self::delete_state), [`health`](Self::health)) report a
/// non-2xx status as [`SidecarError::Rejected`]. Read-style calls return the
/// reply whatever its status, since the gateway relays it verbatim.
///
/// # Dyn Compatibility
///
/// Methods return [`SidecarFuture`] instead of using `async fn` so the trait
/// can be shared as `Arc<dyn Sidecar>` across handlers.
pub trait Sidecar: Send + Sync {
    /// Publish an event.
    ///
    /// # Errors
    ///
    /// Returns a [`SidecarError`] if the call fails or is rejected.
    fn publish<'a>(&'a self, event: &'a PublishEvent) -> SidecarFuture<'a, ()>;

    /// Bulk-write records to a store.
    ///
    /// # Errors
    ///
    /// Returns a [`SidecarError`] if the call fails or is rejected.
    fn save_state<'a>(&'a self, store_id: &'a str, records: &'a [Record]) -> SidecarFuture<'a, ()>;

    /// Read one key from a store.
    ///
    /// # Errors
    ///
    /// Returns a [`SidecarError`] only if no reply could be obtained.
    fn get_state<'a>(&'a self, store_id: &'a str, key: &'a str) -> SidecarFuture<'a, SidecarReply>;

    /// Read every record of a store.
    ///
    /// # Errors
    ///
    /// Returns a [`SidecarError`] only if no reply could be obtained.
    fn list_state<'a>(&'a self, store_id: &'a str) -> SidecarFuture<'a, SidecarReply>;

    /// Remove one key from a store.
    ///
    /// # Errors
    ///
    /// Returns a [`SidecarError`] if the call fails or is rejected.
    fn delete_state<'a>(&'a self, store_id: &'a str, key: &'a str) -> SidecarFuture<'a, ()>;

    /// Probe the sidecar's health endpoint.
    ///
    /// # Errors
    ///
    /// Returns a [`SidecarError`] if the sidecar is unreachable or unhealthy.
    fn health(&self) -> SidecarFuture<'_, ()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(SidecarError::Unreachable("refused".into()).is_retryable());
        assert!(SidecarError::Timeout { after_ms: 10 }.is_retryable());
        assert!(
            SidecarError::Rejected {
                status: 503,
                body: String::new()
            }
            .is_retryable()
        );
        assert!(
            !SidecarError::Rejected {
                status: 404,
                body: String::new()
            }
            .is_retryable()
        );
        assert!(!SidecarError::InvalidBaseUrl("nope".into()).is_retryable());
    }

    #[test]
    fn test_reply_success_range() {
        assert!(SidecarReply::new(200, vec![]).is_success());
        assert!(SidecarReply::new(204, vec![]).is_success());
        assert!(!SidecarReply::new(404, b"missing".to_vec()).is_success());
        assert_eq!(SidecarReply::new(404, b"missing".to_vec()).body_text(), "missing");
    }

    #[test]
    fn test_sidecar_is_dyn_compatible() {
        fn assert_dyn(_: Option<&dyn Sidecar>) {}
        assert_dyn(None);
    }
}
