//! Error types for web handlers.
//!
//! [`AppError`] bridges domain and sidecar errors to HTTP responses by
//! implementing Axum's `IntoResponse`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use order_gateway_core::{OrderError, SidecarError};
use serde::Serialize;
use std::fmt;

/// Application error type for web handlers.
///
/// Rendered as `{"code": ..., "message": ...}` with the carried status.
///
/// # Examples
///
/// ```ignore
/// async fn handler(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
///     state.sidecar.health().await?;
///     Ok(Json(json!({})))
/// }
/// ```
#[derive(Debug)]
pub struct AppError {
    /// HTTP status code
    status: StatusCode,
    /// Error message (user-facing)
    message: String,
    /// Error code (for client error handling)
    code: String,
    /// Internal error (for logging, not exposed to client)
    source: Option<anyhow::Error>,
}

impl AppError {
    /// Create a new application error.
    #[must_use]
    pub const fn new(status: StatusCode, message: String, code: String) -> Self {
        Self {
            status,
            message,
            code,
            source: None,
        }
    }

    /// Attach the underlying cause.
    #[must_use]
    pub fn with_source(mut self, source: anyhow::Error) -> Self {
        self.source = Some(source);
        self
    }

    /// Create a 422 Unprocessable Entity error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            message.into(),
            "VALIDATION_ERROR".to_string(),
        )
    }

    /// Create a 502 Bad Gateway error.
    #[must_use]
    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::BAD_GATEWAY,
            message.into(),
            "BAD_GATEWAY".to_string(),
        )
    }

    /// Create a 504 Gateway Timeout error.
    #[must_use]
    pub fn gateway_timeout(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::GATEWAY_TIMEOUT,
            message.into(),
            "GATEWAY_TIMEOUT".to_string(),
        )
    }

    /// HTTP status this error renders with.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Machine-readable error code.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Error response body (JSON).
#[derive(Debug, Serialize)]
struct ErrorResponse {
    /// Error code (for client error handling).
    code: String,
    /// Human-readable error message.
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            match &self.source {
                Some(source) => tracing::error!(
                    status = %self.status,
                    code = %self.code,
                    message = %self.message,
                    error = %source,
                    "Request failed"
                ),
                None => tracing::error!(
                    status = %self.status,
                    code = %self.code,
                    message = %self.message,
                    "Request failed"
                ),
            }
        }

        let body = ErrorResponse {
            code: self.code,
            message: self.message,
        };

        (self.status, Json(body)).into_response()
    }
}

/// Sidecar failures surface as gateway errors: 504 for timeouts, 502 otherwise.
impl From<SidecarError> for AppError {
    fn from(err: SidecarError) -> Self {
        let app_error = match &err {
            SidecarError::Timeout { .. } => Self::gateway_timeout("Sidecar did not respond in time"),
            SidecarError::Rejected { status, .. } => {
                Self::bad_gateway(format!("Sidecar rejected the request with status {status}"))
            }
            SidecarError::Unreachable(_)
            | SidecarError::InvalidResponse(_)
            | SidecarError::InvalidBaseUrl(_) => Self::bad_gateway("Sidecar is unavailable"),
        };

        app_error.with_source(err.into())
    }
}

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        Self::validation(err.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AppError::validation("Invalid input");
        assert_eq!(err.to_string(), "[VALIDATION_ERROR] Invalid input");
    }

    #[test]
    fn test_sidecar_timeout_maps_to_504() {
        let err = AppError::from(SidecarError::Timeout { after_ms: 100 });
        assert_eq!(err.status(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(err.code(), "GATEWAY_TIMEOUT");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_sidecar_failures_map_to_502() {
        let unreachable = AppError::from(SidecarError::Unreachable("refused".into()));
        assert_eq!(unreachable.status(), StatusCode::BAD_GATEWAY);

        let rejected = AppError::from(SidecarError::Rejected {
            status: 500,
            body: "boom".into(),
        });
        assert_eq!(rejected.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            rejected.to_string(),
            "[BAD_GATEWAY] Sidecar rejected the request with status 500"
        );
    }

    #[test]
    fn test_order_errors_are_validation_errors() {
        let err = AppError::from(OrderError::MissingOrderId);
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_renders_json_body() {
        let response = AppError::validation("order data is missing `orderId`").into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["message"], "order data is missing `orderId`");
    }
}
