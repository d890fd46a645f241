//! reqwest-backed [`Sidecar`] implementation.

use crate::retry::{RetryPolicy, retry_while};
use order_gateway_core::{PublishEvent, Record, Sidecar, SidecarError, SidecarFuture, SidecarReply};
use reqwest::{Client, Method, RequestBuilder, Url};
use std::time::Duration;

/// Default per-call timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Sidecar client speaking the sidecar's local HTTP API.
///
/// Cheap to clone; the underlying connection pool is shared.
#[derive(Clone, Debug)]
pub struct HttpSidecar {
    client: Client,
    base_url: Url,
    timeout: Duration,
    retry: RetryPolicy,
}

impl HttpSidecar {
    /// Create a client for the sidecar at `base_url`
    /// (e.g. `http://localhost:3501`).
    ///
    /// # Errors
    ///
    /// Returns [`SidecarError::InvalidBaseUrl`] unless `base_url` is an
    /// absolute `http` or `https` URL.
    pub fn new(base_url: &str) -> Result<Self, SidecarError> {
        let parsed =
            Url::parse(base_url).map_err(|e| SidecarError::InvalidBaseUrl(format!("{base_url}: {e}")))?;

        if parsed.cannot_be_a_base() || !matches!(parsed.scheme(), "http" | "https") {
            return Err(SidecarError::InvalidBaseUrl(format!(
                "{base_url}: expected an http(s) URL"
            )));
        }

        Ok(Self {
            client: Client::new(),
            base_url: parsed,
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
        })
    }

    /// Bound every call by `timeout`.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Retry idempotent calls according to `policy`.
    #[must_use]
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    /// Build `{base}/{segments...}`, percent-encoding each segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, SidecarError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| SidecarError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn map_transport_error(&self, err: &reqwest::Error) -> SidecarError {
        if err.is_timeout() {
            SidecarError::Timeout {
                after_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
            }
        } else {
            SidecarError::Unreachable(err.to_string())
        }
    }

    /// Send one request and capture the reply verbatim.
    async fn execute(&self, method: Method, url: &Url, request: RequestBuilder) -> Result<SidecarReply, SidecarError> {
        let response = match request.timeout(self.timeout).send().await {
            Ok(response) => response,
            Err(e) => {
                let err = self.map_transport_error(&e);
                tracing::warn!(%method, path = url.path(), error = %err, "Sidecar call failed");
                return Err(err);
            }
        };

        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                self.map_transport_error(&e)
            } else {
                SidecarError::InvalidResponse(e.to_string())
            }
        })?;

        tracing::debug!(%method, path = url.path(), status, "Sidecar call completed");

        Ok(SidecarReply::new(status, body.to_vec()))
    }

    /// Send an idempotent request under the retry policy.
    async fn execute_idempotent(
        &self,
        operation: &str,
        method: Method,
        url: Url,
    ) -> Result<SidecarReply, SidecarError> {
        retry_while(
            &self.retry,
            operation,
            || {
                let request = self.client.request(method.clone(), url.clone());
                self.execute(method.clone(), &url, request)
            },
            |outcome| match outcome {
                Ok(reply) => reply.status >= 500,
                Err(e) => e.is_retryable(),
            },
        )
        .await
    }
}

/// Turn a non-2xx reply to a write-style call into an error.
fn expect_success(reply: SidecarReply) -> Result<(), SidecarError> {
    if reply.is_success() {
        Ok(())
    } else {
        Err(SidecarError::Rejected {
            status: reply.status,
            body: reply.body_text(),
        })
    }
}

impl Sidecar for HttpSidecar {
    fn publish<'a>(&'a self, event: &'a PublishEvent) -> SidecarFuture<'a, ()> {
        Box::pin(async move {
            let url = self.endpoint(&["publish"])?;
            let request = self.client.post(url.clone()).json(event);

            // Publishing is not idempotent, so it is attempted exactly once.
            let reply = self.execute(Method::POST, &url, request).await?;
            expect_success(reply)
        })
    }

    fn save_state<'a>(&'a self, store_id: &'a str, records: &'a [Record]) -> SidecarFuture<'a, ()> {
        Box::pin(async move {
            let url = self.endpoint(&["state", store_id])?;

            retry_while(
                &self.retry,
                "save_state",
                || {
                    let url = &url;
                    let request = self.client.post(url.clone()).json(records);
                    async move { expect_success(self.execute(Method::POST, url, request).await?) }
                },
                |outcome| matches!(outcome, Err(e) if e.is_retryable()),
            )
            .await
        })
    }

    fn get_state<'a>(&'a self, store_id: &'a str, key: &'a str) -> SidecarFuture<'a, SidecarReply> {
        Box::pin(async move {
            let url = self.endpoint(&["state", store_id, key])?;
            self.execute_idempotent("get_state", Method::GET, url).await
        })
    }

    fn list_state<'a>(&'a self, store_id: &'a str) -> SidecarFuture<'a, SidecarReply> {
        Box::pin(async move {
            let url = self.endpoint(&["state", store_id])?;
            self.execute_idempotent("list_state", Method::GET, url).await
        })
    }

    fn delete_state<'a>(&'a self, store_id: &'a str, key: &'a str) -> SidecarFuture<'a, ()> {
        Box::pin(async move {
            let url = self.endpoint(&["state", store_id, key])?;
            let reply = self
                .execute_idempotent("delete_state", Method::DELETE, url)
                .await?;
            expect_success(reply)
        })
    }

    fn health(&self) -> SidecarFuture<'_, ()> {
        Box::pin(async move {
            let url = self.endpoint(&["health", "check"])?;
            let reply = self
                .execute_idempotent("health", Method::GET, url)
                .await?;
            expect_success(reply)
        })
    }
}
