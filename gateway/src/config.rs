//! Configuration management for the order gateway.
//!
//! Loads configuration from environment variables with sensible defaults.
//! Unlike a silent fallback, a variable that is set but cannot be parsed is a
//! [`ConfigError`], so a typo in deployment fails at startup.

use order_gateway_core::SidecarError;
use order_gateway_sidecar::{HttpSidecar, RetryPolicy};
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Configuration errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable is set to a value that cannot be used.
    #[error("invalid value {value:?} for {var}: {reason}")]
    Invalid {
        /// Variable name
        var: &'static str,
        /// Offending value
        value: String,
        /// What was expected
        reason: String,
    },
}

/// Which family of routes the gateway serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RouteSet {
    /// Publish, then let the sidecar deliver back for persistence.
    EventFirst,
    /// Write state directly, with list/get/delete.
    DirectWrite,
    /// Both families.
    #[default]
    All,
}

impl RouteSet {
    /// Whether `POST /neworder` and `POST /neworder-queue` are served.
    #[must_use]
    pub const fn includes_event_first(self) -> bool {
        matches!(self, Self::EventFirst | Self::All)
    }

    /// Whether `POST /neworder-node`, `GET /order` and `DELETE /order/:id`
    /// are served.
    #[must_use]
    pub const fn includes_direct_write(self) -> bool {
        matches!(self, Self::DirectWrite | Self::All)
    }
}

impl FromStr for RouteSet {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "event-first" => Ok(Self::EventFirst),
            "direct-write" => Ok(Self::DirectWrite),
            "all" => Ok(Self::All),
            _ => Err("expected one of event-first, direct-write, all".to_string()),
        }
    }
}

impl fmt::Display for RouteSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::EventFirst => "event-first",
            Self::DirectWrite => "direct-write",
            Self::All => "all",
        })
    }
}

/// What a handler tells its caller when a sidecar write fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailureMode {
    /// Log the failure and acknowledge with `{}` anyway.
    #[default]
    BestEffort,
    /// Answer 504 on timeout and 502 on any other failure.
    Strict,
}

impl FromStr for FailureMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "best-effort" => Ok(Self::BestEffort),
            "strict" => Ok(Self::Strict),
            _ => Err("expected best-effort or strict".to_string()),
        }
    }
}

impl fmt::Display for FailureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::BestEffort => "best-effort",
            Self::Strict => "strict",
        })
    }
}

/// Gateway configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayConfig {
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Sidecar client configuration
    pub sidecar: SidecarConfig,
    /// Where orders go
    pub orders: OrdersConfig,
}

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to bind to
    pub port: u16,
    /// Routes to serve
    pub routes: RouteSet,
    /// Reaction to failed sidecar writes
    pub failure_mode: FailureMode,
    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout: u64,
}

impl ServerConfig {
    /// `host:port` to bind.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Sidecar client configuration
#[derive(Debug, Clone, PartialEq)]
pub struct SidecarConfig {
    /// Sidecar base URL
    pub url: String,
    /// Per-call timeout in milliseconds
    pub timeout_ms: u64,
    /// Retries for idempotent calls
    pub max_retries: usize,
    /// Initial retry backoff in milliseconds
    pub retry_delay_ms: u64,
}

impl SidecarConfig {
    /// Build the HTTP client this configuration describes.
    ///
    /// # Errors
    ///
    /// Returns [`SidecarError::InvalidBaseUrl`] if `url` is not an http(s) URL.
    pub fn client(&self) -> Result<HttpSidecar, SidecarError> {
        Ok(HttpSidecar::new(&self.url)?
            .with_timeout(Duration::from_millis(self.timeout_ms))
            .with_retry_policy(RetryPolicy::new(
                self.max_retries,
                Duration::from_millis(self.retry_delay_ms),
            )))
    }

    fn from_lookup<F>(lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            url: lookup("SIDECAR_URL").unwrap_or_else(|| "http://localhost:3501".to_string()),
            timeout_ms: parse_or(lookup, "SIDECAR_TIMEOUT_MS", 10_000)?,
            max_retries: parse_or(lookup, "SIDECAR_MAX_RETRIES", 2)?,
            retry_delay_ms: parse_or(lookup, "SIDECAR_RETRY_DELAY_MS", 100)?,
        })
    }
}

/// Order routing configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrdersConfig {
    /// State store holding orders
    pub store: String,
    /// Event name and target used when publishing orders
    pub topic: String,
}

impl GatewayConfig {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a variable is set to an unusable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to
    /// its value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a variable is set to an unusable value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            server: ServerConfig {
                host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: parse_or(&lookup, "PORT", 3000)?,
                routes: parse_or(&lookup, "GATEWAY_ROUTES", RouteSet::All)?,
                failure_mode: parse_or(&lookup, "GATEWAY_FAILURE_MODE", FailureMode::BestEffort)?,
                shutdown_timeout: parse_or(&lookup, "SHUTDOWN_TIMEOUT", 30)?,
            },
            sidecar: SidecarConfig::from_lookup(&lookup)?,
            orders: OrdersConfig {
                store: non_empty_or(&lookup, "ORDERS_STORE", "orders")?,
                topic: non_empty_or(&lookup, "ORDERS_TOPIC", "neworder-queue")?,
            },
        })
    }
}

/// Configuration of the `order-producer` load generator.
#[derive(Debug, Clone, PartialEq)]
pub struct ProducerConfig {
    /// Sidecar client configuration
    pub sidecar: SidecarConfig,
    /// Seconds between two publishes
    pub interval_secs: u64,
    /// Event name to publish
    pub event_name: String,
    /// Subscriber targets
    pub targets: Vec<String>,
}

impl ProducerConfig {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a variable is set to an unusable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Load configuration through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a variable is set to an unusable value,
    /// including an interval of zero or an empty target list.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let interval_secs = parse_or(&lookup, "PRODUCER_INTERVAL_SECS", 10)?;
        if interval_secs == 0 {
            return Err(ConfigError::Invalid {
                var: "PRODUCER_INTERVAL_SECS",
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        let raw_targets = lookup("PRODUCER_TARGETS").unwrap_or_else(|| "neworder".to_string());
        let targets: Vec<String> = raw_targets
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
        if targets.is_empty() {
            return Err(ConfigError::Invalid {
                var: "PRODUCER_TARGETS",
                value: raw_targets,
                reason: "expected at least one target".to_string(),
            });
        }

        Ok(Self {
            sidecar: SidecarConfig::from_lookup(&lookup)?,
            interval_secs,
            event_name: non_empty_or(&lookup, "PRODUCER_EVENT_NAME", "neworder")?,
            targets,
        })
    }
}

fn parse_or<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: fmt::Display,
{
    match lookup(var) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            reason: e.to_string(),
            value,
        }),
    }
}

fn non_empty_or<F>(lookup: &F, var: &'static str, default: &str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(default.to_string()),
        Some(value) if value.trim().is_empty() => Err(ConfigError::Invalid {
            var,
            value,
            reason: "must not be empty".to_string(),
        }),
        Some(value) => Ok(value.trim().to_string()),
    }
}
