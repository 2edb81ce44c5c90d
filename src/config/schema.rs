//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML files and fill
//! missing fields with defaults, so a minimal file only names the endpoint.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Root configuration for the `sendpack` binary.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Target endpoint (absolute http/https URL).
    pub endpoint: Option<String>,

    /// Dispatcher options.
    pub dispatch: DispatchOptions,

    /// Batch sending settings.
    pub batch: BatchConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Raw dispatcher options, resolved once into a
/// [`DispatchConfig`](crate::config::DispatchConfig).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct DispatchOptions {
    /// Retries after the first attempt.
    pub retries: u32,

    /// Per-attempt deadline in milliseconds. Must be positive.
    pub timeout_ms: u64,

    /// Linear backoff step in milliseconds.
    pub retry_delay_ms: u64,

    /// Upper bound applied to server-provided Retry-After values.
    pub max_retry_after_ms: u64,

    /// Fixed headers sent on every attempt.
    pub headers: BTreeMap<String, String>,

    /// Stable token sent on every attempt of a packet.
    pub idempotency_key: Option<String>,

    /// Header carrying the idempotency key.
    pub idempotency_header: String,

    /// User-Agent override.
    pub user_agent: Option<String>,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            retries: 2,
            timeout_ms: 5_000,
            retry_delay_ms: 300,
            max_retry_after_ms: 60_000,
            headers: BTreeMap::new(),
            idempotency_key: None,
            idempotency_header: "Idempotency-Key".to_string(),
            user_agent: None,
        }
    }
}

/// Batch sending configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Packets in flight at once. Each packet still retries sequentially.
    pub concurrency: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self { concurrency: 8 }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable the Prometheus scrape endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
