//! Resolved dispatcher configuration.
//!
//! Built once from an endpoint and [`DispatchOptions`]; read-only afterwards
//! and shared between concurrent sends through an `Arc`.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE, USER_AGENT};
use std::time::Duration;
use url::Url;

use crate::config::schema::DispatchOptions;
use crate::config::validation::{describe_issues, validate_endpoint, validate_options};
use crate::error::{DispatchError, DispatchResult};

const DEFAULT_USER_AGENT: &str = concat!("sendpack/", env!("CARGO_PKG_VERSION"));

/// Immutable, validated dispatcher settings.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    endpoint: Url,
    max_retries: u32,
    timeout: Duration,
    retry_delay: Duration,
    max_retry_after: Duration,
    /// Headers shared by every attempt (content type, agent, fixed, idempotency).
    headers: HeaderMap,
    idempotency_key: Option<String>,
}

impl DispatchConfig {
    /// Validate `endpoint` and `options` and apply defaults.
    ///
    /// Every problem is reported in a single [`DispatchError::Configuration`].
    pub fn resolve(endpoint: &str, options: &DispatchOptions) -> DispatchResult<Self> {
        let mut issues = validate_options(options);
        let endpoint = match validate_endpoint(endpoint) {
            Ok(url) => Some(url),
            Err(issue) => {
                issues.insert(0, issue);
                None
            }
        };

        let endpoint = match endpoint {
            Some(url) if issues.is_empty() => url,
            _ => return Err(DispatchError::configuration(describe_issues(&issues))),
        };

        let headers = build_headers(options)?;

        Ok(Self {
            endpoint,
            max_retries: options.retries,
            timeout: Duration::from_millis(options.timeout_ms),
            retry_delay: Duration::from_millis(options.retry_delay_ms),
            max_retry_after: Duration::from_millis(options.max_retry_after_ms),
            headers,
            idempotency_key: options.idempotency_key.clone(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Total attempts allowed per send.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn retry_delay(&self) -> Duration {
        self.retry_delay
    }

    pub fn max_retry_after(&self) -> Duration {
        self.max_retry_after
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn idempotency_key(&self) -> Option<&str> {
        self.idempotency_key.as_deref()
    }
}

fn build_headers(options: &DispatchOptions) -> DispatchResult<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));

    for (name, value) in &options.headers {
        headers.insert(parse_name(name)?, parse_value(name, value)?);
    }

    if let Some(agent) = &options.user_agent {
        headers.insert(USER_AGENT, parse_value("user_agent", agent)?);
    }

    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    if let Some(key) = &options.idempotency_key {
        headers.insert(
            parse_name(&options.idempotency_header)?,
            parse_value("idempotency_key", key)?,
        );
    }

    Ok(headers)
}

fn parse_name(name: &str) -> DispatchResult<HeaderName> {
    HeaderName::from_bytes(name.as_bytes())
        .map_err(|e| DispatchError::configuration(format!("invalid header name '{}': {}", name, e)))
}

fn parse_value(field: &str, value: &str) -> DispatchResult<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| DispatchError::configuration(format!("invalid value for {}: {}", field, e)))
}
