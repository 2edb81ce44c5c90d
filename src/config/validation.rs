//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the endpoint is an absolute http(s) URL
//! - Validate value ranges (timeout > 0, concurrency > 0)
//! - Check header names and values are legal on the wire
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Strict everywhere: bad values are rejected, never replaced by defaults
//! - Runs before config is accepted into the system

use reqwest::header::{HeaderName, HeaderValue};
use std::fmt;
use std::net::SocketAddr;
use url::Url;

use crate::config::schema::{AppConfig, DispatchOptions};

/// A single configuration problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    pub field: String,
    pub message: String,
}

impl ConfigIssue {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Join issues into one human-readable line.
pub fn describe_issues(issues: &[ConfigIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse and check an endpoint string.
pub fn validate_endpoint(endpoint: &str) -> Result<Url, ConfigIssue> {
    let endpoint = endpoint.trim();
    if endpoint.is_empty() {
        return Err(ConfigIssue::new("endpoint", "must not be empty"));
    }

    let url = Url::parse(endpoint)
        .map_err(|e| ConfigIssue::new("endpoint", format!("'{}' is not a valid URL: {}", endpoint, e)))?;

    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(ConfigIssue::new(
                "endpoint",
                format!("unsupported scheme '{}', expected http or https", other),
            ))
        }
    }
    if url.host_str().is_none() {
        return Err(ConfigIssue::new("endpoint", "must include a host"));
    }

    Ok(url)
}

/// Check dispatcher options.
pub fn validate_options(options: &DispatchOptions) -> Vec<ConfigIssue> {
    let mut issues = Vec::new();

    if options.timeout_ms == 0 {
        issues.push(ConfigIssue::new("timeout_ms", "must be greater than zero"));
    }

    for (name, value) in &options.headers {
        if HeaderName::from_bytes(name.as_bytes()).is_err() {
            issues.push(ConfigIssue::new(
                format!("headers.{}", name),
                "is not a valid header name",
            ));
        }
        if HeaderValue::from_str(value).is_err() {
            issues.push(ConfigIssue::new(
                format!("headers.{}", name),
                "value contains characters not allowed in a header",
            ));
        }
    }

    if HeaderName::from_bytes(options.idempotency_header.as_bytes()).is_err() {
        issues.push(ConfigIssue::new("idempotency_header", "is not a valid header name"));
    }

    if let Some(key) = &options.idempotency_key {
        if key.trim().is_empty() {
            issues.push(ConfigIssue::new("idempotency_key", "must not be blank when set"));
        } else if HeaderValue::from_str(key).is_err() {
            issues.push(ConfigIssue::new(
                "idempotency_key",
                "contains characters not allowed in a header",
            ));
        }
    }

    if let Some(agent) = &options.user_agent {
        if HeaderValue::from_str(agent).is_err() {
            issues.push(ConfigIssue::new(
                "user_agent",
                "contains characters not allowed in a header",
            ));
        }
    }

    issues
}

/// Validate a whole application config.
///
/// Validation is a pure function: AppConfig → Result<(), Vec<ConfigIssue>>.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ConfigIssue>> {
    let mut issues = Vec::new();

    if let Some(endpoint) = &config.endpoint {
        if let Err(issue) = validate_endpoint(endpoint) {
            issues.push(issue);
        }
    }

    issues.extend(validate_options(&config.dispatch));

    if config.batch.concurrency == 0 {
        issues.push(ConfigIssue::new("batch.concurrency", "must be greater than zero"));
    }

    let observability = &config.observability;
    if !matches!(
        observability.log_level.to_ascii_lowercase().as_str(),
        "trace" | "debug" | "info" | "warn" | "error"
    ) {
        issues.push(ConfigIssue::new(
            "observability.log_level",
            format!("unknown level '{}'", observability.log_level),
        ));
    }
    if observability.metrics_enabled
        && observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        issues.push(ConfigIssue::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", observability.metrics_address),
        ));
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}
