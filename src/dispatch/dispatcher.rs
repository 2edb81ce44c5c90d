//! Packet dispatcher with bounded retries.
//!
//! # Responsibilities
//! - Validate packets before any network I/O
//! - Serialize the body once and resend the same bytes on every attempt
//! - Bound each attempt by the configured timeout
//! - Classify responses and retry transient failures with backoff
//! - Fold every transport/protocol failure into a [`SendOutcome`]

use bytes::Bytes;
use reqwest::header::{HeaderName, HeaderValue};
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{info_span, Instrument};

use crate::body::parse_body;
use crate::config::{DispatchConfig, DispatchOptions};
use crate::error::DispatchResult;
use crate::observability::metrics;
use crate::outcome::{FailureKind, ResponseBody, SendOutcome};
use crate::packet::Packet;
use crate::resilience::backoff;
use crate::resilience::retries::{classify_status, StatusClass};
use crate::resilience::timeouts::with_deadline;
use crate::transport::{HttpTransport, OutboundRequest, Transport};

/// Per-attempt header carrying the 1-based attempt number.
pub const ATTEMPT_HEADER: &str = "x-sendpack-attempt";

/// Sends packets to one endpoint.
///
/// Holds only read-only state, so a single instance can serve any number of
/// concurrent `send` calls.
#[derive(Clone)]
pub struct Dispatcher<T = HttpTransport> {
    config: Arc<DispatchConfig>,
    transport: T,
}

impl Dispatcher<HttpTransport> {
    /// Create a dispatcher backed by a pooled HTTP client.
    ///
    /// # Errors
    /// `DispatchError::Configuration` if the endpoint or any option is invalid.
    pub fn new(endpoint: &str, options: &DispatchOptions) -> DispatchResult<Self> {
        let config = DispatchConfig::resolve(endpoint, options)?;
        let transport = HttpTransport::new()?;
        Ok(Self::with_transport(config, transport))
    }
}

impl<T: Transport> Dispatcher<T> {
    /// Create a dispatcher over any transport.
    pub fn with_transport(config: DispatchConfig, transport: T) -> Self {
        tracing::debug!(
            endpoint = %config.endpoint(),
            max_retries = config.max_retries(),
            timeout_ms = config.timeout().as_millis() as u64,
            "Dispatcher created"
        );
        Self {
            config: Arc::new(config),
            transport,
        }
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Send a packet, retrying transient failures.
    ///
    /// # Errors
    /// Only `DispatchError::Validation`, returned before any network call.
    /// Every other failure is described by the returned outcome.
    pub async fn send(&self, packet: Packet) -> DispatchResult<SendOutcome> {
        admit(&packet)?;
        let body = packet.encode()?;

        let span = info_span!(
            "send",
            packet_id = %packet.id(),
            endpoint = %self.config.endpoint()
        );
        let outcome = self.run_attempts(body).instrument(span).await;

        metrics::record_outcome(&outcome);
        Ok(outcome)
    }

    async fn run_attempts(&self, body: Bytes) -> SendOutcome {
        let started = Instant::now();
        let max_attempts = self.config.max_attempts();

        // Status and body stick to the last response seen; error and kind
        // follow the last failure of any sort.
        let mut last_status = 0;
        let mut last_body = None;
        let mut last_error = String::new();
        let mut last_failure = FailureKind::Transport;
        let mut attempts = 0;

        while attempts < max_attempts {
            attempts += 1;
            let request = self.build_request(attempts, body.clone());

            let retry_after = match with_deadline(self.config.timeout(), self.transport.post(request)).await {
                Err(err) => {
                    let (result, kind) = if err.is_timeout() {
                        ("timeout", FailureKind::Timeout)
                    } else {
                        ("transport", FailureKind::Transport)
                    };
                    metrics::record_attempt(result);
                    tracing::warn!(attempt = attempts, error = %err, "Attempt failed without a response");

                    last_error = err.to_string();
                    last_failure = kind;
                    None
                }
                Ok(response) => {
                    let status = response.status;
                    let parsed = parse_body(&response.headers, &response.body);

                    match classify_status(status) {
                        StatusClass::Success => {
                            metrics::record_attempt("success");
                            tracing::info!(attempt = attempts, status, "Packet delivered");
                            return SendOutcome::succeeded(status, parsed, attempts, started.elapsed());
                        }
                        StatusClass::Terminal => {
                            metrics::record_attempt("terminal");
                            let error = describe_status(status, parsed.as_ref());
                            tracing::warn!(attempt = attempts, status, "Terminal status, not retrying");
                            return SendOutcome::failed(
                                status,
                                parsed,
                                error,
                                FailureKind::TerminalStatus,
                                attempts,
                                started.elapsed(),
                            );
                        }
                        StatusClass::Retryable => {
                            metrics::record_attempt("retryable");
                            tracing::warn!(attempt = attempts, status, "Transient status");

                            last_error = describe_status(status, parsed.as_ref());
                            last_status = status;
                            last_body = parsed;
                            last_failure = FailureKind::RetryableStatus;
                            backoff::retry_after(&response.headers)
                        }
                    }
                }
            };

            if attempts < max_attempts {
                let delay = backoff::next_delay(
                    self.config.retry_delay(),
                    attempts,
                    retry_after,
                    self.config.max_retry_after(),
                );
                tracing::info!(
                    attempt = attempts,
                    delay_ms = delay.as_millis() as u64,
                    server_hint = retry_after.is_some(),
                    "Retrying after backoff"
                );
                metrics::record_backoff(delay);
                tokio::time::sleep(delay).await;
            }
        }

        tracing::warn!(attempts, status = last_status, error = %last_error, "Retries exhausted");
        SendOutcome::failed(
            last_status,
            last_body,
            last_error,
            last_failure,
            attempts,
            started.elapsed(),
        )
    }

    fn build_request(&self, attempt: u32, body: Bytes) -> OutboundRequest {
        let mut headers = self.config.headers().clone();
        headers.insert(HeaderName::from_static(ATTEMPT_HEADER), HeaderValue::from(attempt));

        OutboundRequest {
            url: self.config.endpoint().clone(),
            headers,
            body,
        }
    }
}

impl<T> std::fmt::Debug for Dispatcher<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("endpoint", &self.config.endpoint().as_str())
            .field("max_retries", &self.config.max_retries())
            .field("timeout", &self.config.timeout())
            .finish()
    }
}

/// Validate a packet at the send boundary, logging and counting rejections.
pub(super) fn admit(packet: &Packet) -> DispatchResult<()> {
    packet.validate().map_err(|e| {
        tracing::warn!(packet_id = %packet.id(), error = %e, "Packet rejected");
        metrics::record_rejected();
        e
    })
}

/// `HTTP <status>` with the body appended when there is one.
fn describe_status(status: u16, body: Option<&ResponseBody>) -> String {
    match body {
        Some(body) => format!("HTTP {}: {}", status, body),
        None => format!("HTTP {}", status),
    }
}
