//! Transport subsystem.
//!
//! # Data Flow
//! ```text
//! Dispatcher attempt
//!     → OutboundRequest (fixed body, per-attempt headers)
//!     → Transport::post (one HTTP POST)
//!     → InboundResponse (status, headers, raw body)
//! ```
//!
//! # Design Decisions
//! - Transports know nothing about retries or deadlines; the dispatcher
//!   wraps every call in its own timeout and drops the future on expiry
//! - Timeouts are distinct from other transport failures
//! - Production traffic goes through a pooled reqwest client

pub mod http;

use bytes::Bytes;
use reqwest::header::HeaderMap;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use url::Url;

pub use http::HttpTransport;

/// One outbound POST.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// A response as received from the wire, before any parsing.
#[derive(Debug, Clone, Default)]
pub struct InboundResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl InboundResponse {
    pub fn new(status: u16, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }
}

/// Network-level failures. Never escape `send`; they end up in the outcome.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The attempt exceeded its deadline.
    #[error("timeout after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// DNS resolution or connection establishment failed.
    #[error("connection failed: {0}")]
    Connect(String),

    /// Any other failure while sending or receiving.
    #[error("{0}")]
    Other(String),
}

impl TransportError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, TransportError::Timeout(_))
    }
}

/// Sends one HTTP POST.
pub trait Transport: Send + Sync {
    fn post(
        &self,
        request: OutboundRequest,
    ) -> impl Future<Output = Result<InboundResponse, TransportError>> + Send;
}
