//! reqwest-backed transport.

use reqwest::redirect::Policy;

use crate::error::{DispatchError, DispatchResult};
use crate::transport::{InboundResponse, OutboundRequest, Transport, TransportError};

/// Pooled HTTP client shared by every attempt of every send.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build a transport with a fresh connection pool.
    ///
    /// Redirects are not followed: a 3xx is reported as-is and classified
    /// like any other non-2xx status. Connection setup has no bound of its
    /// own; the dispatcher's per-attempt deadline covers it.
    pub fn new() -> DispatchResult<Self> {
        let client = reqwest::Client::builder()
            .redirect(Policy::none())
            .build()
            .map_err(|e| DispatchError::configuration(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Reuse an existing client (shared pools, custom TLS, proxies).
    ///
    /// The client must be built with `redirect(Policy::none())`. A client
    /// that follows redirects turns a redirected POST into a GET of another
    /// URL, and that response would be classified in its place.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Transport for HttpTransport {
    async fn post(&self, request: OutboundRequest) -> Result<InboundResponse, TransportError> {
        let response = self
            .client
            .post(request.url)
            .headers(request.headers)
            .body(request.body)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    TransportError::Connect(e.to_string())
                } else {
                    TransportError::Other(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        let headers = response.headers().clone();

        // A broken body stream still leaves a usable status.
        let body = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(status, error = %e, "Failed to read response body");
                Default::default()
            }
        };

        Ok(InboundResponse {
            status,
            headers,
            body,
        })
    }
}
