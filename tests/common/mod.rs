//! Shared utilities for dispatcher integration tests.

#![allow(dead_code)]

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use sendpack::{
    DispatchConfig, DispatchOptions, Dispatcher, InboundResponse, OutboundRequest, Transport,
    TransportError,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

/// What a scripted transport does on a given call.
pub enum Step {
    Respond(InboundResponse),
    Fail(TransportError),
    /// Respond after a delay.
    Delayed(Duration, InboundResponse),
    /// Mirror the request body back as a 200 JSON response.
    Echo,
    /// Never completes; only the dispatcher's deadline ends it.
    Hang,
}

/// A request as seen by the transport, with the (tokio) time it arrived.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub at: Instant,
    pub request: OutboundRequest,
}

type Script = dyn Fn(u32) -> Step + Send + Sync;

struct Inner {
    script: Box<Script>,
    calls: Mutex<Vec<RecordedCall>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

/// Decrements the in-flight count even when the call is cancelled.
struct InFlight<'a>(&'a Inner);

impl<'a> InFlight<'a> {
    fn enter(inner: &'a Inner) -> Self {
        let now = inner.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        inner.max_in_flight.fetch_max(now, Ordering::SeqCst);
        Self(inner)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Programmable fake transport. The script receives the 1-based call number.
#[derive(Clone)]
pub struct ScriptedTransport {
    inner: Arc<Inner>,
}

impl ScriptedTransport {
    pub fn new<F>(script: F) -> Self
    where
        F: Fn(u32) -> Step + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(Inner {
                script: Box::new(script),
                calls: Mutex::new(Vec::new()),
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
            }),
        }
    }

    /// Same status on every call.
    pub fn always(status: u16) -> Self {
        Self::new(move |_| Step::Respond(respond(status, "")))
    }

    /// Echo the request body back as a JSON response.
    pub fn echo() -> Self {
        Self::new(|_| Step::Echo)
    }

    pub fn call_count(&self) -> usize {
        self.inner.calls.lock().unwrap().len()
    }

    /// Highest number of calls observed in progress at once.
    pub fn max_in_flight(&self) -> usize {
        self.inner.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.inner.calls.lock().unwrap().clone()
    }

    fn record(&self, request: OutboundRequest) -> (u32, Bytes) {
        let mut calls = self.inner.calls.lock().unwrap();
        let body = request.body.clone();
        calls.push(RecordedCall {
            at: Instant::now(),
            request,
        });
        (calls.len() as u32, body)
    }
}

impl Transport for ScriptedTransport {
    async fn post(&self, request: OutboundRequest) -> Result<InboundResponse, TransportError> {
        let (call, body) = self.record(request);
        let _guard = InFlight::enter(&self.inner);

        match (self.inner.script)(call) {
            Step::Respond(response) => Ok(response),
            Step::Fail(err) => Err(err),
            Step::Delayed(delay, response) => {
                tokio::time::sleep(delay).await;
                Ok(response)
            }
            Step::Echo => Ok(respond_raw(200, "application/json", body)),
            Step::Hang => std::future::pending().await,
        }
    }
}

/// A response with a plain-text body (empty body when `body` is empty).
pub fn respond(status: u16, body: &str) -> InboundResponse {
    respond_raw(status, "text/plain", Bytes::copy_from_slice(body.as_bytes()))
}

/// A response with a JSON body.
pub fn respond_json(status: u16, body: serde_json::Value) -> InboundResponse {
    respond_raw(status, "application/json", Bytes::from(body.to_string()))
}

pub fn respond_raw(status: u16, content_type: &str, body: Bytes) -> InboundResponse {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_str(content_type).unwrap());
    InboundResponse::new(status, headers, body)
}

/// Add a header to a scripted response.
pub fn with_header(mut response: InboundResponse, name: &'static str, value: &str) -> InboundResponse {
    response
        .headers
        .insert(HeaderName::from_static(name), HeaderValue::from_str(value).unwrap());
    response
}

/// Dispatcher over a scripted transport, pointed at a dummy endpoint.
pub fn dispatcher(transport: &ScriptedTransport, options: DispatchOptions) -> Dispatcher<ScriptedTransport> {
    let config = DispatchConfig::resolve("http://ingest.test/packets", &options).unwrap();
    Dispatcher::with_transport(config, transport.clone())
}

pub fn options(retries: u32, retry_delay_ms: u64) -> DispatchOptions {
    DispatchOptions {
        retries,
        retry_delay_ms,
        ..Default::default()
    }
}
