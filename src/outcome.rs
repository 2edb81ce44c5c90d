//! Result of one dispatch call.

use serde::{Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::time::Duration;

/// Parsed response body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Json(Value),
    Text(String),
}

impl ResponseBody {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ResponseBody::Json(value) => Some(value),
            ResponseBody::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ResponseBody::Json(_) => None,
            ResponseBody::Text(text) => Some(text),
        }
    }
}

impl fmt::Display for ResponseBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseBody::Json(value) => write!(f, "{}", value),
            ResponseBody::Text(text) => f.write_str(text),
        }
    }
}

/// Why a dispatch ended without success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The last attempt exceeded its deadline.
    Timeout,
    /// The last attempt failed below HTTP (DNS, connect, reset).
    Transport,
    /// 408, 429 or 5xx, retries exhausted.
    RetryableStatus,
    /// Any other non-2xx status; never retried.
    TerminalStatus,
}

/// Outcome of [`crate::Dispatcher::send`].
///
/// `attempts` is always at least 1 and at most `max_retries + 1`. A
/// successful outcome has a 2xx status and no error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SendOutcome {
    pub success: bool,
    /// Final HTTP status, or 0 when no response was ever received.
    pub status: u16,
    pub body: Option<ResponseBody>,
    pub error: Option<String>,
    pub failure: Option<FailureKind>,
    pub attempts: u32,
    #[serde(rename = "elapsed_ms", serialize_with = "serialize_millis")]
    pub elapsed: Duration,
}

impl SendOutcome {
    pub(crate) fn succeeded(
        status: u16,
        body: Option<ResponseBody>,
        attempts: u32,
        elapsed: Duration,
    ) -> Self {
        Self {
            success: true,
            status,
            body,
            error: None,
            failure: None,
            attempts,
            elapsed,
        }
    }

    pub(crate) fn failed(
        status: u16,
        body: Option<ResponseBody>,
        error: String,
        failure: FailureKind,
        attempts: u32,
        elapsed: Duration,
    ) -> Self {
        Self {
            success: false,
            status,
            body,
            error: Some(error),
            failure: Some(failure),
            attempts,
            elapsed,
        }
    }

    /// Structured body, if the response carried one.
    pub fn json(&self) -> Option<&Value> {
        self.body.as_ref().and_then(ResponseBody::as_json)
    }

    /// True when retrying the same packet later could plausibly succeed.
    pub fn is_transient_failure(&self) -> bool {
        matches!(
            self.failure,
            Some(FailureKind::Timeout | FailureKind::Transport | FailureKind::RetryableStatus)
        )
    }
}

fn serialize_millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(duration.as_millis() as u64)
}
