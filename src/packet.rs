//! Outbound packet type.
//!
//! A [`Packet`] is built once per logical message and never mutated. The
//! payload shape is unknown to this crate; it is checked structurally when the
//! packet is sent, not when it is created.

use bytes::Bytes;
use serde::Serialize;
use serde_json::Value;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{DispatchError, DispatchResult};

/// An outbound message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Packet {
    id: String,
    /// Milliseconds since the Unix epoch.
    timestamp: u64,
    payload: Value,
}

impl Packet {
    /// Create a packet stamped with the current wall-clock time.
    pub fn create(id: impl Into<String>, payload: Value) -> Self {
        Self::with_timestamp(id, now_millis(), payload)
    }

    /// Create a packet with an explicit timestamp.
    pub fn with_timestamp(id: impl Into<String>, timestamp: u64, payload: Value) -> Self {
        Self {
            id: id.into(),
            timestamp,
            payload,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }

    /// Check the packet before it goes on the wire.
    ///
    /// The timestamp is unsigned, so only the id and the payload shape can be
    /// wrong here.
    pub fn validate(&self) -> DispatchResult<()> {
        if self.id.trim().is_empty() {
            return Err(DispatchError::validation("packet id must not be empty"));
        }
        if !self.payload.is_object() {
            return Err(DispatchError::validation(format!(
                "packet payload must be a JSON object, got {}",
                value_kind(&self.payload)
            )));
        }
        Ok(())
    }

    /// Serialize the packet into the request body sent on every attempt.
    pub(crate) fn encode(&self) -> DispatchResult<Bytes> {
        serde_json::to_vec(self)
            .map(Bytes::from)
            .map_err(|e| DispatchError::validation(format!("packet is not serializable: {e}")))
    }
}

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
