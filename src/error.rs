//! Error types surfaced to callers.
//!
//! Only construction and packet validation produce errors. Transport and
//! protocol failures are folded into [`crate::outcome::SendOutcome`] instead.

use thiserror::Error;

/// Errors a caller must be prepared to handle explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// Invalid construction-time input (bad endpoint, bad option values).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Malformed packet rejected before any network I/O.
    #[error("validation error: {0}")]
    Validation(String),
}

impl DispatchError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// True for errors raised while building a dispatcher.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    /// True for errors raised while checking a packet.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Result type for dispatcher operations.
pub type DispatchResult<T> = Result<T, DispatchError>;
