//! Retry classification.
//!
//! # Responsibilities
//! - Decide whether a response status ends the call or earns another attempt
//!
//! # Design Decisions
//! - Transport failures are always retryable (within budget)
//! - 408, 429 and every 5xx are transient
//! - Any other non-2xx is terminal; retrying a client error cannot succeed

/// How a response status affects the attempt loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Success,
    Retryable,
    Terminal,
}

/// Classify an HTTP status code.
pub fn classify_status(status: u16) -> StatusClass {
    match status {
        200..=299 => StatusClass::Success,
        s if is_retryable_status(s) => StatusClass::Retryable,
        _ => StatusClass::Terminal,
    }
}

/// True for request timeout, too-many-requests and server errors.
pub fn is_retryable_status(status: u16) -> bool {
    matches!(status, 408 | 429 | 500..=599)
}
