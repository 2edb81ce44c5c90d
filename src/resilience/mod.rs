//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Each attempt:
//!     → timeouts.rs (enforce the per-attempt deadline)
//!     → On failure: retries.rs (is this status/error worth another attempt?)
//!     → backoff.rs (how long to wait before it)
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every attempt has a deadline
//! - Retries are strictly sequential, never speculative
//! - Backoff is linear and deterministic (no jitter) for reproducibility
//! - A server's Retry-After overrides the local schedule

pub mod backoff;
pub mod retries;
pub mod timeouts;
