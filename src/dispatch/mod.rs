//! Dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! send(packet)
//!     → packet.validate()          (terminal, no I/O)
//!     → packet.encode()            (once per send)
//!     → attempt 1..=max_retries+1
//!         → timeouts::with_deadline(transport.post)
//!         → body::parse_body
//!         → retries::classify_status
//!         → backoff::next_delay → sleep
//!     → SendOutcome
//! ```
//!
//! # Design Decisions
//! - Same body bytes and idempotency key on every attempt
//! - Attempts never overlap; a retry starts after the previous one ended
//! - No cross-attempt cancellation; callers race `send_until` instead

mod batch;
pub mod dispatcher;

pub use dispatcher::{Dispatcher, ATTEMPT_HEADER};
