//! Resilient packet dispatcher.
//!
//! Validates an outbound [`Packet`], POSTs it with a bounded per-attempt
//! timeout, retries transient failures with linear backoff (or the server's
//! Retry-After), and reports a structured [`SendOutcome`].
//!
//! ```no_run
//! # async fn run() -> Result<(), sendpack::DispatchError> {
//! use sendpack::{DispatchOptions, Dispatcher, Packet};
//! use serde_json::json;
//!
//! let dispatcher = Dispatcher::new("https://ingest.example.com/packets", &DispatchOptions::default())?;
//! let outcome = dispatcher.send(Packet::create("transfer-991", json!({"block": 19_000_000}))).await?;
//! if !outcome.success {
//!     eprintln!("gave up after {} attempts: {:?}", outcome.attempts, outcome.error);
//! }
//! # Ok(())
//! # }
//! ```

pub mod body;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod lifecycle;
pub mod observability;
pub mod outcome;
pub mod packet;
pub mod resilience;
pub mod transport;

pub use config::{AppConfig, DispatchConfig, DispatchOptions};
pub use dispatch::Dispatcher;
pub use error::{DispatchError, DispatchResult};
pub use lifecycle::Shutdown;
pub use outcome::{FailureKind, ResponseBody, SendOutcome};
pub use packet::Packet;
pub use transport::{HttpTransport, InboundResponse, OutboundRequest, Transport, TransportError};
