//! Timeout enforcement.
//!
//! # Responsibilities
//! - Bound each transport call by the per-attempt deadline
//! - Cancel the in-flight call cleanly on expiry
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities; dropping the future cancels the call
//! - The deadline starts when the attempt starts, not when `send` starts
//! - Timeout errors are distinct from other transport errors

use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;

use crate::transport::TransportError;

/// Run `fut` under `deadline`, mapping expiry to [`TransportError::Timeout`].
pub async fn with_deadline<T, F>(deadline: Duration, fut: F) -> Result<T, TransportError>
where
    F: Future<Output = Result<T, TransportError>>,
{
    match timeout(deadline, fut).await {
        Ok(result) => result,
        Err(_) => Err(TransportError::Timeout(deadline)),
    }
}
