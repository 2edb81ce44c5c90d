//! Batch and cancellable sends layered on [`Dispatcher::send`].

use futures_util::stream::{self, StreamExt};
use std::future::Future;

use crate::dispatch::dispatcher::admit;
use crate::dispatch::Dispatcher;
use crate::error::DispatchResult;
use crate::outcome::SendOutcome;
use crate::packet::Packet;
use crate::transport::Transport;

impl<T: Transport> Dispatcher<T> {
    /// Send many packets with at most `concurrency` in flight.
    ///
    /// Results are returned in input order. Each packet still retries
    /// sequentially on its own.
    pub async fn send_batch<I>(&self, packets: I, concurrency: usize) -> Vec<DispatchResult<SendOutcome>>
    where
        I: IntoIterator<Item = Packet>,
    {
        stream::iter(packets)
            .map(|packet| self.send(packet))
            .buffered(concurrency.max(1))
            .collect()
            .await
    }

    /// Send a packet unless `cancel` resolves first.
    ///
    /// Returns `Ok(None)` when cancelled. Validation still happens up front,
    /// so a malformed packet is reported even if cancellation is already due.
    pub async fn send_until<C>(&self, packet: Packet, cancel: C) -> DispatchResult<Option<SendOutcome>>
    where
        C: Future<Output = ()>,
    {
        admit(&packet)?;
        let packet_id = packet.id().to_string();

        tokio::select! {
            result = self.send(packet) => result.map(Some),
            () = cancel => {
                tracing::warn!(packet_id = %packet_id, "Send cancelled before completion");
                Ok(None)
            }
        }
    }
}
