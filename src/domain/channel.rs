//! Per-connection channel handle and identifier.
//!
//! A [`ChannelHandle`] is the registry-side end of one WebSocket
//! connection: an unbounded queue of outbound text frames. The connection
//! task owns the receiving end and writes frames to the socket, so a slow
//! or dead socket can never block a registry-wide broadcast.

use std::fmt;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Unique identifier for one physical connection.
///
/// Wraps a UUID v4 generated when the channel is created. Used as the
/// dedup key inside a device's connection set, so registering the same
/// handle twice is idempotent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(uuid::Uuid);

impl ChannelId {
    /// Creates a new random `ChannelId`.
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Returns the inner [`uuid::Uuid`].
    #[must_use]
    pub const fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }
}

impl Default for ChannelId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error returned when a frame is queued on a closed channel.
///
/// Means the connection task has exited (socket closed or errored); the
/// caller should unregister the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("channel closed")]
pub struct ChannelClosed;

/// Sending half of one connection's outbound frame queue.
///
/// Cloneable; all clones share the same queue. Dropped receivers turn
/// every subsequent [`ChannelHandle::send`] into [`ChannelClosed`].
#[derive(Debug, Clone)]
pub struct ChannelHandle {
    id: ChannelId,
    outbound: mpsc::UnboundedSender<String>,
}

impl ChannelHandle {
    /// Creates a channel handle and the receiver the connection task
    /// drains into the socket.
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (outbound, rx) = mpsc::unbounded_channel();
        (
            Self {
                id: ChannelId::new(),
                outbound,
            },
            rx,
        )
    }

    /// Returns this channel's identifier.
    #[must_use]
    pub const fn id(&self) -> ChannelId {
        self.id
    }

    /// Queues a text frame for delivery on this channel.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelClosed`] if the connection task has gone away.
    pub fn send(&self, frame: String) -> Result<(), ChannelClosed> {
        self.outbound.send(frame).map_err(|_| ChannelClosed)
    }

    /// Returns `true` if the connection task has dropped its receiver.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.outbound.is_closed()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_delivers_frame() {
        let (handle, mut rx) = ChannelHandle::new();
        assert!(handle.send("hello".to_string()).is_ok());
        assert_eq!(rx.recv().await.as_deref(), Some("hello"));
    }

    #[tokio::test]
    async fn send_after_receiver_dropped_fails() {
        let (handle, rx) = ChannelHandle::new();
        drop(rx);
        assert_eq!(handle.send("hello".to_string()), Err(ChannelClosed));
        assert!(handle.is_closed());
    }

    #[test]
    fn channel_ids_are_unique() {
        let (a, _rx_a) = ChannelHandle::new();
        let (b, _rx_b) = ChannelHandle::new();
        assert_ne!(a.id(), b.id());
    }
}
