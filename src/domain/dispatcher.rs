//! Best-effort fan-out of frames to a device's live channels.
//!
//! The [`Dispatcher`] resolves a device identity to its channel snapshot
//! and writes the frame to every channel. A write failure unregisters
//! that channel only; the remaining channels still receive the frame, so
//! the registry heals itself without a heartbeat sweep.

use std::sync::Arc;

use super::device_id::DeviceId;
use super::registry::ConnectionRegistry;

/// Outcome of one addressed dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryResult {
    /// `true` iff at least one live channel existed for the target at
    /// dispatch time. Reflects registry state before the write attempt,
    /// not a delivery acknowledgment.
    pub reached: bool,
    /// Number of channels that accepted the frame.
    pub recipient_count: usize,
}

impl DeliveryResult {
    /// Result for a target with no registry entry.
    #[must_use]
    pub const fn offline() -> Self {
        Self {
            reached: false,
            recipient_count: 0,
        }
    }
}

/// Routes addressed and broadcast frames through the registry.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<ConnectionRegistry>,
}

impl Dispatcher {
    /// Creates a dispatcher over the given registry.
    #[must_use]
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// Returns the underlying registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// Writes `frame` to every live channel of `device_id`.
    ///
    /// An offline target is the expected steady-state case, not an error:
    /// the result simply reports `reached = false`. Channels whose write
    /// fails are unregistered and skipped; the rest still receive the
    /// frame.
    pub async fn send_to_device(&self, device_id: &DeviceId, frame: &str) -> DeliveryResult {
        let channels = self.registry.channels_for(device_id).await;
        if channels.is_empty() {
            return DeliveryResult::offline();
        }

        let mut recipient_count = 0;
        for handle in channels {
            if handle.send(frame.to_string()).is_ok() {
                recipient_count += 1;
            } else {
                tracing::debug!(
                    device_id = %device_id,
                    channel_id = %handle.id(),
                    "dropping dead channel on write failure"
                );
                self.registry.unregister(device_id, handle.id()).await;
            }
        }

        DeliveryResult {
            reached: true,
            recipient_count,
        }
    }

    /// Writes `frame` to a room. Rooms share the device-identity
    /// namespace, so this is addressing-identical to
    /// [`send_to_device`](Self::send_to_device).
    pub async fn send_to_room(&self, room_id: &DeviceId, frame: &str) -> DeliveryResult {
        self.send_to_device(room_id, frame).await
    }

    /// Writes `frame` to every online device, best-effort per channel.
    ///
    /// Returns the number of devices for which at least one channel
    /// accepted the frame. No ordering guarantee across devices.
    pub async fn broadcast(&self, frame: &str) -> usize {
        let snapshot = self.registry.all_channels().await;
        let mut devices_reached = 0;

        for (device_id, channels) in snapshot {
            let mut any_sent = false;
            for handle in channels {
                if handle.send(frame.to_string()).is_ok() {
                    any_sent = true;
                } else {
                    self.registry.unregister(&device_id, handle.id()).await;
                }
            }
            if any_sent {
                devices_reached += 1;
            }
        }

        devices_reached
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::channel::ChannelHandle;
    use tokio::sync::mpsc::UnboundedReceiver;

    async fn registry_with_channel(
        registry: &ConnectionRegistry,
        device: &str,
    ) -> UnboundedReceiver<String> {
        let (handle, rx) = ChannelHandle::new();
        registry.register(DeviceId::from(device), handle).await;
        rx
    }

    #[tokio::test]
    async fn offline_device_returns_not_reached() {
        let dispatcher = Dispatcher::new(Arc::new(ConnectionRegistry::new()));
        let result = dispatcher
            .send_to_device(&DeviceId::from("ghost"), "frame")
            .await;
        assert_eq!(result, DeliveryResult::offline());
    }

    #[tokio::test]
    async fn fan_out_delivers_one_copy_per_channel() {
        let registry = Arc::new(ConnectionRegistry::new());
        let mut rx1 = registry_with_channel(&registry, "d1").await;
        let mut rx2 = registry_with_channel(&registry, "d1").await;
        let dispatcher = Dispatcher::new(Arc::clone(&registry));

        let result = dispatcher.send_to_device(&DeviceId::from("d1"), "cmd").await;
        assert!(result.reached);
        assert_eq!(result.recipient_count, 2);

        assert_eq!(rx1.recv().await.as_deref(), Some("cmd"));
        assert_eq!(rx2.recv().await.as_deref(), Some("cmd"));
        // Exactly one copy each.
        assert!(rx1.try_recv().is_err());
        assert!(rx2.try_recv().is_err());
    }

    #[tokio::test]
    async fn failed_channel_is_unregistered_and_others_still_receive() {
        let registry = Arc::new(ConnectionRegistry::new());
        let mut live_rx = registry_with_channel(&registry, "d1").await;
        let dead_rx = registry_with_channel(&registry, "d1").await;
        drop(dead_rx);
        let dispatcher = Dispatcher::new(Arc::clone(&registry));

        let id = DeviceId::from("d1");
        let result = dispatcher.send_to_device(&id, "cmd").await;
        assert!(result.reached);
        assert_eq!(result.recipient_count, 1);
        assert_eq!(live_rx.recv().await.as_deref(), Some("cmd"));

        // The dead channel was dropped from the registry.
        assert_eq!(registry.channels_for(&id).await.len(), 1);
    }

    #[tokio::test]
    async fn sole_dead_channel_leaves_device_offline_afterwards() {
        let registry = Arc::new(ConnectionRegistry::new());
        let rx = registry_with_channel(&registry, "d1").await;
        drop(rx);
        let dispatcher = Dispatcher::new(Arc::clone(&registry));

        let id = DeviceId::from("d1");
        // Result reflects registry state before the write attempt.
        let result = dispatcher.send_to_device(&id, "cmd").await;
        assert!(result.reached);
        assert_eq!(result.recipient_count, 0);

        assert!(!registry.is_online(&id).await);
    }

    #[tokio::test]
    async fn broadcast_reaches_every_online_device() {
        let registry = Arc::new(ConnectionRegistry::new());
        let mut rx1 = registry_with_channel(&registry, "d1").await;
        let mut rx2 = registry_with_channel(&registry, "d2").await;
        let mut rx3 = registry_with_channel(&registry, "d3").await;
        let dispatcher = Dispatcher::new(Arc::clone(&registry));

        let reached = dispatcher.broadcast("hello").await;
        assert_eq!(reached, 3);
        assert_eq!(rx1.recv().await.as_deref(), Some("hello"));
        assert_eq!(rx2.recv().await.as_deref(), Some("hello"));
        assert_eq!(rx3.recv().await.as_deref(), Some("hello"));
    }

    #[tokio::test]
    async fn room_addressing_matches_device_addressing() {
        let registry = Arc::new(ConnectionRegistry::new());
        let mut rx = registry_with_channel(&registry, "lobby").await;
        let dispatcher = Dispatcher::new(registry);

        let result = dispatcher.send_to_room(&DeviceId::from("lobby"), "msg").await;
        assert!(result.reached);
        assert_eq!(rx.recv().await.as_deref(), Some("msg"));
    }
}
