//! Concurrent device connection registry.
//!
//! [`ConnectionRegistry`] maps a device identity to the set of channels
//! currently open for it, behind a [`tokio::sync::RwLock`]. A device is
//! "online" exactly when it has an entry: a set that drains to zero
//! channels is removed from the map, never left empty.

use std::collections::HashMap;

use tokio::sync::RwLock;

use super::channel::{ChannelHandle, ChannelId};
use super::device_id::DeviceId;

/// Central store mapping device identities to their live channels.
///
/// One instance per process, created at startup and shared via `Arc`.
/// Mutated only through [`register`](Self::register) and
/// [`unregister`](Self::unregister), from any connection task.
///
/// # Concurrency
///
/// Readers take lookup snapshots; callers must tolerate the underlying
/// set shrinking between a read and the use of its channels.
#[derive(Debug)]
pub struct ConnectionRegistry {
    connections: RwLock<HashMap<DeviceId, HashMap<ChannelId, ChannelHandle>>>,
}

impl ConnectionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Files `handle` under `device_id`, creating the entry if absent.
    ///
    /// Idempotent: registering a channel id that is already present
    /// replaces the handle and leaves the set size unchanged. The channel
    /// is addressable as soon as this returns; no acknowledgment is sent
    /// here.
    pub async fn register(&self, device_id: DeviceId, handle: ChannelHandle) {
        let mut map = self.connections.write().await;
        map.entry(device_id).or_default().insert(handle.id(), handle);
    }

    /// Removes one channel from a device's set.
    ///
    /// Removing the last channel removes the device entry entirely.
    /// Unregistering an unknown device or channel is a no-op so that
    /// disconnect cleanup racing a failed-write cleanup stays harmless.
    pub async fn unregister(&self, device_id: &DeviceId, channel_id: ChannelId) {
        let mut map = self.connections.write().await;
        if let Some(channels) = map.get_mut(device_id) {
            channels.remove(&channel_id);
            if channels.is_empty() {
                map.remove(device_id);
            }
        }
    }

    /// Returns `true` iff at least one channel is open for `device_id`.
    pub async fn is_online(&self, device_id: &DeviceId) -> bool {
        self.connections.read().await.contains_key(device_id)
    }

    /// Returns a snapshot of the live channels for `device_id`.
    ///
    /// Empty when the device is offline. Handles in the snapshot may go
    /// stale concurrently; a failed send is the signal to unregister.
    pub async fn channels_for(&self, device_id: &DeviceId) -> Vec<ChannelHandle> {
        self.connections
            .read()
            .await
            .get(device_id)
            .map(|channels| channels.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Returns a snapshot of every online device with its channels,
    /// used by broadcast.
    pub async fn all_channels(&self) -> Vec<(DeviceId, Vec<ChannelHandle>)> {
        self.connections
            .read()
            .await
            .iter()
            .map(|(device_id, channels)| {
                (device_id.clone(), channels.values().cloned().collect())
            })
            .collect()
    }

    /// Number of distinct online device identities.
    pub async fn device_count(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Total number of open channels across all devices.
    pub async fn connection_count(&self) -> usize {
        self.connections
            .read()
            .await
            .values()
            .map(HashMap::len)
            .sum()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
