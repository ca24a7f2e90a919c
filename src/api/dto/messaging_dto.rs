//! Messaging and introspection DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Room name that fans a message out to every connected device.
pub const BROADCAST_ROOM: &str = "broadcast";

/// Request body for `POST /broadcast`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct BroadcastRequest {
    /// Message content to deliver.
    pub message: String,
    /// Optional identity of the sender.
    #[serde(default)]
    pub sender_id: Option<String>,
    /// Target room/device. The reserved name `broadcast` addresses
    /// every connected device.
    pub room_id: String,
}

/// Response body for `POST /broadcast`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BroadcastResponse {
    /// Always `success` on 200.
    pub status: String,
    /// Human-readable outcome description.
    pub message: String,
    /// Number of devices that received the message.
    pub recipients: usize,
    /// Server timestamp.
    pub timestamp: DateTime<Utc>,
}

/// Response body for `GET /connections`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ConnectionsResponse {
    /// Number of distinct online device identities.
    pub connected_devices: usize,
    /// Total open channels across all devices.
    pub total_connections: usize,
    /// Server timestamp.
    pub timestamp: DateTime<Utc>,
}
