//! Command dispatch DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request body for `POST /devices/{device_id}/{kind}`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CommandRequest {
    /// Operator (user id) issuing the command.
    pub applied_by_id: uuid::Uuid,
    /// Command payload. Structure depends on the command kind; may be
    /// omitted entirely.
    #[serde(default)]
    pub payload: Option<serde_json::Value>,
}

/// Response body for every command route.
///
/// `status` is `"sent"` (HTTP 200, device was online) or `"pending"`
/// (HTTP 202, device offline, action stays pending).
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CommandDispatchResponse {
    /// `sent` or `pending`.
    pub status: String,
    /// Human-readable outcome description.
    pub detail: String,
    /// Dispatched command kind.
    pub command: String,
    /// Target device identity.
    pub device_id: String,
    /// Dispatch timestamp.
    pub timestamp: DateTime<Utc>,
}
