//! Wire models for the external action-ledger REST resource.
//!
//! Field names and enum values mirror the ledger service's schema
//! verbatim; the gateway does not own this contract.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::CommandKind;

/// Lifecycle state of an action record.
///
/// Created `Pending` with the dispatch attempt and moved to `Applied`
/// when the device was reached. `Failed` exists in the ledger schema but
/// is never produced by the gateway's normal flow; an offline command
/// stays `Pending` until re-issued manually.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionState {
    /// Dispatch attempted, device not (yet) reached.
    Pending,
    /// Device was online at dispatch time and the command was written.
    Applied,
    /// Terminal failure (ledger schema only; unreached from the gateway).
    Failed,
}

/// Request body for `POST /api/v1/actions`.
#[derive(Debug, Clone, Serialize)]
pub struct ActionCreate {
    /// Target device.
    pub device_id: Uuid,
    /// Operator who issued the command.
    pub applied_by_id: Uuid,
    /// Command kind as recorded by the ledger.
    pub action: CommandKind,
    /// Initial state, always `pending` at creation.
    pub state: ActionState,
    /// Free-text description of the attempt.
    pub description: String,
}

impl ActionCreate {
    /// Builds the creation record for one dispatch attempt.
    ///
    /// SIM command variants are filed under their plain ledger kind; the
    /// original command name is preserved in the description.
    #[must_use]
    pub fn for_dispatch(device_id: Uuid, applied_by_id: Uuid, command: CommandKind) -> Self {
        Self {
            device_id,
            applied_by_id,
            action: command.ledger_kind(),
            state: ActionState::Pending,
            description: format!("Action '{command}' initiated for device {device_id}."),
        }
    }
}

/// Partial-update body for `PATCH /api/v1/actions/{id}`.
#[derive(Debug, Clone, Serialize)]
pub struct ActionUpdate {
    /// New state, if changing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<ActionState>,
    /// New description, if changing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ActionUpdate {
    /// Transition to `applied` after a successful dispatch.
    #[must_use]
    pub fn applied(command: CommandKind, device_id: Uuid) -> Self {
        Self {
            state: Some(ActionState::Applied),
            description: Some(format!(
                "Action '{command}' applied to online device {device_id}."
            )),
        }
    }
}

/// Action record as returned by the ledger service.
///
/// Unknown response fields (e.g. the expanded `applied_by` user object)
/// are ignored on deserialization.
#[derive(Debug, Clone, Deserialize)]
pub struct ActionRecord {
    /// Ledger-assigned identifier.
    pub action_id: Uuid,
    /// Target device.
    pub device_id: Uuid,
    /// Recorded command kind.
    pub action: CommandKind,
    /// Current lifecycle state.
    pub state: ActionState,
    /// Free-text description.
    pub description: Option<String>,
    /// Record creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}
