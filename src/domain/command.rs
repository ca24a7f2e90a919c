//! Command kinds, typed payloads, and the wire message sent to devices.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::device_id::DeviceId;
use crate::error::GatewayError;

/// The fixed set of imperative commands an operator can push to a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    /// Lock the device screen.
    Block,
    /// Release a previous block.
    Unblock,
    /// Request the device's current location.
    Locate,
    /// Force a state refresh on the device.
    Refresh,
    /// Display a notification on the device.
    Notify,
    /// Remove the device from management.
    Unenroll,
    /// Report an exception condition to the device.
    Exception,
    /// Block the device's SIM card.
    BlockSim,
    /// Unblock the device's SIM card.
    UnblockSim,
}

impl CommandKind {
    /// Every command kind, in declaration order.
    pub const ALL: [Self; 9] = [
        Self::Block,
        Self::Unblock,
        Self::Locate,
        Self::Refresh,
        Self::Notify,
        Self::Unenroll,
        Self::Exception,
        Self::BlockSim,
        Self::UnblockSim,
    ];

    /// Returns the wire name of this kind (`snake_case`).
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Block => "block",
            Self::Unblock => "unblock",
            Self::Locate => "locate",
            Self::Refresh => "refresh",
            Self::Notify => "notify",
            Self::Unenroll => "unenroll",
            Self::Exception => "exception",
            Self::BlockSim => "block_sim",
            Self::UnblockSim => "unblock_sim",
        }
    }

    /// Returns the kind recorded in the action ledger.
    ///
    /// The ledger's action vocabulary is narrower than the gateway's: SIM
    /// variants are filed as their plain counterparts, with the original
    /// command name kept in the action description.
    #[must_use]
    pub const fn ledger_kind(&self) -> Self {
        match self {
            Self::BlockSim => Self::Block,
            Self::UnblockSim => Self::Unblock,
            other => *other,
        }
    }
}

impl std::fmt::Display for CommandKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Recognized fields of a `notify` payload.
///
/// Every field is optional; the device fills in its own defaults. The
/// struct exists to type-check fields the gateway knows about, not to
/// constrain the payload shape.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NotifyPayload {
    /// Notification title.
    pub title: Option<String>,
    /// Notification body.
    pub message: Option<String>,
    /// Priority: `low`, `normal`, or `high`.
    pub priority: Option<String>,
}

/// Recognized fields of an `unblock` payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UnblockPayload {
    /// Reason for releasing the block.
    pub reason: Option<String>,
    /// Unblock duration in seconds.
    pub duration: Option<u64>,
}

/// Recognized fields of a `locate` payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LocatePayload {
    /// Maximum seconds the device should spend acquiring a fix.
    pub timeout: Option<u64>,
}

/// Recognized fields of a `refresh` payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RefreshPayload {
    /// Whether the device must refresh even if recently synced.
    pub force: Option<bool>,
}

/// Recognized fields of an `exception` payload.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExceptionPayload {
    /// Machine-readable error code.
    pub error_code: Option<String>,
    /// Human-readable error message.
    pub error_message: Option<String>,
    /// Free-form additional detail.
    pub details: Option<Value>,
}

/// Validated command payload.
///
/// The operator-supplied map is forwarded to the device verbatim: keys
/// the gateway does not recognize pass through untouched, and nothing is
/// injected. Kinds with known structure (notify, unblock, locate,
/// refresh, exception) additionally type-check the fields they recognize
/// when those fields are present.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandPayload {
    fields: Map<String, Value>,
}

impl CommandPayload {
    /// An empty payload, accepted by every command kind.
    #[must_use]
    pub fn empty() -> Self {
        Self { fields: Map::new() }
    }

    /// Validates a raw JSON payload for `kind`.
    ///
    /// A missing or `null` payload is treated as an empty map. A present
    /// payload must be a JSON object; for kinds with known structure the
    /// recognized fields are type-checked, while unrecognized keys are
    /// always kept and forwarded as-is.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] if the payload is not an
    /// object or a recognized field carries the wrong JSON type.
    pub fn parse(kind: CommandKind, raw: Option<Value>) -> Result<Self, GatewayError> {
        let fields = match raw {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(map)) => map,
            Some(other) => {
                return Err(GatewayError::InvalidRequest(format!(
                    "payload must be a JSON object, got {}",
                    json_type_name(&other)
                )));
            }
        };

        match kind {
            CommandKind::Notify => typecheck::<NotifyPayload>(kind, &fields)?,
            CommandKind::Unblock | CommandKind::UnblockSim => {
                typecheck::<UnblockPayload>(kind, &fields)?;
            }
            CommandKind::Locate => typecheck::<LocatePayload>(kind, &fields)?,
            CommandKind::Refresh => typecheck::<RefreshPayload>(kind, &fields)?,
            CommandKind::Exception => typecheck::<ExceptionPayload>(kind, &fields)?,
            CommandKind::Block | CommandKind::Unenroll | CommandKind::BlockSim => {}
        }
        Ok(Self { fields })
    }

    /// Borrows the payload map.
    #[must_use]
    pub const fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Converts the payload into the JSON map placed on the wire.
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}

fn typecheck<T: serde::de::DeserializeOwned>(
    kind: CommandKind,
    fields: &Map<String, Value>,
) -> Result<(), GatewayError> {
    serde_json::from_value::<T>(Value::Object(fields.clone()))
        .map(|_| ())
        .map_err(|e| {
            GatewayError::InvalidRequest(format!("invalid payload for '{kind}': {e}"))
        })
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Wire message written to every live channel of the target device.
///
/// Exists only for the duration of the dispatch call; never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct CommandMessage {
    /// Command kind (`snake_case` wire name).
    pub command: CommandKind,
    /// Target device identity.
    pub device_id: DeviceId,
    /// Validated payload map.
    pub payload: Value,
    /// Dispatch timestamp (ISO-8601).
    pub timestamp: DateTime<Utc>,
}

impl CommandMessage {
    /// Builds the wire message for one dispatch attempt.
    #[must_use]
    pub fn new(command: CommandKind, device_id: DeviceId, payload: CommandPayload) -> Self {
        Self {
            command,
            device_id,
            payload: payload.into_value(),
            timestamp: Utc::now(),
        }
    }

    /// Serializes the message to the text frame written to each channel.
    #[must_use]
    pub fn to_frame(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}
