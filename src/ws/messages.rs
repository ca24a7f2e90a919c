//! WebSocket frames: identification handshake and server-sent frames.

use serde::Deserialize;

use crate::domain::DeviceId;

/// Event name a client must send to bind its channel to a device identity.
pub const JOIN_ROOM_EVENT: &str = "joinRoom";

/// First frame a client sends after connecting:
/// `{"event": "joinRoom", "deviceId": "<string>"}`.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentifyFrame {
    /// Must be `joinRoom`.
    pub event: String,
    /// Device identity to file this channel under.
    #[serde(rename = "deviceId", default)]
    pub device_id: Option<String>,
}

/// Why an identification frame was rejected.
///
/// Any of these closes the channel; it is never registered.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentifyError {
    /// Frame was not valid JSON or not the expected object shape.
    #[error("malformed identification frame")]
    Malformed,
    /// Frame carried an event other than `joinRoom`.
    #[error("unexpected event '{0}', expected '{JOIN_ROOM_EVENT}'")]
    UnexpectedEvent(String),
    /// `deviceId` was missing or empty.
    #[error("'deviceId' is required")]
    MissingDeviceId,
}

/// Parses and validates an identification frame.
///
/// # Errors
///
/// Returns an [`IdentifyError`] describing the protocol violation; the
/// caller must send an error frame and close the channel.
pub fn parse_identify(text: &str) -> Result<DeviceId, IdentifyError> {
    let frame: IdentifyFrame =
        serde_json::from_str(text).map_err(|_| IdentifyError::Malformed)?;
    if frame.event != JOIN_ROOM_EVENT {
        return Err(IdentifyError::UnexpectedEvent(frame.event));
    }
    match frame.device_id {
        Some(id) if !id.is_empty() => Ok(DeviceId::new(id)),
        _ => Err(IdentifyError::MissingDeviceId),
    }
}

/// Error frame sent before closing a misbehaving channel.
#[must_use]
pub fn error_frame(message: &str) -> String {
    serde_json::json!({
        "type": "error",
        "message": message,
    })
    .to_string()
}

/// Confirmation frame sent after successful identification.
#[must_use]
pub fn welcome_frame(device_id: &DeviceId, connected_devices: usize) -> String {
    serde_json::json!({
        "type": "connection_success",
        "device_id": device_id,
        "connected_devices": connected_devices,
        "message": format!("Device {device_id} connected successfully."),
    })
    .to_string()
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn valid_identification_resolves_device_id() {
        let result = parse_identify(r#"{"event": "joinRoom", "deviceId": "D1"}"#);
        assert_eq!(result, Ok(DeviceId::from("D1")));
    }

    #[test]
    fn malformed_json_is_rejected() {
        assert_eq!(parse_identify("not json"), Err(IdentifyError::Malformed));
        assert_eq!(parse_identify("[1,2]"), Err(IdentifyError::Malformed));
    }

    #[test]
    fn wrong_event_is_rejected() {
        let result = parse_identify(r#"{"event": "subscribe", "deviceId": "D1"}"#);
        assert_eq!(
            result,
            Err(IdentifyError::UnexpectedEvent("subscribe".to_string()))
        );
    }

    #[test]
    fn missing_or_empty_device_id_is_rejected() {
        assert_eq!(
            parse_identify(r#"{"event": "joinRoom"}"#),
            Err(IdentifyError::MissingDeviceId)
        );
        assert_eq!(
            parse_identify(r#"{"event": "joinRoom", "deviceId": ""}"#),
            Err(IdentifyError::MissingDeviceId)
        );
    }

    #[test]
    fn welcome_frame_reports_device_count() {
        let frame = welcome_frame(&DeviceId::from("D1"), 3);
        let parsed: serde_json::Value = serde_json::from_str(&frame).unwrap_or_default();
        assert_eq!(parsed.get("type"), Some(&"connection_success".into()));
        assert_eq!(parsed.get("device_id"), Some(&"D1".into()));
        assert_eq!(parsed.get("connected_devices"), Some(&3.into()));
    }
}
