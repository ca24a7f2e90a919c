//! WebSocket connection state machine.
//!
//! A channel is transport-connected the moment the upgrade completes,
//! but stays logically invisible to the dispatcher until the client
//! identifies itself. Only after a valid `joinRoom` frame is the channel
//! filed in the registry and addressable.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{Sink, SinkExt, Stream, StreamExt};

use super::messages::{self, IdentifyError};
use crate::domain::{ChannelHandle, ConnectionRegistry, DeviceId};

/// Runs the full lifecycle of one WebSocket connection.
///
/// 1. Waits for the identification frame; protocol violations get an
///    error frame and the channel is closed unregistered.
/// 2. Registers the channel, confirms with the device id and current
///    device count.
/// 3. Pumps outbound frames from the registry queue to the socket until
///    either side goes away, then unregisters.
pub async fn run_connection(socket: WebSocket, registry: Arc<ConnectionRegistry>) {
    let (mut ws_tx, mut ws_rx) = socket.split();

    let Some(device_id) = identify(&mut ws_tx, &mut ws_rx).await else {
        return;
    };

    let (handle, mut outbound_rx) = ChannelHandle::new();
    let channel_id = handle.id();
    registry.register(device_id.clone(), handle).await;

    let connected = registry.device_count().await;
    let welcome = messages::welcome_frame(&device_id, connected);
    if ws_tx.send(Message::text(welcome)).await.is_err() {
        registry.unregister(&device_id, channel_id).await;
        return;
    }
    tracing::info!(device_id = %device_id, %channel_id, connected, "device identified");

    loop {
        tokio::select! {
            // Inbound traffic: only close matters after identification.
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        tracing::debug!(device_id = %device_id, len = text.len(), "inbound frame ignored");
                    }
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => {}
                }
            }
            // Outbound frame queued by the dispatcher.
            frame = outbound_rx.recv() => {
                match frame {
                    Some(frame) => {
                        if ws_tx.send(Message::text(frame)).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                }
            }
        }
    }

    registry.unregister(&device_id, channel_id).await;
    tracing::debug!(device_id = %device_id, %channel_id, "ws connection closed");
}

/// Outcome of inspecting one frame during the identification phase.
#[derive(Debug, PartialEq)]
enum HandshakeStep {
    /// Valid `joinRoom` frame; the channel is ready to register.
    Identified(DeviceId),
    /// Protocol violation; reject with an error frame and close.
    Reject(IdentifyError),
    /// Control frame (ping/pong); keep waiting.
    Ignore,
    /// The client closed or the transport failed.
    Disconnected,
}

/// Classifies a frame received before identification.
///
/// Text frames are parsed as `joinRoom`; a binary frame is a protocol
/// violation, since the handshake is text-only. Ping/pong stay
/// transparent.
fn handshake_step(msg: Option<Result<Message, axum::Error>>) -> HandshakeStep {
    match msg {
        Some(Ok(Message::Text(text))) => match messages::parse_identify(&text) {
            Ok(device_id) => HandshakeStep::Identified(device_id),
            Err(err) => HandshakeStep::Reject(err),
        },
        Some(Ok(Message::Binary(_))) => HandshakeStep::Reject(IdentifyError::Malformed),
        Some(Ok(Message::Close(_))) | Some(Err(_)) | None => HandshakeStep::Disconnected,
        Some(Ok(_)) => HandshakeStep::Ignore,
    }
}

/// Waits for the identification frame on a fresh connection.
///
/// Returns `None` when the client violates the protocol or disconnects;
/// an error frame is emitted before closing on violations.
async fn identify<Tx, Rx>(ws_tx: &mut Tx, ws_rx: &mut Rx) -> Option<DeviceId>
where
    Tx: Sink<Message> + Unpin,
    Rx: Stream<Item = Result<Message, axum::Error>> + Unpin,
{
    loop {
        match handshake_step(ws_rx.next().await) {
            HandshakeStep::Identified(device_id) => return Some(device_id),
            HandshakeStep::Reject(err) => {
                tracing::debug!(error = %err, "identification rejected");
                let frame = messages::error_frame(&err.to_string());
                let _ = ws_tx.send(Message::text(frame)).await;
                let _ = ws_tx.send(Message::Close(None)).await;
                return None;
            }
            HandshakeStep::Ignore => {}
            HandshakeStep::Disconnected => return None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn text_frame(value: serde_json::Value) -> Option<Result<Message, axum::Error>> {
        Some(Ok(Message::text(value.to_string())))
    }

    #[test]
    fn valid_join_room_frame_identifies_the_device() {
        let step = handshake_step(text_frame(
            serde_json::json!({"event": "joinRoom", "deviceId": "d1"}),
        ));
        assert_eq!(step, HandshakeStep::Identified(DeviceId::from("d1")));
    }

    #[test]
    fn binary_frame_is_rejected_as_malformed() {
        let msg = Some(Ok(Message::Binary(vec![0x01, 0x02].into())));
        assert_eq!(
            handshake_step(msg),
            HandshakeStep::Reject(IdentifyError::Malformed)
        );
    }

    #[test]
    fn ping_is_transparent_during_identification() {
        let msg = Some(Ok(Message::Ping(axum::body::Bytes::new())));
        assert_eq!(handshake_step(msg), HandshakeStep::Ignore);
    }

    #[test]
    fn close_and_stream_end_disconnect() {
        let msg = Some(Ok(Message::Close(None)));
        assert_eq!(handshake_step(msg), HandshakeStep::Disconnected);
        assert_eq!(handshake_step(None), HandshakeStep::Disconnected);
    }

    #[test]
    fn bad_event_is_rejected_with_the_parse_error() {
        let step = handshake_step(text_frame(
            serde_json::json!({"event": "subscribe", "deviceId": "d1"}),
        ));
        assert_eq!(
            step,
            HandshakeStep::Reject(IdentifyError::UnexpectedEvent("subscribe".to_string()))
        );
    }
}
