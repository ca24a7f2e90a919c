//! Direct and broadcast messaging to connected devices.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use chrono::Utc;

use crate::api::dto::messaging_dto::BROADCAST_ROOM;
use crate::api::dto::{BroadcastRequest, BroadcastResponse};
use crate::app_state::AppState;
use crate::domain::DeviceId;
use crate::error::{ErrorResponse, GatewayError};

/// `POST /broadcast` — Send a message to a room/device or to everyone.
///
/// # Errors
///
/// Returns [`GatewayError::NoDevicesConnected`] when nothing is online,
/// or [`GatewayError::TargetNotConnected`] when the addressed room has
/// no open channels.
#[utoipa::path(
    post,
    path = "/broadcast",
    tag = "Messaging",
    summary = "Send a message to a room or to all devices",
    description = "Delivers a text message to the target room/device, or to every connected device when `room_id` is `broadcast`.",
    request_body = BroadcastRequest,
    responses(
        (status = 200, description = "Message delivered", body = BroadcastResponse),
        (status = 404, description = "No devices connected or target offline", body = ErrorResponse),
    )
)]
pub async fn broadcast_message(
    State(state): State<AppState>,
    Json(req): Json<BroadcastRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    if state.registry.device_count().await == 0 {
        return Err(GatewayError::NoDevicesConnected);
    }

    let timestamp = Utc::now();

    if req.room_id == BROADCAST_ROOM {
        let frame = serde_json::json!({
            "type": "broadcast",
            "message": req.message,
            "from_device": req.sender_id,
            "room_id": BROADCAST_ROOM,
            "timestamp": timestamp,
        })
        .to_string();
        let recipients = state.dispatcher.broadcast(&frame).await;

        return Ok(Json(BroadcastResponse {
            status: "success".to_string(),
            message: "Message broadcast to all devices successfully".to_string(),
            recipients,
            timestamp: Utc::now(),
        }));
    }

    let target = DeviceId::new(req.room_id.clone());
    if !state.registry.is_online(&target).await {
        return Err(GatewayError::TargetNotConnected(req.room_id));
    }

    let frame = serde_json::json!({
        "type": "broadcast",
        "message": req.message,
        "from_device": req.sender_id,
        "room_id": target,
        "recipients": 1,
        "timestamp": timestamp,
    })
    .to_string();
    state.dispatcher.send_to_room(&target, &frame).await;

    Ok(Json(BroadcastResponse {
        status: "success".to_string(),
        message: "Message sent to device successfully".to_string(),
        recipients: 1,
        timestamp: Utc::now(),
    }))
}

/// Messaging routes mounted at the root level.
pub fn routes() -> Router<AppState> {
    Router::new().route("/broadcast", post(broadcast_message))
}
