//! Device command routes: one `POST /devices/{device_id}/{kind}` route
//! per command kind.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::{CommandDispatchResponse, CommandRequest};
use crate::app_state::AppState;
use crate::domain::{CommandKind, CommandPayload, DeviceId};
use crate::error::{ErrorResponse, GatewayError};
use crate::service::DispatchOutcome;

/// `POST /devices/{device_id}/block` — Block a device.
///
/// # Errors
///
/// Returns [`GatewayError`] on an invalid payload. An offline device is
/// not an error: it yields a 202 with status `pending`.
#[utoipa::path(
    post,
    path = "/devices/{device_id}/block",
    tag = "Device Commands",
    summary = "Block a device",
    description = "Creates a pending action record and pushes the block command to every live channel of the device. Offline devices leave the action pending.",
    request_body = CommandRequest,
    responses(
        (status = 200, description = "Device was online, command sent", body = CommandDispatchResponse),
        (status = 202, description = "Device offline, action stays pending", body = CommandDispatchResponse),
        (status = 400, description = "Invalid payload", body = ErrorResponse),
    )
)]
pub async fn block_device(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
    Json(req): Json<CommandRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    dispatch(state, device_id, CommandKind::Block, req).await
}

/// `POST /devices/{device_id}/unblock` — Release a block.
///
/// # Errors
///
/// Returns [`GatewayError`] on an invalid payload.
pub async fn unblock_device(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
    Json(req): Json<CommandRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    dispatch(state, device_id, CommandKind::Unblock, req).await
}

/// `POST /devices/{device_id}/locate` — Request the device location.
///
/// # Errors
///
/// Returns [`GatewayError`] on an invalid payload.
pub async fn locate_device(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
    Json(req): Json<CommandRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    dispatch(state, device_id, CommandKind::Locate, req).await
}

/// `POST /devices/{device_id}/refresh` — Force a state refresh.
///
/// # Errors
///
/// Returns [`GatewayError`] on an invalid payload.
pub async fn refresh_device(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
    Json(req): Json<CommandRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    dispatch(state, device_id, CommandKind::Refresh, req).await
}

/// `POST /devices/{device_id}/notify` — Show a notification.
///
/// # Errors
///
/// Returns [`GatewayError`] when the payload lacks `title` or `message`.
pub async fn notify_device(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
    Json(req): Json<CommandRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    dispatch(state, device_id, CommandKind::Notify, req).await
}

/// `POST /devices/{device_id}/unenroll` — Remove from management.
///
/// # Errors
///
/// Returns [`GatewayError`] on an invalid payload.
pub async fn unenroll_device(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
    Json(req): Json<CommandRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    dispatch(state, device_id, CommandKind::Unenroll, req).await
}

/// `POST /devices/{device_id}/exception` — Report an exception.
///
/// # Errors
///
/// Returns [`GatewayError`] when the payload lacks `error_code` or
/// `error_message`.
pub async fn exception_device(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
    Json(req): Json<CommandRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    dispatch(state, device_id, CommandKind::Exception, req).await
}

/// `POST /devices/{device_id}/block_sim` — Block the SIM card.
///
/// # Errors
///
/// Returns [`GatewayError`] on an invalid payload.
pub async fn block_sim(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
    Json(req): Json<CommandRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    dispatch(state, device_id, CommandKind::BlockSim, req).await
}

/// `POST /devices/{device_id}/unblock_sim` — Unblock the SIM card.
///
/// # Errors
///
/// Returns [`GatewayError`] on an invalid payload.
pub async fn unblock_sim(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
    Json(req): Json<CommandRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    dispatch(state, device_id, CommandKind::UnblockSim, req).await
}

/// Shared dispatch path for every command route.
async fn dispatch(
    state: AppState,
    device_id: String,
    kind: CommandKind,
    req: CommandRequest,
) -> Result<(StatusCode, Json<CommandDispatchResponse>), GatewayError> {
    let payload = CommandPayload::parse(kind, req.payload)?;
    let report = state
        .command_service
        .dispatch(DeviceId::new(device_id), kind, req.applied_by_id, payload)
        .await;

    let (status, label, detail) = match report.outcome {
        DispatchOutcome::Sent => (
            StatusCode::OK,
            "sent",
            "Action sent to online device successfully.",
        ),
        DispatchOutcome::Pending => (
            StatusCode::ACCEPTED,
            "pending",
            "Device is offline. Action has been queued for later execution.",
        ),
    };

    Ok((
        status,
        Json(CommandDispatchResponse {
            status: label.to_string(),
            detail: detail.to_string(),
            command: report.command.to_string(),
            device_id: report.device_id.to_string(),
            timestamp: report.timestamp,
        }),
    ))
}

/// Command routes mounted at the root level.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/devices/{device_id}/block", post(block_device))
        .route("/devices/{device_id}/unblock", post(unblock_device))
        .route("/devices/{device_id}/locate", post(locate_device))
        .route("/devices/{device_id}/refresh", post(refresh_device))
        .route("/devices/{device_id}/notify", post(notify_device))
        .route("/devices/{device_id}/unenroll", post(unenroll_device))
        .route("/devices/{device_id}/exception", post(exception_device))
        .route("/devices/{device_id}/block_sim", post(block_sim))
        .route("/devices/{device_id}/unblock_sim", post(unblock_sim))
}
