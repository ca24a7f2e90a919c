//! Command orchestration: audit record, dispatch, state transition.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::domain::{CommandKind, CommandMessage, CommandPayload, DeviceId, Dispatcher};
use crate::ledger::{ActionCreate, ActionLedgerClient, ActionUpdate};

/// Whether the dispatch reached a live device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Device was online; the command was written to its channels.
    Sent,
    /// Device was offline; the action stays pending. No retry is
    /// scheduled anywhere: a pending action is only re-dispatched when
    /// an operator re-issues the command.
    Pending,
}

/// Result of one command dispatch, as reported to the operator.
#[derive(Debug, Clone)]
pub struct DispatchReport {
    /// Sent vs pending.
    pub outcome: DispatchOutcome,
    /// Command that was dispatched.
    pub command: CommandKind,
    /// Target device identity.
    pub device_id: DeviceId,
    /// Number of channels that accepted the write.
    pub recipient_count: usize,
    /// Dispatch timestamp echoed in the HTTP response.
    pub timestamp: DateTime<Utc>,
    /// Ledger id of the created action, when one was recorded.
    pub action_id: Option<uuid::Uuid>,
}

/// Orchestrates one command attempt end to end.
///
/// Every dispatch follows the same sequence: create a pending action
/// record, fan the command out to the device's channels, and mark the
/// action applied when the device was reached. The ledger write and the
/// channel write are intentionally decoupled: no transaction spans both,
/// and a ledger failure never blocks delivery.
#[derive(Debug, Clone)]
pub struct CommandService {
    dispatcher: Arc<Dispatcher>,
    ledger: Arc<ActionLedgerClient>,
}

impl CommandService {
    /// Creates a new `CommandService`.
    #[must_use]
    pub fn new(dispatcher: Arc<Dispatcher>, ledger: Arc<ActionLedgerClient>) -> Self {
        Self { dispatcher, ledger }
    }

    /// Returns the inner dispatcher.
    #[must_use]
    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    /// Dispatches `command` to `device_id` and audits the attempt.
    ///
    /// Non-UUID device identities (web clients) are dispatched without a
    /// ledger record; the ledger's device column is a UUID.
    pub async fn dispatch(
        &self,
        device_id: DeviceId,
        command: CommandKind,
        applied_by_id: uuid::Uuid,
        payload: CommandPayload,
    ) -> DispatchReport {
        // 1. Best-effort audit record, PENDING.
        let created = match device_id.as_uuid() {
            Some(device_uuid) => {
                let create = ActionCreate::for_dispatch(device_uuid, applied_by_id, command);
                match self.ledger.create_action(&create).await {
                    Ok(record) => Some(record),
                    Err(e) => {
                        tracing::warn!(
                            device_id = %device_id,
                            %command,
                            error = %e,
                            "could not create action record; dispatching anyway"
                        );
                        None
                    }
                }
            }
            None => {
                tracing::debug!(
                    device_id = %device_id,
                    %command,
                    "non-UUID device identity, skipping ledger record"
                );
                None
            }
        };

        // 2. Resolve channels and emit.
        let message = CommandMessage::new(command, device_id.clone(), payload);
        let timestamp = message.timestamp;
        let delivery = self
            .dispatcher
            .send_to_device(&device_id, &message.to_frame())
            .await;

        if !delivery.reached {
            tracing::info!(device_id = %device_id, %command, "device offline, action stays pending");
            return DispatchReport {
                outcome: DispatchOutcome::Pending,
                command,
                device_id,
                recipient_count: 0,
                timestamp,
                action_id: created.map(|r| r.action_id),
            };
        }

        // 3. Device was live: transition the action to APPLIED. A failed
        //    update leaves the audit trail under-reporting as PENDING
        //    even though the device received the command.
        let action_id = if let Some(record) = created {
            let update = ActionUpdate::applied(command, record.device_id);
            if let Err(e) = self.ledger.update_action(record.action_id, &update).await {
                tracing::warn!(
                    action_id = %record.action_id,
                    error = %e,
                    "could not mark action applied"
                );
            }
            Some(record.action_id)
        } else {
            None
        };

        tracing::info!(
            device_id = %device_id,
            %command,
            recipients = delivery.recipient_count,
            "command dispatched"
        );
        DispatchReport {
            outcome: DispatchOutcome::Sent,
            command,
            device_id,
            recipient_count: delivery.recipient_count,
            timestamp,
            action_id,
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::ConnectionRegistry;
    use crate::domain::channel::ChannelHandle;
    use axum::extract::{Path, State};
    use axum::routing::{patch, post};
    use axum::{Json, Router};
    use serde_json::Value;
    use tokio::sync::Mutex;
    use uuid::Uuid;

    /// One request the stub ledger observed.
    #[derive(Debug, Clone)]
    enum LedgerCall {
        Create(Value),
        Update(Uuid, Value),
    }

    #[derive(Debug, Clone)]
    struct StubState {
        calls: Arc<Mutex<Vec<LedgerCall>>>,
        action_id: Uuid,
        fail_create: bool,
    }

    async fn stub_create(
        State(state): State<StubState>,
        Json(body): Json<Value>,
    ) -> Result<Json<Value>, axum::http::StatusCode> {
        state.calls.lock().await.push(LedgerCall::Create(body.clone()));
        if state.fail_create {
            return Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR);
        }
        Ok(Json(record_json(&state, &body, "pending")))
    }

    async fn stub_update(
        State(state): State<StubState>,
        Path(id): Path<Uuid>,
        Json(body): Json<Value>,
    ) -> Json<Value> {
        state.calls.lock().await.push(LedgerCall::Update(id, body.clone()));
        let mut record = record_json(&state, &body, "applied");
        if let (Some(obj), Some(state_field)) = (record.as_object_mut(), body.get("state")) {
            obj.insert("state".to_string(), state_field.clone());
        }
        Json(record)
    }

    fn record_json(state: &StubState, body: &Value, default_state: &str) -> Value {
        serde_json::json!({
            "action_id": state.action_id,
            "device_id": body.get("device_id").cloned().unwrap_or_else(|| Value::from(Uuid::new_v4().to_string())),
            "action": body.get("action").cloned().unwrap_or_else(|| Value::from("block")),
            "state": body.get("state").cloned().unwrap_or_else(|| Value::from(default_state)),
            "description": body.get("description").cloned().unwrap_or(Value::Null),
            "created_at": "2026-01-01T00:00:00Z",
            "updated_at": "2026-01-01T00:00:00Z"
        })
    }

    /// Spawns an in-process ledger stub on an ephemeral port.
    async fn spawn_stub_ledger(fail_create: bool) -> (String, Arc<Mutex<Vec<LedgerCall>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let state = StubState {
            calls: Arc::clone(&calls),
            action_id: Uuid::new_v4(),
            fail_create,
        };
        let app = Router::new()
            .route("/api/v1/actions", post(stub_create))
            .route("/api/v1/actions/{id}", patch(stub_update))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await;
        let Ok(listener) = listener else {
            panic!("stub ledger bind failed");
        };
        let Ok(addr) = listener.local_addr() else {
            panic!("stub ledger addr");
        };
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        (format!("http://{addr}"), calls)
    }

    async fn make_service(
        ledger_url: &str,
    ) -> (CommandService, Arc<ConnectionRegistry>) {
        let registry = Arc::new(ConnectionRegistry::new());
        let dispatcher = Arc::new(Dispatcher::new(Arc::clone(&registry)));
        let Ok(client) = ActionLedgerClient::new(ledger_url, 2) else {
            panic!("client construction failed");
        };
        (CommandService::new(dispatcher, Arc::new(client)), registry)
    }

    #[tokio::test]
    async fn online_dispatch_transitions_pending_to_applied() {
        let (url, calls) = spawn_stub_ledger(false).await;
        let (service, registry) = make_service(&url).await;

        let device_uuid = Uuid::new_v4();
        let device_id = DeviceId::new(device_uuid.to_string());
        let (handle, mut rx) = ChannelHandle::new();
        registry.register(device_id.clone(), handle).await;

        let payload = CommandPayload::parse(
            CommandKind::Notify,
            Some(serde_json::json!({"title": "Hi", "message": "hello"})),
        );
        let Ok(payload) = payload else {
            panic!("payload should validate");
        };

        let report = service
            .dispatch(device_id, CommandKind::Notify, Uuid::new_v4(), payload)
            .await;
        assert_eq!(report.outcome, DispatchOutcome::Sent);
        assert_eq!(report.recipient_count, 1);
        assert!(report.action_id.is_some());

        // The device received the wire message.
        let Some(frame) = rx.recv().await else {
            panic!("device should receive a frame");
        };
        let parsed: Value = serde_json::from_str(&frame).unwrap_or_default();
        assert_eq!(parsed.get("command"), Some(&Value::from("notify")));
        assert_eq!(
            parsed.get("device_id"),
            Some(&Value::from(device_uuid.to_string()))
        );

        // Ledger saw create(pending) then update(applied).
        let calls = calls.lock().await;
        assert_eq!(calls.len(), 2);
        let Some(LedgerCall::Create(create)) = calls.first() else {
            panic!("first call should be create");
        };
        assert_eq!(create.get("state"), Some(&Value::from("pending")));
        let Some(LedgerCall::Update(_, update)) = calls.get(1) else {
            panic!("second call should be update");
        };
        assert_eq!(update.get("state"), Some(&Value::from("applied")));
    }

    #[tokio::test]
    async fn offline_dispatch_leaves_action_pending() {
        let (url, calls) = spawn_stub_ledger(false).await;
        let (service, _registry) = make_service(&url).await;

        let device_id = DeviceId::new(Uuid::new_v4().to_string());
        let payload = CommandPayload::empty();
        let report = service
            .dispatch(device_id, CommandKind::Block, Uuid::new_v4(), payload)
            .await;

        assert_eq!(report.outcome, DispatchOutcome::Pending);
        assert_eq!(report.recipient_count, 0);

        // Only the create call; no PENDING -> APPLIED transition.
        let calls = calls.lock().await;
        assert_eq!(calls.len(), 1);
        assert!(matches!(calls.first(), Some(LedgerCall::Create(_))));
    }

    #[tokio::test]
    async fn ledger_failure_does_not_block_delivery() {
        let (url, _calls) = spawn_stub_ledger(true).await;
        let (service, registry) = make_service(&url).await;

        let device_id = DeviceId::new(Uuid::new_v4().to_string());
        let (handle, mut rx) = ChannelHandle::new();
        registry.register(device_id.clone(), handle).await;

        let payload = CommandPayload::empty();
        let report = service
            .dispatch(device_id, CommandKind::Block, Uuid::new_v4(), payload)
            .await;

        assert_eq!(report.outcome, DispatchOutcome::Sent);
        assert!(report.action_id.is_none());
        assert!(rx.recv().await.is_some());
    }

    #[tokio::test]
    async fn non_uuid_identity_skips_ledger() {
        let (url, calls) = spawn_stub_ledger(false).await;
        let (service, registry) = make_service(&url).await;

        let device_id = DeviceId::from("kiosk-web-client");
        let (handle, mut rx) = ChannelHandle::new();
        registry.register(device_id.clone(), handle).await;

        let payload = CommandPayload::empty();
        let report = service
            .dispatch(device_id, CommandKind::Refresh, Uuid::new_v4(), payload)
            .await;

        assert_eq!(report.outcome, DispatchOutcome::Sent);
        assert!(report.action_id.is_none());
        assert!(rx.recv().await.is_some());
        assert!(calls.lock().await.is_empty());
    }
}
