//! HTTP client for the external action-ledger service.

use uuid::Uuid;

use super::models::{ActionCreate, ActionRecord, ActionUpdate};
use crate::error::GatewayError;

const API_PREFIX: &str = "/api/v1";
const INTERNAL_HEADER: &str = "X-Internal-Request";

/// REST client for the action resource of the core data service.
///
/// All calls carry the `X-Internal-Request: true` header the data
/// service uses to distinguish gateway traffic. Every method returns an
/// explicit [`GatewayError::Ledger`] on failure so the caller decides
/// whether an audit failure is fatal to the request; the command path
/// logs and continues.
#[derive(Debug, Clone)]
pub struct ActionLedgerClient {
    http: reqwest::Client,
    base_url: String,
}

impl ActionLedgerClient {
    /// Creates a client for the ledger at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Internal`] if the underlying HTTP client
    /// cannot be constructed.
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| GatewayError::Internal(format!("http client: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    /// Creates a new action record (`POST /api/v1/actions`).
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Ledger`] if the ledger is unreachable or
    /// responds with a non-success status.
    pub async fn create_action(&self, action: &ActionCreate) -> Result<ActionRecord, GatewayError> {
        let url = format!("{}{API_PREFIX}/actions", self.base_url);
        let response = self
            .http
            .post(&url)
            .header(INTERNAL_HEADER, "true")
            .json(action)
            .send()
            .await
            .map_err(|e| GatewayError::Ledger(format!("create action: {e}")))?;

        Self::parse_record(response, "create action").await
    }

    /// Applies a partial update to an existing action
    /// (`PATCH /api/v1/actions/{id}`).
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Ledger`] if the ledger is unreachable,
    /// the action does not exist, or the response cannot be decoded.
    pub async fn update_action(
        &self,
        action_id: Uuid,
        update: &ActionUpdate,
    ) -> Result<ActionRecord, GatewayError> {
        let url = format!("{}{API_PREFIX}/actions/{action_id}", self.base_url);
        let response = self
            .http
            .patch(&url)
            .header(INTERNAL_HEADER, "true")
            .json(update)
            .send()
            .await
            .map_err(|e| GatewayError::Ledger(format!("update action {action_id}: {e}")))?;

        Self::parse_record(response, "update action").await
    }

    async fn parse_record(
        response: reqwest::Response,
        context: &str,
    ) -> Result<ActionRecord, GatewayError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Ledger(format!(
                "{context}: ledger returned {status}: {body}"
            )));
        }
        response
            .json::<ActionRecord>()
            .await
            .map_err(|e| GatewayError::Ledger(format!("{context}: decode response: {e}")))
    }
}
