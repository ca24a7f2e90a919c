//! Action ledger integration.
//!
//! Every command dispatch is audited as an "action" record in an external
//! REST service. The ledger is best-effort by design: a ledger failure is
//! logged by the command path, never allowed to block delivery.

pub mod client;
pub mod models;

pub use client::ActionLedgerClient;
pub use models::{ActionCreate, ActionRecord, ActionState, ActionUpdate};
