//! Service layer: command orchestration.
//!
//! [`CommandService`] combines the dispatcher and the action-ledger
//! client into the single request/response contract exposed by the
//! command API.

pub mod command_service;

pub use command_service::{CommandService, DispatchOutcome, DispatchReport};
