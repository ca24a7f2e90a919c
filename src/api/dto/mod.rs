//! Data Transfer Objects for REST request/response serialization.

pub mod command_dto;
pub mod messaging_dto;

pub use command_dto::{CommandDispatchResponse, CommandRequest};
pub use messaging_dto::{BroadcastRequest, BroadcastResponse, ConnectionsResponse};
