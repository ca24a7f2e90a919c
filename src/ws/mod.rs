//! WebSocket layer: upgrade handling, the identification protocol, and
//! the per-connection frame pump.
//!
//! Devices connect at `/ws` and must identify with a `joinRoom` frame
//! before any addressed traffic reaches them.

pub mod connection;
pub mod handler;
pub mod messages;
