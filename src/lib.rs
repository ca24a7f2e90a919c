//! # fleet-gateway
//!
//! REST API and WebSocket gateway for pushing imperative commands
//! (block, unblock, locate, refresh, notify, unenroll, exception, and
//! the SIM variants) to remotely managed devices.
//!
//! Devices keep a persistent WebSocket open and identify themselves with
//! a `joinRoom` handshake; operators dispatch commands over REST. Every
//! dispatch attempt is audited as an action record in an external ledger
//! service, moving PENDING → APPLIED when the device was reached.
//!
//! ## Architecture
//!
//! ```text
//! Operators (HTTP)            Devices (WebSocket)
//!     │                           │
//!     ├── REST Handlers (api/)    ├── WS Handler (ws/)
//!     │                           │
//!     ├── CommandService (service/)
//!     │
//!     ├── Dispatcher (domain/)
//!     ├── ConnectionRegistry (domain/)
//!     │
//!     └── Action Ledger REST client (ledger/)
//! ```
//!
//! Known limitation, preserved from the system this replaces: actions
//! left PENDING for an offline device are never re-dispatched when the
//! device reconnects; operators must re-issue the command. The registry
//! is per-process, so running several gateway instances fragments device
//! reachability across them.

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod ledger;
pub mod service;
pub mod ws;
