//! Domain layer: device identity, channels, the connection registry,
//! command types, and the dispatcher.
//!
//! The registry is the single shared mutable resource of the gateway;
//! everything else here is plain data or a thin coordinator over it.

pub mod channel;
pub mod command;
pub mod device_id;
pub mod dispatcher;
pub mod registry;

pub use channel::{ChannelClosed, ChannelHandle, ChannelId};
pub use command::{CommandKind, CommandMessage, CommandPayload};
pub use device_id::DeviceId;
pub use dispatcher::{DeliveryResult, Dispatcher};
pub use registry::ConnectionRegistry;
