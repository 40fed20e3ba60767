//! Push messages, permission settings and the transport boundary.

pub mod constants;
pub mod error;
mod memory;
mod transport;
mod types;

pub use memory::{generate_token, MemoryTransport};
pub use transport::{
    normalize_topic_name, validate_topic_name, EventFuture, EventStream, PushTransport,
    TapDispatch, TransportAdapter,
};
pub use types::{
    MessageData, NotificationPermissionSettings, PermissionGrant, PushMessage, RemoteMessage,
    RemoteNotification,
};
