//! Push session manager: token lifecycle, topic operations and handler dispatch.

mod api;
mod config;
pub mod error;
mod handlers;
mod listeners;
mod topics;

pub use api::PushSession;
pub use config::{SessionConfig, SessionHandlers};
pub use error::{HandlerError, HandlerKind, HandlerResult, SessionError, SessionResult};
pub use handlers::{
    default_on_token_refreshed, AnalyticsHandler, EventData, HandlerSlot, MessageHandler,
    NotificationTapCallback, PreferencesHandler, TokenHandler, TopicHandler,
};
