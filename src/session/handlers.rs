//! Capability contracts implemented by the application.
//!
//! A session dispatches to at most one implementation per contract. Every slot is
//! optional: absent non-returning callbacks are skipped, while value-returning
//! calls treat a missing handler as "not supported" and report `false`.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::messaging::PushMessage;
use crate::session::error::HandlerResult;
use crate::topics::TopicResults;

/// Free-form key/value data attached to analytics events and channel settings.
pub type EventData = Map<String, Value>;

/// Simple callback fired when the user taps a notification.
pub type NotificationTapCallback = Arc<dyn Fn(&PushMessage) + Send + Sync + 'static>;

/// Registration token lifecycle.
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait TokenHandler: Send + Sync {
    /// Called for a first-seen token and for re-deliveries of the current one.
    async fn on_token_received(&self, token: &str, user_id: Option<&str>) -> HandlerResult<bool>;

    /// Called on logout. Returning `false` aborts the logout.
    async fn on_token_delete(&self, token: &str) -> HandlerResult<bool>;

    /// Called when the platform replaced `old_token` with `new_token`.
    ///
    /// Defaults to [`default_on_token_refreshed`].
    async fn on_token_refreshed(&self, old_token: &str, new_token: &str) -> HandlerResult<()> {
        default_on_token_refreshed(self, old_token, new_token).await
    }
}

/// Treats a refresh as a plain receipt of `new_token`.
pub async fn default_on_token_refreshed<H>(
    handler: &H,
    _old_token: &str,
    new_token: &str,
) -> HandlerResult<()>
where
    H: TokenHandler + ?Sized,
{
    handler.on_token_received(new_token, None).await.map(|_| ())
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait MessageHandler: Send + Sync {
    async fn on_foreground_message(&self, message: &PushMessage) -> HandlerResult<()>;

    async fn on_message_tap(&self, message: &PushMessage) -> HandlerResult<()>;

    /// The process was cold-launched by tapping `message`.
    async fn on_app_opened_from_notification(&self, message: &PushMessage) -> HandlerResult<()>;
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait AnalyticsHandler: Send + Sync {
    async fn on_notification_event(
        &self,
        event_type: &str,
        message_id: &str,
        additional_data: Option<&EventData>,
    ) -> HandlerResult<()>;
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait PreferencesHandler: Send + Sync {
    async fn on_update_preferences(
        &self,
        enabled: bool,
        categories: Option<&[String]>,
        channel_settings: Option<&EventData>,
    ) -> HandlerResult<bool>;
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait TopicHandler: Send + Sync {
    async fn on_topic_subscribed(&self, topic: &str, success: bool) -> HandlerResult<()>;

    async fn on_topic_unsubscribed(&self, topic: &str, success: bool) -> HandlerResult<()>;

    async fn on_bulk_topic_operation(
        &self,
        results: &TopicResults,
        is_subscription: bool,
    ) -> HandlerResult<()>;
}

/// Handler registration for one contract.
pub enum HandlerSlot<H: ?Sized> {
    NoHandler,
    Registered(Arc<H>),
}

impl<H: ?Sized> HandlerSlot<H> {
    pub const fn empty() -> Self {
        HandlerSlot::NoHandler
    }

    pub fn get(&self) -> Option<&Arc<H>> {
        match self {
            HandlerSlot::NoHandler => None,
            HandlerSlot::Registered(handler) => Some(handler),
        }
    }

    pub fn is_registered(&self) -> bool {
        matches!(self, HandlerSlot::Registered(_))
    }
}

impl<H: ?Sized> Default for HandlerSlot<H> {
    fn default() -> Self {
        HandlerSlot::NoHandler
    }
}

impl<H: ?Sized> Clone for HandlerSlot<H> {
    fn clone(&self) -> Self {
        match self {
            HandlerSlot::NoHandler => HandlerSlot::NoHandler,
            HandlerSlot::Registered(handler) => HandlerSlot::Registered(handler.clone()),
        }
    }
}

impl<H: ?Sized> From<Option<Arc<H>>> for HandlerSlot<H> {
    fn from(handler: Option<Arc<H>>) -> Self {
        match handler {
            Some(handler) => HandlerSlot::Registered(handler),
            None => HandlerSlot::NoHandler,
        }
    }
}

impl<H: ?Sized> std::fmt::Debug for HandlerSlot<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HandlerSlot::NoHandler => f.write_str("NoHandler"),
            HandlerSlot::Registered(_) => f.write_str("Registered"),
        }
    }
}
