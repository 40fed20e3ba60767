use std::fmt;
use std::sync::Arc;

use crate::session::handlers::{
    AnalyticsHandler, HandlerSlot, MessageHandler, NotificationTapCallback, PreferencesHandler,
    TokenHandler, TopicHandler,
};

/// Handlers a session dispatches to, fixed for the session's lifetime.
#[derive(Clone, Default)]
pub struct SessionHandlers {
    pub token: HandlerSlot<dyn TokenHandler>,
    pub message: HandlerSlot<dyn MessageHandler>,
    pub analytics: HandlerSlot<dyn AnalyticsHandler>,
    pub preferences: HandlerSlot<dyn PreferencesHandler>,
    pub topic: HandlerSlot<dyn TopicHandler>,
}

impl SessionHandlers {
    /// Names of the registered handler categories, for diagnostics.
    pub fn registered(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.token.is_registered() {
            names.push("token");
        }
        if self.message.is_registered() {
            names.push("message");
        }
        if self.analytics.is_registered() {
            names.push("analytics");
        }
        if self.preferences.is_registered() {
            names.push("preferences");
        }
        if self.topic.is_registered() {
            names.push("topic");
        }
        names
    }
}

impl fmt::Debug for SessionHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionHandlers")
            .field("token", &self.token)
            .field("message", &self.message)
            .field("analytics", &self.analytics)
            .field("preferences", &self.preferences)
            .field("topic", &self.topic)
            .finish()
    }
}

/// Construction-time configuration for a [`PushSession`](crate::session::PushSession).
///
/// ```
/// use std::sync::Arc;
/// use push_session::messaging::PushMessage;
/// use push_session::session::SessionConfig;
///
/// let config = SessionConfig::new().with_notification_tap(Arc::new(|message: &PushMessage| {
///     println!("tapped: {:?}", message.title());
/// }));
/// assert!(config.handlers.registered().is_empty());
/// ```
#[derive(Clone, Default)]
pub struct SessionConfig {
    pub handlers: SessionHandlers,
    pub on_notification_tap: Option<NotificationTapCallback>,
}

impl SessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token_handler<H>(mut self, handler: Arc<H>) -> Self
    where
        H: TokenHandler + 'static,
    {
        self.handlers.token = HandlerSlot::Registered(handler);
        self
    }

    pub fn with_message_handler<H>(mut self, handler: Arc<H>) -> Self
    where
        H: MessageHandler + 'static,
    {
        self.handlers.message = HandlerSlot::Registered(handler);
        self
    }

    pub fn with_analytics_handler<H>(mut self, handler: Arc<H>) -> Self
    where
        H: AnalyticsHandler + 'static,
    {
        self.handlers.analytics = HandlerSlot::Registered(handler);
        self
    }

    pub fn with_preferences_handler<H>(mut self, handler: Arc<H>) -> Self
    where
        H: PreferencesHandler + 'static,
    {
        self.handlers.preferences = HandlerSlot::Registered(handler);
        self
    }

    pub fn with_topic_handler<H>(mut self, handler: Arc<H>) -> Self
    where
        H: TopicHandler + 'static,
    {
        self.handlers.topic = HandlerSlot::Registered(handler);
        self
    }

    pub fn with_notification_tap(mut self, callback: NotificationTapCallback) -> Self {
        self.on_notification_tap = Some(callback);
        self
    }
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("handlers", &self.handlers)
            .field("on_notification_tap", &self.on_notification_tap.is_some())
            .finish()
    }
}
