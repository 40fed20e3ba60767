use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};

use futures::FutureExt;
use serde_json::Value;

use crate::messaging::constants::{
    EVENT_APP_OPENED, EVENT_RECEIVED, EVENT_TAPPED, UNKNOWN_MESSAGE_ID,
};
use crate::messaging::{
    normalize_topic_name, EventFuture, EventStream, NotificationPermissionSettings, PushMessage,
    PushTransport, TapDispatch, TransportAdapter,
};
use crate::session::config::{SessionConfig, SessionHandlers};
use crate::session::error::{handler_failed, HandlerKind, HandlerResult, SessionResult};
use crate::session::handlers::{EventData, NotificationTapCallback};
use crate::session::listeners::{spawn_listener, ListenerSet};
use crate::topics::{TopicResults, TopicSubscriptionCache};

/// Push notification session: owns the registration token lifecycle, the local
/// topic record and the fan-out from transport events to application handlers.
///
/// Cheap to clone; clones share the same session.
///
/// ```
/// # futures::executor::block_on(async {
/// use std::sync::Arc;
/// use push_session::messaging::MemoryTransport;
/// use push_session::session::{PushSession, SessionConfig};
///
/// let transport = MemoryTransport::new().with_token("device-token");
/// let session = PushSession::new(Arc::new(transport), SessionConfig::new());
/// assert!(!session.is_initialized());
/// assert_eq!(session.get_token().await.as_deref(), Some("device-token"));
/// assert!(session.get_all_subscribed_topics().is_empty());
/// # });
/// ```
#[derive(Clone)]
pub struct PushSession {
    pub(crate) inner: Arc<SessionInner>,
}

pub(crate) struct SessionInner {
    adapter: TransportAdapter,
    handlers: SessionHandlers,
    tap_callback: Mutex<Option<NotificationTapCallback>>,
    current_token: Mutex<Option<String>>,
    pub(crate) topics: TopicSubscriptionCache,
    initialized: AtomicBool,
    listeners: Mutex<Option<ListenerSet>>,
    lifecycle: async_lock::Mutex<()>,
    topic_ops: async_lock::Mutex<()>,
}

impl std::fmt::Debug for PushSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PushSession")
            .field("initialized", &self.is_initialized())
            .field("has_token", &self.has_valid_token())
            .field("handlers", &self.inner.handlers)
            .field("topics", &self.inner.topics.len())
            .finish()
    }
}

impl PushSession {
    pub fn new(transport: Arc<dyn PushTransport>, config: SessionConfig) -> Self {
        let inner = SessionInner {
            adapter: TransportAdapter::new(transport),
            handlers: config.handlers,
            tap_callback: Mutex::new(config.on_notification_tap),
            current_token: Mutex::new(None),
            topics: TopicSubscriptionCache::new(),
            initialized: AtomicBool::new(false),
            listeners: Mutex::new(None),
            lifecycle: async_lock::Mutex::new(()),
            topic_ops: async_lock::Mutex::new(()),
        };
        Self {
            inner: Arc::new(inner),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.inner.initialized.load(Ordering::SeqCst)
    }

    pub fn handlers(&self) -> &SessionHandlers {
        &self.inner.handlers
    }

    /// Wires the transport event sources to the configured handlers.
    ///
    /// Runs once: calls made while the session is already initialized only log.
    /// Before returning, a pending cold-launch message is dispatched and the
    /// current registration token (if any) goes through the same classification
    /// as live token updates. Handler failures during those two steps are logged,
    /// never returned.
    ///
    /// The session's lifecycle lock is held for the whole call, including those
    /// two handler dispatches. A cold-launch or token handler must not call
    /// `initialize` or [`dispose`](Self::dispose) on the same session from inside
    /// that callback: the nested call waits on the lock forever.
    pub async fn initialize(&self) {
        let _lifecycle = self.inner.lifecycle.lock().await;
        if self.is_initialized() {
            log::debug!("push session already initialized; ignoring initialize()");
            return;
        }

        let registered = self.inner.handlers.registered();
        log::debug!("registering push handlers: {registered:?}");

        let adapter = &self.inner.adapter;
        let opened = adapter.start_listening();

        let weak = Arc::downgrade(&self.inner);
        let token_refresh = spawn_listener(adapter.token_refresh_events(), move |token| {
            let inner = weak.upgrade()?;
            Some(async move { inner.on_token_event(token).await })
        });

        let weak = Arc::downgrade(&self.inner);
        let foreground = spawn_listener(adapter.foreground_messages(), move |message| {
            let inner = weak.upgrade()?;
            Some(async move { inner.handle_foreground_message(message).await })
        });

        adapter.set_tap_dispatch(Some(tap_dispatch(Arc::downgrade(&self.inner))));

        *self.inner.listeners.lock().unwrap() = Some(ListenerSet {
            token_refresh: Some(token_refresh),
            foreground: Some(foreground),
            opened,
        });

        if let Some(message) = adapter.get_initial_message().await {
            log::debug!("app was launched from a notification");
            self.inner.handle_app_opened(message).await;
        }

        if let Some(token) = adapter.get_token().await {
            let bootstrap = self.inner.handle_token_refresh(token);
            contain("token bootstrap", bootstrap).await;
        }

        self.inner.initialized.store(true, Ordering::SeqCst);
        log::info!("push session initialized");
    }

    /// Releases the three transport subscriptions and returns to the
    /// uninitialized state.
    pub async fn dispose(&self) {
        let _lifecycle = self.inner.lifecycle.lock().await;
        let listeners = self.inner.listeners.lock().unwrap().take();
        if let Some(listeners) = listeners {
            let released = listeners.abort_all();
            self.inner.adapter.listener_released();
            log::debug!("released {released} push listeners");
        }
        self.inner.adapter.set_tap_dispatch(None);
        self.inner.initialized.store(false, Ordering::SeqCst);
        log::info!("push session disposed");
    }

    /// Queries the transport. `None` covers both "no token yet" and a failed query.
    pub async fn get_token(&self) -> Option<String> {
        self.inner.adapter.get_token().await
    }

    /// Last token observed by the session, without touching the transport.
    pub fn get_cached_token(&self) -> Option<String> {
        self.inner.current_token.lock().unwrap().clone()
    }

    pub fn has_valid_token(&self) -> bool {
        self.inner
            .current_token
            .lock()
            .unwrap()
            .as_deref()
            .is_some_and(|token| !token.is_empty())
    }

    /// Raw token-change events from the transport.
    pub fn on_token_refresh(&self) -> EventStream<String> {
        self.inner.adapter.token_refresh_events()
    }

    /// Foreground messages from the transport, normalized.
    pub fn on_message(&self) -> EventStream<PushMessage> {
        self.inner.adapter.foreground_messages()
    }

    pub fn set_on_notification_tap(&self, callback: Option<NotificationTapCallback>) {
        *self.inner.tap_callback.lock().unwrap() = callback;
    }

    pub async fn request_permission(&self) -> NotificationPermissionSettings {
        self.inner.adapter.request_permission().await
    }

    /// Hands the current token to the token handler for deletion.
    ///
    /// Needs a token from the transport and a registered token handler. The topic
    /// record and cached token are cleared only when the handler reports success;
    /// deleting the transport registration itself is left to the handler.
    pub async fn logout(&self) -> bool {
        let Some(handler) = self.inner.handlers.token.get() else {
            log::warn!("logout requested without a token handler");
            return false;
        };
        let Some(token) = self.inner.adapter.get_token().await else {
            log::warn!("logout requested without a registration token");
            return false;
        };

        match handler.on_token_delete(&token).await {
            Ok(true) => {
                self.inner.topics.clear();
                self.inner.current_token.lock().unwrap().take();
                log::info!("push session logged out");
                true
            }
            Ok(false) => {
                log::warn!("token handler declined token deletion");
                false
            }
            Err(err) => {
                log::warn!("token handler failed during logout: {err}");
                false
            }
        }
    }

    /// Returns `false` when no preferences handler is registered.
    pub async fn update_notification_preferences(
        &self,
        enabled: bool,
        categories: Option<&[String]>,
        channel_settings: Option<&EventData>,
    ) -> SessionResult<bool> {
        let Some(handler) = self.inner.handlers.preferences.get() else {
            log::debug!("no preferences handler registered; preferences not updated");
            return Ok(false);
        };
        handler
            .on_update_preferences(enabled, categories, channel_settings)
            .await
            .map_err(|err| handler_failed(HandlerKind::Preferences, err))
    }

    pub async fn send_analytics_event(
        &self,
        event_type: &str,
        message_id: &str,
        additional_data: Option<&EventData>,
    ) -> SessionResult<()> {
        let Some(handler) = self.inner.handlers.analytics.get() else {
            log::debug!("no analytics handler registered; dropping `{event_type}` event");
            return Ok(());
        };
        handler
            .on_notification_event(event_type, message_id, additional_data)
            .await
            .map_err(|err| handler_failed(HandlerKind::Analytics, err))
    }

    /// Re-reads the token from the transport and dispatches it to the token handler.
    ///
    /// Returns `Ok(None)` before [`initialize`](Self::initialize) or when the
    /// transport has no token. Token handler failures are returned.
    pub async fn refresh_token(&self) -> SessionResult<Option<String>> {
        if !self.is_initialized() {
            log::warn!("refresh_token called before initialize()");
            return Ok(None);
        }
        self.dispatch_current_token().await
    }

    /// Deletes the transport registration, then fetches and dispatches a new token.
    pub async fn force_refresh_token(&self) -> SessionResult<Option<String>> {
        if !self.is_initialized() {
            log::warn!("force_refresh_token called before initialize()");
            return Ok(None);
        }
        self.inner.adapter.delete_token().await;
        self.dispatch_current_token().await
    }

    /// Runs `token` through the refresh classification as if the transport had
    /// delivered it. Token handler failures are returned.
    pub async fn test_token_refresh(&self, token: &str) -> SessionResult<()> {
        self.inner.handle_token_refresh(token.to_owned()).await
    }

    async fn dispatch_current_token(&self) -> SessionResult<Option<String>> {
        let Some(token) = self.inner.adapter.get_token().await else {
            log::debug!("transport reported no registration token");
            return Ok(None);
        };
        self.inner.handle_token_refresh(token.clone()).await?;
        Ok(Some(token))
    }

    pub async fn subscribe_to_topic(&self, topic: &str) -> bool {
        if !self.is_initialized() {
            log::warn!("subscribe_to_topic(`{topic}`) called before initialize()");
            return false;
        }
        let topic = normalize_topic_name(topic);
        let success = {
            let _serial = self.inner.topic_ops.lock().await;
            let success = self.inner.adapter.subscribe_to_topic(topic).await;
            if success {
                self.inner.topics.insert(topic);
            }
            success
        };

        if let Some(handler) = self.inner.handlers.topic.get() {
            if let Err(err) = handler.on_topic_subscribed(topic, success).await {
                log::warn!("topic handler failed for subscription to `{topic}`: {err}");
            }
        }
        success
    }

    pub async fn unsubscribe_from_topic(&self, topic: &str) -> bool {
        if !self.is_initialized() {
            log::warn!("unsubscribe_from_topic(`{topic}`) called before initialize()");
            return false;
        }
        let topic = normalize_topic_name(topic);
        let success = {
            let _serial = self.inner.topic_ops.lock().await;
            let success = self.inner.adapter.unsubscribe_from_topic(topic).await;
            if success {
                self.inner.topics.remove(topic);
            }
            success
        };

        if let Some(handler) = self.inner.handlers.topic.get() {
            if let Err(err) = handler.on_topic_unsubscribed(topic, success).await {
                log::warn!("topic handler failed for unsubscription from `{topic}`: {err}");
            }
        }
        success
    }

    pub(crate) async fn notify_bulk_operation(&self, results: &TopicResults, is_subscription: bool) {
        if let Some(handler) = self.inner.handlers.topic.get() {
            if let Err(err) = handler
                .on_bulk_topic_operation(results, is_subscription)
                .await
            {
                log::warn!("topic handler failed for bulk operation: {err}");
            }
        }
    }
}

impl SessionInner {
    /// Classifies `token` against the previously seen one and dispatches it.
    ///
    /// The cached token is replaced before any handler runs. A token that differs
    /// from a known previous one is a refresh; a first token and a re-delivery of
    /// the current one are both plain receipts.
    async fn handle_token_refresh(&self, token: String) -> SessionResult<()> {
        let previous = self.current_token.lock().unwrap().replace(token.clone());

        let Some(handler) = self.handlers.token.get() else {
            log::debug!("no token handler registered; token cached only");
            return Ok(());
        };

        match previous {
            Some(old) if old != token => {
                log::debug!("registration token refreshed");
                handler
                    .on_token_refreshed(&old, &token)
                    .await
                    .map_err(|err| handler_failed(HandlerKind::Token, err))
            }
            _ => {
                log::debug!("registration token received");
                let accepted = handler
                    .on_token_received(&token, None)
                    .await
                    .map_err(|err| handler_failed(HandlerKind::Token, err))?;
                if !accepted {
                    log::debug!("token handler did not accept the registration token");
                }
                Ok(())
            }
        }
    }

    async fn on_token_event(&self, token: String) {
        contain("token refresh", self.handle_token_refresh(token)).await;
    }

    async fn handle_foreground_message(&self, message: PushMessage) {
        if let Some(handler) = self.handlers.message.get() {
            contain_handler(
                "foreground message",
                handler.on_foreground_message(&message),
            )
            .await;
        }

        let mut extra = EventData::new();
        extra.insert("foreground".into(), Value::Bool(true));
        extra.insert("title".into(), title_value(&message));
        self.emit_message_event(EVENT_RECEIVED, &message, extra).await;
    }

    async fn handle_message_tap(&self, message: PushMessage) {
        let callback = self.tap_callback.lock().unwrap().clone();
        if let Some(callback) = callback {
            if std::panic::catch_unwind(AssertUnwindSafe(|| callback(&message))).is_err() {
                log::warn!("notification tap callback panicked");
            }
        }

        if let Some(handler) = self.handlers.message.get() {
            contain_handler("message tap", handler.on_message_tap(&message)).await;
        }

        let mut extra = EventData::new();
        extra.insert("title".into(), title_value(&message));
        self.emit_message_event(EVENT_TAPPED, &message, extra).await;
    }

    async fn handle_app_opened(&self, message: PushMessage) {
        if let Some(handler) = self.handlers.message.get() {
            contain_handler(
                "cold launch",
                handler.on_app_opened_from_notification(&message),
            )
            .await;
        }

        let mut extra = EventData::new();
        extra.insert("title".into(), title_value(&message));
        self.emit_message_event(EVENT_APP_OPENED, &message, extra).await;
    }

    async fn emit_message_event(&self, event_type: &str, message: &PushMessage, extra: EventData) {
        let Some(handler) = self.handlers.analytics.get() else {
            return;
        };
        let message_id = message.message_id();
        let message_id = message_id.as_deref().unwrap_or(UNKNOWN_MESSAGE_ID);
        contain_handler(
            "analytics",
            handler.on_notification_event(event_type, message_id, Some(&extra)),
        )
        .await;
    }
}

fn title_value(message: &PushMessage) -> Value {
    message
        .title()
        .map(|title| Value::String(title.to_owned()))
        .unwrap_or(Value::Null)
}

fn tap_dispatch(session: Weak<SessionInner>) -> TapDispatch {
    Arc::new(move |message: PushMessage| -> EventFuture {
        let session = session.clone();
        Box::pin(async move {
            if let Some(inner) = session.upgrade() {
                inner.handle_message_tap(message).await;
            }
        })
    })
}

/// Awaits a passive dispatch, logging failures and panics instead of propagating.
async fn contain<F>(label: &str, task: F)
where
    F: Future<Output = SessionResult<()>>,
{
    match AssertUnwindSafe(task).catch_unwind().await {
        Ok(Ok(())) => {}
        Ok(Err(err)) => log::warn!("{label} dispatch failed: {err}"),
        Err(_) => log::warn!("{label} dispatch panicked"),
    }
}

async fn contain_handler<F>(label: &str, task: F)
where
    F: Future<Output = HandlerResult<()>>,
{
    match AssertUnwindSafe(task).catch_unwind().await {
        Ok(Ok(())) => {}
        Ok(Err(err)) => log::warn!("{label} handler failed: {err}"),
        Err(_) => log::warn!("{label} handler panicked"),
    }
}
