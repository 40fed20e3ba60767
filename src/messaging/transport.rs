//! Typed facade over the platform push transport.
//!
//! [`PushTransport`] is what a host environment provides (the platform push SDK).
//! [`TransportAdapter`] wraps it with the contract the session layer relies on:
//! raw messages are normalized into [`PushMessage`] and every transport failure is
//! logged and degraded to `None` / `false`, so nothing past the adapter ever sees a
//! [`TransportError`](crate::messaging::error::TransportError).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::future::AbortHandle;
use futures::StreamExt;

use crate::messaging::constants::TOPICS_PREFIX;
use crate::messaging::error::{invalid_argument, TransportResult};
use crate::messaging::types::{
    NotificationPermissionSettings, PermissionGrant, PushMessage, RemoteMessage,
};
use crate::platform::runtime::spawn_abortable;

#[cfg(not(target_arch = "wasm32"))]
pub type EventStream<T> = futures::stream::BoxStream<'static, T>;
#[cfg(target_arch = "wasm32")]
pub type EventStream<T> = futures::stream::LocalBoxStream<'static, T>;

#[cfg(not(target_arch = "wasm32"))]
pub type EventFuture = futures::future::BoxFuture<'static, ()>;
#[cfg(target_arch = "wasm32")]
pub type EventFuture = futures::future::LocalBoxFuture<'static, ()>;

/// Callback invoked for every message the user opened from a notification.
pub type TapDispatch = Arc<dyn Fn(PushMessage) -> EventFuture + Send + Sync + 'static>;

/// Platform push SDK as seen by this crate.
///
/// Implementations report failures through [`TransportResult`]; event sources must
/// support any number of concurrent subscribers, each receiving every event emitted
/// after it subscribed.
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait PushTransport: Send + Sync {
    async fn get_token(&self) -> TransportResult<Option<String>>;

    /// Shows the platform permission prompt, or auto-grants where none exists.
    async fn request_permission(&self) -> TransportResult<PermissionGrant>;

    async fn delete_token(&self) -> TransportResult<()>;

    async fn subscribe_to_topic(&self, topic: &str) -> TransportResult<()>;

    async fn unsubscribe_from_topic(&self, topic: &str) -> TransportResult<()>;

    /// Message whose notification tap cold-launched the process, if any.
    async fn initial_message(&self) -> TransportResult<Option<RemoteMessage>>;

    fn token_changes(&self) -> EventStream<String>;

    fn foreground_messages(&self) -> EventStream<RemoteMessage>;

    /// Notifications tapped while the app was backgrounded or running.
    fn opened_messages(&self) -> EventStream<RemoteMessage>;
}

/// Strips the optional `/topics/` prefix used by the FCM wire format.
pub fn normalize_topic_name(topic: &str) -> &str {
    topic.strip_prefix(TOPICS_PREFIX).unwrap_or(topic)
}

/// Topic names must be non-empty and use only `[a-zA-Z0-9-_.~%]`.
pub fn validate_topic_name(topic: &str) -> TransportResult<()> {
    let name = normalize_topic_name(topic);
    if name.is_empty() {
        return Err(invalid_argument("Topic name must not be empty"));
    }
    let valid = name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '~' | '%'));
    if valid {
        Ok(())
    } else {
        Err(invalid_argument(format!(
            "Topic name `{name}` contains characters outside [a-zA-Z0-9-_.~%]"
        )))
    }
}

#[derive(Clone)]
pub struct TransportAdapter {
    inner: Arc<AdapterInner>,
}

struct AdapterInner {
    transport: Arc<dyn PushTransport>,
    tap_dispatch: Mutex<Option<TapDispatch>>,
    listening: AtomicBool,
}

impl std::fmt::Debug for TransportAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportAdapter")
            .field("listening", &self.inner.listening.load(Ordering::SeqCst))
            .finish()
    }
}

impl TransportAdapter {
    pub fn new(transport: Arc<dyn PushTransport>) -> Self {
        Self {
            inner: Arc::new(AdapterInner {
                transport,
                tap_dispatch: Mutex::new(None),
                listening: AtomicBool::new(false),
            }),
        }
    }

    pub fn transport(&self) -> &Arc<dyn PushTransport> {
        &self.inner.transport
    }

    /// Current registration id, or `None` when there is none or the query failed.
    pub async fn get_token(&self) -> Option<String> {
        match self.inner.transport.get_token().await {
            Ok(token) => token,
            Err(err) => {
                log::warn!("failed to read registration token: {err}");
                None
            }
        }
    }

    pub async fn request_permission(&self) -> NotificationPermissionSettings {
        match self.inner.transport.request_permission().await {
            Ok(grant) => NotificationPermissionSettings::from(grant),
            Err(err) => {
                log::warn!("notification permission request failed: {err}");
                NotificationPermissionSettings::default()
            }
        }
    }

    pub async fn delete_token(&self) {
        if let Err(err) = self.inner.transport.delete_token().await {
            log::warn!("failed to delete registration token: {err}");
        }
    }

    pub async fn subscribe_to_topic(&self, topic: &str) -> bool {
        if let Err(err) = validate_topic_name(topic) {
            log::warn!("refusing to subscribe: {err}");
            return false;
        }
        let name = normalize_topic_name(topic);
        match self.inner.transport.subscribe_to_topic(name).await {
            Ok(()) => true,
            Err(err) => {
                log::warn!("failed to subscribe to topic `{name}`: {err}");
                false
            }
        }
    }

    pub async fn unsubscribe_from_topic(&self, topic: &str) -> bool {
        if let Err(err) = validate_topic_name(topic) {
            log::warn!("refusing to unsubscribe: {err}");
            return false;
        }
        let name = normalize_topic_name(topic);
        match self.inner.transport.unsubscribe_from_topic(name).await {
            Ok(()) => true,
            Err(err) => {
                log::warn!("failed to unsubscribe from topic `{name}`: {err}");
                false
            }
        }
    }

    pub async fn get_initial_message(&self) -> Option<PushMessage> {
        match self.inner.transport.initial_message().await {
            Ok(message) => message.as_ref().map(PushMessage::from),
            Err(err) => {
                log::warn!("failed to read initial message: {err}");
                None
            }
        }
    }

    pub fn token_refresh_events(&self) -> EventStream<String> {
        self.inner.transport.token_changes()
    }

    pub fn foreground_messages(&self) -> EventStream<PushMessage> {
        self.inner
            .transport
            .foreground_messages()
            .map(|raw| PushMessage::from(&raw))
            .boxed_event_stream()
    }

    /// Installs (or clears) the callback that receives opened notifications.
    pub fn set_tap_dispatch(&self, dispatch: Option<TapDispatch>) {
        *self.inner.tap_dispatch.lock().unwrap() = dispatch;
    }

    pub fn is_listening(&self) -> bool {
        self.inner.listening.load(Ordering::SeqCst)
    }

    /// Starts forwarding opened notifications to the installed tap callback.
    ///
    /// Returns the listener's abort handle, or `None` when a listener is already
    /// running. The caller owns the handle and must call
    /// [`listener_released`](Self::listener_released) after aborting it.
    pub fn start_listening(&self) -> Option<AbortHandle> {
        if self
            .inner
            .listening
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            log::debug!("transport adapter already listening for opened notifications");
            return None;
        }

        let mut opened = self.inner.transport.opened_messages();
        let weak = Arc::downgrade(&self.inner);
        let handle = spawn_abortable(async move {
            while let Some(raw) = opened.next().await {
                let dispatch = match weak.upgrade() {
                    Some(inner) => inner.tap_dispatch.lock().unwrap().clone(),
                    None => break,
                };
                match dispatch {
                    Some(dispatch) => dispatch(PushMessage::from(&raw)).await,
                    None => log::debug!("opened notification dropped: no tap callback installed"),
                }
            }
        });
        Some(handle)
    }

    pub fn listener_released(&self) {
        self.inner.listening.store(false, Ordering::SeqCst);
    }
}

trait BoxedEventStream<T> {
    fn boxed_event_stream(self) -> EventStream<T>;
}

#[cfg(not(target_arch = "wasm32"))]
impl<S, T> BoxedEventStream<T> for S
where
    S: futures::Stream<Item = T> + Send + 'static,
{
    fn boxed_event_stream(self) -> EventStream<T> {
        self.boxed()
    }
}

#[cfg(target_arch = "wasm32")]
impl<S, T> BoxedEventStream<T> for S
where
    S: futures::Stream<Item = T> + 'static,
{
    fn boxed_event_stream(self) -> EventStream<T> {
        self.boxed_local()
    }
}
