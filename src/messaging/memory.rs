//! In-process [`PushTransport`] for native hosts, demos and tests.
//!
//! Keeps the registration id, remote topic subscriptions and pending cold-launch
//! message in memory, and fans every emitted event out to all live subscribers.
//! Failures can be injected per topic and for token/permission queries so the
//! degraded paths of the adapter and session can be exercised.

use std::collections::{BTreeSet, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_channel::Sender;
use async_trait::async_trait;
use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};

use crate::messaging::constants::GENERATED_TOKEN_LENGTH;
use crate::messaging::error::{
    permission_blocked, token_deletion_failed, token_unavailable, topic_subscribe_failed,
    topic_unsubscribe_failed, TransportResult,
};
use crate::messaging::transport::{EventStream, PushTransport};
use crate::messaging::types::{PermissionGrant, RemoteMessage};

#[derive(Clone)]
pub struct MemoryTransport {
    inner: Arc<MemoryTransportInner>,
}

#[derive(Default)]
struct MemoryTransportInner {
    token: Mutex<Option<String>>,
    generate_tokens: AtomicBool,
    fail_token_queries: AtomicBool,
    fail_permission_requests: AtomicBool,
    permission: Mutex<PermissionGrant>,
    initial_message: Mutex<Option<RemoteMessage>>,
    remote_topics: Mutex<BTreeSet<String>>,
    failing_topics: Mutex<HashSet<String>>,
    token_listeners: Subscribers<String>,
    foreground_listeners: Subscribers<RemoteMessage>,
    opened_listeners: Subscribers<RemoteMessage>,
}

struct Subscribers<T> {
    senders: Mutex<Vec<Sender<T>>>,
}

impl<T> Default for Subscribers<T> {
    fn default() -> Self {
        Self {
            senders: Mutex::new(Vec::new()),
        }
    }
}

impl<T: Clone + Send + 'static> Subscribers<T> {
    fn subscribe(&self) -> async_channel::Receiver<T> {
        let (sender, receiver) = async_channel::unbounded();
        self.senders.lock().unwrap().push(sender);
        receiver
    }

    fn emit(&self, value: T) {
        let mut senders = self.senders.lock().unwrap();
        senders.retain(|sender| sender.try_send(value.clone()).is_ok());
    }

    fn live_count(&self) -> usize {
        let mut senders = self.senders.lock().unwrap();
        senders.retain(|sender| !sender.is_closed());
        senders.len()
    }
}

impl std::fmt::Debug for MemoryTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryTransport")
            .field("token", &self.current_token())
            .field("remote_topics", &self.remote_topics())
            .finish()
    }
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

/// Random 32 character registration id, the shape the FCM backend hands out.
pub fn generate_token() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .map(char::from)
        .take(GENERATED_TOKEN_LENGTH)
        .collect()
}

impl MemoryTransport {
    /// Creates a transport that mints a registration id on first query and grants
    /// every permission.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MemoryTransportInner {
                generate_tokens: AtomicBool::new(true),
                permission: Mutex::new(PermissionGrant::all()),
                ..Default::default()
            }),
        }
    }

    pub fn with_token(self, token: impl Into<String>) -> Self {
        *self.inner.token.lock().unwrap() = Some(token.into());
        self
    }

    /// Disables lazy token minting; `get_token` then reports only explicitly set ids.
    pub fn without_token_generation(self) -> Self {
        self.inner.generate_tokens.store(false, Ordering::SeqCst);
        self
    }

    pub fn with_permission(self, grant: PermissionGrant) -> Self {
        *self.inner.permission.lock().unwrap() = grant;
        self
    }

    pub fn current_token(&self) -> Option<String> {
        self.inner.token.lock().unwrap().clone()
    }

    pub fn set_initial_message(&self, message: Option<RemoteMessage>) {
        *self.inner.initial_message.lock().unwrap() = message;
    }

    pub fn remote_topics(&self) -> BTreeSet<String> {
        self.inner.remote_topics.lock().unwrap().clone()
    }

    /// Makes every subscribe/unsubscribe call for `topic` fail.
    pub fn fail_topic(&self, topic: impl Into<String>) {
        self.inner.failing_topics.lock().unwrap().insert(topic.into());
    }

    pub fn restore_topic(&self, topic: &str) {
        self.inner.failing_topics.lock().unwrap().remove(topic);
    }

    pub fn fail_token_queries(&self, fail: bool) {
        self.inner.fail_token_queries.store(fail, Ordering::SeqCst);
    }

    pub fn fail_permission_requests(&self, fail: bool) {
        self.inner
            .fail_permission_requests
            .store(fail, Ordering::SeqCst);
    }

    /// Stores `token` and announces it on the token-change event source.
    pub fn emit_token_refresh(&self, token: impl Into<String>) {
        let token = token.into();
        *self.inner.token.lock().unwrap() = Some(token.clone());
        self.inner.token_listeners.emit(token);
    }

    pub fn emit_foreground_message(&self, message: RemoteMessage) {
        self.inner.foreground_listeners.emit(message);
    }

    pub fn emit_message_opened(&self, message: RemoteMessage) {
        self.inner.opened_listeners.emit(message);
    }

    pub fn token_listener_count(&self) -> usize {
        self.inner.token_listeners.live_count()
    }

    pub fn foreground_listener_count(&self) -> usize {
        self.inner.foreground_listeners.live_count()
    }

    pub fn opened_listener_count(&self) -> usize {
        self.inner.opened_listeners.live_count()
    }

    fn topic_fails(&self, topic: &str) -> bool {
        self.inner.failing_topics.lock().unwrap().contains(topic)
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl PushTransport for MemoryTransport {
    async fn get_token(&self) -> TransportResult<Option<String>> {
        if self.inner.fail_token_queries.load(Ordering::SeqCst) {
            return Err(token_unavailable("registration service unreachable"));
        }
        let mut token = self.inner.token.lock().unwrap();
        if token.is_none() && self.inner.generate_tokens.load(Ordering::SeqCst) {
            *token = Some(generate_token());
        }
        Ok(token.clone())
    }

    async fn request_permission(&self) -> TransportResult<PermissionGrant> {
        if self.inner.fail_permission_requests.load(Ordering::SeqCst) {
            return Err(permission_blocked("permission prompt unavailable"));
        }
        Ok(*self.inner.permission.lock().unwrap())
    }

    async fn delete_token(&self) -> TransportResult<()> {
        if self.inner.token.lock().unwrap().take().is_none() {
            return Err(token_deletion_failed("no registration token to delete"));
        }
        Ok(())
    }

    async fn subscribe_to_topic(&self, topic: &str) -> TransportResult<()> {
        if self.topic_fails(topic) {
            return Err(topic_subscribe_failed(format!(
                "backend rejected subscription to `{topic}`"
            )));
        }
        self.inner
            .remote_topics
            .lock()
            .unwrap()
            .insert(topic.to_owned());
        Ok(())
    }

    async fn unsubscribe_from_topic(&self, topic: &str) -> TransportResult<()> {
        if self.topic_fails(topic) {
            return Err(topic_unsubscribe_failed(format!(
                "backend rejected unsubscription from `{topic}`"
            )));
        }
        self.inner.remote_topics.lock().unwrap().remove(topic);
        Ok(())
    }

    async fn initial_message(&self) -> TransportResult<Option<RemoteMessage>> {
        Ok(self.inner.initial_message.lock().unwrap().take())
    }

    fn token_changes(&self) -> EventStream<String> {
        boxed(self.inner.token_listeners.subscribe())
    }

    fn foreground_messages(&self) -> EventStream<RemoteMessage> {
        boxed(self.inner.foreground_listeners.subscribe())
    }

    fn opened_messages(&self) -> EventStream<RemoteMessage> {
        boxed(self.inner.opened_listeners.subscribe())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn boxed<T: Send + 'static>(receiver: async_channel::Receiver<T>) -> EventStream<T> {
    use futures::StreamExt;
    receiver.boxed()
}

#[cfg(target_arch = "wasm32")]
fn boxed<T: 'static>(receiver: async_channel::Receiver<T>) -> EventStream<T> {
    use futures::StreamExt;
    receiver.boxed_local()
}
