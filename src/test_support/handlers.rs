use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::messaging::PushMessage;
use crate::session::{
    default_on_token_refreshed, AnalyticsHandler, EventData, HandlerError, HandlerResult,
    MessageHandler, PreferencesHandler, TokenHandler, TopicHandler,
};
use crate::topics::TopicResults;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TokenCall {
    Received(String),
    Refreshed(String, String),
    Deleted(String),
}

/// Token handler that records calls and routes refreshes through
/// [`default_on_token_refreshed`].
pub struct RecordingTokenHandler {
    calls: Mutex<Vec<TokenCall>>,
    accept_delete: AtomicBool,
    fail_receive: AtomicBool,
    fail_delete: AtomicBool,
}

impl Default for RecordingTokenHandler {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            accept_delete: AtomicBool::new(true),
            fail_receive: AtomicBool::new(false),
            fail_delete: AtomicBool::new(false),
        }
    }
}

impl RecordingTokenHandler {
    pub fn calls(&self) -> Vec<TokenCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn set_accept_delete(&self, accept: bool) {
        self.accept_delete.store(accept, Ordering::SeqCst);
    }

    pub fn set_fail_receive(&self, fail: bool) {
        self.fail_receive.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_delete(&self, fail: bool) {
        self.fail_delete.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl TokenHandler for RecordingTokenHandler {
    async fn on_token_received(&self, token: &str, _user_id: Option<&str>) -> HandlerResult<bool> {
        self.calls
            .lock()
            .unwrap()
            .push(TokenCall::Received(token.to_string()));
        if self.fail_receive.load(Ordering::SeqCst) {
            return Err(HandlerError::new("token backend unavailable"));
        }
        Ok(true)
    }

    async fn on_token_delete(&self, token: &str) -> HandlerResult<bool> {
        self.calls
            .lock()
            .unwrap()
            .push(TokenCall::Deleted(token.to_string()));
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(HandlerError::new("token backend unavailable"));
        }
        Ok(self.accept_delete.load(Ordering::SeqCst))
    }

    async fn on_token_refreshed(&self, old_token: &str, new_token: &str) -> HandlerResult<()> {
        self.calls.lock().unwrap().push(TokenCall::Refreshed(
            old_token.to_string(),
            new_token.to_string(),
        ));
        default_on_token_refreshed(self, old_token, new_token).await
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum MessageCall {
    Foreground(PushMessage),
    Tap(PushMessage),
    AppOpened(PushMessage),
}

#[derive(Default)]
pub struct RecordingMessageHandler {
    calls: Mutex<Vec<MessageCall>>,
    fail: AtomicBool,
    panic: AtomicBool,
}

impl RecordingMessageHandler {
    pub fn calls(&self) -> Vec<MessageCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn set_panic(&self, panic: bool) {
        self.panic.store(panic, Ordering::SeqCst);
    }

    fn record(&self, call: MessageCall) -> HandlerResult<()> {
        self.calls.lock().unwrap().push(call);
        if self.panic.load(Ordering::SeqCst) {
            panic!("message handler exploded");
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(HandlerError::new("message handler failed"));
        }
        Ok(())
    }
}

#[async_trait]
impl MessageHandler for RecordingMessageHandler {
    async fn on_foreground_message(&self, message: &PushMessage) -> HandlerResult<()> {
        self.record(MessageCall::Foreground(message.clone()))
    }

    async fn on_message_tap(&self, message: &PushMessage) -> HandlerResult<()> {
        self.record(MessageCall::Tap(message.clone()))
    }

    async fn on_app_opened_from_notification(&self, message: &PushMessage) -> HandlerResult<()> {
        self.record(MessageCall::AppOpened(message.clone()))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AnalyticsEvent {
    pub event_type: String,
    pub message_id: String,
    pub additional_data: Option<EventData>,
}

#[derive(Default)]
pub struct RecordingAnalyticsHandler {
    events: Mutex<Vec<AnalyticsEvent>>,
    fail: AtomicBool,
}

impl RecordingAnalyticsHandler {
    pub fn events(&self) -> Vec<AnalyticsEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl AnalyticsHandler for RecordingAnalyticsHandler {
    async fn on_notification_event(
        &self,
        event_type: &str,
        message_id: &str,
        additional_data: Option<&EventData>,
    ) -> HandlerResult<()> {
        self.events.lock().unwrap().push(AnalyticsEvent {
            event_type: event_type.to_string(),
            message_id: message_id.to_string(),
            additional_data: additional_data.cloned(),
        });
        if self.fail.load(Ordering::SeqCst) {
            return Err(HandlerError::new("analytics sink rejected event"));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PreferencesCall {
    pub enabled: bool,
    pub categories: Option<Vec<String>>,
    pub channel_settings: Option<EventData>,
}

pub struct RecordingPreferencesHandler {
    calls: Mutex<Vec<PreferencesCall>>,
    result: AtomicBool,
}

impl Default for RecordingPreferencesHandler {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            result: AtomicBool::new(true),
        }
    }
}

impl RecordingPreferencesHandler {
    pub fn calls(&self) -> Vec<PreferencesCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn set_result(&self, result: bool) {
        self.result.store(result, Ordering::SeqCst);
    }
}

#[async_trait]
impl PreferencesHandler for RecordingPreferencesHandler {
    async fn on_update_preferences(
        &self,
        enabled: bool,
        categories: Option<&[String]>,
        channel_settings: Option<&EventData>,
    ) -> HandlerResult<bool> {
        self.calls.lock().unwrap().push(PreferencesCall {
            enabled,
            categories: categories.map(<[String]>::to_vec),
            channel_settings: channel_settings.cloned(),
        });
        Ok(self.result.load(Ordering::SeqCst))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TopicCall {
    Subscribed(String, bool),
    Unsubscribed(String, bool),
    Bulk(Vec<(String, bool)>, bool),
}

#[derive(Default)]
pub struct RecordingTopicHandler {
    calls: Mutex<Vec<TopicCall>>,
}

impl RecordingTopicHandler {
    pub fn calls(&self) -> Vec<TopicCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TopicHandler for RecordingTopicHandler {
    async fn on_topic_subscribed(&self, topic: &str, success: bool) -> HandlerResult<()> {
        self.calls
            .lock()
            .unwrap()
            .push(TopicCall::Subscribed(topic.to_string(), success));
        Ok(())
    }

    async fn on_topic_unsubscribed(&self, topic: &str, success: bool) -> HandlerResult<()> {
        self.calls
            .lock()
            .unwrap()
            .push(TopicCall::Unsubscribed(topic.to_string(), success));
        Ok(())
    }

    async fn on_bulk_topic_operation(
        &self,
        results: &TopicResults,
        is_subscription: bool,
    ) -> HandlerResult<()> {
        let results = results
            .iter()
            .map(|(topic, success)| (topic.clone(), *success))
            .collect();
        self.calls
            .lock()
            .unwrap()
            .push(TopicCall::Bulk(results, is_subscription));
        Ok(())
    }
}
