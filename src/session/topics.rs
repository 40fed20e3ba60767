//! Bulk topic operations and status reads layered on [`PushSession`].
//!
//! Bulk calls run the single-topic operation for each name in turn, so each
//! topic still produces its own handler callback, followed by one bulk callback.
//! Result maps are keyed by normalized topic name (`/topics/` stripped), the
//! same form the per-topic callbacks receive.
//! Reads answer from the local topic record and are safe before initialization.

use std::collections::BTreeSet;

use chrono::Utc;
use serde_json::Value;

use crate::messaging::normalize_topic_name;
use crate::session::api::PushSession;
use crate::topics::{TopicReport, TopicResults};

impl PushSession {
    pub async fn subscribe_to_multiple_topics<S>(&self, topics: &[S]) -> TopicResults
    where
        S: AsRef<str>,
    {
        if !self.is_initialized() {
            log::warn!("subscribe_to_multiple_topics called before initialize()");
            return all_failed(topics);
        }
        let mut results = TopicResults::with_capacity(topics.len());
        for topic in topics {
            let success = self.subscribe_to_topic(topic.as_ref()).await;
            results.insert(normalize_topic_name(topic.as_ref()).to_owned(), success);
        }
        self.notify_bulk_operation(&results, true).await;
        results
    }

    pub async fn unsubscribe_from_multiple_topics<S>(&self, topics: &[S]) -> TopicResults
    where
        S: AsRef<str>,
    {
        if !self.is_initialized() {
            log::warn!("unsubscribe_from_multiple_topics called before initialize()");
            return all_failed(topics);
        }
        let mut results = TopicResults::with_capacity(topics.len());
        for topic in topics {
            let success = self.unsubscribe_from_topic(topic.as_ref()).await;
            results.insert(normalize_topic_name(topic.as_ref()).to_owned(), success);
        }
        self.notify_bulk_operation(&results, false).await;
        results
    }

    /// Unsubscribes from every topic in the local record.
    pub async fn unsubscribe_from_all_topics(&self) -> TopicResults {
        let topics: Vec<String> = self.get_all_subscribed_topics().into_iter().collect();
        self.unsubscribe_from_multiple_topics(&topics).await
    }

    pub fn is_subscribed_to_topic(&self, topic: &str) -> bool {
        self.is_initialized() && self.inner.topics.contains(normalize_topic_name(topic))
    }

    pub fn get_all_subscribed_topics(&self) -> BTreeSet<String> {
        if !self.is_initialized() {
            return BTreeSet::new();
        }
        self.inner.topics.snapshot()
    }

    pub fn get_topic_subscription_statuses<S>(&self, topics: &[S]) -> TopicResults
    where
        S: AsRef<str>,
    {
        topics
            .iter()
            .map(|topic| {
                let topic = normalize_topic_name(topic.as_ref());
                (topic.to_owned(), self.is_subscribed_to_topic(topic))
            })
            .collect()
    }

    pub fn get_subscribed_topic_count(&self) -> usize {
        if !self.is_initialized() {
            return 0;
        }
        self.inner.topics.len()
    }

    pub fn topic_report(&self) -> TopicReport {
        TopicReport::new(
            self.get_all_subscribed_topics(),
            self.is_initialized(),
            Utc::now(),
        )
    }

    /// [`topic_report`](Self::topic_report) as JSON with camelCase keys.
    pub fn topic_report_json(&self) -> Value {
        self.topic_report().to_json()
    }
}

fn all_failed<S: AsRef<str>>(topics: &[S]) -> TopicResults {
    topics
        .iter()
        .map(|topic| (normalize_topic_name(topic.as_ref()).to_owned(), false))
        .collect()
}
