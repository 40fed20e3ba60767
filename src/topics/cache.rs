use std::collections::BTreeSet;
use std::sync::Mutex;

/// Topics this process believes it is subscribed to.
///
/// The push transport offers no query for server-side subscriptions, so this set
/// is only a local record of successful subscribe/unsubscribe calls. It drifts
/// when subscriptions change through another path (another install, the backend
/// console) and is not reconciled.
#[derive(Debug, Default)]
pub struct TopicSubscriptionCache {
    topics: Mutex<BTreeSet<String>>,
}

impl TopicSubscriptionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when the topic was not recorded yet.
    pub fn insert(&self, topic: &str) -> bool {
        self.topics.lock().unwrap().insert(topic.to_owned())
    }

    /// Returns `true` when the topic was recorded.
    pub fn remove(&self, topic: &str) -> bool {
        self.topics.lock().unwrap().remove(topic)
    }

    pub fn contains(&self, topic: &str) -> bool {
        self.topics.lock().unwrap().contains(topic)
    }

    pub fn snapshot(&self) -> BTreeSet<String> {
        self.topics.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.topics.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.lock().unwrap().is_empty()
    }

    pub fn clear(&self) {
        self.topics.lock().unwrap().clear();
    }
}
