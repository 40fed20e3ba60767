use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Per-topic outcome of a bulk operation, iterated in request order.
pub type TopicResults = IndexMap<String, bool>;

/// Snapshot of the local topic subscription record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicReport {
    pub total_count: usize,
    pub topics: Vec<String>,
    /// RFC 3339 UTC timestamp of when the report was taken.
    pub timestamp: String,
    pub is_initialized: bool,
}

impl TopicReport {
    pub fn new(
        topics: impl IntoIterator<Item = String>,
        is_initialized: bool,
        taken_at: DateTime<Utc>,
    ) -> Self {
        let mut topics: Vec<String> = topics.into_iter().collect();
        topics.sort();
        Self {
            total_count: topics.len(),
            topics,
            timestamp: taken_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            is_initialized,
        }
    }

    pub fn to_json(&self) -> Value {
        serde_json::json!({
            "totalCount": self.total_count,
            "topics": self.topics,
            "timestamp": self.timestamp,
            "isInitialized": self.is_initialized,
        })
    }
}

/// Names of the topics whose operation failed, in request order.
pub fn failed_topics(results: &TopicResults) -> Vec<&str> {
    results
        .iter()
        .filter(|(_, success)| !**success)
        .map(|(topic, _)| topic.as_str())
        .collect()
}
