//! Local topic subscription bookkeeping and reporting.

mod cache;
mod report;

pub use cache::TopicSubscriptionCache;
pub use report::{failed_topics, TopicReport, TopicResults};
