//! Test utilities shared across crate-level unit tests.

pub mod handlers;

pub use handlers::{
    AnalyticsEvent, MessageCall, PreferencesCall, RecordingAnalyticsHandler, RecordingMessageHandler,
    RecordingPreferencesHandler, RecordingTokenHandler, RecordingTopicHandler, TokenCall,
    TopicCall,
};

/// Yields to the runtime until `condition` holds, so spawned listeners can drain
/// queued events. Panics if the condition is never reached.
pub async fn wait_until<F>(condition: F)
where
    F: Fn() -> bool,
{
    for _ in 0..500 {
        if condition() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition not reached after yielding to the runtime");
}

/// Yields a fixed number of times; used to assert that something did *not* happen.
pub async fn settle() {
    for _ in 0..50 {
        tokio::task::yield_now().await;
    }
}
