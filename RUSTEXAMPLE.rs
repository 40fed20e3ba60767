use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use push_session::messaging::{MemoryTransport, PushMessage, RemoteMessage};
use push_session::session::{
    AnalyticsHandler, EventData, HandlerResult, MessageHandler, PushSession, SessionConfig,
    TokenHandler, TopicHandler,
};
use push_session::topics::{failed_topics, TopicResults};

/// Stands in for the application backend that stores registration tokens.
struct ConsoleBackend;

#[async_trait]
impl TokenHandler for ConsoleBackend {
    async fn on_token_received(&self, token: &str, user_id: Option<&str>) -> HandlerResult<bool> {
        println!("register token {token} for {}", user_id.unwrap_or("anonymous"));
        Ok(true)
    }

    async fn on_token_delete(&self, token: &str) -> HandlerResult<bool> {
        println!("unregister token {token}");
        Ok(true)
    }

    async fn on_token_refreshed(&self, old_token: &str, new_token: &str) -> HandlerResult<()> {
        println!("token rotated: {old_token} -> {new_token}");
        Ok(())
    }
}

#[async_trait]
impl MessageHandler for ConsoleBackend {
    async fn on_foreground_message(&self, message: &PushMessage) -> HandlerResult<()> {
        println!(
            "foreground: {} (route {:?})",
            message.title().unwrap_or("<untitled>"),
            message.route()
        );
        Ok(())
    }

    async fn on_message_tap(&self, message: &PushMessage) -> HandlerResult<()> {
        println!("tapped: {:?}", message.deep_link());
        Ok(())
    }

    async fn on_app_opened_from_notification(&self, message: &PushMessage) -> HandlerResult<()> {
        println!("cold launch from {:?}", message.title());
        Ok(())
    }
}

#[async_trait]
impl AnalyticsHandler for ConsoleBackend {
    async fn on_notification_event(
        &self,
        event_type: &str,
        message_id: &str,
        additional_data: Option<&EventData>,
    ) -> HandlerResult<()> {
        println!("analytics {event_type} {message_id} {additional_data:?}");
        Ok(())
    }
}

#[async_trait]
impl TopicHandler for ConsoleBackend {
    async fn on_topic_subscribed(&self, topic: &str, success: bool) -> HandlerResult<()> {
        println!("subscribe {topic}: {success}");
        Ok(())
    }

    async fn on_topic_unsubscribed(&self, topic: &str, success: bool) -> HandlerResult<()> {
        println!("unsubscribe {topic}: {success}");
        Ok(())
    }

    async fn on_bulk_topic_operation(
        &self,
        results: &TopicResults,
        is_subscription: bool,
    ) -> HandlerResult<()> {
        let failed = failed_topics(results);
        println!("bulk (subscribe={is_subscription}) failed topics: {failed:?}");
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let transport = MemoryTransport::new();
        transport.fail_topic("flaky");

        let backend = Arc::new(ConsoleBackend);
        let config = SessionConfig::new()
            .with_token_handler(backend.clone())
            .with_message_handler(backend.clone())
            .with_analytics_handler(backend.clone())
            .with_topic_handler(backend);
        let session = PushSession::new(Arc::new(transport.clone()), config);

        let permissions = session.request_permission().await;
        println!("permissions granted: {}", permissions.has_all_permissions());

        session.initialize().await;

        session
            .subscribe_to_multiple_topics(&["news", "/topics/weather", "flaky"])
            .await;
        println!("{}", session.topic_report_json());

        transport.emit_foreground_message(RemoteMessage::with_notification(
            Some("Breaking"),
            Some("Something happened"),
        ));
        transport.emit_token_refresh("rotated-token");
        tokio::time::sleep(Duration::from_millis(50)).await;

        session.logout().await;
        session.dispose().await;
    });

    Ok(())
}
