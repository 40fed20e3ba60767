//! Well-known keys and literals shared by the messaging and session layers.

pub const DATA_KEY_MESSAGE_ID: &str = "messageId";
pub const DATA_KEY_ROUTE: &str = "route";
pub const DATA_KEY_SCREEN: &str = "screen";
pub const DATA_KEY_ACTION: &str = "action";
pub const DATA_KEY_PRIORITY: &str = "priority";
pub const DATA_KEY_CATEGORY: &str = "category";
pub const DATA_KEY_DEEP_LINK: &str = "deepLink";

pub const DEFAULT_PRIORITY: &str = "normal";

/// Substitute for `messageId` when a message carries none.
pub const UNKNOWN_MESSAGE_ID: &str = "unknown";

pub const EVENT_RECEIVED: &str = "received";
pub const EVENT_TAPPED: &str = "tapped";
pub const EVENT_APP_OPENED: &str = "app_opened";

pub const TOPICS_PREFIX: &str = "/topics/";

pub const GENERATED_TOKEN_LENGTH: usize = 32;
