use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::messaging::constants::{
    DATA_KEY_ACTION, DATA_KEY_CATEGORY, DATA_KEY_DEEP_LINK, DATA_KEY_MESSAGE_ID,
    DATA_KEY_PRIORITY, DATA_KEY_ROUTE, DATA_KEY_SCREEN, DEFAULT_PRIORITY,
};

/// Opaque key/value payload attached to a push message.
pub type MessageData = Map<String, Value>;

/// Notification block of a raw platform message.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteNotification {
    pub title: Option<String>,
    pub body: Option<String>,
}

/// Message as delivered by the platform push transport, before normalization.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteMessage {
    pub notification: Option<RemoteNotification>,
    pub data: Option<MessageData>,
    pub message_id: Option<String>,
    pub from: Option<String>,
    pub collapse_key: Option<String>,
}

impl RemoteMessage {
    pub fn with_notification(title: Option<&str>, body: Option<&str>) -> Self {
        Self {
            notification: Some(RemoteNotification {
                title: title.map(str::to_owned),
                body: body.map(str::to_owned),
            }),
            ..Default::default()
        }
    }

    pub fn with_data(mut self, data: MessageData) -> Self {
        self.data = Some(data);
        self
    }
}

/// Normalized push message handed to application handlers.
///
/// Equality is structural over `title`, `body` and `data`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PushMessage {
    title: Option<String>,
    body: Option<String>,
    data: Option<MessageData>,
}

impl PushMessage {
    pub fn new(title: Option<String>, body: Option<String>, data: Option<MessageData>) -> Self {
        Self { title, body, data }
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    pub fn data(&self) -> Option<&MessageData> {
        self.data.as_ref()
    }

    /// Reads a string value out of `data`. Non-string values read as absent.
    pub fn data_str(&self, key: &str) -> Option<&str> {
        self.data.as_ref()?.get(key)?.as_str()
    }

    /// Message id from `data`. Numeric and boolean ids are rendered as text.
    pub fn message_id(&self) -> Option<Cow<'_, str>> {
        match self.data.as_ref()?.get(DATA_KEY_MESSAGE_ID)? {
            Value::String(id) => Some(Cow::Borrowed(id.as_str())),
            Value::Number(id) => Some(Cow::Owned(id.to_string())),
            Value::Bool(id) => Some(Cow::Owned(id.to_string())),
            _ => None,
        }
    }

    pub fn route(&self) -> Option<&str> {
        self.data_str(DATA_KEY_ROUTE)
    }

    pub fn screen(&self) -> Option<&str> {
        self.data_str(DATA_KEY_SCREEN)
    }

    pub fn action(&self) -> Option<&str> {
        self.data_str(DATA_KEY_ACTION)
    }

    /// Delivery priority, `"normal"` unless the payload says otherwise.
    pub fn priority(&self) -> &str {
        self.data_str(DATA_KEY_PRIORITY).unwrap_or(DEFAULT_PRIORITY)
    }

    pub fn category(&self) -> Option<&str> {
        self.data_str(DATA_KEY_CATEGORY)
    }

    pub fn deep_link(&self) -> Option<&str> {
        self.data_str(DATA_KEY_DEEP_LINK)
    }
}

impl From<&RemoteMessage> for PushMessage {
    fn from(message: &RemoteMessage) -> Self {
        let (title, body) = match &message.notification {
            Some(notification) => (notification.title.clone(), notification.body.clone()),
            None => (None, None),
        };
        PushMessage::new(title, body, message.data.clone())
    }
}

/// Raw permission answer from the platform. Absent fields mean "not granted".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionGrant {
    pub alert: Option<bool>,
    pub badge: Option<bool>,
    pub sound: Option<bool>,
    pub announcement: Option<bool>,
}

impl PermissionGrant {
    /// Grants every capability, as platforms without a permission dialog do.
    pub fn all() -> Self {
        Self {
            alert: Some(true),
            badge: Some(true),
            sound: Some(true),
            announcement: Some(true),
        }
    }

    /// Reads a loosely typed platform answer; non-boolean fields are treated as unset.
    pub fn from_value(value: &Value) -> Self {
        let field = |name: &str| value.get(name).and_then(Value::as_bool);
        Self {
            alert: field("alert"),
            badge: field("badge"),
            sound: field("sound"),
            announcement: field("announcement"),
        }
    }
}

/// Normalized notification permission result.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPermissionSettings {
    pub alert: bool,
    pub badge: bool,
    pub sound: bool,
    /// Never reported by the transport; always `false` when derived from it.
    pub provisional: bool,
    pub announcement: bool,
}

impl NotificationPermissionSettings {
    pub fn has_all_permissions(&self) -> bool {
        self.alert && self.badge && self.sound
    }

    pub fn has_no_permissions(&self) -> bool {
        !self.alert && !self.badge && !self.sound
    }
}

impl From<PermissionGrant> for NotificationPermissionSettings {
    fn from(grant: PermissionGrant) -> Self {
        Self {
            alert: grant.alert.unwrap_or(false),
            badge: grant.badge.unwrap_or(false),
            sound: grant.sound.unwrap_or(false),
            provisional: false,
            announcement: grant.announcement.unwrap_or(false),
        }
    }
}
