use std::fmt::{Display, Formatter};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransportErrorCode {
    InvalidArgument,
    PermissionBlocked,
    TokenUnavailable,
    TokenDeletionFailed,
    TopicSubscribeFailed,
    TopicUnsubscribeFailed,
}

impl TransportErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportErrorCode::InvalidArgument => "transport/invalid-argument",
            TransportErrorCode::PermissionBlocked => "transport/permission-blocked",
            TransportErrorCode::TokenUnavailable => "transport/token-unavailable",
            TransportErrorCode::TokenDeletionFailed => "transport/token-deletion-failed",
            TransportErrorCode::TopicSubscribeFailed => "transport/topic-subscribe-failed",
            TransportErrorCode::TopicUnsubscribeFailed => "transport/topic-unsubscribe-failed",
        }
    }
}

/// Failure reported by a [`PushTransport`](crate::messaging::PushTransport).
///
/// These never cross the [`TransportAdapter`](crate::messaging::TransportAdapter)
/// boundary: the adapter logs them and degrades to `None` / `false`.
#[derive(Clone, Debug)]
pub struct TransportError {
    pub code: TransportErrorCode,
    message: String,
}

impl TransportError {
    pub fn new(code: TransportErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for TransportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code_str())
    }
}

impl std::error::Error for TransportError {}

pub type TransportResult<T> = Result<T, TransportError>;

pub fn invalid_argument(message: impl Into<String>) -> TransportError {
    TransportError::new(TransportErrorCode::InvalidArgument, message)
}

pub fn permission_blocked(message: impl Into<String>) -> TransportError {
    TransportError::new(TransportErrorCode::PermissionBlocked, message)
}

pub fn token_unavailable(message: impl Into<String>) -> TransportError {
    TransportError::new(TransportErrorCode::TokenUnavailable, message)
}

pub fn token_deletion_failed(message: impl Into<String>) -> TransportError {
    TransportError::new(TransportErrorCode::TokenDeletionFailed, message)
}

pub fn topic_subscribe_failed(message: impl Into<String>) -> TransportError {
    TransportError::new(TransportErrorCode::TopicSubscribeFailed, message)
}

pub fn topic_unsubscribe_failed(message: impl Into<String>) -> TransportError {
    TransportError::new(TransportErrorCode::TopicUnsubscribeFailed, message)
}
