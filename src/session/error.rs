use std::fmt::{Display, Formatter};

/// Category of application handler a failure came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HandlerKind {
    Token,
    Analytics,
    Preferences,
}

impl HandlerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            HandlerKind::Token => "token",
            HandlerKind::Analytics => "analytics",
            HandlerKind::Preferences => "preferences",
        }
    }
}

impl Display for HandlerKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure raised by an application-supplied handler.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HandlerError {
    message: String,
}

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn from_error(error: &dyn std::error::Error) -> Self {
        Self::new(error.to_string())
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for HandlerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for HandlerError {}

pub type HandlerResult<T> = Result<T, HandlerError>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionErrorCode {
    HandlerFailed,
}

impl SessionErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionErrorCode::HandlerFailed => "session/handler-failed",
        }
    }
}

/// Error surfaced by the session's manual operations.
///
/// Only handler failures on synchronous triggers reach callers; transport and
/// precondition failures are reported as `false` / `None` instead.
#[derive(Clone, Debug)]
pub struct SessionError {
    pub code: SessionErrorCode,
    handler: Option<HandlerKind>,
    message: String,
}

impl SessionError {
    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }

    pub fn handler(&self) -> Option<HandlerKind> {
        self.handler
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code_str())
    }
}

impl std::error::Error for SessionError {}

pub type SessionResult<T> = Result<T, SessionError>;

pub fn handler_failed(kind: HandlerKind, error: HandlerError) -> SessionError {
    SessionError {
        code: SessionErrorCode::HandlerFailed,
        handler: Some(kind),
        message: format!("{kind} handler failed: {error}"),
    }
}
