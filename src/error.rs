//! Error types for the registry and chat room
//!
//! One enum per concern, plus `AppError` which wraps them for the service
//! layer and the binary. Uses thiserror for ergonomic error definitions.

use thiserror::Error;

use crate::message::EventKind;

/// Application-level errors
#[derive(Debug, Error)]
pub enum AppError {
    /// IO error (stdin/stdout, config file)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file could not be parsed
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Chat room submission rejected
    #[error(transparent)]
    Submit(#[from] SubmitError),

    /// Report sink could not be opened
    #[error(transparent)]
    Report(#[from] ReportError),

    /// Account validation or credential failure
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// User registry failure
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Interactive input ended before a required answer was read
    #[error("Input closed")]
    InputClosed,
}

/// Invalid configuration values, rejected at construction time
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("queue capacity must be positive")]
    ZeroQueueCapacity,

    #[error("report concurrency limit must be positive")]
    ZeroReportLimit,

    #[error("report queue capacity must be positive")]
    ZeroReportQueue,

    #[error("salt length must be at least {min} bytes")]
    SaltTooShort { min: usize },

    #[error("invalid hash parameters: {0}")]
    InvalidHashParams(String),

    #[error("invalid username bounds: min {min} > max {max}")]
    InvalidUsernameBounds { min: usize, max: usize },
}

/// Chat room submission errors
///
/// Returned synchronously to the submitting caller. The dispatcher never
/// retries on the caller's behalf.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SubmitError {
    /// The inbound queue for this event kind is at capacity
    #[error("{kind} queue is full")]
    QueueFull { kind: EventKind },

    /// The dispatcher loop is no longer running
    #[error("room dispatcher has stopped, {kind} not delivered")]
    Closed { kind: EventKind },
}

/// Report sink errors
///
/// Never propagated to submitters; the report worker logs them instead.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// The receiving end of the sink has been closed
    #[error("Sink closed")]
    SinkClosed,
}

/// Account validation and credential errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("username must be between {min} and {max} characters long")]
    UsernameLength { min: usize, max: usize },

    #[error("invalid password")]
    InvalidPassword,

    #[error("invalid role: {0}. Please enter 'admin' or 'user'")]
    InvalidRole(String),

    #[error("password hashing failed: {0}")]
    Hash(String),
}

/// User registry errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("user not found")]
    UserNotFound,

    #[error("username '{0}' already exists")]
    UserExists(String),

    /// A writer panicked while holding the registry lock
    #[error("registry lock poisoned")]
    Poisoned,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_error_display() {
        let err = SubmitError::QueueFull {
            kind: EventKind::Join,
        };
        assert_eq!(err.to_string(), "join queue is full");

        let err = SubmitError::Closed {
            kind: EventKind::Message,
        };
        assert_eq!(
            err.to_string(),
            "room dispatcher has stopped, message not delivered"
        );
    }

    #[test]
    fn test_app_error_is_transparent() {
        let err: AppError = AuthError::UsernameLength { min: 5, max: 20 }.into();
        assert_eq!(
            err.to_string(),
            "username must be between 5 and 20 characters long"
        );

        let err: AppError = RegistryError::UserExists("alice".into()).into();
        assert_eq!(err.to_string(), "username 'alice' already exists");
    }
}
