//! Error types for Tasklane.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Coarse classification of a failure.
///
/// Callers branch on the kind rather than on individual variants: `Auth`
/// tears the session down, everything else only lands in an error slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Rejected input, either locally (no request issued) or by the server.
    Validation,
    /// Missing, expired or rejected credential (401/403).
    Auth,
    /// The server does not know the addressed entity (404).
    NotFound,
    /// 5xx responses and payloads that do not match the expected schema.
    Server,
    /// The request never produced a response.
    Network,
    /// Local storage, configuration and serialization problems.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Validation => "validation",
            Self::Auth => "auth",
            Self::NotFound => "not_found",
            Self::Server => "server",
            Self::Network => "network",
            Self::Internal => "internal",
        };
        f.write_str(name)
    }
}

/// A shared error type for the entire Tasklane client.
///
/// Remote failures carry the HTTP status (when there was one) and the
/// server-supplied `message` from the error envelope, if any.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TasklaneError {
    /// Input rejected before or by the server
    #[error("Validation error: {}", or_default(.message, "invalid input"))]
    Validation {
        status: Option<u16>,
        message: Option<String>,
    },

    /// Credential missing or rejected
    #[error("Authentication error ({status}): {}", or_default(.message, "unauthorized"))]
    Auth {
        status: u16,
        message: Option<String>,
    },

    /// Entity unknown to the server
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
        message: Option<String>,
    },

    /// 5xx or malformed response
    #[error("Server error{}: {}", status_suffix(.status), or_default(.message, "unexpected response"))]
    Server {
        status: Option<u16>,
        message: Option<String>,
    },

    /// Transport failure, no response received
    #[error("Network error: {0}")]
    Network(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON"
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Durable storage error
    #[error("Storage error: {0}")]
    Storage(String),
}

impl TasklaneError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a local validation error (no request was issued).
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            status: None,
            message: Some(message.into()),
        }
    }

    /// Creates an auth error for the given status.
    pub fn auth(status: u16, message: Option<String>) -> Self {
        Self::Auth { status, message }
    }

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
            message: None,
        }
    }

    /// Creates a server error for a payload that failed schema validation.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Server {
            status: None,
            message: Some(format!("Malformed response: {}", message.into())),
        }
    }

    /// Creates a Network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates a Storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    // ============================================================================
    // Classification
    // ============================================================================

    /// Returns the coarse kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Auth { .. } => ErrorKind::Auth,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Server { .. } => ErrorKind::Server,
            Self::Network(_) => ErrorKind::Network,
            Self::Io { .. } | Self::Serialization { .. } | Self::Config(_) | Self::Storage(_) => {
                ErrorKind::Internal
            }
        }
    }

    /// Check if this is an auth error
    pub fn is_auth(&self) -> bool {
        self.kind() == ErrorKind::Auth
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// Check if this is a network error
    pub fn is_network(&self) -> bool {
        self.kind() == ErrorKind::Network
    }

    /// The message supplied by the server (or by local validation), if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Validation { message, .. }
            | Self::Auth { message, .. }
            | Self::NotFound { message, .. }
            | Self::Server { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// The text to show a user: the server's message, or `fallback`.
    ///
    /// Malformed payloads and transport failures always show the fallback.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Server { status: None, .. } | Self::Network(_) => fallback.to_string(),
            _ => self
                .server_message()
                .filter(|m| !m.trim().is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| fallback.to_string()),
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for TasklaneError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for TasklaneError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for TasklaneError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for TasklaneError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

fn or_default<'a>(message: &'a Option<String>, default: &'a str) -> &'a str {
    message.as_deref().unwrap_or(default)
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" ({s})")).unwrap_or_default()
}

/// A type alias for `Result<T, TasklaneError>`.
pub type Result<T> = std::result::Result<T, TasklaneError>;
