//! Client error types.

use splitkit_core::CoreError;
use splitkit_settings::SettingsError;

/// Errors surfaced by the session, dispatch and transport layers.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// HTTP request failed before a response arrived (connect, timeout, ...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body text.
        message: String,
    },

    /// Split registry or calculator error.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Invalid settings.
    #[error(transparent)]
    Settings(#[from] SettingsError),

    /// Visitor ID storage failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// A `vary`/`ab` call was configured incorrectly by the caller.
    #[error("invalid vary for \"{split_name}\": {message}")]
    InvalidVary {
        /// Split the call was made for.
        split_name: String,
        /// What is wrong with the call.
        message: String,
    },
}

impl ClientError {
    /// Whether the request was aborted because its timeout expired.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Http(e) if e.is_timeout())
    }

    pub(crate) fn invalid_vary(split_name: &str, message: impl Into<String>) -> Self {
        Self::InvalidVary {
            split_name: split_name.to_string(),
            message: message.into(),
        }
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Error raised by an analytics provider while recording an assignment.
#[derive(Debug, thiserror::Error)]
#[error("analytics error: {0}")]
pub struct AnalyticsError(pub String);

/// Errors from visitor ID storage.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// File I/O error.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored data could not be (de)serialized.
    #[error("storage JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
