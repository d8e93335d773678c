//! Error types for the remote worksheet store.

use thiserror::Error;

/// Errors raised by a worksheet store or the sync engine.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RemoteError {
    /// Credentials are missing, unreadable, or were rejected.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// The spreadsheet does not exist or is not shared with the account.
    #[error("spreadsheet not found: {0}")]
    DestinationNotFound(String),

    /// Request quota exceeded.
    #[error("rate limit exceeded, retry after {retry_after} seconds")]
    RateLimited {
        /// Seconds the server asked us to wait.
        retry_after: u64,
    },

    /// Transport failure.
    #[error("network error: {0}")]
    Network(String),

    /// The API answered with an unexpected status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Failed to parse a JSON payload.
    #[error("JSON parse error: {0}")]
    JsonParse(String),
}

impl RemoteError {
    /// Returns a user-friendly hint shown when a run aborts.
    #[must_use]
    pub fn user_message(&self) -> &str {
        match self {
            Self::Authentication(_) => {
                "Google rejected the credentials. Check the service-account key and sharing."
            }
            Self::DestinationNotFound(_) => {
                "The spreadsheet was not found or is not shared with the service account."
            }
            Self::RateLimited { .. } => "Google Sheets rate limit reached. Re-run later.",
            Self::Network(_) => "Could not reach Google Sheets. Check the network connection.",
            Self::Api { .. } | Self::JsonParse(_) => "Google Sheets returned an unexpected response.",
        }
    }

    /// Errors that abort the whole run rather than one partition.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Authentication(_) | Self::DestinationNotFound(_))
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

impl From<serde_json::Error> for RemoteError {
    fn from(err: serde_json::Error) -> Self {
        Self::JsonParse(err.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for RemoteError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        Self::Authentication(format!("cannot sign token request: {err}"))
    }
}

/// Result type alias for remote operations.
pub type Result<T> = std::result::Result<T, RemoteError>;
