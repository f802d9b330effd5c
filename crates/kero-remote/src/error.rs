//! # Remote Error Types
//!
//! Error types for calls to the spreadsheet endpoints and for loading the
//! configuration that points at them.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         RemoteError                                     │
//! │                                                                         │
//! │  Configuration           Transport               Server / Payload       │
//! │  ─────────────           ─────────               ────────────────       │
//! │  InvalidConfig           ConnectionFailed        Server                 │
//! │  InvalidUrl              Timeout                 InvalidResponse        │
//! │  ConfigLoadFailed        Status (non-2xx)        MissingData            │
//! │  ConfigSaveFailed                                                       │
//! │                                                                         │
//! │  Nothing is retried automatically. Callers turn these into a notice    │
//! │  and keep whatever state they had before the call.                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Result type alias for remote operations.
pub type RemoteResult<T> = Result<T, RemoteError>;

#[derive(Debug, Error)]
pub enum RemoteError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Transport Errors
    // =========================================================================
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timed out")]
    Timeout,

    /// Non-2xx response.
    #[error("Network error: {reason}")]
    Status { status: u16, reason: String },

    // =========================================================================
    // Server / Payload Errors
    // =========================================================================
    /// The endpoint answered but reported a failure.
    #[error("{0}")]
    Server(String),

    /// Body was not the expected JSON shape.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Success envelope without a `data` field.
    #[error("Response to '{0}' carried no data")]
    MissingData(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RemoteError::Timeout
        } else if err.is_decode() {
            RemoteError::InvalidResponse(err.to_string())
        } else if let Some(status) = err.status() {
            RemoteError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("unknown status").to_string(),
            }
        } else {
            RemoteError::ConnectionFailed(err.to_string())
        }
    }
}

impl From<serde_json::Error> for RemoteError {
    fn from(err: serde_json::Error) -> Self {
        RemoteError::InvalidResponse(err.to_string())
    }
}

impl From<url::ParseError> for RemoteError {
    fn from(err: url::ParseError) -> Self {
        RemoteError::InvalidUrl(err.to_string())
    }
}

impl From<std::io::Error> for RemoteError {
    fn from(err: std::io::Error) -> Self {
        RemoteError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for RemoteError {
    fn from(err: toml::de::Error) -> Self {
        RemoteError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for RemoteError {
    fn from(err: toml::ser::Error) -> Self {
        RemoteError::ConfigSaveFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl RemoteError {
    /// The request never produced a usable HTTP response.
    pub fn is_transport_error(&self) -> bool {
        matches!(
            self,
            RemoteError::ConnectionFailed(_) | RemoteError::Timeout | RemoteError::Status { .. }
        )
    }

    /// The configuration is wrong; retrying will not help.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            RemoteError::InvalidConfig(_)
                | RemoteError::InvalidUrl(_)
                | RemoteError::ConfigLoadFailed(_)
                | RemoteError::ConfigSaveFailed(_)
        )
    }

    /// The endpoint answered with a failure or a malformed body.
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            RemoteError::Server(_) | RemoteError::InvalidResponse(_) | RemoteError::MissingData(_)
        )
    }
}
