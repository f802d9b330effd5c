//! # Application Error Type
//!
//! Unified error type for every `kero` command.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in kero                                   │
//! │                                                                         │
//! │  Command handler: Result<(), AppError>                                  │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Storage error?  ─── StoreError::QueryFailed("...") ──┐                │
//! │  Remote error?   ─── RemoteError::Server("...")  ─────┤                │
//! │  Form invalid?   ─── FieldErrors ─────────────────────┤                │
//! │  Domain error?   ─── CoreError::EntryNotFound ────────┴──► AppError    │
//! │                                                              │          │
//! │                                                              ▼          │
//! │  run() prints  "error[NOT_FOUND]: No entry at position 7 ..."           │
//! │  and exits with ErrorCode::exit_code()                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;

use kero_core::{CoreError, FieldErrors};
use kero_remote::RemoteError;
use kero_store::StoreError;
use serde::Serialize;

/// Error returned from command handlers.
///
/// ## Serialization
/// With `--json` the error goes to stdout as:
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "No entry at position 7 (ledger has 2 entries)"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppError {
    /// Machine-readable error code
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,
}

/// Error codes for command failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Entry, item, job or user not found
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Local storage failed
    StorageError,

    /// Script endpoint unreachable or reported a failure
    RemoteError,

    /// Configuration file or environment invalid
    ConfigError,

    /// Logged in, but missing the required permission
    AccessDenied,

    /// No usable session; the operator must log in
    LoginRequired,

    /// Operator declined a confirmation
    Cancelled,

    /// Anything else
    Internal,
}

impl ErrorCode {
    /// Process exit status for this code.
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorCode::Cancelled => 0,
            ErrorCode::ValidationError | ErrorCode::NotFound => 2,
            ErrorCode::LoginRequired | ErrorCode::AccessDenied => 3,
            ErrorCode::RemoteError => 4,
            ErrorCode::ConfigError => 5,
            ErrorCode::StorageError | ErrorCode::Internal => 1,
        }
    }
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        AppError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        AppError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::ValidationError, message)
    }

    pub fn remote(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::RemoteError, message)
    }

    pub fn config(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::ConfigError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::Internal, message)
    }

    pub fn cancelled() -> Self {
        AppError::new(ErrorCode::Cancelled, "Cancelled.")
    }

    /// True when the operator declined a prompt; not a failure.
    pub fn is_cancelled(&self) -> bool {
        self.code == ErrorCode::Cancelled
    }
}

/// Result alias for command handlers.
pub type AppResult<T> = Result<T, AppError>;

// =============================================================================
// Conversions
// =============================================================================

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::ConnectionFailed(e) => {
                tracing::error!("Store connection failed: {}", e);
                AppError::new(ErrorCode::StorageError, "Local storage is unavailable")
            }
            StoreError::MigrationFailed(e) => {
                tracing::error!("Store migration failed: {}", e);
                AppError::new(ErrorCode::StorageError, "Local storage migration failed")
            }
            StoreError::QueryFailed(e) => {
                tracing::error!("Store query failed: {}", e);
                AppError::new(ErrorCode::StorageError, "Local storage operation failed")
            }
            StoreError::PoolExhausted => {
                AppError::new(ErrorCode::StorageError, "Local storage is busy")
            }
            other => AppError::new(ErrorCode::StorageError, other.to_string()),
        }
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::EntryNotFound { .. }
            | CoreError::LabelItemNotFound(_)
            | CoreError::PrintJobNotFound(_) => AppError::new(ErrorCode::NotFound, err.to_string()),
            CoreError::Form(errors) => errors.into(),
            other => AppError::validation(other.to_string()),
        }
    }
}

impl From<FieldErrors> for AppError {
    fn from(errors: FieldErrors) -> Self {
        let mut message = String::from("Please correct errors before saving.");
        for e in errors.iter() {
            message.push_str(&format!("\n  {}: {}", e.field, e.message));
        }
        AppError::validation(message)
    }
}

impl From<RemoteError> for AppError {
    fn from(err: RemoteError) -> Self {
        if err.is_config_error() {
            AppError::config(err.to_string())
        } else {
            AppError::remote(err.to_string())
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::internal(format!("I/O error: {}", err))
    }
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        AppError::internal(format!("CSV export failed: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::internal(format!("JSON error: {}", err))
    }
}

impl From<dialoguer::Error> for AppError {
    fn from(err: dialoguer::Error) -> Self {
        AppError::internal(format!("Prompt failed: {}", err))
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = serde_json::to_value(self.code)
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_else(|| format!("{:?}", self.code));
        write!(f, "error[{}]: {}", code, self.message)
    }
}

impl std::error::Error for AppError {}
