//! # Error Types
//!
//! Domain-specific error types for kero-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  kero-core errors (this file)                                          │
//! │  ├── CoreError        - General domain errors                          │
//! │  ├── ValidationError  - A single input rule failed                     │
//! │  └── FieldErrors      - Form-level failures, one entry per field       │
//! │                                                                         │
//! │  kero-store errors (separate crate)                                    │
//! │  └── StoreError       - Local storage failures                         │
//! │                                                                         │
//! │  kero-remote errors (separate crate)                                   │
//! │  └── RemoteError      - Transport / server-reported failures           │
//! │                                                                         │
//! │  CLI errors (in app)                                                   │
//! │  └── AppError         - What the operator sees (code + message)        │
//! │                                                                         │
//! │  Flow: ValidationError → FieldErrors → CoreError → AppError → stderr   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use std::fmt;
use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core domain errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A ledger position outside the current list.
    ///
    /// Positions are 1-based in the rendered table and shift on delete, so a
    /// stale position from an older render can land here.
    #[error("No entry at position {position} (ledger has {len} entries)")]
    EntryNotFound { position: usize, len: usize },

    /// Branch name outside the fixed branch list.
    #[error("Unknown branch: {0}")]
    UnknownBranch(String),

    /// Exporting or printing with nothing to work on.
    #[error("No entries to export.")]
    NothingToExport,

    /// Calculator inputs that cannot be priced.
    #[error("Invalid Input")]
    InvalidPricing,

    /// Label item id missing from the loaded label catalog.
    #[error("Label item not found: {0}")]
    LabelItemNotFound(u64),

    /// Print job id missing from the print queue.
    #[error("Print job not found: {0}")]
    PrintJobNotFound(u64),

    /// Single-rule validation failure.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Form validation failure with per-field messages.
    #[error("{0}")]
    Form(#[from] FieldErrors),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before any state is touched.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Invalid format (e.g. unparsable number).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

impl ValidationError {
    /// Creates a Required error for a field.
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }

    /// Creates an InvalidFormat error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Field Errors
// =============================================================================

/// One failed form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldError {
    /// Form field name (`code`, `unitPrice`, `currentPrice`, ...).
    pub field: String,

    /// Message shown next to the field.
    pub message: String,
}

/// Every field that failed on a single form submission.
///
/// ## Usage
/// ```rust
/// use kero_core::error::FieldErrors;
///
/// let mut errors = FieldErrors::default();
/// errors.push("code", "Code is required.");
/// assert!(errors.has("code"));
/// assert!(errors.into_result(()).is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Error)]
pub struct FieldErrors {
    errors: Vec<FieldError>,
}

impl FieldErrors {
    /// Records a failed field.
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Returns true if nothing failed.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns true if the given field failed.
    pub fn has(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    /// Message recorded for a field, if any.
    pub fn message_for(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    /// Iterates over the failed fields in submission order.
    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    /// `Ok(value)` when nothing failed, otherwise `Err(self)`.
    pub fn into_result<T>(self, value: T) -> Result<T, FieldErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.errors.iter().map(|e| e.message.as_str()).collect();
        write!(f, "{}", messages.join(" "))
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::EntryNotFound { position: 4, len: 3 };
        assert_eq!(err.to_string(), "No entry at position 4 (ledger has 3 entries)");
        assert_eq!(CoreError::NothingToExport.to_string(), "No entries to export.");
        assert_eq!(CoreError::InvalidPricing.to_string(), "Invalid Input");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::required("password");
        assert_eq!(err.to_string(), "password is required");

        let err = ValidationError::MustBePositive {
            field: "price".to_string(),
        };
        assert_eq!(err.to_string(), "price must be positive");
    }

    #[test]
    fn test_field_errors_collect_in_order() {
        let mut errors = FieldErrors::default();
        errors.push("code", "Code is required.");
        errors.push("unitPrice", "Valid unit price is required.");

        assert!(errors.has("unitPrice"));
        assert!(!errors.has("currentPrice"));
        assert_eq!(errors.message_for("code"), Some("Code is required."));
        assert_eq!(
            errors.to_string(),
            "Code is required. Valid unit price is required."
        );
    }

    #[test]
    fn test_field_errors_convert_to_core_error() {
        let mut errors = FieldErrors::default();
        errors.push("code", "Code is required.");
        let core_err: CoreError = errors.into();
        assert!(matches!(core_err, CoreError::Form(_)));
    }
}
