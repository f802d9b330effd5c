//! # Validation Module
//!
//! Turns the pricing entry form into a ledger line, or into field errors.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Entry Form → Ledger Line                           │
//! │                                                                         │
//! │  code ────────── trimmed, non-empty ───────────── "Code is required."   │
//! │  unit price ──── number ≥ 0 ─────────────── "Valid unit price is       │
//! │                                                   required."            │
//! │  current price ─ (returns only) number ≥ 0 ── "Valid current price     │
//! │                                                   required."            │
//! │           │                                                             │
//! │           ▼  all fields checked, every failure reported                 │
//! │  LedgerEntry { units/discount/vat from CalculatorMemory,                │
//! │                case = piece × units }                                   │
//! │                                                                         │
//! │  Nothing reaches the ledger unless every field passes.                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::{FieldErrors, ValidationError};
use crate::money::Money;
use crate::pricing::CalculatorMemory;
use crate::types::{EntryType, LedgerEntry};

/// Result type for single-rule validation.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Field names used in [`FieldErrors`] for the entry form.
pub mod fields {
    pub const CODE: &str = "code";
    pub const UNIT_PRICE: &str = "unitPrice";
    pub const CURRENT_PRICE: &str = "currentPrice";
}

// =============================================================================
// Entry Form
// =============================================================================

/// Raw text of the pricing entry form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryForm {
    pub code: String,
    pub name: String,

    /// Supplier filled in from the catalog.
    pub supplier: String,

    /// Supplier chosen from the supplier picker; wins over `supplier`.
    pub alternate_supplier: String,

    pub unit_price: String,
    pub entry_type: EntryType,

    /// Only read for returns.
    pub current_price: String,
}

impl EntryForm {
    /// Supplier that will be written on the line.
    pub fn effective_supplier(&self) -> &str {
        let alternate = self.alternate_supplier.trim();
        if alternate.is_empty() {
            self.supplier.trim()
        } else {
            alternate
        }
    }
}

/// Parses a non-negative price field. Blank, non-numeric and negative
/// values are all rejected.
pub fn parse_non_negative_price(text: &str) -> Option<Money> {
    if text.trim().is_empty() {
        return None;
    }
    Money::parse_prefix(text).filter(|m| !m.is_negative())
}

/// Validates the entry form.
///
/// ## Example
/// ```rust
/// use kero_core::pricing::CalculatorMemory;
/// use kero_core::validation::{validate_entry, EntryForm};
///
/// let form = EntryForm {
///     code: "A1".into(),
///     unit_price: "51.3".into(),
///     ..Default::default()
/// };
/// let entry = validate_entry(&form, &CalculatorMemory::default()).unwrap();
/// assert_eq!(entry.case_price.to_string(), "51.300");
///
/// let errors = validate_entry(&EntryForm::default(), &CalculatorMemory::default()).unwrap_err();
/// assert!(errors.has("code"));
/// assert!(errors.has("unitPrice"));
/// ```
pub fn validate_entry(form: &EntryForm, memory: &CalculatorMemory) -> Result<LedgerEntry, FieldErrors> {
    let mut errors = FieldErrors::default();

    let code = form.code.trim();
    if code.is_empty() {
        errors.push(fields::CODE, "Code is required.");
    }

    let unit_price = parse_non_negative_price(&form.unit_price);
    if unit_price.is_none() {
        errors.push(fields::UNIT_PRICE, "Valid unit price is required.");
    }

    let current_price = if form.entry_type.requires_current_price() {
        let parsed = parse_non_negative_price(&form.current_price);
        if parsed.is_none() {
            errors.push(fields::CURRENT_PRICE, "Valid current price required.");
        }
        parsed
    } else {
        None
    };

    let case_price = unit_price.and_then(|price| price.multiply_quantity(memory.units as i64));
    if unit_price.is_some() && case_price.is_none() {
        errors.push(fields::UNIT_PRICE, "Unit price is too large for this many units.");
    }

    let (unit_price, case_price) = match (unit_price, case_price) {
        (Some(unit_price), Some(case_price)) if errors.is_empty() => (unit_price, case_price),
        _ => return Err(errors),
    };

    Ok(LedgerEntry {
        code: code.to_string(),
        name: form.name.trim().to_string(),
        supplier: form.effective_supplier().to_string(),
        units: memory.units,
        discount: memory.discount,
        vat: memory.vat,
        unit_price,
        case_price,
        entry_type: form.entry_type,
        current_price,
    })
}

// =============================================================================
// Shared Validators
// =============================================================================

/// Validates a required text field and returns it trimmed.
pub fn require_text(field: &str, value: &str) -> ValidationResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::required(field));
    }
    Ok(value.to_string())
}

/// Validates a search query.
///
/// ## Rules
/// - Can be empty (returns everything / nothing, depending on the search)
/// - Maximum 100 characters
///
/// ## Returns
/// The trimmed query string.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > 100 {
        return Err(ValidationError::OutOfRange {
            field: "query".to_string(),
            min: 0,
            max: 100,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Unit Tests
// =============================================================================
