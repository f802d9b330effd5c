//! # kero-core: Pure Domain Logic for the Kero Store Tools
//!
//! Pricing, ledger, search, shelf-label, returns and session rules, as pure
//! functions with no I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Kero Store Tools                                  │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    kero CLI (apps/cli)                          │   │
//! │  │   price ─ catalog ─ search ─ ledger ─ labels ─ returns ─ users  │   │
//! │  └──────────────┬──────────────────────────────────┬───────────────┘   │
//! │                 │                                  │                    │
//! │  ┌──────────────▼──────────────────┐  ┌────────────▼────────────────┐  │
//! │  │        kero-store               │  │        kero-remote          │  │
//! │  │  local key/value storage        │  │  spreadsheet endpoints      │  │
//! │  └──────────────┬──────────────────┘  └────────────┬────────────────┘  │
//! │                 │                                  │                    │
//! │  ┌──────────────▼──────────────────────────────────▼────────────────┐  │
//! │  │               ★ kero-core (THIS CRATE) ★                         │  │
//! │  │                                                                  │  │
//! │  │  money ─ pricing ─ validation ─ ledger ─ search                  │  │
//! │  │  label ─ returns ─ session ─ users                               │  │
//! │  │                                                                  │  │
//! │  │  NO I/O • NO STORAGE • NO NETWORK                                │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Catalog items, ledger entries, branches, percentages
//! - [`money`] - Money as integer thousandths
//! - [`pricing`] - The case/piece price calculator
//! - [`validation`] - Entry form checks
//! - [`ledger`] - The ordered entry list and its export rows
//! - [`search`] - Autocomplete and supplier filtering
//! - [`label`] - Shelf-label selection, print queue and page layout
//! - [`returns`] - Supplier return declarations and the log report filter
//! - [`session`] - Stored login record and permission gate
//! - [`users`] - Account rows and edit payloads
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use kero_core::pricing::price;
//! use kero_core::{Money, Percent};
//!
//! let cost: Money = "100".parse().unwrap();
//! let quote = price(cost, 2, Percent::from_whole(10), Percent::from_whole(14))
//!     .quote()
//!     .unwrap();
//!
//! assert_eq!(quote.unit_price.to_string(), "51.300");
//! assert_eq!(quote.case_price.to_string(), "102.600");
//! ```

use std::time::Duration;

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod label;
pub mod ledger;
pub mod money;
pub mod pricing;
pub mod returns;
pub mod search;
pub mod session;
pub mod types;
pub mod users;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, FieldErrors, ValidationError};
pub use ledger::Ledger;
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Local storage key of the ledger (JSON array).
pub const ENTRIES_KEY: &str = "pricingAppEntries";

/// Local storage key of the selected branch name.
pub const BRANCH_KEY: &str = "pricingAppBranch";

/// Local storage key of the logged-in user record.
pub const SESSION_KEY: &str = "keroUser";

/// Maximum autocomplete suggestions.
pub const SUGGESTION_LIMIT: usize = 10;

/// Quiet period before a search runs.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(250);

/// Inactivity before the session is dropped.
pub const IDLE_TIMEOUT: Duration = Duration::from_secs(15 * 60);
