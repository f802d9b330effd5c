//! # Catalog Search
//!
//! Autocomplete over the item database and the supplier picker filter.
//!
//! ## Autocomplete Decision
//! ```text
//! term (trimmed)
//!   │
//!   ├── empty ─────────────────────────► Hidden
//!   │
//!   ├── some item has code == term ────► Exact(item)      list closes
//!   │
//!   └── otherwise ─── code/name contains term (case-insensitive)
//!                       │
//!                       ├── no matches ► Hidden
//!                       └── first 10 ──► Suggestions([...])
//! ```
//!
//! Debouncing the keystrokes is the caller's concern; everything here is a
//! single synchronous filter pass.

use std::collections::BTreeSet;

use crate::types::CatalogItem;
use crate::SUGGESTION_LIMIT;

/// What the suggestion box should show for a search term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Autocomplete<'a> {
    /// Nothing to show.
    Hidden,

    /// The term is an exact code; the item is resolved and the list closes.
    Exact(&'a CatalogItem),

    /// Up to [`SUGGESTION_LIMIT`] candidates.
    Suggestions(Vec<&'a CatalogItem>),
}

impl<'a> Autocomplete<'a> {
    pub fn is_open(&self) -> bool {
        matches!(self, Autocomplete::Suggestions(_))
    }
}

/// Finds the first item whose code equals `code` exactly.
pub fn find_exact<'a>(catalog: &'a [CatalogItem], code: &str) -> Option<&'a CatalogItem> {
    catalog.iter().find(|item| item.code == code)
}

/// Case-insensitive substring filter on code or name.
///
/// An exact code match, when present, is always first in the result even if
/// it falls outside the first `limit` substring hits.
pub fn filter_catalog<'a>(catalog: &'a [CatalogItem], term: &str, limit: usize) -> Vec<&'a CatalogItem> {
    let term = term.trim();
    if term.is_empty() || limit == 0 {
        return Vec::new();
    }
    let needle = term.to_lowercase();
    let exact = find_exact(catalog, term);

    let mut results: Vec<&CatalogItem> = Vec::with_capacity(limit);
    if let Some(item) = exact {
        results.push(item);
    }
    for item in catalog {
        if results.len() >= limit {
            break;
        }
        if exact.is_some_and(|e| std::ptr::eq(e, item)) {
            continue;
        }
        if item.code.to_lowercase().contains(&needle) || item.name.to_lowercase().contains(&needle) {
            results.push(item);
        }
    }
    results
}

/// Runs one autocomplete pass for a term.
///
/// ## Example
/// ```rust
/// use kero_core::search::{autocomplete, Autocomplete};
/// use kero_core::CatalogItem;
///
/// let catalog = vec![
///     CatalogItem::new("A1", "Widget", "X"),
///     CatalogItem::new("A10", "Widget XL", "Y"),
/// ];
/// assert!(matches!(autocomplete(&catalog, "A1"), Autocomplete::Exact(_)));
/// assert!(matches!(autocomplete(&catalog, "wid"), Autocomplete::Suggestions(v) if v.len() == 2));
/// assert_eq!(autocomplete(&catalog, ""), Autocomplete::Hidden);
/// ```
pub fn autocomplete<'a>(catalog: &'a [CatalogItem], term: &str) -> Autocomplete<'a> {
    let term = term.trim();
    if term.is_empty() {
        return Autocomplete::Hidden;
    }
    if let Some(item) = find_exact(catalog, term) {
        return Autocomplete::Exact(item);
    }
    let suggestions = filter_catalog(catalog, term, SUGGESTION_LIMIT);
    if suggestions.is_empty() {
        Autocomplete::Hidden
    } else {
        Autocomplete::Suggestions(suggestions)
    }
}

/// Name and supplier to fill for a typed code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemDetails {
    pub name: String,
    pub supplier: String,
}

/// Fills name and supplier for an exact code, clears both otherwise.
pub fn item_details(catalog: &[CatalogItem], code: &str) -> ItemDetails {
    match find_exact(catalog, code.trim()) {
        Some(item) => ItemDetails {
            name: item.name.clone(),
            supplier: item.supplier.clone(),
        },
        None => ItemDetails::default(),
    }
}

// =============================================================================
// Supplier Picker
// =============================================================================

/// Distinct supplier names, trimmed, non-empty and sorted.
pub fn supplier_names(catalog: &[CatalogItem]) -> Vec<String> {
    catalog
        .iter()
        .map(|item| item.supplier.trim())
        .filter(|name| !name.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Case-insensitive substring filter over supplier names. No result bound.
pub fn filter_suppliers<'a>(names: &'a [String], query: &str) -> Vec<&'a str> {
    let needle = query.trim().to_lowercase();
    names
        .iter()
        .filter(|name| needle.is_empty() || name.to_lowercase().contains(&needle))
        .map(String::as_str)
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================
