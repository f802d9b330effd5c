//! # Ledger
//!
//! The local list of confirmed pricing lines.
//!
//! ## Ledger Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Ledger Operations                                 │
//! │                                                                         │
//! │  Operator Action        Ledger Call              Effect                 │
//! │  ───────────────        ───────────              ──────                 │
//! │                                                                         │
//! │  Add entry ───────────► append(entry) ─────────► entries.push(entry)   │
//! │                                                                         │
//! │  Delete row #k ───────► remove(k) ─────────────► entries.remove(k-1)   │
//! │                                                   (later rows shift up) │
//! │                                                                         │
//! │  Clear all ───────────► clear() ───────────────► entries.clear()       │
//! │                                                                         │
//! │  View / Export ───────► rows() / export_rows() ► read only             │
//! │                                                                         │
//! │  The caller persists the whole list after every mutation.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::types::{Branch, LedgerEntry};

/// Column headers of the exported sheet, in order.
pub const EXPORT_HEADERS: [&str; 11] = [
    "#",
    "Code",
    "Name",
    "Supplier",
    "Units",
    "Discount (%)",
    "VAT (%)",
    "Piece Price",
    "Case Price",
    "Type",
    "Current Price",
];

/// Base name of the exported sheet.
pub const EXPORT_BASE_NAME: &str = "pricing_entries";

/// Ordered list of ledger entries.
///
/// Serializes as a bare JSON array, the same shape kept in local storage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ledger {
    entries: Vec<LedgerEntry>,
}

impl Ledger {
    pub fn new() -> Self {
        Ledger::default()
    }

    pub fn from_entries(entries: Vec<LedgerEntry>) -> Self {
        Ledger { entries }
    }

    /// Appends an already validated entry.
    pub fn append(&mut self, entry: LedgerEntry) {
        self.entries.push(entry);
    }

    /// Removes the entry at a 1-based table position.
    pub fn remove(&mut self, position: usize) -> CoreResult<LedgerEntry> {
        let len = self.entries.len();
        if position == 0 || position > len {
            return Err(CoreError::EntryNotFound { position, len });
        }
        Ok(self.entries.remove(position - 1))
    }

    /// Entry at a 1-based table position.
    pub fn get(&self, position: usize) -> Option<&LedgerEntry> {
        position.checked_sub(1).and_then(|i| self.entries.get(i))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<LedgerEntry> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rows for the table view, numbered from 1.
    pub fn rows(&self) -> impl Iterator<Item = (usize, &LedgerEntry)> {
        self.entries.iter().enumerate().map(|(i, e)| (i + 1, e))
    }

    /// Snapshot of the ledger as export rows.
    ///
    /// Fails with [`CoreError::NothingToExport`] when the ledger is empty.
    pub fn export_rows(&self) -> CoreResult<Vec<ExportRow>> {
        if self.entries.is_empty() {
            return Err(CoreError::NothingToExport);
        }
        Ok(self
            .rows()
            .map(|(position, entry)| ExportRow::from_entry(position, entry))
            .collect())
    }
}

/// File name for an export, prefixed with the branch when one is selected.
///
/// ## Example
/// ```rust
/// use kero_core::ledger::export_file_name;
///
/// assert_eq!(export_file_name(None), "pricing_entries.csv");
/// ```
pub fn export_file_name(branch: Option<&Branch>) -> String {
    match branch {
        Some(branch) => format!("{}_{}.csv", branch.as_str(), EXPORT_BASE_NAME),
        None => format!("{}.csv", EXPORT_BASE_NAME),
    }
}

// =============================================================================
// Export Row
// =============================================================================

/// One exported sheet row. Field names are the sheet headers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRow {
    #[serde(rename = "#")]
    pub position: usize,
    #[serde(rename = "Code")]
    pub code: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Supplier")]
    pub supplier: String,
    #[serde(rename = "Units")]
    pub units: u32,
    #[serde(rename = "Discount (%)")]
    pub discount: String,
    #[serde(rename = "VAT (%)")]
    pub vat: String,
    #[serde(rename = "Piece Price")]
    pub piece_price: String,
    #[serde(rename = "Case Price")]
    pub case_price: String,
    #[serde(rename = "Type")]
    pub entry_type: String,
    #[serde(rename = "Current Price")]
    pub current_price: String,
}

impl ExportRow {
    pub fn from_entry(position: usize, entry: &LedgerEntry) -> Self {
        ExportRow {
            position,
            code: entry.code.clone(),
            name: entry.name.clone(),
            supplier: entry.supplier.clone(),
            units: entry.units,
            discount: entry.discount.to_string(),
            vat: entry.vat.to_string(),
            piece_price: entry.unit_price.to_string(),
            case_price: entry.case_price.to_string(),
            entry_type: entry.entry_type.label().to_string(),
            current_price: entry
                .current_price
                .map(|m| m.to_string())
                .unwrap_or_default(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::types::{EntryType, Percent};

    fn entry(code: &str) -> LedgerEntry {
        LedgerEntry {
            code: code.to_string(),
            name: format!("{code} name"),
            supplier: "X".to_string(),
            units: 2,
            discount: Percent::from_whole(10),
            vat: Percent::from_whole(14),
            unit_price: Money::from_thousandths(51_300),
            case_price: Money::from_thousandths(102_600),
            entry_type: EntryType::Purchase,
            current_price: None,
        }
    }

    #[test]
    fn test_remove_shifts_later_positions() {
        let mut ledger = Ledger::from_entries(vec![entry("A"), entry("B"), entry("C")]);

        let removed = ledger.remove(2).unwrap();
        assert_eq!(removed.code, "B");
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.get(2).unwrap().code, "C");
    }

    #[test]
    fn test_remove_out_of_range() {
        let mut ledger = Ledger::from_entries(vec![entry("A")]);
        assert!(matches!(
            ledger.remove(0),
            Err(CoreError::EntryNotFound { position: 0, len: 1 })
        ));
        assert!(ledger.remove(2).is_err());
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_serializes_as_storage_array() {
        let mut ledger = Ledger::new();
        ledger.append(entry("A1"));

        let json = serde_json::to_value(&ledger).unwrap();
        let first = &json.as_array().unwrap()[0];
        assert_eq!(first["piece"], "51.300");
        assert_eq!(first["case"], "102.600");
        assert_eq!(first["type"], "شراء");
        assert_eq!(first["current"], "");
        assert_eq!(first["discount"], 10);

        let back: Ledger = serde_json::from_value(json).unwrap();
        assert_eq!(back, ledger);
    }

    #[test]
    fn test_export_rows() {
        let mut ledger = Ledger::new();
        assert!(matches!(ledger.export_rows(), Err(CoreError::NothingToExport)));

        ledger.append(entry("A1"));
        let mut ret = entry("B2");
        ret.entry_type = EntryType::Return;
        ret.current_price = Some(Money::from_units(60));
        ledger.append(ret);

        let rows = ledger.export_rows().unwrap();
        assert_eq!(rows[0].position, 1);
        assert_eq!(rows[0].current_price, "");
        assert_eq!(rows[1].position, 2);
        assert_eq!(rows[1].entry_type, "مرتجع");
        assert_eq!(rows[1].current_price, "60.000");
        assert_eq!(rows[1].discount, "10");
    }

    #[test]
    fn test_export_file_name_with_branch() {
        let branch = Branch::by_position(1).unwrap();
        assert_eq!(
            export_file_name(Some(&branch)),
            format!("{}_pricing_entries.csv", branch.as_str())
        );
    }
}
