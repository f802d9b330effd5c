//! # Supplier Returns
//!
//! Return declarations signed by supplier representatives, and the filters
//! used on the per-branch log report.
//!
//! ## Sheet Shapes
//! ```text
//! getSuppliers ─► [{ SupplierCode, SupplierName, cr, taxid }]
//! getBranches  ─► [{ BranchCode, BranchName }]
//! getLogs      ─► [{ Timestamp, BranchCode, SupplierCode, SupplierName,
//!                    SupplierCR, SupplierTaxID, RepresentativeName,
//!                    RepresentativeID, ReturnType, ReturnValue, ReturnSerial }]
//! ```

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::FieldErrors;
use crate::money::Money;
use crate::types::loose;

/// Minimum query length before the supplier search runs.
pub const SUPPLIER_SEARCH_MIN_CHARS: usize = 2;

// =============================================================================
// Reference Data
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnSupplier {
    #[serde(rename = "SupplierCode", deserialize_with = "loose::string", default)]
    pub code: String,

    #[serde(rename = "SupplierName", deserialize_with = "loose::string", default)]
    pub name: String,

    /// Commercial registration number.
    #[serde(rename = "cr", deserialize_with = "loose::string", default)]
    pub cr: String,

    #[serde(rename = "taxid", deserialize_with = "loose::string", default)]
    pub tax_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnBranch {
    #[serde(rename = "BranchCode", deserialize_with = "loose::string", default)]
    pub code: String,

    #[serde(rename = "BranchName", deserialize_with = "loose::string", default)]
    pub name: String,
}

/// Suppliers whose name (case-insensitive) or code contains the query.
///
/// Queries shorter than two characters return nothing.
pub fn search_suppliers<'a>(suppliers: &'a [ReturnSupplier], query: &str) -> Vec<&'a ReturnSupplier> {
    let needle = query.to_lowercase();
    if needle.chars().count() < SUPPLIER_SEARCH_MIN_CHARS {
        return Vec::new();
    }
    suppliers
        .iter()
        .filter(|s| s.name.to_lowercase().contains(&needle) || s.code.contains(&needle))
        .collect()
}

/// Branch matching the user's assigned code, compared as trimmed text.
pub fn find_assigned_branch<'a>(
    branches: &'a [ReturnBranch],
    assigned_code: Option<&str>,
) -> Option<&'a ReturnBranch> {
    let code = assigned_code?.trim();
    if code.is_empty() {
        return None;
    }
    branches.iter().find(|b| b.code.trim() == code)
}

// =============================================================================
// Return Log
// =============================================================================

/// Whether the representative took goods back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReturnType {
    #[serde(rename = "HAS_RETURNS")]
    HasReturns,

    #[default]
    #[serde(rename = "NO_RETURNS")]
    NoReturns,
}

impl ReturnType {
    /// Report label.
    pub fn label(&self) -> &'static str {
        match self {
            ReturnType::HasReturns => "مرتجع متوفر",
            ReturnType::NoReturns => "لا يوجد مرتجع",
        }
    }
}

/// A saved return declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnLog {
    /// ISO-8601 creation time, kept as sent.
    #[serde(rename = "Timestamp", deserialize_with = "loose::string", default)]
    pub timestamp: String,

    #[serde(rename = "BranchCode", deserialize_with = "loose::string", default)]
    pub branch_code: String,

    #[serde(rename = "SupplierCode", deserialize_with = "loose::string", default)]
    pub supplier_code: String,

    #[serde(rename = "SupplierName", deserialize_with = "loose::string", default)]
    pub supplier_name: String,

    #[serde(rename = "SupplierCR", deserialize_with = "loose::string", default)]
    pub supplier_cr: String,

    #[serde(rename = "SupplierTaxID", deserialize_with = "loose::string", default)]
    pub supplier_tax_id: String,

    #[serde(rename = "RepresentativeName", deserialize_with = "loose::string", default)]
    pub representative_name: String,

    #[serde(rename = "RepresentativeID", deserialize_with = "loose::string", default)]
    pub representative_id: String,

    #[serde(rename = "ReturnType", default)]
    pub return_type: ReturnType,

    /// Empty for `NO_RETURNS`.
    #[serde(rename = "ReturnValue", deserialize_with = "loose::string", default)]
    pub return_value: String,

    /// Empty for `NO_RETURNS`.
    #[serde(rename = "ReturnSerial", deserialize_with = "loose::string", default)]
    pub return_serial: String,
}

impl ReturnLog {
    /// Parsed timestamp; `None` when the sheet holds something unparsable.
    pub fn timestamp_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(self.timestamp.trim())
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

/// Representative-entered part of a declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReturnDraft {
    pub representative_name: String,
    pub representative_id: String,
    pub return_type: ReturnType,
    pub return_value: String,
    pub return_serial: String,
}

/// Builds the log to save, or the fields that are missing.
///
/// Value and serial are only read (and only required) for `HAS_RETURNS`.
pub fn build_return_log(
    branch: &ReturnBranch,
    supplier: &ReturnSupplier,
    draft: &ReturnDraft,
    now: DateTime<Utc>,
) -> Result<ReturnLog, FieldErrors> {
    let mut errors = FieldErrors::default();

    let representative_name = draft.representative_name.trim();
    if representative_name.is_empty() {
        errors.push("representativeName", "Representative name is required.");
    }
    let representative_id = draft.representative_id.trim();
    if representative_id.is_empty() {
        errors.push("representativeId", "Representative ID is required.");
    }

    let (return_value, return_serial) = match draft.return_type {
        ReturnType::HasReturns => {
            let value = draft.return_value.trim();
            if value.parse::<Money>().map_or(true, |m| m.is_negative()) {
                errors.push("returnValue", "Return value is required.");
            }
            let serial = draft.return_serial.trim();
            if serial.is_empty() {
                errors.push("returnSerial", "Return serial is required.");
            }
            (value.to_string(), serial.to_string())
        }
        ReturnType::NoReturns => (String::new(), String::new()),
    };

    errors.into_result(ReturnLog {
        timestamp: now.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        branch_code: branch.code.clone(),
        supplier_code: supplier.code.clone(),
        supplier_name: supplier.name.clone(),
        supplier_cr: supplier.cr.clone(),
        supplier_tax_id: supplier.tax_id.clone(),
        representative_name: representative_name.to_string(),
        representative_id: representative_id.to_string(),
        return_type: draft.return_type,
        return_value,
        return_serial,
    })
}

// =============================================================================
// Report Filter
// =============================================================================

/// Filter for the log report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogFilter {
    /// Only logs of this branch.
    pub branch_code: String,

    /// Case-insensitive match on supplier or representative name.
    pub text: String,

    /// Inclusive, from the start of the day.
    pub from: Option<NaiveDate>,

    /// Inclusive, to the last millisecond of the day.
    pub to: Option<NaiveDate>,
}

impl LogFilter {
    /// Applies the filter with day boundaries taken in `tz`.
    pub fn apply<'a, Tz: TimeZone>(&self, logs: &'a [ReturnLog], tz: &Tz) -> Vec<&'a ReturnLog> {
        let from = self
            .from
            .and_then(|d| d.and_hms_milli_opt(0, 0, 0, 0))
            .and_then(|dt| tz.from_local_datetime(&dt).earliest())
            .map(|dt| dt.with_timezone(&Utc));
        let to = self
            .to
            .and_then(|d| d.and_hms_milli_opt(23, 59, 59, 999))
            .and_then(|dt| tz.from_local_datetime(&dt).latest())
            .map(|dt| dt.with_timezone(&Utc));
        let needle = self.text.to_lowercase();
        let branch = self.branch_code.trim();

        logs.iter()
            .filter(|log| log.branch_code.trim() == branch)
            .filter(|log| {
                log.supplier_name.to_lowercase().contains(&needle)
                    || log.representative_name.to_lowercase().contains(&needle)
            })
            .filter(|log| {
                if from.is_none() && to.is_none() {
                    return true;
                }
                let Some(at) = log.timestamp_utc() else {
                    return false;
                };
                from.map_or(true, |f| at >= f) && to.map_or(true, |t| at <= t)
            })
            .collect()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn suppliers() -> Vec<ReturnSupplier> {
        serde_json::from_value(json!([
            {"SupplierCode": 501, "SupplierName": "Nile Foods", "cr": 1234, "taxid": "T-9"},
            {"SupplierCode": "502", "SupplierName": "Delta Dairy", "cr": "", "taxid": ""}
        ]))
        .unwrap()
    }

    fn log(branch: &str, supplier: &str, rep: &str, ts: &str) -> ReturnLog {
        ReturnLog {
            timestamp: ts.to_string(),
            branch_code: branch.to_string(),
            supplier_code: "501".to_string(),
            supplier_name: supplier.to_string(),
            supplier_cr: String::new(),
            supplier_tax_id: String::new(),
            representative_name: rep.to_string(),
            representative_id: "R1".to_string(),
            return_type: ReturnType::NoReturns,
            return_value: String::new(),
            return_serial: String::new(),
        }
    }

    #[test]
    fn test_supplier_search() {
        let suppliers = suppliers();
        assert!(search_suppliers(&suppliers, "n").is_empty());
        assert_eq!(search_suppliers(&suppliers, "NILE")[0].code, "501");
        assert_eq!(search_suppliers(&suppliers, "50").len(), 2);
        assert_eq!(suppliers[0].cr, "1234");
    }

    #[test]
    fn test_assigned_branch_trimmed_compare() {
        let branches: Vec<ReturnBranch> =
            serde_json::from_value(json!([{"BranchCode": 7, "BranchName": "Hills"}])).unwrap();
        assert_eq!(find_assigned_branch(&branches, Some(" 7 ")).unwrap().name, "Hills");
        assert!(find_assigned_branch(&branches, Some("8")).is_none());
        assert!(find_assigned_branch(&branches, None).is_none());
    }

    #[test]
    fn test_build_log_no_returns_ignores_value() {
        let branch = ReturnBranch { code: "7".into(), name: "Hills".into() };
        let supplier = &suppliers()[0];
        let draft = ReturnDraft {
            representative_name: " Omar ".into(),
            representative_id: "99".into(),
            return_type: ReturnType::NoReturns,
            return_value: "100".into(),
            return_serial: "S1".into(),
        };
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 10, 30, 0).unwrap();
        let log = build_return_log(&branch, supplier, &draft, now).unwrap();

        assert_eq!(log.timestamp, "2024-05-01T10:30:00.000Z");
        assert_eq!(log.representative_name, "Omar");
        assert_eq!(log.return_value, "");
        assert_eq!(log.supplier_tax_id, "T-9");

        let json = serde_json::to_value(&log).unwrap();
        assert_eq!(json["ReturnType"], "NO_RETURNS");
        assert_eq!(json["SupplierCR"], "1234");
    }

    #[test]
    fn test_build_log_has_returns_requires_details() {
        let branch = ReturnBranch::default();
        let supplier = ReturnSupplier::default();
        let mut draft = ReturnDraft {
            representative_name: "Omar".into(),
            representative_id: "99".into(),
            return_type: ReturnType::HasReturns,
            ..Default::default()
        };
        let errors = build_return_log(&branch, &supplier, &draft, Utc::now()).unwrap_err();
        assert!(errors.has("returnValue"));
        assert!(errors.has("returnSerial"));

        draft.return_value = "250.5".into();
        draft.return_serial = "SR-1".into();
        let log = build_return_log(&branch, &supplier, &draft, Utc::now()).unwrap();
        assert_eq!(log.return_value, "250.5");
    }

    #[test]
    fn test_log_filter() {
        let logs = vec![
            log("7", "Nile Foods", "Omar", "2024-05-01T10:00:00.000Z"),
            log(" 7", "Delta Dairy", "Sara", "2024-05-03T23:59:59.500Z"),
            log("8", "Nile Foods", "Omar", "2024-05-02T10:00:00.000Z"),
            log("7", "Nile Foods", "Omar", "not a date"),
        ];

        let mut filter = LogFilter {
            branch_code: "7".into(),
            ..Default::default()
        };
        assert_eq!(filter.apply(&logs, &Utc).len(), 3);

        filter.text = "SARA".into();
        assert_eq!(filter.apply(&logs, &Utc).len(), 1);

        filter.text.clear();
        filter.from = NaiveDate::from_ymd_opt(2024, 5, 2);
        filter.to = NaiveDate::from_ymd_opt(2024, 5, 3);
        let hits = filter.apply(&logs, &Utc);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].supplier_name, "Delta Dairy");
    }
}
