//! # Domain Types
//!
//! Core domain types shared by the pricing ledger and its neighbours.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  CatalogItem    │   │  LedgerEntry    │   │    Branch       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  code           │   │  code, name     │   │  one of the     │       │
//! │  │  name           │   │  supplier       │   │  BRANCH_NAMES   │       │
//! │  │  supplier       │   │  units          │   │                 │       │
//! │  └─────────────────┘   │  discount, vat  │   └─────────────────┘       │
//! │                        │  piece, case    │                              │
//! │  ┌─────────────────┐   │  type, current  │   ┌─────────────────┐       │
//! │  │    Percent      │   └─────────────────┘   │   EntryType     │       │
//! │  │  ─────────────  │                         │  ─────────────  │       │
//! │  │  bps (i64)      │                         │  Purchase شراء  │       │
//! │  │  1400 = 14%     │                         │  Return  مرتجع  │       │
//! │  └─────────────────┘                         └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The serialized shapes match what the browser pages keep in local storage
//! and what the spreadsheet endpoint returns, so a ledger written here can be
//! read back there.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::{CoreError, ValidationError};
use crate::money::{self, numeric_prefix, parse_scaled, Money};

// =============================================================================
// Percent
// =============================================================================

/// A percentage held in basis points (1 bp = 0.01 %).
///
/// Discount and VAT both use this type. Serialized as a plain JSON number
/// of percent (`14`, `12.5`), which is how the pages store them.
///
/// ## Example
/// ```rust
/// use kero_core::types::Percent;
///
/// let vat: Percent = "14".parse().unwrap();
/// assert_eq!(vat.bps(), 1400);
/// assert_eq!(vat.to_string(), "14");
/// assert_eq!(Percent::from_bps(1250).to_string(), "12.5");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Percent(i64);

impl Percent {
    /// Creates a percentage from basis points.
    #[inline]
    pub const fn from_bps(bps: i64) -> Self {
        Percent(bps)
    }

    /// Creates a percentage from a whole number of percent.
    #[inline]
    pub const fn from_whole(pct: i64) -> Self {
        Percent(pct * 100)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> i64 {
        self.0
    }

    /// Zero percent.
    #[inline]
    pub const fn zero() -> Self {
        Percent(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// `parseFloat(value) || 0` for percentage fields.
    pub fn parse_lenient(input: &str) -> Percent {
        numeric_prefix(input)
            .and_then(|prefix| parse_scaled(prefix, 2))
            .and_then(|value| i64::try_from(value).ok())
            .map(Percent)
            .unwrap_or_default()
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let whole = abs / 100;
        let frac = abs % 100;
        if frac == 0 {
            write!(f, "{}{}", sign, whole)
        } else if frac % 10 == 0 {
            write!(f, "{}{}.{}", sign, whole, frac / 10)
        } else {
            write!(f, "{}{}.{:02}", sign, whole, frac)
        }
    }
}

impl FromStr for Percent {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_scaled(s, 2)
            .and_then(|value| i64::try_from(value).ok())
            .map(Percent)
            .ok_or_else(|| {
                ValidationError::invalid_format("percent", format!("'{}' is not a number", s.trim()))
            })
    }
}

impl Serialize for Percent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0 % 100 == 0 {
            serializer.serialize_i64(self.0 / 100)
        } else {
            serializer.serialize_f64(self.0 as f64 / 100.0)
        }
    }
}

impl<'de> Deserialize<'de> for Percent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde::de::Error as _;
        let value = serde_json::Value::deserialize(deserializer)?;
        match &value {
            serde_json::Value::Null => Ok(Percent::zero()),
            serde_json::Value::Number(n) => n.to_string().parse().map_err(D::Error::custom),
            serde_json::Value::String(s) if s.trim().is_empty() => Ok(Percent::zero()),
            serde_json::Value::String(s) => s.parse().map_err(D::Error::custom),
            other => Err(D::Error::custom(format!("expected a percentage, got {}", other))),
        }
    }
}

// =============================================================================
// Loose Text Fields
// =============================================================================

/// Deserializes spreadsheet cells that may arrive as text or numbers.
///
/// Item codes such as `1001` come back from the sheet as JSON numbers; the
/// pages always compare them as strings (`String(item.code)`).
pub mod loose {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    /// Cell text, with numbers rendered the way a browser prints them.
    pub fn to_text(value: &Value) -> String {
        match value {
            Value::Null => String::new(),
            Value::String(s) => s.clone(),
            Value::Number(n) => match n.as_f64() {
                Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
                _ => n.to_string(),
            },
            Value::Bool(b) => b.to_string(),
            other => other.to_string(),
        }
    }

    pub fn string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(to_text(&value))
    }

    pub fn option_string<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<String>, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let text = to_text(&value);
        Ok(if text.trim().is_empty() { None } else { Some(text) })
    }
}

// =============================================================================
// Catalog Item
// =============================================================================

/// One row of the item database returned by `getItemDatabase`.
///
/// `code` is not unique: the same item can appear once per supplier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CatalogItem {
    #[serde(deserialize_with = "loose::string", default)]
    pub code: String,

    #[serde(deserialize_with = "loose::string", default)]
    pub name: String,

    #[serde(rename = "supplier name", deserialize_with = "loose::string", default)]
    pub supplier: String,
}

impl CatalogItem {
    pub fn new(code: impl Into<String>, name: impl Into<String>, supplier: impl Into<String>) -> Self {
        CatalogItem {
            code: code.into(),
            name: name.into(),
            supplier: supplier.into(),
        }
    }
}

// =============================================================================
// Entry Type
// =============================================================================

/// Whether a ledger line records a purchase price or a supplier return.
///
/// Stored with the Arabic labels the pricing sheet uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum EntryType {
    #[default]
    #[serde(rename = "شراء", alias = "purchase")]
    Purchase,

    #[serde(rename = "مرتجع", alias = "return")]
    Return,
}

impl EntryType {
    /// Sheet label for this type.
    pub fn label(&self) -> &'static str {
        match self {
            EntryType::Purchase => "شراء",
            EntryType::Return => "مرتجع",
        }
    }

    /// Returns need the shelf price at the time of the return.
    pub fn requires_current_price(&self) -> bool {
        matches!(self, EntryType::Return)
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for EntryType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "purchase" | "شراء" => Ok(EntryType::Purchase),
            "return" | "مرتجع" => Ok(EntryType::Return),
            _ => Err(ValidationError::NotAllowed {
                field: "type".to_string(),
                allowed: vec!["purchase".to_string(), "return".to_string()],
            }),
        }
    }
}

// =============================================================================
// Ledger Entry
// =============================================================================

/// A confirmed line in the local pricing ledger.
///
/// ## Invariants
/// - `case_price == unit_price × units`, fixed when the line is added
/// - `unit_price >= 0`
/// - `current_price` is present (and `>= 0`) exactly for returns
///
/// Lines are never edited in place; they are only deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LedgerEntry {
    pub code: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub supplier: String,

    /// Pieces per case used for the case price.
    pub units: u32,

    #[ts(type = "number")]
    pub discount: Percent,

    #[ts(type = "number")]
    pub vat: Percent,

    /// Price per piece.
    #[serde(rename = "piece", with = "money::decimal")]
    #[ts(type = "string")]
    pub unit_price: Money,

    /// Price per case (`piece × units`).
    #[serde(rename = "case", with = "money::decimal")]
    #[ts(type = "string")]
    pub case_price: Money,

    #[serde(rename = "type")]
    pub entry_type: EntryType,

    /// Shelf price at return time. Serialized as `""` for purchases.
    #[serde(rename = "current", with = "money::decimal::option", default)]
    #[ts(type = "string")]
    pub current_price: Option<Money>,
}

// =============================================================================
// Branch
// =============================================================================

/// Every branch and warehouse that can own a pricing ledger.
pub const BRANCH_NAMES: [&str; 17] = [
    "جاردنز السخنة",
    "تلال السخنة",
    "ستلا",
    "دبلو",
    "تلال الساحل",
    "سوان ليك",
    "كسكادا",
    "لافيستا باي",
    "لافيستا راس الحكمة",
    "لازوردي باي",
    "نادي هليوبوليس",
    "بالم هيلز",
    "القطامية",
    "العاصمة",
    "فوكا",
    "مخزن بلبيس",
    "مخزن الساحل",
];

/// The branch the current ledger belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Branch(String);

impl Branch {
    /// Validates a branch name against [`BRANCH_NAMES`].
    ///
    /// Matching trims surrounding whitespace but is otherwise exact.
    pub fn parse(name: &str) -> Result<Branch, CoreError> {
        let name = name.trim();
        BRANCH_NAMES
            .iter()
            .find(|b| **b == name)
            .map(|b| Branch((*b).to_string()))
            .ok_or_else(|| CoreError::UnknownBranch(name.to_string()))
    }

    /// Picks a branch by its 1-based position in [`BRANCH_NAMES`].
    pub fn by_position(position: usize) -> Option<Branch> {
        position
            .checked_sub(1)
            .and_then(|i| BRANCH_NAMES.get(i))
            .map(|b| Branch((*b).to_string()))
    }

    /// All branches in display order.
    pub fn all() -> impl Iterator<Item = Branch> {
        BRANCH_NAMES.iter().map(|b| Branch((*b).to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
