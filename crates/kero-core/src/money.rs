//! # Money Module
//!
//! Provides the `Money` type for handling prices safely.
//!
//! ## Why Integer Thousandths?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    90 × 1.14 = 102.60000000000001  ❌                                   │
//! │                                                                         │
//! │  Store prices carry three decimals (piece and case prices on the       │
//! │  pricing sheet), so every amount is held as an integer count of        │
//! │  thousandths:                                                           │
//! │    102.600 → 102600                                                     │
//! │                                                                         │
//! │  Text from forms and API payloads is parsed straight into that         │
//! │  integer, never through f64.                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use kero_core::money::Money;
//!
//! let cost: Money = "102.6".parse().unwrap();
//! assert_eq!(cost.thousandths(), 102_600);
//! assert_eq!(cost.to_string(), "102.600");
//! assert_eq!(cost.format_fixed(2), "102.60");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;

/// Number of decimal places held by [`Money`].
pub const MONEY_SCALE: u32 = 3;

const THOUSAND: i64 = 1000;

// =============================================================================
// Money Type
// =============================================================================

/// A price in thousandths of the currency unit.
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Calculator cost ──► pricing::price() ──► unit price ──► LedgerEntry    │
/// │                                               │                         │
/// │                                               └─► × units = case price  │
/// │                                                                         │
/// │  Current price (returns) ───────────────────────────────► LedgerEntry   │
/// │  Label price (2 dp on the label) ───────────────────────► PrintJob      │
/// │  Return value ──────────────────────────────────────────► ReturnLog     │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from thousandths.
    ///
    /// ## Example
    /// ```rust
    /// use kero_core::money::Money;
    ///
    /// let price = Money::from_thousandths(51_300); // 51.300
    /// assert_eq!(price.to_string(), "51.300");
    /// ```
    #[inline]
    pub const fn from_thousandths(value: i64) -> Self {
        Money(value)
    }

    /// Creates a Money value from whole units.
    #[inline]
    pub const fn from_units(units: i64) -> Self {
        Money(units * THOUSAND)
    }

    /// Returns the value in thousandths.
    #[inline]
    pub const fn thousandths(&self) -> i64 {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies money by a unit count, `None` on overflow.
    ///
    /// ## Example
    /// ```rust
    /// use kero_core::money::Money;
    ///
    /// let piece = Money::from_thousandths(51_300);
    /// assert_eq!(piece.multiply_quantity(2).unwrap().to_string(), "102.600");
    /// assert!(Money::from_thousandths(i64::MAX).multiply_quantity(2).is_none());
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(value) => Some(Money(value)),
            None => None,
        }
    }

    /// Rounds to fewer decimal places (half away from zero).
    ///
    /// `round_to(2)` turns 12.345 into 12.350. At the ends of the range,
    /// where rounding away would overflow, it rounds toward zero instead.
    pub fn round_to(&self, decimals: u32) -> Money {
        if decimals >= MONEY_SCALE {
            return *self;
        }
        let step = 10_i128.pow(MONEY_SCALE - decimals);
        let rounded = div_round_half_away(self.0 as i128, step) * step;
        let rounded = i64::try_from(rounded)
            .or_else(|_| i64::try_from(rounded - rounded.signum() * step))
            .unwrap_or(self.0);
        Money(rounded)
    }

    /// Formats with a fixed number of decimals (at most three).
    ///
    /// ## Example
    /// ```rust
    /// use kero_core::money::Money;
    ///
    /// let price = Money::from_thousandths(12_345);
    /// assert_eq!(price.format_fixed(3), "12.345");
    /// assert_eq!(price.format_fixed(2), "12.35");
    /// assert_eq!(price.format_fixed(0), "12");
    /// ```
    pub fn format_fixed(&self, decimals: u32) -> String {
        let decimals = decimals.min(MONEY_SCALE);
        let rounded = self.round_to(decimals).0;
        let sign = if rounded < 0 { "-" } else { "" };
        let abs = rounded.unsigned_abs();
        let whole = abs / THOUSAND as u64;
        if decimals == 0 {
            return format!("{}{}", sign, whole);
        }
        let frac = (abs % THOUSAND as u64) / 10_u64.pow(MONEY_SCALE - decimals);
        format!(
            "{}{}.{:0width$}",
            sign,
            whole,
            frac,
            width = decimals as usize
        )
    }

    /// Parses the leading number of a form field, the way a browser's
    /// `parseFloat(value) || 0` does.
    ///
    /// Empty or non-numeric text yields zero; trailing junk is ignored.
    ///
    /// ## Example
    /// ```rust
    /// use kero_core::money::Money;
    ///
    /// assert_eq!(Money::parse_lenient("12.5abc").thousandths(), 12_500);
    /// assert_eq!(Money::parse_lenient("").thousandths(), 0);
    /// assert_eq!(Money::parse_lenient("abc").thousandths(), 0);
    /// ```
    pub fn parse_lenient(input: &str) -> Money {
        Money::parse_prefix(input).unwrap_or_default()
    }

    /// Parses the leading number of a form field, `None` where a browser's
    /// `parseFloat` would give `NaN`.
    ///
    /// ## Example
    /// ```rust
    /// use kero_core::money::Money;
    ///
    /// assert_eq!(Money::parse_prefix("4.5 EGP").map(|m| m.thousandths()), Some(4_500));
    /// assert_eq!(Money::parse_prefix("EGP"), None);
    /// ```
    pub fn parse_prefix(input: &str) -> Option<Money> {
        numeric_prefix(input)
            .and_then(|prefix| parse_scaled(prefix, MONEY_SCALE))
            .and_then(|value| i64::try_from(value).ok())
            .map(Money)
    }
}

// =============================================================================
// Decimal Text Parsing
// =============================================================================

/// Integer division rounding half away from zero.
pub(crate) fn div_round_half_away(numerator: i128, denominator: i128) -> i128 {
    let (n, d) = (numerator.unsigned_abs(), denominator.unsigned_abs());
    let (quotient, remainder) = (n / d, n % d);
    let magnitude = (quotient + u128::from(remainder >= d - remainder)) as i128;
    if (numerator < 0) != (denominator < 0) {
        -magnitude
    } else {
        magnitude
    }
}

/// Parses decimal text into an integer scaled by `10^scale`.
///
/// Accepts an optional sign, digits with an optional fractional part and an
/// optional exponent (`1e-3`, as JSON serializers emit for small floats).
/// Extra precision is rounded half away from zero.
pub(crate) fn parse_scaled(input: &str, scale: u32) -> Option<i128> {
    let s = input.trim();
    let (negative, rest) = match s.as_bytes().first()? {
        b'-' => (true, &s[1..]),
        b'+' => (false, &s[1..]),
        _ => (false, s),
    };

    let (mantissa, exponent) = match rest.find(['e', 'E']) {
        Some(pos) => (&rest[..pos], rest[pos + 1..].parse::<i32>().ok()?),
        None => (rest, 0),
    };

    let (int_part, frac_part) = match mantissa.split_once('.') {
        Some((i, f)) => (i, f),
        None => (mantissa, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    if !int_part.bytes().chain(frac_part.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }

    let digits = format!("{}{}", int_part, frac_part);
    let digits = digits.trim_start_matches('0');
    if digits.len() > 36 {
        return None;
    }
    let magnitude: i128 = if digits.is_empty() { 0 } else { digits.parse().ok()? };

    let shift = exponent as i64 - frac_part.len() as i64 + scale as i64;
    let scaled = if shift >= 0 {
        if shift > 36 {
            return if magnitude == 0 { Some(0) } else { None };
        }
        magnitude.checked_mul(10_i128.pow(shift as u32))?
    } else if -shift > 36 {
        0
    } else {
        div_round_half_away(magnitude, 10_i128.pow((-shift) as u32))
    };

    Some(if negative { -scaled } else { scaled })
}

/// Returns the longest leading slice of `input` that reads as a number,
/// skipping leading whitespace. `None` when no digit leads the text.
pub(crate) fn numeric_prefix(input: &str) -> Option<&str> {
    let s = input.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digit_count = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digit_count += frac_end - frac_start;
        if digit_count > 0 {
            end = frac_end;
        }
    }
    if digit_count == 0 {
        return None;
    }

    // Exponent only counts when digits follow it.
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    Some(&s[..end])
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Three-decimal display, as shown in the ledger table ("51.300").
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_fixed(MONEY_SCALE))
    }
}

impl FromStr for Money {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_scaled(s, MONEY_SCALE)
            .and_then(|value| i64::try_from(value).ok())
            .map(Money)
            .ok_or_else(|| ValidationError::invalid_format("amount", format!("'{}' is not a number", s.trim())))
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Serde Helpers
// =============================================================================

/// Reads money from a JSON number or numeric string, and writes it back as a
/// three-decimal string.
///
/// Spreadsheet endpoints send prices as plain numbers (`12.5`) or as the text
/// typed into a cell (`"12.5"`, or `""` for nothing).
///
/// ## Usage
/// ```rust
/// use kero_core::money::{self, Money};
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Row {
///     #[serde(with = "money::decimal")]
///     price: Money,
/// }
///
/// let row: Row = serde_json::from_str(r#"{"price": 12.5}"#).unwrap();
/// assert_eq!(row.price.thousandths(), 12_500);
/// ```
pub mod decimal {
    use super::Money;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;

    pub fn serialize<S: Serializer>(value: &Money, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Money, D::Error> {
        let value = Value::deserialize(deserializer)?;
        from_value(&value).map_err(D::Error::custom)
    }

    /// Converts a loose JSON value to Money. Empty strings and null are zero.
    pub fn from_value(value: &Value) -> Result<Money, String> {
        match value {
            Value::Null => Ok(Money::zero()),
            Value::Number(n) => n
                .to_string()
                .parse()
                .map_err(|e: crate::ValidationError| e.to_string()),
            Value::String(s) if s.trim().is_empty() => Ok(Money::zero()),
            Value::String(s) => s.parse().map_err(|e: crate::ValidationError| e.to_string()),
            other => Err(format!("expected a number, got {}", other)),
        }
    }

    /// Same as the module, for `Option<Money>` fields where blank means `None`.
    pub mod option {
        use super::super::Money;
        use serde::de::Error as _;
        use serde::{Deserialize, Deserializer, Serializer};
        use serde_json::Value;

        pub fn serialize<S: Serializer>(
            value: &Option<Money>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(money) => serializer.serialize_str(&money.to_string()),
                None => serializer.serialize_str(""),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<Money>, D::Error> {
            let value = Value::deserialize(deserializer)?;
            match &value {
                Value::Null => Ok(None),
                Value::String(s) if s.trim().is_empty() => Ok(None),
                other => super::from_value(other).map(Some).map_err(D::Error::custom),
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_thousandths() {
        let money = Money::from_thousandths(51_300);
        assert_eq!(money.thousandths(), 51_300);
        assert_eq!(Money::from_units(7).thousandths(), 7_000);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_thousandths(51_300).to_string(), "51.300");
        assert_eq!(Money::from_thousandths(5).to_string(), "0.005");
        assert_eq!(Money::from_thousandths(-1_250).to_string(), "-1.250");
        assert_eq!(Money::zero().to_string(), "0.000");
    }

    #[test]
    fn test_format_fixed_rounds_half_away_from_zero() {
        assert_eq!(Money::from_thousandths(12_345).format_fixed(2), "12.35");
        assert_eq!(Money::from_thousandths(-12_345).format_fixed(2), "-12.35");
        assert_eq!(Money::from_thousandths(12_344).format_fixed(2), "12.34");
        assert_eq!(Money::from_thousandths(9_995).format_fixed(2), "10.00");
        assert_eq!(Money::from_thousandths(-4).format_fixed(2), "0.00");
    }

    #[test]
    fn test_parse_strict() {
        assert_eq!("102.6".parse::<Money>().unwrap().thousandths(), 102_600);
        assert_eq!("  7 ".parse::<Money>().unwrap().thousandths(), 7_000);
        assert_eq!(".5".parse::<Money>().unwrap().thousandths(), 500);
        assert_eq!("-3.25".parse::<Money>().unwrap().thousandths(), -3_250);
        assert_eq!("1.0005".parse::<Money>().unwrap().thousandths(), 1_001);
        assert_eq!("1e-3".parse::<Money>().unwrap().thousandths(), 1);
        assert_eq!("2.5E2".parse::<Money>().unwrap().thousandths(), 250_000);

        assert!("".parse::<Money>().is_err());
        assert!("abc".parse::<Money>().is_err());
        assert!("1.2.3".parse::<Money>().is_err());
        assert!("12abc".parse::<Money>().is_err());
        assert!(".".parse::<Money>().is_err());
    }

    #[test]
    fn test_parse_lenient_matches_browser_number_fields() {
        assert_eq!(Money::parse_lenient("12.5kg").thousandths(), 12_500);
        assert_eq!(Money::parse_lenient("  3").thousandths(), 3_000);
        assert_eq!(Money::parse_lenient("-2").thousandths(), -2_000);
        assert_eq!(Money::parse_lenient("1e2x").thousandths(), 100_000);
        assert_eq!(Money::parse_lenient("1e").thousandths(), 1_000);
        assert_eq!(Money::parse_lenient("").thousandths(), 0);
        assert_eq!(Money::parse_lenient("-").thousandths(), 0);
        assert_eq!(Money::parse_lenient("x1").thousandths(), 0);
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_thousandths(1_000);
        let b = Money::from_thousandths(500);

        assert_eq!((a + b).thousandths(), 1_500);
        assert_eq!((a - b).thousandths(), 500);
        assert_eq!((a * 3).thousandths(), 3_000);
        assert_eq!(a.multiply_quantity(12).unwrap().thousandths(), 12_000);
        assert!(a.multiply_quantity(i64::MAX).is_none());

        // i64::MAX ends in ...807 and cannot round up to ...810.
        let top = Money::from_thousandths(i64::MAX).round_to(2);
        assert_eq!(top.thousandths(), i64::MAX - 7);
    }

    #[test]
    fn test_zero_and_checks() {
        assert!(Money::zero().is_zero());
        assert!(Money::from_thousandths(1).is_positive());
        assert!(Money::from_thousandths(-1).is_negative());
    }

    #[test]
    fn test_decimal_serde_accepts_numbers_and_strings() {
        #[derive(Deserialize, Serialize)]
        struct Row {
            #[serde(with = "decimal")]
            price: Money,
            #[serde(with = "decimal::option", default)]
            current: Option<Money>,
        }

        let row: Row = serde_json::from_str(r#"{"price": 12.5, "current": ""}"#).unwrap();
        assert_eq!(row.price.thousandths(), 12_500);
        assert!(row.current.is_none());

        let row: Row = serde_json::from_str(r#"{"price": "4", "current": "1.5"}"#).unwrap();
        assert_eq!(row.price.thousandths(), 4_000);
        assert_eq!(row.current, Some(Money::from_thousandths(1_500)));

        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"{"price":"4.000","current":"1.500"}"#);

        assert!(serde_json::from_str::<Row>(r#"{"price": true}"#).is_err());
    }
}
