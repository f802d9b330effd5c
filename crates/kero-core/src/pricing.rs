//! # Pricing Calculator
//!
//! Turns a supplier's case cost into shelf prices.
//!
//! ## Formula
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  cost (per case)                                                        │
//! │     │                                                                   │
//! │     ▼  × (1 − discount/100)                                             │
//! │  discounted                                                             │
//! │     │                                                                   │
//! │     ▼  × (1 + vat/100)                                                  │
//! │  case total ─────────────────────────────► case price (3 dp)            │
//! │     │                                                                   │
//! │     ▼  ÷ units                                                          │
//! │  unit total ─────────────────────────────► unit price (3 dp)            │
//! │                                                                         │
//! │  Guard: cost < 0, units ≤ 0 or discount < 0 → Invalid ("Invalid Input") │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The whole chain runs on one integer numerator (thousandths × 10⁸) and is
//! rounded once per output, half away from zero. No intermediate value is
//! rounded, so `price(100, 2, 10, 14)` is exactly `(51.300, 102.600)`.
//!
//! ## Example
//! ```rust
//! use kero_core::money::Money;
//! use kero_core::pricing::{price, PricingOutcome};
//! use kero_core::types::Percent;
//!
//! let outcome = price(
//!     Money::from_units(100),
//!     2,
//!     Percent::from_whole(10),
//!     Percent::from_whole(14),
//! );
//! let quote = outcome.quote().unwrap();
//! assert_eq!(quote.unit_price.to_string(), "51.300");
//! assert_eq!(quote.case_price.to_string(), "102.600");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::{div_round_half_away, numeric_prefix, Money};
use crate::types::Percent;

/// Shared denominator for two percentage factors (10 000 bps each).
const PERCENT_PAIR_SCALE: i128 = 10_000 * 10_000;

// =============================================================================
// Quote / Outcome
// =============================================================================

/// Prices derived from a valid calculator input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuote {
    #[ts(type = "number")]
    pub unit_price: Money,
    #[ts(type = "number")]
    pub case_price: Money,
}

/// Result of running the calculator.
///
/// `Invalid` is the sentinel shown as "Invalid Input"; it never carries a
/// partial or non-finite number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PricingOutcome {
    Priced(PriceQuote),
    Invalid,
}

impl PricingOutcome {
    /// The quote, if the input was valid.
    pub fn quote(&self) -> Option<PriceQuote> {
        match self {
            PricingOutcome::Priced(q) => Some(*q),
            PricingOutcome::Invalid => None,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, PricingOutcome::Priced(_))
    }
}

impl fmt::Display for PricingOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PricingOutcome::Priced(q) => write!(f, "unit {} / case {}", q.unit_price, q.case_price),
            PricingOutcome::Invalid => f.write_str("Invalid Input"),
        }
    }
}

// =============================================================================
// Price Function
// =============================================================================

/// Derives unit and case prices.
///
/// ## Rules
/// - `cost < 0`, `units <= 0` or `discount < 0` → [`PricingOutcome::Invalid`]
/// - zero discount and zero VAT leave the cost unchanged
/// - VAT is not range-checked; a negative VAT lowers the price
/// - a result that does not fit in [`Money`] → [`PricingOutcome::Invalid`]
pub fn price(cost: Money, units: i64, discount: Percent, vat: Percent) -> PricingOutcome {
    if cost.is_negative() || units <= 0 || discount.is_negative() {
        return PricingOutcome::Invalid;
    }

    let Some(numerator) = (cost.thousandths() as i128)
        .checked_mul(10_000 - discount.bps() as i128)
        .and_then(|n| n.checked_mul(10_000 + vat.bps() as i128))
    else {
        return PricingOutcome::Invalid;
    };

    let case_price = i64::try_from(div_round_half_away(numerator, PERCENT_PAIR_SCALE));
    let unit_price = i64::try_from(div_round_half_away(numerator, PERCENT_PAIR_SCALE * units as i128));

    match (unit_price, case_price) {
        (Ok(unit_price), Ok(case_price)) => PricingOutcome::Priced(PriceQuote {
            unit_price: Money::from_thousandths(unit_price),
            case_price: Money::from_thousandths(case_price),
        }),
        // Outside the representable money range.
        _ => PricingOutcome::Invalid,
    }
}

/// `parseInt(value) || 0` for unit-count fields.
///
/// Reads leading digits only: `"2.5"` is 2, `"3 pcs"` is 3, `"x"` is 0.
pub fn parse_units_lenient(input: &str) -> i64 {
    let Some(prefix) = numeric_prefix(input) else {
        return 0;
    };
    let end = prefix
        .char_indices()
        .find(|(i, c)| !(c.is_ascii_digit() || (*i == 0 && (*c == '-' || *c == '+'))))
        .map(|(i, _)| i)
        .unwrap_or(prefix.len());
    prefix[..end].parse().unwrap_or(0)
}

// =============================================================================
// Calculator
// =============================================================================

/// Raw text of the calculator fields, evaluated on every keystroke.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalculatorInput {
    pub cost: String,
    pub units: String,
    pub discount: String,
    pub vat: String,
}

impl Default for CalculatorInput {
    /// A freshly opened calculator: empty cost, one unit, no discount or VAT.
    fn default() -> Self {
        CalculatorInput {
            cost: String::new(),
            units: "1".to_string(),
            discount: "0".to_string(),
            vat: "0".to_string(),
        }
    }
}

impl CalculatorInput {
    pub fn new(
        cost: impl Into<String>,
        units: impl Into<String>,
        discount: impl Into<String>,
        vat: impl Into<String>,
    ) -> Self {
        CalculatorInput {
            cost: cost.into(),
            units: units.into(),
            discount: discount.into(),
            vat: vat.into(),
        }
    }

    /// Evaluates the fields the way the live calculator does: unparsable
    /// numbers read as zero.
    pub fn evaluate(&self) -> PricingOutcome {
        price(
            Money::parse_lenient(&self.cost),
            parse_units_lenient(&self.units),
            Percent::parse_lenient(&self.discount),
            Percent::parse_lenient(&self.vat),
        )
    }

    /// Applies the quote to the entry form.
    ///
    /// Returns the unit price to put in the form and the calculator settings
    /// the next ledger line will carry.
    pub fn apply(&self) -> CoreResult<AppliedQuote> {
        let quote = self.evaluate().quote().ok_or(CoreError::InvalidPricing)?;
        let units = parse_units_lenient(&self.units);
        let memory = CalculatorMemory {
            units: u32::try_from(units).ok().filter(|u| *u > 0).unwrap_or(1),
            discount: Percent::parse_lenient(&self.discount),
            vat: Percent::parse_lenient(&self.vat),
        };
        Ok(AppliedQuote { quote, memory })
    }
}

/// Calculator settings carried into the next ledger line.
///
/// Reset to `(1, 0, 0)` after every successful add.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculatorMemory {
    pub units: u32,
    pub discount: Percent,
    pub vat: Percent,
}

impl Default for CalculatorMemory {
    fn default() -> Self {
        CalculatorMemory {
            units: 1,
            discount: Percent::zero(),
            vat: Percent::zero(),
        }
    }
}

/// A quote accepted into the entry form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppliedQuote {
    pub quote: PriceQuote,
    pub memory: CalculatorMemory,
}

// =============================================================================
// Unit Tests
// =============================================================================
