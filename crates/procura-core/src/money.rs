//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  In many procurement systems:                                           │
//! │    $10.00 / 3 = $3.33 (×3 = $9.99)  → Lost $0.01!                      │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Minor Units                                      │
//! │    1000 cents / 3 = 333 cents (×3 = 999 cents)                         │
//! │    We KNOW we lost 1 cent, and reconcile it explicitly                 │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Minor Units Vary By Currency
//! The minor-unit exponent comes from the currency registry, never from a
//! hard-coded 100: USD has 2 decimal places (1 dollar = 100 cents), JPY has
//! 0 (1 yen = 1 yen). `Money` itself only carries the integer amount plus
//! the ISO code; converting to/from decimal major units requires the
//! exponent and an explicit [`RoundingRule`].
//!
//! ## Usage
//! ```rust
//! use procura_core::money::{CurrencyCode, Money};
//!
//! let usd: CurrencyCode = "USD".parse().unwrap();
//!
//! // Create from minor units (preferred)
//! let price = Money::from_minor(1099, usd); // $10.99
//!
//! // Same-currency arithmetic is checked
//! let total = price.try_add(Money::from_minor(500, usd)).unwrap();
//! assert_eq!(total.minor(), 1599);
//!
//! // NEVER do this:
//! // let bad = Money::from_float(10.99); // NO SUCH METHOD EXISTS!
//! ```

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};

// =============================================================================
// Currency Code
// =============================================================================

/// ISO-4217 currency code, e.g. `USD`, `EUR`, `JPY`.
///
/// ## Design Decisions
/// - **Fixed `[u8; 3]` storage**: `Copy`, no allocation, cheap to pass around
/// - **Validated on construction**: always three ASCII letters, uppercased
/// - **Serialized as a plain string**: `"USD"` in JSON and TypeScript
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CurrencyCode([u8; 3]);

impl CurrencyCode {
    /// Parses and validates a currency code.
    ///
    /// Lowercase input is accepted and normalized to uppercase.
    ///
    /// ## Example
    /// ```rust
    /// use procura_core::money::CurrencyCode;
    ///
    /// let usd = CurrencyCode::new("usd").unwrap();
    /// assert_eq!(usd.as_str(), "USD");
    /// assert!(CurrencyCode::new("US").is_err());
    /// assert!(CurrencyCode::new("U$D").is_err());
    /// ```
    pub fn new(code: &str) -> Result<Self, ValidationError> {
        let code = code.trim();
        let bytes = code.as_bytes();

        if bytes.len() != 3 || !bytes.iter().all(|b| b.is_ascii_alphabetic()) {
            return Err(ValidationError::InvalidFormat {
                field: "currency".to_string(),
                reason: format!("'{}' is not a 3-letter ISO currency code", code),
            });
        }

        Ok(CurrencyCode([
            bytes[0].to_ascii_uppercase(),
            bytes[1].to_ascii_uppercase(),
            bytes[2].to_ascii_uppercase(),
        ]))
    }

    /// Returns the code as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        // Construction guarantees ASCII letters
        std::str::from_utf8(&self.0).expect("currency code is ASCII")
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CurrencyCode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CurrencyCode::new(s)
    }
}

/// Serialized as a bare string: `"USD"`.
impl Serialize for CurrencyCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for CurrencyCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        CurrencyCode::new(&s).map_err(D::Error::custom)
    }
}

// =============================================================================
// Rounding Rule
// =============================================================================

/// How fractional minor units are resolved to integers.
///
/// ## Bankers Rounding Explained
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────┐
/// │  HALF UP vs HALF EVEN                                               │
/// │                                                                     │
/// │  HalfUp rounds 0.5 away from zero:                                  │
/// │    0.5 → 1, 1.5 → 2, 2.5 → 3, 3.5 → 4 (always up = +bias)          │
/// │                                                                     │
/// │  HalfEven rounds 0.5 to the nearest EVEN number:                    │
/// │    0.5 → 0, 1.5 → 2, 2.5 → 2, 3.5 → 4 (alternates = no bias)       │
/// │                                                                     │
/// │  Over millions of lines, HalfEven prevents systematic drift.        │
/// │  Companies pick their rule once; every document uses it.            │
/// └─────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum RoundingRule {
    /// Round half away from zero (commercial rounding).
    HalfUp,
    /// Round half to even (bankers rounding).
    HalfEven,
}

impl RoundingRule {
    /// The matching `rust_decimal` strategy.
    #[inline]
    pub fn strategy(&self) -> RoundingStrategy {
        match self {
            RoundingRule::HalfUp => RoundingStrategy::MidpointAwayFromZero,
            RoundingRule::HalfEven => RoundingStrategy::MidpointNearestEven,
        }
    }

    /// Rounds a decimal amount of minor units to an integer.
    ///
    /// ## Example
    /// ```rust
    /// use procura_core::money::RoundingRule;
    /// use rust_decimal::Decimal;
    ///
    /// let half = Decimal::new(825, 1); // 82.5 minor units
    /// assert_eq!(RoundingRule::HalfUp.round_to_minor(half).unwrap(), 83);
    /// assert_eq!(RoundingRule::HalfEven.round_to_minor(half).unwrap(), 82);
    /// ```
    pub fn round_to_minor(&self, value: Decimal) -> CoreResult<i64> {
        value
            .round_dp_with_strategy(0, self.strategy())
            .to_i64()
            .ok_or_else(|| CoreError::AmountOverflow {
                value: value.to_string(),
            })
    }

    /// Rounds a decimal to `dp` decimal places under this rule.
    #[inline]
    pub fn round_dp(&self, value: Decimal, dp: u32) -> Decimal {
        value.round_dp_with_strategy(dp, self.strategy())
    }
}

impl Default for RoundingRule {
    fn default() -> Self {
        RoundingRule::HalfUp
    }
}

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value: integer minor units plus ISO currency code.
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for credits and adjustments
/// - **Currency attached**: mixing currencies is a checked error, not a bug
/// - **Derives**: Full serde support for JSON serialization
///
/// ## User Workflow Context
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                    Where Money is Used                                  │
/// │                                                                         │
/// │  QuoteLine.unit_price ──► TaxCalculator ──► LineTaxes.grand_total      │
/// │                     │                                                   │
/// │                     └──► FxService.convert ──► comparison currency     │
/// │                                                                         │
/// │  EVERY monetary value in the system flows through this type            │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money {
    minor: i64,
    #[ts(as = "String")]
    currency: CurrencyCode,
}

impl Money {
    /// Creates a Money value from minor units (cents for USD, yen for JPY).
    ///
    /// ## Example
    /// ```rust
    /// use procura_core::money::{CurrencyCode, Money};
    ///
    /// let usd: CurrencyCode = "USD".parse().unwrap();
    /// let price = Money::from_minor(1099, usd); // $10.99
    /// assert_eq!(price.minor(), 1099);
    /// ```
    #[inline]
    pub const fn from_minor(minor: i64, currency: CurrencyCode) -> Self {
        Money { minor, currency }
    }

    /// Zero in the given currency.
    #[inline]
    pub const fn zero(currency: CurrencyCode) -> Self {
        Money { minor: 0, currency }
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn minor(&self) -> i64 {
        self.minor
    }

    /// Returns the currency code.
    #[inline]
    pub const fn currency(&self) -> CurrencyCode {
        self.currency
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.minor == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.minor > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.minor < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money {
            minor: self.minor.abs(),
            currency: self.currency,
        }
    }

    /// Checked addition; the currencies must match.
    ///
    /// ## Example
    /// ```rust
    /// use procura_core::money::{CurrencyCode, Money};
    ///
    /// let usd: CurrencyCode = "USD".parse().unwrap();
    /// let eur: CurrencyCode = "EUR".parse().unwrap();
    ///
    /// let a = Money::from_minor(1000, usd);
    /// assert_eq!(a.try_add(Money::from_minor(500, usd)).unwrap().minor(), 1500);
    /// assert!(a.try_add(Money::from_minor(500, eur)).is_err());
    /// ```
    pub fn try_add(&self, other: Money) -> CoreResult<Money> {
        self.check_currency(other)?;
        let minor = self
            .minor
            .checked_add(other.minor)
            .ok_or_else(|| CoreError::AmountOverflow {
                value: format!("{} + {}", self.minor, other.minor),
            })?;
        Ok(Money::from_minor(minor, self.currency))
    }

    /// Checked subtraction; the currencies must match.
    pub fn try_sub(&self, other: Money) -> CoreResult<Money> {
        self.check_currency(other)?;
        let minor = self
            .minor
            .checked_sub(other.minor)
            .ok_or_else(|| CoreError::AmountOverflow {
                value: format!("{} - {}", self.minor, other.minor),
            })?;
        Ok(Money::from_minor(minor, self.currency))
    }

    /// Multiplies by an integer quantity (whole-unit order lines).
    ///
    /// Fractional quantities go through [`Money::scale_by`] so the rounding
    /// rule is always explicit.
    pub fn multiply_quantity(&self, qty: i64) -> CoreResult<Money> {
        let minor = self
            .minor
            .checked_mul(qty)
            .ok_or_else(|| CoreError::AmountOverflow {
                value: format!("{} * {}", self.minor, qty),
            })?;
        Ok(Money::from_minor(minor, self.currency))
    }

    /// Multiplies by a decimal factor, rounding back to minor units.
    ///
    /// ## Example
    /// ```rust
    /// use procura_core::money::{CurrencyCode, Money, RoundingRule};
    /// use rust_decimal::Decimal;
    ///
    /// let usd: CurrencyCode = "USD".parse().unwrap();
    /// let unit = Money::from_minor(1099, usd); // $10.99
    ///
    /// // 2.5 kg at $10.99/kg = $27.475 → $27.48 (half up)
    /// let qty = Decimal::new(25, 1);
    /// let line = unit.scale_by(qty, RoundingRule::HalfUp).unwrap();
    /// assert_eq!(line.minor(), 2748);
    /// ```
    pub fn scale_by(&self, factor: Decimal, rounding: RoundingRule) -> CoreResult<Money> {
        let minor = rounding.round_to_minor(Decimal::from(self.minor) * factor)?;
        Ok(Money::from_minor(minor, self.currency))
    }

    /// Converts to decimal major units given the currency's minor-unit
    /// exponent (2 for USD, 0 for JPY).
    ///
    /// The exponent comes from the currency registry; `Money` never guesses.
    #[inline]
    pub fn to_decimal(&self, minor_units: u32) -> Decimal {
        Decimal::new(self.minor, minor_units)
    }

    /// Builds a Money value from decimal major units, rounding to the
    /// currency's minor-unit exponent.
    ///
    /// ## Example
    /// ```rust
    /// use procura_core::money::{CurrencyCode, Money, RoundingRule};
    /// use rust_decimal::Decimal;
    ///
    /// let jpy: CurrencyCode = "JPY".parse().unwrap();
    /// let amount = Decimal::new(123456, 2); // 1234.56
    ///
    /// // JPY has 0 minor units: 1234.56 → 1235 yen (half up)
    /// let money = Money::from_decimal(amount, jpy, 0, RoundingRule::HalfUp).unwrap();
    /// assert_eq!(money.minor(), 1235);
    /// ```
    pub fn from_decimal(
        value: Decimal,
        currency: CurrencyCode,
        minor_units: u32,
        rounding: RoundingRule,
    ) -> CoreResult<Money> {
        let scaled = value
            .checked_mul(Decimal::from(10i64.pow(minor_units)))
            .ok_or_else(|| CoreError::AmountOverflow {
                value: value.to_string(),
            })?;
        let minor = rounding.round_to_minor(scaled)?;
        Ok(Money::from_minor(minor, currency))
    }

    fn check_currency(&self, other: Money) -> CoreResult<()> {
        if self.currency != other.currency {
            return Err(CoreError::CurrencyMismatch {
                left: self.currency.to_string(),
                right: other.currency.to_string(),
            });
        }
        Ok(())
    }
}

/// Display implementation shows minor units plus the code.
///
/// ## Note
/// This is for debugging and logs. Major-unit formatting needs the registry
/// exponent and localization, which belong to the frontend.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.minor, self.currency)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
