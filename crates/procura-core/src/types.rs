//! # Domain Types
//!
//! Core domain types used throughout the Procura pricing engine.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    TaxCode      │   │      Uom        │   │    FxRate       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  company_id     │   │  company_id     │   │  base_code      │       │
//! │  │  rate_percent   │   │  dimension      │   │  quote_code     │       │
//! │  │  is_compound    │   │  code ("kg")    │   │  rate, as_of    │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   TaxRegime     │   │   Dimension     │   │   Currency      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  Exclusive      │   │  Mass, Length   │   │  code, name     │       │
//! │  │  Inclusive      │   │  Volume, ...    │   │  minor_units    │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every company-scoped entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business code: (`VAT20`, `kg`, etc.) - human-readable, unique per company
//!
//! ## Lifecycles
//! These are read-through reference/configuration rows created by company
//! administrators or batch import jobs, consumed transactionally inside
//! quote and invoice persistence.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::CurrencyCode;

// =============================================================================
// Tax Regime
// =============================================================================

/// Whether line prices already include tax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum TaxRegime {
    /// Price + tax shown separately (USA model).
    Exclusive,
    /// Price includes tax (EU/UK model).
    Inclusive,
}

impl Default for TaxRegime {
    fn default() -> Self {
        TaxRegime::Exclusive
    }
}

// =============================================================================
// Tax Code
// =============================================================================

/// A company-scoped tax code (VAT, GST, provincial sales tax, ...).
///
/// ## Compound Stacking
/// `sequence` orders codes within a line. A compound code's taxable base is
/// the line subtotal plus every tax amount computed before it, so
/// reordering codes changes the result. Classic example: Quebec QST
/// historically applied on top of GST.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxCode {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Company this tax code belongs to.
    pub company_id: String,

    /// Business code shown on documents (e.g. "VAT20").
    pub code: String,

    /// Display name (e.g. "VAT 20%").
    pub name: String,

    /// Percentage rate, e.g. 20.000 for 20%.
    #[ts(as = "String")]
    pub rate_percent: Decimal,

    /// Whether this code taxes previously computed tax amounts.
    pub is_compound: bool,

    /// Position within a line's tax stack; lower runs first.
    pub sequence: i64,

    /// Whether the code may be attached to new lines (soft delete).
    pub active: bool,

    /// When the code was created.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    /// When the code was last updated.
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Currency
// =============================================================================

/// A currency registry row.
///
/// `minor_units` is the ISO-4217 exponent: 2 for USD (cents), 0 for JPY,
/// 3 for KWD. Every decimal↔minor conversion reads it from here.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Currency {
    /// ISO-4217 code.
    #[ts(as = "String")]
    pub code: CurrencyCode,

    /// Display name (e.g. "US Dollar").
    pub name: String,

    /// Number of decimal places in the minor unit.
    pub minor_units: u32,

    /// Whether documents may be priced in this currency.
    pub active: bool,
}

// =============================================================================
// Dimension
// =============================================================================

/// A class of physical quantity within which unit conversions are valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Mass,
    Length,
    Volume,
    Area,
    Count,
    Time,
    Temperature,
    Other,
}

impl Dimension {
    /// Decimal scale converted quantities are truncated to.
    ///
    /// Physical measures keep 6 places; discrete counts and durations 4;
    /// temperatures 2 (sensor precision ends there).
    #[inline]
    pub const fn scale(&self) -> u32 {
        match self {
            Dimension::Mass
            | Dimension::Length
            | Dimension::Volume
            | Dimension::Area
            | Dimension::Other => 6,
            Dimension::Count | Dimension::Time => 4,
            Dimension::Temperature => 2,
        }
    }
}

// =============================================================================
// Unit of Measure
// =============================================================================

/// A named unit of measure, grouped by dimension.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Uom {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Company this unit belongs to.
    pub company_id: String,

    /// Business code (e.g. "kg", "lb", "pallet").
    pub code: String,

    /// Display name (e.g. "Kilogram").
    pub name: String,

    /// Physical dimension; conversions never cross dimensions.
    pub dimension: Dimension,

    /// Whether the unit may be used on new lines.
    pub active: bool,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// A directed conversion edge between two units of the same dimension.
///
/// Applying the edge computes `value * factor + offset`. The inverse edge
/// is derived automatically when the graph is built, so administrators
/// store each pair once ("1 lb = 0.453592 kg", "°F = °C × 1.8 + 32").
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UomConversion {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Company this conversion belongs to.
    pub company_id: String,

    /// Source unit id.
    pub from_uom_id: String,

    /// Target unit id.
    pub to_uom_id: String,

    /// Linear factor; must be non-zero.
    #[ts(as = "String")]
    pub factor: Decimal,

    /// Additive offset (zero for everything except temperature-like scales).
    #[ts(as = "String")]
    pub offset: Decimal,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    /// Soft delete marker; deleted conversions never enter the graph.
    #[ts(as = "Option<String>")]
    pub deleted_at: Option<DateTime<Utc>>,
}

// =============================================================================
// FX Rate
// =============================================================================

/// A daily FX rate row: how many units of `quote_code` one unit of
/// `base_code` buys on `as_of`.
///
/// Lookups use latest-or-before semantics per date; the inverse pair is
/// derived at read time when only one direction is stored.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FxRate {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Base currency (the "1 unit of" side).
    #[ts(as = "String")]
    pub base_code: CurrencyCode,

    /// Quote currency (the "buys this many" side).
    #[ts(as = "String")]
    pub quote_code: CurrencyCode,

    /// Rate at FX scale (8 decimal places).
    #[ts(as = "String")]
    pub rate: Decimal,

    /// Effective date of the rate.
    #[ts(as = "String")]
    pub as_of: NaiveDate,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tax_regime_default() {
        assert_eq!(TaxRegime::default(), TaxRegime::Exclusive);
    }

    #[test]
    fn test_dimension_scales() {
        assert_eq!(Dimension::Mass.scale(), 6);
        assert_eq!(Dimension::Count.scale(), 4);
        assert_eq!(Dimension::Temperature.scale(), 2);
    }

    #[test]
    fn test_tax_regime_serde_names() {
        assert_eq!(
            serde_json::to_string(&TaxRegime::Exclusive).unwrap(),
            "\"exclusive\""
        );
        assert_eq!(
            serde_json::to_string(&Dimension::Temperature).unwrap(),
            "\"temperature\""
        );
    }
}
