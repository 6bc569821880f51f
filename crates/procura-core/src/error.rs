//! # Error Types
//!
//! Domain-specific error types for procura-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  procura-core errors (this file)                                       │
//! │  ├── CoreError        - General domain errors                          │
//! │  ├── ValidationError  - Input validation failures                      │
//! │  └── ConversionError  - Unit conversion failures                       │
//! │                                                                         │
//! │  procura-db errors (separate crate)                                    │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  procura-pricing errors (separate crate)                               │
//! │  └── PricingError     - Service-level failures (FX, registries)        │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → PricingError → 4xx JSON           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (code, id, currency, etc.)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations or domain logic failures.
/// They should be caught and translated to user-friendly messages.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Arithmetic between two amounts in different currencies.
    ///
    /// ## When This Occurs
    /// - Summing line totals across documents in different currencies
    /// - Adding an FX-converted amount without converting the other operand
    #[error("Currency mismatch: {left} vs {right}")]
    CurrencyMismatch { left: String, right: String },

    /// A rounded amount does not fit in 64-bit minor units.
    ///
    /// ## When This Occurs
    /// - Quantity × unit price overflows i64 minor units
    /// - An FX conversion lands outside the representable range
    #[error("Amount out of range: {value}")]
    AmountOverflow { value: String },

    /// Inclusive-tax reconciliation was asked to split a negative gross.
    ///
    /// The binary search domain is [0, gross]; credit lines must be
    /// computed under the Exclusive regime and negated by the caller.
    #[error("Inclusive tax requires a non-negative gross amount, got {minor}")]
    NegativeGross { minor: i64 },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when caller input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID, invalid currency code).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// A referenced tax code does not exist for the company.
    #[error("Unknown tax code: {id}")]
    UnknownTaxCode { id: String },

    /// A referenced tax code exists but is inactive.
    #[error("Tax code {code} ({id}) is inactive")]
    InactiveTaxCode { id: String, code: String },
}

// =============================================================================
// Conversion Error
// =============================================================================

/// Unit conversion errors.
///
/// Raised by the conversion graph when a quantity cannot be carried from
/// one unit of measure to another.
#[derive(Debug, Error)]
pub enum ConversionError {
    /// The unit id is not present in the graph.
    #[error("Unknown unit of measure: {id}")]
    UnknownUom { id: String },

    /// The two units measure different physical dimensions.
    ///
    /// ## When This Occurs
    /// - Converting kilograms to litres
    /// - A line's ordered unit and the supplier's quoted unit disagree
    #[error("Cannot convert {from_code} ({from_dimension:?}) to {to_code} ({to_dimension:?})")]
    DimensionMismatch {
        from_code: String,
        to_code: String,
        from_dimension: crate::types::Dimension,
        to_dimension: crate::types::Dimension,
    },

    /// No chain of conversions links the two units.
    #[error("No conversion path from {from_code} to {to_code}")]
    NoPath { from_code: String, to_code: String },
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

/// Convenience type alias for Results with ConversionError.
pub type ConversionResult<T> = Result<T, ConversionError>;

// =============================================================================
// Unit Tests
// =============================================================================
