//! # Pricing Service Errors
//!
//! Service-level error type unifying core, conversion, and database
//! failures. The web layer maps `Validation`/`UnknownTaxCode`/
//! `RateNotFound`/`Conversion`/`UnsupportedCurrency` variants to 4xx JSON
//! responses with field-level messages; everything else is a 5xx.

use thiserror::Error;

use procura_core::error::{ConversionError, CoreError, ValidationError};
use procura_db::DbError;

/// Errors raised by the pricing services.
#[derive(Debug, Error)]
pub enum PricingError {
    /// Currency is missing from the registry (or inactive).
    #[error("Unsupported currency: {code}")]
    UnsupportedCurrency { code: String },

    /// No rate stored in either direction for the pair.
    ///
    /// `scope` is the requested date (YYYY-MM-DD) or "latest".
    #[error("FX rate not found for {base}/{quote} as of {scope}")]
    RateNotFound {
        base: String,
        quote: String,
        scope: String,
    },

    /// Unit conversion failed (unknown unit, dimension mismatch, no path).
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    /// Caller input failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Core computation failed (overflow, currency mismatch, ...).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Database operation failed.
    #[error(transparent)]
    Db(#[from] DbError),
}

/// Result type for pricing service operations.
pub type PricingResult<T> = Result<T, PricingError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_not_found_message() {
        let err = PricingError::RateNotFound {
            base: "USD".to_string(),
            quote: "CLF".to_string(),
            scope: "latest".to_string(),
        };
        assert_eq!(err.to_string(), "FX rate not found for USD/CLF as of latest");
    }

    #[test]
    fn test_validation_error_passes_through() {
        let err: PricingError = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "quantity must be positive");
    }
}
