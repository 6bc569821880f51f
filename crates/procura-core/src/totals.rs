//! # Document Totals
//!
//! Pure aggregation of per-line tax results into document-level totals.
//!
//! ## Data Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Totals Aggregation                                  │
//! │                                                                         │
//! │  LineSpec ──validate──► TaxCalculator::line_taxes ──► LineTaxes         │
//! │  LineSpec ──validate──► TaxCalculator::line_taxes ──► LineTaxes         │
//! │  LineSpec ──validate──► TaxCalculator::line_taxes ──► LineTaxes         │
//! │                                         │                               │
//! │                                         ▼                               │
//! │                          DocumentTotals::add_line (Σ per line,          │
//! │                          tax summary merged per tax code id)            │
//! │                                         │                               │
//! │                                         ▼                               │
//! │              { subtotal, tax_total, grand_total, tax_summary }          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Tax code resolution against the company registry happens in the
//! service layer (procura-pricing); this module stays pure.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::{CurrencyCode, Money};
use crate::tax::{LineTaxes, TaxLine};

// =============================================================================
// Line Specification
// =============================================================================

/// One line of a document as submitted by the caller.
///
/// Either `unit_price_minor` (with `quantity`) or a pre-resolved
/// `amount_minor` must be present. Tax code ids are resolved against the
/// company-scoped registry by the service layer.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineSpec {
    /// Ordered quantity; must be positive.
    #[ts(as = "String")]
    pub quantity: Decimal,

    /// Unit price in minor units, if priced per unit.
    pub unit_price_minor: Option<i64>,

    /// Pre-resolved line amount in minor units (imported documents).
    pub amount_minor: Option<i64>,

    /// Tax code ids to apply, resolved and ordered by the registry.
    pub tax_code_ids: Vec<String>,
}

impl LineSpec {
    /// Validates the shape of the line before any computation runs.
    ///
    /// ## Rules
    /// - quantity must be > 0
    /// - unit_price_minor is required when amount_minor is not supplied
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.quantity <= Decimal::ZERO {
            return Err(ValidationError::MustBePositive {
                field: "quantity".to_string(),
            });
        }

        if self.unit_price_minor.is_none() && self.amount_minor.is_none() {
            return Err(ValidationError::Required {
                field: "unit_price".to_string(),
            });
        }

        Ok(())
    }
}

// =============================================================================
// Document Totals
// =============================================================================

/// Document-level totals accumulated from per-line results.
///
/// The tax summary merges each line's breakdown per tax code id, keeping
/// rate and sequence from the first occurrence; this is the per-code
/// summary block printed at the bottom of quotes and invoices.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DocumentTotals {
    /// Document currency; every line must match.
    #[ts(as = "String")]
    pub currency: CurrencyCode,

    /// Sum of line subtotals (net).
    pub subtotal: Money,

    /// Sum of line tax totals.
    pub tax_total: Money,

    /// Sum of line grand totals.
    pub grand_total: Money,

    /// Per-tax-code aggregate across all lines, in sequence order.
    pub tax_summary: Vec<TaxLine>,

    /// Number of lines accumulated.
    pub line_count: usize,
}

impl DocumentTotals {
    /// Creates an empty accumulator in the given currency.
    pub fn new(currency: CurrencyCode) -> Self {
        DocumentTotals {
            currency,
            subtotal: Money::zero(currency),
            tax_total: Money::zero(currency),
            grand_total: Money::zero(currency),
            tax_summary: Vec::new(),
            line_count: 0,
        }
    }

    /// Folds one line's result into the document totals.
    ///
    /// ## Errors
    /// `CoreError::CurrencyMismatch` if the line is in a different
    /// currency than the document.
    pub fn add_line(&mut self, line: &LineTaxes) -> crate::error::CoreResult<()> {
        self.subtotal = self.subtotal.try_add(line.subtotal)?;
        self.tax_total = self.tax_total.try_add(line.tax_total)?;
        self.grand_total = self.grand_total.try_add(line.grand_total)?;

        for tax in &line.breakdown {
            if let Some(existing) = self
                .tax_summary
                .iter_mut()
                .find(|t| t.tax_code_id == tax.tax_code_id)
            {
                existing.amount = existing.amount.try_add(tax.amount)?;
                continue;
            }
            self.tax_summary.push(tax.clone());
        }
        self.tax_summary
            .sort_by(|a, b| a.sequence.cmp(&b.sequence).then_with(|| a.code.cmp(&b.code)));

        self.line_count += 1;
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::RoundingRule;
    use crate::tax::TaxCalculator;
    use crate::types::{TaxCode, TaxRegime};
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn usd() -> CurrencyCode {
        "USD".parse().unwrap()
    }

    fn tax_code(id: &str, code: &str, rate: Decimal, sequence: i64) -> TaxCode {
        TaxCode {
            id: id.to_string(),
            company_id: "company-1".to_string(),
            code: code.to_string(),
            name: code.to_string(),
            rate_percent: rate,
            is_compound: false,
            sequence,
            active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_line_spec_validation() {
        let ok = LineSpec {
            quantity: dec!(2),
            unit_price_minor: Some(10000),
            amount_minor: None,
            tax_code_ids: vec![],
        };
        assert!(ok.validate().is_ok());

        let zero_qty = LineSpec {
            quantity: dec!(0),
            unit_price_minor: Some(10000),
            amount_minor: None,
            tax_code_ids: vec![],
        };
        assert!(matches!(
            zero_qty.validate(),
            Err(ValidationError::MustBePositive { .. })
        ));

        let no_price = LineSpec {
            quantity: dec!(1),
            unit_price_minor: None,
            amount_minor: None,
            tax_code_ids: vec![],
        };
        assert!(matches!(
            no_price.validate(),
            Err(ValidationError::Required { .. })
        ));

        // Pre-resolved amount alone is fine
        let amount_only = LineSpec {
            quantity: dec!(1),
            unit_price_minor: None,
            amount_minor: Some(5000),
            tax_code_ids: vec![],
        };
        assert!(amount_only.validate().is_ok());
    }

    #[test]
    fn test_document_totals_accumulate_and_merge_summary() {
        let calc = TaxCalculator::new(RoundingRule::HalfUp);
        let codes = [tax_code("tc-1", "TAX10", dec!(10), 1)];

        let mut totals = DocumentTotals::new(usd());

        let line1 = calc
            .line_taxes(Money::from_minor(10000, usd()), dec!(2), TaxRegime::Exclusive, &codes)
            .unwrap();
        let line2 = calc
            .line_taxes(Money::from_minor(2500, usd()), dec!(4), TaxRegime::Exclusive, &codes)
            .unwrap();

        totals.add_line(&line1).unwrap();
        totals.add_line(&line2).unwrap();

        assert_eq!(totals.line_count, 2);
        assert_eq!(totals.subtotal.minor(), 30000);
        assert_eq!(totals.tax_total.minor(), 3000);
        assert_eq!(totals.grand_total.minor(), 33000);

        // Both lines used the same code: one merged summary row
        assert_eq!(totals.tax_summary.len(), 1);
        assert_eq!(totals.tax_summary[0].amount.minor(), 3000);
    }

    #[test]
    fn test_currency_mismatch_across_lines() {
        let calc = TaxCalculator::new(RoundingRule::HalfUp);
        let eur: CurrencyCode = "EUR".parse().unwrap();

        let mut totals = DocumentTotals::new(usd());
        let line = calc
            .line_taxes(Money::from_minor(1000, eur), dec!(1), TaxRegime::Exclusive, &[])
            .unwrap();

        assert!(totals.add_line(&line).is_err());
    }
}
