//! # Totals Calculator Service
//!
//! Computes document-level totals from line specifications.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Totals Calculation                                   │
//! │                                                                         │
//! │  DocumentSpec { currency, regime, rounding, lines }                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  For each line:                                                         │
//! │    1. LineSpec::validate  (qty > 0, price present)                      │
//! │    2. Resolve tax_code_ids against the company registry                 │
//! │       ├── missing id  → UnknownTaxCode (4xx)                            │
//! │       └── inactive id → InactiveTaxCode (4xx)                           │
//! │    3. TaxCalculator::line_taxes (core math)                             │
//! │    4. DocumentTotals::add_line                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  { subtotal, tax_total, grand_total, tax_summary }                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The quote/invoice persistence services run this first, then write the
//! returned totals and tax rows inside their own transaction.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::PricingResult;
use procura_core::error::ValidationError;
use procura_core::money::{CurrencyCode, Money, RoundingRule};
use procura_core::tax::TaxCalculator;
use procura_core::totals::{DocumentTotals, LineSpec};
use procura_core::types::{TaxCode, TaxRegime};
use procura_db::TaxCodeRepository;

/// A document to total: pricing configuration plus its lines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSpec {
    /// Document currency; all lines are priced in it.
    pub currency: CurrencyCode,

    /// Whether line prices include tax.
    pub regime: TaxRegime,

    /// Company-configured rounding rule.
    pub rounding: RoundingRule,

    /// The lines to total.
    pub lines: Vec<LineSpec>,
}

/// Service that totals documents against the company tax registry.
#[derive(Debug, Clone)]
pub struct TotalsCalculator {
    tax_codes: TaxCodeRepository,
}

impl TotalsCalculator {
    /// Creates a calculator over the given repository.
    pub fn new(tax_codes: TaxCodeRepository) -> Self {
        TotalsCalculator { tax_codes }
    }

    /// Computes document totals for a company.
    ///
    /// ## Errors
    /// - `ValidationError::MustBePositive` - a line quantity ≤ 0
    /// - `ValidationError::Required` - neither unit price nor amount given
    /// - `ValidationError::UnknownTaxCode` - an id not in the registry
    /// - `ValidationError::InactiveTaxCode` - an id resolved but retired
    pub async fn calculate(
        &self,
        company_id: &str,
        spec: &DocumentSpec,
    ) -> PricingResult<DocumentTotals> {
        debug!(
            company_id = %company_id,
            lines = spec.lines.len(),
            regime = ?spec.regime,
            "Calculating document totals"
        );

        let calc = TaxCalculator::new(spec.rounding);
        let mut totals = DocumentTotals::new(spec.currency);

        for line in &spec.lines {
            line.validate()?;
            let codes = self.resolve_codes(company_id, &line.tax_code_ids).await?;

            let line_taxes = match (line.amount_minor, line.unit_price_minor) {
                // Pre-resolved line amount: quantity already applied upstream
                (Some(minor), _) => calc.line_taxes_on_amount(
                    Money::from_minor(minor, spec.currency),
                    spec.regime,
                    &codes,
                )?,
                (None, Some(unit_minor)) => calc.line_taxes(
                    Money::from_minor(unit_minor, spec.currency),
                    line.quantity,
                    spec.regime,
                    &codes,
                )?,
                // validate() already rejected this shape
                (None, None) => {
                    return Err(ValidationError::Required {
                        field: "unit_price".to_string(),
                    }
                    .into())
                }
            };

            totals.add_line(&line_taxes)?;
        }

        debug!(
            subtotal = totals.subtotal.minor(),
            tax_total = totals.tax_total.minor(),
            grand_total = totals.grand_total.minor(),
            "Document totals computed"
        );

        Ok(totals)
    }

    /// Resolves tax code ids, failing on unknown or inactive entries.
    async fn resolve_codes(
        &self,
        company_id: &str,
        ids: &[String],
    ) -> PricingResult<Vec<TaxCode>> {
        let resolved = self.tax_codes.get_by_ids(company_id, ids).await?;

        let mut codes = Vec::with_capacity(ids.len());
        for (id, slot) in ids.iter().zip(resolved) {
            match slot {
                None => {
                    return Err(ValidationError::UnknownTaxCode { id: id.clone() }.into());
                }
                Some(code) if !code.active => {
                    return Err(ValidationError::InactiveTaxCode {
                        id: code.id,
                        code: code.code,
                    }
                    .into());
                }
                Some(code) => codes.push(code),
            }
        }

        Ok(codes)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PricingError;
    use chrono::Utc;
    use procura_db::{Database, DbConfig};
    use procura_core::DEFAULT_COMPANY_ID;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn usd() -> CurrencyCode {
        "USD".parse().unwrap()
    }

    fn tax_code(code: &str, rate: Decimal, compound: bool, sequence: i64) -> TaxCode {
        let now = Utc::now();
        TaxCode {
            id: Uuid::new_v4().to_string(),
            company_id: DEFAULT_COMPANY_ID.to_string(),
            code: code.to_string(),
            name: code.to_string(),
            rate_percent: rate,
            is_compound: compound,
            sequence,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn line(qty: Decimal, unit_minor: i64, tax_ids: Vec<String>) -> LineSpec {
        LineSpec {
            quantity: qty,
            unit_price_minor: Some(unit_minor),
            amount_minor: None,
            tax_code_ids: tax_ids,
        }
    }

    async fn setup() -> (Database, TotalsCalculator, TaxCode) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let code = tax_code("TAX10", dec!(10), false, 1);
        db.tax_codes().insert(&code).await.unwrap();
        let calculator = TotalsCalculator::new(db.tax_codes());
        (db, calculator, code)
    }

    #[tokio::test]
    async fn test_exclusive_document_totals() {
        let (_db, calculator, code) = setup().await;

        // Two lines sharing the 10% code: 2 × $100.00 and 4 × $25.00
        let spec = DocumentSpec {
            currency: usd(),
            regime: TaxRegime::Exclusive,
            rounding: RoundingRule::HalfUp,
            lines: vec![
                line(dec!(2), 10000, vec![code.id.clone()]),
                line(dec!(4), 2500, vec![code.id.clone()]),
            ],
        };

        let totals = calculator
            .calculate(DEFAULT_COMPANY_ID, &spec)
            .await
            .unwrap();

        assert_eq!(totals.subtotal.minor(), 30000);
        assert_eq!(totals.tax_total.minor(), 3000);
        assert_eq!(totals.grand_total.minor(), 33000);
        assert_eq!(totals.tax_summary.len(), 1);
        assert_eq!(totals.tax_summary[0].amount.minor(), 3000);
        assert_eq!(totals.line_count, 2);
    }

    #[tokio::test]
    async fn test_inclusive_document_reconciles() {
        let (_db, calculator, code) = setup().await;

        // Gross 22000 at 10% inclusive → net 20000, tax 2000
        let spec = DocumentSpec {
            currency: usd(),
            regime: TaxRegime::Inclusive,
            rounding: RoundingRule::HalfUp,
            lines: vec![LineSpec {
                quantity: dec!(1),
                unit_price_minor: None,
                amount_minor: Some(22000),
                tax_code_ids: vec![code.id.clone()],
            }],
        };

        let totals = calculator
            .calculate(DEFAULT_COMPANY_ID, &spec)
            .await
            .unwrap();

        assert_eq!(totals.subtotal.minor(), 20000);
        assert_eq!(totals.tax_total.minor(), 2000);
        assert_eq!(totals.grand_total.minor(), 22000);
    }

    #[tokio::test]
    async fn test_unknown_tax_code_fails_validation() {
        let (_db, calculator, _code) = setup().await;

        let spec = DocumentSpec {
            currency: usd(),
            regime: TaxRegime::Exclusive,
            rounding: RoundingRule::HalfUp,
            lines: vec![line(dec!(1), 1000, vec!["no-such-id".to_string()])],
        };

        let result = calculator.calculate(DEFAULT_COMPANY_ID, &spec).await;
        assert!(matches!(
            result,
            Err(PricingError::Validation(
                ValidationError::UnknownTaxCode { .. }
            ))
        ));
    }

    #[tokio::test]
    async fn test_inactive_tax_code_fails_validation() {
        let (db, calculator, code) = setup().await;

        db.tax_codes()
            .set_active(DEFAULT_COMPANY_ID, &code.id, false)
            .await
            .unwrap();

        let spec = DocumentSpec {
            currency: usd(),
            regime: TaxRegime::Exclusive,
            rounding: RoundingRule::HalfUp,
            lines: vec![line(dec!(1), 1000, vec![code.id.clone()])],
        };

        let result = calculator.calculate(DEFAULT_COMPANY_ID, &spec).await;
        assert!(matches!(
            result,
            Err(PricingError::Validation(
                ValidationError::InactiveTaxCode { .. }
            ))
        ));
    }

    #[tokio::test]
    async fn test_bad_lines_fail_validation() {
        let (_db, calculator, code) = setup().await;

        // Zero quantity
        let spec = DocumentSpec {
            currency: usd(),
            regime: TaxRegime::Exclusive,
            rounding: RoundingRule::HalfUp,
            lines: vec![line(dec!(0), 1000, vec![code.id.clone()])],
        };
        assert!(matches!(
            calculator.calculate(DEFAULT_COMPANY_ID, &spec).await,
            Err(PricingError::Validation(
                ValidationError::MustBePositive { .. }
            ))
        ));

        // Missing unit price and amount
        let spec = DocumentSpec {
            currency: usd(),
            regime: TaxRegime::Exclusive,
            rounding: RoundingRule::HalfUp,
            lines: vec![LineSpec {
                quantity: dec!(1),
                unit_price_minor: None,
                amount_minor: None,
                tax_code_ids: vec![],
            }],
        };
        assert!(matches!(
            calculator.calculate(DEFAULT_COMPANY_ID, &spec).await,
            Err(PricingError::Validation(ValidationError::Required { .. }))
        ));
    }

    #[tokio::test]
    async fn test_compound_stack_resolved_from_registry() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let gst = tax_code("GST", dec!(5), false, 1);
        let qst = tax_code("QST", dec!(9.975), true, 2);
        db.tax_codes().insert(&gst).await.unwrap();
        db.tax_codes().insert(&qst).await.unwrap();
        let calculator = TotalsCalculator::new(db.tax_codes());

        // Ids passed out of order; sequence fixes the stacking
        let spec = DocumentSpec {
            currency: usd(),
            regime: TaxRegime::Exclusive,
            rounding: RoundingRule::HalfUp,
            lines: vec![line(dec!(1), 10000, vec![qst.id.clone(), gst.id.clone()])],
        };

        let totals = calculator
            .calculate(DEFAULT_COMPANY_ID, &spec)
            .await
            .unwrap();

        assert_eq!(totals.tax_total.minor(), 1547); // 500 GST + 1047 QST
        assert_eq!(totals.grand_total.minor(), 11547);
        assert_eq!(totals.tax_summary[0].code, "GST");
        assert_eq!(totals.tax_summary[1].code, "QST");
    }
}
