//! # Tax Calculation
//!
//! Per-line tax computation under inclusive and exclusive regimes.
//!
//! ## The Two Regimes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  EXCLUSIVE (price excludes tax)        INCLUSIVE (price includes tax)   │
//! │                                                                         │
//! │  line amount: 20000 (net)              line amount: 22000 (gross)       │
//! │       │                                     │                           │
//! │       ▼                                     ▼                           │
//! │  tax = round(base × rate)              find net so that                 │
//! │       │                                net + taxes(net) == gross        │
//! │       ▼                                     │                           │
//! │  grand = net + Σ tax                        ▼                           │
//! │                                        binary search over minor units   │
//! │  20000 + 2000 = 22000                  22000 → net 20000, tax 2000      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Compound Stacking
//! Codes run in `sequence` order. A non-compound code taxes the line
//! subtotal; a compound code taxes the subtotal **plus every tax amount
//! already computed** for the line. Order therefore changes the result and
//! is preserved end to end.
//!
//! ## Reconciliation Guarantee
//! Both regimes reconcile exactly in integer minor units:
//! - Exclusive: `grand_total == subtotal + Σ breakdown`
//! - Inclusive: `subtotal + tax_total == gross`, any rounding residue is
//!   folded into the last tax row (policy choice, not an accounting
//!   standard — see DESIGN.md)

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::{CurrencyCode, Money, RoundingRule};
use crate::types::{TaxCode, TaxRegime};

// =============================================================================
// Output Types
// =============================================================================

/// One tax code's contribution to a line.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxLine {
    /// Tax code id (UUID).
    pub tax_code_id: String,

    /// Business code at computation time (e.g. "VAT20").
    pub code: String,

    /// Rate applied, in percent.
    #[ts(as = "String")]
    pub rate_percent: Decimal,

    /// Position in the line's tax stack.
    pub sequence: i64,

    /// Tax amount for this code.
    pub amount: Money,
}

/// The fully reconciled result for one line.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineTaxes {
    /// Net amount (before tax).
    pub subtotal: Money,

    /// Sum of all tax amounts.
    pub tax_total: Money,

    /// Amount payable: subtotal + tax_total.
    pub grand_total: Money,

    /// Per-code breakdown in sequence order.
    pub breakdown: Vec<TaxLine>,
}

// =============================================================================
// Tax Calculator
// =============================================================================

/// Computes per-line taxes with a fixed rounding rule.
///
/// The calculator is pure: callers resolve tax codes (active, company
/// scoped) through the registry and hand them in already materialized.
///
/// ## Usage
/// ```rust
/// use procura_core::money::{Money, RoundingRule};
/// use procura_core::tax::TaxCalculator;
/// use procura_core::types::TaxRegime;
/// use rust_decimal::Decimal;
///
/// let calc = TaxCalculator::new(RoundingRule::HalfUp);
/// let usd = "USD".parse().unwrap();
/// let unit_price = Money::from_minor(10000, usd); // $100.00
///
/// let result = calc
///     .line_taxes(unit_price, Decimal::from(2), TaxRegime::Exclusive, &[])
///     .unwrap();
/// assert_eq!(result.subtotal.minor(), 20000);
/// assert_eq!(result.grand_total.minor(), 20000); // no tax codes
/// ```
#[derive(Debug, Clone, Copy)]
pub struct TaxCalculator {
    rounding: RoundingRule,
}

impl TaxCalculator {
    /// Creates a calculator using the company's configured rounding rule.
    #[inline]
    pub const fn new(rounding: RoundingRule) -> Self {
        TaxCalculator { rounding }
    }

    /// Returns the rounding rule in use.
    #[inline]
    pub const fn rounding(&self) -> RoundingRule {
        self.rounding
    }

    /// Computes taxes for a line given unit price and quantity.
    ///
    /// The line amount is `round(unit_price × quantity)`; under the
    /// Exclusive regime that amount is the net subtotal, under Inclusive it
    /// is the gross payable.
    ///
    /// ## Errors
    /// - `ValidationError::MustBePositive` for quantity ≤ 0
    /// - `ValidationError::InactiveTaxCode` if a resolved code is inactive
    /// - `CoreError::NegativeGross` for Inclusive lines with negative amount
    pub fn line_taxes(
        &self,
        unit_price: Money,
        quantity: Decimal,
        regime: TaxRegime,
        codes: &[TaxCode],
    ) -> CoreResult<LineTaxes> {
        if quantity <= Decimal::ZERO {
            return Err(ValidationError::MustBePositive {
                field: "quantity".to_string(),
            }
            .into());
        }

        let amount = unit_price.scale_by(quantity, self.rounding)?;
        self.line_taxes_on_amount(amount, regime, codes)
    }

    /// Computes taxes for a pre-resolved line amount.
    ///
    /// Used when the caller already carries the line total in minor units
    /// (imported documents, credit-note reversal of a stored line).
    pub fn line_taxes_on_amount(
        &self,
        amount: Money,
        regime: TaxRegime,
        codes: &[TaxCode],
    ) -> CoreResult<LineTaxes> {
        let ordered = ordered_codes(codes)?;
        let currency = amount.currency();

        match regime {
            TaxRegime::Exclusive => {
                let (breakdown, tax_total) =
                    self.exclusive_taxes(amount.minor(), &ordered, currency)?;
                Ok(LineTaxes {
                    subtotal: amount,
                    tax_total: Money::from_minor(tax_total, currency),
                    grand_total: amount.try_add(Money::from_minor(tax_total, currency))?,
                    breakdown,
                })
            }
            TaxRegime::Inclusive => self.inclusive_taxes(amount, &ordered),
        }
    }

    /// Exclusive pass over an integer net subtotal.
    ///
    /// Returns the breakdown in sequence order plus the summed tax total.
    fn exclusive_taxes(
        &self,
        subtotal_minor: i64,
        codes: &[&TaxCode],
        currency: CurrencyCode,
    ) -> CoreResult<(Vec<TaxLine>, i64)> {
        let mut breakdown = Vec::with_capacity(codes.len());
        let mut tax_total: i64 = 0;

        for code in codes {
            // Compound codes tax the subtotal plus everything already levied
            let base = if code.is_compound {
                subtotal_minor
                    .checked_add(tax_total)
                    .ok_or_else(|| CoreError::AmountOverflow {
                        value: format!("{} + {}", subtotal_minor, tax_total),
                    })?
            } else {
                subtotal_minor
            };

            let amount = self
                .rounding
                .round_to_minor(Decimal::from(base) * code.rate_percent / Decimal::ONE_HUNDRED)?;

            tax_total = tax_total
                .checked_add(amount)
                .ok_or_else(|| CoreError::AmountOverflow {
                    value: format!("{} + {}", tax_total, amount),
                })?;

            breakdown.push(TaxLine {
                tax_code_id: code.id.clone(),
                code: code.code.clone(),
                rate_percent: code.rate_percent,
                sequence: code.sequence,
                amount: Money::from_minor(amount, currency),
            });
        }

        Ok((breakdown, tax_total))
    }

    /// Inclusive reconciliation: split a gross amount into net + taxes.
    ///
    /// Binary search over integer minor units finds the largest net with
    /// `net + exclusive_taxes(net) <= gross` (the left side is monotonic in
    /// net because rates are non-negative). Any residue left by rounding is
    /// folded into the last tax row so the parts sum to the gross exactly.
    fn inclusive_taxes(&self, gross: Money, codes: &[&TaxCode]) -> CoreResult<LineTaxes> {
        let currency = gross.currency();
        let gross_minor = gross.minor();

        if gross_minor < 0 {
            return Err(CoreError::NegativeGross { minor: gross_minor });
        }

        // Edge case: no tax codes means the gross is all net
        if codes.is_empty() {
            return Ok(LineTaxes {
                subtotal: gross,
                tax_total: Money::zero(currency),
                grand_total: gross,
                breakdown: Vec::new(),
            });
        }

        let mut lo: i64 = 0;
        let mut hi: i64 = gross_minor;
        while lo < hi {
            let mid = lo + (hi - lo + 1) / 2;
            let (_, tax) = self.exclusive_taxes(mid, codes, currency)?;
            if mid + tax <= gross_minor {
                lo = mid;
            } else {
                hi = mid - 1;
            }
        }

        let net = lo;
        let (mut breakdown, tax_total) = self.exclusive_taxes(net, codes, currency)?;

        // Fold the rounding residue into the last tax row
        let remainder = gross_minor - net - tax_total;
        if remainder != 0 {
            if let Some(last) = breakdown.last_mut() {
                last.amount =
                    Money::from_minor(last.amount.minor() + remainder, currency);
            }
        }

        Ok(LineTaxes {
            subtotal: Money::from_minor(net, currency),
            tax_total: Money::from_minor(gross_minor - net, currency),
            grand_total: gross,
            breakdown,
        })
    }
}

/// Sorts codes by (sequence, code) and validates them.
///
/// Rejects inactive codes and out-of-range rates up front: the binary
/// search relies on non-negative rates for monotonicity.
fn ordered_codes(codes: &[TaxCode]) -> CoreResult<Vec<&TaxCode>> {
    for code in codes {
        if !code.active {
            return Err(ValidationError::InactiveTaxCode {
                id: code.id.clone(),
                code: code.code.clone(),
            }
            .into());
        }
        if code.rate_percent < Decimal::ZERO || code.rate_percent > Decimal::ONE_HUNDRED {
            return Err(ValidationError::OutOfRange {
                field: format!("tax code {} rate_percent", code.code),
                min: 0,
                max: 100,
            }
            .into());
        }
    }

    let mut ordered: Vec<&TaxCode> = codes.iter().collect();
    ordered.sort_by(|a, b| a.sequence.cmp(&b.sequence).then_with(|| a.code.cmp(&b.code)));
    Ok(ordered)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn usd() -> CurrencyCode {
        "USD".parse().unwrap()
    }

    fn tax_code(id: &str, code: &str, rate: Decimal, compound: bool, sequence: i64) -> TaxCode {
        TaxCode {
            id: id.to_string(),
            company_id: "company-1".to_string(),
            code: code.to_string(),
            name: code.to_string(),
            rate_percent: rate,
            is_compound: compound,
            sequence,
            active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn calc() -> TaxCalculator {
        TaxCalculator::new(RoundingRule::HalfUp)
    }

    #[test]
    fn test_exclusive_single_rate() {
        // $100.00 unit, qty 2, 10% exclusive → 20000 / 2000 / 22000
        let codes = [tax_code("tc-1", "TAX10", dec!(10), false, 1)];
        let result = calc()
            .line_taxes(
                Money::from_minor(10000, usd()),
                dec!(2),
                TaxRegime::Exclusive,
                &codes,
            )
            .unwrap();

        assert_eq!(result.subtotal.minor(), 20000);
        assert_eq!(result.tax_total.minor(), 2000);
        assert_eq!(result.grand_total.minor(), 22000);
        assert_eq!(result.breakdown.len(), 1);
        assert_eq!(result.breakdown[0].amount.minor(), 2000);
    }

    #[test]
    fn test_inclusive_single_rate_reconciles_exactly() {
        // Gross 22000 at 10% inclusive → binary search resolves net 20000
        let codes = [tax_code("tc-1", "TAX10", dec!(10), false, 1)];
        let result = calc()
            .line_taxes_on_amount(Money::from_minor(22000, usd()), TaxRegime::Inclusive, &codes)
            .unwrap();

        assert_eq!(result.subtotal.minor(), 20000);
        assert_eq!(result.tax_total.minor(), 2000);
        assert_eq!(result.grand_total.minor(), 22000);
    }

    #[test]
    fn test_compound_stacking_order() {
        // GST 5% then compound QST 9.975% on 10000:
        //   GST = 500
        //   QST base = 10500, amount = 1047.375 → 1047
        let codes = [
            tax_code("tc-gst", "GST", dec!(5), false, 1),
            tax_code("tc-qst", "QST", dec!(9.975), true, 2),
        ];
        let result = calc()
            .line_taxes_on_amount(Money::from_minor(10000, usd()), TaxRegime::Exclusive, &codes)
            .unwrap();

        assert_eq!(result.breakdown[0].amount.minor(), 500);
        assert_eq!(result.breakdown[1].amount.minor(), 1047);
        assert_eq!(result.tax_total.minor(), 1547);
        assert_eq!(result.grand_total.minor(), 11547);
    }

    #[test]
    fn test_sequence_is_respected_regardless_of_input_order() {
        // Same codes, passed reversed: compound result must not change
        let codes = [
            tax_code("tc-qst", "QST", dec!(9.975), true, 2),
            tax_code("tc-gst", "GST", dec!(5), false, 1),
        ];
        let result = calc()
            .line_taxes_on_amount(Money::from_minor(10000, usd()), TaxRegime::Exclusive, &codes)
            .unwrap();

        assert_eq!(result.breakdown[0].code, "GST");
        assert_eq!(result.breakdown[1].code, "QST");
        assert_eq!(result.tax_total.minor(), 1547);
    }

    #[test]
    fn test_exclusive_reconciliation_invariant() {
        // grand_total == subtotal + Σ breakdown, across rates and amounts
        let rates = [dec!(5), dec!(7.25), dec!(9.975), dec!(21)];
        for (i, rate) in rates.iter().enumerate() {
            let codes = [
                tax_code("tc-a", "A", *rate, false, 1),
                tax_code("tc-b", "B", dec!(3.5), true, 2),
            ];
            let amount = Money::from_minor(12345 + i as i64 * 997, usd());
            let result = calc()
                .line_taxes_on_amount(amount, TaxRegime::Exclusive, &codes)
                .unwrap();

            let sum: i64 = result.breakdown.iter().map(|t| t.amount.minor()).sum();
            assert_eq!(result.tax_total.minor(), sum);
            assert_eq!(
                result.grand_total.minor(),
                result.subtotal.minor() + result.tax_total.minor()
            );
        }
    }

    #[test]
    fn test_inclusive_residue_lands_on_last_row() {
        // Gross 101 at 21%: net 83 → tax 17.43 → 17, residue 1 folded in
        let codes = [tax_code("tc-1", "VAT21", dec!(21), false, 1)];
        let result = calc()
            .line_taxes_on_amount(Money::from_minor(101, usd()), TaxRegime::Inclusive, &codes)
            .unwrap();

        assert_eq!(result.subtotal.minor(), 83);
        assert_eq!(result.tax_total.minor(), 18);
        assert_eq!(result.breakdown[0].amount.minor(), 18);
        assert_eq!(
            result.subtotal.minor() + result.tax_total.minor(),
            result.grand_total.minor()
        );
    }

    #[test]
    fn test_inclusive_reconciliation_invariant_sweep() {
        // net + tax_total == gross exactly for awkward gross amounts
        let codes = [
            tax_code("tc-a", "GST", dec!(5), false, 1),
            tax_code("tc-b", "QST", dec!(9.975), true, 2),
        ];
        for gross in [1, 2, 3, 99, 101, 9999, 22000, 123457] {
            let result = calc()
                .line_taxes_on_amount(Money::from_minor(gross, usd()), TaxRegime::Inclusive, &codes)
                .unwrap();
            assert_eq!(
                result.subtotal.minor() + result.tax_total.minor(),
                gross,
                "gross {} failed to reconcile",
                gross
            );
            let sum: i64 = result.breakdown.iter().map(|t| t.amount.minor()).sum();
            assert_eq!(sum, result.tax_total.minor());
        }
    }

    #[test]
    fn test_zero_codes_means_no_tax() {
        let exclusive = calc()
            .line_taxes_on_amount(Money::from_minor(5000, usd()), TaxRegime::Exclusive, &[])
            .unwrap();
        assert_eq!(exclusive.subtotal.minor(), 5000);
        assert_eq!(exclusive.tax_total.minor(), 0);
        assert_eq!(exclusive.grand_total.minor(), 5000);

        let inclusive = calc()
            .line_taxes_on_amount(Money::from_minor(5000, usd()), TaxRegime::Inclusive, &[])
            .unwrap();
        assert_eq!(inclusive.subtotal.minor(), 5000);
        assert_eq!(inclusive.grand_total.minor(), 5000);
    }

    #[test]
    fn test_bankers_rounding_changes_midpoint_taxes() {
        // 1050 at 5% = 52.5: half-up → 53, half-even → 52
        let codes = [tax_code("tc-1", "TAX5", dec!(5), false, 1)];
        let amount = Money::from_minor(1050, usd());

        let up = TaxCalculator::new(RoundingRule::HalfUp)
            .line_taxes_on_amount(amount, TaxRegime::Exclusive, &codes)
            .unwrap();
        assert_eq!(up.tax_total.minor(), 53);

        let even = TaxCalculator::new(RoundingRule::HalfEven)
            .line_taxes_on_amount(amount, TaxRegime::Exclusive, &codes)
            .unwrap();
        assert_eq!(even.tax_total.minor(), 52);
    }

    #[test]
    fn test_quantity_must_be_positive() {
        let result = calc().line_taxes(
            Money::from_minor(1000, usd()),
            dec!(0),
            TaxRegime::Exclusive,
            &[],
        );
        assert!(matches!(
            result,
            Err(CoreError::Validation(ValidationError::MustBePositive { .. }))
        ));
    }

    #[test]
    fn test_inactive_code_is_rejected() {
        let mut code = tax_code("tc-1", "OLD", dec!(10), false, 1);
        code.active = false;
        let result = calc().line_taxes_on_amount(
            Money::from_minor(1000, usd()),
            TaxRegime::Exclusive,
            &[code],
        );
        assert!(matches!(
            result,
            Err(CoreError::Validation(ValidationError::InactiveTaxCode { .. }))
        ));
    }

    #[test]
    fn test_negative_gross_rejected_under_inclusive() {
        let codes = [tax_code("tc-1", "TAX10", dec!(10), false, 1)];
        let result = calc().line_taxes_on_amount(
            Money::from_minor(-100, usd()),
            TaxRegime::Inclusive,
            &codes,
        );
        assert!(matches!(result, Err(CoreError::NegativeGross { .. })));
    }

    #[test]
    fn test_exclusive_credit_line_allowed() {
        // Credit lines carry negative amounts under the exclusive regime
        let codes = [tax_code("tc-1", "TAX10", dec!(10), false, 1)];
        let result = calc()
            .line_taxes_on_amount(Money::from_minor(-10000, usd()), TaxRegime::Exclusive, &codes)
            .unwrap();
        assert_eq!(result.tax_total.minor(), -1000);
        assert_eq!(result.grand_total.minor(), -11000);
    }

    #[test]
    fn test_fractional_quantity_line() {
        // 2.5 kg at $4.99/kg = 1247.5 → 1248 (half up), then 10% tax
        let codes = [tax_code("tc-1", "TAX10", dec!(10), false, 1)];
        let result = calc()
            .line_taxes(
                Money::from_minor(499, usd()),
                dec!(2.5),
                TaxRegime::Exclusive,
                &codes,
            )
            .unwrap();
        assert_eq!(result.subtotal.minor(), 1248);
        assert_eq!(result.tax_total.minor(), 125);
        assert_eq!(result.grand_total.minor(), 1373);
    }
}
