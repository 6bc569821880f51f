//! # FX Service
//!
//! Currency conversion via cached daily rate lookups.
//!
//! ## Lookup Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  get_rate(base, quote, as_of)                                           │
//! │       │                                                                 │
//! │       ├── base == quote ──────────────► 1.00000000                      │
//! │       │                                                                 │
//! │       ├── cache hit ("USD:EUR:2026-03-01") ──► cached rate              │
//! │       │                                                                 │
//! │       ├── direct row at-or-before date ──► rate, cached 1h              │
//! │       │                                                                 │
//! │       ├── inverse row (quote/base) ──► 1/rate @ 8 dp, cached 1h         │
//! │       │                                                                 │
//! │       └── nothing either way ──► RateNotFound (4xx)                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Cache Invalidation
//! `upsert_daily_rates` writes the feed in one transaction, then drops the
//! affected cache entries - both directions, the dated key and "latest".
//! Entries for other dates age out on their own TTL.

use std::time::Duration;

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::debug;

use crate::cache::TtlCache;
use crate::currency_registry::CurrencyRegistry;
use crate::error::{PricingError, PricingResult};
use procura_core::error::ValidationError;
use procura_core::money::{CurrencyCode, Money, RoundingRule};
use procura_core::FX_RATE_SCALE;
use procura_db::{FxRateRepository, FxRateUpsert};

/// How long a successful rate lookup is served from cache.
const RATE_CACHE_TTL: Duration = Duration::from_secs(3600);

/// Normalizes a rate to the FX scale (8 dp), rounding half-even.
fn at_fx_scale(rate: Decimal) -> Decimal {
    let mut rate = rate.round_dp_with_strategy(FX_RATE_SCALE, RoundingStrategy::MidpointNearestEven);
    rate.rescale(FX_RATE_SCALE);
    rate
}

/// Cache key: `(base, quote, date-or-"latest")`.
fn cache_key(base: CurrencyCode, quote: CurrencyCode, as_of: Option<NaiveDate>) -> String {
    format!("{}:{}:{}", base, quote, scope(as_of))
}

/// Human-readable date scope for keys and error messages.
fn scope(as_of: Option<NaiveDate>) -> String {
    match as_of {
        Some(date) => date.to_string(),
        None => "latest".to_string(),
    }
}

/// Currency conversion service over the daily rate table.
#[derive(Debug, Clone)]
pub struct FxService {
    rates: FxRateRepository,
    currencies: CurrencyRegistry,
    cache: TtlCache<String, Decimal>,
}

impl FxService {
    /// Creates the service over its repository and the currency registry.
    pub fn new(rates: FxRateRepository, currencies: CurrencyRegistry) -> Self {
        FxService {
            rates,
            currencies,
            cache: TtlCache::new(),
        }
    }

    /// Gets the rate to multiply a `base` amount by to obtain `quote`.
    ///
    /// ## Arguments
    /// * `as_of` - effective date (latest-or-before); `None` means latest
    ///
    /// ## Errors
    /// `PricingError::RateNotFound` when neither the pair nor its inverse
    /// has a usable stored rate.
    pub async fn get_rate(
        &self,
        base: CurrencyCode,
        quote: CurrencyCode,
        as_of: Option<NaiveDate>,
    ) -> PricingResult<Decimal> {
        if base == quote {
            return Ok(at_fx_scale(Decimal::ONE));
        }

        let key = cache_key(base, quote, as_of);
        if let Some(rate) = self.cache.get(&key) {
            return Ok(rate);
        }

        // Direct pair first
        if let Some(row) = self.rates.rate_at_or_before(base, quote, as_of).await? {
            if !row.rate.is_zero() {
                let rate = at_fx_scale(row.rate);
                debug!(base = %base, quote = %quote, rate = %rate, "Direct fx rate");
                self.cache.insert(key, rate, RATE_CACHE_TTL);
                return Ok(rate);
            }
        }

        // Inverse pair fallback
        if let Some(row) = self.rates.rate_at_or_before(quote, base, as_of).await? {
            if !row.rate.is_zero() {
                let rate = at_fx_scale(Decimal::ONE / row.rate);
                debug!(base = %base, quote = %quote, rate = %rate, "Inverse fx rate");
                self.cache.insert(key, rate, RATE_CACHE_TTL);
                return Ok(rate);
            }
        }

        Err(PricingError::RateNotFound {
            base: base.to_string(),
            quote: quote.to_string(),
            scope: scope(as_of),
        })
    }

    /// Converts a monetary amount into another currency.
    ///
    /// Minor units are lifted to decimal major units using the base
    /// currency's exponent, multiplied by the rate, then rounded into the
    /// quote currency's exponent under the given rule.
    pub async fn convert(
        &self,
        amount: Money,
        to_currency: CurrencyCode,
        as_of: Option<NaiveDate>,
        rounding: RoundingRule,
    ) -> PricingResult<Money> {
        if amount.currency() == to_currency {
            return Ok(amount);
        }

        let rate = self.get_rate(amount.currency(), to_currency, as_of).await?;
        let base_exponent = self.currencies.minor_units(amount.currency()).await?;
        let quote_exponent = self.currencies.minor_units(to_currency).await?;

        let converted_major = amount.to_decimal(base_exponent) * rate;
        Ok(Money::from_decimal(
            converted_major,
            to_currency,
            quote_exponent,
            rounding,
        )?)
    }

    /// Idempotently updates-or-creates daily rate rows and invalidates the
    /// affected cache entries.
    ///
    /// ## Errors
    /// `ValidationError::MustBePositive` when a rate is zero or negative.
    pub async fn upsert_daily_rates(&self, rates: &[FxRateUpsert]) -> PricingResult<usize> {
        for rate in rates {
            if rate.rate <= Decimal::ZERO {
                return Err(ValidationError::MustBePositive {
                    field: format!("rate {}/{}", rate.base_code, rate.quote_code),
                }
                .into());
            }
        }

        let written = self.rates.upsert_many(rates).await?;

        // Drop both directions, dated and latest, for every written pair
        for rate in rates {
            self.cache
                .remove(&cache_key(rate.base_code, rate.quote_code, Some(rate.as_of)));
            self.cache
                .remove(&cache_key(rate.quote_code, rate.base_code, Some(rate.as_of)));
            self.cache
                .remove(&cache_key(rate.base_code, rate.quote_code, None));
            self.cache
                .remove(&cache_key(rate.quote_code, rate.base_code, None));
        }

        debug!(count = written, "Daily fx rates upserted");
        Ok(written)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
