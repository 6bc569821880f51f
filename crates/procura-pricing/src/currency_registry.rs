//! # Currency Registry
//!
//! Read-through cache over the currency table.
//!
//! Every priced line and every FX conversion asks for a minor-unit
//! exponent, so the registry caches rows forever and is invalidated
//! explicitly on the rare admin write. It is an injected service, not a
//! static lookup table: tests swap in an in-memory database and the cache
//! follows the instance.

use tracing::debug;

use crate::cache::TtlCache;
use crate::error::{PricingError, PricingResult};
use procura_core::money::CurrencyCode;
use procura_core::types::Currency;
use procura_db::CurrencyRepository;

/// Read-through minor-unit lookup backed by the currency repository.
///
/// Cloning shares the cache.
#[derive(Debug, Clone)]
pub struct CurrencyRegistry {
    repo: CurrencyRepository,
    cache: TtlCache<CurrencyCode, Currency>,
}

impl CurrencyRegistry {
    /// Creates a registry over the given repository.
    pub fn new(repo: CurrencyRepository) -> Self {
        CurrencyRegistry {
            repo,
            cache: TtlCache::new(),
        }
    }

    /// Gets a currency, reading through to the database on first use.
    ///
    /// ## Errors
    /// `PricingError::UnsupportedCurrency` when the code is missing from
    /// the registry or deactivated.
    pub async fn get(&self, code: CurrencyCode) -> PricingResult<Currency> {
        if let Some(currency) = self.cache.get(&code) {
            return Ok(currency);
        }

        let currency = self
            .repo
            .get_by_code(code)
            .await?
            .filter(|c| c.active)
            .ok_or_else(|| PricingError::UnsupportedCurrency {
                code: code.to_string(),
            })?;

        debug!(code = %code, minor_units = currency.minor_units, "Currency cached");
        self.cache.insert_forever(code, currency.clone());
        Ok(currency)
    }

    /// Gets the minor-unit exponent for a currency (2 for USD, 0 for JPY).
    pub async fn minor_units(&self, code: CurrencyCode) -> PricingResult<u32> {
        Ok(self.get(code).await?.minor_units)
    }

    /// Inserts or updates a currency and invalidates its cache entry.
    pub async fn upsert(&self, currency: &Currency) -> PricingResult<()> {
        self.repo.upsert(currency).await?;
        self.cache.remove(&currency.code);
        Ok(())
    }

    /// Drops a cached entry (import tooling after direct table writes).
    pub fn invalidate(&self, code: CurrencyCode) {
        self.cache.remove(&code);
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use procura_db::{Database, DbConfig};

    fn currency(code: &str, minor_units: u32) -> Currency {
        Currency {
            code: code.parse().unwrap(),
            name: code.to_string(),
            minor_units,
            active: true,
        }
    }

    async fn registry() -> CurrencyRegistry {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let registry = CurrencyRegistry::new(db.currencies());
        registry.upsert(&currency("USD", 2)).await.unwrap();
        registry.upsert(&currency("JPY", 0)).await.unwrap();
        registry
    }

    #[tokio::test]
    async fn test_read_through_and_exponents() {
        let registry = registry().await;

        assert_eq!(registry.minor_units("USD".parse().unwrap()).await.unwrap(), 2);
        assert_eq!(registry.minor_units("JPY".parse().unwrap()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unknown_currency_is_unsupported() {
        let registry = registry().await;

        let result = registry.get("XXX".parse().unwrap()).await;
        assert!(matches!(
            result,
            Err(PricingError::UnsupportedCurrency { .. })
        ));
    }

    #[tokio::test]
    async fn test_inactive_currency_is_unsupported() {
        let registry = registry().await;

        let mut retired = currency("USD", 2);
        retired.active = false;
        registry.upsert(&retired).await.unwrap();

        let result = registry.get("USD".parse().unwrap()).await;
        assert!(matches!(
            result,
            Err(PricingError::UnsupportedCurrency { .. })
        ));
    }

    #[tokio::test]
    async fn test_upsert_invalidates_cache() {
        let registry = registry().await;
        let usd: CurrencyCode = "USD".parse().unwrap();

        // Prime the cache
        assert_eq!(registry.minor_units(usd).await.unwrap(), 2);

        // Change the exponent (hypothetical redenomination)
        let mut changed = currency("USD", 2);
        changed.minor_units = 3;
        registry.upsert(&changed).await.unwrap();

        assert_eq!(registry.minor_units(usd).await.unwrap(), 3);
    }
}
