//! # FX Rate Repository
//!
//! Database operations for daily FX rates.
//!
//! ## Latest-Or-Before Semantics
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Stored: USD/EUR  2026-03-01  0.91                                      │
//! │          USD/EUR  2026-03-04  0.92                                      │
//! │                                                                         │
//! │  rate_at_or_before(USD, EUR, 2026-03-03) → 0.91  (latest ≤ date)        │
//! │  rate_at_or_before(USD, EUR, 2026-03-04) → 0.92                         │
//! │  rate_at_or_before(USD, EUR, None)       → 0.92  (latest overall)       │
//! │  rate_at_or_before(USD, EUR, 2026-02-01) → None  (nothing stored yet)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Inverse-pair fallback and caching live in `procura-pricing::FxService`;
//! this repository only answers direct lookups.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::SqlitePool;
use std::str::FromStr;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use procura_core::money::CurrencyCode;
use procura_core::types::FxRate;

/// One rate to upsert, as delivered by the daily import feed.
#[derive(Debug, Clone)]
pub struct FxRateUpsert {
    pub base_code: CurrencyCode,
    pub quote_code: CurrencyCode,
    pub rate: Decimal,
    pub as_of: NaiveDate,
}

/// Raw row as stored; rate is TEXT and parsed on the way out.
#[derive(Debug, sqlx::FromRow)]
struct FxRateRow {
    id: String,
    base_code: String,
    quote_code: String,
    rate: String,
    as_of: NaiveDate,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<FxRateRow> for FxRate {
    type Error = DbError;

    fn try_from(row: FxRateRow) -> Result<Self, Self::Error> {
        let base_code = CurrencyCode::new(&row.base_code)
            .map_err(|_| DbError::invalid_value("fx_rates", "base_code", &row.base_code))?;
        let quote_code = CurrencyCode::new(&row.quote_code)
            .map_err(|_| DbError::invalid_value("fx_rates", "quote_code", &row.quote_code))?;
        let rate = Decimal::from_str(&row.rate)
            .map_err(|_| DbError::invalid_value("fx_rates", "rate", &row.rate))?;

        Ok(FxRate {
            id: row.id,
            base_code,
            quote_code,
            rate,
            as_of: row.as_of,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for FX rate database operations.
#[derive(Debug, Clone)]
pub struct FxRateRepository {
    pool: SqlitePool,
}

impl FxRateRepository {
    /// Creates a new FxRateRepository.
    pub fn new(pool: SqlitePool) -> Self {
        FxRateRepository { pool }
    }

    /// Finds the newest rate at or before `as_of` for a pair.
    ///
    /// ## Arguments
    /// * `as_of` - effective date; `None` means "latest stored row"
    pub async fn rate_at_or_before(
        &self,
        base: CurrencyCode,
        quote: CurrencyCode,
        as_of: Option<NaiveDate>,
    ) -> DbResult<Option<FxRate>> {
        let row: Option<FxRateRow> = match as_of {
            Some(date) => {
                sqlx::query_as(
                    r#"
                    SELECT id, base_code, quote_code, rate, as_of, created_at, updated_at
                    FROM fx_rates
                    WHERE base_code = ?1 AND quote_code = ?2 AND as_of <= ?3
                    ORDER BY as_of DESC
                    LIMIT 1
                    "#,
                )
                .bind(base.as_str())
                .bind(quote.as_str())
                .bind(date)
                .fetch_optional(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as(
                    r#"
                    SELECT id, base_code, quote_code, rate, as_of, created_at, updated_at
                    FROM fx_rates
                    WHERE base_code = ?1 AND quote_code = ?2
                    ORDER BY as_of DESC
                    LIMIT 1
                    "#,
                )
                .bind(base.as_str())
                .bind(quote.as_str())
                .fetch_optional(&self.pool)
                .await?
            }
        };

        row.map(FxRate::try_from).transpose()
    }

    /// Idempotently updates-or-creates rate rows keyed on
    /// `(base_code, quote_code, as_of)`.
    ///
    /// All rows are written in one transaction: a half-applied daily feed
    /// would leave cross rates inconsistent.
    ///
    /// ## Returns
    /// Number of rows written.
    pub async fn upsert_many(&self, rates: &[FxRateUpsert]) -> DbResult<usize> {
        debug!(count = rates.len(), "Upserting fx rates");

        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        for rate in rates {
            sqlx::query(
                r#"
                INSERT INTO fx_rates (
                    id, base_code, quote_code, rate, as_of, created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
                ON CONFLICT (base_code, quote_code, as_of) DO UPDATE SET
                    rate = excluded.rate,
                    updated_at = excluded.updated_at
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(rate.base_code.as_str())
            .bind(rate.quote_code.as_str())
            .bind(rate.rate.to_string())
            .bind(rate.as_of)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(rates.len())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use rust_decimal_macros::dec;

    fn code(s: &str) -> CurrencyCode {
        s.parse().unwrap()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    fn upsert(base: &str, quote: &str, rate: Decimal, d: u32) -> FxRateUpsert {
        FxRateUpsert {
            base_code: code(base),
            quote_code: code(quote),
            rate,
            as_of: day(d),
        }
    }

    #[tokio::test]
    async fn test_latest_or_before_lookup() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.fx_rates();

        repo.upsert_many(&[
            upsert("USD", "EUR", dec!(0.91), 1),
            upsert("USD", "EUR", dec!(0.92), 4),
        ])
        .await
        .unwrap();

        // Between the two dates: earlier row wins
        let rate = repo
            .rate_at_or_before(code("USD"), code("EUR"), Some(day(3)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(rate.rate, dec!(0.91));

        // On the newer date
        let rate = repo
            .rate_at_or_before(code("USD"), code("EUR"), Some(day(4)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(rate.rate, dec!(0.92));

        // No date: latest overall
        let rate = repo
            .rate_at_or_before(code("USD"), code("EUR"), None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(rate.as_of, day(4));

        // Before everything stored
        assert!(repo
            .rate_at_or_before(code("USD"), code("EUR"), Some(day(1) - chrono::Days::new(5)))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_upsert_is_idempotent_per_pair_and_date() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.fx_rates();

        repo.upsert_many(&[upsert("USD", "EUR", dec!(0.91), 1)])
            .await
            .unwrap();
        // Corrected feed for the same day: overwrite, not duplicate
        repo.upsert_many(&[upsert("USD", "EUR", dec!(0.915), 1)])
            .await
            .unwrap();

        let rate = repo
            .rate_at_or_before(code("USD"), code("EUR"), Some(day(1)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(rate.rate, dec!(0.915));

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM fx_rates")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_direction_matters_at_this_layer() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.fx_rates();

        repo.upsert_many(&[upsert("USD", "EUR", dec!(0.91), 1)])
            .await
            .unwrap();

        // The inverse pair is not stored; fallback is the service's job
        assert!(repo
            .rate_at_or_before(code("EUR"), code("USD"), Some(day(1)))
            .await
            .unwrap()
            .is_none());
    }
}
