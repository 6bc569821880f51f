//! # Currency Repository
//!
//! Database operations for the currency registry.
//!
//! Every decimal↔minor-unit conversion in the platform reads the exponent
//! from this table, so the pricing layer wraps it in a read-through cache
//! (`procura-pricing::CurrencyRegistry`). This repository stays dumb: rows
//! in, rows out.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use procura_core::money::CurrencyCode;
use procura_core::types::Currency;

/// Raw row as stored; converted to the domain type on the way out.
#[derive(Debug, sqlx::FromRow)]
struct CurrencyRow {
    code: String,
    name: String,
    minor_units: i64,
    active: bool,
}

impl TryFrom<CurrencyRow> for Currency {
    type Error = DbError;

    fn try_from(row: CurrencyRow) -> Result<Self, Self::Error> {
        let code = CurrencyCode::new(&row.code)
            .map_err(|_| DbError::invalid_value("currencies", "code", &row.code))?;
        let minor_units = u32::try_from(row.minor_units).map_err(|_| {
            DbError::invalid_value("currencies", "minor_units", row.minor_units.to_string())
        })?;

        Ok(Currency {
            code,
            name: row.name,
            minor_units,
            active: row.active,
        })
    }
}

/// Repository for currency registry operations.
#[derive(Debug, Clone)]
pub struct CurrencyRepository {
    pool: SqlitePool,
}

impl CurrencyRepository {
    /// Creates a new CurrencyRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CurrencyRepository { pool }
    }

    /// Gets a currency by its ISO code.
    ///
    /// ## Returns
    /// * `Ok(Some(Currency))` - Currency found
    /// * `Ok(None)` - Currency not in the registry
    pub async fn get_by_code(&self, code: CurrencyCode) -> DbResult<Option<Currency>> {
        let row: Option<CurrencyRow> = sqlx::query_as(
            r#"
            SELECT code, name, minor_units, active
            FROM currencies
            WHERE code = ?1
            "#,
        )
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Currency::try_from).transpose()
    }

    /// Lists active currencies, ordered by code.
    pub async fn list_active(&self) -> DbResult<Vec<Currency>> {
        let rows: Vec<CurrencyRow> = sqlx::query_as(
            r#"
            SELECT code, name, minor_units, active
            FROM currencies
            WHERE active = 1
            ORDER BY code
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Currency::try_from).collect()
    }

    /// Inserts or updates a currency row (admin/import path).
    pub async fn upsert(&self, currency: &Currency) -> DbResult<()> {
        debug!(code = %currency.code, "Upserting currency");

        sqlx::query(
            r#"
            INSERT INTO currencies (code, name, minor_units, active)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT (code) DO UPDATE SET
                name = excluded.name,
                minor_units = excluded.minor_units,
                active = excluded.active
            "#,
        )
        .bind(currency.code.as_str())
        .bind(&currency.name)
        .bind(currency.minor_units as i64)
        .bind(currency.active)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    fn currency(code: &str, minor_units: u32) -> Currency {
        Currency {
            code: code.parse().unwrap(),
            name: code.to_string(),
            minor_units,
            active: true,
        }
    }

    #[tokio::test]
    async fn test_upsert_and_get() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.currencies();

        repo.upsert(&currency("USD", 2)).await.unwrap();
        repo.upsert(&currency("JPY", 0)).await.unwrap();

        let usd = repo
            .get_by_code("USD".parse().unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(usd.minor_units, 2);

        let jpy = repo
            .get_by_code("JPY".parse().unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(jpy.minor_units, 0);

        assert!(repo
            .get_by_code("XXX".parse().unwrap())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_upsert_is_idempotent() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.currencies();

        repo.upsert(&currency("USD", 2)).await.unwrap();

        // Same code again with a new name: update, not duplicate
        let mut renamed = currency("USD", 2);
        renamed.name = "US Dollar".to_string();
        repo.upsert(&renamed).await.unwrap();

        let all = repo.list_active().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "US Dollar");
    }
}
