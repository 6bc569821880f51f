//! # Tax Code Repository
//!
//! Database operations for company-scoped tax codes.
//!
//! ## Resolution Contract
//! `get_by_ids` returns a slot per requested id, aligned with the input
//! order, so the totals service can report exactly which id on which line
//! was unknown. Active filtering happens in the service layer - an
//! inactive code must produce a validation error, not a silent skip.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::SqlitePool;
use std::str::FromStr;
use tracing::debug;

use crate::error::{DbError, DbResult};
use procura_core::types::TaxCode;

/// Raw row as stored; rate_percent is TEXT and parsed on the way out.
#[derive(Debug, sqlx::FromRow)]
struct TaxCodeRow {
    id: String,
    company_id: String,
    code: String,
    name: String,
    rate_percent: String,
    is_compound: bool,
    sequence: i64,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TaxCodeRow> for TaxCode {
    type Error = DbError;

    fn try_from(row: TaxCodeRow) -> Result<Self, Self::Error> {
        let rate_percent = Decimal::from_str(&row.rate_percent).map_err(|_| {
            DbError::invalid_value("tax_codes", "rate_percent", &row.rate_percent)
        })?;

        Ok(TaxCode {
            id: row.id,
            company_id: row.company_id,
            code: row.code,
            name: row.name,
            rate_percent,
            is_compound: row.is_compound,
            sequence: row.sequence,
            active: row.active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const SELECT_COLUMNS: &str = r#"
    SELECT id, company_id, code, name, rate_percent,
           is_compound, sequence, active, created_at, updated_at
    FROM tax_codes
"#;

/// Repository for tax code database operations.
#[derive(Debug, Clone)]
pub struct TaxCodeRepository {
    pool: SqlitePool,
}

impl TaxCodeRepository {
    /// Creates a new TaxCodeRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TaxCodeRepository { pool }
    }

    /// Gets a tax code by id, scoped to a company.
    pub async fn get_by_id(&self, company_id: &str, id: &str) -> DbResult<Option<TaxCode>> {
        let row: Option<TaxCodeRow> =
            sqlx::query_as(&format!("{SELECT_COLUMNS} WHERE company_id = ?1 AND id = ?2"))
                .bind(company_id)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(TaxCode::try_from).transpose()
    }

    /// Resolves a list of tax code ids, preserving input order.
    ///
    /// Each slot is `None` when the id does not exist for the company.
    /// Inactive codes are returned as-is; the caller decides whether that
    /// is an error (line persistence) or acceptable (historic display).
    pub async fn get_by_ids(
        &self,
        company_id: &str,
        ids: &[String],
    ) -> DbResult<Vec<Option<TaxCode>>> {
        let mut resolved = Vec::with_capacity(ids.len());
        for id in ids {
            resolved.push(self.get_by_id(company_id, id).await?);
        }
        Ok(resolved)
    }

    /// Lists active tax codes for a company, in stacking order.
    pub async fn list_active(&self, company_id: &str) -> DbResult<Vec<TaxCode>> {
        let rows: Vec<TaxCodeRow> = sqlx::query_as(&format!(
            "{SELECT_COLUMNS} WHERE company_id = ?1 AND active = 1 ORDER BY sequence, code"
        ))
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TaxCode::try_from).collect()
    }

    /// Inserts a new tax code.
    ///
    /// ## Errors
    /// * `DbError::UniqueViolation` - code already exists for the company
    pub async fn insert(&self, tax_code: &TaxCode) -> DbResult<()> {
        debug!(code = %tax_code.code, company_id = %tax_code.company_id, "Inserting tax code");

        sqlx::query(
            r#"
            INSERT INTO tax_codes (
                id, company_id, code, name, rate_percent,
                is_compound, sequence, active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&tax_code.id)
        .bind(&tax_code.company_id)
        .bind(&tax_code.code)
        .bind(&tax_code.name)
        .bind(tax_code.rate_percent.to_string())
        .bind(tax_code.is_compound)
        .bind(tax_code.sequence)
        .bind(tax_code.active)
        .bind(tax_code.created_at)
        .bind(tax_code.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Activates or deactivates a tax code (soft delete pattern).
    ///
    /// ## Why Soft Delete?
    /// Historic document lines still reference the code; deactivation only
    /// blocks new attachments.
    pub async fn set_active(&self, company_id: &str, id: &str, active: bool) -> DbResult<()> {
        debug!(id = %id, active = active, "Setting tax code active flag");

        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE tax_codes
            SET active = ?3, updated_at = ?4
            WHERE company_id = ?1 AND id = ?2
            "#,
        )
        .bind(company_id)
        .bind(id)
        .bind(active)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("TaxCode", id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
