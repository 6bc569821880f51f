//! # Unit of Measure Repository
//!
//! Database operations for units and their conversion edges.
//!
//! ## Graph Loading
//! The pricing layer loads `list_active` + `list_active_conversions` per
//! company and builds a `ConversionGraph` in memory. Soft-deleted
//! conversions (`deleted_at` set) never leave this layer.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::SqlitePool;
use std::str::FromStr;
use tracing::debug;

use crate::error::{DbError, DbResult};
use procura_core::types::{Dimension, Uom, UomConversion};

/// Raw uom row; dimension decodes through the core enum (stored lowercase).
#[derive(Debug, sqlx::FromRow)]
struct UomRow {
    id: String,
    company_id: String,
    code: String,
    name: String,
    dimension: Dimension,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UomRow> for Uom {
    fn from(row: UomRow) -> Self {
        Uom {
            id: row.id,
            company_id: row.company_id,
            code: row.code,
            name: row.name,
            dimension: row.dimension,
            active: row.active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Raw conversion row; factor/offset are TEXT and parsed on the way out.
#[derive(Debug, sqlx::FromRow)]
struct UomConversionRow {
    id: String,
    company_id: String,
    from_uom_id: String,
    to_uom_id: String,
    factor: String,
    offset: String,
    created_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl TryFrom<UomConversionRow> for UomConversion {
    type Error = DbError;

    fn try_from(row: UomConversionRow) -> Result<Self, Self::Error> {
        let factor = Decimal::from_str(&row.factor)
            .map_err(|_| DbError::invalid_value("uom_conversions", "factor", &row.factor))?;
        let offset = Decimal::from_str(&row.offset)
            .map_err(|_| DbError::invalid_value("uom_conversions", "offset", &row.offset))?;

        Ok(UomConversion {
            id: row.id,
            company_id: row.company_id,
            from_uom_id: row.from_uom_id,
            to_uom_id: row.to_uom_id,
            factor,
            offset,
            created_at: row.created_at,
            deleted_at: row.deleted_at,
        })
    }
}

/// Repository for unit-of-measure database operations.
#[derive(Debug, Clone)]
pub struct UomRepository {
    pool: SqlitePool,
}

impl UomRepository {
    /// Creates a new UomRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UomRepository { pool }
    }

    /// Lists active units for a company.
    pub async fn list_active(&self, company_id: &str) -> DbResult<Vec<Uom>> {
        let rows: Vec<UomRow> = sqlx::query_as(
            r#"
            SELECT id, company_id, code, name, dimension, active, created_at, updated_at
            FROM uoms
            WHERE company_id = ?1 AND active = 1
            ORDER BY code
            "#,
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Uom::from).collect())
    }

    /// Gets a unit by id, scoped to a company.
    pub async fn get_by_id(&self, company_id: &str, id: &str) -> DbResult<Option<Uom>> {
        let row: Option<UomRow> = sqlx::query_as(
            r#"
            SELECT id, company_id, code, name, dimension, active, created_at, updated_at
            FROM uoms
            WHERE company_id = ?1 AND id = ?2
            "#,
        )
        .bind(company_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Uom::from))
    }

    /// Lists conversions for a company, excluding soft-deleted rows.
    pub async fn list_active_conversions(&self, company_id: &str) -> DbResult<Vec<UomConversion>> {
        let rows: Vec<UomConversionRow> = sqlx::query_as(
            r#"
            SELECT id, company_id, from_uom_id, to_uom_id, factor, "offset",
                   created_at, deleted_at
            FROM uom_conversions
            WHERE company_id = ?1 AND deleted_at IS NULL
            ORDER BY created_at
            "#,
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(UomConversion::try_from).collect()
    }

    /// Inserts a new unit.
    pub async fn insert_uom(&self, uom: &Uom) -> DbResult<()> {
        debug!(code = %uom.code, company_id = %uom.company_id, "Inserting uom");

        sqlx::query(
            r#"
            INSERT INTO uoms (id, company_id, code, name, dimension, active, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&uom.id)
        .bind(&uom.company_id)
        .bind(&uom.code)
        .bind(&uom.name)
        .bind(uom.dimension)
        .bind(uom.active)
        .bind(uom.created_at)
        .bind(uom.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Inserts a new conversion edge.
    ///
    /// ## Errors
    /// * `DbError::ForeignKeyViolation` - endpoint uom does not exist
    /// * `DbError::UniqueViolation` - edge already stored for the company
    pub async fn insert_conversion(&self, conversion: &UomConversion) -> DbResult<()> {
        debug!(
            from = %conversion.from_uom_id,
            to = %conversion.to_uom_id,
            "Inserting uom conversion"
        );

        sqlx::query(
            r#"
            INSERT INTO uom_conversions (
                id, company_id, from_uom_id, to_uom_id, factor, "offset",
                created_at, deleted_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&conversion.id)
        .bind(&conversion.company_id)
        .bind(&conversion.from_uom_id)
        .bind(&conversion.to_uom_id)
        .bind(conversion.factor.to_string())
        .bind(conversion.offset.to_string())
        .bind(conversion.created_at)
        .bind(conversion.deleted_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Soft-deletes a conversion edge.
    ///
    /// The row stays for audit; the graph builder skips it.
    pub async fn soft_delete_conversion(&self, company_id: &str, id: &str) -> DbResult<()> {
        debug!(id = %id, "Soft-deleting uom conversion");

        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE uom_conversions
            SET deleted_at = ?3
            WHERE company_id = ?1 AND id = ?2 AND deleted_at IS NULL
            "#,
        )
        .bind(company_id)
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("UomConversion", id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
