//! # procura-db: Database Layer for Procura
//!
//! This crate provides database access for the Procura pricing registries.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Procura Data Flow                                │
//! │                                                                         │
//! │  Pricing service (TotalsCalculator, FxService, UnitConverter)          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     procura-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ CurrencyRepo  │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ TaxCodeRepo   │    │ 001_init.sql │  │   │
//! │  │   │ Connection    │    │ UomRepo       │    │ ...          │  │   │
//! │  │   │ Management    │    │ FxRateRepo    │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database (WAL mode, foreign keys on)                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (currency, tax code, uom, fx)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use procura_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/procura.db")).await?;
//! let codes = db.tax_codes().list_active(company_id).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::currency::CurrencyRepository;
pub use repository::fx_rate::{FxRateRepository, FxRateUpsert};
pub use repository::tax_code::TaxCodeRepository;
pub use repository::uom::UomRepository;
