//! # procura-pricing: Pricing Services for Procura
//!
//! Wires the pure computation in `procura-core` to the SQLite registries
//! in `procura-db`, adding the read-through caches the request path needs.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Procura Service Layer                              │
//! │                                                                         │
//! │  Web layer (HTTP JSON API, outside this workspace)                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  procura-pricing (THIS CRATE)                   │   │
//! │  │                                                                 │   │
//! │  │  ┌──────────────────┐ ┌────────────┐ ┌──────────────────────┐  │   │
//! │  │  │ TotalsCalculator │ │ FxService  │ │ UnitConverter        │  │   │
//! │  │  │ resolve + total  │ │ rates +    │ │ graph build + cache  │  │   │
//! │  │  └──────────────────┘ │ convert    │ └──────────────────────┘  │   │
//! │  │  ┌──────────────────┐ └────────────┘ ┌──────────────────────┐  │   │
//! │  │  │ CurrencyRegistry │                │ TtlCache             │  │   │
//! │  │  │ read-through     │                │ shared TTL/forever   │  │   │
//! │  │  └──────────────────┘                └──────────────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                              │                                  │
//! │       ▼                              ▼                                  │
//! │  procura-core (pure math)      procura-db (registries)                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`totals`] - Document totals against the company tax registry
//! - [`fx`] - FX rate lookup (direct + inverse fallback) and conversion
//! - [`uom`] - Per-company unit conversion with cached graphs
//! - [`currency_registry`] - Read-through minor-unit exponent lookup
//! - [`cache`] - Shared TTL/forever cache
//! - [`error`] - Service error type
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use procura_db::{Database, DbConfig};
//! use procura_pricing::{CurrencyRegistry, FxService};
//!
//! let db = Database::new(DbConfig::new("./procura.db")).await?;
//! let currencies = CurrencyRegistry::new(db.currencies());
//! let fx = FxService::new(db.fx_rates(), currencies);
//!
//! let rate = fx.get_rate("USD".parse()?, "EUR".parse()?, None).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cache;
pub mod currency_registry;
pub mod error;
pub mod fx;
pub mod totals;
pub mod uom;

// =============================================================================
// Re-exports
// =============================================================================

pub use cache::TtlCache;
pub use currency_registry::CurrencyRegistry;
pub use error::{PricingError, PricingResult};
pub use fx::FxService;
pub use totals::{DocumentSpec, TotalsCalculator};
pub use uom::UnitConverter;

// Upsert input re-exported so API callers don't need procura-db directly
pub use procura_db::FxRateUpsert;
