//! # procura-core: Pure Pricing Logic for Procura
//!
//! This crate is the **heart** of the Procura procurement platform. It
//! contains the monetary, tax, totals, and unit-conversion logic as pure
//! functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Procura Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Frontend (React SPA)                         │   │
//! │  │    RFQ UI ──► Quote Compare UI ──► PO UI ──► Invoice UI        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ JSON API                               │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    procura-pricing (services)                   │   │
//! │  │    TotalsCalculator, FxService, UnitConverter, registries      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ procura-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   money   │  │    tax    │  │  totals   │  │    uom    │  │   │
//! │  │   │   Money   │  │ TaxCalc   │  │ DocTotals │  │ ConvGraph │  │   │
//! │  │   │ Rounding  │  │ regimes   │  │ LineSpec  │  │    BFS    │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    procura-db (Database Layer)                  │   │
//! │  │          SQLite registries: tax codes, uoms, fx rates           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Money type with integer minor units (no floating point!)
//! - [`types`] - Domain types (TaxCode, Uom, FxRate, Currency, etc.)
//! - [`tax`] - Per-line tax computation (exclusive/inclusive regimes)
//! - [`totals`] - Document totals aggregation
//! - [`uom`] - Unit conversion graph with BFS pathfinding
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in minor units (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use procura_core::money::{Money, RoundingRule};
//! use procura_core::tax::TaxCalculator;
//! use procura_core::types::TaxRegime;
//! use rust_decimal::Decimal;
//!
//! let usd = "USD".parse().unwrap();
//! let calc = TaxCalculator::new(RoundingRule::HalfUp);
//!
//! // $100.00 × 2, no tax codes attached
//! let result = calc
//!     .line_taxes(Money::from_minor(10000, usd), Decimal::from(2), TaxRegime::Exclusive, &[])
//!     .unwrap();
//! assert_eq!(result.grand_total.minor(), 20000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod tax;
pub mod totals;
pub mod types;
pub mod uom;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use procura_core::Money` instead of
// `use procura_core::money::Money`

pub use error::{ConversionError, CoreError, CoreResult, ValidationError};
pub use money::{CurrencyCode, Money, RoundingRule};
pub use tax::{LineTaxes, TaxCalculator, TaxLine};
pub use totals::{DocumentTotals, LineSpec};
pub use types::*;
pub use uom::ConversionGraph;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default company ID for single-tenant deployments and tests.
///
/// ## Why a constant?
/// The schema is multi-tenant (every registry row carries company_id), but
/// self-hosted deployments run a single company. This constant is used by
/// the seed tooling and tests; SaaS deployments resolve company ids from
/// the session.
pub const DEFAULT_COMPANY_ID: &str = "00000000-0000-0000-0000-000000000001";

/// Decimal places FX rates are stored and derived at.
///
/// Inverse rates (1/rate) are rounded half-even to this scale.
pub const FX_RATE_SCALE: u32 = 8;
