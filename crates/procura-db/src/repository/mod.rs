//! # Repository Implementations
//!
//! One repository per registry aggregate:
//!
//! - [`currency`] - Currency registry (minor-unit exponents)
//! - [`tax_code`] - Company-scoped tax codes
//! - [`uom`] - Units of measure and conversion edges
//! - [`fx_rate`] - Daily FX rates

pub mod currency;
pub mod fx_rate;
pub mod tax_code;
pub mod uom;
