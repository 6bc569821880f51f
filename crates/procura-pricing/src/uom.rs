//! # Unit Converter Service
//!
//! Loads a company's units and conversion edges, builds the in-memory
//! `ConversionGraph`, and caches it per company. Admin write paths go
//! through this service so the cached graph is invalidated immediately
//! instead of serving stale edges until the TTL runs out.

use std::time::Duration;

use rust_decimal::Decimal;
use tracing::debug;

use crate::cache::TtlCache;
use crate::error::PricingResult;
use procura_core::uom::ConversionGraph;
use procura_core::types::{Uom, UomConversion};
use procura_db::UomRepository;

/// How long a built graph may serve conversions before a reload.
///
/// Registry edits outside this service (direct SQL, another node) surface
/// after at most this window.
const GRAPH_CACHE_TTL: Duration = Duration::from_secs(300);

/// Service converting quantities between a company's units of measure.
#[derive(Debug, Clone)]
pub struct UnitConverter {
    uoms: UomRepository,
    graphs: TtlCache<String, ConversionGraph>,
}

impl UnitConverter {
    /// Creates a converter over the given repository.
    pub fn new(uoms: UomRepository) -> Self {
        UnitConverter {
            uoms,
            graphs: TtlCache::new(),
        }
    }

    /// Converts a quantity between two units.
    ///
    /// ## Errors
    /// - `ConversionError::UnknownUom` - id not in the company's registry
    /// - `ConversionError::DimensionMismatch` - units measure different things
    /// - `ConversionError::NoPath` - no chain of conversions links them
    pub async fn convert(
        &self,
        company_id: &str,
        quantity: Decimal,
        from_uom_id: &str,
        to_uom_id: &str,
    ) -> PricingResult<Decimal> {
        let graph = self.graph_for(company_id).await?;
        Ok(graph.convert(quantity, from_uom_id, to_uom_id)?)
    }

    /// Adds a unit and invalidates the company's cached graph.
    pub async fn add_uom(&self, uom: &Uom) -> PricingResult<()> {
        self.uoms.insert_uom(uom).await?;
        self.invalidate(&uom.company_id);
        Ok(())
    }

    /// Adds a conversion edge and invalidates the company's cached graph.
    pub async fn add_conversion(&self, conversion: &UomConversion) -> PricingResult<()> {
        self.uoms.insert_conversion(conversion).await?;
        self.invalidate(&conversion.company_id);
        Ok(())
    }

    /// Soft-deletes a conversion edge and invalidates the cached graph.
    pub async fn remove_conversion(&self, company_id: &str, id: &str) -> PricingResult<()> {
        self.uoms.soft_delete_conversion(company_id, id).await?;
        self.invalidate(company_id);
        Ok(())
    }

    /// Drops the company's cached graph.
    pub fn invalidate(&self, company_id: &str) {
        self.graphs.remove(&company_id.to_string());
    }

    /// Returns the cached graph or builds it from the registry.
    async fn graph_for(&self, company_id: &str) -> PricingResult<ConversionGraph> {
        let key = company_id.to_string();
        if let Some(graph) = self.graphs.get(&key) {
            return Ok(graph);
        }

        let uoms = self.uoms.list_active(company_id).await?;
        let conversions = self.uoms.list_active_conversions(company_id).await?;
        let graph = ConversionGraph::build(uoms, &conversions);

        debug!(
            company_id = %company_id,
            units = graph.unit_count(),
            "Conversion graph built"
        );

        self.graphs.insert(key, graph.clone(), GRAPH_CACHE_TTL);
        Ok(graph)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
