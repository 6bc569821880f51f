//! # Unit Conversion Graph
//!
//! Converts quantities between units of measure via a per-dimension graph.
//!
//! ## How Conversion Works
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Conversion Graph (Mass)                              │
//! │                                                                         │
//! │  Stored rows:        lb ──(×0.453592)──► kg ──(×1000)──► g             │
//! │                                                                         │
//! │  Derived inverses:   lb ◄──(×1/0.453592)── kg ◄──(×0.001)── g          │
//! │                                                                         │
//! │  convert(10, lb, g):                                                    │
//! │       BFS finds lb → kg → g                                             │
//! │       10 × 0.453592 = 4.53592                                           │
//! │       4.53592 × 1000 = 4535.92                                          │
//! │       truncate to Mass scale (6 dp) → 4535.92                           │
//! │                                                                         │
//! │  Edges are affine (value × factor + offset) so temperature scales       │
//! │  work too: °C ──(×1.8 +32)──► °F                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - Conversions never cross dimensions; kg → litre is an error
//! - Soft-deleted and zero-factor rows never enter the graph
//! - Results are truncated (rounded down) to the dimension's scale

use std::collections::{HashMap, HashSet, VecDeque};

use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{ConversionError, ConversionResult};
use crate::types::{Uom, UomConversion};

// =============================================================================
// Graph Types
// =============================================================================

/// A directed edge applying `value * factor + offset`.
#[derive(Debug, Clone)]
struct ConversionEdge {
    to_uom_id: String,
    factor: Decimal,
    offset: Decimal,
}

/// In-memory conversion graph for one company's units.
///
/// Built from registry rows, held by the service layer, rebuilt when an
/// administrator edits units or conversions.
///
/// ## Usage
/// ```rust
/// use procura_core::uom::ConversionGraph;
/// # use procura_core::types::{Dimension, Uom, UomConversion};
/// # use chrono::Utc;
/// # use rust_decimal::Decimal;
/// # fn uom(id: &str, code: &str, dimension: Dimension) -> Uom {
/// #     Uom { id: id.into(), company_id: "c".into(), code: code.into(),
/// #           name: code.into(), dimension, active: true,
/// #           created_at: Utc::now(), updated_at: Utc::now() }
/// # }
/// let kg = uom("u-kg", "kg", Dimension::Mass);
/// let g = uom("u-g", "g", Dimension::Mass);
/// let conversions = vec![UomConversion {
///     id: "c-1".into(),
///     company_id: "c".into(),
///     from_uom_id: "u-kg".into(),
///     to_uom_id: "u-g".into(),
///     factor: Decimal::from(1000),
///     offset: Decimal::ZERO,
///     created_at: Utc::now(),
///     deleted_at: None,
/// }];
///
/// let graph = ConversionGraph::build(vec![kg, g], &conversions);
/// let grams = graph.convert(Decimal::from(2), "u-kg", "u-g").unwrap();
/// assert_eq!(grams, Decimal::from(2000));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConversionGraph {
    units: HashMap<String, Uom>,
    edges: HashMap<String, Vec<ConversionEdge>>,
}

impl ConversionGraph {
    /// Builds the graph from registry rows.
    ///
    /// Each stored row contributes its forward edge and an automatically
    /// derived inverse (factor⁻¹, offset = -offset/factor), so traversal
    /// is effectively undirected. Rows that are soft-deleted, reference an
    /// unknown or inactive unit, cross dimensions, or carry a zero factor
    /// are skipped; a half-usable graph beats refusing to price a quote.
    pub fn build(uoms: Vec<Uom>, conversions: &[UomConversion]) -> Self {
        let units: HashMap<String, Uom> = uoms
            .into_iter()
            .filter(|u| u.active)
            .map(|u| (u.id.clone(), u))
            .collect();

        let mut edges: HashMap<String, Vec<ConversionEdge>> = HashMap::new();

        for conv in conversions {
            if conv.deleted_at.is_some() || conv.factor.is_zero() {
                continue;
            }

            let (from, to) = match (units.get(&conv.from_uom_id), units.get(&conv.to_uom_id)) {
                (Some(from), Some(to)) => (from, to),
                _ => continue,
            };
            if from.dimension != to.dimension {
                continue;
            }

            edges
                .entry(conv.from_uom_id.clone())
                .or_default()
                .push(ConversionEdge {
                    to_uom_id: conv.to_uom_id.clone(),
                    factor: conv.factor,
                    offset: conv.offset,
                });

            // Inverse of value*f + o is (value - o)/f = value*(1/f) + (-o/f)
            let inverse_factor = Decimal::ONE / conv.factor;
            edges
                .entry(conv.to_uom_id.clone())
                .or_default()
                .push(ConversionEdge {
                    to_uom_id: conv.from_uom_id.clone(),
                    factor: inverse_factor,
                    offset: -conv.offset / conv.factor,
                });
        }

        ConversionGraph { units, edges }
    }

    /// Number of units in the graph.
    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    /// Looks up a unit by id.
    pub fn unit(&self, uom_id: &str) -> Option<&Uom> {
        self.units.get(uom_id)
    }

    /// Converts a quantity between two units.
    ///
    /// ## Behavior
    /// - Same unit: quantity truncated to the dimension scale
    /// - Different dimensions: `ConversionError::DimensionMismatch`
    /// - Otherwise: BFS finds a (possibly multi-hop) path; each edge's
    ///   affine transform is applied in order; the result is truncated to
    ///   the dimension scale
    /// - No path: `ConversionError::NoPath`
    pub fn convert(
        &self,
        quantity: Decimal,
        from_uom_id: &str,
        to_uom_id: &str,
    ) -> ConversionResult<Decimal> {
        let from = self
            .units
            .get(from_uom_id)
            .ok_or_else(|| ConversionError::UnknownUom {
                id: from_uom_id.to_string(),
            })?;
        let to = self
            .units
            .get(to_uom_id)
            .ok_or_else(|| ConversionError::UnknownUom {
                id: to_uom_id.to_string(),
            })?;

        let scale = from.dimension.scale();

        if from.id == to.id {
            return Ok(truncate(quantity, scale));
        }

        if from.dimension != to.dimension {
            return Err(ConversionError::DimensionMismatch {
                from_code: from.code.clone(),
                to_code: to.code.clone(),
                from_dimension: from.dimension,
                to_dimension: to.dimension,
            });
        }

        let path = self
            .shortest_path(from_uom_id, to_uom_id)
            .ok_or_else(|| ConversionError::NoPath {
                from_code: from.code.clone(),
                to_code: to.code.clone(),
            })?;

        let mut value = quantity;
        for edge in path {
            value = value * edge.factor + edge.offset;
        }

        Ok(truncate(value, scale))
    }

    /// BFS over the adjacency list; returns the edge chain from → to.
    fn shortest_path(&self, from_uom_id: &str, to_uom_id: &str) -> Option<Vec<&ConversionEdge>> {
        // predecessor: node -> (previous node, edge taken to get here)
        let mut prev: HashMap<&str, (&str, &ConversionEdge)> = HashMap::new();
        let mut seen: HashSet<&str> = HashSet::new();
        let mut queue: VecDeque<&str> = VecDeque::new();

        seen.insert(from_uom_id);
        queue.push_back(from_uom_id);

        while let Some(node) = queue.pop_front() {
            if node == to_uom_id {
                // Walk predecessors back to the start, then reverse
                let mut path = Vec::new();
                let mut cursor = node;
                while cursor != from_uom_id {
                    let (parent, edge) = prev[cursor];
                    path.push(edge);
                    cursor = parent;
                }
                path.reverse();
                return Some(path);
            }

            for edge in self.edges.get(node).map(Vec::as_slice).unwrap_or(&[]) {
                let next = edge.to_uom_id.as_str();
                if seen.insert(next) {
                    prev.insert(next, (node, edge));
                    queue.push_back(next);
                }
            }
        }

        None
    }
}

/// Rounds down (toward zero) to the given decimal scale.
fn truncate(value: Decimal, scale: u32) -> Decimal {
    value.round_dp_with_strategy(scale, RoundingStrategy::ToZero)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Dimension;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn uom(id: &str, code: &str, dimension: Dimension) -> Uom {
        Uom {
            id: id.to_string(),
            company_id: "company-1".to_string(),
            code: code.to_string(),
            name: code.to_string(),
            dimension,
            active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn conversion(id: &str, from: &str, to: &str, factor: Decimal, offset: Decimal) -> UomConversion {
        UomConversion {
            id: id.to_string(),
            company_id: "company-1".to_string(),
            from_uom_id: from.to_string(),
            to_uom_id: to.to_string(),
            factor,
            offset,
            created_at: Utc::now(),
            deleted_at: None,
        }
    }

    fn mass_graph() -> ConversionGraph {
        ConversionGraph::build(
            vec![
                uom("u-lb", "lb", Dimension::Mass),
                uom("u-kg", "kg", Dimension::Mass),
                uom("u-g", "g", Dimension::Mass),
                uom("u-l", "L", Dimension::Volume),
            ],
            &[
                conversion("c-1", "u-lb", "u-kg", dec!(0.453592), dec!(0)),
                conversion("c-2", "u-kg", "u-g", dec!(1000), dec!(0)),
            ],
        )
    }

    #[test]
    fn test_same_unit_truncates_to_scale() {
        let graph = mass_graph();
        let result = graph.convert(dec!(1.23456789), "u-kg", "u-kg").unwrap();
        assert_eq!(result, dec!(1.234567)); // Mass scale is 6, rounded down
    }

    #[test]
    fn test_direct_conversion() {
        let graph = mass_graph();
        let result = graph.convert(dec!(2), "u-kg", "u-g").unwrap();
        assert_eq!(result, dec!(2000));
    }

    #[test]
    fn test_derived_inverse_edge() {
        let graph = mass_graph();
        // Only kg→g is stored; g→kg must still work
        let result = graph.convert(dec!(500), "u-g", "u-kg").unwrap();
        assert_eq!(result, dec!(0.5));
    }

    #[test]
    fn test_multi_hop_path() {
        let graph = mass_graph();
        // lb → kg → g
        let result = graph.convert(dec!(10), "u-lb", "u-g").unwrap();
        assert_eq!(result, dec!(4535.92));
    }

    #[test]
    fn test_round_trip_within_scale_tolerance() {
        let graph = mass_graph();
        let original = dec!(7.25);
        let there = graph.convert(original, "u-lb", "u-g").unwrap();
        let back = graph.convert(there, "u-g", "u-lb").unwrap();
        let tolerance = dec!(0.000002); // one ulp at Mass scale per leg
        assert!((back - original).abs() <= tolerance, "got {}", back);
    }

    #[test]
    fn test_temperature_affine_conversion() {
        let graph = ConversionGraph::build(
            vec![
                uom("u-c", "degC", Dimension::Temperature),
                uom("u-f", "degF", Dimension::Temperature),
            ],
            &[conversion("c-1", "u-c", "u-f", dec!(1.8), dec!(32))],
        );

        assert_eq!(graph.convert(dec!(100), "u-c", "u-f").unwrap(), dec!(212));
        assert_eq!(graph.convert(dec!(0), "u-c", "u-f").unwrap(), dec!(32));
        // Derived inverse: (value - 32) / 1.8
        assert_eq!(graph.convert(dec!(212), "u-f", "u-c").unwrap(), dec!(100));
        assert_eq!(graph.convert(dec!(32), "u-f", "u-c").unwrap(), dec!(0));
    }

    #[test]
    fn test_dimension_mismatch() {
        let graph = mass_graph();
        let result = graph.convert(dec!(1), "u-kg", "u-l");
        assert!(matches!(
            result,
            Err(ConversionError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_unknown_unit() {
        let graph = mass_graph();
        assert!(matches!(
            graph.convert(dec!(1), "u-missing", "u-kg"),
            Err(ConversionError::UnknownUom { .. })
        ));
    }

    #[test]
    fn test_no_path_between_disconnected_units() {
        let graph = ConversionGraph::build(
            vec![
                uom("u-kg", "kg", Dimension::Mass),
                uom("u-t", "tonne", Dimension::Mass),
            ],
            &[], // no conversions at all
        );
        assert!(matches!(
            graph.convert(dec!(1), "u-kg", "u-t"),
            Err(ConversionError::NoPath { .. })
        ));
    }

    #[test]
    fn test_soft_deleted_rows_are_excluded() {
        let mut conv = conversion("c-1", "u-kg", "u-g", dec!(1000), dec!(0));
        conv.deleted_at = Some(Utc::now());

        let graph = ConversionGraph::build(
            vec![
                uom("u-kg", "kg", Dimension::Mass),
                uom("u-g", "g", Dimension::Mass),
            ],
            &[conv],
        );
        assert!(matches!(
            graph.convert(dec!(1), "u-kg", "u-g"),
            Err(ConversionError::NoPath { .. })
        ));
    }

    #[test]
    fn test_zero_factor_rows_are_excluded() {
        let graph = ConversionGraph::build(
            vec![
                uom("u-kg", "kg", Dimension::Mass),
                uom("u-g", "g", Dimension::Mass),
            ],
            &[conversion("c-1", "u-kg", "u-g", dec!(0), dec!(0))],
        );
        assert!(matches!(
            graph.convert(dec!(1), "u-kg", "u-g"),
            Err(ConversionError::NoPath { .. })
        ));
    }

    #[test]
    fn test_cross_dimension_rows_are_excluded() {
        // A bad import row linking kg to litres must not corrupt the graph
        let graph = ConversionGraph::build(
            vec![
                uom("u-kg", "kg", Dimension::Mass),
                uom("u-l", "L", Dimension::Volume),
            ],
            &[conversion("c-1", "u-kg", "u-l", dec!(1), dec!(0))],
        );
        assert!(matches!(
            graph.convert(dec!(1), "u-kg", "u-l"),
            Err(ConversionError::DimensionMismatch { .. })
        ));
    }
}
