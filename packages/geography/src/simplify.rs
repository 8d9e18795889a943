//! Fixed-tolerance polygon simplification.
//!
//! Every level is materialized eagerly from the authoritative polygon set
//! using Douglas-Peucker with that level's tolerance (in degrees). Levels
//! are immutable once built.

use geo::{LineString, MultiPolygon, Polygon, Simplify};
use migration_map_geography_models::{
    LEVEL_COUNT, SimplificationLevel, StateBoundaries, StateBoundary,
};

use crate::GeoError;

/// Simplification tolerance per level, coarsest first.
///
/// Zoom 1 (whole country) uses the heaviest generalization; zoom 10 keeps
/// nearly every vertex.
pub const DEFAULT_TOLERANCES: [f64; LEVEL_COUNT] = [
    0.20, 0.18, 0.15, 0.12, 0.10, 0.08, 0.06, 0.04, 0.02, 0.0001,
];

/// A closed ring needs at least four coordinates (first == last).
const MIN_RING_COORDS: usize = 4;

/// All simplification levels of one polygon set.
#[derive(Debug, Clone)]
pub struct BoundaryLevels {
    levels: [StateBoundaries; LEVEL_COUNT],
}

impl BoundaryLevels {
    /// Simplifies `source` once per tolerance.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::InvalidTolerances`] if any tolerance is negative
    /// or not finite, or if the table is not ordered from coarsest to
    /// finest.
    pub fn build(
        source: &StateBoundaries,
        tolerances: &[f64; LEVEL_COUNT],
    ) -> Result<Self, GeoError> {
        validate_tolerances(tolerances)?;

        let levels = std::array::from_fn(|i| simplify_boundaries(source, tolerances[i]));

        log::info!(
            "Precomputed {LEVEL_COUNT} simplification levels for {} state features",
            source.len()
        );

        Ok(Self { levels })
    }

    /// Returns the precomputed polygon set for `level`.
    #[must_use]
    pub const fn level(&self, level: SimplificationLevel) -> &StateBoundaries {
        &self.levels[level.index()]
    }
}

fn validate_tolerances(tolerances: &[f64; LEVEL_COUNT]) -> Result<(), GeoError> {
    if let Some((i, t)) = tolerances
        .iter()
        .enumerate()
        .find(|(_, t)| !t.is_finite() || **t < 0.0)
    {
        return Err(GeoError::InvalidTolerances {
            message: format!("level {i} has tolerance {t}"),
        });
    }

    if let Some(i) = tolerances.windows(2).position(|w| w[1] > w[0]) {
        return Err(GeoError::InvalidTolerances {
            message: format!(
                "level {} ({}) is coarser than level {i} ({})",
                i + 1,
                tolerances[i + 1],
                tolerances[i]
            ),
        });
    }

    Ok(())
}

/// Simplifies every feature independently, keeping names, source
/// properties, and order.
#[must_use]
pub fn simplify_boundaries(source: &StateBoundaries, tolerance: f64) -> StateBoundaries {
    source
        .features()
        .iter()
        .map(|feature| StateBoundary {
            state: feature.state.clone(),
            geometry: simplify_multipolygon(&feature.geometry, tolerance),
            properties: feature.properties.clone(),
        })
        .collect()
}

fn simplify_multipolygon(mp: &MultiPolygon<f64>, tolerance: f64) -> MultiPolygon<f64> {
    MultiPolygon::new(
        mp.0.iter()
            .map(|poly| simplify_polygon(poly, tolerance))
            .collect(),
    )
}

/// An exterior ring that would collapse keeps its original coordinates so
/// the polygon never disappears. Holes that collapse are dropped.
fn simplify_polygon(poly: &Polygon<f64>, tolerance: f64) -> Polygon<f64> {
    let exterior = poly.exterior().simplify(&tolerance);
    let exterior = if exterior.0.len() < MIN_RING_COORDS {
        poly.exterior().clone()
    } else {
        exterior
    };

    let interiors: Vec<LineString<f64>> = poly
        .interiors()
        .iter()
        .map(|ring| ring.simplify(&tolerance))
        .filter(|ring| ring.0.len() >= MIN_RING_COORDS)
        .collect();

    Polygon::new(exterior, interiors)
}
