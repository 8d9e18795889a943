#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! In-memory spatial index for state attribution.
//!
//! Builds an R-tree over the authoritative state polygons at startup and
//! answers point-in-polygon lookups for migration flow endpoints.

use geo::{BoundingRect, Contains, MultiPolygon};
use migration_map_geography_models::StateBoundaries;
use rstar::{AABB, RTree, RTreeObject};

/// A state polygon stored in the R-tree with its name.
struct StateEntry {
    state: String,
    envelope: AABB<[f64; 2]>,
    polygon: MultiPolygon<f64>,
}

impl RTreeObject for StateEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Pre-built spatial index over state polygons.
///
/// Constructed once from the unsimplified boundaries and shared read-only.
pub struct StateIndex {
    states: RTree<StateEntry>,
}

impl StateIndex {
    /// Builds the R-tree from `boundaries`. Features with empty geometry
    /// are left out.
    #[must_use]
    pub fn build(boundaries: &StateBoundaries) -> Self {
        let entries: Vec<StateEntry> = boundaries
            .features()
            .iter()
            .filter_map(|feature| {
                let Some(envelope) = compute_envelope(&feature.geometry) else {
                    log::warn!("State {} has empty geometry, not indexed", feature.state);
                    return None;
                };
                Some(StateEntry {
                    state: feature.state.clone(),
                    envelope,
                    polygon: feature.geometry.clone(),
                })
            })
            .collect();

        let states = RTree::bulk_load(entries);
        log::info!("Loaded {} state polygons into spatial index", states.size());

        Self { states }
    }

    /// Number of indexed polygons.
    #[must_use]
    pub fn len(&self) -> usize {
        self.states.size()
    }

    /// Whether nothing was indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.size() == 0
    }

    /// Look up the state containing a point.
    ///
    /// States do not overlap, so first match wins. Points on a shared
    /// border are not strictly inside either polygon and resolve to
    /// `None`, as do non-finite coordinates.
    #[must_use]
    pub fn lookup_state(&self, lng: f64, lat: f64) -> Option<&str> {
        if !lng.is_finite() || !lat.is_finite() {
            return None;
        }

        let point = geo::Point::new(lng, lat);
        let query_env = AABB::from_point([lng, lat]);

        self.states
            .locate_in_envelope_intersecting(&query_env)
            .find(|entry| entry.polygon.contains(&point))
            .map(|entry| entry.state.as_str())
    }
}

/// Compute the bounding box envelope for a [`MultiPolygon`].
fn compute_envelope(mp: &MultiPolygon<f64>) -> Option<AABB<[f64; 2]>> {
    mp.bounding_rect().map(|rect| {
        AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y])
    })
}
