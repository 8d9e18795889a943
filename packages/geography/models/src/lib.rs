#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! State boundary and simplification level types.
//!
//! These types describe the authoritative state polygon set loaded at
//! startup and the representative points used to anchor flow arcs. They
//! carry no behavior beyond small lookups so that the loader, the spatial
//! index, and the simplifier can all share them.

pub mod level;

use geo::MultiPolygon;
use serde::{Deserialize, Serialize};

pub use level::{LEVEL_COUNT, SimplificationLevel};

/// A single state polygon with its identifying name.
#[derive(Debug, Clone, PartialEq)]
pub struct StateBoundary {
    /// State name as it appears in the boundary source (e.g. "Kerala").
    pub state: String,
    /// Polygon geometry in WGS84 lon/lat degrees.
    pub geometry: MultiPolygon<f64>,
    /// Source feature properties, kept verbatim (including the name).
    pub properties: serde_json::Map<String, serde_json::Value>,
}

/// Ordered collection of state polygons.
///
/// Feature order follows the source file and is preserved by every
/// transform so that serialized payloads are stable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateBoundaries {
    features: Vec<StateBoundary>,
}

impl StateBoundaries {
    /// Wraps an ordered list of state polygons.
    #[must_use]
    pub const fn new(features: Vec<StateBoundary>) -> Self {
        Self { features }
    }

    /// Returns the features in source order.
    #[must_use]
    pub fn features(&self) -> &[StateBoundary] {
        &self.features
    }

    /// Number of features (a state split across features counts once per
    /// feature).
    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Whether the collection has no features.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Iterates over the state names in feature order.
    pub fn state_names(&self) -> impl Iterator<Item = &str> {
        self.features.iter().map(|f| f.state.as_str())
    }
}

impl FromIterator<StateBoundary> for StateBoundaries {
    fn from_iter<I: IntoIterator<Item = StateBoundary>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Representative point of a state in lon/lat degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Centroid {
    /// Longitude.
    pub longitude: f64,
    /// Latitude.
    pub latitude: f64,
}

impl Centroid {
    /// Returns the point as `[lon, lat]`, the order the map client expects.
    #[must_use]
    pub const fn lon_lat(&self) -> [f64; 2] {
        [self.longitude, self.latitude]
    }
}
