//! Representative points for each state.
//!
//! Centroids are taken in UTM zone 43N (EPSG:32643), which covers the
//! Indian subcontinent well enough for area-weighted centers, and then
//! projected back to WGS84 lon/lat.

use std::collections::BTreeMap;

use geo::{Centroid as _, Coord, MapCoords, MultiPolygon};
use migration_map_geography_models::{Centroid, StateBoundaries};
use proj4rs::{proj::Proj, transform::transform};

use crate::GeoError;

const GEOGRAPHIC_PROJ4: &str = "+proj=longlat +datum=WGS84 +no_defs +type=crs";
const UTM_43N_PROJ4: &str = "+proj=utm +zone=43 +datum=WGS84 +units=m +no_defs +type=crs";

/// Computes one centroid per state name.
///
/// Features that share a state name are merged before the centroid is
/// taken. States with empty geometry are omitted.
///
/// # Errors
///
/// Returns [`GeoError::Projection`] if a coordinate cannot be projected.
pub fn state_centroids(
    boundaries: &StateBoundaries,
) -> Result<BTreeMap<String, Centroid>, GeoError> {
    let geographic = Proj::from_proj_string(GEOGRAPHIC_PROJ4)?;
    let metric = Proj::from_proj_string(UTM_43N_PROJ4)?;

    let mut merged: BTreeMap<&str, MultiPolygon<f64>> = BTreeMap::new();
    for feature in boundaries.features() {
        merged
            .entry(feature.state.as_str())
            .or_insert_with(|| MultiPolygon::new(Vec::new()))
            .0
            .extend(feature.geometry.0.iter().cloned());
    }

    let mut centroids = BTreeMap::new();

    for (state, shape) in merged {
        let projected = shape.try_map_coords(|coord: Coord<f64>| {
            let mut point = (coord.x.to_radians(), coord.y.to_radians(), 0.0);
            transform(&geographic, &metric, &mut point)?;
            Ok::<_, GeoError>(Coord {
                x: point.0,
                y: point.1,
            })
        })?;

        let Some(center) = projected.centroid() else {
            log::warn!("State {state} has no centroid (empty geometry), skipping");
            continue;
        };

        let mut point = (center.x(), center.y(), 0.0);
        transform(&metric, &geographic, &mut point)?;

        centroids.insert(
            state.to_string(),
            Centroid {
                longitude: point.0.to_degrees(),
                latitude: point.1.to_degrees(),
            },
        );
    }

    log::info!("Computed centroids for {} states", centroids.len());

    Ok(centroids)
}
