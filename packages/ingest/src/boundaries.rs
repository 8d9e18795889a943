//! State boundary `GeoJSON` loading.

use std::path::Path;

use geo::MultiPolygon;
use geojson::{Feature, GeoJson};
use migration_map_geography_models::{StateBoundaries, StateBoundary};

use crate::IngestError;

/// Reads the state polygons from a `GeoJSON` file.
///
/// # Errors
///
/// Returns an [`IngestError`] if the file cannot be read or parsed, or if
/// no feature has both a state name and polygon geometry.
pub fn load_state_boundaries(
    path: &Path,
    name_property: &str,
) -> Result<StateBoundaries, IngestError> {
    let contents = std::fs::read_to_string(path)?;
    parse_state_boundaries(&contents, name_property)
}

/// Parses a `GeoJSON` `FeatureCollection` of state polygons.
///
/// Features without a non-empty `name_property` string or without
/// `Polygon`/`MultiPolygon` geometry are skipped with a warning. The name
/// is kept exactly as written, and every source property is carried on
/// the resulting [`StateBoundary`].
///
/// # Errors
///
/// Returns an [`IngestError`] if the text is not a feature collection or
/// no usable feature remains.
pub fn parse_state_boundaries(
    geojson_str: &str,
    name_property: &str,
) -> Result<StateBoundaries, IngestError> {
    let GeoJson::FeatureCollection(collection) = geojson_str.parse::<GeoJson>()? else {
        return Err(IngestError::NotFeatureCollection);
    };

    let boundaries: StateBoundaries = collection
        .features
        .into_iter()
        .enumerate()
        .filter_map(|(i, feature)| to_state_boundary(i, feature, name_property))
        .collect();

    if boundaries.is_empty() {
        return Err(IngestError::NoBoundaries {
            name_property: name_property.to_string(),
        });
    }

    log::info!("Loaded {} state boundary features", boundaries.len());

    Ok(boundaries)
}

fn to_state_boundary(index: usize, feature: Feature, name_property: &str) -> Option<StateBoundary> {
    let Some(state) = feature
        .property(name_property)
        .and_then(serde_json::Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
    else {
        log::warn!("Boundary feature {index} has no '{name_property}' property, skipping");
        return None;
    };

    let Feature {
        geometry,
        properties,
        ..
    } = feature;

    let Some(geometry) = geometry else {
        log::warn!("Boundary feature for {state} has no geometry, skipping");
        return None;
    };

    let geometry = match geo::Geometry::<f64>::try_from(geometry) {
        Ok(geo::Geometry::MultiPolygon(mp)) => mp,
        Ok(geo::Geometry::Polygon(p)) => MultiPolygon::new(vec![p]),
        Ok(_) => {
            log::warn!("Boundary feature for {state} is not polygonal, skipping");
            return None;
        }
        Err(e) => {
            log::warn!("Failed to convert geometry for {state}: {e}");
            return None;
        }
    };

    Some(StateBoundary {
        state,
        geometry,
        properties: properties.unwrap_or_default(),
    })
}
