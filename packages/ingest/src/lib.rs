#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Startup data loading for the migration map.
//!
//! Reads the migration flow CSV and the state boundary `GeoJSON`, builds
//! the spatial index, and assigns origin and destination states to every
//! record. Everything here runs once before the server starts; any
//! failure aborts startup.

pub mod boundaries;
pub mod join;
pub mod records;

use std::path::Path;

use migration_map_flow_models::ResolvedFlowRecord;
use migration_map_geography_models::StateBoundaries;
use migration_map_spatial::StateIndex;
use thiserror::Error;

/// Errors that can occur while loading source data.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Reading a source file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// `GeoJSON` parsing failed.
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    /// The boundary file is valid `GeoJSON` but not a feature collection.
    #[error("Boundary file is not a FeatureCollection")]
    NotFeatureCollection,

    /// No usable state polygons were found.
    #[error("No state boundaries with a '{name_property}' property and polygon geometry")]
    NoBoundaries {
        /// Property expected to hold the state name.
        name_property: String,
    },
}

/// Everything loaded at startup.
#[derive(Debug, Clone)]
pub struct MigrationDataset {
    /// Authoritative state polygons.
    pub boundaries: StateBoundaries,
    /// Migration records with their joined state names.
    pub records: Vec<ResolvedFlowRecord>,
}

/// Loads both source files and performs the spatial join.
///
/// # Errors
///
/// Returns an [`IngestError`] if either file is missing or malformed, or
/// if the boundary file yields no states.
pub fn load_dataset(
    flows_path: &Path,
    boundaries_path: &Path,
    name_property: &str,
) -> Result<MigrationDataset, IngestError> {
    log::info!("Loading state boundaries from {}...", boundaries_path.display());
    let boundaries = boundaries::load_state_boundaries(boundaries_path, name_property)?;

    log::info!("Loading migration records from {}...", flows_path.display());
    let raw = records::load_migration_records(flows_path)?;

    let index = StateIndex::build(&boundaries);
    let records = join::resolve_records(&raw, &index);

    Ok(MigrationDataset {
        boundaries,
        records,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    const BOUNDARIES: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {"state": "Bihar"},
                "geometry": {"type": "Polygon", "coordinates": [[[84, 25], [86, 25], [86, 27], [84, 27], [84, 25]]]}
            },
            {
                "type": "Feature",
                "properties": {"state": "Odisha"},
                "geometry": {"type": "Polygon", "coordinates": [[[83, 18], [86, 18], [86, 21], [83, 21], [83, 18]]]}
            }
        ]
    }"#;

    const FLOWS: &str = "\
LONFR,LATFR,LONTO,LATTO,PrdMIG
85.0,26.0,84.5,19.5,120
84.5,19.5,85.0,26.0,30.5
85.0,26.0,60.0,10.0,99
";

    fn write_temp(contents: &str, suffix: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_and_joins_dataset() {
        let boundaries = write_temp(BOUNDARIES, ".geojson");
        let flows = write_temp(FLOWS, ".csv");

        let dataset = load_dataset(flows.path(), boundaries.path(), "state").unwrap();

        assert_eq!(dataset.boundaries.len(), 2);
        assert_eq!(dataset.records.len(), 3);
        assert_eq!(dataset.records[0].origin_state.as_deref(), Some("Bihar"));
        assert_eq!(dataset.records[0].dest_state.as_deref(), Some("Odisha"));
        assert_eq!(dataset.records[1].volume, 30.5);
        assert_eq!(dataset.records[2].dest_state, None);
    }

    #[test]
    fn missing_file_is_fatal() {
        let boundaries = write_temp(BOUNDARIES, ".geojson");
        let result = load_dataset(
            Path::new("/nonexistent/flows.csv"),
            boundaries.path(),
            "state",
        );
        assert!(matches!(result, Err(IngestError::Io(_))));
    }
}
