//! Point-in-polygon join of migration records to states.

use migration_map_flow_models::{MigrationRecord, ResolvedFlowRecord};
use migration_map_spatial::StateIndex;

/// Assigns origin and destination states to each record.
///
/// A missing or non-finite coordinate, or one outside every state, leaves
/// that side unresolved. A missing or non-finite volume counts as zero.
#[must_use]
pub fn resolve_records(records: &[MigrationRecord], index: &StateIndex) -> Vec<ResolvedFlowRecord> {
    let resolved: Vec<ResolvedFlowRecord> = records
        .iter()
        .map(|record| ResolvedFlowRecord {
            origin_state: lookup(index, record.origin_lon, record.origin_lat),
            dest_state: lookup(index, record.dest_lon, record.dest_lat),
            volume: record.volume.filter(|v| v.is_finite()).unwrap_or(0.0),
        })
        .collect();

    let unresolved = resolved
        .iter()
        .filter(|r| r.origin_state.is_none() || r.dest_state.is_none())
        .count();
    log::info!(
        "Joined {} records to states ({unresolved} with an unresolved endpoint)",
        resolved.len()
    );

    resolved
}

fn lookup(index: &StateIndex, lon: Option<f64>, lat: Option<f64>) -> Option<String> {
    index.lookup_state(lon?, lat?).map(str::to_string)
}
