#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Migration flow types.
//!
//! Raw records come from the migration CSV, resolved records carry the
//! state names assigned by the spatial join, and everything else is
//! derived once at startup from those and never mutated afterwards.

use migration_map_geography_models::Centroid;
use serde::{Deserialize, Serialize};

/// One row of the migration flow dataset.
///
/// Empty cells deserialize as `None`. A missing coordinate cannot be
/// joined to a state; a missing volume counts as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MigrationRecord {
    /// Origin longitude.
    #[serde(rename = "LONFR")]
    pub origin_lon: Option<f64>,
    /// Origin latitude.
    #[serde(rename = "LATFR")]
    pub origin_lat: Option<f64>,
    /// Destination longitude.
    #[serde(rename = "LONTO")]
    pub dest_lon: Option<f64>,
    /// Destination latitude.
    #[serde(rename = "LATTO")]
    pub dest_lat: Option<f64>,
    /// Number of migrants over the survey period.
    #[serde(rename = "PrdMIG")]
    pub volume: Option<f64>,
}

/// A migration record after the spatial join.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedFlowRecord {
    /// State containing the origin point, if any.
    pub origin_state: Option<String>,
    /// State containing the destination point, if any.
    pub dest_state: Option<String>,
    /// Number of migrants.
    pub volume: f64,
}

/// Summed volume for one ordered (origin, destination) state pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedFlow {
    /// Sending state.
    pub origin_state: String,
    /// Receiving state.
    pub dest_state: String,
    /// Sum of every record volume for this ordered pair.
    pub total_volume: f64,
}

/// In, out, and net migration for one state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StateTotals {
    /// Volume arriving in the state.
    pub in_total: f64,
    /// Volume leaving the state.
    pub out_total: f64,
    /// `in_total - out_total`.
    pub net_total: f64,
}

/// Records discarded during aggregation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropCounts {
    /// Records whose origin or destination fell outside every state.
    pub unresolved: u64,
    /// Records whose origin and destination are the same state.
    pub self_flows: u64,
}

/// An aggregated flow enriched for arc rendering.
///
/// Out and net totals describe the origin state, the in total describes
/// the destination state. Clients color arcs by the sender's net
/// migration.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedFlow {
    /// Sending state.
    pub origin_state: String,
    /// Receiving state.
    pub dest_state: String,
    /// Centroid of the sending state.
    pub origin: Centroid,
    /// Centroid of the receiving state.
    pub dest: Centroid,
    /// Aggregated volume.
    pub total_volume: f64,
    /// Total inflow of the destination state.
    pub dest_in_total: f64,
    /// Total outflow of the origin state.
    pub origin_out_total: f64,
    /// Net migration of the origin state.
    pub origin_net_total: f64,
}

/// Dataset-wide summary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlobalStats {
    /// Sum of every aggregated flow.
    pub total_migration: f64,
    /// Number of states with any inflow or outflow.
    pub num_states: usize,
    /// Largest net migration across states (0 if none).
    pub max_net_migration: f64,
    /// Smallest net migration across states (0 if none).
    pub min_net_migration: f64,
    /// Number of aggregated flow rows.
    pub num_flows: usize,
}

/// Volume exchanged with one counterparty state.
#[derive(Debug, Clone, PartialEq)]
pub struct CounterpartyFlow {
    /// The other state.
    pub state: String,
    /// Aggregated volume.
    pub volume: f64,
}

/// Migration breakdown for a single state.
#[derive(Debug, Clone, PartialEq)]
pub struct StateDetail {
    /// State name as queried.
    pub state: String,
    /// Sum of outgoing flows.
    pub total_out: f64,
    /// Sum of incoming flows.
    pub total_in: f64,
    /// `total_in - total_out`.
    pub net: f64,
    /// Outgoing flows in table order.
    pub out_flows: Vec<CounterpartyFlow>,
    /// Incoming flows in table order.
    pub in_flows: Vec<CounterpartyFlow>,
}

/// Which way a net pair flow points relative to the pair's sorted order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowDirection {
    /// Net flow goes from the lexicographically first state to the second.
    Forward,
    /// Net flow goes from the second state to the first.
    Reversed,
}

impl FlowDirection {
    /// `1` for [`Self::Forward`], `-1` for [`Self::Reversed`].
    #[must_use]
    pub const fn sign(self) -> i8 {
        match self {
            Self::Forward => 1,
            Self::Reversed => -1,
        }
    }
}

/// Net movement between an unordered pair of states.
#[derive(Debug, Clone, PartialEq)]
pub struct NetPairFlow {
    /// State with the net outflow.
    pub from_state: String,
    /// State with the net inflow.
    pub to_state: String,
    /// Absolute net volume, always positive.
    pub net_flow: f64,
    /// Orientation relative to the sorted pair.
    pub direction: FlowDirection,
}
