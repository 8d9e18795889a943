#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the migration map server.
//!
//! Field names are `snake_case` because the map frontend reads them
//! verbatim. These types are separate from the flow query results so the
//! wire contract can evolve independently.

use migration_map_flow_models::{
    CounterpartyFlow, GlobalStats, NetPairFlow, RankedFlow, StateDetail,
};
use serde::{Deserialize, Serialize};

/// Zoom used when the client sends none (or an unparseable one).
pub const DEFAULT_ZOOM: i64 = 5;

/// Converts a migration volume to the whole number reported to clients,
/// truncating toward zero.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn whole_migrants(volume: f64) -> i64 {
    volume as i64
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiHealth {
    /// Always `true` once the server is answering.
    pub healthy: bool,
    /// Crate version.
    pub version: String,
}

/// Query parameters for the boundaries endpoint.
///
/// Values are kept as raw strings so that an unparseable zoom falls back
/// to the default instead of rejecting the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BoundaryQueryParams {
    /// Client zoom level, nominally 1-10.
    pub zoom: Option<String>,
}

impl BoundaryQueryParams {
    /// The requested zoom, or [`DEFAULT_ZOOM`].
    #[must_use]
    pub fn zoom(&self) -> i64 {
        self.zoom
            .as_deref()
            .and_then(|z| z.trim().parse().ok())
            .unwrap_or(DEFAULT_ZOOM)
    }
}

/// Query parameters for the flow endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FlowQueryParams {
    /// Minimum flow volume to include.
    pub min_flow: Option<String>,
}

impl FlowQueryParams {
    /// The requested minimum, or `0.0`.
    #[must_use]
    pub fn min_flow(&self) -> f64 {
        self.min_flow
            .as_deref()
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|v| !v.is_nan())
            .unwrap_or(0.0)
    }
}

/// A ranked state-to-state flow with arc endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiFlow {
    /// Sending state.
    pub origin_state: String,
    /// Receiving state.
    pub dest_state: String,
    /// Sending state centroid as `[lon, lat]`.
    pub origin_coords: [f64; 2],
    /// Receiving state centroid as `[lon, lat]`.
    pub dest_coords: [f64; 2],
    /// Aggregated volume.
    pub flow_value: f64,
    /// Total inflow of the receiving state.
    pub in_mig: i64,
    /// Total outflow of the sending state.
    pub out_mig: i64,
    /// Net migration of the sending state.
    pub net_mig: i64,
}

impl From<RankedFlow> for ApiFlow {
    fn from(flow: RankedFlow) -> Self {
        Self {
            origin_coords: flow.origin.lon_lat(),
            dest_coords: flow.dest.lon_lat(),
            origin_state: flow.origin_state,
            dest_state: flow.dest_state,
            flow_value: flow.total_volume,
            in_mig: whole_migrants(flow.dest_in_total),
            out_mig: whole_migrants(flow.origin_out_total),
            net_mig: whole_migrants(flow.origin_net_total),
        }
    }
}

/// Dataset-wide statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiStats {
    /// Sum of every aggregated flow.
    pub total_migration: i64,
    /// Number of states with any flow.
    pub num_states: usize,
    /// Largest state net migration.
    pub max_net_migration: i64,
    /// Smallest state net migration.
    pub min_net_migration: i64,
    /// Number of aggregated state-pair flows.
    pub num_flows: usize,
}

impl From<GlobalStats> for ApiStats {
    fn from(stats: GlobalStats) -> Self {
        Self {
            total_migration: whole_migrants(stats.total_migration),
            num_states: stats.num_states,
            max_net_migration: whole_migrants(stats.max_net_migration),
            min_net_migration: whole_migrants(stats.min_net_migration),
            num_flows: stats.num_flows,
        }
    }
}

/// An outgoing flow in a state breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiOutFlow {
    /// Receiving state.
    pub to_state: String,
    /// Aggregated volume.
    pub flow_value: f64,
}

impl From<CounterpartyFlow> for ApiOutFlow {
    fn from(flow: CounterpartyFlow) -> Self {
        Self {
            to_state: flow.state,
            flow_value: flow.volume,
        }
    }
}

/// An incoming flow in a state breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiInFlow {
    /// Sending state.
    pub from_state: String,
    /// Aggregated volume.
    pub flow_value: f64,
}

impl From<CounterpartyFlow> for ApiInFlow {
    fn from(flow: CounterpartyFlow) -> Self {
        Self {
            from_state: flow.state,
            flow_value: flow.volume,
        }
    }
}

/// Migration breakdown for one state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiStateMigration {
    /// State name as requested.
    pub state: String,
    /// Sum of outgoing flows.
    pub total_out: f64,
    /// Sum of incoming flows.
    pub total_in: f64,
    /// `total_in - total_out`.
    pub net_mig: f64,
    /// Outgoing flows.
    pub out_flows: Vec<ApiOutFlow>,
    /// Incoming flows.
    pub in_flows: Vec<ApiInFlow>,
}

impl From<StateDetail> for ApiStateMigration {
    fn from(detail: StateDetail) -> Self {
        Self {
            state: detail.state,
            total_out: detail.total_out,
            total_in: detail.total_in,
            net_mig: detail.net,
            out_flows: detail.out_flows.into_iter().map(ApiOutFlow::from).collect(),
            in_flows: detail.in_flows.into_iter().map(ApiInFlow::from).collect(),
        }
    }
}

/// Net movement between a pair of states.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiNetFlow {
    /// State with the net outflow.
    pub from_state: String,
    /// State with the net inflow.
    pub to_state: String,
    /// Positive net volume.
    pub net_flow: f64,
    /// `1` if the net follows the pair's sorted order, `-1` if reversed.
    pub direction: i8,
}

impl From<NetPairFlow> for ApiNetFlow {
    fn from(flow: NetPairFlow) -> Self {
        Self {
            from_state: flow.from_state,
            to_state: flow.to_state,
            net_flow: flow.net_flow,
            direction: flow.direction.sign(),
        }
    }
}

/// Acknowledgement for a cache reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResetAck {
    /// `"ok"` on success.
    pub status: String,
    /// Human-readable description.
    pub message: String,
}

/// Load and cache diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiDiagnostics {
    /// Migration records read from the source file.
    pub records_loaded: usize,
    /// Records dropped because an endpoint fell outside every state.
    pub unresolved_dropped: u64,
    /// Records dropped because origin and destination were the same state.
    pub self_flows_dropped: u64,
    /// Finest boundary level served since startup or the last reset.
    pub highest_level_served: Option<usize>,
}
