//! One-time aggregation of resolved records into the flow table.

use std::collections::BTreeMap;

use migration_map_flow_models::{AggregatedFlow, DropCounts, ResolvedFlowRecord, StateTotals};

/// Aggregated flows plus derived per-state totals.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlowTable {
    flows: Vec<AggregatedFlow>,
    totals: BTreeMap<String, StateTotals>,
    dropped: DropCounts,
}

impl FlowTable {
    /// Groups records by ordered state pair and sums their volumes.
    ///
    /// Records with an unresolved state or with origin equal to
    /// destination are discarded and counted in [`Self::dropped`]. The
    /// resulting flows are ordered by descending volume; equal volumes
    /// keep (origin, destination) order.
    #[must_use]
    pub fn aggregate(records: impl IntoIterator<Item = ResolvedFlowRecord>) -> Self {
        let mut dropped = DropCounts::default();
        let mut pairs: BTreeMap<(String, String), f64> = BTreeMap::new();

        for record in records {
            let (Some(origin), Some(dest)) = (record.origin_state, record.dest_state) else {
                dropped.unresolved += 1;
                continue;
            };

            if origin == dest {
                dropped.self_flows += 1;
                continue;
            }

            *pairs.entry((origin, dest)).or_insert(0.0) += record.volume;
        }

        let mut flows: Vec<AggregatedFlow> = pairs
            .into_iter()
            .map(|((origin_state, dest_state), total_volume)| AggregatedFlow {
                origin_state,
                dest_state,
                total_volume,
            })
            .collect();
        flows.sort_by(|a, b| b.total_volume.total_cmp(&a.total_volume));

        let totals = state_totals(&flows);

        if dropped.unresolved > 0 || dropped.self_flows > 0 {
            log::info!(
                "Dropped {} unresolved and {} self-flow records during aggregation",
                dropped.unresolved,
                dropped.self_flows
            );
        }
        log::info!(
            "Aggregated {} state-pair flows across {} states",
            flows.len(),
            totals.len()
        );

        Self {
            flows,
            totals,
            dropped,
        }
    }

    /// Aggregated flows in descending volume order.
    #[must_use]
    pub fn flows(&self) -> &[AggregatedFlow] {
        &self.flows
    }

    /// Totals for every state with at least one flow, keyed by name.
    #[must_use]
    pub const fn totals(&self) -> &BTreeMap<String, StateTotals> {
        &self.totals
    }

    /// Totals for `state`, all zero if it has no flows.
    #[must_use]
    pub fn totals_for(&self, state: &str) -> StateTotals {
        self.totals.get(state).copied().unwrap_or_default()
    }

    /// Records discarded while aggregating.
    #[must_use]
    pub const fn dropped(&self) -> DropCounts {
        self.dropped
    }
}

fn state_totals(flows: &[AggregatedFlow]) -> BTreeMap<String, StateTotals> {
    let mut totals: BTreeMap<String, StateTotals> = BTreeMap::new();

    for flow in flows {
        totals
            .entry(flow.dest_state.clone())
            .or_default()
            .in_total += flow.total_volume;
        totals
            .entry(flow.origin_state.clone())
            .or_default()
            .out_total += flow.total_volume;
    }

    for t in totals.values_mut() {
        t.net_total = t.in_total - t.out_total;
    }

    totals
}
