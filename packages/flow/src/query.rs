//! Read-only queries over the aggregated flow table.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use migration_map_flow_models::{
    CounterpartyFlow, FlowDirection, GlobalStats, NetPairFlow, RankedFlow, StateDetail,
    StateTotals,
};
use migration_map_geography_models::Centroid;

use crate::FlowTable;

/// Answers flow queries for the HTTP layer.
///
/// Holds only immutable data, so it can be shared across request
/// handlers without locking.
#[derive(Debug, Clone)]
pub struct FlowQueryEngine {
    table: FlowTable,
    centroids: BTreeMap<String, Centroid>,
}

impl FlowQueryEngine {
    /// Creates an engine over an aggregated table and the state centroids
    /// used to anchor flow arcs.
    #[must_use]
    pub const fn new(table: FlowTable, centroids: BTreeMap<String, Centroid>) -> Self {
        Self { table, centroids }
    }

    /// The underlying aggregated table.
    #[must_use]
    pub const fn table(&self) -> &FlowTable {
        &self.table
    }

    /// Totals for `state`, all zero if unknown.
    #[must_use]
    pub fn state_totals(&self, state: &str) -> StateTotals {
        self.table.totals_for(state)
    }

    /// Flows with volume at least `min_flow`, largest first, at most
    /// `limit` of them.
    ///
    /// Flows touching a state without a centroid are skipped.
    #[must_use]
    pub fn ranked_flows(&self, min_flow: f64, limit: usize) -> Vec<RankedFlow> {
        self.table
            .flows()
            .iter()
            .filter(|flow| flow.total_volume >= min_flow)
            .filter_map(|flow| {
                let origin = self.centroids.get(&flow.origin_state)?;
                let dest = self.centroids.get(&flow.dest_state)?;
                let origin_totals = self.table.totals_for(&flow.origin_state);
                let dest_totals = self.table.totals_for(&flow.dest_state);

                Some(RankedFlow {
                    origin_state: flow.origin_state.clone(),
                    dest_state: flow.dest_state.clone(),
                    origin: *origin,
                    dest: *dest,
                    total_volume: flow.total_volume,
                    dest_in_total: dest_totals.in_total,
                    origin_out_total: origin_totals.out_total,
                    origin_net_total: origin_totals.net_total,
                })
            })
            .take(limit)
            .collect()
    }

    /// Dataset-wide totals.
    #[must_use]
    pub fn global_stats(&self) -> GlobalStats {
        let nets = self.table.totals().values().map(|t| t.net_total);
        let (max_net, min_net) = nets.fold(None, |acc: Option<(f64, f64)>, net| {
            Some(acc.map_or((net, net), |(max, min)| (max.max(net), min.min(net))))
        })
        .unwrap_or((0.0, 0.0));

        GlobalStats {
            total_migration: self.table.flows().iter().map(|f| f.total_volume).sum(),
            num_states: self.table.totals().len(),
            max_net_migration: max_net,
            min_net_migration: min_net,
            num_flows: self.table.flows().len(),
        }
    }

    /// Incoming and outgoing flows for one state.
    ///
    /// Totals are summed from the flow table directly. An unknown state
    /// yields zero totals and empty lists.
    #[must_use]
    pub fn state_detail(&self, state: &str) -> StateDetail {
        let mut out_flows = Vec::new();
        let mut in_flows = Vec::new();

        for flow in self.table.flows() {
            if flow.origin_state == state {
                out_flows.push(CounterpartyFlow {
                    state: flow.dest_state.clone(),
                    volume: flow.total_volume,
                });
            } else if flow.dest_state == state {
                in_flows.push(CounterpartyFlow {
                    state: flow.origin_state.clone(),
                    volume: flow.total_volume,
                });
            }
        }

        let total_out: f64 = out_flows.iter().map(|f| f.volume).sum();
        let total_in: f64 = in_flows.iter().map(|f| f.volume).sum();

        StateDetail {
            state: state.to_string(),
            total_out,
            total_in,
            net: total_in - total_out,
            out_flows,
            in_flows,
        }
    }

    /// Collapses each unordered state pair into a single net flow.
    ///
    /// For a pair `{a, b}` with `a < b`, the net is `a->b` minus `b->a`.
    /// Pairs whose absolute net is below `min_flow`, or exactly zero, are
    /// omitted. Output is ordered by pair.
    #[must_use]
    pub fn net_pair_flows(&self, min_flow: f64) -> Vec<NetPairFlow> {
        let directed: BTreeMap<(&str, &str), f64> = self
            .table
            .flows()
            .iter()
            .map(|f| ((f.origin_state.as_str(), f.dest_state.as_str()), f.total_volume))
            .collect();

        let pairs: BTreeSet<(&str, &str)> = directed
            .keys()
            .map(|&(origin, dest)| if origin <= dest { (origin, dest) } else { (dest, origin) })
            .collect();

        pairs
            .into_iter()
            .filter_map(|(a, b)| {
                let a_to_b = directed.get(&(a, b)).copied().unwrap_or(0.0);
                let b_to_a = directed.get(&(b, a)).copied().unwrap_or(0.0);
                let net = a_to_b - b_to_a;

                if net.abs() < min_flow {
                    return None;
                }

                let (from_state, to_state, direction) = match net.partial_cmp(&0.0)? {
                    Ordering::Greater => (a, b, FlowDirection::Forward),
                    Ordering::Less => (b, a, FlowDirection::Reversed),
                    Ordering::Equal => return None,
                };

                Some(NetPairFlow {
                    from_state: from_state.to_string(),
                    to_state: to_state.to_string(),
                    net_flow: net.abs(),
                    direction,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use migration_map_flow_models::ResolvedFlowRecord;

    fn record(origin: &str, dest: &str, volume: f64) -> ResolvedFlowRecord {
        ResolvedFlowRecord {
            origin_state: Some(origin.to_string()),
            dest_state: Some(dest.to_string()),
            volume,
        }
    }

    fn centroid(longitude: f64, latitude: f64) -> Centroid {
        Centroid {
            longitude,
            latitude,
        }
    }

    /// A->B 10, B->A 4, A->C 5, with centroids for all three states.
    fn engine() -> FlowQueryEngine {
        let table = FlowTable::aggregate([
            record("A", "B", 10.0),
            record("B", "A", 4.0),
            record("A", "C", 5.0),
        ]);
        let centroids = BTreeMap::from([
            ("A".to_string(), centroid(77.0, 28.0)),
            ("B".to_string(), centroid(88.0, 22.0)),
            ("C".to_string(), centroid(72.0, 19.0)),
        ]);
        FlowQueryEngine::new(table, centroids)
    }

    #[test]
    fn ranked_flows_filters_by_min_flow() {
        let flows = engine().ranked_flows(6.0, 200);

        assert_eq!(flows.len(), 1);
        assert_eq!(flows[0].origin_state, "A");
        assert_eq!(flows[0].dest_state, "B");
        assert_eq!(flows[0].total_volume, 10.0);
    }

    #[test]
    fn ranked_flows_enriches_with_sender_net() {
        let flows = engine().ranked_flows(0.0, 200);
        let a_to_b = &flows[0];

        assert_eq!(a_to_b.origin.lon_lat(), [77.0, 28.0]);
        assert_eq!(a_to_b.dest.lon_lat(), [88.0, 22.0]);
        assert_eq!(a_to_b.dest_in_total, 10.0);
        assert_eq!(a_to_b.origin_out_total, 15.0);
        assert_eq!(a_to_b.origin_net_total, -11.0);
    }

    #[test]
    fn ranked_flows_are_sorted_and_truncated() {
        let engine = engine();
        let all = engine.ranked_flows(0.0, usize::MAX);
        let volumes: Vec<f64> = all.iter().map(|f| f.total_volume).collect();
        assert_eq!(volumes, vec![10.0, 5.0, 4.0]);

        assert_eq!(engine.ranked_flows(0.0, 2).len(), 2);
    }

    #[test]
    fn ranked_flows_skip_states_without_centroid() {
        let table = FlowTable::aggregate([record("A", "B", 10.0), record("A", "Z", 50.0)]);
        let centroids = BTreeMap::from([
            ("A".to_string(), centroid(77.0, 28.0)),
            ("B".to_string(), centroid(88.0, 22.0)),
        ]);
        let flows = FlowQueryEngine::new(table, centroids).ranked_flows(0.0, 200);

        assert_eq!(flows.len(), 1);
        assert_eq!(flows[0].dest_state, "B");
    }

    #[test]
    fn global_stats_total_matches_unfiltered_flows() {
        let engine = engine();
        let stats = engine.global_stats();
        let summed: f64 = engine
            .ranked_flows(0.0, usize::MAX)
            .iter()
            .map(|f| f.total_volume)
            .sum();

        assert_eq!(stats.total_migration, summed);
        assert_eq!(stats.total_migration, 19.0);
        assert_eq!(stats.num_states, 3);
        assert_eq!(stats.max_net_migration, 6.0);
        assert_eq!(stats.min_net_migration, -11.0);
        assert_eq!(stats.num_flows, 3);
    }

    #[test]
    fn global_stats_of_empty_table_are_zero() {
        let stats = FlowQueryEngine::new(FlowTable::default(), BTreeMap::new()).global_stats();
        assert_eq!(stats.total_migration, 0.0);
        assert_eq!(stats.num_states, 0);
        assert_eq!(stats.max_net_migration, 0.0);
        assert_eq!(stats.min_net_migration, 0.0);
    }

    #[test]
    fn state_detail_matches_precomputed_totals() {
        let engine = engine();

        for state in ["A", "B", "C"] {
            let detail = engine.state_detail(state);
            let totals = engine.state_totals(state);
            assert_eq!(detail.total_in, totals.in_total, "in for {state}");
            assert_eq!(detail.total_out, totals.out_total, "out for {state}");
            assert_eq!(detail.net, totals.net_total, "net for {state}");
        }
    }

    #[test]
    fn state_detail_lists_counterparties() {
        let detail = engine().state_detail("A");

        let out: Vec<(&str, f64)> = detail
            .out_flows
            .iter()
            .map(|f| (f.state.as_str(), f.volume))
            .collect();
        let incoming: Vec<(&str, f64)> = detail
            .in_flows
            .iter()
            .map(|f| (f.state.as_str(), f.volume))
            .collect();

        assert_eq!(out, vec![("B", 10.0), ("C", 5.0)]);
        assert_eq!(incoming, vec![("B", 4.0)]);
    }

    #[test]
    fn state_detail_is_idempotent() {
        let engine = engine();
        assert_eq!(engine.state_detail("B"), engine.state_detail("B"));
    }

    #[test]
    fn unknown_state_detail_is_empty() {
        let detail = engine().state_detail("Atlantis");

        assert_eq!(detail.state, "Atlantis");
        assert_eq!(detail.total_in, 0.0);
        assert_eq!(detail.total_out, 0.0);
        assert_eq!(detail.net, 0.0);
        assert!(detail.out_flows.is_empty());
        assert!(detail.in_flows.is_empty());
    }

    #[test]
    fn net_pair_flows_match_worked_example() {
        let flows = engine().net_pair_flows(0.0);

        assert_eq!(
            flows,
            vec![
                NetPairFlow {
                    from_state: "A".to_string(),
                    to_state: "B".to_string(),
                    net_flow: 6.0,
                    direction: FlowDirection::Forward,
                },
                NetPairFlow {
                    from_state: "A".to_string(),
                    to_state: "C".to_string(),
                    net_flow: 5.0,
                    direction: FlowDirection::Forward,
                },
            ]
        );
    }

    #[test]
    fn net_pair_flows_reverse_when_second_state_sends_more() {
        let table = FlowTable::aggregate([record("A", "B", 2.0), record("B", "A", 9.0)]);
        let flows = FlowQueryEngine::new(table, BTreeMap::new()).net_pair_flows(0.0);

        assert_eq!(flows.len(), 1);
        assert_eq!(flows[0].from_state, "B");
        assert_eq!(flows[0].to_state, "A");
        assert_eq!(flows[0].net_flow, 7.0);
        assert_eq!(flows[0].direction.sign(), -1);
    }

    #[test]
    fn net_pair_flows_are_unique_and_positive() {
        let table = FlowTable::aggregate([
            record("A", "B", 3.0),
            record("B", "A", 3.0),
            record("B", "C", 1.0),
            record("C", "B", 8.0),
            record("D", "A", 2.5),
            record("A", "D", 0.5),
        ]);
        let flows = FlowQueryEngine::new(table, BTreeMap::new()).net_pair_flows(0.0);

        let mut seen = BTreeSet::new();
        for flow in &flows {
            assert!(flow.net_flow > 0.0, "non-positive net for {flow:?}");
            let key = if flow.from_state < flow.to_state {
                (flow.from_state.clone(), flow.to_state.clone())
            } else {
                (flow.to_state.clone(), flow.from_state.clone())
            };
            assert!(seen.insert(key), "duplicate pair in {flows:?}");
        }
        assert_eq!(flows.len(), 2, "balanced A<->B pair should be omitted");
    }

    #[test]
    fn net_pair_flows_respect_min_flow() {
        let flows = engine().net_pair_flows(5.5);
        assert_eq!(flows.len(), 1);
        assert_eq!(flows[0].to_state, "B");
    }
}
