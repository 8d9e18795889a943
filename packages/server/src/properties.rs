//! Migration totals attached to boundary features.

use std::sync::Arc;

use migration_map_flow::FlowQueryEngine;
use migration_map_geography::cache::{FeatureProperties, JsonObject};
use migration_map_server_models::whole_migrants;

/// Adds `net_mig`, `in_mig`, and `out_mig` to each state feature.
pub struct MigrationProperties {
    flows: Arc<FlowQueryEngine>,
}

impl MigrationProperties {
    pub const fn new(flows: Arc<FlowQueryEngine>) -> Self {
        Self { flows }
    }
}

impl FeatureProperties for MigrationProperties {
    fn properties(&self, state: &str) -> JsonObject {
        let totals = self.flows.state_totals(state);

        let mut props = JsonObject::new();
        props.insert("net_mig".to_string(), whole_migrants(totals.net_total).into());
        props.insert("in_mig".to_string(), whole_migrants(totals.in_total).into());
        props.insert("out_mig".to_string(), whole_migrants(totals.out_total).into());
        props
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use migration_map_flow::FlowTable;
    use migration_map_flow_models::ResolvedFlowRecord;
    use std::collections::BTreeMap;

    #[test]
    fn unknown_state_gets_zeros() {
        let table = FlowTable::aggregate([ResolvedFlowRecord {
            origin_state: Some("Kerala".to_string()),
            dest_state: Some("Karnataka".to_string()),
            volume: 42.9,
        }]);
        let props =
            MigrationProperties::new(Arc::new(FlowQueryEngine::new(table, BTreeMap::new())));

        let kerala = props.properties("Kerala");
        assert_eq!(kerala["out_mig"], 42);
        assert_eq!(kerala["net_mig"], -42);
        assert_eq!(kerala["in_mig"], 0);

        let unknown = props.properties("Ladakh");
        assert_eq!(unknown["net_mig"], 0);
        assert_eq!(unknown["in_mig"], 0);
        assert_eq!(unknown["out_mig"], 0);
    }
}
