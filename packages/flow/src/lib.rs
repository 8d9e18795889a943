#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! State-to-state migration flow aggregation and queries.
//!
//! [`aggregate::FlowTable`] is built once at startup from spatially
//! resolved records and is the single source of truth for every query
//! answered by [`query::FlowQueryEngine`].

pub mod aggregate;
pub mod query;

pub use aggregate::FlowTable;
pub use query::FlowQueryEngine;

/// Maximum number of flows returned by a ranked flow query by default.
pub const DEFAULT_FLOW_LIMIT: usize = 200;
