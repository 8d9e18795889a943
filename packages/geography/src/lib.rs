#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! State boundary processing for the migration map.
//!
//! Precomputes every simplification level of the authoritative state
//! polygons at startup, serves them through a ratchet cache that never
//! downgrades detail once a finer level has been requested, and computes
//! the per-state centroids that anchor flow arcs.

pub mod cache;
pub mod centroid;
pub mod simplify;

use thiserror::Error;

/// Errors that can occur during geography operations.
#[derive(Debug, Error)]
pub enum GeoError {
    /// Coordinate reprojection failed.
    #[error("Projection error: {0}")]
    Projection(#[from] proj4rs::errors::Error),

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The simplification tolerance table is unusable.
    #[error("Invalid simplification tolerances: {message}")]
    InvalidTolerances {
        /// Description of what went wrong.
        message: String,
    },
}
