#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the India internal migration map.
//!
//! Loads the migration flow CSV and state boundary `GeoJSON` once at
//! startup, aggregates state-to-state flows, precomputes every boundary
//! simplification level, and serves read-only JSON endpoints plus the
//! static frontend. The only mutable state is the boundary ratchet cache,
//! which can be reset through `/api/reset_cache`.

pub mod config;
mod handlers;
mod properties;

use std::sync::Arc;

use actix_cors::Cors;
use actix_files::Files;
use actix_web::{App, HttpServer, middleware, web};
use migration_map_flow::{FlowQueryEngine, FlowTable};
use migration_map_geography::GeoError;
use migration_map_geography::cache::BoundaryCache;
use migration_map_geography::centroid::state_centroids;
use migration_map_geography::simplify::{BoundaryLevels, DEFAULT_TOLERANCES};
use migration_map_ingest::{IngestError, MigrationDataset};
use thiserror::Error;

pub use config::ServerConfig;

use crate::properties::MigrationProperties;

/// Errors that abort server startup.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Source data could not be loaded.
    #[error("Failed to load data: {0}")]
    Ingest(#[from] IngestError),

    /// Boundary preprocessing failed.
    #[error("Failed to prepare boundaries: {0}")]
    Geo(#[from] GeoError),

    /// The HTTP server failed to bind or run.
    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shared application state.
///
/// Everything except the boundary cache is immutable after startup.
pub struct AppState {
    /// Aggregated flows and their queries.
    pub flows: Arc<FlowQueryEngine>,
    /// Ratchet cache over the precomputed boundary levels.
    pub boundaries: Arc<BoundaryCache>,
    /// Number of migration records read at startup.
    pub records_loaded: usize,
}

impl AppState {
    /// Aggregates flows, computes centroids, and precomputes boundary
    /// levels for a loaded dataset.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError`] if centroid projection or boundary
    /// simplification fails.
    pub fn build(dataset: MigrationDataset, name_property: &str) -> Result<Self, GeoError> {
        let records_loaded = dataset.records.len();

        let table = FlowTable::aggregate(dataset.records);
        let centroids = state_centroids(&dataset.boundaries)?;
        let flows = Arc::new(FlowQueryEngine::new(table, centroids));

        let levels = BoundaryLevels::build(&dataset.boundaries, &DEFAULT_TOLERANCES)?;
        let boundaries = Arc::new(BoundaryCache::new(
            levels,
            name_property,
            Arc::new(MigrationProperties::new(Arc::clone(&flows))),
        ));

        Ok(Self {
            flows,
            boundaries,
            records_loaded,
        })
    }
}

/// Registers the `/api` routes.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/boundaries", web::get().to(handlers::boundaries))
            .route("/flows", web::get().to(handlers::flows))
            .route("/stats", web::get().to(handlers::stats))
            .route(
                "/state_migration/{state_name}",
                web::get().to(handlers::state_migration),
            )
            .route("/net_migration", web::get().to(handlers::net_migration))
            .route("/reset_cache", web::get().to(handlers::reset_cache))
            .route("/reset_cache", web::post().to(handlers::reset_cache))
            .route("/diagnostics", web::get().to(handlers::diagnostics)),
    );
}

/// Loads the data named by `config` and starts the Actix-Web HTTP
/// server. The caller provides the async runtime (e.g. via
/// `#[actix_web::main]`).
///
/// # Errors
///
/// Returns a [`ServerError`] if loading or preprocessing the data fails,
/// or if the HTTP server fails to bind or encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let dataset = migration_map_ingest::load_dataset(
        &config.flows_path,
        &config.boundaries_path,
        &config.name_property,
    )?;

    log::info!("Preparing flow tables and boundary levels...");
    let state = web::Data::new(AppState::build(dataset, &config.name_property)?);

    let static_dir = config.static_dir.clone();
    log::info!("Starting server on {}:{}", config.bind_addr, config.port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure_api)
            // Serve frontend static files
            .service(Files::new("/", &static_dir).index_file("index.html"))
    })
    .bind((config.bind_addr, config.port))?
    .run()
    .await?;

    Ok(())
}
