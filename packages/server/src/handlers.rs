//! HTTP handler functions for the migration map API.

use std::sync::Arc;

use actix_web::http::header::ContentType;
use actix_web::{HttpResponse, web};
use migration_map_flow::DEFAULT_FLOW_LIMIT;
use migration_map_server_models::{
    ApiDiagnostics, ApiFlow, ApiHealth, ApiNetFlow, ApiResetAck, ApiStateMigration, ApiStats,
    BoundaryQueryParams, FlowQueryParams,
};

use crate::AppState;

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/boundaries?zoom=N`
///
/// Returns the state boundary `FeatureCollection` for a zoom level, with
/// migration totals on each feature. Served through the ratchet cache, so
/// the geometry may be finer than the zoom asks for.
pub async fn boundaries(
    state: web::Data<AppState>,
    params: web::Query<BoundaryQueryParams>,
) -> HttpResponse {
    let zoom = params.zoom();
    let cache = Arc::clone(&state.boundaries);

    match web::block(move || cache.fetch(zoom)).await {
        Ok(Ok(served)) => HttpResponse::Ok()
            .content_type(ContentType::json())
            .body(served.payload),
        Ok(Err(e)) => {
            log::error!("Failed to serve boundaries for zoom {zoom}: {e}");
            internal_error("Failed to serve boundaries")
        }
        Err(e) => {
            log::error!("Boundary task failed for zoom {zoom}: {e}");
            internal_error("Failed to serve boundaries")
        }
    }
}

/// `GET /api/flows?min_flow=X`
///
/// Returns the largest state-to-state flows with arc endpoints.
pub async fn flows(
    state: web::Data<AppState>,
    params: web::Query<FlowQueryParams>,
) -> HttpResponse {
    let flows: Vec<ApiFlow> = state
        .flows
        .ranked_flows(params.min_flow(), DEFAULT_FLOW_LIMIT)
        .into_iter()
        .map(ApiFlow::from)
        .collect();

    HttpResponse::Ok().json(flows)
}

/// `GET /api/stats`
pub async fn stats(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(ApiStats::from(state.flows.global_stats()))
}

/// `GET /api/state_migration/{state_name}`
///
/// Unknown states return zero totals and empty flow lists.
pub async fn state_migration(
    state: web::Data<AppState>,
    state_name: web::Path<String>,
) -> HttpResponse {
    let detail = state.flows.state_detail(&state_name);
    HttpResponse::Ok().json(ApiStateMigration::from(detail))
}

/// `GET /api/net_migration?min_flow=X`
///
/// Returns one net flow per state pair.
pub async fn net_migration(
    state: web::Data<AppState>,
    params: web::Query<FlowQueryParams>,
) -> HttpResponse {
    let flows: Vec<ApiNetFlow> = state
        .flows
        .net_pair_flows(params.min_flow())
        .into_iter()
        .map(ApiNetFlow::from)
        .collect();

    HttpResponse::Ok().json(flows)
}

/// `GET|POST /api/reset_cache`
pub async fn reset_cache(state: web::Data<AppState>) -> HttpResponse {
    state.boundaries.reset();
    HttpResponse::Ok().json(ApiResetAck {
        status: "ok".to_string(),
        message: "Boundary cache reset".to_string(),
    })
}

/// `GET /api/diagnostics`
///
/// Reports how many records were dropped while loading and the finest
/// boundary level served so far.
pub async fn diagnostics(state: web::Data<AppState>) -> HttpResponse {
    let dropped = state.flows.table().dropped();

    HttpResponse::Ok().json(ApiDiagnostics {
        records_loaded: state.records_loaded,
        unresolved_dropped: dropped.unresolved,
        self_flows_dropped: dropped.self_flows,
        highest_level_served: state
            .boundaries
            .highest_level_served()
            .map(|level| level.index()),
    })
}

fn internal_error(message: &str) -> HttpResponse {
    HttpResponse::InternalServerError().json(serde_json::json!({
        "error": message
    }))
}
