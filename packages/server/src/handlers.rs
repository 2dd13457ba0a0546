//! HTTP handler functions for the route risk API.

use actix_web::{HttpResponse, web};
use safe_routes_analyzer::AnalyzeError;
use safe_routes_maps::MapsError;
use safe_routes_server_models::{AnalyzeQueryParams, ApiHealth};

use crate::AppState;

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/analyze`
///
/// Fetches route alternatives between two addresses, enriches them with
/// recent crime data, and returns one scored record per route.
pub async fn analyze(
    state: web::Data<AppState>,
    params: web::Query<AnalyzeQueryParams>,
) -> HttpResponse {
    let include_traffic = params.include_traffic.unwrap_or(true);

    match state
        .ctx
        .analyze(&params.origin, &params.destination, include_traffic)
        .await
    {
        Ok(records) => HttpResponse::Ok().json(records),
        Err(AnalyzeError::Maps(MapsError::NoRouteFound {
            origin,
            destination,
        })) => HttpResponse::NotFound().json(serde_json::json!({
            "error": format!("No routes found between '{origin}' and '{destination}'")
        })),
        Err(e @ AnalyzeError::Maps(MapsError::Config { .. })) => {
            log::error!("Analysis misconfigured: {e}");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Server is not configured for route analysis"
            }))
        }
        Err(e) => {
            log::error!("Failed to analyze routes: {e}");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to analyze routes"
            }))
        }
    }
}
