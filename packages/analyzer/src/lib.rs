#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! End-to-end route risk analysis.
//!
//! Wires the three collaborators together behind [`AnalysisContext`]:
//! routes are fetched with waypoints already sampled, enriched with crime
//! data, scored concurrently, and projected into [`FinalRouteRecord`]s.
//! Per-route scoring failures are carried in the records; only fetch-stage
//! failures abort an analysis.

use std::collections::BTreeMap;

use futures::future::join_all;
use safe_routes_ai::{AiError, RiskAgent, RouteScorer};
use safe_routes_crime::{CrimeClient, CrimeSource, enrich_routes};
use safe_routes_maps::{DirectionsClient, MapsError, RouteSource};
use safe_routes_models::{FinalRouteRecord, RiskResult, Route};
use thiserror::Error;

/// Errors that abort an entire analysis.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    /// Route retrieval failed.
    #[error(transparent)]
    Maps(#[from] MapsError),

    /// Risk agent configuration failed.
    #[error(transparent)]
    Ai(#[from] AiError),
}

/// The collaborators one analysis runs against.
pub struct AnalysisContext {
    routes: Box<dyn RouteSource>,
    crime: Box<dyn CrimeSource>,
    scorer: Box<dyn RouteScorer>,
}

impl AnalysisContext {
    /// Creates a context from explicit collaborators.
    #[must_use]
    pub fn new(
        routes: Box<dyn RouteSource>,
        crime: Box<dyn CrimeSource>,
        scorer: Box<dyn RouteScorer>,
    ) -> Self {
        Self {
            routes,
            crime,
            scorer,
        }
    }

    /// Creates a context wired to the real external services, configured
    /// from environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzeError`] when `GOOGLE_MAPS_API_KEY` is missing or no
    /// AI provider credentials are found. A missing crime API key is not
    /// fatal; lookups will carry error values instead.
    pub fn from_env() -> Result<Self, AnalyzeError> {
        Ok(Self::new(
            Box::new(DirectionsClient::from_env()?),
            Box::new(CrimeClient::from_env()),
            Box::new(RiskAgent::from_env()?),
        ))
    }

    /// Runs the full pipeline for one origin/destination pair.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzeError::Maps`] when route retrieval fails. Scoring
    /// failures never surface here; they arrive as `status: failed`
    /// records.
    pub async fn analyze(
        &self,
        origin: &str,
        destination: &str,
        include_traffic: bool,
    ) -> Result<Vec<FinalRouteRecord>, AnalyzeError> {
        log::info!("analyzing routes from '{origin}' to '{destination}'");

        let mut routes = self
            .routes
            .fetch_routes(origin, destination, include_traffic)
            .await?;

        if routes.is_empty() {
            log::warn!("route source returned no routes for '{origin}' -> '{destination}'");
            return Ok(Vec::new());
        }

        enrich_routes(self.crime.as_ref(), &mut routes).await;

        log::info!("scoring {} routes", routes.len());
        let results = join_all(routes.iter().map(|route| self.scorer.assess(route))).await;

        Ok(build_final_result(&routes, &results))
    }
}

/// Joins routes with their risk results by `route_id`.
///
/// Every input route yields exactly one record, in route order. A route
/// with no matching result gets a failed record rather than being dropped.
#[must_use]
pub fn build_final_result(routes: &[Route], results: &[RiskResult]) -> Vec<FinalRouteRecord> {
    let by_id: BTreeMap<u32, &RiskResult> = results
        .iter()
        .map(|result| (result.route_id, result))
        .collect();

    routes
        .iter()
        .map(|route| {
            by_id.get(&route.route_id).map_or_else(
                || {
                    log::error!("route {} has no risk result", route.route_id);
                    FinalRouteRecord::from_parts(
                        route,
                        &RiskResult::failed(
                            route.route_id,
                            "no risk analysis produced".to_string(),
                        ),
                    )
                },
                |result| FinalRouteRecord::from_parts(route, result),
            )
        })
        .collect()
}
