//! Google Directions API client.
//!
//! Requests route alternatives between two addresses and converts each
//! into a domain [`Route`], sampling crime-probe waypoints from the
//! overview polyline before the route is handed to the caller.

use safe_routes_geo::{adaptive_interval_miles, sample_points};
use safe_routes_models::{Route, Waypoint};
use serde::Deserialize;

use crate::traffic::classify_traffic;
use crate::{MapsError, RouteSource};

/// Directions API endpoint.
const DIRECTIONS_URL: &str = "https://maps.googleapis.com/maps/api/directions/json";

/// Meters per statute mile.
const METERS_PER_MILE: f64 = 1609.34;

/// Per-request deadline in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Client for the Google Directions API.
pub struct DirectionsClient {
    api_key: String,
    client: reqwest::Client,
}

impl DirectionsClient {
    /// Creates a client from the `GOOGLE_MAPS_API_KEY` environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`MapsError::Config`] if the key is not set — route fetching
    /// is mandatory, so this is fatal at startup rather than per-request.
    pub fn from_env() -> Result<Self, MapsError> {
        let api_key = std::env::var("GOOGLE_MAPS_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| MapsError::Config {
                message: "GOOGLE_MAPS_API_KEY environment variable not set".to_string(),
            })?;

        Ok(Self {
            api_key,
            client: reqwest::Client::new(),
        })
    }
}

#[derive(Deserialize)]
struct DirectionsResponse {
    status: String,
    #[serde(default)]
    routes: Vec<ApiRoute>,
    error_message: Option<String>,
}

#[derive(Deserialize)]
struct ApiRoute {
    summary: Option<String>,
    legs: Vec<ApiLeg>,
    overview_polyline: ApiPolyline,
}

#[derive(Deserialize)]
struct ApiLeg {
    distance: ApiValue,
    duration: ApiValue,
    duration_in_traffic: Option<ApiValue>,
    start_address: String,
    end_address: String,
}

#[derive(Deserialize)]
struct ApiValue {
    value: u64,
}

#[derive(Deserialize)]
struct ApiPolyline {
    points: String,
}

#[async_trait::async_trait]
impl RouteSource for DirectionsClient {
    async fn fetch_routes(
        &self,
        origin: &str,
        destination: &str,
        include_traffic: bool,
    ) -> Result<Vec<Route>, MapsError> {
        let mut params = vec![
            ("origin", origin.to_string()),
            ("destination", destination.to_string()),
            ("mode", "driving".to_string()),
            ("alternatives", "true".to_string()),
            ("key", self.api_key.clone()),
        ];

        if include_traffic {
            params.push(("departure_time", "now".to_string()));
            params.push(("traffic_model", "best_guess".to_string()));
        }

        let resp = self
            .client
            .get(DIRECTIONS_URL)
            .query(&params)
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(MapsError::Parse {
                message: format!("Directions API returned HTTP {status}"),
            });
        }

        let body: DirectionsResponse = resp.json().await?;
        parse_directions(body, origin, destination)
    }
}

/// Converts a Directions API response into domain routes.
///
/// Waypoints are sampled here, at the interval the route's total length
/// calls for, so every returned route is ready for enrichment.
fn parse_directions(
    body: DirectionsResponse,
    origin: &str,
    destination: &str,
) -> Result<Vec<Route>, MapsError> {
    match body.status.as_str() {
        "OK" => {}
        "ZERO_RESULTS" | "NOT_FOUND" => {
            return Err(MapsError::NoRouteFound {
                origin: origin.to_string(),
                destination: destination.to_string(),
            });
        }
        other => {
            return Err(MapsError::Parse {
                message: body
                    .error_message
                    .unwrap_or_else(|| format!("Directions API status {other}")),
            });
        }
    }

    if body.routes.is_empty() {
        return Err(MapsError::NoRouteFound {
            origin: origin.to_string(),
            destination: destination.to_string(),
        });
    }

    let mut routes = Vec::with_capacity(body.routes.len());

    for (idx, api_route) in body.routes.into_iter().enumerate() {
        #[allow(clippy::cast_possible_truncation)]
        let route_id = idx as u32 + 1;

        // Direct A-to-B routes have exactly one leg.
        let Some(leg) = api_route.legs.first() else {
            return Err(MapsError::Parse {
                message: format!("route {route_id} has no legs"),
            });
        };

        #[allow(clippy::cast_precision_loss)]
        let distance_miles = leg.distance.value as f64 / METERS_PER_MILE;
        let duration_minutes = u32::try_from(leg.duration.value / 60).unwrap_or(u32::MAX);

        let traffic = leg.duration_in_traffic.as_ref().map(|in_traffic| {
            let traffic_minutes = u32::try_from(in_traffic.value / 60).unwrap_or(u32::MAX);
            classify_traffic(duration_minutes, traffic_minutes)
        });

        let interval = adaptive_interval_miles(distance_miles);
        let waypoints: Vec<Waypoint> = sample_points(&api_route.overview_polyline.points, interval)?
            .into_iter()
            .map(|(lat, lon)| Waypoint::at(lat, lon))
            .collect();

        log::debug!(
            "route {route_id}: {distance_miles:.2} mi, interval {interval} mi, {} waypoints",
            waypoints.len()
        );

        routes.push(Route {
            route_id,
            summary: api_route
                .summary
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| format!("Route {route_id}")),
            distance_miles: (distance_miles * 100.0).round() / 100.0,
            duration_minutes,
            start_address: leg.start_address.clone(),
            end_address: leg.end_address.clone(),
            polyline: api_route.overview_polyline.points,
            waypoints,
            traffic,
        });
    }

    Ok(routes)
}
