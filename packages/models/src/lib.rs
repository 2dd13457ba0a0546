#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Domain types for route crime-risk analysis.
//!
//! These types flow through the whole pipeline: a [`Route`] is produced by
//! the route-fetch collaborator with its [`Waypoint`]s already sampled, the
//! enricher attaches [`CrimeData`] to each waypoint exactly once, the risk
//! agent produces one [`RiskResult`] per route, and the orchestrator
//! projects everything into [`FinalRouteRecord`]s — the only shape returned
//! to callers, which structurally cannot carry waypoints.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Upper bound on the number of incidents attached to a single waypoint.
///
/// The crime collaborator truncates its incident list to this length even
/// when more incidents exist in the query window.
pub const INCIDENT_LIMIT: usize = 5;

/// A driving route alternative between two addresses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    /// 1-based identifier, unique within one analysis request.
    pub route_id: u32,
    /// Human-readable route description (e.g. "I-90 W").
    pub summary: String,
    /// Total distance in miles.
    pub distance_miles: f64,
    /// Expected duration in minutes, without traffic.
    pub duration_minutes: u32,
    /// Full resolved starting address.
    pub start_address: String,
    /// Full resolved ending address.
    pub end_address: String,
    /// Encoded overview polyline for the route geometry.
    pub polyline: String,
    /// Sampled probe points in traversal order. The order encodes spatial
    /// progression along the route and must be preserved.
    pub waypoints: Vec<Waypoint>,
    /// Real-time traffic information, when requested.
    pub traffic: Option<Traffic>,
}

/// A sampled geographic point along a route used as a crime-data probe
/// location.
///
/// Created by the polyline sampler with `crime_data: None`, then mutated
/// exactly once by the enricher. Never mutated again.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Waypoint {
    /// Latitude (WGS84).
    pub latitude: f64,
    /// Longitude (WGS84).
    pub longitude: f64,
    /// Optional human-readable description of the point.
    pub description: Option<String>,
    /// Optional area-type tag (e.g. "urban", "highway").
    pub area_type: Option<String>,
    /// Crime statistics attached by the enricher.
    pub crime_data: Option<CrimeData>,
}

impl Waypoint {
    /// Creates a bare waypoint at the given coordinates.
    #[must_use]
    pub const fn at(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            description: None,
            area_type: None,
            crime_data: None,
        }
    }
}

/// Echo of the coordinates a crime lookup was performed for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    /// Query latitude.
    pub lat: f64,
    /// Query longitude.
    pub lon: f64,
}

/// Result of one crime lookup — exactly one of the two shapes.
///
/// The crime collaborator never raises past its boundary: rate limits and
/// HTTP failures arrive as the [`CrimeData::Error`] variant, so a failed
/// lookup stays local to its waypoint and never aborts sibling work.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CrimeData {
    /// Successful lookup, possibly with zero incidents.
    Incidents(CrimeIncidents),
    /// Failed lookup with the upstream error preserved.
    Error(CrimeLookupError),
}

/// Time-windowed incident statistics for one probe location.
///
/// Invariant: `incidents_returned == incidents.len() <= INCIDENT_LIMIT`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrimeIncidents {
    /// Total incidents in the query window, before truncation.
    pub total_incidents: u32,
    /// The returned incidents, in upstream order, capped at
    /// [`INCIDENT_LIMIT`].
    pub incidents: Vec<Incident>,
    /// Length of `incidents` (redundant, kept for the wire shape).
    pub incidents_returned: usize,
    /// The queried coordinates.
    pub location: Location,
}

/// A failed crime lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrimeLookupError {
    /// Upstream error message (e.g. "Rate limit exceeded").
    pub error: String,
    /// HTTP status code when the failure was an HTTP response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    /// The queried coordinates.
    pub location: Location,
}

/// A single crime incident, passed through from the upstream source with no
/// normalization guarantees.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Incident {
    /// Offense label as reported upstream.
    #[serde(default = "unknown_offense")]
    pub offense: String,
    /// Incident date string as reported upstream.
    #[serde(default = "unknown_date")]
    pub incident_date: String,
}

fn unknown_offense() -> String {
    "Unknown".to_string()
}

fn unknown_date() -> String {
    "Unknown date".to_string()
}

/// Real-time traffic conditions for a route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Traffic {
    /// Duration with current traffic, in minutes.
    pub duration_in_traffic_minutes: u32,
    /// Delay relative to the no-traffic duration, in minutes.
    pub traffic_delay_minutes: u32,
    /// Classified traffic condition.
    pub traffic_condition: TrafficCondition,
}

/// Classified traffic condition based on absolute and relative delay.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TrafficCondition {
    /// Minimal delay.
    Light,
    /// Noticeable but manageable delay.
    Moderate,
    /// Significant delay.
    Heavy,
}

/// Whether risk scoring succeeded for a route.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RiskStatus {
    /// A score and analysis were produced.
    Success,
    /// Scoring failed; `error` carries the message.
    Failed,
}

/// Risk assessment for one route, created once by the risk agent and
/// immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskResult {
    /// The route this result belongs to.
    pub route_id: u32,
    /// Risk score in `[1, 100]`; `None` when scoring failed.
    pub risk_score: Option<u8>,
    /// Free-text analysis; non-empty when scoring succeeded.
    pub analysis: Option<String>,
    /// Outcome of the scoring call.
    pub status: RiskStatus,
    /// Failure message when `status` is [`RiskStatus::Failed`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RiskResult {
    /// Creates a successful result.
    #[must_use]
    pub const fn success(route_id: u32, risk_score: u8, analysis: String) -> Self {
        Self {
            route_id,
            risk_score: Some(risk_score),
            analysis: Some(analysis),
            status: RiskStatus::Success,
            error: None,
        }
    }

    /// Creates a failed result carrying the failure message.
    #[must_use]
    pub const fn failed(route_id: u32, error: String) -> Self {
        Self {
            route_id,
            risk_score: None,
            analysis: None,
            status: RiskStatus::Failed,
            error: Some(error),
        }
    }
}

/// Projection of a [`Route`] plus its [`RiskResult`] — the only externally
/// returned shape.
///
/// Waypoints are absent at the type level, so no pipeline depth can leak
/// them into the final output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalRouteRecord {
    /// Route identifier.
    pub route_id: u32,
    /// Human-readable route description.
    pub summary: String,
    /// Total distance in miles.
    pub distance_miles: f64,
    /// Expected duration in minutes.
    pub duration_minutes: u32,
    /// Full starting address.
    pub start_address: String,
    /// Full ending address.
    pub end_address: String,
    /// Risk score in `[1, 100]`, or `None` on failure.
    pub risk_score: Option<u8>,
    /// Free-text risk analysis, or `None` on failure.
    pub analysis: Option<String>,
    /// Scoring outcome.
    pub status: RiskStatus,
    /// Failure message, present only when `status` is failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FinalRouteRecord {
    /// Combines a route's metadata with its risk result.
    #[must_use]
    pub fn from_parts(route: &Route, result: &RiskResult) -> Self {
        Self {
            route_id: route.route_id,
            summary: route.summary.clone(),
            distance_miles: route.distance_miles,
            duration_minutes: route.duration_minutes,
            start_address: route.start_address.clone(),
            end_address: route.end_address.clone(),
            risk_score: result.risk_score,
            analysis: result.analysis.clone(),
            status: result.status,
            error: result.error.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_route() -> Route {
        Route {
            route_id: 1,
            summary: "I-90 W".to_string(),
            distance_miles: 3.2,
            duration_minutes: 14,
            start_address: "233 S Wacker Dr, Chicago, IL".to_string(),
            end_address: "600 E Grand Ave, Chicago, IL".to_string(),
            polyline: "_p~iF~ps|U".to_string(),
            waypoints: vec![Waypoint::at(41.878, -87.636)],
            traffic: None,
        }
    }

    #[test]
    fn crime_data_deserializes_success_shape() {
        let json = serde_json::json!({
            "total_incidents": 12,
            "incidents": [
                {"offense": "THEFT", "incident_date": "2026-08-10"}
            ],
            "incidents_returned": 1,
            "location": {"lat": 41.878, "lon": -87.636}
        });
        let data: CrimeData = serde_json::from_value(json).unwrap();
        match data {
            CrimeData::Incidents(inc) => {
                assert_eq!(inc.total_incidents, 12);
                assert_eq!(inc.incidents_returned, inc.incidents.len());
            }
            CrimeData::Error(_) => panic!("expected success shape"),
        }
    }

    #[test]
    fn crime_data_deserializes_error_shape() {
        let json = serde_json::json!({
            "error": "Rate limit exceeded",
            "status_code": 429,
            "location": {"lat": 41.878, "lon": -87.636}
        });
        let data: CrimeData = serde_json::from_value(json).unwrap();
        match data {
            CrimeData::Error(err) => {
                assert_eq!(err.error, "Rate limit exceeded");
                assert_eq!(err.status_code, Some(429));
            }
            CrimeData::Incidents(_) => panic!("expected error shape"),
        }
    }

    #[test]
    fn incident_defaults_missing_fields() {
        let inc: Incident = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(inc.offense, "Unknown");
        assert_eq!(inc.incident_date, "Unknown date");
    }

    #[test]
    fn final_record_has_no_waypoints_key() {
        let route = sample_route();
        let result = RiskResult::success(1, 30, "Low risk.".to_string());
        let record = FinalRouteRecord::from_parts(&route, &result);
        let value = serde_json::to_value(&record).unwrap();
        assert!(value.get("waypoints").is_none());
        assert_eq!(value["status"], "success");
        assert_eq!(value["risk_score"], 30);
    }

    #[test]
    fn failed_record_serializes_error_field() {
        let route = sample_route();
        let result = RiskResult::failed(1, "provider unavailable".to_string());
        let record = FinalRouteRecord::from_parts(&route, &result);
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["status"], "failed");
        assert_eq!(value["risk_score"], serde_json::Value::Null);
        assert_eq!(value["error"], "provider unavailable");
    }

    #[test]
    fn success_record_omits_error_field() {
        let route = sample_route();
        let result = RiskResult::success(1, 52, "Moderate.".to_string());
        let record = FinalRouteRecord::from_parts(&route, &result);
        let value = serde_json::to_value(&record).unwrap();
        assert!(value.get("error").is_none());
    }

    #[test]
    fn risk_status_display_is_lowercase() {
        assert_eq!(RiskStatus::Success.to_string(), "success");
        assert_eq!(RiskStatus::Failed.to_string(), "failed");
        assert_eq!(TrafficCondition::Heavy.to_string(), "heavy");
    }
}
