//! Concurrent waypoint enrichment.
//!
//! Two-level fan-out: all routes in a batch are enriched concurrently, and
//! within each route all waypoints are enriched concurrently. Results are
//! written back positionally, so waypoint order — which encodes spatial
//! progression along the route — survives unordered completion.

use futures::future::join_all;
use safe_routes_models::{Route, Waypoint};

use crate::CrimeSource;

/// Attaches crime data to a single waypoint.
pub async fn enrich_waypoint(source: &dyn CrimeSource, waypoint: &mut Waypoint) {
    let data = source.incidents(waypoint.latitude, waypoint.longitude).await;
    waypoint.crime_data = Some(data);
}

/// Enriches every waypoint of a route concurrently.
///
/// A route with no waypoints is returned unchanged without touching the
/// collaborator.
pub async fn enrich_route(source: &dyn CrimeSource, route: &mut Route) {
    if route.waypoints.is_empty() {
        log::warn!("route {} has no waypoints to enrich", route.route_id);
        return;
    }

    log::info!(
        "enriching route {} with {} waypoints",
        route.route_id,
        route.waypoints.len()
    );

    let lookups = route
        .waypoints
        .iter()
        .map(|wp| source.incidents(wp.latitude, wp.longitude));
    let results = join_all(lookups).await;

    // join_all yields results in input order, so this zip is positional.
    for (waypoint, data) in route.waypoints.iter_mut().zip(results) {
        waypoint.crime_data = Some(data);
    }
}

/// Enriches all routes in a batch concurrently.
pub async fn enrich_routes(source: &dyn CrimeSource, routes: &mut [Route]) {
    log::info!("enriching {} routes with crime data", routes.len());

    join_all(routes.iter_mut().map(|route| enrich_route(source, route))).await;
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use safe_routes_models::{CrimeData, CrimeIncidents, Location};

    use super::*;

    /// Counts lookups and echoes the query coordinates back in the result.
    struct EchoSource {
        calls: AtomicUsize,
    }

    impl EchoSource {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait::async_trait]
    impl CrimeSource for EchoSource {
        async fn incidents(&self, latitude: f64, longitude: f64) -> CrimeData {
            self.calls.fetch_add(1, Ordering::SeqCst);
            CrimeData::Incidents(CrimeIncidents {
                total_incidents: 0,
                incidents: Vec::new(),
                incidents_returned: 0,
                location: Location {
                    lat: latitude,
                    lon: longitude,
                },
            })
        }
    }

    fn route_with_waypoints(waypoints: Vec<Waypoint>) -> Route {
        Route {
            route_id: 1,
            summary: "Test Route".to_string(),
            distance_miles: 2.0,
            duration_minutes: 10,
            start_address: "A".to_string(),
            end_address: "B".to_string(),
            polyline: String::new(),
            waypoints,
            traffic: None,
        }
    }

    #[tokio::test]
    async fn zero_waypoint_route_makes_no_calls() {
        let source = EchoSource::new();
        let mut route = route_with_waypoints(Vec::new());
        let before = route.clone();

        enrich_route(&source, &mut route).await;

        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
        assert_eq!(
            serde_json::to_value(&route).unwrap(),
            serde_json::to_value(&before).unwrap()
        );
    }

    #[tokio::test]
    async fn enrichment_preserves_waypoint_order() {
        let source = EchoSource::new();
        let mut route = route_with_waypoints(vec![
            Waypoint::at(41.1, -87.1),
            Waypoint::at(41.2, -87.2),
            Waypoint::at(41.3, -87.3),
        ]);

        enrich_route(&source, &mut route).await;

        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
        for (i, wp) in route.waypoints.iter().enumerate() {
            let Some(CrimeData::Incidents(data)) = &wp.crime_data else {
                panic!("waypoint {i} not enriched");
            };
            // Each result landed on the waypoint whose coordinates it
            // was queried for.
            assert!((data.location.lat - wp.latitude).abs() < f64::EPSILON);
            assert!((data.location.lon - wp.longitude).abs() < f64::EPSILON);
        }
    }

    #[tokio::test]
    async fn enrich_waypoint_attaches_data_once() {
        let source = EchoSource::new();
        let mut wp = Waypoint::at(41.878, -87.636);

        enrich_waypoint(&source, &mut wp).await;

        assert!(wp.crime_data.is_some());
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn batch_enriches_every_route() {
        let source = EchoSource::new();
        let mut routes = vec![
            route_with_waypoints(vec![Waypoint::at(41.1, -87.1)]),
            route_with_waypoints(vec![
                Waypoint::at(41.2, -87.2),
                Waypoint::at(41.3, -87.3),
            ]),
        ];
        routes[1].route_id = 2;

        enrich_routes(&source, &mut routes).await;

        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
        assert!(routes
            .iter()
            .flat_map(|r| &r.waypoints)
            .all(|wp| wp.crime_data.is_some()));
    }
}
