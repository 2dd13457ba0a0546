//! Traffic delay classification.

use safe_routes_models::{Traffic, TrafficCondition};

/// Classifies traffic from the no-traffic and with-traffic durations.
///
/// Uses both the absolute delay and the delay relative to the normal
/// duration: under 5 minutes and under 10% is light, under 15 minutes and
/// under 30% is moderate, everything else is heavy. A zero normal duration
/// counts as a 0% delay.
#[must_use]
pub fn classify_traffic(duration_normal: u32, duration_traffic: u32) -> Traffic {
    let delay = duration_traffic.saturating_sub(duration_normal);

    let delay_percent = if duration_normal > 0 {
        f64::from(delay) / f64::from(duration_normal) * 100.0
    } else {
        0.0
    };

    let condition = if delay < 5 && delay_percent < 10.0 {
        TrafficCondition::Light
    } else if delay < 15 && delay_percent < 30.0 {
        TrafficCondition::Moderate
    } else {
        TrafficCondition::Heavy
    };

    Traffic {
        duration_in_traffic_minutes: duration_traffic,
        traffic_delay_minutes: delay,
        traffic_condition: condition,
    }
}
