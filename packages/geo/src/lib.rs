#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Route geometry primitives: polyline decoding, haversine distance, and
//! density-adaptive waypoint sampling.
//!
//! Distances use the haversine great-circle formula with an Earth radius of
//! 3959 miles. Ellipsoidal error is ignored — the sampled points feed crime
//! enrichment, not navigation, so local routing precision is sufficient.

use thiserror::Error;

/// Earth's mean radius in miles.
const EARTH_RADIUS_MILES: f64 = 3959.0;

/// Minimum gap between the last emitted sample and the route's true final
/// coordinate before the final coordinate is appended as its own sample.
const FINAL_POINT_MIN_GAP_MILES: f64 = 0.1;

/// Precision-5 scaling factor for encoded polylines.
const POLYLINE_PRECISION: f64 = 1e5;

/// Errors from decoding an encoded polyline.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PolylineError {
    /// The string ended in the middle of a coordinate.
    #[error("polyline truncated at byte {position}")]
    Truncated {
        /// Byte offset where input ran out.
        position: usize,
    },

    /// A byte outside the valid encoding alphabet was encountered.
    #[error("invalid polyline byte {byte:#04x} at position {position}")]
    InvalidByte {
        /// The offending byte.
        byte: u8,
        /// Its offset in the input.
        position: usize,
    },
}

/// Great-circle distance between two coordinates, in miles.
#[must_use]
pub fn haversine_miles(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();

    let a = (dlat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_MILES * c
}

/// Waypoint sampling interval for a route of the given total length.
///
/// Shorter routes sample denser so urban coverage stays fine-grained;
/// long highway routes sample sparser. Thresholds are strict upper bounds,
/// compared ascending, first match wins:
///
/// | distance < | interval |
/// |---|---|
/// | 5 mi | 0.5 mi |
/// | 10 mi | 0.75 mi |
/// | 20 mi | 1.5 mi |
/// | 40 mi | 2.5 mi |
/// | else | 4.0 mi |
///
/// Non-positive distances fall into the first band and return 0.5; validating
/// the distance is the caller's responsibility.
#[must_use]
pub fn adaptive_interval_miles(total_distance_miles: f64) -> f64 {
    if total_distance_miles < 5.0 {
        0.5
    } else if total_distance_miles < 10.0 {
        0.75
    } else if total_distance_miles < 20.0 {
        1.5
    } else if total_distance_miles < 40.0 {
        2.5
    } else {
        4.0
    }
}

/// Decodes a precision-5 encoded polyline into `(latitude, longitude)` pairs.
///
/// # Errors
///
/// Returns [`PolylineError`] if the input is truncated mid-coordinate or
/// contains bytes outside the encoding alphabet.
pub fn decode_polyline(encoded: &str) -> Result<Vec<(f64, f64)>, PolylineError> {
    let bytes = encoded.as_bytes();
    let mut coords = Vec::new();
    let mut position = 0;
    let mut lat: i64 = 0;
    let mut lon: i64 = 0;

    while position < bytes.len() {
        lat += decode_delta(bytes, &mut position)?;
        lon += decode_delta(bytes, &mut position)?;

        #[allow(clippy::cast_precision_loss)]
        coords.push((
            lat as f64 / POLYLINE_PRECISION,
            lon as f64 / POLYLINE_PRECISION,
        ));
    }

    Ok(coords)
}

/// Decodes one zigzag-encoded varint delta starting at `*position`.
fn decode_delta(bytes: &[u8], position: &mut usize) -> Result<i64, PolylineError> {
    let mut result: i64 = 0;
    let mut shift = 0;

    loop {
        let Some(&byte) = bytes.get(*position) else {
            return Err(PolylineError::Truncated {
                position: *position,
            });
        };
        if byte < 63 {
            return Err(PolylineError::InvalidByte {
                byte,
                position: *position,
            });
        }
        *position += 1;

        let chunk = i64::from(byte - 63);
        result |= (chunk & 0x1f) << shift;
        shift += 5;

        if chunk & 0x20 == 0 {
            break;
        }
    }

    // Zigzag: low bit is the sign.
    if result & 1 == 0 {
        Ok(result >> 1)
    } else {
        Ok(!(result >> 1))
    }
}

/// Samples probe points from an encoded polyline at the given interval.
///
/// The first decoded coordinate is always emitted. Walking consecutive
/// coordinate pairs, segment distances accumulate — including across
/// passed-over intermediate points — and the accumulator resets only when a
/// point is emitted. A point is emitted once the accumulated distance
/// reaches the interval. After traversal, if the input had more than one
/// coordinate and the last emitted point is more than 0.1 miles from the
/// true final coordinate, the final coordinate is appended so the
/// destination is always represented.
///
/// Output preserves polyline traversal order.
///
/// # Errors
///
/// Returns [`PolylineError`] if the polyline fails to decode.
pub fn sample_points(
    encoded: &str,
    interval_miles: f64,
) -> Result<Vec<(f64, f64)>, PolylineError> {
    let coords = decode_polyline(encoded)?;

    let Some(&first) = coords.first() else {
        return Ok(Vec::new());
    };

    let mut samples = vec![first];
    let mut accumulated = 0.0;

    for pair in coords.windows(2) {
        let (prev_lat, prev_lon) = pair[0];
        let (curr_lat, curr_lon) = pair[1];

        accumulated += haversine_miles(prev_lat, prev_lon, curr_lat, curr_lon);

        if accumulated >= interval_miles {
            samples.push((curr_lat, curr_lon));
            accumulated = 0.0;
        }
    }

    if coords.len() > 1 {
        let (final_lat, final_lon) = coords[coords.len() - 1];
        let (last_lat, last_lon) = samples[samples.len() - 1];

        if haversine_miles(last_lat, last_lon, final_lat, final_lon) > FINAL_POINT_MIN_GAP_MILES {
            samples.push((final_lat, final_lon));
        }
    }

    Ok(samples)
}
