// ABOUTME: Distance-indexed track series shared by all analyzers
// ABOUTME: Haversine cumulative distance plus Kalman-smoothed elevation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cairn Trail Analytics

//! Point-series builder.
//!
//! Converts the decoder's ordered [`RawPoint`] sequence into a
//! [`TrackSeries`]: every point gains the cumulative great-circle distance
//! from the start, and the elevation channel is denoised once with the
//! Kalman filter. All three analyzers consume the same series, so distance
//! accumulation and smoothing happen exactly once per activity and cannot
//! drift between them.

use cairn_core::models::{RawPoint, TrackPoint};
use cairn_core::{AnalysisError, Result};
use tracing::debug;

use crate::algorithms::kalman;

/// Earth's mean radius in meters, for the haversine formula.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Smoothing is only worthwhile past this many samples; shorter series
/// keep their raw elevations.
const MIN_POINTS_FOR_SMOOTHING: usize = 5;

/// Great-circle distance between two coordinates, in meters.
#[must_use]
pub fn haversine_distance_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().min(1.0).asin();

    EARTH_RADIUS_M * c
}

/// Point-wise elevation gain and loss totals, both non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ElevationStats {
    /// Total climb in meters
    pub gain_m: f64,
    /// Total descent in meters, as a positive value
    pub loss_m: f64,
}

/// A distance-indexed, elevation-smoothed track.
///
/// Immutable once built. Holding a series and running analyzers over it is
/// cheap; building one is a single O(n) pass.
#[derive(Debug, Clone)]
pub struct TrackSeries {
    points: Vec<TrackPoint>,
}

impl TrackSeries {
    /// Build a series from the decoder's raw points.
    ///
    /// Missing elevations are carried as 0.0 in the raw channel, matching
    /// the decoder contract. The smoothed channel equals the raw channel
    /// when the series has 5 points or fewer.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::MalformedInput`] when a coordinate is not
    /// finite.
    pub fn from_raw_points(raw: &[RawPoint]) -> Result<Self> {
        for point in raw {
            if !point.latitude.is_finite() || !point.longitude.is_finite() {
                return Err(AnalysisError::malformed_input(
                    "latitude/longitude",
                    "coordinate is not a finite number",
                ));
            }
        }

        let mut cumulative = 0.0;
        let mut raw_elevations = Vec::with_capacity(raw.len());
        let mut points = Vec::with_capacity(raw.len());

        for (i, point) in raw.iter().enumerate() {
            if i > 0 {
                let prev = &raw[i - 1];
                cumulative += haversine_distance_m(
                    prev.latitude,
                    prev.longitude,
                    point.latitude,
                    point.longitude,
                );
            }
            let elevation = point.elevation.unwrap_or(0.0);
            raw_elevations.push(elevation);
            points.push(TrackPoint {
                latitude: point.latitude,
                longitude: point.longitude,
                elevation_raw: elevation,
                elevation,
                distance_m: cumulative,
                timestamp: point.timestamp,
            });
        }

        if raw_elevations.len() > MIN_POINTS_FOR_SMOOTHING {
            let smoothed = kalman::smooth_elevations(&raw_elevations)?;
            for (point, elevation) in points.iter_mut().zip(smoothed) {
                point.elevation = elevation;
            }
        } else {
            debug!(
                points = raw_elevations.len(),
                "series too short for smoothing, keeping raw elevations"
            );
        }

        Ok(Self { points })
    }

    /// The derived points, in recording order.
    #[must_use]
    pub fn points(&self) -> &[TrackPoint] {
        &self.points
    }

    /// Number of points in the series.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the series holds no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Total distance in meters; 0.0 for an empty series.
    #[must_use]
    pub fn total_distance_m(&self) -> f64 {
        self.points.last().map_or(0.0, |p| p.distance_m)
    }

    /// Total distance in kilometers.
    #[must_use]
    pub fn total_distance_km(&self) -> f64 {
        self.total_distance_m() / 1000.0
    }

    /// Point-wise elevation gain and loss over the smoothed channel.
    #[must_use]
    pub fn elevation_stats(&self) -> ElevationStats {
        self.elevation_change_between(0, self.points.len().saturating_sub(1))
    }

    /// Elevation gain/loss accumulated between two point indices.
    ///
    /// Returns zeros when the range is empty or out of bounds.
    #[must_use]
    pub fn elevation_change_between(&self, start_idx: usize, end_idx: usize) -> ElevationStats {
        let mut stats = ElevationStats::default();
        if start_idx >= end_idx || end_idx >= self.points.len() {
            return stats;
        }
        for i in (start_idx + 1)..=end_idx {
            let diff = self.points[i].elevation - self.points[i - 1].elevation;
            if diff > 0.0 {
                stats.gain_m += diff;
            } else {
                stats.loss_m += diff.abs();
            }
        }
        stats
    }

    /// Index of the first point at or beyond the target distance.
    ///
    /// Falls back to the last point when the target lies past the end.
    /// Returns `None` only for an empty series.
    #[must_use]
    pub fn index_at_distance(&self, target_distance_m: f64) -> Option<usize> {
        if self.points.is_empty() {
            return None;
        }
        self.points
            .iter()
            .position(|p| p.distance_m >= target_distance_m)
            .or(Some(self.points.len() - 1))
    }

    /// Index of the point whose cumulative distance is nearest the target.
    #[must_use]
    pub fn index_nearest_distance(&self, target_distance_m: f64) -> Option<usize> {
        if self.points.is_empty() {
            return None;
        }
        let mut closest = 0;
        let mut min_diff = f64::INFINITY;
        for (i, point) in self.points.iter().enumerate() {
            let diff = (point.distance_m - target_distance_m).abs();
            if diff < min_diff {
                min_diff = diff;
                closest = i;
            }
        }
        Some(closest)
    }

    /// Index of the point closest to a coordinate, by great-circle distance.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InsufficientData`] for an empty series.
    pub fn index_nearest_coordinate(&self, lat: f64, lon: f64) -> Result<usize> {
        if self.points.is_empty() {
            return Err(AnalysisError::insufficient_data(0, 1));
        }
        let mut closest = 0;
        let mut min_dist = f64::INFINITY;
        for (i, point) in self.points.iter().enumerate() {
            let dist = haversine_distance_m(lat, lon, point.latitude, point.longitude);
            if dist < min_dist {
                min_dist = dist;
                closest = i;
            }
        }
        Ok(closest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn flat_points(count: usize, lat_step: f64) -> Vec<RawPoint> {
        (0..count)
            .map(|i| {
                RawPoint::with_timestamp(
                    51.5 + lat_step * i as f64,
                    -0.1,
                    Some(100.0),
                    Utc.with_ymd_and_hms(2026, 1, 15, 8, 0, 0).unwrap()
                        + chrono::Duration::seconds(60 * i as i64),
                )
            })
            .collect()
    }

    #[test]
    fn test_distance_is_non_decreasing() {
        let series = TrackSeries::from_raw_points(&flat_points(20, 0.001)).unwrap();
        for pair in series.points().windows(2) {
            assert!(pair[1].distance_m >= pair[0].distance_m);
        }
    }

    #[test]
    fn test_known_distance_one_degree_latitude() {
        // One degree of latitude is ~111.2 km
        let raw = vec![
            RawPoint::new(51.0, 0.0, Some(0.0)),
            RawPoint::new(52.0, 0.0, Some(0.0)),
        ];
        let series = TrackSeries::from_raw_points(&raw).unwrap();
        let km = series.total_distance_km();
        assert!((km - 111.2).abs() < 1.0, "got {km}");
    }

    #[test]
    fn test_same_point_zero_distance() {
        assert_eq!(haversine_distance_m(51.5, -0.1, 51.5, -0.1), 0.0);
    }

    #[test]
    fn test_short_series_keeps_raw_elevations() {
        let raw: Vec<RawPoint> = (0..5)
            .map(|i| RawPoint::new(51.5 + 0.001 * f64::from(i), -0.1, Some(100.0 + f64::from(i))))
            .collect();
        let series = TrackSeries::from_raw_points(&raw).unwrap();
        for point in series.points() {
            assert_eq!(point.elevation, point.elevation_raw);
        }
    }

    #[test]
    fn test_smoothing_applied_above_threshold() {
        let raw: Vec<RawPoint> = (0..20)
            .map(|i| {
                let noise = if i % 2 == 0 { 6.0 } else { -6.0 };
                RawPoint::new(51.5 + 0.001 * f64::from(i), -0.1, Some(100.0 + noise))
            })
            .collect();
        let series = TrackSeries::from_raw_points(&raw).unwrap();
        let smoothed_differs = series
            .points()
            .iter()
            .skip(1)
            .any(|p| (p.elevation - p.elevation_raw).abs() > 1e-9);
        assert!(smoothed_differs);
        // Series length is preserved either way
        assert_eq!(series.len(), raw.len());
    }

    #[test]
    fn test_missing_elevation_defaults_to_zero() {
        let raw = vec![
            RawPoint::new(51.5, -0.1, None),
            RawPoint::new(51.501, -0.1, None),
        ];
        let series = TrackSeries::from_raw_points(&raw).unwrap();
        assert_eq!(series.points()[0].elevation_raw, 0.0);
    }

    #[test]
    fn test_non_finite_coordinate_rejected() {
        let raw = vec![RawPoint::new(f64::NAN, -0.1, None)];
        let err = TrackSeries::from_raw_points(&raw).unwrap_err();
        assert!(matches!(err, AnalysisError::MalformedInput { .. }));
    }

    #[test]
    fn test_elevation_stats_up_then_down() {
        // 100m up then 100m down, without smoothing (short series avoided by
        // monotonic ramp: use raw > 5 points, smoothing keeps direction)
        let mut raw = Vec::new();
        for i in 0..10 {
            raw.push(RawPoint::new(
                51.5 + 0.001 * f64::from(i),
                -0.1,
                Some(100.0 + f64::from(i) * 10.0),
            ));
        }
        for i in 0..10 {
            raw.push(RawPoint::new(
                51.51 + 0.001 * f64::from(i),
                -0.1,
                Some(190.0 - f64::from(i) * 10.0),
            ));
        }
        let series = TrackSeries::from_raw_points(&raw).unwrap();
        let stats = series.elevation_stats();
        assert!(stats.gain_m > 0.0);
        assert!(stats.loss_m > 0.0);
    }

    #[test]
    fn test_index_at_distance_snaps_forward() {
        let series = TrackSeries::from_raw_points(&flat_points(10, 0.001)).unwrap();
        let step = series.points()[1].distance_m;
        let idx = series.index_at_distance(step * 1.5).unwrap();
        assert_eq!(idx, 2);
        // Past the end falls back to the last point
        let last = series.index_at_distance(1e9).unwrap();
        assert_eq!(last, 9);
    }

    #[test]
    fn test_index_nearest_coordinate() {
        let series = TrackSeries::from_raw_points(&flat_points(10, 0.001)).unwrap();
        let idx = series.index_nearest_coordinate(51.5031, -0.1).unwrap();
        assert_eq!(idx, 3);
    }
}
