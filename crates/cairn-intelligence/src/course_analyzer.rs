// ABOUTME: Course-level analysis for race planning over a decoded track
// ABOUTME: Stats, elevation profile, aid-station enrichment and segment pace
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cairn Trail Analytics

//! Course analysis for race planning.
//!
//! Operates on the course track rather than a recorded effort: overall
//! statistics, a down-sampled elevation profile for charting, per-station
//! enrichment of an aid-station plan, and a grade-adjusted pace report for
//! a single course segment with a known split time.

use serde::{Deserialize, Serialize};

use cairn_core::models::RawPoint;
use cairn_core::{AnalysisError, Result};

use crate::algorithms::minetti;
use crate::series::TrackSeries;

/// Overall course statistics.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CourseStats {
    /// Total course distance, kilometers
    pub total_distance_km: f64,
    /// Point-wise elevation gain over smoothed elevations, meters
    pub elevation_gain_m: f64,
    /// Point-wise elevation loss, meters, as a positive value
    pub elevation_loss_m: f64,
    /// Number of track points
    pub points_count: usize,
    /// Smoothed elevation at the start, meters
    pub start_elevation_m: f64,
    /// Smoothed elevation at the finish, meters
    pub end_elevation_m: f64,
    /// Lowest smoothed elevation on course, meters
    pub min_elevation_m: f64,
    /// Highest smoothed elevation on course, meters
    pub max_elevation_m: f64,
}

/// One sample of the down-sampled elevation profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElevationSample {
    /// Sample position, kilometers from the start
    pub distance_km: f64,
    /// Smoothed elevation at the nearest track point, meters
    pub elevation_m: f64,
}

/// How an aid station is pinned to the course.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StationLocation {
    /// Nearest track point to a coordinate
    Coordinate {
        /// Latitude in degrees
        latitude: f64,
        /// Longitude in degrees
        longitude: f64,
    },
    /// Nearest track point to a distance from the start
    DistanceKm(f64),
}

/// An aid station to be enriched against the course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationSite {
    /// Display name
    pub name: String,
    /// Where the station sits on the course
    pub location: StationLocation,
}

/// Course-derived metrics for one aid station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AidStationAnalysis {
    /// Station name, carried through from the input
    pub name: String,
    /// Station position, kilometers from the start
    pub distance_km: f64,
    /// Smoothed elevation at the station, meters
    pub elevation_m: f64,
    /// Distance from the previous station (or the start), kilometers
    pub distance_from_prev_km: f64,
    /// Point-wise elevation gain since the previous station, meters
    pub elevation_gain_from_prev_m: f64,
    /// Point-wise elevation loss since the previous station, meters
    pub elevation_loss_from_prev_m: f64,
    /// Net average gradient since the previous station, percent
    pub avg_gradient_percent: f64,
}

/// Grade-adjusted pace report for one course segment with a known time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SegmentPaceReport {
    /// Segment length, kilometers
    pub distance_km: f64,
    /// Net smoothed elevation change, meters
    pub elevation_change_m: f64,
    /// Net gradient, percent
    pub gradient_percent: f64,
    /// Actual pace, min/km
    pub actual_pace_min_km: f64,
    /// Grade-adjusted pace, min/km
    pub grade_adjusted_pace_min_km: f64,
    /// Terrain cost relative to flat ground
    pub cost_ratio: f64,
}

/// Course analyzer over a distance-indexed track series.
#[derive(Debug, Clone)]
pub struct CourseAnalyzer {
    series: TrackSeries,
}

impl CourseAnalyzer {
    /// Wrap an already-built series.
    #[must_use]
    pub const fn new(series: TrackSeries) -> Self {
        Self { series }
    }

    /// Build the series from the decoder's raw points.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::MalformedInput`] when a coordinate is not
    /// finite.
    pub fn from_raw_points(raw: &[RawPoint]) -> Result<Self> {
        Ok(Self::new(TrackSeries::from_raw_points(raw)?))
    }

    /// The underlying series.
    #[must_use]
    pub const fn series(&self) -> &TrackSeries {
        &self.series
    }

    /// Overall course statistics; all zeros for an empty course.
    #[must_use]
    pub fn stats(&self) -> CourseStats {
        let points = self.series.points();
        if points.is_empty() {
            return CourseStats::default();
        }

        let elevation_stats = self.series.elevation_stats();
        let mut min_elevation = f64::INFINITY;
        let mut max_elevation = f64::NEG_INFINITY;
        for point in points {
            min_elevation = min_elevation.min(point.elevation);
            max_elevation = max_elevation.max(point.elevation);
        }

        CourseStats {
            total_distance_km: self.series.total_distance_km(),
            elevation_gain_m: elevation_stats.gain_m,
            elevation_loss_m: elevation_stats.loss_m,
            points_count: points.len(),
            start_elevation_m: points[0].elevation,
            end_elevation_m: points[points.len() - 1].elevation,
            min_elevation_m: min_elevation,
            max_elevation_m: max_elevation,
        }
    }

    /// Down-sample the course into `num_points + 1` evenly spaced
    /// elevation samples for charting. Empty for an empty course.
    #[must_use]
    pub fn elevation_profile(&self, num_points: usize) -> Vec<ElevationSample> {
        if self.series.is_empty() {
            return Vec::new();
        }
        let total_distance = self.series.total_distance_m();
        let step = if num_points > 0 {
            total_distance / num_points as f64
        } else {
            total_distance
        };

        (0..=num_points)
            .filter_map(|i| {
                let target = i as f64 * step;
                let idx = self.series.index_nearest_distance(target)?;
                Some(ElevationSample {
                    distance_km: target / 1000.0,
                    elevation_m: self.series.points()[idx].elevation,
                })
            })
            .collect()
    }

    /// Enrich an ordered aid-station plan with course-derived metrics.
    ///
    /// Gain and loss are accumulated point-wise between consecutive
    /// stations; the average gradient uses net elevation change only.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InsufficientData`] when the course is
    /// empty and a station must be located by coordinate.
    pub fn analyze_aid_stations(&self, stations: &[StationSite]) -> Result<Vec<AidStationAnalysis>> {
        let points = self.series.points();
        let mut results = Vec::with_capacity(stations.len());
        let mut prev_idx = 0usize;
        let mut prev_elevation = points.first().map_or(0.0, |p| p.elevation);
        let mut prev_distance_km = 0.0;

        for station in stations {
            let idx = match station.location {
                StationLocation::Coordinate {
                    latitude,
                    longitude,
                } => self.series.index_nearest_coordinate(latitude, longitude)?,
                StationLocation::DistanceKm(km) => self
                    .series
                    .index_nearest_distance(km * 1000.0)
                    .ok_or_else(|| AnalysisError::insufficient_data(0, 1))?,
            };
            let point = &points[idx];

            let distance_km = point.distance_m / 1000.0;
            let distance_from_prev_km = distance_km - prev_distance_km;
            let stats = self.series.elevation_change_between(prev_idx, idx);

            let avg_gradient_percent = if distance_from_prev_km > 0.0 {
                (point.elevation - prev_elevation) / (distance_from_prev_km * 1000.0) * 100.0
            } else {
                0.0
            };

            results.push(AidStationAnalysis {
                name: station.name.clone(),
                distance_km,
                elevation_m: point.elevation,
                distance_from_prev_km,
                elevation_gain_from_prev_m: stats.gain_m,
                elevation_loss_from_prev_m: stats.loss_m,
                avg_gradient_percent,
            });

            prev_idx = idx;
            prev_elevation = point.elevation;
            prev_distance_km = distance_km;
        }

        Ok(results)
    }

    /// Grade-adjusted pace for a course segment covered in a known time.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InvalidSegment`] when the segment has
    /// non-positive distance or time, or the course is empty.
    pub fn segment_pace(
        &self,
        start_distance_km: f64,
        end_distance_km: f64,
        time_seconds: f64,
    ) -> Result<SegmentPaceReport> {
        if time_seconds <= 0.0 {
            return Err(AnalysisError::invalid_segment("time must be positive"));
        }
        let (Some(start_idx), Some(end_idx)) = (
            self.series.index_nearest_distance(start_distance_km * 1000.0),
            self.series.index_nearest_distance(end_distance_km * 1000.0),
        ) else {
            return Err(AnalysisError::invalid_segment("course has no points"));
        };
        if start_idx >= end_idx {
            return Err(AnalysisError::invalid_segment(
                "segment start is not before its end",
            ));
        }

        let points = self.series.points();
        let start = &points[start_idx];
        let end = &points[end_idx];
        let distance_m = end.distance_m - start.distance_m;
        if distance_m <= 0.0 {
            return Err(AnalysisError::invalid_segment(
                "segment covers no distance",
            ));
        }

        let elevation_change = end.elevation - start.elevation;
        let gradient = elevation_change / distance_m;
        let cost_ratio = minetti::cost_ratio(gradient);
        let actual_pace = (time_seconds / 60.0) / (distance_m / 1000.0);
        let gap = minetti::grade_adjusted_pace(actual_pace, gradient);

        Ok(SegmentPaceReport {
            distance_km: distance_m / 1000.0,
            elevation_change_m: elevation_change,
            gradient_percent: gradient * 100.0,
            actual_pace_min_km: actual_pace,
            grade_adjusted_pace_min_km: gap,
            cost_ratio,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn climb_course() -> CourseAnalyzer {
        // ~4.4km northward, climbing 5m per ~55.6m step for the middle half
        let raw: Vec<RawPoint> = (0..80)
            .map(|i| {
                let elevation = match i {
                    0..=19 => 400.0,
                    20..=59 => 400.0 + 5.0 * f64::from(i - 19),
                    _ => 600.0,
                };
                RawPoint::new(46.0 + 0.0005 * f64::from(i), 7.0, Some(elevation))
            })
            .collect();
        CourseAnalyzer::from_raw_points(&raw).unwrap()
    }

    #[test]
    fn test_stats_on_empty_course() {
        let analyzer = CourseAnalyzer::from_raw_points(&[]).unwrap();
        let stats = analyzer.stats();
        assert_eq!(stats.points_count, 0);
        assert_eq!(stats.total_distance_km, 0.0);
    }

    #[test]
    fn test_stats_reflect_course_shape() {
        let stats = climb_course().stats();
        assert_eq!(stats.points_count, 80);
        assert!(stats.total_distance_km > 4.0);
        assert!(stats.elevation_gain_m > 150.0);
        assert!(stats.max_elevation_m > stats.min_elevation_m);
        assert!(stats.end_elevation_m > stats.start_elevation_m);
    }

    #[test]
    fn test_elevation_profile_sample_count() {
        let profile = climb_course().elevation_profile(50);
        assert_eq!(profile.len(), 51);
        assert_eq!(profile[0].distance_km, 0.0);
        for pair in profile.windows(2) {
            assert!(pair[1].distance_km > pair[0].distance_km);
        }
    }

    #[test]
    fn test_aid_station_enrichment_by_distance() {
        let analyzer = climb_course();
        let stations = vec![
            StationSite {
                name: "Mid".into(),
                location: StationLocation::DistanceKm(2.0),
            },
            StationSite {
                name: "Top".into(),
                location: StationLocation::DistanceKm(4.0),
            },
        ];
        let enriched = analyzer.analyze_aid_stations(&stations).unwrap();
        assert_eq!(enriched.len(), 2);
        assert!((enriched[0].distance_km - 2.0).abs() < 0.1);
        assert!((enriched[1].distance_from_prev_km - 2.0).abs() < 0.2);
        // The course climbs between the two stations
        assert!(enriched[1].elevation_gain_from_prev_m > 0.0);
        assert!(enriched[1].avg_gradient_percent > 0.0);
    }

    #[test]
    fn test_aid_station_enrichment_by_coordinate() {
        let analyzer = climb_course();
        let stations = vec![StationSite {
            name: "Checkpoint".into(),
            location: StationLocation::Coordinate {
                latitude: 46.0 + 0.0005 * 40.0,
                longitude: 7.0,
            },
        }];
        let enriched = analyzer.analyze_aid_stations(&stations).unwrap();
        assert!((enriched[0].distance_km - 40.0 * 0.0556).abs() < 0.1);
    }

    #[test]
    fn test_segment_pace_uphill_adjusts_down() {
        let analyzer = climb_course();
        // 30 minutes over the climbing middle section
        let report = analyzer.segment_pace(1.5, 3.0, 1800.0).unwrap();
        assert!(report.gradient_percent > 3.0);
        assert!(report.cost_ratio > 1.0);
        assert!(report.grade_adjusted_pace_min_km < report.actual_pace_min_km);
    }

    #[test]
    fn test_segment_pace_rejects_bad_input() {
        let analyzer = climb_course();
        let err = analyzer.segment_pace(2.0, 1.0, 600.0).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidSegment { .. }));
        let err = analyzer.segment_pace(1.0, 2.0, 0.0).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidSegment { .. }));
    }
}
