// ABOUTME: Fixed-length segmentation and per-activity performance metrics
// ABOUTME: Produces 1km segments, pace-by-gradient and the ActivityAnalysisResult
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cairn Trail Analytics

//! Fixed-segment performance analysis.
//!
//! Splits an activity into ~1 km segments, computes per-segment pace and
//! grade-adjusted pace, and assembles the complete
//! [`ActivityAnalysisResult`] consumed by the profile aggregator. Segments
//! with missing timing are discarded rather than failing the run: a GPS
//! dropout should cost one segment of signal, not the whole activity.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use cairn_core::{AnalysisError, Result};

use crate::algorithms::minetti;
use crate::config::SegmentationConfig;
use crate::fatigue::{self, FatiguePoint, PaceBucket};
use crate::gradient::GradientBucket;
use crate::series::TrackSeries;

/// Result schema marker carried on every emitted analysis.
pub const ANALYSIS_VERSION: &str = "1.0";

/// One ~1 km segment of an activity with its pace metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedSegment {
    /// Cumulative distance at the segment start, kilometers
    pub start_distance_km: f64,
    /// Cumulative distance at the segment end, kilometers
    pub end_distance_km: f64,
    /// Segment length, kilometers (always > 0)
    pub distance_km: f64,
    /// Smoothed elevation change over the segment, meters
    pub elevation_change_m: f64,
    /// Average gradient over the segment, percent
    pub gradient_percent: f64,
    /// Elapsed time, seconds (always > 0)
    pub time_seconds: f64,
    /// Actual pace, min/km
    pub actual_pace_min_km: f64,
    /// Grade-adjusted pace, min/km
    pub grade_adjusted_pace_min_km: f64,
    /// Gradient classification of the segment
    pub gradient_bucket: GradientBucket,
}

/// Complete per-activity analysis, produced once and immutable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityAnalysisResult {
    /// Caller-supplied activity identifier
    pub activity_id: String,
    /// Total distance, kilometers
    pub total_distance_km: f64,
    /// Point-wise elevation gain over the smoothed channel, meters
    pub elevation_gain_m: f64,
    /// Point-wise elevation loss over the smoothed channel, meters
    pub elevation_loss_m: f64,
    /// Elapsed time between first and last timestamp, seconds (0 when untimed)
    pub total_time_seconds: f64,
    /// Overall pace, min/km (0 when untimed)
    pub average_pace_min_km: f64,
    /// Mean grade-adjusted pace across segments, min/km
    pub grade_adjusted_pace_min_km: f64,
    /// Mean actual pace per gradient bucket; absent buckets carry no entry
    pub pace_by_gradient: BTreeMap<GradientBucket, f64>,
    /// Grade-adjusted pace against start distance, per segment
    pub fatigue_curve: Vec<FatiguePoint>,
    /// Pace degradation, percent per 10 km (0 with under 3 segments)
    pub fatigue_factor: f64,
    /// Distance-weighted pace over contiguous 5 km ranges
    pub pace_buckets_5km: Vec<PaceBucket>,
    /// Pace-decay multiplier per 10%-of-distance progress bucket
    pub pace_decay_by_progress_pct: BTreeMap<String, f64>,
    /// Number of segments that survived validation
    pub segment_count: usize,
    /// Schema version of this result
    pub analysis_version: String,
}

/// Fixed-segment analyzer.
///
/// Stateless apart from configuration; safe to reuse across activities.
#[derive(Debug, Clone, Default)]
pub struct PerformanceAnalyzer {
    config: SegmentationConfig,
}

impl PerformanceAnalyzer {
    /// Analyzer with default segmentation settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Analyzer with custom segmentation settings.
    #[must_use]
    pub const fn with_config(config: SegmentationConfig) -> Self {
        Self { config }
    }

    /// Split the series into fixed-length segments.
    ///
    /// A segment closes once it spans at least the configured length, or at
    /// the series end. Segments without positive distance and positive
    /// elapsed time are discarded.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InsufficientData`] when the series has
    /// fewer than the configured minimum number of points.
    pub fn segment(&self, series: &TrackSeries) -> Result<Vec<FixedSegment>> {
        if series.len() < self.config.min_points {
            return Err(AnalysisError::insufficient_data(
                series.len(),
                self.config.min_points,
            ));
        }

        let points = series.points();
        let segment_length_m = self.config.segment_length_km * 1000.0;
        let mut segments = Vec::new();
        let mut discarded = 0usize;
        let mut start = 0usize;

        for i in 1..points.len() {
            let distance_in_segment = points[i].distance_m - points[start].distance_m;
            if distance_in_segment < segment_length_m && i != points.len() - 1 {
                continue;
            }

            let start_point = &points[start];
            let end_point = &points[i];
            let distance_km = (end_point.distance_m - start_point.distance_m) / 1000.0;
            let elevation_change = end_point.elevation - start_point.elevation;

            let time_seconds = match (start_point.timestamp, end_point.timestamp) {
                (Some(t0), Some(t1)) => (t1 - t0).num_milliseconds() as f64 / 1000.0,
                _ => 0.0,
            };

            // Both distance and time must be positive to keep the segment
            if time_seconds <= 0.0 || distance_km <= 0.0 {
                discarded += 1;
                start = i;
                continue;
            }

            let gradient = elevation_change / (distance_km * 1000.0);
            let gradient_percent = gradient * 100.0;
            let actual_pace = (time_seconds / 60.0) / distance_km;
            let gap = minetti::grade_adjusted_pace(actual_pace, gradient);

            segments.push(FixedSegment {
                start_distance_km: start_point.distance_m / 1000.0,
                end_distance_km: end_point.distance_m / 1000.0,
                distance_km,
                elevation_change_m: elevation_change,
                gradient_percent,
                time_seconds,
                actual_pace_min_km: actual_pace,
                grade_adjusted_pace_min_km: gap,
                gradient_bucket: GradientBucket::from_percent(gradient_percent),
            });
            start = i;
        }

        if discarded > 0 {
            debug!(discarded, kept = segments.len(), "dropped segments without valid timing");
        }
        Ok(segments)
    }

    /// Run the full fixed-segment analysis for one activity.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InsufficientData`] when the series is too
    /// short for segment analysis.
    pub fn analyze(&self, series: &TrackSeries, activity_id: &str) -> Result<ActivityAnalysisResult> {
        let segments = self.segment(series)?;

        let total_distance_km = series.total_distance_km();
        let elevation = series.elevation_stats();

        let points = series.points();
        let total_time_seconds = match (
            points.first().and_then(|p| p.timestamp),
            points.last().and_then(|p| p.timestamp),
        ) {
            (Some(t0), Some(t1)) => (t1 - t0).num_milliseconds() as f64 / 1000.0,
            _ => 0.0,
        };

        let average_pace_min_km = if total_time_seconds > 0.0 && total_distance_km > 0.0 {
            (total_time_seconds / 60.0) / total_distance_km
        } else {
            0.0
        };

        let grade_adjusted_pace_min_km = if segments.is_empty() {
            average_pace_min_km
        } else {
            segments
                .iter()
                .map(|s| s.grade_adjusted_pace_min_km)
                .sum::<f64>()
                / segments.len() as f64
        };

        let (fatigue_curve, fatigue_factor) = fatigue::fatigue_curve(&segments);

        Ok(ActivityAnalysisResult {
            activity_id: activity_id.to_owned(),
            total_distance_km,
            elevation_gain_m: elevation.gain_m,
            elevation_loss_m: elevation.loss_m,
            total_time_seconds,
            average_pace_min_km,
            grade_adjusted_pace_min_km,
            pace_by_gradient: pace_by_gradient(&segments),
            fatigue_curve,
            fatigue_factor,
            pace_buckets_5km: fatigue::pace_buckets_5km(&segments, total_distance_km),
            pace_decay_by_progress_pct: fatigue::pace_decay_by_progress(
                &segments,
                total_distance_km,
            ),
            segment_count: segments.len(),
            analysis_version: ANALYSIS_VERSION.to_owned(),
        })
    }
}

/// Mean actual pace per gradient bucket. Buckets with no contributing
/// segment are absent from the map.
#[must_use]
pub fn pace_by_gradient(segments: &[FixedSegment]) -> BTreeMap<GradientBucket, f64> {
    let mut sums: BTreeMap<GradientBucket, (f64, usize)> = BTreeMap::new();
    for segment in segments {
        let entry = sums.entry(segment.gradient_bucket).or_insert((0.0, 0));
        entry.0 += segment.actual_pace_min_km;
        entry.1 += 1;
    }
    sums.into_iter()
        .map(|(bucket, (sum, count))| (bucket, sum / count as f64))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cairn_core::models::RawPoint;
    use chrono::{Duration, TimeZone, Utc};

    /// ~111m per 0.001 degree of latitude; builds an evenly timed track.
    fn timed_track(
        count: usize,
        seconds_between: i64,
        elevation: impl Fn(usize) -> f64,
    ) -> TrackSeries {
        let start = Utc.with_ymd_and_hms(2026, 1, 15, 8, 0, 0).unwrap();
        let raw: Vec<RawPoint> = (0..count)
            .map(|i| {
                RawPoint::with_timestamp(
                    51.5 + 0.001 * i as f64,
                    -0.1,
                    Some(elevation(i)),
                    start + Duration::seconds(seconds_between * i as i64),
                )
            })
            .collect();
        TrackSeries::from_raw_points(&raw).unwrap()
    }

    #[test]
    fn test_too_few_points_is_an_error() {
        let series = timed_track(5, 60, |_| 100.0);
        let analyzer = PerformanceAnalyzer::new();
        let err = analyzer.segment(&series).unwrap_err();
        assert_eq!(
            err,
            AnalysisError::InsufficientData {
                found: 5,
                required: 10
            }
        );
    }

    #[test]
    fn test_segments_close_at_one_km() {
        // 50 points, ~111m apart: ~5.4km total, segments close every >=1km
        let series = timed_track(50, 60, |_| 100.0);
        let segments = PerformanceAnalyzer::new().segment(&series).unwrap();
        assert!(!segments.is_empty());
        for segment in &segments[..segments.len() - 1] {
            assert!(segment.distance_km >= 1.0);
        }
        // Contiguous: each segment starts where the previous one ended
        for pair in segments.windows(2) {
            assert!((pair[0].end_distance_km - pair[1].start_distance_km).abs() < 1e-9);
        }
    }

    #[test]
    fn test_untimed_track_yields_no_segments() {
        let raw: Vec<RawPoint> = (0..20)
            .map(|i| RawPoint::new(51.5 + 0.001 * i as f64, -0.1, Some(100.0)))
            .collect();
        let series = TrackSeries::from_raw_points(&raw).unwrap();
        let segments = PerformanceAnalyzer::new().segment(&series).unwrap();
        assert!(segments.is_empty());
    }

    #[test]
    fn test_flat_track_pace_and_bucket() {
        // ~111m per point, 60s apart: pace ~9:00/km on the flat
        let series = timed_track(50, 60, |_| 100.0);
        let segments = PerformanceAnalyzer::new().segment(&series).unwrap();
        for segment in &segments {
            assert_eq!(segment.gradient_bucket, GradientBucket::Flat);
            assert!((segment.actual_pace_min_km - 9.0).abs() < 0.1);
            // Flat: GAP equals actual pace
            assert!(
                (segment.grade_adjusted_pace_min_km - segment.actual_pace_min_km).abs() < 0.05
            );
        }
    }

    #[test]
    fn test_uphill_gap_faster_than_actual() {
        // ~9m climb per 111m: ~8% grade
        let series = timed_track(50, 90, |i| 100.0 + 9.0 * i as f64);
        let segments = PerformanceAnalyzer::new().segment(&series).unwrap();
        assert!(!segments.is_empty());
        for segment in &segments {
            assert!(segment.gradient_percent > 2.5);
            assert!(segment.grade_adjusted_pace_min_km < segment.actual_pace_min_km);
        }
    }

    #[test]
    fn test_pace_by_gradient_skips_absent_buckets() {
        let series = timed_track(50, 60, |_| 100.0);
        let segments = PerformanceAnalyzer::new().segment(&series).unwrap();
        let by_gradient = pace_by_gradient(&segments);
        assert!(by_gradient.contains_key(&GradientBucket::Flat));
        assert!(!by_gradient.contains_key(&GradientBucket::SteepUphill));
    }

    #[test]
    fn test_analyze_produces_complete_result() {
        let series = timed_track(80, 60, |i| 100.0 + (i as f64) * 2.0);
        let result = PerformanceAnalyzer::new()
            .analyze(&series, "act-42")
            .unwrap();
        assert_eq!(result.activity_id, "act-42");
        assert_eq!(result.analysis_version, ANALYSIS_VERSION);
        assert!(result.total_distance_km > 8.0);
        assert!(result.total_time_seconds > 0.0);
        assert!(result.segment_count > 3);
        assert!(result.elevation_gain_m > 0.0);
        assert!(result.grade_adjusted_pace_min_km > 0.0);
        assert!(!result.pace_by_gradient.is_empty());
    }

    #[test]
    fn test_result_round_trips_through_json() {
        let series = timed_track(40, 60, |_| 100.0);
        let result = PerformanceAnalyzer::new().analyze(&series, "a").unwrap();
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"flat\""));
        let back: ActivityAnalysisResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
    }
}
