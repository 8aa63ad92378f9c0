// ABOUTME: Terrain-adaptive segmentation into climb, descent and flat sections
// ABOUTME: Sliding-window detection with merge and split passes over a track series
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cairn Trail Analytics

//! Terrain-adaptive segment analysis.
//!
//! Where the fixed analyzer cuts the track into uniform 1 km slices, this
//! analyzer follows the shape of the course: a sustained climb becomes one
//! segment however long it is, while flat and descent stretches are capped
//! at 5 km blocks. Segmentation runs in three passes over the raw
//! detections: merge fragments under 0.3 km into their neighbor, then
//! split over-long flat/descent segments, then compute metrics.

use serde::{Deserialize, Serialize};
use tracing::debug;

use cairn_core::{AnalysisError, Result};

use crate::algorithms::minetti;
use crate::config::SegmentationConfig;
use crate::gradient::{GradeBucket, TerrainType};
use crate::series::TrackSeries;

/// One terrain-typed section of the activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainSegment {
    /// Position in the final segment list
    pub segment_index: usize,
    /// Coarse classification of this section
    pub terrain_type: TerrainType,
    /// Finer grade classification within the type
    pub grade_bucket: GradeBucket,
    /// Section start, kilometers from activity start
    pub start_distance_km: f64,
    /// Section end, kilometers from activity start
    pub end_distance_km: f64,
    /// Section length, kilometers
    pub distance_km: f64,
    /// Smoothed elevation at the section start, meters
    pub elevation_start_m: f64,
    /// Smoothed elevation at the section end, meters
    pub elevation_end_m: f64,
    /// Net smoothed elevation change, meters
    pub elevation_change_m: f64,
    /// Average grade over the section, percent
    pub average_grade_percent: f64,
    /// Elapsed time, seconds; 0.0 when timestamps are missing
    pub time_seconds: f64,
    /// Actual pace, min/km; 0.0 when no time is available
    pub pace_min_km: f64,
    /// Grade-adjusted pace, min/km
    pub grade_adjusted_pace_min_km: f64,
}

/// Totals for one terrain type across the whole activity.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TerrainTypeSummary {
    /// Summed section distance, kilometers
    pub total_distance_km: f64,
    /// Summed section time, seconds
    pub total_time_seconds: f64,
    /// Climb: summed gain; descent: summed |loss|; absent for flat
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_elevation_m: Option<f64>,
    /// Time-weighted average pace, min/km; 0.0 without distance
    pub average_pace_min_km: f64,
    /// Number of sections of this type
    pub segment_count: usize,
}

/// Per-type rollup of the terrain segmentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainSummary {
    /// Climb sections
    pub climb: TerrainTypeSummary,
    /// Descent sections
    pub descent: TerrainTypeSummary,
    /// Flat sections
    pub flat: TerrainTypeSummary,
    /// Total number of sections
    pub total_segments: usize,
}

/// Complete terrain segmentation of one activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainSegmentAnalysisResult {
    /// Caller-supplied activity identifier
    pub activity_id: String,
    /// Total track distance, kilometers
    pub total_distance_km: f64,
    /// Summed per-segment elevation gain, meters
    pub total_elevation_gain_m: f64,
    /// Summed per-segment elevation loss, meters, as a positive value
    pub total_elevation_loss_m: f64,
    /// Summed per-segment time, seconds
    pub total_time_seconds: f64,
    /// Final terrain segments in course order
    pub segments: Vec<TerrainSegment>,
    /// Per-terrain-type rollup
    pub summary: TerrainSummary,
}

/// Raw segment range between detection and metric computation.
#[derive(Debug, Clone, Copy)]
struct RawRange {
    start_idx: usize,
    end_idx: usize,
    terrain_type: TerrainType,
}

/// Metrics computed over a point-index range.
#[derive(Debug, Clone, Copy)]
struct RangeMetrics {
    start_distance_m: f64,
    end_distance_m: f64,
    distance_km: f64,
    elevation_start_m: f64,
    elevation_end_m: f64,
    elevation_change_m: f64,
    grade_percent: f64,
    time_seconds: f64,
    pace_min_km: f64,
    gap_min_km: f64,
}

/// Terrain-adaptive segment analyzer.
#[derive(Debug, Clone, Default)]
pub struct TerrainSegmentAnalyzer {
    config: SegmentationConfig,
}

impl TerrainSegmentAnalyzer {
    /// Analyzer with default segmentation thresholds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Analyzer with caller-supplied thresholds.
    #[must_use]
    pub const fn with_config(config: SegmentationConfig) -> Self {
        Self { config }
    }

    /// Segment the activity by terrain and summarize per terrain type.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InsufficientData`] when the series has
    /// fewer than the configured minimum number of points.
    pub fn analyze(
        &self,
        series: &TrackSeries,
        activity_id: &str,
    ) -> Result<TerrainSegmentAnalysisResult> {
        if series.len() < self.config.min_points {
            return Err(AnalysisError::insufficient_data(
                series.len(),
                self.config.min_points,
            ));
        }

        let raw = self.detect_terrain_changes(series);
        let merged = self.merge_short_ranges(series, raw);
        let split = self.split_long_flat_descent(series, merged);
        debug!(
            activity_id,
            segments = split.len(),
            "terrain segmentation complete"
        );

        let mut segments = Vec::with_capacity(split.len());
        let mut total_gain = 0.0;
        let mut total_loss = 0.0;
        let mut total_time = 0.0;
        let mut climb = TerrainTypeSummary {
            total_elevation_m: Some(0.0),
            ..TerrainTypeSummary::default()
        };
        let mut descent = TerrainTypeSummary {
            total_elevation_m: Some(0.0),
            ..TerrainTypeSummary::default()
        };
        let mut flat = TerrainTypeSummary::default();

        for range in split {
            let Some(metrics) = range_metrics(series, range.start_idx, range.end_idx) else {
                continue;
            };

            if metrics.elevation_change_m > 0.0 {
                total_gain += metrics.elevation_change_m;
            } else {
                total_loss += metrics.elevation_change_m.abs();
            }
            total_time += metrics.time_seconds;

            let stats = match range.terrain_type {
                TerrainType::Climb => {
                    if let Some(elevation) = climb.total_elevation_m.as_mut() {
                        *elevation += metrics.elevation_change_m;
                    }
                    &mut climb
                }
                TerrainType::Descent => {
                    if let Some(elevation) = descent.total_elevation_m.as_mut() {
                        *elevation += metrics.elevation_change_m.abs();
                    }
                    &mut descent
                }
                TerrainType::Flat => &mut flat,
            };
            stats.total_distance_km += metrics.distance_km;
            stats.total_time_seconds += metrics.time_seconds;
            stats.segment_count += 1;

            segments.push(TerrainSegment {
                segment_index: segments.len(),
                terrain_type: range.terrain_type,
                grade_bucket: GradeBucket::from_grade_percent(metrics.grade_percent),
                start_distance_km: metrics.start_distance_m / 1000.0,
                end_distance_km: metrics.end_distance_m / 1000.0,
                distance_km: metrics.distance_km,
                elevation_start_m: metrics.elevation_start_m,
                elevation_end_m: metrics.elevation_end_m,
                elevation_change_m: metrics.elevation_change_m,
                average_grade_percent: metrics.grade_percent,
                time_seconds: metrics.time_seconds,
                pace_min_km: metrics.pace_min_km,
                grade_adjusted_pace_min_km: metrics.gap_min_km,
            });
        }

        for stats in [&mut climb, &mut descent, &mut flat] {
            if stats.total_distance_km > 0.0 {
                stats.average_pace_min_km =
                    (stats.total_time_seconds / 60.0) / stats.total_distance_km;
            }
        }

        let total_segments = segments.len();
        Ok(TerrainSegmentAnalysisResult {
            activity_id: activity_id.to_owned(),
            total_distance_km: series.total_distance_km(),
            total_elevation_gain_m: total_gain,
            total_elevation_loss_m: total_loss,
            total_time_seconds: total_time,
            segments,
            summary: TerrainSummary {
                climb,
                descent,
                flat,
                total_segments,
            },
        })
    }

    /// Slide a fixed window across the course and cut a raw segment at
    /// every terrain-type transition.
    fn detect_terrain_changes(&self, series: &TrackSeries) -> Vec<RawRange> {
        let total_distance = series.total_distance_m();
        let window = self.config.terrain_window_m;

        let mut raw = Vec::new();
        let mut current_terrain: Option<TerrainType> = None;
        let mut current_start_idx = 0;
        let mut cursor = 0.0;

        while cursor < total_distance {
            let window_end = (cursor + window).min(total_distance);
            let (Some(start_idx), Some(end_idx)) = (
                series.index_at_distance(cursor),
                series.index_at_distance(window_end),
            ) else {
                break;
            };
            if start_idx >= end_idx {
                cursor += window;
                continue;
            }
            let Some(metrics) = range_metrics(series, start_idx, end_idx) else {
                cursor += window;
                continue;
            };

            let terrain = TerrainType::from_grade_percent(metrics.grade_percent);
            match current_terrain {
                None => {
                    current_terrain = Some(terrain);
                    current_start_idx = start_idx;
                }
                Some(active) if active != terrain => {
                    raw.push(RawRange {
                        start_idx: current_start_idx,
                        end_idx: start_idx,
                        terrain_type: active,
                    });
                    current_terrain = Some(terrain);
                    current_start_idx = start_idx;
                }
                Some(_) => {}
            }
            cursor += window;
        }

        if let Some(terrain) = current_terrain {
            if current_start_idx < series.len() - 1 {
                raw.push(RawRange {
                    start_idx: current_start_idx,
                    end_idx: series.len() - 1,
                    terrain_type: terrain,
                });
            }
        }

        raw
    }

    /// Single left-to-right pass absorbing sub-minimum ranges.
    ///
    /// A short range is folded into the following one, which keeps its own
    /// terrain type; a short final range is folded into the previous one.
    fn merge_short_ranges(&self, series: &TrackSeries, raw: Vec<RawRange>) -> Vec<RawRange> {
        let min_m = self.config.min_terrain_segment_km * 1000.0;
        let points = series.points();

        let mut working = raw;
        let mut merged: Vec<RawRange> = Vec::with_capacity(working.len());
        let mut i = 0;
        while i < working.len() {
            let current = working[i];
            let length_m = points[current.end_idx].distance_m - points[current.start_idx].distance_m;

            if length_m < min_m && i + 1 < working.len() {
                working[i + 1].start_idx = current.start_idx;
            } else if length_m < min_m {
                if let Some(previous) = merged.last_mut() {
                    previous.end_idx = current.end_idx;
                } else {
                    merged.push(current);
                }
            } else {
                merged.push(current);
            }
            i += 1;
        }
        merged
    }

    /// Cut flat and descent ranges longer than the maximum into contiguous
    /// blocks. Climbs stay whole regardless of length.
    fn split_long_flat_descent(&self, series: &TrackSeries, ranges: Vec<RawRange>) -> Vec<RawRange> {
        let max_m = self.config.max_terrain_segment_km * 1000.0;
        let points = series.points();
        let mut split = Vec::with_capacity(ranges.len());

        for range in ranges {
            let start_m = points[range.start_idx].distance_m;
            let end_m = points[range.end_idx].distance_m;

            if range.terrain_type == TerrainType::Climb || end_m - start_m <= max_m {
                split.push(range);
                continue;
            }

            let mut block_start_idx = range.start_idx;
            let mut block_start_m = start_m;
            while block_start_m < end_m {
                let block_end_m = (block_start_m + max_m).min(end_m);
                let Some(block_end_idx) = series.index_at_distance(block_end_m) else {
                    break;
                };
                split.push(RawRange {
                    start_idx: block_start_idx,
                    end_idx: block_end_idx,
                    terrain_type: range.terrain_type,
                });
                block_start_idx = block_end_idx;
                block_start_m = block_end_m;
            }
        }
        split
    }
}

/// Metrics over a point-index range, `None` when the range is degenerate.
fn range_metrics(series: &TrackSeries, start_idx: usize, end_idx: usize) -> Option<RangeMetrics> {
    let points = series.points();
    if start_idx >= end_idx || end_idx >= points.len() {
        return None;
    }
    let start = &points[start_idx];
    let end = &points[end_idx];

    let distance_m = end.distance_m - start.distance_m;
    if distance_m <= 0.0 {
        return None;
    }
    let distance_km = distance_m / 1000.0;
    let elevation_change = end.elevation - start.elevation;
    let grade_percent = elevation_change / distance_m * 100.0;

    let time_seconds = match (start.timestamp, end.timestamp) {
        (Some(t0), Some(t1)) => (t1 - t0).num_milliseconds() as f64 / 1000.0,
        _ => 0.0,
    };
    let pace_min_km = if time_seconds > 0.0 {
        (time_seconds / 60.0) / distance_km
    } else {
        0.0
    };
    let gap_min_km = minetti::grade_adjusted_pace(pace_min_km, grade_percent / 100.0);

    Some(RangeMetrics {
        start_distance_m: start.distance_m,
        end_distance_m: end.distance_m,
        distance_km,
        elevation_start_m: start.elevation,
        elevation_end_m: end.elevation,
        elevation_change_m: elevation_change,
        grade_percent,
        time_seconds,
        pace_min_km,
        gap_min_km,
    })
}
