// ABOUTME: Fatigue curve, 5km pace buckets and progress-based pace decay
// ABOUTME: Derived views over the fixed-segment output of one activity
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cairn Trail Analytics

//! Fatigue and pace-profile extraction.
//!
//! Works on grade-adjusted pace throughout, so terrain effects are already
//! removed and what remains is the runner slowing down: the fatigue factor
//! is an ordinary-least-squares slope over segment GAP, the 5 km buckets
//! summarize pacing per course section, and the progress-percentage decay
//! profile normalizes pacing to the fresh first 20% of the run so it
//! transfers across race distances.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::performance_analyzer::FixedSegment;

/// Segments needed before a fatigue slope is meaningful.
const MIN_SEGMENTS_FOR_FATIGUE: usize = 3;

/// Segments needed for the progress-decay profile.
const MIN_SEGMENTS_FOR_DECAY: usize = 5;

/// Minimum activity distance for the progress-decay profile, kilometers.
const MIN_DISTANCE_FOR_DECAY_KM: f64 = 5.0;

/// Width of a pace bucket, kilometers.
const PACE_BUCKET_KM: f64 = 5.0;

/// Share of the activity treated as the fresh baseline, percent.
const BASELINE_PROGRESS_PCT: f64 = 20.0;

/// One sample of the fatigue curve: grade-adjusted pace at a distance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FatiguePoint {
    /// Segment start distance, kilometers
    pub distance_km: f64,
    /// Grade-adjusted pace of that segment, min/km
    pub gap_min_km: f64,
}

/// Aggregated pacing over one contiguous 5 km range of the activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaceBucket {
    /// Range start, kilometers
    pub start_km: f64,
    /// Range end, kilometers
    pub end_km: f64,
    /// Total segment distance attributed to this range, kilometers
    pub distance_km: f64,
    /// Distance-weighted mean actual pace, min/km
    pub actual_pace_min_km: f64,
    /// Distance-weighted mean grade-adjusted pace, min/km
    pub grade_adjusted_pace_min_km: f64,
    /// Summed elevation gain of contributing segments, meters
    pub elevation_gain_m: f64,
    /// Summed elevation loss of contributing segments, meters
    pub elevation_loss_m: f64,
    /// Number of contributing segments
    pub segment_count: usize,
}

/// Fatigue curve and scalar fatigue factor.
///
/// The curve lists each segment's grade-adjusted pace at its start
/// distance. The factor is the OLS slope of GAP against distance,
/// expressed as percent pace change per 10 km. With fewer than 3 segments
/// the curve is empty and the factor 0.0; a near-zero distance variance
/// (all segments starting in the same place) also yields 0.0.
#[must_use]
pub fn fatigue_curve(segments: &[FixedSegment]) -> (Vec<FatiguePoint>, f64) {
    if segments.len() < MIN_SEGMENTS_FOR_FATIGUE {
        return (Vec::new(), 0.0);
    }

    let curve: Vec<FatiguePoint> = segments
        .iter()
        .map(|s| FatiguePoint {
            distance_km: s.start_distance_km,
            gap_min_km: s.grade_adjusted_pace_min_km,
        })
        .collect();

    let n = curve.len() as f64;
    let sum_x: f64 = curve.iter().map(|p| p.distance_km).sum();
    let sum_y: f64 = curve.iter().map(|p| p.gap_min_km).sum();
    let sum_xy: f64 = curve.iter().map(|p| p.distance_km * p.gap_min_km).sum();
    let sum_x2: f64 = curve.iter().map(|p| p.distance_km * p.distance_km).sum();

    let denominator = n * sum_x2 - sum_x * sum_x;
    if denominator.abs() < f64::EPSILON {
        debug!("distance variance too small for a fatigue slope");
        return (curve, 0.0);
    }

    let slope = (n * sum_xy - sum_x * sum_y) / denominator;
    let avg_pace = sum_y / n;
    let factor = if avg_pace > 0.0 {
        (slope * 10.0 / avg_pace) * 100.0
    } else {
        0.0
    };

    (curve, factor)
}

/// Partition the activity into contiguous 5 km pace buckets.
///
/// Each segment contributes to the bucket containing its midpoint; pace
/// means are weighted by segment distance. Ranges without a contributing
/// segment are omitted.
#[must_use]
pub fn pace_buckets_5km(segments: &[FixedSegment], total_distance_km: f64) -> Vec<PaceBucket> {
    if segments.is_empty() || total_distance_km <= 0.0 {
        return Vec::new();
    }

    let bucket_count = (total_distance_km / PACE_BUCKET_KM).ceil().max(1.0) as usize;
    let mut buckets: Vec<Option<PaceBucket>> = vec![None; bucket_count];

    for segment in segments {
        let midpoint = (segment.start_distance_km + segment.end_distance_km) / 2.0;
        let index = ((midpoint / PACE_BUCKET_KM) as usize).min(bucket_count - 1);

        let bucket = buckets[index].get_or_insert_with(|| PaceBucket {
            start_km: index as f64 * PACE_BUCKET_KM,
            end_km: ((index + 1) as f64 * PACE_BUCKET_KM).min(total_distance_km),
            distance_km: 0.0,
            actual_pace_min_km: 0.0,
            grade_adjusted_pace_min_km: 0.0,
            elevation_gain_m: 0.0,
            elevation_loss_m: 0.0,
            segment_count: 0,
        });

        // Accumulate distance-weighted pace sums; normalized below
        bucket.distance_km += segment.distance_km;
        bucket.actual_pace_min_km += segment.actual_pace_min_km * segment.distance_km;
        bucket.grade_adjusted_pace_min_km +=
            segment.grade_adjusted_pace_min_km * segment.distance_km;
        if segment.elevation_change_m > 0.0 {
            bucket.elevation_gain_m += segment.elevation_change_m;
        } else {
            bucket.elevation_loss_m += segment.elevation_change_m.abs();
        }
        bucket.segment_count += 1;
    }

    buckets
        .into_iter()
        .flatten()
        .map(|mut bucket| {
            if bucket.distance_km > 0.0 {
                bucket.actual_pace_min_km /= bucket.distance_km;
                bucket.grade_adjusted_pace_min_km /= bucket.distance_km;
            }
            bucket
        })
        .collect()
}

/// Normalized pace-decay profile over ten 10%-of-distance buckets.
///
/// Keys are `"0-10"` through `"90-100"`; values are the ratio of the
/// bucket's mean grade-adjusted pace to the 0-20% baseline (1.0 =
/// baseline). Requires at least 5 segments and 5 km of distance, and a
/// baseline segment in the first 20%; otherwise the map is empty. Buckets
/// without a contributing segment are omitted.
#[must_use]
pub fn pace_decay_by_progress(
    segments: &[FixedSegment],
    total_distance_km: f64,
) -> BTreeMap<String, f64> {
    if segments.len() < MIN_SEGMENTS_FOR_DECAY || total_distance_km < MIN_DISTANCE_FOR_DECAY_KM {
        return BTreeMap::new();
    }

    let mut sums = [(0.0f64, 0usize); 10];

    for segment in segments {
        let midpoint = (segment.start_distance_km + segment.end_distance_km) / 2.0;
        let progress_pct = midpoint / total_distance_km * 100.0;
        let index = ((progress_pct / 10.0) as usize).min(9);
        sums[index].0 += segment.grade_adjusted_pace_min_km;
        sums[index].1 += 1;
    }

    // Baseline is the mean of the first two bucket means, whichever exist
    let baseline_buckets = (BASELINE_PROGRESS_PCT / 10.0) as usize;
    let early_means: Vec<f64> = sums[..baseline_buckets]
        .iter()
        .filter(|(_, count)| *count > 0)
        .map(|(sum, count)| sum / *count as f64)
        .collect();
    if early_means.is_empty() {
        debug!("no segments in the first 20%, cannot normalize pace decay");
        return BTreeMap::new();
    }
    let baseline = early_means.iter().sum::<f64>() / early_means.len() as f64;
    if baseline <= 0.0 {
        return BTreeMap::new();
    }

    sums.iter()
        .enumerate()
        .filter(|(_, (_, count))| *count > 0)
        .map(|(i, (sum, count))| {
            let mean = sum / *count as f64;
            (format!("{}-{}", i * 10, (i + 1) * 10), mean / baseline)
        })
        .collect()
}
