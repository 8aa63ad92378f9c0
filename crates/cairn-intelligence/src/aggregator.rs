// ABOUTME: Multi-activity aggregation into a single performance profile
// ABOUTME: Recency-weighted means over pace, fatigue and pace-decay data
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cairn Trail Analytics

//! Performance-profile aggregation.
//!
//! Folds a runner's recent activity analyses into one profile the race
//! predictor can consume. Recency weights favor newer activities; they are
//! normalized to sum to 1 before use. A bucket absent from an activity
//! simply contributes nothing to that bucket's mean. Pace-decay profiles
//! are additionally weighted by activity distance, since a long run says
//! more about late-race pacing than a short one.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use cairn_core::{AnalysisError, Result};

use crate::gradient::GradientBucket;
use crate::performance_analyzer::ActivityAnalysisResult;

/// Aggregated performance profile across activities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceProfile {
    /// Weighted mean pace per gradient bucket; absent buckets omitted
    pub pace_by_gradient: BTreeMap<GradientBucket, f64>,
    /// Weighted mean overall grade-adjusted pace, min/km
    pub overall_gap_min_km: f64,
    /// Weighted mean scalar fatigue factor, % per 10 km
    pub fatigue_factor: f64,
    /// Weighted mean pace-decay multipliers by progress bucket
    pub pace_decay_by_progress_pct: BTreeMap<String, f64>,
    /// How many activities reported each gradient bucket
    pub gradient_sample_sizes: BTreeMap<GradientBucket, usize>,
    /// Number of activities folded in
    pub activities_analyzed: usize,
    /// Unweighted sum of activity distances, kilometers
    pub total_distance_km: f64,
}

/// Weighted mean, `None` when nothing contributed.
fn weighted_mean(values: &[(f64, f64)]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let total_weight: f64 = values.iter().map(|(_, w)| w).sum();
    if total_weight <= 0.0 {
        return None;
    }
    Some(values.iter().map(|(v, w)| v * w).sum::<f64>() / total_weight)
}

/// Aggregate activity analyses into a [`PerformanceProfile`].
///
/// `recency_weights`, when supplied, must parallel `analyses`; missing or
/// mismatched weights fall back to uniform. Weights are normalized to sum
/// to 1.
///
/// # Errors
///
/// Returns [`AnalysisError::EmptyAggregation`] for an empty activity
/// list.
pub fn aggregate_performance_profiles(
    analyses: &[ActivityAnalysisResult],
    recency_weights: Option<&[f64]>,
) -> Result<PerformanceProfile> {
    if analyses.is_empty() {
        return Err(AnalysisError::EmptyAggregation);
    }

    let weights = normalize_weights(analyses.len(), recency_weights);

    let mut gradient_paces: BTreeMap<GradientBucket, Vec<(f64, f64)>> = BTreeMap::new();
    let mut gaps = Vec::with_capacity(analyses.len());
    let mut fatigues = Vec::with_capacity(analyses.len());
    let mut decay_samples: BTreeMap<String, Vec<(f64, f64)>> = BTreeMap::new();
    let mut total_distance = 0.0;

    for (analysis, &weight) in analyses.iter().zip(&weights) {
        for (&bucket, &pace) in &analysis.pace_by_gradient {
            gradient_paces.entry(bucket).or_default().push((pace, weight));
        }
        gaps.push((analysis.grade_adjusted_pace_min_km, weight));
        fatigues.push((analysis.fatigue_factor, weight));
        total_distance += analysis.total_distance_km;

        // Longer activities carry more late-race pacing signal
        let decay_weight = weight * analysis.total_distance_km;
        for (key, &multiplier) in &analysis.pace_decay_by_progress_pct {
            decay_samples
                .entry(key.clone())
                .or_default()
                .push((multiplier, decay_weight));
        }
    }

    let mut pace_by_gradient = BTreeMap::new();
    let mut gradient_sample_sizes = BTreeMap::new();
    for (bucket, samples) in &gradient_paces {
        gradient_sample_sizes.insert(*bucket, samples.len());
        if let Some(mean) = weighted_mean(samples) {
            pace_by_gradient.insert(*bucket, mean);
        }
    }

    let pace_decay_by_progress_pct: BTreeMap<String, f64> = decay_samples
        .iter()
        .filter_map(|(key, samples)| weighted_mean(samples).map(|m| (key.clone(), m)))
        .collect();

    debug!(
        activities = analyses.len(),
        buckets = pace_by_gradient.len(),
        "aggregated performance profile"
    );

    Ok(PerformanceProfile {
        pace_by_gradient,
        overall_gap_min_km: weighted_mean(&gaps).unwrap_or(0.0),
        fatigue_factor: weighted_mean(&fatigues).unwrap_or(0.0),
        pace_decay_by_progress_pct,
        gradient_sample_sizes,
        activities_analyzed: analyses.len(),
        total_distance_km: total_distance,
    })
}

/// Normalized weights summing to 1; uniform when absent or mismatched.
fn normalize_weights(count: usize, recency_weights: Option<&[f64]>) -> Vec<f64> {
    let raw: Vec<f64> = match recency_weights {
        Some(weights) if weights.len() == count => weights.to_vec(),
        Some(weights) => {
            debug!(
                supplied = weights.len(),
                expected = count,
                "weight count mismatch, using uniform weights"
            );
            vec![1.0; count]
        }
        None => vec![1.0; count],
    };
    let total: f64 = raw.iter().sum();
    if total <= 0.0 {
        return vec![1.0 / count as f64; count];
    }
    raw.into_iter().map(|w| w / total).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analysis(gap: f64, flat_pace: Option<f64>, distance_km: f64) -> ActivityAnalysisResult {
        let mut pace_by_gradient = BTreeMap::new();
        if let Some(pace) = flat_pace {
            pace_by_gradient.insert(GradientBucket::Flat, pace);
        }
        ActivityAnalysisResult {
            activity_id: "a".to_owned(),
            total_distance_km: distance_km,
            elevation_gain_m: 0.0,
            elevation_loss_m: 0.0,
            total_time_seconds: gap * 60.0 * distance_km,
            average_pace_min_km: gap,
            grade_adjusted_pace_min_km: gap,
            pace_by_gradient,
            fatigue_curve: Vec::new(),
            fatigue_factor: 5.0,
            pace_buckets_5km: Vec::new(),
            pace_decay_by_progress_pct: BTreeMap::new(),
            segment_count: 10,
            analysis_version: crate::performance_analyzer::ANALYSIS_VERSION.to_owned(),
        }
    }

    #[test]
    fn test_empty_input_is_an_error() {
        let err = aggregate_performance_profiles(&[], None).unwrap_err();
        assert_eq!(err, AnalysisError::EmptyAggregation);
    }

    #[test]
    fn test_single_activity_reproduces_itself() {
        let input = analysis(6.2, Some(6.0), 20.0);
        let profile = aggregate_performance_profiles(std::slice::from_ref(&input), None).unwrap();
        assert!((profile.overall_gap_min_km - 6.2).abs() < 1e-12);
        assert!((profile.pace_by_gradient[&GradientBucket::Flat] - 6.0).abs() < 1e-12);
        assert_eq!(profile.activities_analyzed, 1);
        assert_eq!(profile.total_distance_km, 20.0);
    }

    #[test]
    fn test_three_to_one_weighting() {
        let newer = analysis(6.0, Some(6.0), 10.0);
        let older = analysis(8.0, Some(8.0), 10.0);
        let profile =
            aggregate_performance_profiles(&[newer, older], Some(&[3.0, 1.0])).unwrap();
        // (3*6 + 1*8) / 4 = 6.5
        assert!((profile.overall_gap_min_km - 6.5).abs() < 1e-12);
        assert!((profile.pace_by_gradient[&GradientBucket::Flat] - 6.5).abs() < 1e-12);
    }

    #[test]
    fn test_absent_buckets_are_skipped() {
        let with_flat = analysis(6.0, Some(6.0), 10.0);
        let without_flat = analysis(7.0, None, 10.0);
        let profile = aggregate_performance_profiles(&[with_flat, without_flat], None).unwrap();
        // Only one activity reported the flat bucket, so its value stands
        assert!((profile.pace_by_gradient[&GradientBucket::Flat] - 6.0).abs() < 1e-12);
        assert_eq!(profile.gradient_sample_sizes[&GradientBucket::Flat], 1);
    }

    #[test]
    fn test_decay_weighted_by_distance() {
        let mut long = analysis(6.0, None, 30.0);
        long.pace_decay_by_progress_pct
            .insert("90-100".to_owned(), 1.2);
        let mut short = analysis(6.0, None, 10.0);
        short
            .pace_decay_by_progress_pct
            .insert("90-100".to_owned(), 1.0);
        let profile = aggregate_performance_profiles(&[long, short], None).unwrap();
        // (0.5*30*1.2 + 0.5*10*1.0) / (0.5*30 + 0.5*10) = 1.15
        assert!((profile.pace_decay_by_progress_pct["90-100"] - 1.15).abs() < 1e-12);
    }

    #[test]
    fn test_mismatched_weights_fall_back_to_uniform() {
        let a = analysis(6.0, None, 10.0);
        let b = analysis(8.0, None, 10.0);
        let profile = aggregate_performance_profiles(&[a, b], Some(&[1.0])).unwrap();
        assert!((profile.overall_gap_min_km - 7.0).abs() < 1e-12);
    }
}
