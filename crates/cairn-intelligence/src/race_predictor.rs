// ABOUTME: Aid-station arrival and finish-time prediction with cutoff analysis
// ABOUTME: Terrain, progressive fatigue and nighttime factors over a course plan
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cairn Trail Analytics

//! Race plan prediction.
//!
//! Walks an ordered aid-station plan carrying cumulative elapsed time.
//! Each segment's pace is the runner's base pace scaled by three factors:
//! a terrain factor from the metabolic cost model, a progressive fatigue
//! factor (empirical pace-decay profile when one exists, a linear
//! Riegel-style ramp otherwise), and a nighttime factor when the segment
//! starts during night hours. Arrivals are checked against each station's
//! cutoff and classified by remaining buffer.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Timelike, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use cairn_core::models::AidStation;
use cairn_core::{AnalysisError, Result};

use crate::aggregator::PerformanceProfile;
use crate::algorithms::minetti;
use crate::config::PredictorConfig;
use crate::gradient::GradientBucket;

/// Riegel exponent used when no race history is available.
pub const DEFAULT_RIEGEL_EXPONENT: f64 = 1.06;

/// Riegel exponent clamp range from race-history regression.
const RIEGEL_EXPONENT_MIN: f64 = 1.02;
const RIEGEL_EXPONENT_MAX: f64 = 1.15;

/// Cutoff buffer thresholds, minutes.
const DANGER_BUFFER_MIN: f64 = 15.0;
const WARNING_BUFFER_MIN: f64 = 30.0;

/// Finish station tolerance: reuse the last arrival when the last station
/// sits within this distance of the course end, kilometers.
const FINISH_TOLERANCE_KM: f64 = 0.5;

/// How comfortably a predicted arrival clears a station cutoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CutoffStatus {
    /// 30 minutes of buffer or more, or no cutoff at all
    Safe,
    /// 15 to 30 minutes of buffer
    Warning,
    /// Under 15 minutes of buffer
    Danger,
    /// Arrival after the cutoff
    Missed,
}

impl CutoffStatus {
    /// Classify a buffer in minutes.
    #[must_use]
    pub fn from_buffer_minutes(buffer_minutes: f64) -> Self {
        if buffer_minutes < 0.0 {
            Self::Missed
        } else if buffer_minutes < DANGER_BUFFER_MIN {
            Self::Danger
        } else if buffer_minutes < WARNING_BUFFER_MIN {
            Self::Warning
        } else {
            Self::Safe
        }
    }
}

/// The runner's pacing inputs to prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunnerProfile {
    /// Flat-ground pace, min/km
    pub flat_pace_min_km: f64,
    /// Sustained climbing pace, min/km
    pub climbing_pace_min_km: f64,
    /// Sustained descending pace, min/km
    pub descending_pace_min_km: f64,
    /// Riegel-style exponent for the linear fatigue fallback
    pub fatigue_factor: f64,
    /// Measured pace per gradient bucket, when available
    pub gradient_paces: Option<BTreeMap<GradientBucket, f64>>,
    /// Empirical pace-decay multipliers by progress bucket
    pub pace_decay_by_progress_pct: Option<BTreeMap<String, f64>>,
}

/// Default climbing pace for a profile without measured climbs, min/km.
const DEFAULT_CLIMBING_PACE_MIN_KM: f64 = 12.0;

/// Default descending pace for a profile without measured descents, min/km.
const DEFAULT_DESCENDING_PACE_MIN_KM: f64 = 5.5;

impl Default for RunnerProfile {
    fn default() -> Self {
        Self::from_config(&PredictorConfig::default())
    }
}

impl RunnerProfile {
    /// Fallback profile for a runner with no measured history: flat pace
    /// and Riegel scalar come from the config, climb/descent paces from
    /// the crate defaults.
    #[must_use]
    pub fn from_config(config: &PredictorConfig) -> Self {
        Self {
            flat_pace_min_km: config.default_flat_pace_min_km,
            climbing_pace_min_km: DEFAULT_CLIMBING_PACE_MIN_KM,
            descending_pace_min_km: DEFAULT_DESCENDING_PACE_MIN_KM,
            fatigue_factor: config.default_fatigue_factor,
            gradient_paces: None,
            pace_decay_by_progress_pct: None,
        }
    }

    /// Build a runner profile from an aggregated [`PerformanceProfile`].
    ///
    /// Bucket paces fall back to the defaults when the profile never saw
    /// that terrain. The aggregated fatigue factor is a measured slope in
    /// percent per 10 km, not a Riegel exponent, so the exponent keeps its
    /// default and the empirical decay profile (when present) takes
    /// precedence inside the predictor.
    #[must_use]
    pub fn from_performance_profile(profile: &PerformanceProfile) -> Self {
        let defaults = Self::default();
        let bucket = |b: GradientBucket, fallback: f64| {
            profile.pace_by_gradient.get(&b).copied().unwrap_or(fallback)
        };
        let decay = if profile.pace_decay_by_progress_pct.is_empty() {
            None
        } else {
            Some(profile.pace_decay_by_progress_pct.clone())
        };
        let gradient_paces = if profile.pace_by_gradient.is_empty() {
            None
        } else {
            Some(profile.pace_by_gradient.clone())
        };

        Self {
            flat_pace_min_km: bucket(GradientBucket::Flat, defaults.flat_pace_min_km),
            climbing_pace_min_km: bucket(GradientBucket::Uphill, defaults.climbing_pace_min_km),
            descending_pace_min_km: bucket(
                GradientBucket::Downhill,
                defaults.descending_pace_min_km,
            ),
            fatigue_factor: defaults.fatigue_factor,
            gradient_paces,
            pace_decay_by_progress_pct: decay,
        }
    }
}

/// Prediction for one aid station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Station identifier, carried through from the plan
    pub aid_station_id: String,
    /// Station name
    pub aid_station_name: String,
    /// Station position, kilometers from the start
    pub distance_km: f64,
    /// Elapsed race time at arrival, minutes
    pub predicted_arrival_minutes: f64,
    /// Wall-clock arrival
    pub predicted_arrival_time: DateTime<Utc>,
    /// Cutoff deadline, hours from the start, when the plan has one
    pub cutoff_hours_from_start: Option<f64>,
    /// Cutoff as wall-clock time
    pub cutoff_time: Option<DateTime<Utc>>,
    /// Minutes of buffer before the cutoff; negative means missed
    pub buffer_minutes: Option<f64>,
    /// Buffer classification; safe when there is no cutoff
    pub status: CutoffStatus,
    /// Pace over the segment into this station, min/km, all factors applied
    pub segment_pace_min_km: f64,
    /// Base pace with only the terrain factor applied, min/km
    pub grade_adjusted_pace_min_km: f64,
    /// Terrain cost multiplier for the segment
    pub terrain_factor: f64,
    /// Progressive fatigue multiplier at this station
    pub fatigue_factor: f64,
    /// Nighttime multiplier for the segment
    pub nighttime_factor: f64,
    /// Whether the segment started during night hours
    pub is_nighttime: bool,
}

/// Finish-time summary derived from the station predictions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FinishPrediction {
    /// Total elapsed race time, minutes
    pub predicted_total_minutes: f64,
    /// Wall-clock finish
    pub predicted_finish_time: DateTime<Utc>,
}

/// Race plan predictor.
#[derive(Debug, Clone, Default)]
pub struct RacePredictor {
    profile: RunnerProfile,
    config: PredictorConfig,
}

impl RacePredictor {
    /// Predictor for a runner profile with default tuning.
    #[must_use]
    pub fn new(profile: RunnerProfile) -> Self {
        Self {
            profile,
            config: PredictorConfig::default(),
        }
    }

    /// Predictor with caller-supplied tuning.
    #[must_use]
    pub const fn with_config(profile: RunnerProfile, config: PredictorConfig) -> Self {
        Self { profile, config }
    }

    /// Predictor for a runner with no measured history; the config's
    /// default flat pace and fatigue scalar drive the predictions.
    #[must_use]
    pub fn from_config(config: PredictorConfig) -> Self {
        Self {
            profile: RunnerProfile::from_config(&config),
            config,
        }
    }

    /// Predict arrival at every aid station, in course order.
    ///
    /// `base_pace_min_km` overrides the profile's flat pace when supplied.
    #[must_use]
    pub fn predict(
        &self,
        aid_stations: &[AidStation],
        start_time: DateTime<Utc>,
        total_distance_km: f64,
        base_pace_min_km: Option<f64>,
    ) -> Vec<PredictionResult> {
        let base_pace = base_pace_min_km.unwrap_or(self.profile.flat_pace_min_km);

        let mut results = Vec::with_capacity(aid_stations.len());
        let mut cumulative_minutes = 0.0;
        let mut prev_distance_km = 0.0;

        for station in aid_stations {
            let segment_distance = station
                .distance_from_prev_km
                .unwrap_or(station.distance_km - prev_distance_km);

            let terrain_factor = segment_terrain_factor(station, segment_distance);
            let fatigue_factor =
                self.progressive_fatigue(station.distance_km, total_distance_km);

            let segment_start = start_time + minutes_duration(cumulative_minutes);
            let is_nighttime = self.is_nighttime(segment_start);
            let nighttime_factor = if is_nighttime {
                1.0 + self.config.nighttime_slowdown
            } else {
                1.0
            };

            let segment_pace = base_pace * terrain_factor * fatigue_factor * nighttime_factor;
            cumulative_minutes += segment_distance * segment_pace;
            let predicted_arrival = start_time + minutes_duration(cumulative_minutes);

            let (cutoff_time, buffer_minutes, status) =
                cutoff_status(station, start_time, predicted_arrival);

            results.push(PredictionResult {
                aid_station_id: station.id.clone(),
                aid_station_name: station.name.clone(),
                distance_km: station.distance_km,
                predicted_arrival_minutes: cumulative_minutes,
                predicted_arrival_time: predicted_arrival,
                cutoff_hours_from_start: station.cutoff_hours_from_start,
                cutoff_time,
                buffer_minutes,
                status,
                segment_pace_min_km: segment_pace,
                grade_adjusted_pace_min_km: base_pace * terrain_factor,
                terrain_factor,
                fatigue_factor,
                nighttime_factor,
                is_nighttime,
            });

            prev_distance_km = station.distance_km;
        }

        debug!(
            stations = results.len(),
            total_distance_km, "aid-station predictions complete"
        );
        results
    }

    /// Finish-time summary from the station predictions.
    ///
    /// Reuses the last arrival when the final station sits within 0.5 km
    /// of the course end; otherwise extrapolates the remaining distance at
    /// the last segment's pace. Empty predictions yield a zero-minute
    /// finish at the start time.
    #[must_use]
    pub fn predict_finish(
        &self,
        predictions: &[PredictionResult],
        total_distance_km: f64,
        start_time: DateTime<Utc>,
    ) -> FinishPrediction {
        let Some(last) = predictions.last() else {
            return FinishPrediction {
                predicted_total_minutes: 0.0,
                predicted_finish_time: start_time,
            };
        };

        if (last.distance_km - total_distance_km).abs() < FINISH_TOLERANCE_KM {
            return FinishPrediction {
                predicted_total_minutes: last.predicted_arrival_minutes,
                predicted_finish_time: last.predicted_arrival_time,
            };
        }

        let remaining = total_distance_km - last.distance_km;
        let total_minutes =
            last.predicted_arrival_minutes + remaining * last.segment_pace_min_km;
        FinishPrediction {
            predicted_total_minutes: total_minutes,
            predicted_finish_time: start_time + minutes_duration(total_minutes),
        }
    }

    /// Progressive fatigue multiplier at a point in the race.
    ///
    /// Prefers the empirical pace-decay profile: exact progress bucket
    /// first, then linear interpolation between the two nearest buckets by
    /// their lower bounds, clamping outside the known range. Without a
    /// profile, falls back to a linear ramp toward the Riegel exponent.
    fn progressive_fatigue(&self, distance_km: f64, total_distance_km: f64) -> f64 {
        if total_distance_km <= 0.0 {
            return 1.0;
        }
        let progress_pct = distance_km / total_distance_km * 100.0;

        if let Some(decay) = self
            .profile
            .pace_decay_by_progress_pct
            .as_ref()
            .filter(|d| !d.is_empty())
        {
            let bucket_idx = ((progress_pct / 10.0) as usize).min(9);
            let key = format!("{}-{}", bucket_idx * 10, (bucket_idx + 1) * 10);
            if let Some(&multiplier) = decay.get(&key) {
                return multiplier;
            }
            return interpolate_decay(decay, progress_pct);
        }

        let progress = distance_km / total_distance_km;
        1.0 + (self.profile.fatigue_factor - 1.0) * progress
    }

    /// Whether the hour of day falls in the configured night window.
    fn is_nighttime(&self, time: DateTime<Utc>) -> bool {
        let hour = time.hour();
        let start = self.config.night_start_hour;
        let end = self.config.night_end_hour;
        if start <= end {
            hour >= start && hour < end
        } else {
            hour >= start || hour < end
        }
    }
}

/// Terrain cost multiplier for the segment leading into a station.
///
/// Missing gain or loss counts as zero. Degenerate segments are neutral.
fn segment_terrain_factor(station: &AidStation, segment_distance_km: f64) -> f64 {
    if segment_distance_km <= 0.0 {
        return 1.0;
    }
    let gain = station.elevation_gain_from_prev_m.unwrap_or(0.0);
    let loss = station.elevation_loss_from_prev_m.unwrap_or(0.0);
    let gradient = (gain - loss) / (segment_distance_km * 1000.0);
    minetti::clamped_cost_ratio(gradient)
}

/// Cutoff wall-clock time, buffer and classification for a station.
///
/// A station without a cutoff is safe with no buffer. A cutoff of zero
/// hours is a real (already passed) deadline, not an absent one.
fn cutoff_status(
    station: &AidStation,
    start_time: DateTime<Utc>,
    predicted_arrival: DateTime<Utc>,
) -> (Option<DateTime<Utc>>, Option<f64>, CutoffStatus) {
    let Some(cutoff_hours) = station.cutoff_hours_from_start else {
        return (None, None, CutoffStatus::Safe);
    };
    let cutoff_time = start_time + minutes_duration(cutoff_hours * 60.0);
    let buffer_minutes =
        (cutoff_time - predicted_arrival).num_milliseconds() as f64 / 60_000.0;
    let status = CutoffStatus::from_buffer_minutes(buffer_minutes);
    (Some(cutoff_time), Some(buffer_minutes), status)
}

/// Interpolate a decay multiplier between known progress buckets.
fn interpolate_decay(decay: &BTreeMap<String, f64>, progress_pct: f64) -> f64 {
    let mut buckets: Vec<(f64, f64)> = decay
        .iter()
        .filter_map(|(key, &multiplier)| {
            key.split('-')
                .next()
                .and_then(|lower| lower.parse::<f64>().ok())
                .map(|lower| (lower, multiplier))
        })
        .collect();
    buckets.sort_by(|a, b| a.0.total_cmp(&b.0));

    let Some(&(first_pct, first_mult)) = buckets.first() else {
        return 1.0;
    };
    if progress_pct <= first_pct {
        return first_mult;
    }
    for window in buckets.windows(2) {
        let (lower_pct, lower_mult) = window[0];
        let (upper_pct, upper_mult) = window[1];
        if progress_pct < upper_pct {
            let ratio = (progress_pct - lower_pct) / (upper_pct - lower_pct);
            return lower_mult + ratio * (upper_mult - lower_mult);
        }
    }
    buckets.last().map_or(1.0, |&(_, multiplier)| multiplier)
}

/// Duration from fractional minutes, at millisecond resolution.
fn minutes_duration(minutes: f64) -> Duration {
    Duration::milliseconds((minutes * 60_000.0) as i64)
}

/// Riegel race-time prediction: T2 = T1 * (D2/D1)^k.
///
/// # Errors
///
/// Returns [`AnalysisError::MalformedInput`] when a distance or time is
/// not positive.
pub fn riegel_predict(
    known_distance_km: f64,
    known_time_minutes: f64,
    target_distance_km: f64,
    exponent: f64,
) -> Result<f64> {
    if known_distance_km <= 0.0 || known_time_minutes <= 0.0 {
        return Err(AnalysisError::malformed_input(
            "known_race",
            "distance and time must be positive",
        ));
    }
    if target_distance_km <= 0.0 {
        return Err(AnalysisError::malformed_input(
            "target_distance_km",
            "distance must be positive",
        ));
    }
    Ok(known_time_minutes * (target_distance_km / known_distance_km).powf(exponent))
}

/// Personal Riegel exponent from past races as `(distance_km,
/// time_minutes)` pairs.
///
/// Log-log least squares, clamped to [1.02, 1.15]. Fewer than two races,
/// non-positive values, or degenerate distances yield the 1.06 default.
#[must_use]
pub fn riegel_exponent_from_races(races: &[(f64, f64)]) -> f64 {
    if races.len() < 2 || races.iter().any(|&(d, t)| d <= 0.0 || t <= 0.0) {
        return DEFAULT_RIEGEL_EXPONENT;
    }

    let n = races.len() as f64;
    let logs: Vec<(f64, f64)> = races.iter().map(|&(d, t)| (d.ln(), t.ln())).collect();
    let sum_x: f64 = logs.iter().map(|(x, _)| x).sum();
    let sum_y: f64 = logs.iter().map(|(_, y)| y).sum();
    let sum_xy: f64 = logs.iter().map(|(x, y)| x * y).sum();
    let sum_x2: f64 = logs.iter().map(|(x, _)| x * x).sum();

    let denominator = n * sum_x2 - sum_x * sum_x;
    if denominator.abs() < f64::EPSILON {
        return DEFAULT_RIEGEL_EXPONENT;
    }
    let slope = (n * sum_xy - sum_x * sum_y) / denominator;
    slope.clamp(RIEGEL_EXPONENT_MIN, RIEGEL_EXPONENT_MAX)
}
