// ABOUTME: Configuration for the segment analyzers and the race predictor
// ABOUTME: Serde-able structs with defaults tuned for ultra-distance trail events
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cairn Trail Analytics

//! Analyzer and predictor configuration.

use serde::{Deserialize, Serialize};

/// Tunables for the two segment analyzers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentationConfig {
    /// Fixed-segment target length in kilometers
    pub segment_length_km: f64,
    /// Minimum points required for segment or terrain analysis
    pub min_points: usize,
    /// Sliding window for terrain-type detection, meters
    pub terrain_window_m: f64,
    /// Segments shorter than this are merged away, kilometers
    pub min_terrain_segment_km: f64,
    /// Flat/descent segments longer than this are split, kilometers
    pub max_terrain_segment_km: f64,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            segment_length_km: 1.0,
            min_points: 10,
            terrain_window_m: 200.0,
            min_terrain_segment_km: 0.3,
            max_terrain_segment_km: 5.0,
        }
    }
}

/// Tunables for the race predictor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictorConfig {
    /// Fractional slowdown applied during nighttime hours (0.15 = 15%)
    pub nighttime_slowdown: f64,
    /// First nighttime hour of day, inclusive
    pub night_start_hour: u32,
    /// First daytime hour of day (night ends here)
    pub night_end_hour: u32,
    /// Base flat pace when no profile supplies one, min/km
    pub default_flat_pace_min_km: f64,
    /// Riegel-style fatigue scalar for the linear fallback model
    pub default_fatigue_factor: f64,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            nighttime_slowdown: 0.15,
            night_start_hour: 21,
            night_end_hour: 6,
            default_flat_pace_min_km: 6.5,
            default_fatigue_factor: 1.08,
        }
    }
}
