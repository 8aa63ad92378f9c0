// ABOUTME: Gradient and terrain classification for pace analysis
// ABOUTME: Pure threshold functions producing tagged variants from grade values
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cairn Trail Analytics

//! Gradient and terrain classification.
//!
//! Two classification schemes coexist: the 7-way [`GradientBucket`] used by
//! the fixed-segment analyzer for pace-by-gradient statistics, and the
//! coarser [`TerrainType`] (with its finer [`GradeBucket`]) used by the
//! terrain-adaptive analyzer. Both are pure functions of the grade
//! percentage, so the threshold tables are unit-testable in isolation.

use serde::{Deserialize, Serialize};

/// Gradient bucket for fixed-segment pace statistics.
///
/// Thresholds in grade percent: -8, -3, -1, 1, 3, 8 (lower bound
/// inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradientBucket {
    /// Below -8%
    SteepDownhill,
    /// [-8%, -3%)
    Downhill,
    /// [-3%, -1%)
    GentleDownhill,
    /// [-1%, 1%)
    Flat,
    /// [1%, 3%)
    GentleUphill,
    /// [3%, 8%)
    Uphill,
    /// 8% and above
    SteepUphill,
}

impl GradientBucket {
    /// Classify a grade percentage.
    #[must_use]
    pub fn from_percent(gradient_percent: f64) -> Self {
        if gradient_percent < -8.0 {
            Self::SteepDownhill
        } else if gradient_percent < -3.0 {
            Self::Downhill
        } else if gradient_percent < -1.0 {
            Self::GentleDownhill
        } else if gradient_percent < 1.0 {
            Self::Flat
        } else if gradient_percent < 3.0 {
            Self::GentleUphill
        } else if gradient_percent < 8.0 {
            Self::Uphill
        } else {
            Self::SteepUphill
        }
    }

    /// All buckets in ascending grade order.
    #[must_use]
    pub const fn all() -> [Self; 7] {
        [
            Self::SteepDownhill,
            Self::Downhill,
            Self::GentleDownhill,
            Self::Flat,
            Self::GentleUphill,
            Self::Uphill,
            Self::SteepUphill,
        ]
    }
}

/// Coarse terrain type for the terrain-adaptive analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerrainType {
    /// Sustained grade of 3% or more
    Climb,
    /// Sustained grade of -3% or less
    Descent,
    /// Everything in between
    Flat,
}

impl TerrainType {
    /// Classify a grade percentage: climb at >= 3%, descent at <= -3%.
    #[must_use]
    pub fn from_grade_percent(grade_percent: f64) -> Self {
        if grade_percent >= 3.0 {
            Self::Climb
        } else if grade_percent <= -3.0 {
            Self::Descent
        } else {
            Self::Flat
        }
    }
}

/// Fine-grained grade bucket within a terrain type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradeBucket {
    /// Above 8%
    SteepClimb,
    /// (5%, 8%]
    ModerateClimb,
    /// [3%, 5%]
    GentleClimb,
    /// (-3%, 3%)
    Flat,
    /// (-5%, -3%]
    GentleDescent,
    /// (-8%, -5%]
    ModerateDescent,
    /// -8% and below
    SteepDescent,
}

impl GradeBucket {
    /// Classify a grade percentage, mirroring [`TerrainType`] at ±3%.
    #[must_use]
    pub fn from_grade_percent(grade_percent: f64) -> Self {
        if grade_percent > 8.0 {
            Self::SteepClimb
        } else if grade_percent > 5.0 {
            Self::ModerateClimb
        } else if grade_percent >= 3.0 {
            Self::GentleClimb
        } else if grade_percent > -3.0 {
            Self::Flat
        } else if grade_percent > -5.0 {
            Self::GentleDescent
        } else if grade_percent > -8.0 {
            Self::ModerateDescent
        } else {
            Self::SteepDescent
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gradient_bucket_thresholds() {
        assert_eq!(GradientBucket::from_percent(-12.0), GradientBucket::SteepDownhill);
        assert_eq!(GradientBucket::from_percent(-8.0), GradientBucket::Downhill);
        assert_eq!(GradientBucket::from_percent(-3.0), GradientBucket::GentleDownhill);
        assert_eq!(GradientBucket::from_percent(-1.0), GradientBucket::Flat);
        assert_eq!(GradientBucket::from_percent(0.0), GradientBucket::Flat);
        assert_eq!(GradientBucket::from_percent(1.0), GradientBucket::GentleUphill);
        assert_eq!(GradientBucket::from_percent(3.0), GradientBucket::Uphill);
        assert_eq!(GradientBucket::from_percent(8.0), GradientBucket::SteepUphill);
        assert_eq!(GradientBucket::from_percent(15.0), GradientBucket::SteepUphill);
    }

    #[test]
    fn test_terrain_type_thresholds() {
        assert_eq!(TerrainType::from_grade_percent(3.0), TerrainType::Climb);
        assert_eq!(TerrainType::from_grade_percent(2.9), TerrainType::Flat);
        assert_eq!(TerrainType::from_grade_percent(-2.9), TerrainType::Flat);
        assert_eq!(TerrainType::from_grade_percent(-3.0), TerrainType::Descent);
    }

    #[test]
    fn test_grade_bucket_thresholds() {
        assert_eq!(GradeBucket::from_grade_percent(10.0), GradeBucket::SteepClimb);
        assert_eq!(GradeBucket::from_grade_percent(8.0), GradeBucket::ModerateClimb);
        assert_eq!(GradeBucket::from_grade_percent(5.0), GradeBucket::GentleClimb);
        assert_eq!(GradeBucket::from_grade_percent(3.0), GradeBucket::GentleClimb);
        assert_eq!(GradeBucket::from_grade_percent(0.0), GradeBucket::Flat);
        assert_eq!(GradeBucket::from_grade_percent(-3.0), GradeBucket::GentleDescent);
        assert_eq!(GradeBucket::from_grade_percent(-5.0), GradeBucket::ModerateDescent);
        assert_eq!(GradeBucket::from_grade_percent(-8.0), GradeBucket::SteepDescent);
        assert_eq!(GradeBucket::from_grade_percent(-9.0), GradeBucket::SteepDescent);
    }

    #[test]
    fn test_serde_snake_case_names() {
        let json = serde_json::to_string(&GradientBucket::SteepDownhill).unwrap();
        assert_eq!(json, "\"steep_downhill\"");
        let json = serde_json::to_string(&TerrainType::Climb).unwrap();
        assert_eq!(json, "\"climb\"");
        let json = serde_json::to_string(&GradeBucket::ModerateDescent).unwrap();
        assert_eq!(json, "\"moderate_descent\"");
    }
}
