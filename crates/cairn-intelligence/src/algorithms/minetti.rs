// ABOUTME: Minetti metabolic-cost model for locomotion on gradients
// ABOUTME: Quintic polynomial in gradient, with cost ratio and GAP helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cairn Trail Analytics

//! Terrain cost model.
//!
//! The Minetti equation estimates the metabolic cost of running at a given
//! gradient, derived from treadmill measurements in the exercise-physiology
//! literature:
//!
//! `C = 155.4i^5 - 30.4i^4 - 43.3i^3 + 46.3i^2 + 19.5i + 3.6`
//!
//! where `i` is the gradient as rise/run (0.10 = 10%). Dividing the cost at
//! a gradient by the flat cost yields the factor by which that grade slows
//! a runner; dividing actual pace by the ratio yields grade-adjusted pace
//! (GAP), comparable across terrain.
//!
//! # Scientific Reference
//!
//! - Minetti, A.E., et al. (2002). "Energy cost of walking and running at
//!   extreme uphill and downhill slopes." *Journal of Applied Physiology*,
//!   93(3), 1039-1046.

/// Metabolic cost of level running, J/(kg·m); `minetti_cost(0.0)`.
pub const FLAT_COST: f64 = 3.6;

/// Gradient clamp applied before evaluating the polynomial for prediction.
///
/// The quintic is fit on measured slopes and extrapolates badly beyond
/// them; aid-station legs are clamped to ±50% grade.
pub const GRADIENT_CLAMP: f64 = 0.5;

/// Bounds on the prediction-side cost ratio.
pub const MIN_COST_RATIO: f64 = 0.5;
/// Upper bound on the prediction-side cost ratio.
pub const MAX_COST_RATIO: f64 = 3.0;

/// Metabolic cost of locomotion at a gradient (rise/run).
#[must_use]
pub fn minetti_cost(gradient: f64) -> f64 {
    let i = gradient;
    155.4 * i.powi(5) - 30.4 * i.powi(4) - 43.3 * i.powi(3) + 46.3 * i.powi(2) + 19.5 * i + 3.6
}

/// Ratio of the cost at `gradient` to the flat cost.
///
/// Above 1.0 the grade slows the runner, below 1.0 (gentle descents) it
/// helps. Unclamped; segment analyzers feed it the small-scale gradients
/// they measure directly.
#[must_use]
pub fn cost_ratio(gradient: f64) -> f64 {
    minetti_cost(gradient) / FLAT_COST
}

/// Grade-adjusted pace: actual pace normalized to flat-ground cost.
///
/// Returns the actual pace unchanged when the ratio is non-positive, which
/// the polynomial only produces at extreme unclamped descents.
#[must_use]
pub fn grade_adjusted_pace(actual_pace_min_km: f64, gradient: f64) -> f64 {
    let ratio = cost_ratio(gradient);
    if ratio > 0.0 {
        actual_pace_min_km / ratio
    } else {
        actual_pace_min_km
    }
}

/// Prediction-side cost ratio with bounded extrapolation error.
///
/// Clamps the gradient to ±[`GRADIENT_CLAMP`], floors the raw cost at 1.0,
/// then clamps the ratio to [[`MIN_COST_RATIO`], [`MAX_COST_RATIO`]].
#[must_use]
pub fn clamped_cost_ratio(gradient: f64) -> f64 {
    let gradient = gradient.clamp(-GRADIENT_CLAMP, GRADIENT_CLAMP);
    let cost = minetti_cost(gradient).max(1.0);
    (cost / FLAT_COST).clamp(MIN_COST_RATIO, MAX_COST_RATIO)
}
