// ABOUTME: One-dimensional Kalman filter for GPS elevation denoising
// ABOUTME: Constant-value model, single forward pass, O(n)
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cairn Trail Analytics

//! Elevation smoothing.
//!
//! GPS elevation is noisy (variance around 10 m); a one-dimensional
//! constant-value Kalman filter removes the jitter without the lag of a
//! moving average. The state is a single elevation estimate: each step
//! predicts the previous estimate unchanged, then blends in the new
//! observation weighted by the Kalman gain.

use cairn_core::{AnalysisError, Result};

/// Measurement noise: GPS elevation variance is roughly 10 m.
const MEASUREMENT_NOISE: f64 = 10.0;

/// Process noise of the constant-value model.
const PROCESS_NOISE: f64 = 0.1;

/// Initial estimate variance.
const INITIAL_VARIANCE: f64 = 1.0;

/// Smooth an elevation series with a constant-value Kalman filter.
///
/// The output has exactly the input's length and starts at the first raw
/// sample. Deterministic, single forward pass.
///
/// # Errors
///
/// Returns [`AnalysisError::InsufficientData`] for fewer than 2 samples;
/// there is nothing to smooth.
pub fn smooth_elevations(elevations: &[f64]) -> Result<Vec<f64>> {
    if elevations.len() < 2 {
        return Err(AnalysisError::insufficient_data(elevations.len(), 2));
    }

    let mut estimate = elevations[0];
    let mut variance = INITIAL_VARIANCE;

    let mut smoothed = Vec::with_capacity(elevations.len());
    smoothed.push(estimate);

    for &observation in &elevations[1..] {
        // Predict: constant-value model, only the variance grows
        let predicted_variance = variance + PROCESS_NOISE;

        // Update
        let gain = predicted_variance / (predicted_variance + MEASUREMENT_NOISE);
        estimate += gain * (observation - estimate);
        variance = (1.0 - gain) * predicted_variance;

        smoothed.push(estimate);
    }

    Ok(smoothed)
}
