// ABOUTME: Track point models for GPS-recorded activities
// ABOUTME: RawPoint as decoded from a track file, TrackPoint with derived fields
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cairn Trail Analytics

//! Track point models.
//!
//! A track-file decoder (GPX, FIT, ...) hands the engine an ordered
//! `Vec<RawPoint>`; the point-series builder derives a [`TrackPoint`] per
//! sample with cumulative distance and smoothed elevation attached.
//! Elevation and timestamp stay `Option` so a missing sample is never
//! conflated with a legitimate zero.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single sample as decoded from a track file, ordered by recording time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawPoint {
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
    /// Elevation in meters, absent on GPS dropout
    pub elevation: Option<f64>,
    /// Recording timestamp, absent for course files without timing
    pub timestamp: Option<DateTime<Utc>>,
}

impl RawPoint {
    /// Build a point with elevation but no timestamp (course-file shape).
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64, elevation: Option<f64>) -> Self {
        Self {
            latitude,
            longitude,
            elevation,
            timestamp: None,
        }
    }

    /// Build a fully-populated point (activity-file shape).
    #[must_use]
    pub const fn with_timestamp(
        latitude: f64,
        longitude: f64,
        elevation: Option<f64>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            latitude,
            longitude,
            elevation,
            timestamp: Some(timestamp),
        }
    }
}

/// A raw point enriched with cumulative distance and smoothed elevation.
///
/// Produced once by the point-series builder and immutable afterwards.
/// `distance_m` is non-decreasing along the series; `elevation` is the
/// denoised value while `elevation_raw` keeps the decoder's reading
/// (0.0 when the sample was absent).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackPoint {
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
    /// Raw elevation in meters (0.0 when the sample was missing)
    pub elevation_raw: f64,
    /// Smoothed elevation in meters
    pub elevation: f64,
    /// Cumulative great-circle distance from the start, meters
    pub distance_m: f64,
    /// Recording timestamp, if the raw point carried one
    pub timestamp: Option<DateTime<Utc>>,
}
