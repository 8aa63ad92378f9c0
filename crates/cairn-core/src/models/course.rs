// ABOUTME: Course-plan models for race prediction
// ABOUTME: Aid-station records with explicit Option for every optional metric
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cairn Trail Analytics

//! Course-plan models.

use serde::{Deserialize, Serialize};

/// One aid station of a planned race course, in course order.
///
/// Only `distance_km` is mandatory. Every other numeric field is an
/// explicit `Option`: `Some(0.0)` is a real value (a cutoff at the gun, a
/// dead-flat leg), `None` means the organizer did not supply it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AidStation {
    /// Caller-assigned identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Distance from the start, kilometers
    pub distance_km: f64,
    /// Distance from the previous station, kilometers; derived from
    /// `distance_km` deltas when absent
    #[serde(default)]
    pub distance_from_prev_km: Option<f64>,
    /// Station elevation, meters
    #[serde(default)]
    pub elevation_m: Option<f64>,
    /// Total climb since the previous station, meters
    #[serde(default)]
    pub elevation_gain_from_prev_m: Option<f64>,
    /// Total descent since the previous station, meters (positive value)
    #[serde(default)]
    pub elevation_loss_from_prev_m: Option<f64>,
    /// Organizer cutoff, hours after the race start
    #[serde(default)]
    pub cutoff_hours_from_start: Option<f64>,
}

impl AidStation {
    /// Minimal station with just an id, name and course distance.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, distance_km: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            distance_km,
            distance_from_prev_km: None,
            elevation_m: None,
            elevation_gain_from_prev_m: None,
            elevation_loss_from_prev_m: None,
            cutoff_hours_from_start: None,
        }
    }
}
