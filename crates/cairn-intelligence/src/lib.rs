// ABOUTME: Terrain-aware pace analytics and race prediction engine
// ABOUTME: Turns decoded GPS tracks into pace profiles and cutoff forecasts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cairn Trail Analytics

#![deny(unsafe_code)]

//! # Cairn Intelligence
//!
//! Analysis engine for ultra-distance trail events. Consumes an ordered
//! point sequence from a track-file decoder and produces terrain-aware pace
//! analytics; consumes a course plan plus an aggregated fitness profile and
//! produces aid-station arrival forecasts with cutoff status.
//!
//! The pipeline, leaves first:
//!
//! - [`series`] — distance-indexed track series with smoothed elevation
//! - [`algorithms`] — Kalman elevation filter, Minetti terrain cost model
//! - [`gradient`] — gradient / terrain classification
//! - [`performance_analyzer`] — fixed ~1 km segmentation and per-activity metrics
//! - [`fatigue`] — fatigue curve, 5 km pace buckets, progress-based pace decay
//! - [`terrain_analyzer`] — terrain-adaptive climb/descent/flat segmentation
//! - [`course_analyzer`] — course statistics and aid-station enrichment
//! - [`aggregator`] — recency-weighted multi-activity profile aggregation
//! - [`race_predictor`] — arrival-time and cutoff forecasting
//!
//! Every component is a synchronous, deterministic transform over in-memory
//! data; no I/O, no shared state across invocations.

/// Numeric algorithms shared by the analyzers
pub mod algorithms;

/// Multi-activity performance-profile aggregation
pub mod aggregator;

/// Analyzer and predictor configuration
pub mod config;

/// Course statistics, elevation profile and aid-station enrichment
pub mod course_analyzer;

/// Fatigue curve and pace-decay extraction from fixed segments
pub mod fatigue;

/// Gradient bucket and terrain type classification
pub mod gradient;

/// Fixed-length segmentation and per-activity performance metrics
pub mod performance_analyzer;

/// Aid-station arrival and cutoff forecasting
pub mod race_predictor;

/// Distance-indexed point series shared by all analyzers
pub mod series;

/// Terrain-adaptive climb/descent/flat segmentation
pub mod terrain_analyzer;

pub use cairn_core::{errors, models, AnalysisError, Result};
