// ABOUTME: Numeric algorithms shared by the analyzers
// ABOUTME: Kalman elevation smoothing and the Minetti terrain cost model
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cairn Trail Analytics

//! Shared numeric algorithms.
//!
//! These are the leaves of the pipeline: pure functions with no knowledge
//! of segments, activities or courses.

pub mod kalman;
pub mod minetti;
