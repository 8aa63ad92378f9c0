// ABOUTME: Core types for the Cairn trail analytics engine
// ABOUTME: Foundation crate with error taxonomy and track/course data models
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cairn Trail Analytics

#![deny(unsafe_code)]

//! # Cairn Core
//!
//! Foundation crate for the Cairn trail race analytics engine. Holds the
//! error taxonomy and the plain data models exchanged with collaborators
//! (track-file decoders, the task-dispatch layer). This crate changes
//! infrequently; all algorithm code lives in `cairn-intelligence`.

/// Classifiable error values for every core operation
pub mod errors;

/// Track point and course-plan data models
pub mod models;

pub use errors::{AnalysisError, Result};
