// ABOUTME: Data models shared across the analysis pipeline
// ABOUTME: Track points from decoders, aid-station records from course plans
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cairn Trail Analytics

//! Plain data models exchanged with collaborators.

mod course;
mod point;

pub use course::AidStation;
pub use point::{RawPoint, TrackPoint};
