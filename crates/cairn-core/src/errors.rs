// ABOUTME: Error taxonomy for analysis and prediction operations
// ABOUTME: Lets callers distinguish bad input from insufficient signal
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cairn Trail Analytics

//! # Analysis Error Types
//!
//! Every core operation fails with a classifiable [`AnalysisError`] rather
//! than a silently-defaulted result. The surrounding dispatch layer is
//! expected to catch these and wrap them into its own success/error
//! envelope; the variants here are the contract it can match on.

use thiserror::Error;

/// Result alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Errors produced by the analysis and prediction pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    /// Too few samples to produce a meaningful result.
    #[error("not enough data points for analysis (found {found}, need {required})")]
    InsufficientData {
        /// Number of samples actually supplied
        found: usize,
        /// Minimum number of samples the operation needs
        required: usize,
    },

    /// A requested pace/cost segment has non-positive distance or time.
    #[error("invalid segment: {reason}")]
    InvalidSegment {
        /// Why the segment cannot be evaluated
        reason: String,
    },

    /// Aggregation was invoked with no activity analyses.
    #[error("no activity analyses provided for aggregation")]
    EmptyAggregation,

    /// A required field is missing or unusable on an input record.
    #[error("malformed input: field `{field}`: {reason}")]
    MalformedInput {
        /// Name of the offending field
        field: &'static str,
        /// Why the value is unusable
        reason: String,
    },
}

impl AnalysisError {
    /// Create an [`AnalysisError::InsufficientData`] error.
    #[must_use]
    pub const fn insufficient_data(found: usize, required: usize) -> Self {
        Self::InsufficientData { found, required }
    }

    /// Create an [`AnalysisError::InvalidSegment`] error.
    #[must_use]
    pub fn invalid_segment(reason: impl Into<String>) -> Self {
        Self::InvalidSegment {
            reason: reason.into(),
        }
    }

    /// Create an [`AnalysisError::MalformedInput`] error.
    #[must_use]
    pub fn malformed_input(field: &'static str, reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            field,
            reason: reason.into(),
        }
    }

    /// Whether this error means the input was structurally bad, as opposed
    /// to merely carrying too little signal.
    #[must_use]
    pub const fn is_bad_input(&self) -> bool {
        matches!(
            self,
            Self::InvalidSegment { .. } | Self::EmptyAggregation | Self::MalformedInput { .. }
        )
    }
}
