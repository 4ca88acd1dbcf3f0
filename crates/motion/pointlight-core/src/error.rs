//! Error types for the motion engine

use serde::{Deserialize, Serialize};

/// Every failure the engine can surface. All of them are raised synchronously
/// by the call that detects them and none are retried.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum MotionError {
    /// Bad session or subject configuration
    #[error("Invalid configuration for '{field}': {reason}")]
    Configuration { field: String, reason: String },

    /// Action name not registered in the library
    #[error("Unknown action: {name}")]
    UnknownAction { name: String },

    /// A pose generator produced a non-finite value
    #[error("Action '{action}' produced a non-finite value for marker {marker} at phase {phase}")]
    MotionComputation {
        action: String,
        phase: f64,
        marker: String,
    },

    /// A frame failed the bounding-box sanity check
    #[error("Action '{action}' moved marker {marker} out of bounds at phase {phase}: ({x}, {y})")]
    OutOfBounds {
        action: String,
        phase: f64,
        marker: String,
        x: f64,
        y: f64,
    },

    /// Invalid time, phase or time delta
    #[error("Invalid time value: {time}")]
    InvalidTime { time: f64 },

    /// Scheduler call not allowed in the current state
    #[error("Invalid scheduler state: {current} -> {requested}")]
    InvalidState { current: String, requested: String },
}

impl MotionError {
    pub(crate) fn config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Configuration {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Whether the driving loop must end the session. Only scheduler misuse and
    /// bad time inputs leave the session intact.
    #[inline]
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::InvalidTime { .. } | Self::InvalidState { .. })
    }

    /// Error category for logging
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::Configuration { .. } => "configuration",
            Self::UnknownAction { .. } => "library",
            Self::MotionComputation { .. } | Self::OutOfBounds { .. } => "motion",
            Self::InvalidTime { .. } | Self::InvalidState { .. } => "scheduler",
        }
    }
}

impl From<serde_json::Error> for MotionError {
    fn from(err: serde_json::Error) -> Self {
        Self::config("json", err.to_string())
    }
}
