//! Error types

use thiserror::Error;

/// Rejected configuration. Values are never clamped into range silently.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} must be a positive finite number, got {value}")]
    NotPositive { field: &'static str, value: f32 },
    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f32 },
    #[error("{field} range is inverted: min {min} > max {max}")]
    InvertedRange {
        field: &'static str,
        min: f32,
        max: f32,
    },
    #[error("{field} ({value}) does not fit in a field {limit} wide")]
    TooWide {
        field: &'static str,
        value: f32,
        limit: f32,
    },
    #[error("{field} of {value} seconds is not a usable timer interval")]
    Interval { field: &'static str, value: f32 },
    #[error("{field} must be at least 1")]
    Zero { field: &'static str },
    #[error("damping must be within (0, 1], got {0}")]
    Damping(f32),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}
