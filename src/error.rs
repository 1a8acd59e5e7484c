/// Error types for entity construction, level loading and configuration.
///
/// The simulation itself never fails: unexpected collision pairs fall
/// through to `Signal::None`.  Errors only surface when something is built
/// from bad input.

use thiserror::Error;

/// Rejected entity construction parameters.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EntityError {
    #[error("entity size must be positive and finite, got {width}x{height}")]
    InvalidSize { width: f32, height: f32 },

    #[error("unknown entity category {0:?}")]
    UnknownCategory(String),

    #[error("invalid entity parameter: {0}")]
    InvalidParameter(&'static str),
}

/// Failures while the level stage loads or switches levels.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StageError {
    #[error("level {0} does not exist")]
    UnknownLevel(u32),

    #[error("level {0} has no player (or more than one)")]
    MissingPlayer(u32),

    #[error("bad entity in level: {0}")]
    Entity(#[from] EntityError),
}

/// Configuration file problems.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("failed to load config file: {0}")]
    Load(String),

    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}
