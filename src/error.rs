//! Level load errors and transition rejections

use serde::Serialize;

use crate::sim::SessionPhase;

/// Errors raised while loading a level. Always fatal for the level being entered.
#[derive(Debug, thiserror::Error)]
pub enum LevelError {
    /// Requested level index has no data
    #[error("level {0} not found")]
    LevelNotFound(u32),
    /// Level has nothing to stand on
    #[error("level {level} has no platforms")]
    NoPlatforms { level: u32 },
    /// An enemy is bound to a platform index outside the level's platform list
    #[error(
        "level {level}: enemy {enemy} references platform {platform}, but only {platform_count} platforms exist"
    )]
    InvalidPlatformReference {
        level: u32,
        enemy: usize,
        platform: usize,
        platform_count: usize,
    },
    /// Platform extents must be strictly positive
    #[error("level {level}: platform {platform} has non-positive half-width {half_width}")]
    NonPositiveHalfWidth {
        level: u32,
        platform: usize,
        half_width: f32,
    },
    /// Two stars share an id, so one could never be counted
    #[error("level {level}: duplicate star id '{id}'")]
    DuplicateStarId { level: u32, id: String },
    /// Enemy speed must be a finite, non-negative magnitude
    #[error("level {level}: enemy {enemy} has invalid speed {speed}")]
    InvalidEnemySpeed { level: u32, enemy: usize, speed: f32 },
    /// Completion requires a checkpoint the level never places
    #[error("level {level} requires a checkpoint but defines none")]
    MissingCheckpoint { level: u32 },
    /// Level table could not be parsed
    #[error("failed to parse level data: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Why an inbound event was rejected without mutating the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Rejection {
    /// Idempotent transition already satisfied (star already counted, checkpoint already reached)
    Duplicate,
    /// Event is not valid in the current phase
    InvalidState(SessionPhase),
    /// Player cannot be hurt right now (invulnerable or already down)
    Invulnerable,
    /// Event names an entity the active level does not contain
    UnknownEntity,
    /// Timer was discarded (or never scheduled) before it fired
    StaleTimer,
}
