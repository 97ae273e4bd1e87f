//! Star Hop - session core for a star-collecting 2D platformer
//!
//! Core modules:
//! - `sim`: Session state machine, patrol AI, and the engine/collaborator seams
//! - `level`: Level data tables and load-time validation
//! - `tuning`: Data-driven game balance
//! - `error`: Level load errors and transition rejections
//!
//! The host engine owns rendering, physics, audio and timers. It drives the
//! core through [`sim::EngineEvents`] and realizes the requests the core makes
//! through [`sim::Collaborator`].

pub mod error;
pub mod level;
pub mod sim;
pub mod tuning;

pub use error::{LevelError, Rejection};
pub use level::{Level, LevelSet, LevelSpec, PlatformExtent, PlatformId};
pub use tuning::Tuning;

/// Game configuration constants
///
/// Defaults for [`Tuning`]; values come from the shipped game.
pub mod consts {
    /// Lives at session start and after restart
    pub const STARTING_LIVES: u8 = 3;
    /// Score awarded per collected star
    pub const STAR_REWARD: u64 = 10;
    /// Last level of the campaign
    pub const MAX_LEVEL: u32 = 5;

    /// Player falls to death once y exceeds this (y grows downward)
    pub const DEATH_LINE_Y: f32 = 650.0;
    /// Player spawn point
    pub const SPAWN_X: f32 = 100.0;
    pub const SPAWN_Y: f32 = 550.0;

    /// Platform sprite is 90px wide
    pub const PLATFORM_HALF_WIDTH: f32 = 45.0;
    /// Patrol inset from each platform edge, as a fraction of half-width
    pub const PATROL_MARGIN_RATIO: f32 = 0.1;
    /// Vertical band around a platform top where an enemy counts as standing on it
    pub const PLATFORM_BAND_ABOVE: f32 = 50.0;
    pub const PLATFORM_BAND_BELOW: f32 = 10.0;

    /// "Level N" banner (fade in + yoyo)
    pub const INTRO_MS: u32 = 2000;
    /// "Level Complete!" banner before the next level loads
    pub const LEVEL_COMPLETE_MS: u32 = 2000;
    /// Death animation plus the pause before respawn / game over
    pub const RESPAWN_DELAY_MS: u32 = 2000;
    /// Post-respawn flashing, 11 half-cycles of 200ms each way
    pub const INVULNERABILITY_MS: u32 = 4400;
    /// Camera fade on level entry and on leaving to the menu
    pub const FADE_MS: u32 = 500;
    /// Camera shake on death
    pub const SHAKE_MS: u32 = 500;
    pub const SHAKE_INTENSITY: f32 = 0.02;

    /// Firework bursts when a level is cleared
    pub const VICTORY_BURSTS: u32 = 8;

    /// World size, used for centered banners and firework placement
    pub const WORLD_WIDTH: f32 = 1000.0;
    pub const WORLD_HEIGHT: f32 = 700.0;
}
