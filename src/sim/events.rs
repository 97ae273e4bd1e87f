//! Seams between the session core and the host engine
//!
//! Inbound: the engine calls [`EngineEvents`] on every frame, overlap and timer.
//! Outbound: the core asks a [`Collaborator`] for effects, timers and HUD
//! refreshes. Nothing here renders, plays audio or keeps time.

use glam::Vec2;
use serde::Serialize;

use super::patrol::{EnemyId, WallContact};
use crate::consts::{WORLD_HEIGHT, WORLD_WIDTH};

/// Opaque handle for a timer the collaborator scheduled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TimerHandle(pub u64);

/// Named sound cues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Sound {
    /// Star picked up
    Collect,
    /// Level cleared
    LevelChange,
    /// Player died
    GameOver,
    /// Menu button press
    Touch,
}

impl Sound {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sound::Collect => "collect",
            Sound::LevelChange => "levelChange",
            Sound::GameOver => "gameOver",
            Sound::Touch => "touch",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ParticleKind {
    /// Sparkle burst where a star was collected
    StarBurst,
    /// Red burst where the player died
    Death,
    /// Firework on level clear
    Firework,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FadeDirection {
    In,
    Out,
}

/// Presentation request; the collaborator decides how (or whether) to show it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Effect {
    PlaySound(Sound),
    ShowText {
        text: String,
        position: Vec2,
        duration_ms: u32,
    },
    ShakeCamera {
        duration_ms: u32,
        intensity: f32,
    },
    SpawnParticles {
        kind: ParticleKind,
        position: Vec2,
    },
    FadeTransition {
        direction: FadeDirection,
        duration_ms: u32,
    },
    /// Put the player body back at `position` with zero velocity
    RespawnPlayer { position: Vec2 },
    /// Invulnerability window started; flash the player for its duration
    FlashPlayer { duration_ms: u32 },
    /// Level could not be loaded; the session was aborted
    LoadFailed { level_index: u32, reason: String },
}

impl Effect {
    /// Banner centered in the world
    pub fn banner(text: impl Into<String>, duration_ms: u32) -> Self {
        Effect::ShowText {
            text: text.into(),
            position: Vec2::new(WORLD_WIDTH / 2.0, WORLD_HEIGHT * 3.0 / 7.0),
            duration_ms,
        }
    }
}

/// Checkpoint progress as shown on the HUD
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CheckpointStatus {
    NotRequired,
    Pending,
    Reached,
}

/// Everything the HUD shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HudSnapshot {
    pub score: u64,
    pub lives: u8,
    pub level_index: u32,
    pub stars_collected: u32,
    pub stars_total: u32,
    pub checkpoint: CheckpointStatus,
}

/// Host-side notification interface
pub trait Collaborator {
    /// Fire-and-forget presentation request
    fn request_effect(&mut self, effect: Effect);

    /// Schedule a callback; the host later calls [`EngineEvents::timer_fired`] with the handle
    fn request_timer(&mut self, duration_ms: u32) -> TimerHandle;

    /// The core no longer cares about this timer. Firing it anyway is harmless.
    fn cancel_timer(&mut self, _handle: TimerHandle) {}

    fn update_hud(&mut self, hud: &HudSnapshot);
}

/// Per-enemy physics observation for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyObservation {
    pub id: EnemyId,
    pub pos: Vec2,
    pub walls: WallContact,
}

/// What the engine knows at the start of a frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Frame time in seconds. Patrol reacts to observed positions only, so the
    /// core just traces it; hosts integrate movement with it themselves.
    pub dt: f32,
    /// Current player position
    pub player_pos: Option<Vec2>,
    /// Enemies the engine moved since last frame
    pub enemies: Vec<EnemyObservation>,
}

/// Physics overlaps the core reacts to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Overlap {
    Star(String),
    Enemy(EnemyId),
    Checkpoint,
}

/// Inbound event sink the host engine drives
pub trait EngineEvents {
    type Outcome;

    /// Advance one frame
    fn tick(&mut self, input: &TickInput);

    /// Player overlapped something
    fn on_overlap(&mut self, overlap: Overlap) -> Self::Outcome;

    /// A timer requested through [`Collaborator::request_timer`] elapsed
    fn timer_fired(&mut self, handle: TimerHandle) -> Self::Outcome;
}
