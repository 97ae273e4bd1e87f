//! Session simulation module
//!
//! All gameplay decisions live here. This module must stay engine-agnostic:
//! - No rendering, audio or clocks; effects and timers are requests
//! - Single-threaded; every mutation happens inside an inbound call
//! - Stable iteration order (enemies by id)

pub mod events;
pub mod patrol;
pub mod session;
pub mod state;
pub mod timers;

#[cfg(test)]
pub(crate) mod testing;

pub use events::{
    CheckpointStatus, Collaborator, Effect, EnemyObservation, EngineEvents, FadeDirection,
    HudSnapshot, Overlap, ParticleKind, Sound, TickInput, TimerHandle,
};
pub use patrol::{
    Direction, EnemyAgent, EnemyId, PatrolBounds, PatrolStep, WallContact, patrol_step,
};
pub use session::{SessionController, Transition};
pub use state::{PlayerState, SessionOutcome, SessionPhase, SessionState, SessionSummary};
