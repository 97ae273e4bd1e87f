//! Star Hop headless demo
//!
//! Plays the bundled campaign against a stand-in engine: a fixed-step loop that
//! owns the clock, moves enemies by the velocities the core hands back, and
//! walks the player from star to star. Set `RUST_LOG=debug` for more detail.

use std::collections::BTreeMap;

use glam::Vec2;
use star_hop::consts::*;
use star_hop::sim::{
    Collaborator, Effect, EnemyObservation, EngineEvents, HudSnapshot, Overlap, SessionController,
    SessionPhase, TickInput, TimerHandle, WallContact,
};
use star_hop::{LevelSet, Tuning};

/// ~60 Hz
const FRAME_MS: u32 = 16;
/// Give up after ten simulated minutes
const MAX_FRAMES: u32 = 60 * 60 * 10;
/// Frames the scripted player needs to reach the next star
const FRAMES_PER_STAR: u32 = 30;
/// Level on which the scripted player takes one deliberate fall
const FALL_ON_LEVEL: u32 = 3;
const DEMO_SEED: u64 = 42;

/// Logs every request and keeps timers on a simulated clock
#[derive(Debug, Default)]
struct LogCollaborator {
    now_ms: u64,
    next_handle: u64,
    due: BTreeMap<TimerHandle, u64>,
    /// Respawn position the core asked for, applied by the loop next frame
    respawn_at: Option<Vec2>,
}

impl LogCollaborator {
    /// Advance the clock and return timers that are now due, in scheduling order
    fn advance(&mut self, ms: u32) -> Vec<TimerHandle> {
        self.now_ms += u64::from(ms);
        let now = self.now_ms;
        let fired: Vec<TimerHandle> = self
            .due
            .iter()
            .filter(|(_, due)| **due <= now)
            .map(|(handle, _)| *handle)
            .collect();
        for handle in &fired {
            self.due.remove(handle);
        }
        fired
    }
}

impl Collaborator for LogCollaborator {
    fn request_effect(&mut self, effect: Effect) {
        match &effect {
            Effect::ShowText { text, .. } => log::info!("[{:>6}ms] text: {}", self.now_ms, text),
            Effect::RespawnPlayer { position } => {
                log::debug!("[{:>6}ms] respawn at {}", self.now_ms, position);
                self.respawn_at = Some(*position);
            }
            Effect::LoadFailed { level_index, reason } => {
                log::error!("[{:>6}ms] level {} failed: {}", self.now_ms, level_index, reason)
            }
            other => log::debug!("[{:>6}ms] effect: {:?}", self.now_ms, other),
        }
    }

    fn request_timer(&mut self, duration_ms: u32) -> TimerHandle {
        self.next_handle += 1;
        let handle = TimerHandle(self.next_handle);
        self.due.insert(handle, self.now_ms + u64::from(duration_ms));
        handle
    }

    fn cancel_timer(&mut self, handle: TimerHandle) {
        self.due.remove(&handle);
    }

    fn update_hud(&mut self, hud: &HudSnapshot) {
        log::info!(
            "[{:>6}ms] HUD score={} lives={} level={} stars={}/{} checkpoint={:?}",
            self.now_ms,
            hud.score,
            hud.lives,
            hud.level_index,
            hud.stars_collected,
            hud.stars_total,
            hud.checkpoint
        );
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Star Hop (headless) starting...");
    run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // No logger backend on wasm; the demo still plays through silently
    run();
}

fn run() {

    let levels = match LevelSet::builtin() {
        Ok(levels) => levels,
        Err(err) => {
            log::error!("Bundled levels are broken: {}", err);
            std::process::exit(1);
        }
    };
    let tuning = Tuning::default();
    let mut session =
        SessionController::new(levels, tuning.clone(), LogCollaborator::default(), DEMO_SEED);

    if let Err(err) = session.start_session() {
        log::error!("Could not start session: {}", err);
        std::process::exit(1);
    }

    let dt = FRAME_MS as f32 / 1000.0;
    let mut loaded_level = 0;
    let mut bodies: Vec<EnemyObservation> = Vec::new();
    let mut player_pos = tuning.spawn;
    let mut frames_in_play: u32 = 0;
    let mut fell_once = false;

    for _ in 0..MAX_FRAMES {
        for handle in session.collaborator_mut().advance(FRAME_MS) {
            session.timer_fired(handle);
        }
        if session.phase().is_terminal() || session.phase() == SessionPhase::Idle {
            break;
        }

        if let Some(spawn) = session.collaborator_mut().respawn_at.take() {
            player_pos = spawn;
        }

        // New level: rebuild engine bodies from the core's spawn data
        let level_index = session.state().level_index;
        if level_index != loaded_level {
            loaded_level = level_index;
            bodies = session
                .enemies()
                .iter()
                .map(|enemy| EnemyObservation {
                    id: enemy.id,
                    pos: enemy.pos,
                    walls: WallContact::default(),
                })
                .collect();
            player_pos = session.player().pos;
            frames_in_play = 0;
        }

        // Physics stand-in: integrate enemy velocity and clamp to the world
        for (obs, enemy) in bodies.iter_mut().zip(session.enemies()) {
            obs.pos.x += enemy.velocity_x() * dt;
            obs.walls = WallContact {
                left: obs.pos.x <= 0.0,
                right: obs.pos.x >= WORLD_WIDTH,
            };
            obs.pos.x = obs.pos.x.clamp(0.0, WORLD_WIDTH);
        }

        if session.phase() == SessionPhase::Playing {
            frames_in_play += 1;

            if level_index == FALL_ON_LEVEL && !fell_once && frames_in_play == FRAMES_PER_STAR {
                fell_once = true;
                player_pos = Vec2::new(player_pos.x, tuning.death_line_y + 1.0);
            } else if frames_in_play % FRAMES_PER_STAR == 0 {
                let next_star = session.level().and_then(|level| {
                    level
                        .stars()
                        .iter()
                        .find(|star| !session.is_star_collected(&star.id))
                        .map(|star| (star.id.clone(), star.pos))
                });
                if let Some((id, pos)) = next_star {
                    player_pos = pos;
                    session.on_overlap(Overlap::Star(id));
                } else if session.level().and_then(|level| level.checkpoint()).is_some() {
                    session.on_overlap(Overlap::Checkpoint);
                }
            }
        }

        session.tick(&TickInput {
            dt,
            player_pos: Some(player_pos),
            enemies: bodies.clone(),
        });
    }

    match session.summary() {
        Some(summary) => log::info!(
            "Finished: {:?}, score {}, level {}",
            summary.outcome,
            summary.score,
            summary.level_reached
        ),
        None => log::warn!("Demo stopped in {:?}", session.phase()),
    }
}
