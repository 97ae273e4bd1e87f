//! Session state machine
//!
//! ```text
//! Idle ──start──▶ LevelIntro ──intro──▶ Playing ──all stars (+checkpoint)──▶ LevelComplete
//!                     ▲                  │    ▲                                  │
//!                     │            death │    │ respawn                          │ next level
//!                     │                  ▼    │                                  │
//!                     │             PlayerRespawning ──no lives──▶ GameOver      │
//!                     └──────────────────────────────────────────────────────────┘
//!                                                    last level ──▶ GameComplete
//! ```
//!
//! Every transition is a method. Calls that do not fit the current phase are
//! rejected without touching state. Timed steps (intro, respawn, level
//! transition, invulnerability) are requested from the collaborator and
//! resolved through [`EngineEvents::timer_fired`]; calling the matching method
//! directly discards the pending timer.

use std::collections::HashSet;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::events::{
    Collaborator, Effect, EngineEvents, FadeDirection, Overlap, ParticleKind, Sound, TickInput,
    TimerHandle,
};
use super::patrol::{EnemyAgent, EnemyId, PatrolBounds, WallContact};
use super::state::{PlayerState, SessionOutcome, SessionPhase, SessionState, SessionSummary};
use super::timers::{PendingTimers, TimerPurpose};
use crate::error::{LevelError, Rejection};
use crate::level::{Level, LevelSet};
use crate::tuning::Tuning;

/// How long the short "Checkpoint!" label stays up
const CHECKPOINT_TEXT_MS: u32 = 1000;

/// Result of feeding an event to the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// State changed
    Applied,
    /// Event was a no-op
    Ignored(Rejection),
    /// A level failed to load and the session fell back to `Idle`
    Aborted,
}

impl Transition {
    pub fn is_applied(self) -> bool {
        self == Transition::Applied
    }
}

/// Owns one play session: counters, player, active level and its enemies
pub struct SessionController<C: Collaborator> {
    collaborator: C,
    levels: LevelSet,
    tuning: Tuning,
    phase: SessionPhase,
    state: SessionState,
    player: PlayerState,
    level: Option<Level>,
    enemies: Vec<EnemyAgent>,
    /// Patrol bounds per platform of the active level
    bounds: Vec<PatrolBounds>,
    collected: HashSet<String>,
    timers: PendingTimers,
    summary: Option<SessionSummary>,
    rng: Pcg32,
}

impl<C: Collaborator> SessionController<C> {
    /// Create an idle controller; `seed` drives cosmetic randomness only
    pub fn new(levels: LevelSet, tuning: Tuning, collaborator: C, seed: u64) -> Self {
        let tuning = tuning.sanitized();
        Self {
            collaborator,
            levels,
            phase: SessionPhase::Idle,
            state: SessionState::new(tuning.starting_lives),
            player: PlayerState::spawned_at(tuning.spawn),
            tuning,
            level: None,
            enemies: Vec::new(),
            bounds: Vec::new(),
            collected: HashSet::new(),
            timers: PendingTimers::new(),
            summary: None,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn player(&self) -> &PlayerState {
        &self.player
    }

    pub fn level(&self) -> Option<&Level> {
        self.level.as_ref()
    }

    /// Enemies of the active level in id order; read `velocity_x` after each tick
    pub fn enemies(&self) -> &[EnemyAgent] {
        &self.enemies
    }

    /// Set when the session ends in `GameOver` or `GameComplete`
    pub fn summary(&self) -> Option<SessionSummary> {
        self.summary
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn collaborator(&self) -> &C {
        &self.collaborator
    }

    pub fn collaborator_mut(&mut self) -> &mut C {
        &mut self.collaborator
    }

    pub fn is_star_collected(&self, star_id: &str) -> bool {
        self.collected.contains(star_id)
    }

    // === Transitions ===

    /// Idle → LevelIntro on level 1 with full lives and no score
    pub fn start_session(&mut self) -> Result<Transition, LevelError> {
        if self.phase != SessionPhase::Idle {
            return Ok(self.reject_phase("start_session"));
        }
        log::info!("Session starting");
        self.state.reset(self.tuning.starting_lives);
        self.summary = None;
        self.enter_level(1)?;
        Ok(Transition::Applied)
    }

    /// LevelIntro → Playing
    pub fn intro_finished(&mut self) -> Transition {
        if self.phase != SessionPhase::LevelIntro || self.level.is_none() {
            return self.reject_phase("intro_finished");
        }
        self.timers
            .discard(&mut self.collaborator, TimerPurpose::IntroFinished);
        self.set_phase(SessionPhase::Playing);
        // A level with nothing to collect is done as soon as it starts
        if self.state.level_cleared() {
            self.complete_level();
        }
        Transition::Applied
    }

    /// Count a star once; completes the level when every condition is met
    pub fn on_star_collected(&mut self, star_id: &str) -> Transition {
        if self.phase != SessionPhase::Playing {
            return self.reject_phase("on_star_collected");
        }
        let Some(star_pos) = self
            .level
            .as_ref()
            .and_then(|level| level.star(star_id))
            .map(|star| star.pos)
        else {
            log::debug!("Ignoring unknown star '{}'", star_id);
            return Transition::Ignored(Rejection::UnknownEntity);
        };
        if !self.collected.insert(star_id.to_string()) {
            log::debug!("Star '{}' already collected", star_id);
            return Transition::Ignored(Rejection::Duplicate);
        }

        self.state.stars_collected = (self.state.stars_collected + 1).min(self.state.stars_total);
        self.state.score += self.tuning.star_reward;
        log::debug!(
            "Star '{}' collected ({}/{}), score {}",
            star_id,
            self.state.stars_collected,
            self.state.stars_total,
            self.state.score
        );

        self.collaborator
            .request_effect(Effect::PlaySound(Sound::Collect));
        self.collaborator.request_effect(Effect::SpawnParticles {
            kind: ParticleKind::StarBurst,
            position: star_pos,
        });
        self.push_hud();

        if self.state.level_cleared() {
            self.complete_level();
        }
        Transition::Applied
    }

    /// Mark the checkpoint reached once; completes the level when every condition is met
    pub fn on_checkpoint_reached(&mut self) -> Transition {
        if self.phase != SessionPhase::Playing {
            return self.reject_phase("on_checkpoint_reached");
        }
        let Some(position) = self.level.as_ref().and_then(|level| level.checkpoint()) else {
            log::debug!("Level {} has no checkpoint", self.state.level_index);
            return Transition::Ignored(Rejection::UnknownEntity);
        };
        if self.state.checkpoint_reached {
            return Transition::Ignored(Rejection::Duplicate);
        }

        self.state.checkpoint_reached = true;
        log::info!("Checkpoint reached on level {}", self.state.level_index);
        self.collaborator.request_effect(Effect::ShowText {
            text: "Checkpoint!".to_string(),
            position,
            duration_ms: CHECKPOINT_TEXT_MS,
        });
        self.push_hud();

        if self.state.level_cleared() {
            self.complete_level();
        }
        Transition::Applied
    }

    /// Player touched an enemy; ignored while invulnerable
    pub fn on_enemy_contact(&mut self) -> Transition {
        if self.phase == SessionPhase::Playing && !self.player.can_be_hurt() {
            log::trace!("Enemy contact ignored, player cannot be hurt");
            return Transition::Ignored(Rejection::Invulnerable);
        }
        self.kill_player("on_enemy_contact")
    }

    /// Player dropped past the death line. Invulnerability does not save a fall.
    pub fn on_fell_below_death_line(&mut self) -> Transition {
        self.kill_player("on_fell_below_death_line")
    }

    /// PlayerRespawning → Playing (lives left) or GameOver
    pub fn respawn_resolved(&mut self) -> Transition {
        if self.phase != SessionPhase::PlayerRespawning {
            return self.reject_phase("respawn_resolved");
        }
        self.timers
            .discard(&mut self.collaborator, TimerPurpose::RespawnResolved);

        if self.state.lives == 0 {
            self.finish(SessionOutcome::GameOver);
            return Transition::Applied;
        }

        let spawn = self.spawn_point();
        self.player = PlayerState::spawned_at(spawn);
        self.player.invulnerable = true;
        self.collaborator
            .request_effect(Effect::RespawnPlayer { position: spawn });
        self.collaborator.request_effect(Effect::FlashPlayer {
            duration_ms: self.tuning.invulnerability_ms,
        });
        self.timers.schedule(
            &mut self.collaborator,
            self.tuning.invulnerability_ms,
            TimerPurpose::InvulnerabilityEnd,
        );
        log::info!(
            "Player respawned at ({}, {}), {} lives left",
            spawn.x,
            spawn.y,
            self.state.lives
        );
        self.set_phase(SessionPhase::Playing);
        Transition::Applied
    }

    /// LevelComplete → next level's intro, or GameComplete after the last level
    pub fn level_transition_resolved(&mut self) -> Result<Transition, LevelError> {
        if self.phase != SessionPhase::LevelComplete {
            return Ok(self.reject_phase("level_transition_resolved"));
        }
        self.timers
            .discard(&mut self.collaborator, TimerPurpose::LevelTransition);

        if self.state.level_index < self.levels.max_level() {
            self.state.level_index += 1;
            self.enter_level(self.state.level_index)?;
        } else {
            self.finish(SessionOutcome::GameComplete);
        }
        Ok(Transition::Applied)
    }

    /// GameOver / GameComplete → level 1 intro with a fresh session
    pub fn restart(&mut self) -> Result<Transition, LevelError> {
        if !self.phase.is_terminal() {
            return Ok(self.reject_phase("restart"));
        }
        log::info!("Session restarting");
        self.collaborator
            .request_effect(Effect::PlaySound(Sound::Touch));
        self.state.reset(self.tuning.starting_lives);
        self.summary = None;
        self.enter_level(1)?;
        Ok(Transition::Applied)
    }

    /// GameOver / GameComplete → Idle (main menu)
    pub fn return_to_menu(&mut self) -> Transition {
        if !self.phase.is_terminal() {
            return self.reject_phase("return_to_menu");
        }
        self.collaborator
            .request_effect(Effect::PlaySound(Sound::Touch));
        self.collaborator.request_effect(Effect::FadeTransition {
            direction: FadeDirection::Out,
            duration_ms: self.tuning.fade_ms,
        });
        self.teardown_level();
        self.state.reset(self.tuning.starting_lives);
        self.summary = None;
        self.set_phase(SessionPhase::Idle);
        Transition::Applied
    }

    // === Internals ===

    fn set_phase(&mut self, phase: SessionPhase) {
        if self.phase != phase {
            log::info!(
                "Level {}: {:?} -> {:?}",
                self.state.level_index,
                self.phase,
                phase
            );
            self.phase = phase;
        }
    }

    fn reject_phase(&self, event: &str) -> Transition {
        log::debug!("Ignoring {} in {:?}", event, self.phase);
        Transition::Ignored(Rejection::InvalidState(self.phase))
    }

    fn push_hud(&mut self) {
        let hud = self.state.hud();
        self.collaborator.update_hud(&hud);
    }

    fn spawn_point(&self) -> Vec2 {
        self.level
            .as_ref()
            .map(|level| level.spawn_or(self.tuning.spawn))
            .unwrap_or(self.tuning.spawn)
    }

    fn teardown_level(&mut self) {
        self.timers.discard_all(&mut self.collaborator);
        self.level = None;
        self.enemies.clear();
        self.bounds.clear();
        self.collected.clear();
    }

    /// Load `index` and show its intro. On failure the session is aborted to Idle.
    fn enter_level(&mut self, index: u32) -> Result<(), LevelError> {
        self.teardown_level();

        let level = match self.levels.load(index) {
            Ok(level) => level,
            Err(err) => {
                log::error!("Failed to load level {}: {}", index, err);
                self.collaborator.request_effect(Effect::LoadFailed {
                    level_index: index,
                    reason: err.to_string(),
                });
                self.set_phase(SessionPhase::Idle);
                return Err(err);
            }
        };

        self.bounds = level
            .platforms()
            .iter()
            .map(|platform| PatrolBounds::from_tuning(platform, &self.tuning))
            .collect();
        self.enemies = level
            .enemies()
            .iter()
            .enumerate()
            .map(|(i, spawn)| EnemyAgent::new(EnemyId(i as u32), spawn))
            .collect();
        self.state
            .enter_level(level.stars_total(), level.checkpoint_required());
        self.player = PlayerState::spawned_at(level.spawn_or(self.tuning.spawn));
        self.level = Some(level);

        self.collaborator.request_effect(Effect::FadeTransition {
            direction: FadeDirection::In,
            duration_ms: self.tuning.fade_ms,
        });
        self.collaborator
            .request_effect(Effect::banner(format!("Level {}", index), self.tuning.intro_ms));
        self.push_hud();
        self.timers.schedule(
            &mut self.collaborator,
            self.tuning.intro_ms,
            TimerPurpose::IntroFinished,
        );
        self.set_phase(SessionPhase::LevelIntro);
        Ok(())
    }

    fn kill_player(&mut self, event: &str) -> Transition {
        if self.phase != SessionPhase::Playing {
            return self.reject_phase(event);
        }

        self.player.alive = false;
        self.player.invulnerable = true;
        self.state.lives = self.state.lives.saturating_sub(1);
        log::info!(
            "Player died ({}) on level {}, {} lives left",
            event,
            self.state.level_index,
            self.state.lives
        );

        self.collaborator
            .request_effect(Effect::PlaySound(Sound::GameOver));
        self.collaborator.request_effect(Effect::SpawnParticles {
            kind: ParticleKind::Death,
            position: self.player.pos,
        });
        self.collaborator.request_effect(Effect::ShakeCamera {
            duration_ms: self.tuning.shake_ms,
            intensity: self.tuning.shake_intensity,
        });
        self.push_hud();
        self.timers
            .discard(&mut self.collaborator, TimerPurpose::InvulnerabilityEnd);
        self.timers.schedule(
            &mut self.collaborator,
            self.tuning.respawn_delay_ms,
            TimerPurpose::RespawnResolved,
        );
        self.set_phase(SessionPhase::PlayerRespawning);
        Transition::Applied
    }

    fn complete_level(&mut self) {
        self.set_phase(SessionPhase::LevelComplete);
        self.collaborator
            .request_effect(Effect::PlaySound(Sound::LevelChange));
        for _ in 0..self.tuning.victory_bursts {
            let position = Vec2::new(
                self.rng.random_range(100.0..900.0),
                self.rng.random_range(100.0..500.0),
            );
            self.collaborator.request_effect(Effect::SpawnParticles {
                kind: ParticleKind::Firework,
                position,
            });
        }
        self.collaborator.request_effect(Effect::banner(
            "Level Complete!",
            self.tuning.level_complete_ms,
        ));
        self.timers.schedule(
            &mut self.collaborator,
            self.tuning.level_complete_ms,
            TimerPurpose::LevelTransition,
        );
    }

    fn finish(&mut self, outcome: SessionOutcome) {
        self.timers.discard_all(&mut self.collaborator);
        let summary = SessionSummary {
            outcome,
            score: self.state.score,
            level_reached: self.state.level_index,
        };
        log::info!(
            "Session over ({:?}): score {}, level {}",
            outcome,
            summary.score,
            summary.level_reached
        );
        self.summary = Some(summary);

        let title = match outcome {
            SessionOutcome::GameOver => "GAME OVER",
            SessionOutcome::GameComplete => "Game Complete!",
        };
        self.collaborator.request_effect(Effect::banner(title, 0));
        self.collaborator.request_effect(Effect::ShowText {
            text: format!("Final Score: {}", summary.score),
            position: Vec2::new(500.0, 380.0),
            duration_ms: 0,
        });
        if outcome == SessionOutcome::GameOver {
            self.collaborator.request_effect(Effect::ShowText {
                text: format!("Level Reached: {}", summary.level_reached),
                position: Vec2::new(500.0, 430.0),
                duration_ms: 0,
            });
        }
        self.set_phase(match outcome {
            SessionOutcome::GameOver => SessionPhase::GameOver,
            SessionOutcome::GameComplete => SessionPhase::GameComplete,
        });
    }

    fn end_invulnerability(&mut self) -> Transition {
        if !self.player.alive {
            return Transition::Ignored(Rejection::InvalidState(self.phase));
        }
        self.player.invulnerable = false;
        log::debug!("Invulnerability ended");
        Transition::Applied
    }

    fn patrol_active(&self) -> bool {
        matches!(
            self.phase,
            SessionPhase::LevelIntro
                | SessionPhase::Playing
                | SessionPhase::LevelComplete
                | SessionPhase::PlayerRespawning
        )
    }
}

impl<C: Collaborator> EngineEvents for SessionController<C> {
    type Outcome = Transition;

    fn tick(&mut self, input: &TickInput) {
        if !self.patrol_active() {
            return;
        }
        log::trace!("Tick dt={:.4} in {:?}", input.dt, self.phase);

        let mut walls = vec![WallContact::default(); self.enemies.len()];
        for observation in &input.enemies {
            let index = observation.id.0 as usize;
            if let Some(enemy) = self.enemies.get_mut(index) {
                enemy.pos = observation.pos;
                walls[index] = observation.walls;
            } else {
                log::trace!("Observation for unknown enemy {}", observation.id.0);
            }
        }
        for (enemy, walls) in self.enemies.iter_mut().zip(walls) {
            let bounds = &self.bounds[enemy.platform().index()];
            enemy.update(bounds, walls);
        }

        if self.phase != SessionPhase::Playing {
            return;
        }
        if let Some(pos) = input.player_pos {
            self.player.pos = pos;
        }
        if self.player.alive && self.player.pos.y > self.tuning.death_line_y {
            self.on_fell_below_death_line();
        }
    }

    fn on_overlap(&mut self, overlap: Overlap) -> Transition {
        match overlap {
            Overlap::Star(id) => self.on_star_collected(&id),
            Overlap::Enemy(_) => self.on_enemy_contact(),
            Overlap::Checkpoint => self.on_checkpoint_reached(),
        }
    }

    fn timer_fired(&mut self, handle: TimerHandle) -> Transition {
        let Some(purpose) = self.timers.take(handle) else {
            log::debug!("Ignoring stale timer {:?}", handle);
            return Transition::Ignored(Rejection::StaleTimer);
        };
        match purpose {
            TimerPurpose::IntroFinished => self.intro_finished(),
            TimerPurpose::RespawnResolved => self.respawn_resolved(),
            TimerPurpose::InvulnerabilityEnd => self.end_invulnerability(),
            TimerPurpose::LevelTransition => match self.level_transition_resolved() {
                Ok(transition) => transition,
                Err(_) => Transition::Aborted,
            },
        }
    }
}
