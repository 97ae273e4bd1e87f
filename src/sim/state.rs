//! Session and player state
//!
//! Owned by [`super::SessionController`]; the host only ever sees copies.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::events::{CheckpointStatus, HudSnapshot};

/// Current phase of a play session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Menu; no session running
    #[default]
    Idle,
    /// "Level N" banner, gameplay input disabled
    LevelIntro,
    /// Active gameplay
    Playing,
    /// All completion conditions met, waiting for the next level to load
    LevelComplete,
    /// Player is down, waiting for respawn or game over
    PlayerRespawning,
    /// Out of lives
    GameOver,
    /// Last level cleared
    GameComplete,
}

impl SessionPhase {
    /// Phases a session can only leave through restart or the menu
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionPhase::GameOver | SessionPhase::GameComplete)
    }
}

/// Session-wide counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    /// Current level (1-based)
    pub level_index: u32,
    pub lives: u8,
    pub score: u64,
    pub stars_total: u32,
    pub stars_collected: u32,
    pub checkpoint_required: bool,
    pub checkpoint_reached: bool,
}

impl SessionState {
    pub fn new(starting_lives: u8) -> Self {
        Self {
            level_index: 1,
            lives: starting_lives,
            score: 0,
            stars_total: 0,
            stars_collected: 0,
            checkpoint_required: false,
            checkpoint_reached: false,
        }
    }

    /// Back to level 1 with full lives and no score
    pub fn reset(&mut self, starting_lives: u8) {
        *self = Self::new(starting_lives);
    }

    /// Clear per-level progress for a freshly loaded level
    pub fn enter_level(&mut self, stars_total: u32, checkpoint_required: bool) {
        self.stars_total = stars_total;
        self.stars_collected = 0;
        self.checkpoint_required = checkpoint_required;
        self.checkpoint_reached = false;
    }

    pub fn all_stars_collected(&self) -> bool {
        self.stars_collected >= self.stars_total
    }

    /// Stars and (when required) the checkpoint are both done
    pub fn level_cleared(&self) -> bool {
        self.all_stars_collected() && (!self.checkpoint_required || self.checkpoint_reached)
    }

    pub fn checkpoint_status(&self) -> CheckpointStatus {
        if !self.checkpoint_required {
            CheckpointStatus::NotRequired
        } else if self.checkpoint_reached {
            CheckpointStatus::Reached
        } else {
            CheckpointStatus::Pending
        }
    }

    pub fn hud(&self) -> HudSnapshot {
        HudSnapshot {
            score: self.score,
            lives: self.lives,
            level_index: self.level_index,
            stars_collected: self.stars_collected,
            stars_total: self.stars_total,
            checkpoint: self.checkpoint_status(),
        }
    }
}

/// The player as far as the session cares
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub alive: bool,
    /// Enemy contact is ignored while set
    pub invulnerable: bool,
    pub pos: Vec2,
}

impl PlayerState {
    pub fn spawned_at(pos: Vec2) -> Self {
        Self {
            alive: true,
            invulnerable: false,
            pos,
        }
    }

    /// Enemy contact or a fall would kill the player right now
    pub fn can_be_hurt(&self) -> bool {
        self.alive && !self.invulnerable
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionOutcome {
    GameOver,
    GameComplete,
}

/// Final numbers shown on the game-over / game-complete screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub outcome: SessionOutcome,
    pub score: u64,
    pub level_reached: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_star_only_level_clears_on_last_star() {
        let mut state = SessionState::new(3);
        state.enter_level(2, false);
        assert!(!state.level_cleared());
        state.stars_collected = 2;
        assert!(state.level_cleared());
        assert_eq!(state.checkpoint_status(), CheckpointStatus::NotRequired);
    }

    #[test]
    fn test_checkpoint_level_needs_both() {
        let mut state = SessionState::new(3);
        state.enter_level(1, true);
        state.stars_collected = 1;
        assert!(!state.level_cleared());
        assert_eq!(state.checkpoint_status(), CheckpointStatus::Pending);
        state.checkpoint_reached = true;
        assert!(state.level_cleared());
        assert_eq!(state.checkpoint_status(), CheckpointStatus::Reached);
    }

    #[test]
    fn test_enter_level_keeps_session_counters() {
        let mut state = SessionState::new(3);
        state.score = 120;
        state.lives = 2;
        state.stars_collected = 5;
        state.checkpoint_reached = true;
        state.enter_level(7, false);
        assert_eq!(state.score, 120);
        assert_eq!(state.lives, 2);
        assert_eq!(state.stars_collected, 0);
        assert!(!state.checkpoint_reached);
    }

    #[test]
    fn test_player_hurtable() {
        let mut player = PlayerState::spawned_at(Vec2::ZERO);
        assert!(player.can_be_hurt());
        player.invulnerable = true;
        assert!(!player.can_be_hurt());
        player.invulnerable = false;
        player.alive = false;
        assert!(!player.can_be_hurt());
    }
}
