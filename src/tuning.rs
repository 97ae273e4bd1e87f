//! Game balance and timing
//!
//! Every number the session core needs comes from here so a host can ship a
//! JSON override without recompiling. Missing fields fall back to [`crate::consts`].

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Data-driven tuning for a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Session ===
    /// Lives granted at session start and on restart
    pub starting_lives: u8,
    /// Score per collected star
    pub star_reward: u64,

    // === Player ===
    /// Player dies once its y exceeds this line
    pub death_line_y: f32,
    /// Default spawn point (levels may override)
    pub spawn: Vec2,

    // === Patrol ===
    /// Inset from platform edges as a fraction of half-width
    pub patrol_margin_ratio: f32,
    /// How far above the platform top an enemy still counts as on it
    pub platform_band_above: f32,
    /// How far below the platform top an enemy still counts as on it
    pub platform_band_below: f32,

    // === Timers (milliseconds) ===
    pub intro_ms: u32,
    pub level_complete_ms: u32,
    pub respawn_delay_ms: u32,
    pub invulnerability_ms: u32,
    pub fade_ms: u32,
    pub shake_ms: u32,
    pub shake_intensity: f32,

    // === Effects ===
    /// Firework bursts on level clear
    pub victory_bursts: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            starting_lives: STARTING_LIVES,
            star_reward: STAR_REWARD,

            death_line_y: DEATH_LINE_Y,
            spawn: Vec2::new(SPAWN_X, SPAWN_Y),

            patrol_margin_ratio: PATROL_MARGIN_RATIO,
            platform_band_above: PLATFORM_BAND_ABOVE,
            platform_band_below: PLATFORM_BAND_BELOW,

            intro_ms: INTRO_MS,
            level_complete_ms: LEVEL_COMPLETE_MS,
            respawn_delay_ms: RESPAWN_DELAY_MS,
            invulnerability_ms: INVULNERABILITY_MS,
            fade_ms: FADE_MS,
            shake_ms: SHAKE_MS,
            shake_intensity: SHAKE_INTENSITY,

            victory_bursts: VICTORY_BURSTS,
        }
    }
}

impl Tuning {
    /// Parse tuning from JSON; absent fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let tuning: Tuning = serde_json::from_str(json)?;
        Ok(tuning.sanitized())
    }

    /// Clamp values that would break the state machine or patrol math
    pub fn sanitized(mut self) -> Self {
        if self.starting_lives == 0 {
            log::warn!("starting_lives of 0 would end every session at once, using 1");
            self.starting_lives = 1;
        }
        if !(0.0..0.5).contains(&self.patrol_margin_ratio) {
            let clamped = if self.patrol_margin_ratio.is_finite() {
                self.patrol_margin_ratio.clamp(0.0, 0.49)
            } else {
                PATROL_MARGIN_RATIO
            };
            log::warn!(
                "patrol_margin_ratio {} leaves no room to patrol, using {}",
                self.patrol_margin_ratio,
                clamped
            );
            self.patrol_margin_ratio = clamped;
        }
        if !self.death_line_y.is_finite() {
            log::warn!("death_line_y must be finite, using {}", DEATH_LINE_Y);
            self.death_line_y = DEATH_LINE_Y;
        }
        self.platform_band_above = self.platform_band_above.max(0.0);
        self.platform_band_below = self.platform_band_below.max(0.0);
        self
    }

    /// Patrol inset for a platform of the given half-width
    pub fn patrol_margin(&self, half_width: f32) -> f32 {
        half_width * self.patrol_margin_ratio
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_shipped_game() {
        let tuning = Tuning::default();
        assert_eq!(tuning.starting_lives, 3);
        assert_eq!(tuning.star_reward, 10);
        assert_eq!(tuning.spawn, Vec2::new(100.0, 550.0));
        assert!((tuning.patrol_margin(45.0) - 4.5).abs() < 1e-6);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "star_reward": 25, "death_line_y": 800.0 }"#).unwrap();
        assert_eq!(tuning.star_reward, 25);
        assert_eq!(tuning.death_line_y, 800.0);
        assert_eq!(tuning.starting_lives, STARTING_LIVES);
        assert_eq!(tuning.intro_ms, INTRO_MS);
    }

    #[test]
    fn test_sanitize_clamps_bad_values() {
        let tuning = Tuning::from_json(r#"{ "starting_lives": 0, "patrol_margin_ratio": 2.0 }"#)
            .unwrap();
        assert_eq!(tuning.starting_lives, 1);
        assert!(tuning.patrol_margin_ratio < 0.5);
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(Tuning::from_json("{ star_reward: }").is_err());
    }
}
