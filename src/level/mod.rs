//! Level data tables and load-time validation
//!
//! A [`LevelSpec`] is plain data as authored. [`Level::load`] validates it once
//! and produces an immutable arena: platforms are addressed by [`PlatformId`],
//! and every enemy's binding is checked before the level can be played.

use std::collections::HashSet;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::PLATFORM_HALF_WIDTH;
use crate::error::LevelError;

/// Campaign shipped with the game (levels 1-5)
const BUILTIN_LEVELS: &str = include_str!("levels.json");

fn default_half_width() -> f32 {
    PLATFORM_HALF_WIDTH
}

/// Horizontal extent and top of a platform
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlatformExtent {
    #[serde(rename = "x")]
    pub center_x: f32,
    #[serde(default = "default_half_width")]
    pub half_width: f32,
    #[serde(rename = "y")]
    pub top_y: f32,
}

impl PlatformExtent {
    pub fn new(center_x: f32, half_width: f32, top_y: f32) -> Self {
        Self {
            center_x,
            half_width,
            top_y,
        }
    }

    pub fn left(&self) -> f32 {
        self.center_x - self.half_width
    }

    pub fn right(&self) -> f32 {
        self.center_x + self.half_width
    }
}

/// Star placement as authored; ids default to `s1`, `s2`, ... by position in the list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StarSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub x: f32,
    pub y: f32,
}

/// Enemy placement as authored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemySpec {
    pub x: f32,
    pub y: f32,
    pub speed: f32,
    pub platform_index: usize,
}

/// One level as authored
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LevelSpec {
    pub platforms: Vec<PlatformExtent>,
    pub stars: Vec<StarSpec>,
    #[serde(default)]
    pub enemies: Vec<EnemySpec>,
    /// Checkpoint zone position, if the level has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkpoint: Option<Vec2>,
    /// Completion needs the checkpoint as well as every star
    #[serde(default)]
    pub checkpoint_required: bool,
    /// Overrides the tuning spawn point
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spawn: Option<Vec2>,
}

/// Index into a level's platform arena; only [`Level::load`] hands these out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PlatformId(usize);

impl PlatformId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Star {
    pub id: String,
    pub pos: Vec2,
}

/// Enemy placement with its platform binding resolved
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemySpawn {
    pub pos: Vec2,
    pub speed: f32,
    pub platform: PlatformId,
}

/// A validated, immutable level
#[derive(Debug, Clone)]
pub struct Level {
    index: u32,
    platforms: Vec<PlatformExtent>,
    stars: Vec<Star>,
    enemies: Vec<EnemySpawn>,
    checkpoint: Option<Vec2>,
    checkpoint_required: bool,
    spawn: Option<Vec2>,
}

impl Level {
    /// Validate `spec` as level `index` (1-based)
    pub fn load(index: u32, spec: &LevelSpec) -> Result<Self, LevelError> {
        if spec.platforms.is_empty() {
            return Err(LevelError::NoPlatforms { level: index });
        }

        for (i, platform) in spec.platforms.iter().enumerate() {
            if platform.half_width.is_nan() || platform.half_width <= 0.0 {
                return Err(LevelError::NonPositiveHalfWidth {
                    level: index,
                    platform: i,
                    half_width: platform.half_width,
                });
            }
        }

        let mut seen = HashSet::new();
        let mut stars = Vec::with_capacity(spec.stars.len());
        for (i, star) in spec.stars.iter().enumerate() {
            let id = star.id.clone().unwrap_or_else(|| format!("s{}", i + 1));
            if !seen.insert(id.clone()) {
                return Err(LevelError::DuplicateStarId { level: index, id });
            }
            stars.push(Star {
                id,
                pos: Vec2::new(star.x, star.y),
            });
        }

        let mut enemies = Vec::with_capacity(spec.enemies.len());
        for (i, enemy) in spec.enemies.iter().enumerate() {
            if enemy.platform_index >= spec.platforms.len() {
                return Err(LevelError::InvalidPlatformReference {
                    level: index,
                    enemy: i,
                    platform: enemy.platform_index,
                    platform_count: spec.platforms.len(),
                });
            }
            if !enemy.speed.is_finite() || enemy.speed < 0.0 {
                return Err(LevelError::InvalidEnemySpeed {
                    level: index,
                    enemy: i,
                    speed: enemy.speed,
                });
            }
            enemies.push(EnemySpawn {
                pos: Vec2::new(enemy.x, enemy.y),
                speed: enemy.speed,
                platform: PlatformId(enemy.platform_index),
            });
        }

        if spec.checkpoint_required && spec.checkpoint.is_none() {
            return Err(LevelError::MissingCheckpoint { level: index });
        }

        log::info!(
            "Level {}: {} platforms, {} stars, {} enemies{}",
            index,
            spec.platforms.len(),
            stars.len(),
            enemies.len(),
            if spec.checkpoint_required {
                ", checkpoint required"
            } else {
                ""
            }
        );

        Ok(Self {
            index,
            platforms: spec.platforms.clone(),
            stars,
            enemies,
            checkpoint: spec.checkpoint,
            checkpoint_required: spec.checkpoint_required,
            spawn: spec.spawn,
        })
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    /// Resolve a platform id handed out by this level
    pub fn platform(&self, id: PlatformId) -> &PlatformExtent {
        &self.platforms[id.0]
    }

    pub fn platforms(&self) -> &[PlatformExtent] {
        &self.platforms
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    pub fn star(&self, id: &str) -> Option<&Star> {
        self.stars.iter().find(|s| s.id == id)
    }

    pub fn stars_total(&self) -> u32 {
        self.stars.len() as u32
    }

    pub fn enemies(&self) -> &[EnemySpawn] {
        &self.enemies
    }

    pub fn checkpoint(&self) -> Option<Vec2> {
        self.checkpoint
    }

    pub fn checkpoint_required(&self) -> bool {
        self.checkpoint_required
    }

    /// Level spawn point, falling back to `default`
    pub fn spawn_or(&self, default: Vec2) -> Vec2 {
        self.spawn.unwrap_or(default)
    }
}

/// Ordered campaign of levels
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LevelSet {
    pub levels: Vec<LevelSpec>,
}

impl LevelSet {
    pub fn new(levels: Vec<LevelSpec>) -> Self {
        Self { levels }
    }

    /// The five-level campaign bundled with the crate
    pub fn builtin() -> Result<Self, LevelError> {
        Self::from_json(BUILTIN_LEVELS)
    }

    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Highest playable level index
    pub fn max_level(&self) -> u32 {
        self.levels.len() as u32
    }

    /// Load and validate level `index` (1-based)
    pub fn load(&self, index: u32) -> Result<Level, LevelError> {
        let spec = index
            .checked_sub(1)
            .and_then(|i| self.levels.get(i as usize))
            .ok_or(LevelError::LevelNotFound(index))?;
        Level::load(index, spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::MAX_LEVEL;

    fn spec_with_enemy(platform_index: usize) -> LevelSpec {
        LevelSpec {
            platforms: vec![PlatformExtent::new(100.0, 45.0, 600.0)],
            stars: vec![StarSpec {
                id: None,
                x: 100.0,
                y: 550.0,
            }],
            enemies: vec![EnemySpec {
                x: 100.0,
                y: 580.0,
                speed: 50.0,
                platform_index,
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_builtin_campaign_validates() {
        let set = LevelSet::builtin().unwrap();
        assert_eq!(set.max_level(), MAX_LEVEL);
        let expected_stars = [5, 7, 8, 10, 15];
        for index in 1..=set.max_level() {
            let level = set.load(index).unwrap();
            assert_eq!(level.stars_total(), expected_stars[index as usize - 1]);
            assert!(!level.checkpoint_required());
        }
    }

    #[test]
    fn test_builtin_platforms_default_half_width() {
        let level = LevelSet::builtin().unwrap().load(1).unwrap();
        assert!(level.platforms().iter().all(|p| p.half_width == PLATFORM_HALF_WIDTH));
        assert_eq!(level.platforms()[0].left(), 55.0);
        assert_eq!(level.platforms()[0].right(), 145.0);
    }

    #[test]
    fn test_star_ids_default_by_position() {
        let level = LevelSet::builtin().unwrap().load(1).unwrap();
        assert_eq!(level.stars()[0].id, "s1");
        assert_eq!(level.star("s5").map(|s| s.pos), Some(Vec2::new(900.0, 150.0)));
        assert!(level.star("s6").is_none());
    }

    #[test]
    fn test_enemy_binding_resolved() {
        let level = Level::load(1, &spec_with_enemy(0)).unwrap();
        let enemy = level.enemies()[0];
        assert_eq!(enemy.platform.index(), 0);
        assert_eq!(level.platform(enemy.platform).center_x, 100.0);
    }

    #[test]
    fn test_invalid_platform_reference() {
        let err = Level::load(2, &spec_with_enemy(3)).unwrap_err();
        assert!(matches!(
            err,
            LevelError::InvalidPlatformReference {
                level: 2,
                enemy: 0,
                platform: 3,
                platform_count: 1
            }
        ));
    }

    #[test]
    fn test_non_positive_half_width() {
        let mut spec = spec_with_enemy(0);
        spec.platforms[0].half_width = 0.0;
        assert!(matches!(
            Level::load(1, &spec),
            Err(LevelError::NonPositiveHalfWidth { platform: 0, .. })
        ));
    }

    #[test]
    fn test_duplicate_star_ids() {
        let mut spec = spec_with_enemy(0);
        spec.stars.push(StarSpec {
            id: Some("s1".to_string()),
            x: 0.0,
            y: 0.0,
        });
        assert!(matches!(
            Level::load(1, &spec),
            Err(LevelError::DuplicateStarId { .. })
        ));
    }

    #[test]
    fn test_negative_speed_rejected() {
        let mut spec = spec_with_enemy(0);
        spec.enemies[0].speed = -5.0;
        assert!(matches!(
            Level::load(1, &spec),
            Err(LevelError::InvalidEnemySpeed { .. })
        ));
    }

    #[test]
    fn test_required_checkpoint_must_exist() {
        let mut spec = spec_with_enemy(0);
        spec.checkpoint_required = true;
        assert!(matches!(
            Level::load(1, &spec),
            Err(LevelError::MissingCheckpoint { level: 1 })
        ));
        spec.checkpoint = Some(Vec2::new(500.0, 300.0));
        assert!(Level::load(1, &spec).is_ok());
    }

    #[test]
    fn test_level_not_found() {
        let set = LevelSet::builtin().unwrap();
        assert!(matches!(set.load(0), Err(LevelError::LevelNotFound(0))));
        assert!(matches!(set.load(6), Err(LevelError::LevelNotFound(6))));
    }

    #[test]
    fn test_checkpoint_fields_parse() {
        let json = r#"{
            "levels": [{
                "platforms": [{ "x": 500, "y": 400, "half_width": 60 }],
                "stars": [{ "id": "gem", "x": 500, "y": 350 }],
                "checkpoint": [800.0, 300.0],
                "checkpoint_required": true,
                "spawn": [50.0, 500.0]
            }]
        }"#;
        let set = LevelSet::from_json(json).unwrap();
        let level = set.load(1).unwrap();
        assert!(level.checkpoint_required());
        assert_eq!(level.checkpoint(), Some(Vec2::new(800.0, 300.0)));
        assert_eq!(level.spawn_or(Vec2::ZERO), Vec2::new(50.0, 500.0));
        assert_eq!(level.platforms()[0].half_width, 60.0);
        assert!(level.star("gem").is_some());
    }
}
