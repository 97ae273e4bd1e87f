//! Enemy patrol AI
//!
//! An enemy walks back and forth along the platform it is bound to, turning a
//! little before each edge so it never hangs off. The decision is a pure
//! function of position, platform bounds, speed and the previous direction;
//! [`EnemyAgent`] only carries the direction between ticks.

use glam::Vec2;
use serde::Serialize;

use crate::level::{EnemySpawn, PlatformExtent, PlatformId};
use crate::tuning::Tuning;

/// Horizontal heading of a patrolling enemy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Direction {
    Left,
    #[default]
    Right,
}

impl Direction {
    /// -1.0 for left, +1.0 for right
    pub fn sign(self) -> f32 {
        match self {
            Direction::Left => -1.0,
            Direction::Right => 1.0,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

/// World-bound contact reported by the physics engine this tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WallContact {
    pub left: bool,
    pub right: bool,
}

impl WallContact {
    pub fn any(self) -> bool {
        self.left || self.right
    }
}

/// Turning points for one platform
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatrolBounds {
    /// Enemy turns right at or left of this x
    pub left: f32,
    /// Enemy turns left at or right of this x
    pub right: f32,
    pub top_y: f32,
    pub band_above: f32,
    pub band_below: f32,
}

impl PatrolBounds {
    /// Inset the platform edges by `margin` on each side
    pub fn with_margin(platform: &PlatformExtent, margin: f32) -> Self {
        Self {
            left: platform.left() + margin,
            right: platform.right() - margin,
            top_y: platform.top_y,
            band_above: f32::INFINITY,
            band_below: f32::INFINITY,
        }
    }

    pub fn from_tuning(platform: &PlatformExtent, tuning: &Tuning) -> Self {
        Self {
            band_above: tuning.platform_band_above,
            band_below: tuning.platform_band_below,
            ..Self::with_margin(platform, tuning.patrol_margin(platform.half_width))
        }
    }

    /// Whether an enemy at height `y` is standing on (or just above) the platform
    pub fn supports(&self, y: f32) -> bool {
        y >= self.top_y - self.band_above && y <= self.top_y + self.band_below
    }
}

/// Result of one patrol decision
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatrolStep {
    pub direction: Direction,
    pub velocity_x: f32,
}

/// Decide heading and horizontal velocity for one tick
///
/// A wall contact always flips. Otherwise edges only apply while the enemy is
/// on its platform; a falling enemy keeps its heading.
pub fn patrol_step(
    pos: Vec2,
    bounds: &PatrolBounds,
    speed: f32,
    direction: Direction,
    walls: WallContact,
) -> PatrolStep {
    let direction = if walls.any() {
        direction.flipped()
    } else if !bounds.supports(pos.y) {
        direction
    } else if pos.x <= bounds.left {
        Direction::Right
    } else if pos.x >= bounds.right {
        Direction::Left
    } else {
        direction
    };

    PatrolStep {
        direction,
        velocity_x: direction.sign() * speed,
    }
}

/// Stable enemy id within a level (spawn order)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct EnemyId(pub u32);

/// A patrolling enemy
#[derive(Debug, Clone, PartialEq)]
pub struct EnemyAgent {
    pub id: EnemyId,
    /// Last position reported by the engine
    pub pos: Vec2,
    pub speed: f32,
    platform: PlatformId,
    direction: Direction,
}

impl EnemyAgent {
    /// Enemies start heading right at full speed
    pub fn new(id: EnemyId, spawn: &EnemySpawn) -> Self {
        Self {
            id,
            pos: spawn.pos,
            speed: spawn.speed,
            platform: spawn.platform,
            direction: Direction::Right,
        }
    }

    pub fn platform(&self) -> PlatformId {
        self.platform
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn velocity_x(&self) -> f32 {
        self.direction.sign() * self.speed
    }

    /// Run one patrol decision and return the new horizontal velocity
    pub fn update(&mut self, bounds: &PatrolBounds, walls: WallContact) -> f32 {
        let step = patrol_step(self.pos, bounds, self.speed, self.direction, walls);
        if step.direction != self.direction {
            log::trace!(
                "Enemy {} turned {:?} at x={:.1}",
                self.id.0,
                step.direction,
                self.pos.x
            );
        }
        self.direction = step.direction;
        step.velocity_x
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::{EnemySpec, Level, LevelSpec};

    fn bound_spawn() -> EnemySpawn {
        let spec = LevelSpec {
            platforms: vec![PlatformExtent::new(500.0, 45.0, 400.0)],
            enemies: vec![EnemySpec {
                x: 500.0,
                y: 380.0,
                speed: 60.0,
                platform_index: 0,
            }],
            ..Default::default()
        };
        Level::load(1, &spec).unwrap().enemies()[0]
    }

    fn test_bounds() -> PatrolBounds {
        // Platform at x=500, half-width 45, 10% margin
        PatrolBounds::with_margin(&PlatformExtent::new(500.0, 45.0, 400.0), 4.5)
    }

    #[test]
    fn test_bounds_inset() {
        let bounds = test_bounds();
        assert!((bounds.left - 459.5).abs() < 1e-4);
        assert!((bounds.right - 540.5).abs() < 1e-4);
    }

    #[test]
    fn test_turns_exactly_at_right_edge() {
        let bounds = test_bounds();
        let none = WallContact::default();

        let step = patrol_step(Vec2::new(540.4, 380.0), &bounds, 60.0, Direction::Right, none);
        assert_eq!(step.direction, Direction::Right);
        assert_eq!(step.velocity_x, 60.0);

        let step = patrol_step(Vec2::new(540.5, 380.0), &bounds, 60.0, Direction::Right, none);
        assert_eq!(step.direction, Direction::Left);
        assert_eq!(step.velocity_x, -60.0);
    }

    #[test]
    fn test_turns_exactly_at_left_edge() {
        let bounds = test_bounds();
        let none = WallContact::default();

        let step = patrol_step(Vec2::new(459.6, 380.0), &bounds, 60.0, Direction::Left, none);
        assert_eq!(step.direction, Direction::Left);

        let step = patrol_step(Vec2::new(459.5, 380.0), &bounds, 60.0, Direction::Left, none);
        assert_eq!(step.direction, Direction::Right);
        assert_eq!(step.velocity_x, 60.0);
    }

    #[test]
    fn test_wall_contact_flips_even_mid_platform() {
        let bounds = test_bounds();
        let walls = WallContact {
            left: false,
            right: true,
        };
        let step = patrol_step(Vec2::new(500.0, 380.0), &bounds, 60.0, Direction::Right, walls);
        assert_eq!(step.direction, Direction::Left);
    }

    #[test]
    fn test_off_platform_keeps_heading() {
        let mut bounds = test_bounds();
        bounds.band_above = 50.0;
        bounds.band_below = 10.0;
        // Falling well below the platform top, past the right edge
        let step = patrol_step(Vec2::new(560.0, 450.0), &bounds, 60.0, Direction::Right, WallContact::default());
        assert_eq!(step.direction, Direction::Right);
        // Same x while standing on it turns around
        let step = patrol_step(Vec2::new(560.0, 380.0), &bounds, 60.0, Direction::Right, WallContact::default());
        assert_eq!(step.direction, Direction::Left);
    }

    #[test]
    fn test_patrol_is_periodic() {
        // Integrate the way the engine would: x += vx * dt
        let bounds = test_bounds();
        let mut enemy = EnemyAgent::new(EnemyId(0), &bound_spawn());
        // Power-of-two step keeps positions exact
        let dt = 1.0 / 64.0;

        let mut turns: Vec<(u32, Direction, f32)> = Vec::new();
        let mut last = enemy.direction();
        for tick in 0..2000 {
            let vx = enemy.update(&bounds, WallContact::default());
            assert_eq!(vx.abs(), enemy.speed);
            if enemy.direction() != last {
                turns.push((tick, enemy.direction(), enemy.pos.x));
                last = enemy.direction();
            }
            enemy.pos.x += vx * dt;
        }

        assert!(turns.len() > 10);
        // First turn happens at the right edge
        assert_eq!(turns[0].1, Direction::Left);
        assert!(turns[0].2 >= 540.5);
        for pair in turns.windows(2) {
            assert_ne!(pair[0].1, pair[1].1, "turns must alternate");
            match pair[1].1 {
                Direction::Left => assert!(pair[1].2 >= 540.5),
                Direction::Right => assert!(pair[1].2 <= 459.5),
            }
        }
        // Constant period between same-direction turns
        let periods: Vec<u32> = turns.windows(3).map(|w| w[2].0 - w[0].0).collect();
        assert!(periods.iter().all(|p| *p == periods[0]));
    }
}
