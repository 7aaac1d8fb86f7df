//! Waypoint loops
//!
//! A loop is a random walk of 15 to 25 steps inside the safe zone. Each step
//! picks one of nine directions (standing still included) and moves up to the
//! movement radius. The last waypoint is the start, so the loop closes.

use crate::config::MotionConfig;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Position in viewport percent
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Clamp into `[lo, hi]` on each axis
    pub fn clamped(self, x: [f32; 2], y: [f32; 2]) -> Self {
        Self {
            x: self.x.clamp(x[0], x[1]),
            y: self.y.clamp(y[0], y[1]),
        }
    }
}

const DIRECTIONS: [(f32, f32); 9] = [
    (0.0, 0.0),
    (1.0, 0.0),
    (-1.0, 0.0),
    (0.0, 1.0),
    (0.0, -1.0),
    (1.0, 1.0),
    (1.0, -1.0),
    (-1.0, 1.0),
    (-1.0, -1.0),
];

fn uniform(rng: &mut impl Rng, [lo, hi]: [f32; 2]) -> f32 {
    if hi > lo {
        rng.random_range(lo..=hi)
    } else {
        lo
    }
}

/// Uniformly random point inside the bounds
pub fn random_position(config: &MotionConfig, rng: &mut impl Rng) -> Position {
    let (x, y) = config.bounds();
    Position::new(uniform(rng, x), uniform(rng, y))
}

/// Closed loop of waypoints starting (and ending) at `start`.
///
/// `jitter` is a horizontal reach in pixels added to every step on top of
/// the random walk.
pub fn generate_loop(
    start: Position,
    jitter: f32,
    config: &MotionConfig,
    rng: &mut impl Rng,
) -> Vec<Position> {
    let (bx, by) = config.bounds();
    let start = start.clamped(bx, by);

    let min_steps = config.min_steps.max(2);
    let max_steps = config.max_steps.max(min_steps);
    let steps = rng.random_range(min_steps..=max_steps);

    let width = config.viewport.width.max(1.0);
    let height = config.viewport.height.max(1.0);

    let mut waypoints = Vec::with_capacity(steps);
    let mut current = start;
    for _ in 0..steps {
        let (dx, dy) = DIRECTIONS[rng.random_range(0..DIRECTIONS.len())];
        let distance = rng.random_range(0.0..=config.movement_radius.max(0.0));
        let reach = jitter.max(0.0) * rng.random_range(0.5..=1.0);
        let wobble = (rng.random::<f32>() - 0.5) * reach * 0.1;

        current = Position::new(
            current.x + dx * distance / width * 100.0 + wobble / width * 100.0,
            current.y + dy * distance / height * 100.0,
        )
        .clamped(bx, by);
        waypoints.push(current);
    }

    if let Some(last) = waypoints.last_mut() {
        *last = start;
    }
    waypoints
}
