//! Animated elements

use crate::path::Position;
use std::fmt;

/// A mounted element the store can move
pub trait CloudElement: Send {
    /// Laid-out height in pixels; zero means not laid out yet
    fn rendered_height(&self) -> f32;

    fn apply_transform(&mut self, transform: &CloudTransform);
}

/// Position plus breathing rotation and scale
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CloudTransform {
    pub position: Position,
    /// Degrees
    pub rotation: f32,
    pub scale: f32,
}

impl CloudTransform {
    pub fn at(position: Position) -> Self {
        Self {
            position,
            rotation: 0.0,
            scale: 1.0,
        }
    }

    /// CSS `transform` value
    pub fn to_css(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CloudTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "translate({:.2}vw, {:.2}vh) rotate({:.2}deg) scale({:.3})",
            self.position.x, self.position.y, self.rotation, self.scale
        )
    }
}
