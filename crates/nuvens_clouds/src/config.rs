//! Motion configuration

use crate::error::CloudError;
use nuvens_animation::Easing;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Character of the drift
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MotionStyle {
    #[default]
    Gentle,
    Dynamic,
    Elastic,
}

impl MotionStyle {
    pub const ALL: [MotionStyle; 3] = [
        MotionStyle::Gentle,
        MotionStyle::Dynamic,
        MotionStyle::Elastic,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MotionStyle::Gentle => "gentle",
            MotionStyle::Dynamic => "dynamic",
            MotionStyle::Elastic => "elastic",
        }
    }
}

impl fmt::Display for MotionStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MotionStyle {
    type Err = CloudError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MotionStyle::ALL
            .into_iter()
            .find(|style| style.as_str() == s)
            .ok_or_else(|| CloudError::UnknownStyle(s.to_string()))
    }
}

/// Timing and reach of one motion style
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StyleParams {
    /// Time to travel one full waypoint loop at speed 1.0
    pub duration_ms: u64,
    pub easing: Easing,
    /// Horizontal jitter reach in pixels
    pub radius: f32,
    pub delay_min_ms: u64,
    pub delay_max_ms: u64,
}

impl StyleParams {
    pub fn gentle() -> Self {
        Self {
            duration_ms: 12_000,
            easing: Easing::EaseInOutSine,
            radius: 40.0,
            delay_min_ms: 0,
            delay_max_ms: 3_000,
        }
    }

    pub fn dynamic() -> Self {
        Self {
            duration_ms: 8_000,
            easing: Easing::EaseOutCubic,
            radius: 80.0,
            delay_min_ms: 500,
            delay_max_ms: 2_000,
        }
    }

    pub fn elastic() -> Self {
        Self {
            duration_ms: 15_000,
            easing: Easing::EaseOutElastic,
            radius: 60.0,
            delay_min_ms: 1_000,
            delay_max_ms: 4_000,
        }
    }

    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

/// Per-style parameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleTable {
    pub gentle: StyleParams,
    pub dynamic: StyleParams,
    pub elastic: StyleParams,
}

impl StyleTable {
    pub fn get(&self, style: MotionStyle) -> &StyleParams {
        match style {
            MotionStyle::Gentle => &self.gentle,
            MotionStyle::Dynamic => &self.dynamic,
            MotionStyle::Elastic => &self.elastic,
        }
    }
}

impl Default for StyleTable {
    fn default() -> Self {
        Self {
            gentle: StyleParams::gentle(),
            dynamic: StyleParams::dynamic(),
            elastic: StyleParams::elastic(),
        }
    }
}

/// Rectangle clouds stay inside, in viewport percent
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SafeZone {
    pub x: [f32; 2],
    pub y: [f32; 2],
}

impl Default for SafeZone {
    fn default() -> Self {
        Self {
            x: [10.0, 90.0],
            y: [15.0, 85.0],
        }
    }
}

/// Viewport size in pixels
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
        }
    }
}

/// Cloud motion settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    pub safe_zone: SafeZone,
    /// Distance kept from every viewport edge, in percent
    pub margin: f32,
    pub min_steps: usize,
    pub max_steps: usize,
    /// Longest single step, in pixels
    pub movement_radius: f32,
    pub viewport: Viewport,
    pub default_style: MotionStyle,
    pub styles: StyleTable,
    /// Fixed RNG seed for reproducible paths
    pub seed: Option<u64>,
}

impl MotionConfig {
    /// Effective horizontal and vertical bounds: the safe zone shrunk by the margin
    pub fn bounds(&self) -> ([f32; 2], [f32; 2]) {
        let clamp = |[lo, hi]: [f32; 2]| {
            let lo = lo.max(self.margin);
            let hi = hi.min(100.0 - self.margin);
            if lo <= hi {
                [lo, hi]
            } else {
                let mid = (lo + hi) / 2.0;
                [mid, mid]
            }
        };
        (clamp(self.safe_zone.x), clamp(self.safe_zone.y))
    }
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            safe_zone: SafeZone::default(),
            margin: 8.0,
            min_steps: 15,
            max_steps: 25,
            movement_radius: 60.0,
            viewport: Viewport::default(),
            default_style: MotionStyle::Gentle,
            styles: StyleTable::default(),
            seed: None,
        }
    }
}
