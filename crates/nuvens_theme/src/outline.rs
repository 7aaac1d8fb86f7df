//! Text outlines built from `text-shadow`
//!
//! A ring of hard shadows evenly spaced around a circle of the outline
//! radius. Offsets are in `em` so the outline scales with the font; the
//! color comes from a custom property, so a theme switch only rewrites that
//! one variable instead of every shadow list.

use crate::error::ThemeError;
use crate::theme::ThemeKind;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;
use std::fmt;
use std::fmt::Write as _;
use std::str::FromStr;

/// Custom property the presets read their color from
pub const OUTLINE_COLOR_VAR: &str = "--outline-color";

/// Root font size used to turn `em` into pixels when counting shadows
const BASE_FONT_SIZE_PX: f64 = 16.0;

/// Viewports this wide or narrower use the mobile presets
pub const MOBILE_MAX_WIDTH_PX: f32 = 768.0;

/// Outline color for each theme
pub fn outline_color(theme: ThemeKind) -> &'static str {
    match theme {
        ThemeKind::Light => "hsl(145, 35%, 98%)",
        ThemeKind::Dark => "hsl(145, 25%, 8%)",
    }
}

/// Build a `text-shadow` value outlining text by `radius_em`.
///
/// One shadow per pixel of circumference at the root font size, so
/// `ceil(2πr)` shadows for a radius of `r` pixels. Offsets are rounded to
/// three decimals. A radius that is not a positive finite number yields an
/// empty string.
pub fn mathematical_outline(radius_em: f32, color_var: &str, blur_em: f32) -> String {
    if !(radius_em > 0.0 && radius_em.is_finite()) {
        return String::new();
    }
    let radius = f64::from(radius_em);
    let count = shadow_count(radius_em);

    let mut out = String::new();
    for i in 0..count {
        let theta = TAU * i as f64 / count as f64;
        if i > 0 {
            out.push_str(", ");
        }
        let _ = write!(
            out,
            "{}em {}em {}em var({color_var})",
            round3(radius * theta.cos()),
            round3(radius * theta.sin()),
            blur_em
        );
    }
    out
}

/// Shadows [`mathematical_outline`] emits for `radius_em`
pub fn shadow_count(radius_em: f32) -> usize {
    if !(radius_em > 0.0 && radius_em.is_finite()) {
        return 0;
    }
    (TAU * f64::from(radius_em) * BASE_FONT_SIZE_PX).ceil() as usize
}

fn round3(v: f64) -> f64 {
    let r = (v * 1000.0).round() / 1000.0;
    // No "-0em" in the output
    if r == 0.0 {
        0.0
    } else {
        r
    }
}

/// Screen class the presets are tuned for
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutlineContext {
    #[default]
    Desktop,
    Mobile,
}

impl OutlineContext {
    pub fn for_viewport(width_px: f32) -> Self {
        if width_px <= MOBILE_MAX_WIDTH_PX {
            OutlineContext::Mobile
        } else {
            OutlineContext::Desktop
        }
    }
}

/// Named outline styles
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutlinePreset {
    #[default]
    Normal,
    Title,
    TitleBlur,
}

impl OutlinePreset {
    pub const ALL: [OutlinePreset; 3] = [
        OutlinePreset::Normal,
        OutlinePreset::Title,
        OutlinePreset::TitleBlur,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OutlinePreset::Normal => "normal",
            OutlinePreset::Title => "title",
            OutlinePreset::TitleBlur => "title-blur",
        }
    }

    /// Radius and blur in `em`
    pub fn dimensions(self, context: OutlineContext) -> (f32, f32) {
        match (context, self) {
            (OutlineContext::Desktop, OutlinePreset::Normal) => (0.15, 0.0),
            (OutlineContext::Desktop, OutlinePreset::Title) => (0.075, 0.0),
            (OutlineContext::Desktop, OutlinePreset::TitleBlur) => (0.075, 0.05),
            (OutlineContext::Mobile, OutlinePreset::Normal) => (0.33, 0.0),
            (OutlineContext::Mobile, OutlinePreset::Title) => (0.2, 0.0),
            (OutlineContext::Mobile, OutlinePreset::TitleBlur) => (0.2, 0.03),
        }
    }

    /// The `text-shadow` value for this preset, colored by [`OUTLINE_COLOR_VAR`]
    pub fn text_shadow(self, context: OutlineContext) -> String {
        let (radius, blur) = self.dimensions(context);
        mathematical_outline(radius, OUTLINE_COLOR_VAR, blur)
    }
}

impl FromStr for OutlinePreset {
    type Err = ThemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OutlinePreset::ALL
            .into_iter()
            .find(|preset| preset.as_str() == s)
            .ok_or_else(|| ThemeError::InvalidOutlinePreset(s.to_string()))
    }
}

impl fmt::Display for OutlinePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
