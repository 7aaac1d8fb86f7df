//! HSL color model
//!
//! Palettes are authored as CSS `hsl()` text. This module turns that text into
//! [`Hsl`] values, interpolates them along the shorter hue arc, and formats them
//! back. Parsing never panics: [`parse_color`] returns `None` for anything it
//! cannot read, which callers treat as "apply instantly, do not interpolate".

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Tolerance used by [`Hsl::approx_eq`]
const EPSILON: f32 = 1e-3;

/// Errors produced when reading color text
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ColorError {
    /// Input is not an `hsl()` / `hsla()` function
    #[error("not an hsl color: {0:?}")]
    NotHsl(String),

    /// Wrong number of components inside the parentheses
    #[error("expected 3 or 4 components, found {found}")]
    ComponentCount { found: usize },

    /// A component could not be read as a finite number
    #[error("invalid {name} component: {value:?}")]
    InvalidComponent { name: &'static str, value: String },
}

/// A color in HSL space.
///
/// `h` is degrees in `[0, 360)`, `s` and `l` are percentages in `[0, 100]`,
/// `a` is alpha in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Hsl {
    pub h: f32,
    pub s: f32,
    pub l: f32,
    pub a: f32,
}

impl Hsl {
    pub const fn new(h: f32, s: f32, l: f32) -> Self {
        Self { h, s, l, a: 1.0 }
    }

    pub const fn with_alpha(mut self, alpha: f32) -> Self {
        self.a = alpha;
        self
    }

    /// Wrap hue into `[0, 360)` and clamp the remaining channels
    pub fn normalized(self) -> Self {
        Self {
            h: self.h.rem_euclid(360.0),
            s: self.s.clamp(0.0, 100.0),
            l: self.l.clamp(0.0, 100.0),
            a: self.a.clamp(0.0, 1.0),
        }
    }

    pub fn is_opaque(&self) -> bool {
        self.a >= 1.0
    }

    /// Compare by value, treating hue 0° and 360° as the same angle
    pub fn approx_eq(&self, other: &Hsl) -> bool {
        let dh = (self.h - other.h).abs().rem_euclid(360.0);
        dh.min(360.0 - dh) < EPSILON
            && (self.s - other.s).abs() < EPSILON
            && (self.l - other.l).abs() < EPSILON
            && (self.a - other.a).abs() < EPSILON
    }

    /// Interpolate toward `to`; hue takes the shorter arc
    pub fn lerp(from: &Hsl, to: &Hsl, t: f32) -> Hsl {
        let mut dh = to.h - from.h;
        if dh > 180.0 {
            dh -= 360.0;
        } else if dh < -180.0 {
            dh += 360.0;
        }

        Hsl {
            h: (from.h + dh * t).rem_euclid(360.0),
            s: from.s + (to.s - from.s) * t,
            l: from.l + (to.l - from.l) * t,
            a: from.a + (to.a - from.a) * t,
        }
    }

    /// CSS text form, alpha omitted when opaque
    pub fn to_css(&self) -> String {
        if self.is_opaque() {
            format!(
                "hsl({}, {}%, {}%)",
                fmt_component(self.h),
                fmt_component(self.s),
                fmt_component(self.l)
            )
        } else {
            format!(
                "hsla({}, {}%, {}%, {})",
                fmt_component(self.h),
                fmt_component(self.s),
                fmt_component(self.l),
                fmt_component(self.a)
            )
        }
    }
}

impl fmt::Display for Hsl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}

impl FromStr for Hsl {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim().to_ascii_lowercase();

        let inner = text
            .strip_prefix("hsla(")
            .or_else(|| text.strip_prefix("hsl("))
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(|| ColorError::NotHsl(s.to_string()))?;

        // Modern syntax puts alpha after a slash: hsl(120 50% 50% / 0.5)
        let (channels, slash_alpha) = match inner.split_once('/') {
            Some((main, alpha)) => (main, Some(alpha.trim())),
            None => (inner, None),
        };

        let parts: Vec<&str> = channels
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|p| !p.is_empty())
            .collect();

        let alpha_text = match (parts.len(), slash_alpha) {
            (3, alpha) => alpha,
            (4, None) => Some(parts[3]),
            (found, _) => return Err(ColorError::ComponentCount { found }),
        };

        let h = parse_number("hue", parts[0].trim_end_matches("deg"))?;
        let s = parse_number("saturation", parts[1].trim_end_matches('%'))?;
        let l = parse_number("lightness", parts[2].trim_end_matches('%'))?;
        let a = match alpha_text {
            Some(raw) => match raw.strip_suffix('%') {
                Some(pct) => parse_number("alpha", pct)? / 100.0,
                None => parse_number("alpha", raw)?,
            },
            None => 1.0,
        };

        Ok(Hsl { h, s, l, a }.normalized())
    }
}

impl TryFrom<String> for Hsl {
    type Error = ColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Hsl> for String {
    fn from(color: Hsl) -> Self {
        color.to_css()
    }
}

fn parse_number(name: &'static str, raw: &str) -> Result<f32, ColorError> {
    raw.trim()
        .parse::<f32>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ColorError::InvalidComponent {
            name,
            value: raw.to_string(),
        })
}

/// At most two decimals, no trailing zeros
fn fmt_component(value: f32) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded.fract() == 0.0 {
        format!("{}", rounded as i64)
    } else {
        format!("{}", rounded)
    }
}

/// Parse `hsl(...)` / `hsla(...)` text, `None` when it cannot be interpolated
pub fn parse_color(s: &str) -> Option<Hsl> {
    s.parse().ok()
}

/// Interpolate between two colors; `t` is expected to be pre-eased
pub fn interpolate(from: &Hsl, to: &Hsl, t: f32) -> Hsl {
    Hsl::lerp(from, to, t)
}

/// Format a color as CSS text
pub fn format_color(color: &Hsl) -> String {
    color.to_css()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_legacy_comma_syntax() {
        let c = parse_color("hsl(162, 100%, 10%)").unwrap();
        assert_eq!(c, Hsl::new(162.0, 100.0, 10.0));
    }

    #[test]
    fn parses_alpha_forms() {
        let a = parse_color("hsla(273, 92%, 50%, 0.5)").unwrap();
        assert_eq!(a.a, 0.5);

        let b = parse_color("HSL(273deg 92% 50% / 25%)").unwrap();
        assert_eq!(b.a, 0.25);
        assert_eq!(b.h, 273.0);
    }

    #[test]
    fn wraps_hue_and_clamps_channels() {
        let c = parse_color("hsl(-30, 120%, 50%)").unwrap();
        assert_eq!(c.h, 330.0);
        assert_eq!(c.s, 100.0);
    }

    #[test]
    fn malformed_input_is_none() {
        assert_eq!(parse_color("rgba(0, 0, 0, 0.87)"), None);
        assert_eq!(parse_color("hsl(10, 20%)"), None);
        assert_eq!(parse_color("hsl(ten, 20%, 30%)"), None);
        assert_eq!(parse_color("hsl(10, 20%, 30%"), None);
        assert_eq!(parse_color(""), None);
    }

    #[test]
    fn error_kinds_are_specific() {
        assert_eq!(
            "hsl(1, 2%)".parse::<Hsl>(),
            Err(ColorError::ComponentCount { found: 2 })
        );
        assert!(matches!(
            "hsl(1, x%, 3%)".parse::<Hsl>(),
            Err(ColorError::InvalidComponent {
                name: "saturation",
                ..
            })
        ));
    }

    #[test]
    fn formats_without_alpha_when_opaque() {
        assert_eq!(
            format_color(&Hsl::new(162.0, 100.0, 10.0)),
            "hsl(162, 100%, 10%)"
        );
        assert_eq!(
            format_color(&Hsl::new(10.5, 20.0, 30.0).with_alpha(0.5)),
            "hsla(10.5, 20%, 30%, 0.5)"
        );
    }

    #[test]
    fn hue_takes_shorter_arc() {
        let from = Hsl::new(350.0, 50.0, 50.0);
        let to = Hsl::new(10.0, 50.0, 50.0);
        let mid = interpolate(&from, &to, 0.5);
        assert!(mid.h < 0.01 || mid.h > 359.99, "hue was {}", mid.h);

        let back = interpolate(&to, &from, 0.5);
        assert!(back.h < 0.01 || back.h > 359.99, "hue was {}", back.h);
    }

    #[test]
    fn saturation_and_lightness_are_linear() {
        let from = Hsl::new(100.0, 0.0, 10.0);
        let to = Hsl::new(100.0, 100.0, 90.0);
        let q = interpolate(&from, &to, 0.25);
        assert_eq!(q.s, 25.0);
        assert_eq!(q.l, 30.0);
    }

    #[test]
    fn approx_eq_treats_zero_and_360_alike() {
        assert!(Hsl::new(0.0, 50.0, 50.0).approx_eq(&Hsl::new(359.9999, 50.0, 50.0)));
        assert!(!Hsl::new(0.0, 50.0, 50.0).approx_eq(&Hsl::new(0.0, 50.0, 51.0)));
    }
}
