//! Theme kinds, user preference values, and palette bundles

use crate::error::ThemeError;
use crate::tokens::ColorPalette;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A theme that can actually be applied
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeKind {
    Light,
    #[default]
    Dark,
}

impl ThemeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ThemeKind::Light => "light",
            ThemeKind::Dark => "dark",
        }
    }

    /// Flip between light and dark
    pub fn toggle(self) -> Self {
        match self {
            ThemeKind::Light => ThemeKind::Dark,
            ThemeKind::Dark => ThemeKind::Light,
        }
    }

    pub fn from_prefers_dark(prefers_dark: bool) -> Self {
        if prefers_dark {
            ThemeKind::Dark
        } else {
            ThemeKind::Light
        }
    }

    /// CSS class marking the document root
    pub fn css_class(self) -> &'static str {
        match self {
            ThemeKind::Light => "theme-light",
            ThemeKind::Dark => "theme-dark",
        }
    }
}

impl fmt::Display for ThemeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the user asked for; `System` defers to the OS signal
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Light,
    Dark,
    #[default]
    System,
}

impl ThemeMode {
    pub const ALL: [ThemeMode; 3] = [ThemeMode::Light, ThemeMode::Dark, ThemeMode::System];

    pub fn as_str(self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
            ThemeMode::System => "system",
        }
    }

    /// The explicit theme, if this is not `System`
    pub fn explicit(self) -> Option<ThemeKind> {
        match self {
            ThemeMode::Light => Some(ThemeKind::Light),
            ThemeMode::Dark => Some(ThemeKind::Dark),
            ThemeMode::System => None,
        }
    }
}

impl From<ThemeKind> for ThemeMode {
    fn from(kind: ThemeKind) -> Self {
        match kind {
            ThemeKind::Light => ThemeMode::Light,
            ThemeKind::Dark => ThemeMode::Dark,
        }
    }
}

impl FromStr for ThemeMode {
    type Err = ThemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ThemeMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| ThemeError::InvalidTheme(s.to_string()))
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the effective theme came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreferenceSource {
    User,
    System,
}

/// The preference currently in force
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemePreference {
    pub source: PreferenceSource,
    pub value: ThemeMode,
}

/// Light/dark palette pair
#[derive(Clone, Debug, PartialEq)]
pub struct ThemeBundle {
    pub name: String,
    pub light: ColorPalette,
    pub dark: ColorPalette,
}

impl ThemeBundle {
    pub fn new(name: impl Into<String>, light: ColorPalette, dark: ColorPalette) -> Self {
        Self {
            name: name.into(),
            light,
            dark,
        }
    }

    /// Default "Acima das Nuvens" palettes
    pub fn nuvens() -> Self {
        crate::themes::nuvens::bundle()
    }

    pub fn for_kind(&self, kind: ThemeKind) -> &ColorPalette {
        match kind {
            ThemeKind::Light => &self.light,
            ThemeKind::Dark => &self.dark,
        }
    }
}

impl Default for ThemeBundle {
    fn default() -> Self {
        Self::nuvens()
    }
}
