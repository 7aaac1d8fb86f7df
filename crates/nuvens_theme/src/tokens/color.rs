//! Color roles and palettes

use nuvens_core::Hsl;
use serde::{Deserialize, Serialize};

/// Semantic color role keys for dynamic access
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColorRole {
    // Core roles
    Text,
    Background,
    Primary,
    Secondary,
    Accent,
    Surface,

    // Text shades
    Text400,
    Text500,
    Text600,
    Text700,

    // Surface variants
    Surface100,
    Surface200,
}

impl ColorRole {
    pub const ALL: [ColorRole; 12] = [
        ColorRole::Text,
        ColorRole::Background,
        ColorRole::Primary,
        ColorRole::Secondary,
        ColorRole::Accent,
        ColorRole::Surface,
        ColorRole::Text400,
        ColorRole::Text500,
        ColorRole::Text600,
        ColorRole::Text700,
        ColorRole::Surface100,
        ColorRole::Surface200,
    ];

    /// Name used in CSS custom properties (`--color-<name>`)
    pub fn css_name(self) -> &'static str {
        match self {
            ColorRole::Text => "text",
            ColorRole::Background => "background",
            ColorRole::Primary => "primary",
            ColorRole::Secondary => "secondary",
            ColorRole::Accent => "accent",
            ColorRole::Surface => "surface",
            ColorRole::Text400 => "text-400",
            ColorRole::Text500 => "text-500",
            ColorRole::Text600 => "text-600",
            ColorRole::Text700 => "text-700",
            ColorRole::Surface100 => "surface-100",
            ColorRole::Surface200 => "surface-200",
        }
    }
}

/// Complete palette for one theme
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColorPalette {
    pub text: Hsl,
    pub background: Hsl,
    pub primary: Hsl,
    pub secondary: Hsl,
    pub accent: Hsl,
    pub surface: Hsl,

    pub text_400: Hsl,
    pub text_500: Hsl,
    pub text_600: Hsl,
    pub text_700: Hsl,

    pub surface_100: Hsl,
    pub surface_200: Hsl,
}

impl ColorPalette {
    /// Get a color by role
    pub fn get(&self, role: ColorRole) -> Hsl {
        match role {
            ColorRole::Text => self.text,
            ColorRole::Background => self.background,
            ColorRole::Primary => self.primary,
            ColorRole::Secondary => self.secondary,
            ColorRole::Accent => self.accent,
            ColorRole::Surface => self.surface,
            ColorRole::Text400 => self.text_400,
            ColorRole::Text500 => self.text_500,
            ColorRole::Text600 => self.text_600,
            ColorRole::Text700 => self.text_700,
            ColorRole::Surface100 => self.surface_100,
            ColorRole::Surface200 => self.surface_200,
        }
    }

    /// Iterate roles with their colors in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (ColorRole, Hsl)> + '_ {
        ColorRole::ALL.into_iter().map(move |role| (role, self.get(role)))
    }

    /// Roles whose colors differ between two palettes
    pub fn changed_roles<'a>(
        &'a self,
        other: &'a ColorPalette,
    ) -> impl Iterator<Item = ColorRole> + 'a {
        ColorRole::ALL
            .into_iter()
            .filter(move |role| !self.get(*role).approx_eq(&other.get(*role)))
    }
}
