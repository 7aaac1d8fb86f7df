//! "Acima das Nuvens" palettes
//!
//! Teal-green brand hues over a pale mint sky (light) or a deep forest night
//! (dark). Brand colors are shared; text and surfaces invert.

use crate::theme::ThemeBundle;
use crate::tokens::ColorPalette;
use nuvens_core::Hsl;

pub const LIGHT: ColorPalette = ColorPalette {
    text: Hsl::new(162.0, 100.0, 10.0),
    background: Hsl::new(145.0, 100.0, 95.0),
    primary: Hsl::new(164.0, 61.0, 50.0),
    secondary: Hsl::new(290.0, 46.0, 50.0),
    accent: Hsl::new(273.0, 92.0, 50.0),
    surface: Hsl::new(171.0, 28.0, 90.0),

    text_400: Hsl::new(162.0, 100.0, 60.0),
    text_500: Hsl::new(162.0, 100.0, 50.0),
    text_600: Hsl::new(162.0, 100.0, 40.0),
    text_700: Hsl::new(162.0, 100.0, 30.0),

    surface_100: Hsl::new(171.0, 28.0, 90.0),
    surface_200: Hsl::new(171.0, 28.0, 80.0),
};

pub const DARK: ColorPalette = ColorPalette {
    text: Hsl::new(162.0, 100.0, 90.0),
    background: Hsl::new(145.0, 100.0, 5.0),
    primary: Hsl::new(164.0, 61.0, 50.0),
    secondary: Hsl::new(290.0, 46.0, 50.0),
    accent: Hsl::new(273.0, 92.0, 50.0),
    surface: Hsl::new(171.0, 28.0, 10.0),

    text_400: Hsl::new(162.0, 100.0, 40.0),
    text_500: Hsl::new(162.0, 100.0, 50.0),
    text_600: Hsl::new(162.0, 100.0, 60.0),
    text_700: Hsl::new(162.0, 100.0, 70.0),

    surface_100: Hsl::new(171.0, 28.0, 10.0),
    surface_200: Hsl::new(171.0, 28.0, 20.0),
};

pub fn bundle() -> ThemeBundle {
    ThemeBundle::new("Nuvens", LIGHT, DARK)
}
