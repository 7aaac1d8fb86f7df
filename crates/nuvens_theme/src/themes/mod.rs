//! Built-in palettes

pub mod nuvens;
