//! Nuvens Theme System
//!
//! Light/dark theming with user and system preferences, persisted choice,
//! and animated application of CSS custom properties.
//!
//! # Overview
//!
//! - **Palettes**: one immutable [`ColorPalette`] per theme, bundled as a [`ThemeBundle`]
//! - **Theme store**: [`ThemeStore`] resolves the effective theme from the user's
//!   choice and the system signal, persists the choice, and notifies subscribers
//! - **Applicator**: [`ThemeApplicator`] diffs tracked properties on a [`StyleTarget`]
//!   and hands changed colors to the transition scheduler
//! - **Outlines**: [`OutlinePreset`] renders `text-shadow` rings colored by
//!   the theme's `--outline-color`
//!
//! # Quick Start
//!
//! ```rust
//! use nuvens_animation::TransitionScheduler;
//! use nuvens_theme::{
//!     MemoryStorage, MemoryStyleSheet, ThemeApplicator, ThemeBundle, ThemeConfig, ThemeKind,
//!     ThemeStore,
//! };
//! use std::time::Instant;
//!
//! let config = ThemeConfig::default();
//! let mut store = ThemeStore::new(
//!     Box::new(MemoryStorage::new()),
//!     ThemeBundle::nuvens(),
//!     &config,
//!     true, // system prefers dark
//! );
//! assert_eq!(store.current_theme(), ThemeKind::Dark);
//!
//! store.set_theme("light").unwrap();
//!
//! let mut scheduler = TransitionScheduler::default();
//! let mut sheet = MemoryStyleSheet::new();
//! let mut applicator = ThemeApplicator::new(config, ThemeBundle::nuvens());
//! applicator.apply_theme(store.current_theme(), Instant::now(), &mut scheduler, &mut sheet);
//! assert!(sheet.has_class("theme-light"));
//! ```

pub mod applicator;
pub mod config;
pub mod error;
pub mod outline;
pub mod state;
pub mod storage;
pub mod target;
pub mod theme;
pub mod themes;
pub mod tokens;

pub use applicator::{ApplyMetrics, ApplyReport, ThemeApplicator, ThemeChanged};
pub use config::ThemeConfig;
pub use error::ThemeError;
pub use outline::{
    mathematical_outline, outline_color, OutlineContext, OutlinePreset, OUTLINE_COLOR_VAR,
};
pub use state::{ThemeSnapshot, ThemeStore, ThemeViews};
pub use storage::{FileStorage, KeyValueStore, MemoryStorage, StorageError, UnavailableStorage};
pub use target::{MemoryStyleSheet, StyleTarget};
pub use theme::{PreferenceSource, ThemeBundle, ThemeKind, ThemeMode, ThemePreference};
pub use tokens::*;
