//! Theme state store
//!
//! Resolves the effective theme from three inputs:
//! - the user's choice (set, toggle, reset)
//! - the system "prefers dark" signal, which may arrive at any time
//! - the persisted choice, read once at construction
//!
//! The effective theme is the user's choice only when it is explicit (light or
//! dark) and the user has interacted; otherwise it follows the system signal.
//!
//! Persistence failures never reach the caller. They are logged and kept in
//! [`ThemeStore::last_storage_error`].

use crate::config::ThemeConfig;
use crate::error::ThemeError;
use crate::storage::{KeyValueStore, StorageError};
use crate::theme::{PreferenceSource, ThemeBundle, ThemeKind, ThemeMode, ThemePreference};
use crate::tokens::ColorPalette;
use nuvens_core::{Derived, Observable, SubscriptionId};

/// Resolved theme state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ThemeSnapshot {
    /// Theme actually applied, never `System`
    pub effective: ThemeKind,
    /// What the user asked for
    pub user: ThemeMode,
    /// The user made a manual choice this session or in persisted history
    pub has_interacted: bool,
    /// Latest system signal
    pub system: ThemeKind,
}

impl ThemeSnapshot {
    fn resolve(user: ThemeMode, has_interacted: bool, system: ThemeKind) -> Self {
        let effective = match user.explicit() {
            Some(kind) if has_interacted => kind,
            _ => system,
        };
        Self {
            effective,
            user,
            has_interacted,
            system,
        }
    }

    /// The preference in force, tagged with where it came from
    pub fn preference(&self) -> ThemePreference {
        if self.has_interacted && self.user.explicit().is_some() {
            ThemePreference {
                source: PreferenceSource::User,
                value: self.user,
            }
        } else {
            ThemePreference {
                source: PreferenceSource::System,
                value: ThemeMode::System,
            }
        }
    }
}

/// Read-only views recomputed before any subscriber runs
#[derive(Clone)]
pub struct ThemeViews {
    pub is_dark: Derived<bool>,
    pub is_light: Derived<bool>,
    pub is_system_mode: Derived<bool>,
    pub palette: Derived<ColorPalette>,
}

/// Owns the user/system preference and the persisted choice
pub struct ThemeStore {
    state: Observable<ThemeSnapshot>,
    views: ThemeViews,
    bundle: ThemeBundle,
    storage: Box<dyn KeyValueStore>,
    storage_key: String,
    last_storage_error: Option<StorageError>,
    storage_failures: u64,
}

impl ThemeStore {
    /// Create the store and load the persisted choice.
    ///
    /// A missing, unreadable, or invalid persisted value means "no interaction yet".
    pub fn new(
        storage: Box<dyn KeyValueStore>,
        bundle: ThemeBundle,
        config: &ThemeConfig,
        prefers_dark: bool,
    ) -> Self {
        let system = ThemeKind::from_prefers_dark(prefers_dark);
        let mut last_storage_error = None;
        let mut storage_failures = 0;

        let persisted = match storage.get(&config.storage_key) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(error = %e, "could not read theme preference");
                storage_failures += 1;
                last_storage_error = Some(e);
                None
            }
        };

        let user = match persisted.as_deref().map(str::parse::<ThemeMode>) {
            Some(Ok(mode)) if mode.explicit().is_some() => mode,
            Some(Ok(_)) | None => ThemeMode::System,
            Some(Err(e)) => {
                tracing::warn!(error = %e, "ignoring persisted theme");
                ThemeMode::System
            }
        };
        let has_interacted = user.explicit().is_some();

        let snapshot = ThemeSnapshot::resolve(user, has_interacted, system);
        tracing::debug!(
            effective = %snapshot.effective,
            user = %snapshot.user,
            system = %snapshot.system,
            "theme store initialized"
        );

        let mut state = Observable::new(snapshot);
        let palettes = bundle.clone();
        let views = ThemeViews {
            is_dark: state.derive(|s| s.effective == ThemeKind::Dark),
            is_light: state.derive(|s| s.effective == ThemeKind::Light),
            is_system_mode: state.derive(|s| s.preference().source == PreferenceSource::System),
            palette: state.derive(move |s| palettes.for_kind(s.effective).clone()),
        };

        Self {
            state,
            views,
            bundle,
            storage,
            storage_key: config.storage_key.clone(),
            last_storage_error,
            storage_failures,
        }
    }

    pub fn snapshot(&self) -> ThemeSnapshot {
        *self.state.get()
    }

    /// The effective theme
    pub fn current_theme(&self) -> ThemeKind {
        self.state.get().effective
    }

    pub fn preference(&self) -> ThemePreference {
        self.state.get().preference()
    }

    pub fn is_dark(&self) -> bool {
        self.views.is_dark.get()
    }

    pub fn is_light(&self) -> bool {
        self.views.is_light.get()
    }

    pub fn is_system_mode(&self) -> bool {
        self.views.is_system_mode.get()
    }

    /// Palette of the effective theme
    pub fn palette(&self) -> ColorPalette {
        self.views.palette.get()
    }

    pub fn palette_for(&self, theme: ThemeKind) -> &ColorPalette {
        self.bundle.for_kind(theme)
    }

    pub fn bundle(&self) -> &ThemeBundle {
        &self.bundle
    }

    /// Shared handles to the derived views
    pub fn views(&self) -> ThemeViews {
        self.views.clone()
    }

    pub fn is_valid_theme(value: &str) -> bool {
        value.parse::<ThemeMode>().is_ok()
    }

    /// Register an effect; it runs now and after every state change
    pub fn subscribe<F>(&mut self, effect: F) -> SubscriptionId
    where
        F: FnMut(&ThemeSnapshot) + Send + 'static,
    {
        self.state.subscribe(effect)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.state.unsubscribe(id)
    }

    /// Set the user's choice from text.
    ///
    /// Invalid values are rejected and leave the state untouched.
    pub fn set_theme(&mut self, value: &str) -> Result<ThemeKind, ThemeError> {
        match value.parse::<ThemeMode>() {
            Ok(mode) => Ok(self.set_mode(mode)),
            Err(e) => {
                tracing::warn!(value, "rejected invalid theme");
                Err(e)
            }
        }
    }

    /// Record an explicit user choice, persist it, and return the effective theme
    pub fn set_mode(&mut self, mode: ThemeMode) -> ThemeKind {
        self.persist(mode);
        let system = self.state.get().system;
        self.state.set(ThemeSnapshot::resolve(mode, true, system));
        tracing::info!(mode = %mode, effective = %self.current_theme(), "theme set");
        self.current_theme()
    }

    /// Flip between light and dark as an explicit choice
    pub fn toggle_theme(&mut self) -> ThemeKind {
        let next = self.current_theme().toggle();
        self.set_mode(next.into())
    }

    /// Forget the user's choice and follow the system again
    pub fn reset_to_system(&mut self) -> ThemeKind {
        self.persist(ThemeMode::System);
        let system = self.state.get().system;
        self.state
            .set(ThemeSnapshot::resolve(ThemeMode::System, false, system));
        tracing::info!(effective = %self.current_theme(), "theme reset to system");
        self.current_theme()
    }

    /// New OS-level signal; only the system branch changes
    pub fn set_system_preference(&mut self, prefers_dark: bool) -> ThemeKind {
        let current = *self.state.get();
        let system = ThemeKind::from_prefers_dark(prefers_dark);
        if self
            .state
            .set(ThemeSnapshot::resolve(current.user, current.has_interacted, system))
        {
            tracing::debug!(
                system = %system,
                effective = %self.current_theme(),
                "system preference changed"
            );
        }
        self.current_theme()
    }

    /// Push the current state to every subscriber even if unchanged
    pub fn notify(&mut self) {
        self.state.notify();
    }

    pub fn last_storage_error(&self) -> Option<&StorageError> {
        self.last_storage_error.as_ref()
    }

    /// Number of failed persistence calls since construction
    pub fn storage_failures(&self) -> u64 {
        self.storage_failures
    }

    fn persist(&mut self, mode: ThemeMode) {
        let result = match mode {
            ThemeMode::System => self.storage.remove(&self.storage_key),
            explicit => self.storage.set(&self.storage_key, explicit.as_str()),
        };
        if let Err(e) = result {
            tracing::warn!(error = %e, mode = %mode, "could not persist theme preference");
            self.storage_failures += 1;
            self.last_storage_error = Some(e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStorage, UnavailableStorage};
    use pretty_assertions::assert_eq;
    use std::sync::{Arc, Mutex};

    fn store_with(storage: impl KeyValueStore + 'static, prefers_dark: bool) -> ThemeStore {
        ThemeStore::new(
            Box::new(storage),
            ThemeBundle::nuvens(),
            &ThemeConfig::default(),
            prefers_dark,
        )
    }

    #[test]
    fn follows_system_until_user_chooses() {
        let mut store = store_with(MemoryStorage::new(), true);
        assert_eq!(store.current_theme(), ThemeKind::Dark);
        assert!(store.is_system_mode());

        store.set_system_preference(false);
        assert_eq!(store.current_theme(), ThemeKind::Light);
    }

    #[test]
    fn persisted_choice_counts_as_interaction() {
        let store = store_with(MemoryStorage::with_entry("theme", "light"), true);
        assert_eq!(store.current_theme(), ThemeKind::Light);
        assert!(store.snapshot().has_interacted);
        assert_eq!(
            store.preference(),
            ThemePreference {
                source: PreferenceSource::User,
                value: ThemeMode::Light
            }
        );
    }

    #[test]
    fn invalid_persisted_value_is_ignored() {
        let store = store_with(MemoryStorage::with_entry("theme", "sepia"), false);
        assert_eq!(store.current_theme(), ThemeKind::Light);
        assert!(!store.snapshot().has_interacted);
        assert_eq!(store.storage_failures(), 0);
    }

    #[test]
    fn invalid_theme_leaves_state_untouched() {
        let mut store = store_with(MemoryStorage::new(), true);
        let before = store.snapshot();

        for bad in ["", "Dark", "blue", "light "] {
            assert_eq!(store.set_theme(bad), Err(ThemeError::InvalidTheme(bad.to_string())));
            assert!(!ThemeStore::is_valid_theme(bad));
        }
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn set_theme_system_follows_system_signal() {
        let mut store = store_with(MemoryStorage::with_entry("theme", "light"), true);
        assert_eq!(store.set_theme("system"), Ok(ThemeKind::Dark));
        assert!(store.is_system_mode());
    }

    #[test]
    fn toggle_is_explicit_and_never_system() {
        let mut store = store_with(MemoryStorage::new(), false);
        assert_eq!(store.toggle_theme(), ThemeKind::Dark);
        assert_eq!(store.snapshot().user, ThemeMode::Dark);
        assert_eq!(store.toggle_theme(), ThemeKind::Light);
        assert_eq!(store.snapshot().user, ThemeMode::Light);
        assert!(!store.is_system_mode());
    }

    #[test]
    fn reset_clears_interaction() {
        let mut store = store_with(MemoryStorage::new(), true);
        store.set_theme("light").unwrap();
        assert_eq!(store.reset_to_system(), ThemeKind::Dark);
        assert!(!store.snapshot().has_interacted);
        assert!(store.is_dark());
    }

    #[test]
    fn storage_failures_are_recorded_not_raised() {
        let mut store = store_with(UnavailableStorage, false);
        assert_eq!(store.storage_failures(), 1);

        assert_eq!(store.set_theme("dark"), Ok(ThemeKind::Dark));
        assert_eq!(store.storage_failures(), 2);
        assert!(matches!(
            store.last_storage_error(),
            Some(StorageError::Unavailable(_))
        ));
    }

    #[test]
    fn derived_views_update_before_effects() {
        let mut store = store_with(MemoryStorage::new(), false);
        let views = store.views();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let log = Arc::clone(&seen);
        store.subscribe(move |snapshot| {
            let palette_bg = views.palette.with(|p| p.background);
            log.lock().unwrap().push((snapshot.effective, views.is_dark.get(), palette_bg));
        });

        store.set_theme("dark").unwrap();

        let seen = seen.lock().unwrap();
        let dark_bg = ThemeBundle::nuvens().dark.background;
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[1], (ThemeKind::Dark, true, dark_bg));
    }

    #[test]
    fn unchanged_state_does_not_notify() {
        let mut store = store_with(MemoryStorage::new(), true);
        let calls = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&calls);
        let id = store.subscribe(move |_| *counter.lock().unwrap() += 1);

        store.set_system_preference(true);
        assert_eq!(*calls.lock().unwrap(), 1);

        assert!(store.unsubscribe(id));
        store.set_system_preference(false);
        assert_eq!(*calls.lock().unwrap(), 1);
    }
}
