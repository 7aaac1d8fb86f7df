//! End-to-end preference handling: store, persistence, and application

use nuvens_animation::TransitionScheduler;
use nuvens_theme::{
    FileStorage, KeyValueStore, MemoryStorage, MemoryStyleSheet, PreferenceSource, ThemeApplicator,
    ThemeBundle, ThemeConfig, ThemeError, ThemeKind, ThemeMode, ThemeStore,
};
use pretty_assertions::assert_eq;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Storage shared with the test so persisted values can be inspected
#[derive(Clone, Default)]
struct SharedStorage(Arc<Mutex<MemoryStorage>>);

impl KeyValueStore for SharedStorage {
    fn get(&self, key: &str) -> Result<Option<String>, nuvens_theme::StorageError> {
        self.0.lock().unwrap().get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), nuvens_theme::StorageError> {
        self.0.lock().unwrap().set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), nuvens_theme::StorageError> {
        self.0.lock().unwrap().remove(key)
    }
}

fn persisted(storage: &SharedStorage) -> Option<String> {
    storage.get("theme").unwrap()
}

#[test]
fn user_override_survives_system_change() {
    let storage = SharedStorage::default();
    let mut store = ThemeStore::new(
        Box::new(storage.clone()),
        ThemeBundle::nuvens(),
        &ThemeConfig::default(),
        true,
    );

    // Never interacted, system dark
    assert_eq!(store.current_theme(), ThemeKind::Dark);
    assert_eq!(store.preference().source, PreferenceSource::System);

    assert_eq!(store.set_theme("light"), Ok(ThemeKind::Light));
    assert_eq!(persisted(&storage).as_deref(), Some("light"));

    // OS flips to dark again; the explicit choice wins
    store.set_system_preference(true);
    store.set_system_preference(false);
    store.set_system_preference(true);
    assert_eq!(store.current_theme(), ThemeKind::Light);
    assert_eq!(store.snapshot().system, ThemeKind::Dark);
}

#[test]
fn every_valid_theme_round_trips() {
    for prefers_dark in [false, true] {
        for mode in ThemeMode::ALL {
            let mut store = ThemeStore::new(
                Box::new(MemoryStorage::new()),
                ThemeBundle::nuvens(),
                &ThemeConfig::default(),
                prefers_dark,
            );
            let effective = store.set_theme(mode.as_str()).unwrap();
            let expected = mode
                .explicit()
                .unwrap_or(ThemeKind::from_prefers_dark(prefers_dark));
            assert_eq!(effective, expected);
            assert_eq!(store.current_theme(), expected);
        }
    }
}

#[test]
fn invalid_values_are_rejected_from_any_state() {
    let mut store = ThemeStore::new(
        Box::new(MemoryStorage::new()),
        ThemeBundle::nuvens(),
        &ThemeConfig::default(),
        false,
    );
    store.toggle_theme();
    let before = store.current_theme();

    assert_eq!(
        store.set_theme("midnight"),
        Err(ThemeError::InvalidTheme("midnight".into()))
    );
    assert_eq!(store.current_theme(), before);
}

#[test]
fn choosing_system_removes_the_persisted_key() {
    let storage = SharedStorage::default();
    let mut store = ThemeStore::new(
        Box::new(storage.clone()),
        ThemeBundle::nuvens(),
        &ThemeConfig::default(),
        false,
    );

    store.set_theme("dark").unwrap();
    assert_eq!(persisted(&storage).as_deref(), Some("dark"));

    store.set_theme("system").unwrap();
    assert_eq!(persisted(&storage), None);

    store.set_theme("light").unwrap();
    store.reset_to_system();
    assert_eq!(persisted(&storage), None);
}

#[test]
fn file_storage_restores_choice_on_next_start() {
    let dir = tempfile::tempdir().unwrap();
    let config = ThemeConfig::default();

    let mut first = ThemeStore::new(
        Box::new(FileStorage::in_dir(dir.path())),
        ThemeBundle::nuvens(),
        &config,
        false,
    );
    first.toggle_theme();
    assert_eq!(first.current_theme(), ThemeKind::Dark);
    drop(first);

    let second = ThemeStore::new(
        Box::new(FileStorage::in_dir(dir.path())),
        ThemeBundle::nuvens(),
        &config,
        false,
    );
    assert_eq!(second.current_theme(), ThemeKind::Dark);
    assert!(second.snapshot().has_interacted);
}

#[test]
fn store_effects_drive_the_applicator() {
    let config = ThemeConfig::default();
    let mut store = ThemeStore::new(
        Box::new(MemoryStorage::new()),
        ThemeBundle::nuvens(),
        &config,
        true,
    );
    let mut applicator = ThemeApplicator::new(config, ThemeBundle::nuvens());
    let mut scheduler = TransitionScheduler::default();
    let mut sheet = MemoryStyleSheet::new();

    let queued = Arc::new(Mutex::new(Vec::new()));
    let queue = Arc::clone(&queued);
    store.subscribe(move |snapshot| queue.lock().unwrap().push(snapshot.effective));

    store.set_theme("light").unwrap();
    store.set_system_preference(false);

    let mut now = Instant::now();
    let pending: Vec<ThemeKind> = queued.lock().unwrap().drain(..).collect();
    assert_eq!(pending, vec![ThemeKind::Dark, ThemeKind::Light, ThemeKind::Light]);

    let applied = pending
        .into_iter()
        .filter_map(|theme| applicator.apply_theme(theme, now, &mut scheduler, &mut sheet))
        .count();
    assert_eq!(applied, 2);

    while scheduler.active_count() > 0 {
        now += Duration::from_millis(10);
        scheduler.tick(now, &mut sheet);
    }
    assert_eq!(sheet.property("--theme-current"), Some("light"));
    assert_eq!(
        sheet.property("--theme-text"),
        Some(store.palette().text.to_css().as_str())
    );
}
