//! Theme application
//!
//! Writes the effective theme into a [`StyleTarget`]:
//! 1. swap the root theme class
//! 2. diff every tracked custom property against its computed value
//! 3. hand changed colors to the transition scheduler in bounded batches,
//!    set everything else directly
//! 4. one frame later, force layout on the critical selectors and broadcast
//!    [`ThemeChanged`]

use crate::config::ThemeConfig;
use crate::outline::{outline_color, OUTLINE_COLOR_VAR};
use crate::target::StyleTarget;
use crate::theme::{ThemeBundle, ThemeKind};
use crate::tokens::ColorRole;
use indexmap::IndexMap;
use nuvens_animation::{TransitionHandle, TransitionOutcome, TransitionScheduler};
use nuvens_core::{parse_color, EventBus, HandlerId};
use std::time::{Duration, Instant, SystemTime};

const THEME_CLASSES: [&str; 3] = ["theme-light", "theme-dark", "theme-system"];

const DARK_STATIC: [(&str, &str); 11] = [
    ("--mdc-theme-text-primary-on-background", "rgba(255, 255, 255, 0.87)"),
    ("--mdc-theme-text-secondary-on-background", "rgba(255, 255, 255, 0.60)"),
    ("--mdc-theme-text-hint-on-background", "rgba(255, 255, 255, 0.38)"),
    ("--mdc-theme-text-disabled-on-background", "rgba(255, 255, 255, 0.38)"),
    ("--mdc-theme-text-icon-on-background", "rgba(255, 255, 255, 0.38)"),
    ("--mdc-theme-text-primary-on-dark", "rgba(255, 255, 255, 0.87)"),
    ("--mdc-theme-text-secondary-on-dark", "rgba(255, 255, 255, 0.60)"),
    ("--mdc-theme-text-hint-on-dark", "rgba(255, 255, 255, 0.38)"),
    ("--mdc-theme-text-disabled-on-dark", "rgba(255, 255, 255, 0.38)"),
    ("--mdc-theme-text-icon-on-dark", "rgba(255, 255, 255, 0.38)"),
    ("--icon-filter", "invert(1)"),
];

const LIGHT_STATIC: [(&str, &str); 11] = [
    ("--mdc-theme-text-primary-on-background", "rgba(0, 0, 0, 0.87)"),
    ("--mdc-theme-text-secondary-on-background", "rgba(0, 0, 0, 0.60)"),
    ("--mdc-theme-text-hint-on-background", "rgba(0, 0, 0, 0.38)"),
    ("--mdc-theme-text-disabled-on-background", "rgba(0, 0, 0, 0.38)"),
    ("--mdc-theme-text-icon-on-background", "rgba(0, 0, 0, 0.38)"),
    ("--mdc-theme-text-primary-on-light", "rgba(0, 0, 0, 0.87)"),
    ("--mdc-theme-text-secondary-on-light", "rgba(0, 0, 0, 0.60)"),
    ("--mdc-theme-text-hint-on-light", "rgba(0, 0, 0, 0.38)"),
    ("--mdc-theme-text-disabled-on-light", "rgba(0, 0, 0, 0.38)"),
    ("--mdc-theme-text-icon-on-light", "rgba(0, 0, 0, 0.38)"),
    ("--icon-filter", "none"),
];

/// Palette-backed custom properties
fn role_properties() -> IndexMap<String, ColorRole> {
    let mut map: IndexMap<String, ColorRole> = [
        // Material components
        ("--mdc-theme-primary", ColorRole::Primary),
        ("--mdc-theme-secondary", ColorRole::Secondary),
        ("--mdc-theme-background", ColorRole::Background),
        ("--mdc-theme-surface", ColorRole::Surface),
        ("--mdc-theme-on-primary", ColorRole::Background),
        ("--mdc-theme-on-secondary", ColorRole::Background),
        ("--mdc-theme-on-surface", ColorRole::Text),
        ("--mdc-theme-on-background", ColorRole::Text),
        // Application
        ("--theme-background", ColorRole::Background),
        ("--theme-surface", ColorRole::Surface),
        ("--theme-text", ColorRole::Text),
        ("--theme-primary", ColorRole::Primary),
        ("--theme-secondary", ColorRole::Secondary),
        ("--theme-accent", ColorRole::Accent),
    ]
    .into_iter()
    .map(|(name, role)| (name.to_string(), role))
    .collect();

    for role in ColorRole::ALL {
        map.insert(format!("--color-{}", role.css_name()), role);
    }
    map
}

/// Timing and counts for one application
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ApplyMetrics {
    pub changed: usize,
    pub interpolated: usize,
    pub instant: usize,
    /// Groups of `batch_size` writes, all issued within one synchronous apply
    pub batches: usize,
    /// Wall time spent issuing updates
    pub apply_time: Duration,
    /// Elements forced through layout in the rehydration pass
    pub rehydrated: usize,
}

/// Result of [`ThemeApplicator::apply_theme`]
#[derive(Debug)]
pub struct ApplyReport {
    pub theme: ThemeKind,
    pub changed: usize,
    pub interpolated: usize,
    pub instant: usize,
    /// Write groups issued; all of them ran inside the same call
    pub batches: usize,
    /// Handles for the interpolating transitions
    pub pending: Vec<TransitionHandle>,
}

/// Broadcast after the rehydration pass
#[derive(Clone, Debug, PartialEq)]
pub struct ThemeChanged {
    pub theme: ThemeKind,
    pub timestamp: SystemTime,
    pub metrics: ApplyMetrics,
}

#[derive(Debug)]
struct PendingRehydration {
    theme: ThemeKind,
    due: Instant,
    metrics: ApplyMetrics,
}

/// Applies themes to a style target
pub struct ThemeApplicator {
    config: ThemeConfig,
    bundle: ThemeBundle,
    properties: IndexMap<String, ColorRole>,
    last_applied: Option<ThemeKind>,
    rehydration: Option<PendingRehydration>,
    events: EventBus<ThemeChanged>,
}

impl ThemeApplicator {
    pub fn new(config: ThemeConfig, bundle: ThemeBundle) -> Self {
        Self {
            config,
            bundle,
            properties: role_properties(),
            last_applied: None,
            rehydration: None,
            events: EventBus::new(),
        }
    }

    pub fn config(&self) -> &ThemeConfig {
        &self.config
    }

    pub fn last_applied(&self) -> Option<ThemeKind> {
        self.last_applied
    }

    /// Whether a rehydration pass is waiting for its frame
    pub fn rehydration_pending(&self) -> bool {
        self.rehydration.is_some()
    }

    /// Tracked properties and their values for `theme`, in write order
    pub fn target_values(&self, theme: ThemeKind) -> Vec<(String, String)> {
        let palette = self.bundle.for_kind(theme);
        let statics = match theme {
            ThemeKind::Light => &LIGHT_STATIC,
            ThemeKind::Dark => &DARK_STATIC,
        };

        let mut values = Vec::with_capacity(2 + self.properties.len() + statics.len());
        values.push(("--theme-current".to_string(), theme.as_str().to_string()));
        values.extend(
            self.properties
                .iter()
                .map(|(name, role)| (name.clone(), palette.get(*role).to_css())),
        );
        values.extend(
            statics
                .iter()
                .map(|(name, value)| (name.to_string(), value.to_string())),
        );
        values.push((OUTLINE_COLOR_VAR.to_string(), outline_color(theme).to_string()));
        values
    }

    /// Clear the idempotence guard so the next apply runs even for the same theme
    pub fn force_reapply(&mut self) {
        self.last_applied = None;
    }

    /// Apply `theme` to `target`.
    ///
    /// Changed properties are issued in groups of `batch_size`, all within
    /// this call, in tracked-property order. A property with a transition in
    /// flight is always re-issued so the newest theme wins.
    ///
    /// Returns `None` without touching the target when `theme` was the last one applied.
    pub fn apply_theme<T: StyleTarget>(
        &mut self,
        theme: ThemeKind,
        now: Instant,
        scheduler: &mut TransitionScheduler,
        target: &mut T,
    ) -> Option<ApplyReport> {
        if self.last_applied == Some(theme) {
            tracing::trace!(%theme, "theme already applied");
            return None;
        }
        let started = Instant::now();

        target.replace_classes(&THEME_CLASSES, theme.css_class());

        let updates: Vec<(String, String, Option<String>)> = self
            .target_values(theme)
            .into_iter()
            .filter_map(|(name, value)| {
                let current = target.computed_property(&name);
                // An in-flight transition may be heading elsewhere; it must be replaced
                if scheduler.is_animating(&name) {
                    return Some((name, value, current));
                }
                if current.as_deref() == Some(value.as_str()) {
                    return None;
                }
                if let (Some(from), Some(to)) = (
                    current.as_deref().and_then(parse_color),
                    parse_color(&value),
                ) {
                    if from.approx_eq(&to) {
                        return None;
                    }
                }
                Some((name, value, current))
            })
            .collect();

        let mut report = ApplyReport {
            theme,
            changed: updates.len(),
            interpolated: 0,
            instant: 0,
            batches: 0,
            pending: Vec::new(),
        };

        let duration = self.config.transition_duration();
        for batch in updates.chunks(self.config.batch_size.max(1)) {
            report.batches += 1;
            for (name, value, current) in batch {
                let colors = current
                    .as_deref()
                    .and_then(parse_color)
                    .zip(parse_color(value));

                match colors {
                    Some((from, to)) if self.config.interpolate => {
                        let mut handle =
                            scheduler.animate_property(name, from, to, duration, now, target);
                        match handle.try_outcome() {
                            Some(
                                TransitionOutcome::AppliedInstantly | TransitionOutcome::Unchanged,
                            ) => report.instant += 1,
                            _ => {
                                report.interpolated += 1;
                                report.pending.push(handle);
                            }
                        }
                    }
                    _ => {
                        scheduler.cancel(name);
                        target.set_property(name, value);
                        report.instant += 1;
                    }
                }
            }
        }

        let metrics = ApplyMetrics {
            changed: report.changed,
            interpolated: report.interpolated,
            instant: report.instant,
            batches: report.batches,
            apply_time: started.elapsed(),
            rehydrated: 0,
        };
        if self.rehydration.is_some() {
            tracing::trace!("replacing pending rehydration");
        }
        self.rehydration = Some(PendingRehydration {
            theme,
            due: now + self.config.rehydration_delay(),
            metrics,
        });
        self.last_applied = Some(theme);

        tracing::debug!(
            %theme,
            changed = report.changed,
            interpolated = report.interpolated,
            instant = report.instant,
            batches = report.batches,
            "theme applied"
        );
        Some(report)
    }

    /// Run the rehydration pass once its frame is due and broadcast the change
    pub fn on_frame<T: StyleTarget>(
        &mut self,
        now: Instant,
        target: &mut T,
    ) -> Option<ThemeChanged> {
        if self.rehydration.as_ref().map_or(true, |r| now < r.due) {
            return None;
        }
        let PendingRehydration {
            theme, mut metrics, ..
        } = self.rehydration.take()?;

        metrics.rehydrated = self
            .config
            .critical_selectors
            .iter()
            .map(|selector| target.force_reflow(selector))
            .sum();

        let event = ThemeChanged {
            theme,
            timestamp: SystemTime::now(),
            metrics,
        };
        let receivers = self.events.dispatch(&event);
        tracing::debug!(%theme, rehydrated = event.metrics.rehydrated, receivers, "theme changed");
        Some(event)
    }

    /// Listen for [`ThemeChanged`]
    pub fn on_theme_changed<F>(&mut self, handler: F) -> HandlerId
    where
        F: Fn(&ThemeChanged) + Send + Sync + 'static,
    {
        self.events.register(handler)
    }

    pub fn events_mut(&mut self) -> &mut EventBus<ThemeChanged> {
        &mut self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::MemoryStyleSheet;
    use nuvens_animation::TransitionConfig;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn applicator() -> ThemeApplicator {
        ThemeApplicator::new(ThemeConfig::default(), ThemeBundle::nuvens())
    }

    fn settle(scheduler: &mut TransitionScheduler, sheet: &mut MemoryStyleSheet, from: Instant) {
        let mut now = from;
        while scheduler.active_count() > 0 {
            now += Duration::from_millis(10);
            scheduler.tick(now, sheet);
        }
    }

    #[test]
    fn first_apply_sets_everything_instantly() {
        let mut applicator = applicator();
        let mut scheduler = TransitionScheduler::default();
        let mut sheet = MemoryStyleSheet::new();

        let report = applicator
            .apply_theme(ThemeKind::Dark, Instant::now(), &mut scheduler, &mut sheet)
            .unwrap();

        let expected = applicator.target_values(ThemeKind::Dark).len();
        assert_eq!(report.changed, expected);
        assert_eq!(report.instant, expected);
        assert_eq!(report.interpolated, 0);
        assert_eq!(report.batches, expected.div_ceil(8));
        assert!(sheet.has_class("theme-dark"));
        assert_eq!(sheet.property("--theme-current"), Some("dark"));
        assert_eq!(sheet.property("--icon-filter"), Some("invert(1)"));
        assert_eq!(sheet.property("--outline-color"), Some("hsl(145, 25%, 8%)"));
        assert_eq!(
            sheet.property("--mdc-theme-background"),
            Some("hsl(145, 100%, 5%)")
        );
    }

    #[test]
    fn second_apply_of_same_theme_writes_nothing() {
        let mut applicator = applicator();
        let mut scheduler = TransitionScheduler::default();
        let mut sheet = MemoryStyleSheet::new();
        let now = Instant::now();

        applicator.apply_theme(ThemeKind::Light, now, &mut scheduler, &mut sheet);
        let writes = sheet.writes();

        assert!(applicator
            .apply_theme(ThemeKind::Light, now, &mut scheduler, &mut sheet)
            .is_none());
        assert_eq!(sheet.writes(), writes);
    }

    #[test]
    fn switching_interpolates_only_changed_colors() {
        let mut applicator = applicator();
        let mut scheduler = TransitionScheduler::new(TransitionConfig {
            max_active: 100,
            ..TransitionConfig::default()
        });
        let mut sheet = MemoryStyleSheet::new();
        let t0 = Instant::now();

        applicator.apply_theme(ThemeKind::Dark, t0, &mut scheduler, &mut sheet);
        let report = applicator
            .apply_theme(ThemeKind::Light, t0, &mut scheduler, &mut sheet)
            .unwrap();

        // Brand colors are shared; primary/secondary/accent never move
        assert!(!scheduler.is_animating("--mdc-theme-primary"));
        assert!(scheduler.is_animating("--mdc-theme-background"));
        assert!(report.interpolated > 0);
        assert_eq!(report.pending.len(), report.interpolated);

        settle(&mut scheduler, &mut sheet, t0);
        for (name, value) in applicator.target_values(ThemeKind::Light) {
            assert_eq!(sheet.property(&name), Some(value.as_str()), "{name}");
        }
        assert!(!sheet.has_class("theme-dark"));
    }

    #[test]
    fn reverting_mid_flight_lands_on_the_newest_theme() {
        let mut applicator = applicator();
        let mut scheduler = TransitionScheduler::default();
        let mut sheet = MemoryStyleSheet::new();
        let t0 = Instant::now();

        applicator.apply_theme(ThemeKind::Dark, t0, &mut scheduler, &mut sheet);
        let light_at = t0 + Duration::from_millis(16);
        applicator.apply_theme(ThemeKind::Light, light_at, &mut scheduler, &mut sheet);
        assert!(scheduler.active_count() > 0);

        // Back to dark before any step has landed: computed values still read dark
        let dark_at = t0 + Duration::from_millis(20);
        let report = applicator
            .apply_theme(ThemeKind::Dark, dark_at, &mut scheduler, &mut sheet)
            .unwrap();
        assert!(report.changed > 0);
        assert!(!scheduler.is_animating("--mdc-theme-background"));

        // Late frames must not drag anything back toward light
        for frame in 1..=200 {
            scheduler.tick(dark_at + Duration::from_millis(16 * frame), &mut sheet);
        }
        assert_eq!(scheduler.active_count(), 0);
        assert!(sheet.has_class("theme-dark"));
        for (name, value) in applicator.target_values(ThemeKind::Dark) {
            assert_eq!(sheet.property(&name), Some(value.as_str()), "{name}");
        }
        assert_eq!(
            sheet.property("--mdc-theme-background"),
            Some("hsl(145, 100%, 5%)")
        );
    }

    #[test]
    fn reverting_without_interpolation_cancels_in_flight_steps() {
        let mut applicator = applicator();
        let mut scheduler = TransitionScheduler::default();
        let mut sheet = MemoryStyleSheet::new();
        let t0 = Instant::now();

        applicator.apply_theme(ThemeKind::Dark, t0, &mut scheduler, &mut sheet);
        applicator.apply_theme(ThemeKind::Light, t0, &mut scheduler, &mut sheet);
        assert!(scheduler.is_animating("--mdc-theme-background"));

        let mut direct = ThemeApplicator::new(
            ThemeConfig {
                interpolate: false,
                ..ThemeConfig::default()
            },
            ThemeBundle::nuvens(),
        );
        direct.apply_theme(ThemeKind::Dark, t0, &mut scheduler, &mut sheet);

        assert_eq!(scheduler.active_count(), 0);
        assert_eq!(
            sheet.property("--mdc-theme-background"),
            Some("hsl(145, 100%, 5%)")
        );
    }

    #[test]
    fn interpolation_disabled_sets_directly() {
        let config = ThemeConfig {
            interpolate: false,
            ..ThemeConfig::default()
        };
        let mut applicator = ThemeApplicator::new(config, ThemeBundle::nuvens());
        let mut scheduler = TransitionScheduler::default();
        let mut sheet = MemoryStyleSheet::new();
        let t0 = Instant::now();

        applicator.apply_theme(ThemeKind::Dark, t0, &mut scheduler, &mut sheet);
        let report = applicator
            .apply_theme(ThemeKind::Light, t0, &mut scheduler, &mut sheet)
            .unwrap();

        assert_eq!(report.interpolated, 0);
        assert_eq!(scheduler.active_count(), 0);
        assert_eq!(
            sheet.property("--theme-background"),
            Some("hsl(145, 100%, 95%)")
        );
    }

    #[test]
    fn rehydration_runs_one_frame_later_and_notifies() {
        let mut applicator = applicator();
        let mut scheduler = TransitionScheduler::default();
        let mut sheet = MemoryStyleSheet::new()
            .with_elements("body", 1)
            .with_elements(".theme-toggle", 2);
        let received = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&received);
        applicator.on_theme_changed(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let t0 = Instant::now();

        applicator.apply_theme(ThemeKind::Dark, t0, &mut scheduler, &mut sheet);
        assert!(applicator.on_frame(t0, &mut sheet).is_none());

        let event = applicator
            .on_frame(t0 + Duration::from_millis(16), &mut sheet)
            .unwrap();
        assert_eq!(event.theme, ThemeKind::Dark);
        assert_eq!(event.metrics.rehydrated, 3);
        assert_eq!(received.load(Ordering::SeqCst), 1);
        assert!(!applicator.rehydration_pending());
        assert!(applicator
            .on_frame(t0 + Duration::from_millis(32), &mut sheet)
            .is_none());
    }

    #[test]
    fn force_reapply_bypasses_guard() {
        let mut applicator = applicator();
        let mut scheduler = TransitionScheduler::default();
        let mut sheet = MemoryStyleSheet::new();
        let now = Instant::now();

        applicator.apply_theme(ThemeKind::Dark, now, &mut scheduler, &mut sheet);
        applicator.force_reapply();
        let report = applicator
            .apply_theme(ThemeKind::Dark, now, &mut scheduler, &mut sheet)
            .unwrap();
        assert_eq!(report.changed, 0);
        assert!(applicator.rehydration_pending());
    }
}
