//! Application context
//!
//! Owns every engine and is the single tick source. A host calls
//! [`AppContext::frame`] once per animation frame; the frame fixes the write
//! order between subsystems so theme colors and cloud transforms never race.

use crate::config::NuvensConfig;
use nuvens_animation::TransitionScheduler;
use nuvens_bridge::{Bridge, ScriptRunner};
use nuvens_clouds::CloudMotionStore;
use nuvens_core::SubscriptionId;
use nuvens_theme::{
    ApplyReport, KeyValueStore, StyleTarget, ThemeApplicator, ThemeBundle, ThemeChanged,
    ThemeKind, ThemeStore,
};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

/// Latest effective theme waiting to be applied
type PendingTheme = Arc<Mutex<Option<ThemeKind>>>;

/// What one frame did
#[derive(Debug, Default)]
pub struct FrameReport {
    /// Set when a theme application ran this frame
    pub applied: Option<ApplyReport>,
    /// Transitions still running after this frame's step
    pub active_transitions: usize,
    /// Set when the rehydration pass ran and listeners were notified
    pub theme_changed: Option<ThemeChanged>,
    /// Clouds that moved this frame
    pub clouds_moving: usize,
}

pub struct AppContext {
    config: NuvensConfig,
    theme: ThemeStore,
    applicator: ThemeApplicator,
    scheduler: TransitionScheduler,
    clouds: CloudMotionStore,
    pending: PendingTheme,
    subscription: Option<SubscriptionId>,
}

impl AppContext {
    /// Build every service and queue the initial theme for the first frame
    pub fn bootstrap(
        config: NuvensConfig,
        storage: Box<dyn KeyValueStore>,
        prefers_dark: bool,
    ) -> Self {
        let bundle = ThemeBundle::nuvens();
        let mut theme = ThemeStore::new(storage, bundle.clone(), &config.theme, prefers_dark);
        let applicator = ThemeApplicator::new(config.theme.clone(), bundle);
        let scheduler = TransitionScheduler::new(config.transitions.clone());
        let clouds = CloudMotionStore::new(config.clouds.clone());

        let pending = PendingTheme::default();
        let queue = Arc::clone(&pending);
        let subscription = theme.subscribe(move |snapshot| {
            *queue.lock().unwrap_or_else(PoisonError::into_inner) = Some(snapshot.effective);
        });

        tracing::info!(
            theme = %theme.current_theme(),
            style = %config.clouds.default_style,
            "application context ready"
        );
        Self {
            config,
            theme,
            applicator,
            scheduler,
            clouds,
            pending,
            subscription: Some(subscription),
        }
    }

    pub fn config(&self) -> &NuvensConfig {
        &self.config
    }

    pub fn theme(&self) -> &ThemeStore {
        &self.theme
    }

    /// Theme operations; their effects are applied on the next frame
    pub fn theme_mut(&mut self) -> &mut ThemeStore {
        &mut self.theme
    }

    pub fn applicator(&self) -> &ThemeApplicator {
        &self.applicator
    }

    pub fn applicator_mut(&mut self) -> &mut ThemeApplicator {
        &mut self.applicator
    }

    pub fn scheduler(&self) -> &TransitionScheduler {
        &self.scheduler
    }

    pub fn clouds(&self) -> &CloudMotionStore {
        &self.clouds
    }

    pub fn clouds_mut(&mut self) -> &mut CloudMotionStore {
        &mut self.clouds
    }

    /// A script bridge configured from `[bridge]`
    pub fn bridge<R: ScriptRunner>(&self, runner: R) -> Bridge<R> {
        Bridge::new(runner, self.config.bridge.clone())
    }

    /// Theme waiting for the next frame, if any
    pub fn pending_theme(&self) -> Option<ThemeKind> {
        *self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue the current theme again even though it has not changed
    pub fn reapply_theme(&mut self) {
        self.applicator.force_reapply();
        self.theme.notify();
    }

    /// Nothing queued, no transition running, no rehydration waiting
    pub fn is_settled(&self) -> bool {
        self.pending_theme().is_none()
            && self.scheduler.active_count() == 0
            && !self.applicator.rehydration_pending()
    }

    /// Run one frame against `target`.
    ///
    /// Order: pending theme application, transition steps, rehydration pass
    /// and notification, cloud motion.
    pub fn frame<T: StyleTarget>(&mut self, now: Instant, target: &mut T) -> FrameReport {
        let queued = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let applied = match queued {
            Some(theme) => self
                .applicator
                .apply_theme(theme, now, &mut self.scheduler, target),
            None => None,
        };

        let active_transitions = self.scheduler.tick(now, target);
        let theme_changed = self.applicator.on_frame(now, target);
        let clouds_moving = self.clouds.tick(now);

        tracing::trace!(
            applied = applied.is_some(),
            active_transitions,
            clouds_moving,
            "frame"
        );
        FrameReport {
            applied,
            active_transitions,
            theme_changed,
            clouds_moving,
        }
    }

    /// Snap running transitions to their targets and release every cloud
    pub fn teardown<T: StyleTarget>(&mut self, target: &mut T) {
        if let Some(id) = self.subscription.take() {
            self.theme.unsubscribe(id);
        }
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        self.scheduler.cancel_all(target);
        self.clouds.cleanup();
        tracing::info!("application context torn down");
    }
}
