//! Cloud motion store
//!
//! Registry of drifting background elements. Each entry walks a closed loop
//! of random waypoints, one leg at a time, with a short random dwell between
//! legs. Rotation and scale "breathe" on their own clocks, independent of the
//! position.
//!
//! Entry lifecycle: `Registered -> Animating -> Paused | Stopped`, and back to
//! `Animating` on resume. Unregistering drops the entry. Elements are held
//! weakly; one dropped by its owner is unregistered on the next tick.

use crate::config::{MotionConfig, MotionStyle, StyleParams, Viewport};
use crate::element::{CloudElement, CloudTransform};
use crate::error::{CloudError, Result};
use crate::path::{generate_loop, random_position, Position};
use indexmap::IndexMap;
use nuvens_animation::{Easing, Tween};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::{Duration, Instant};

const MAX_ROTATION_SPAN: f32 = 15.0;
const SCALE_RANGE: [f32; 2] = [0.95, 1.05];
const SPEED_RANGE: [f32; 2] = [0.01, 100.0];

/// Where an entry is in its lifecycle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CloudState {
    /// Known to the store, not moving yet
    Registered,
    Animating,
    /// Halted by [`CloudMotionStore::set_active`]
    Paused,
    /// Halted by [`CloudMotionStore::stop_cloud`]
    Stopped,
}

/// Store-wide state
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionSnapshot {
    pub is_active: bool,
    pub style: MotionStyle,
    pub global_speed: f32,
    pub cloud_count: usize,
}

struct CloudEntry {
    element: Weak<Mutex<dyn CloudElement>>,
    style: MotionStyle,
    state: CloudState,
    waypoints: Vec<Position>,
    next_waypoint: usize,
    loops_completed: u32,
    x: Tween,
    y: Tween,
    rotation: Tween,
    scale: Tween,
}

impl CloudEntry {
    fn new(
        element: Weak<Mutex<dyn CloudElement>>,
        style: MotionStyle,
        at: Position,
        now: Instant,
    ) -> Self {
        Self {
            element,
            style,
            state: CloudState::Registered,
            waypoints: Vec::new(),
            next_waypoint: 0,
            loops_completed: 0,
            x: Tween::settled(at.x, now),
            y: Tween::settled(at.y, now),
            rotation: Tween::settled(0.0, now),
            scale: Tween::settled(1.0, now),
        }
    }

    fn position(&self, now: Instant, config: &MotionConfig) -> Position {
        let (bx, by) = config.bounds();
        Position::new(self.x.value_at(now), self.y.value_at(now)).clamped(bx, by)
    }

    fn transform(&self, now: Instant, config: &MotionConfig) -> CloudTransform {
        CloudTransform {
            position: self.position(now, config),
            rotation: self.rotation.value_at(now),
            scale: self.scale.value_at(now),
        }
    }

    fn freeze(&mut self, now: Instant) {
        self.x.freeze(now);
        self.y.freeze(now);
        self.rotation.freeze(now);
        self.scale.freeze(now);
    }
}

/// Per-call motion parameters shared by every entry
struct Motion<'a> {
    config: &'a MotionConfig,
    speed: f32,
}

impl Motion<'_> {
    fn params(&self, style: MotionStyle) -> &StyleParams {
        self.config.styles.get(style)
    }

    fn scaled(&self, duration: Duration) -> Duration {
        duration.div_f32(self.speed)
    }

    fn delay(&self, params: &StyleParams, rng: &mut SmallRng) -> Duration {
        let ms = if params.delay_max_ms > params.delay_min_ms {
            rng.random_range(params.delay_min_ms..=params.delay_max_ms)
        } else {
            params.delay_min_ms
        };
        self.scaled(Duration::from_millis(ms))
    }

    /// Begin moving from wherever the entry is, on a fresh loop
    fn start(&self, entry: &mut CloudEntry, rng: &mut SmallRng, now: Instant) {
        let params = self.params(entry.style);
        let here = entry.position(now, self.config);
        entry.freeze(now);
        entry.waypoints = generate_loop(here, params.radius, self.config, rng);
        entry.next_waypoint = 0;
        entry.loops_completed = 0;
        entry.state = CloudState::Animating;

        let delay = self.delay(params, rng);
        self.next_leg(entry, rng, now + delay);
    }

    fn next_leg(&self, entry: &mut CloudEntry, rng: &mut SmallRng, start_at: Instant) {
        let params = self.params(entry.style);
        let here = Position::new(entry.x.target(), entry.y.target());

        if entry.next_waypoint >= entry.waypoints.len() {
            entry.waypoints = generate_loop(here, params.radius, self.config, rng);
            entry.next_waypoint = 0;
            entry.loops_completed += 1;
        }
        let target = entry.waypoints[entry.next_waypoint];
        entry.next_waypoint += 1;

        let legs = entry.waypoints.len().max(1) as u32;
        let leg = self.scaled(params.duration()) / legs;
        entry.x = Tween::new(here.x, target.x, leg, params.easing, start_at);
        entry.y = Tween::new(here.y, target.y, leg, params.easing, start_at);
    }

    fn breathe(&self, entry: &mut CloudEntry, rng: &mut SmallRng, now: Instant) {
        let duration = self.scaled(self.params(entry.style).duration());
        if entry.rotation.is_finished(now) {
            let angle = (rng.random::<f32>() - 0.5) * MAX_ROTATION_SPAN;
            entry
                .rotation
                .retarget(angle, duration * 2, Easing::EaseInOutSine, now);
        }
        if entry.scale.is_finished(now) {
            let scale = rng.random_range(SCALE_RANGE[0]..=SCALE_RANGE[1]);
            entry.scale.retarget(scale, duration, Easing::EaseInOutSine, now);
        }
    }

    /// Advance one entry; returns true if it is still moving
    fn step(&self, entry: &mut CloudEntry, rng: &mut SmallRng, now: Instant) -> bool {
        if entry.state != CloudState::Animating {
            return false;
        }
        if entry.x.is_finished(now) && entry.y.is_finished(now) {
            let params = self.params(entry.style);
            let legs = entry.waypoints.len().max(1) as u32;
            let dwell = self.delay(params, rng) / legs;
            self.next_leg(entry, rng, now + dwell);
        }
        self.breathe(entry, rng, now);
        true
    }
}

fn lock<'a>(element: &'a Mutex<dyn CloudElement + 'static>) -> MutexGuard<'a, dyn CloudElement + 'static> {
    element.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Drives every registered cloud from a single tick
pub struct CloudMotionStore {
    config: MotionConfig,
    clouds: IndexMap<String, CloudEntry>,
    is_active: bool,
    style: MotionStyle,
    global_speed: f32,
    rng: SmallRng,
}

impl CloudMotionStore {
    pub fn new(config: MotionConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        Self {
            style: config.default_style,
            config,
            clouds: IndexMap::new(),
            is_active: true,
            global_speed: 1.0,
            rng,
        }
    }

    pub fn config(&self) -> &MotionConfig {
        &self.config
    }

    pub fn snapshot(&self) -> MotionSnapshot {
        MotionSnapshot {
            is_active: self.is_active,
            style: self.style,
            global_speed: self.global_speed,
            cloud_count: self.clouds.len(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn cloud_count(&self) -> usize {
        self.clouds.len()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.clouds.keys().map(String::as_str)
    }

    pub fn entry_state(&self, id: &str) -> Option<CloudState> {
        self.clouds.get(id).map(|entry| entry.state)
    }

    pub fn entry_style(&self, id: &str) -> Option<MotionStyle> {
        self.clouds.get(id).map(|entry| entry.style)
    }

    /// Position at `now`, in viewport percent
    pub fn position(&self, id: &str, now: Instant) -> Option<Position> {
        self.clouds
            .get(id)
            .map(|entry| entry.position(now, &self.config))
    }

    pub fn transform(&self, id: &str, now: Instant) -> Option<CloudTransform> {
        self.clouds
            .get(id)
            .map(|entry| entry.transform(now, &self.config))
    }

    /// Full waypoint loops finished since the entry last started
    pub fn loops_completed(&self, id: &str) -> Option<u32> {
        self.clouds.get(id).map(|entry| entry.loops_completed)
    }

    /// Register an element under `id`, replacing any entry with the same id.
    ///
    /// Elements with zero rendered height are rejected with
    /// [`CloudError::NotLaidOut`]; register again once layout has run.
    pub fn register_cloud<E>(
        &mut self,
        id: &str,
        element: &Arc<Mutex<E>>,
        style: Option<MotionStyle>,
        now: Instant,
    ) -> Result<()>
    where
        E: CloudElement + 'static,
    {
        let shared: Arc<Mutex<dyn CloudElement>> = element.clone();
        let height = lock(&shared).rendered_height();
        // Catches NaN from a detached element as well as zero
        if !(height > 0.0) {
            tracing::debug!(id, height, "cloud not laid out, skipping registration");
            return Err(CloudError::NotLaidOut(id.to_string()));
        }

        let start = random_position(&self.config, &mut self.rng);
        let style = style.unwrap_or(self.style);
        let mut entry = CloudEntry::new(Arc::downgrade(&shared), style, start, now);

        if self.is_active {
            let motion = Motion {
                config: &self.config,
                speed: self.global_speed,
            };
            motion.start(&mut entry, &mut self.rng, now);
        }
        lock(&shared).apply_transform(&entry.transform(now, &self.config));

        if self.clouds.insert(id.to_string(), entry).is_some() {
            tracing::debug!(id, "replaced existing cloud");
        }
        tracing::debug!(id, %style, x = start.x, y = start.y, "cloud registered");
        Ok(())
    }

    /// Drop an entry; returns false if `id` was unknown
    pub fn unregister_cloud(&mut self, id: &str) -> bool {
        let removed = self.clouds.shift_remove(id).is_some();
        if removed {
            tracing::debug!(id, "cloud unregistered");
        }
        removed
    }

    /// Start (or restart) one cloud on a fresh loop
    pub fn start_cloud(&mut self, id: &str, now: Instant) -> Result<()> {
        let entry = self
            .clouds
            .get_mut(id)
            .ok_or_else(|| CloudError::UnknownCloud(id.to_string()))?;
        if entry.state == CloudState::Animating {
            return Ok(());
        }
        let motion = Motion {
            config: &self.config,
            speed: self.global_speed,
        };
        motion.start(entry, &mut self.rng, now);
        Ok(())
    }

    /// Halt one cloud where it is
    pub fn stop_cloud(&mut self, id: &str, now: Instant) -> Result<()> {
        let entry = self
            .clouds
            .get_mut(id)
            .ok_or_else(|| CloudError::UnknownCloud(id.to_string()))?;
        entry.freeze(now);
        entry.state = CloudState::Stopped;
        Ok(())
    }

    /// Pause or resume every cloud.
    ///
    /// Pausing keeps the current position. Resuming starts a fresh loop from it.
    pub fn set_active(&mut self, active: bool, now: Instant) {
        if self.is_active == active {
            return;
        }
        self.is_active = active;

        let motion = Motion {
            config: &self.config,
            speed: self.global_speed,
        };
        for entry in self.clouds.values_mut() {
            if active {
                motion.start(entry, &mut self.rng, now);
            } else if entry.state == CloudState::Animating {
                entry.freeze(now);
                entry.state = CloudState::Paused;
            }
        }
        tracing::debug!(active, clouds = self.clouds.len(), "cloud motion toggled");
    }

    /// Switch every cloud to `style`; moving clouds restart with it
    pub fn set_animation_style(&mut self, style: MotionStyle, now: Instant) {
        self.style = style;
        let motion = Motion {
            config: &self.config,
            speed: self.global_speed,
        };
        for entry in self.clouds.values_mut() {
            entry.style = style;
            if entry.state == CloudState::Animating {
                motion.start(entry, &mut self.rng, now);
            }
        }
        tracing::debug!(%style, "cloud style changed");
    }

    /// Scale every duration by `1 / speed`; the current leg is re-timed from `now`
    pub fn set_global_speed(&mut self, speed: f32, now: Instant) -> Result<()> {
        if !(SPEED_RANGE[0]..=SPEED_RANGE[1]).contains(&speed) {
            tracing::warn!(speed, "rejected global speed");
            return Err(CloudError::InvalidSpeed(speed));
        }
        self.global_speed = speed;

        let motion = Motion {
            config: &self.config,
            speed,
        };
        for entry in self.clouds.values_mut() {
            if entry.state != CloudState::Animating {
                continue;
            }
            let params = motion.params(entry.style);
            let legs = entry.waypoints.len().max(1) as u32;
            let leg = motion.scaled(params.duration()) / legs;
            let (tx, ty) = (entry.x.target(), entry.y.target());
            entry.x.retarget(tx, leg, params.easing, now);
            entry.y.retarget(ty, leg, params.easing, now);
        }
        tracing::debug!(speed, "cloud speed changed");
        Ok(())
    }

    /// New viewport size; applies to loops generated from now on
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.config.viewport = Viewport { width, height };
    }

    /// Advance all clouds and push their transforms. Returns how many are moving.
    pub fn tick(&mut self, now: Instant) -> usize {
        let motion = Motion {
            config: &self.config,
            speed: self.global_speed,
        };
        let mut moving = 0;
        let mut gone = Vec::new();

        for (id, entry) in self.clouds.iter_mut() {
            let Some(element) = entry.element.upgrade() else {
                gone.push(id.clone());
                continue;
            };
            if !motion.step(entry, &mut self.rng, now) {
                continue;
            }
            moving += 1;
            lock(&element).apply_transform(&entry.transform(now, motion.config));
        }

        for id in gone {
            self.clouds.shift_remove(&id);
            tracing::debug!(id = %id, "cloud element dropped, unregistered");
        }
        tracing::trace!(moving, "cloud tick");
        moving
    }

    /// Stop everything and forget all clouds
    pub fn cleanup(&mut self) {
        let count = self.clouds.len();
        self.clouds.clear();
        self.is_active = false;
        tracing::debug!(count, "cloud store cleaned up");
    }
}

impl Default for CloudMotionStore {
    fn default() -> Self {
        Self::new(MotionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Default)]
    struct TestCloud {
        height: f32,
        last: Option<CloudTransform>,
        applied: usize,
    }

    impl TestCloud {
        fn laid_out() -> Arc<Mutex<Self>> {
            Arc::new(Mutex::new(Self {
                height: 120.0,
                ..Self::default()
            }))
        }
    }

    impl CloudElement for TestCloud {
        fn rendered_height(&self) -> f32 {
            self.height
        }

        fn apply_transform(&mut self, transform: &CloudTransform) {
            self.last = Some(*transform);
            self.applied += 1;
        }
    }

    fn seeded() -> CloudMotionStore {
        CloudMotionStore::new(MotionConfig {
            seed: Some(11),
            ..MotionConfig::default()
        })
    }

    fn run(store: &mut CloudMotionStore, from: Instant, ms: u64) -> Instant {
        let mut now = from;
        for _ in 0..ms / 16 {
            now += Duration::from_millis(16);
            store.tick(now);
        }
        now
    }

    #[test]
    fn zero_height_is_rejected() {
        let mut store = seeded();
        let cloud = Arc::new(Mutex::new(TestCloud::default()));
        let result = store.register_cloud("c1", &cloud, None, Instant::now());

        assert_eq!(result, Err(CloudError::NotLaidOut("c1".into())));
        assert_eq!(store.cloud_count(), 0);
    }

    #[test]
    fn unmeasurable_height_is_rejected() {
        let mut store = seeded();
        for (id, height) in [("nan", f32::NAN), ("negative", -4.0)] {
            let cloud = Arc::new(Mutex::new(TestCloud {
                height,
                ..TestCloud::default()
            }));
            let result = store.register_cloud(id, &cloud, None, Instant::now());
            assert_eq!(result, Err(CloudError::NotLaidOut(id.into())));
        }
        assert_eq!(store.cloud_count(), 0);
        assert!(!store.is_active());
    }

    #[test]
    fn registration_places_and_starts_cloud() {
        let mut store = seeded();
        let cloud = TestCloud::laid_out();
        store
            .register_cloud("c1", &cloud, Some(MotionStyle::Dynamic), Instant::now())
            .unwrap();

        assert_eq!(store.entry_state("c1"), Some(CloudState::Animating));
        assert_eq!(store.entry_style("c1"), Some(MotionStyle::Dynamic));
        assert_eq!(cloud.lock().unwrap().applied, 1);
    }

    #[test]
    fn inactive_store_only_registers() {
        let mut store = seeded();
        let t0 = Instant::now();
        store.set_active(false, t0);

        let cloud = TestCloud::laid_out();
        store.register_cloud("c1", &cloud, None, t0).unwrap();
        assert_eq!(store.entry_state("c1"), Some(CloudState::Registered));
        assert_eq!(store.tick(t0 + Duration::from_secs(1)), 0);
    }

    #[test]
    fn clouds_stay_inside_the_safe_zone() {
        let mut store = seeded();
        let t0 = Instant::now();
        let clouds: Vec<_> = (0..3).map(|_| TestCloud::laid_out()).collect();
        for (i, cloud) in clouds.iter().enumerate() {
            let style = MotionStyle::ALL[i];
            store.register_cloud(&format!("c{i}"), cloud, Some(style), t0).unwrap();
        }

        let (bx, by) = store.config().bounds();
        let mut now = t0;
        for _ in 0..2_000 {
            now += Duration::from_millis(16);
            assert_eq!(store.tick(now), 3);
            for cloud in &clouds {
                let t = cloud.lock().unwrap().last.unwrap();
                assert!(t.position.x >= bx[0] && t.position.x <= bx[1]);
                assert!(t.position.y >= by[0] && t.position.y <= by[1]);
                assert!(t.rotation.abs() <= MAX_ROTATION_SPAN / 2.0 + 1e-3);
            }
        }
    }

    #[test]
    fn dropped_elements_are_unregistered_on_tick() {
        let mut store = seeded();
        let t0 = Instant::now();
        let cloud = TestCloud::laid_out();
        store.register_cloud("c1", &cloud, None, t0).unwrap();

        drop(cloud);
        store.tick(t0 + Duration::from_millis(16));
        assert_eq!(store.cloud_count(), 0);
        assert_eq!(store.entry_state("c1"), None);
    }

    #[test]
    fn pause_holds_position_and_resume_restarts_from_it() {
        let mut store = seeded();
        let t0 = Instant::now();
        let cloud = TestCloud::laid_out();
        store.register_cloud("c1", &cloud, None, t0).unwrap();

        let paused_at = run(&mut store, t0, 5_000);
        store.set_active(false, paused_at);
        let held = store.position("c1", paused_at).unwrap();
        assert_eq!(store.entry_state("c1"), Some(CloudState::Paused));

        let later = paused_at + Duration::from_secs(30);
        assert_eq!(store.tick(later), 0);
        assert_eq!(store.position("c1", later), Some(held));

        store.set_active(true, later);
        assert_eq!(store.entry_state("c1"), Some(CloudState::Animating));
        assert_eq!(store.position("c1", later), Some(held));
        assert_eq!(store.loops_completed("c1"), Some(0));
    }

    #[test]
    fn loops_regenerate_when_exhausted() {
        let mut config = MotionConfig {
            seed: Some(5),
            ..MotionConfig::default()
        };
        config.styles.gentle.duration_ms = 1_000;
        config.styles.gentle.delay_max_ms = 0;
        let mut store = CloudMotionStore::new(config);
        let t0 = Instant::now();
        let cloud = TestCloud::laid_out();
        store.register_cloud("c1", &cloud, None, t0).unwrap();

        run(&mut store, t0, 5_000);
        assert!(store.loops_completed("c1").unwrap() >= 1);
    }

    #[test]
    fn speed_must_be_in_range() {
        let mut store = seeded();
        let now = Instant::now();
        assert_eq!(
            store.set_global_speed(0.0, now),
            Err(CloudError::InvalidSpeed(0.0))
        );
        assert!(store.set_global_speed(f32::NAN, now).is_err());
        store.set_global_speed(2.0, now).unwrap();
        assert_eq!(store.snapshot().global_speed, 2.0);
    }

    #[test]
    fn style_change_applies_to_every_cloud() {
        let mut store = seeded();
        let t0 = Instant::now();
        let a = TestCloud::laid_out();
        let b = TestCloud::laid_out();
        store.register_cloud("a", &a, Some(MotionStyle::Gentle), t0).unwrap();
        store.register_cloud("b", &b, Some(MotionStyle::Dynamic), t0).unwrap();

        store.set_animation_style(MotionStyle::Elastic, t0);
        assert_eq!(store.snapshot().style, MotionStyle::Elastic);
        assert_eq!(store.entry_style("a"), Some(MotionStyle::Elastic));
        assert_eq!(store.entry_style("b"), Some(MotionStyle::Elastic));
    }

    #[test]
    fn stop_and_start_single_cloud() {
        let mut store = seeded();
        let t0 = Instant::now();
        let cloud = TestCloud::laid_out();
        store.register_cloud("c1", &cloud, None, t0).unwrap();

        store.stop_cloud("c1", t0).unwrap();
        assert_eq!(store.entry_state("c1"), Some(CloudState::Stopped));
        store.start_cloud("c1", t0).unwrap();
        assert_eq!(store.entry_state("c1"), Some(CloudState::Animating));

        assert_eq!(
            store.start_cloud("nope", t0),
            Err(CloudError::UnknownCloud("nope".into()))
        );
    }

    #[test]
    fn cleanup_forgets_everything() {
        let mut store = seeded();
        let cloud = TestCloud::laid_out();
        store.register_cloud("c1", &cloud, None, Instant::now()).unwrap();

        store.cleanup();
        assert_eq!(
            store.snapshot(),
            MotionSnapshot {
                is_active: false,
                style: MotionStyle::Gentle,
                global_speed: 1.0,
                cloud_count: 0,
            }
        );
    }
}
