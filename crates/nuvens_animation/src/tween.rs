//! Scalar tweens over wall-clock time

use crate::easing::Easing;
use std::time::{Duration, Instant};

/// Interpolates a single value from `from` to `to` over `duration`
#[derive(Clone, Debug)]
pub struct Tween {
    from: f32,
    to: f32,
    started_at: Instant,
    duration: Duration,
    easing: Easing,
}

impl Tween {
    pub fn new(from: f32, to: f32, duration: Duration, easing: Easing, now: Instant) -> Self {
        Self {
            from,
            to,
            started_at: now,
            duration,
            easing,
        }
    }

    /// A tween already resting at `value`
    pub fn settled(value: f32, now: Instant) -> Self {
        Self::new(value, value, Duration::ZERO, Easing::Linear, now)
    }

    /// Linear progress in `[0, 1]`
    pub fn progress(&self, now: Instant) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.started_at);
        (elapsed.as_secs_f32() / self.duration.as_secs_f32()).clamp(0.0, 1.0)
    }

    /// Eased value at `now`
    pub fn value_at(&self, now: Instant) -> f32 {
        let eased = self.easing.apply(self.progress(now));
        self.from + (self.to - self.from) * eased
    }

    pub fn is_finished(&self, now: Instant) -> bool {
        self.progress(now) >= 1.0
    }

    pub fn target(&self) -> f32 {
        self.to
    }

    /// Start a new segment from wherever the tween currently is
    pub fn retarget(&mut self, to: f32, duration: Duration, easing: Easing, now: Instant) {
        self.from = self.value_at(now);
        self.to = to;
        self.started_at = now;
        self.duration = duration;
        self.easing = easing;
    }

    /// Stop in place, keeping the current value
    pub fn freeze(&mut self, now: Instant) {
        let value = self.value_at(now);
        *self = Self::settled(value, now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_tween_progresses_with_time() {
        let t0 = Instant::now();
        let tween = Tween::new(0.0, 100.0, Duration::from_millis(200), Easing::Linear, t0);

        assert_eq!(tween.value_at(t0), 0.0);
        assert!((tween.value_at(t0 + Duration::from_millis(50)) - 25.0).abs() < 1e-3);
        assert_eq!(tween.value_at(t0 + Duration::from_millis(400)), 100.0);
        assert!(tween.is_finished(t0 + Duration::from_millis(200)));
    }

    #[test]
    fn retarget_starts_from_current_value() {
        let t0 = Instant::now();
        let mut tween = Tween::new(0.0, 10.0, Duration::from_millis(100), Easing::Linear, t0);
        let mid = t0 + Duration::from_millis(50);

        tween.retarget(20.0, Duration::from_millis(100), Easing::Linear, mid);
        assert!((tween.value_at(mid) - 5.0).abs() < 1e-3);
        assert_eq!(tween.target(), 20.0);
    }

    #[test]
    fn freeze_holds_position() {
        let t0 = Instant::now();
        let mut tween = Tween::new(0.0, 10.0, Duration::from_millis(100), Easing::Linear, t0);
        let mid = t0 + Duration::from_millis(30);

        tween.freeze(mid);
        assert!((tween.value_at(mid + Duration::from_secs(5)) - 3.0).abs() < 1e-3);
        assert!(tween.is_finished(mid));
    }
}
