//! Load behaviour of the transition scheduler

use nuvens_animation::{PropertySink, TransitionConfig, TransitionOutcome, TransitionScheduler};
use nuvens_core::Hsl;
use std::collections::HashMap;
use std::time::{Duration, Instant};

#[derive(Default)]
struct Sheet {
    values: HashMap<String, String>,
}

impl PropertySink for Sheet {
    fn set_property(&mut self, property: &str, value: &str) {
        self.values.insert(property.to_string(), value.to_string());
    }
}

#[test]
fn requests_beyond_the_cap_apply_instantly() {
    let mut scheduler = TransitionScheduler::new(TransitionConfig {
        max_active: 20,
        ..Default::default()
    });
    let mut sheet = Sheet::default();
    let t0 = Instant::now();
    let from = Hsl::new(145.0, 100.0, 95.0);
    let to = Hsl::new(145.0, 100.0, 5.0);

    let mut handles: Vec<_> = (0..40)
        .map(|i| {
            scheduler.animate_property(
                &format!("--prop-{i}"),
                from,
                to,
                Duration::from_millis(300),
                t0,
                &mut sheet,
            )
        })
        .collect();

    let instant = handles
        .iter_mut()
        .filter_map(|h| h.try_outcome())
        .filter(|outcome| *outcome == TransitionOutcome::AppliedInstantly)
        .count();
    assert_eq!(scheduler.active_count(), 20);
    assert_eq!(instant, 20);
    for i in 20..40 {
        assert_eq!(sheet.values[&format!("--prop-{i}")], to.to_css());
    }

    // Drive frames at ~60fps until everything settles
    let mut now = t0;
    while scheduler.active_count() > 0 {
        now += Duration::from_millis(16);
        scheduler.tick(now, &mut sheet);
    }

    for handle in handles.iter_mut() {
        let outcome = handle.try_outcome();
        assert!(
            matches!(
                outcome,
                Some(TransitionOutcome::Completed) | Some(TransitionOutcome::AppliedInstantly)
            ),
            "unexpected outcome {outcome:?}"
        );
    }
    for i in 0..40 {
        assert_eq!(sheet.values[&format!("--prop-{i}")], to.to_css());
    }
    assert_eq!(scheduler.stats().completed, 20);
    assert_eq!(scheduler.stats().instant, 20);
}

#[test]
fn superseding_frees_the_slot_for_the_same_property() {
    let mut scheduler = TransitionScheduler::new(TransitionConfig {
        max_active: 1,
        ..Default::default()
    });
    let mut sheet = Sheet::default();
    let t0 = Instant::now();
    let a = Hsl::new(10.0, 50.0, 50.0);
    let b = Hsl::new(200.0, 50.0, 50.0);

    let duration = Duration::from_millis(300);

    scheduler.animate_property("--x", a, b, duration, t0, &mut sheet);
    let mut again = scheduler.animate_property("--x", b, a, duration, t0, &mut sheet);

    assert_eq!(again.try_outcome(), None);
    assert!(scheduler.is_animating("--x"));
}
