//! Property tests for the HSL color model

use nuvens_core::color::{format_color, interpolate, parse_color, Hsl};
use proptest::prelude::*;

fn hsl_strategy() -> impl Strategy<Value = Hsl> {
    (0.0f32..360.0, 0.0f32..=100.0, 0.0f32..=100.0, 0.0f32..=1.0)
        .prop_map(|(h, s, l, a)| Hsl { h, s, l, a })
}

fn hue_distance(a: f32, b: f32) -> f32 {
    let d = (a - b).abs().rem_euclid(360.0);
    d.min(360.0 - d)
}

proptest! {
    #[test]
    fn interpolating_a_color_with_itself_is_identity(c in hsl_strategy(), t in 0.0f32..=1.0) {
        prop_assert_eq!(interpolate(&c, &c, t), c);
    }

    #[test]
    fn hue_never_leaves_the_shorter_arc(
        a in hsl_strategy(),
        b in hsl_strategy(),
        t in 0.0f32..=1.0,
    ) {
        let arc = hue_distance(a.h, b.h);
        let mid = interpolate(&a, &b, t);
        // Distance travelled from the start never exceeds the short arc length
        prop_assert!(hue_distance(a.h, mid.h) <= arc + 1e-2);
        prop_assert!(hue_distance(mid.h, b.h) <= arc + 1e-2);
    }

    #[test]
    fn endpoints_are_reached(a in hsl_strategy(), b in hsl_strategy()) {
        prop_assert!(interpolate(&a, &b, 0.0).approx_eq(&a));
        let end = interpolate(&a, &b, 1.0);
        prop_assert!(hue_distance(end.h, b.h) < 1e-2);
        prop_assert!((end.l - b.l).abs() < 1e-3);
    }

    #[test]
    fn formatted_text_parses_back(c in hsl_strategy()) {
        let parsed = parse_color(&format_color(&c)).expect("formatted color must parse");
        prop_assert!(hue_distance(parsed.h, c.h) < 0.01);
        prop_assert!((parsed.s - c.s).abs() < 0.01);
        prop_assert!((parsed.l - c.l).abs() < 0.01);
        if c.a < 1.0 {
            prop_assert!((parsed.a - c.a).abs() < 0.01);
        }
    }
}

#[test]
fn half_way_from_350_to_10_is_red_not_cyan() {
    let mid = interpolate(&Hsl::new(350.0, 80.0, 50.0), &Hsl::new(10.0, 80.0, 50.0), 0.5);
    assert!(hue_distance(mid.h, 0.0) < 1e-3, "hue was {}", mid.h);
}
