// Host-side tests for the glow/bloom/scale parameter mappings.

use app_core::glow::{bloom_strength, glow_center_y, glow_intensity, pulse_scale};
use app_core::{
    BLOOM_PULSE_SPAN, BLOOM_STRENGTH_BASE, GLOW_FALL_RATE, GLOW_PULSE_GAIN, GLOW_RISE_END,
    GLOW_RISE_RATE, SCALE_PULSE_MULTIPLIER,
};

#[test]
fn glow_intensity_is_never_negative() {
    // progress keeps running past 1.0 during the lingering hold
    for i in 0..=500 {
        let progress = i as f32 * 0.01;
        for pulse in [0.0, 0.25, 1.0] {
            let g = glow_intensity(progress, pulse);
            assert!(
                g >= 0.0,
                "negative glow {g} at progress {progress} pulse {pulse}"
            );
        }
    }
}

#[test]
fn glow_rises_then_falls() {
    // rising segment
    assert!(glow_intensity(0.2, 0.0) < glow_intensity(0.4, 0.0));
    assert!(glow_intensity(0.4, 0.0) < glow_intensity(0.79, 0.0));
    // falling segment is steeper
    assert!(glow_intensity(0.85, 0.0) > glow_intensity(0.95, 0.0));
    // fully clamped once the sweep has passed
    assert_eq!(glow_intensity(1.0, 0.0), 0.0);
    assert_eq!(glow_intensity(2.0, 0.0), 0.0);
}

#[test]
fn glow_curve_is_continuous_at_the_knee() {
    let before = glow_intensity(GLOW_RISE_END - 1e-4, 0.0);
    let after = glow_intensity(GLOW_RISE_END + 1e-4, 0.0);
    assert!(
        (before - after).abs() < 1e-3,
        "discontinuity at the knee: {before} vs {after}"
    );
    // which pins the rates together
    assert!(
        (GLOW_RISE_END * GLOW_RISE_RATE - (1.0 - GLOW_RISE_END) * GLOW_FALL_RATE).abs() < 1e-4
    );
}

#[test]
fn pulse_feeds_glow_additively() {
    let base = glow_intensity(0.5, 0.0);
    let boosted = glow_intensity(0.5, 1.0);
    assert!((boosted - base - GLOW_PULSE_GAIN).abs() < 1e-6);
}

#[test]
fn glow_center_tracks_the_sweep_downward() {
    assert_eq!(glow_center_y(0.0), 1.0);
    assert!((glow_center_y(0.25) - 0.75).abs() < 1e-6);
    assert!(glow_center_y(1.2) < 0.0, "center keeps moving during the trail");
}

#[test]
fn bloom_strength_maps_pulse_linearly() {
    assert!((bloom_strength(0.0) - BLOOM_STRENGTH_BASE).abs() < 1e-6);
    assert!((bloom_strength(1.0) - (BLOOM_STRENGTH_BASE + BLOOM_PULSE_SPAN)).abs() < 1e-6);
}

#[test]
fn pulse_scale_is_bounded() {
    assert_eq!(pulse_scale(0.0), 1.0);
    assert!((pulse_scale(1.0) - (1.0 + SCALE_PULSE_MULTIPLIER)).abs() < 1e-6);
    for i in 0..=10 {
        let p = i as f32 * 0.1;
        let s = pulse_scale(p);
        assert!((1.0..=1.0 + SCALE_PULSE_MULTIPLIER + 1e-6).contains(&s));
    }
}
