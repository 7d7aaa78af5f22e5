// Host-side tests for the motion model: damping floor, drag momentum and
// the pointer-down pulse.

use app_core::{
    GlyphBounds, GlyphSource, PointerInput, Pulse, RotationState, SweepAnimation, SweepParams,
    PULSE_DECAY, PULSE_EPSILON, VELOCITY_FLOOR,
};
use glam::Vec3;

struct MockGlyphs;

impl GlyphSource for MockGlyphs {
    fn bounds(&self, _ch: char) -> Option<GlyphBounds> {
        Some(GlyphBounds {
            min: Vec3::new(-1.0, -1.0, -0.5),
            max: Vec3::new(1.0, 1.0, 0.5),
        })
    }
}

fn make_anim(seed: u64) -> SweepAnimation {
    SweepAnimation::new(SweepParams::default(), seed).expect("valid params")
}

#[test]
fn velocity_never_drops_below_floor_when_idle() {
    let mut anim = make_anim(3);
    let mut events = Vec::new();
    for i in 0..2000 {
        anim.step(i as f64 * 16.0, &[], &MockGlyphs, &mut events);
        events.clear();
    }
    let v = anim.rotation().velocity;
    for (axis, value) in [("x", v.x), ("y", v.y), ("z", v.z)] {
        assert!(
            value.abs() >= VELOCITY_FLOOR - 1e-9,
            "{axis} axis decayed below the floor: {value}"
        );
    }
    // and damping has had time to bring it all the way down to the floor
    assert!((v.x.abs() - VELOCITY_FLOOR).abs() < 1e-6);
    assert!((v.y.abs() - VELOCITY_FLOOR).abs() < 1e-6);
    assert!((v.z.abs() - VELOCITY_FLOOR).abs() < 1e-6);
}

#[test]
fn floor_preserves_sign_and_defaults_positive() {
    let mut rot = RotationState {
        orientation: Vec3::ZERO,
        velocity: Vec3::new(-0.0001, 0.0, 0.0001),
    };
    rot.integrate(false);
    assert!((rot.velocity.x + VELOCITY_FLOOR).abs() < 1e-9, "negative sign kept");
    assert!((rot.velocity.y - VELOCITY_FLOOR).abs() < 1e-9, "zero becomes positive");
    assert!((rot.velocity.z - VELOCITY_FLOOR).abs() < 1e-9, "positive sign kept");
}

#[test]
fn drag_steers_orientation_and_seeds_momentum() {
    let mut anim = make_anim(3);
    let mut events = Vec::new();
    anim.step(0.0, &[], &MockGlyphs, &mut events);

    let before = anim.rotation().orientation;
    let inputs = [
        PointerInput::Down { x: 100.0, y: 100.0 },
        PointerInput::Move { x: 110.0, y: 105.0 },
    ];
    anim.step(16.0, &inputs, &MockGlyphs, &mut events);

    let rot = anim.rotation();
    assert!(anim.dragging());
    assert!((rot.orientation.y - before.y - 10.0 * 0.003).abs() < 1e-6);
    assert!((rot.orientation.x - before.x - 5.0 * 0.003).abs() < 1e-6);
    assert!((rot.velocity.y - 10.0 * 0.002).abs() < 1e-6);
    assert!((rot.velocity.x - 5.0 * 0.002).abs() < 1e-6);

    // release: the drag velocity persists and then decays frame by frame
    anim.step(32.0, &[PointerInput::Up], &MockGlyphs, &mut events);
    assert!(!anim.dragging());
    let v_release = anim.rotation().velocity.y;
    anim.step(48.0, &[], &MockGlyphs, &mut events);
    let v_next = anim.rotation().velocity.y;
    assert!(v_next < v_release, "momentum must decay after release");
    assert!(v_next > VELOCITY_FLOOR, "still well above the floor");
}

#[test]
fn no_damping_while_dragging() {
    let mut anim = make_anim(3);
    let mut events = Vec::new();
    anim.step(0.0, &[], &MockGlyphs, &mut events);
    let inputs = [
        PointerInput::Down { x: 0.0, y: 0.0 },
        PointerInput::Move { x: 50.0, y: 0.0 },
    ];
    anim.step(16.0, &inputs, &MockGlyphs, &mut events);
    let held = anim.rotation().velocity;
    for i in 2..20 {
        anim.step(i as f64 * 16.0, &[], &MockGlyphs, &mut events);
    }
    assert_eq!(anim.rotation().velocity, held, "velocity frozen during drag");
}

#[test]
fn hover_moves_without_drag_are_ignored() {
    let mut anim = make_anim(3);
    let mut events = Vec::new();
    anim.step(0.0, &[], &MockGlyphs, &mut events);
    let before = anim.rotation().orientation;
    anim.step(
        16.0,
        &[PointerInput::Move { x: 500.0, y: 500.0 }],
        &MockGlyphs,
        &mut events,
    );
    let after = anim.rotation().orientation;
    // only the ambient tumble moved it, never the hover delta
    assert!((after - before).length() < 10.0 * VELOCITY_FLOOR);
}

#[test]
fn pulse_is_full_on_the_down_frame_and_decays_out() {
    let mut anim = make_anim(3);
    let mut events = Vec::new();
    anim.step(0.0, &[], &MockGlyphs, &mut events);

    let frame = anim.step(
        16.0,
        &[
            PointerInput::Down { x: 10.0, y: 10.0 },
            PointerInput::Up,
        ],
        &MockGlyphs,
        &mut events,
    );
    assert_eq!(frame.letter.expect("visible").pulse, 1.0);

    // decay factor^n < 0.001 within ceil(ln 0.001 / ln 0.92) = 83 frames
    let limit = (0.001_f32.ln() / PULSE_DECAY.ln()).ceil() as usize;
    let mut frames = 0;
    while anim.pulse_value() >= 0.001 {
        frames += 1;
        assert!(frames <= limit, "pulse survived past {limit} frames");
        let prev = anim.pulse_value();
        anim.step(16.0 + frames as f64 * 16.0, &[], &MockGlyphs, &mut events);
        assert!(anim.pulse_value() <= prev, "pulse must never increase");
    }
}

#[test]
fn pulse_snaps_to_exact_zero() {
    let mut pulse = Pulse::default();
    pulse.trigger();
    let mut n = 0;
    while pulse.value() > 0.0 {
        pulse.decay();
        n += 1;
        assert!(n < 200, "pulse failed to terminate");
    }
    assert_eq!(pulse.value(), 0.0);
    // it decayed geometrically until the epsilon snap
    assert!(PULSE_DECAY.powi(n) < PULSE_EPSILON / PULSE_DECAY);
}

#[test]
fn pulse_scales_letter_and_bloom_together() {
    let mut anim = make_anim(3);
    let mut events = Vec::new();
    anim.step(0.0, &[], &MockGlyphs, &mut events);
    let rest = anim.step(16.0, &[], &MockGlyphs, &mut events);
    let flash = anim.step(
        32.0,
        &[PointerInput::Down { x: 0.0, y: 0.0 }],
        &MockGlyphs,
        &mut events,
    );
    assert!(flash.bloom_strength > rest.bloom_strength);
    let rest_scale = rest.letter.expect("letter").scale;
    let flash_scale = flash.letter.expect("letter").scale;
    assert!(flash_scale.x > rest_scale.x && flash_scale.y > rest_scale.y);
    assert!(flash.glow.intensity >= rest.glow.intensity);
}
