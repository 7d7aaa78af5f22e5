// Host-side tests for the sequencer and the display/blank state machine,
// driven with a simulated clock and a mock glyph provider.

use app_core::{
    ConfigError, GlyphBounds, GlyphSource, Phase, SceneEvent, SequenceTiming, Sequencer,
    SweepAnimation, SweepParams,
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

fn make_anim(sequence: &str, display: f64, blank: f64, threshold: f64, seed: u64) -> SweepAnimation {
    SweepAnimation::new(
        SweepParams {
            sequence: sequence.into(),
            timing: SequenceTiming {
                display_ms: display,
                blank_ms: blank,
                transition_threshold: threshold,
            },
            palette: vec![[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
        },
        seed,
    )
    .expect("valid params")
}

fn spawned_chars(events: &[SceneEvent]) -> Vec<char> {
    events
        .iter()
        .filter_map(|e| match e {
            SceneEvent::LetterSpawned { ch } => Some(*ch),
            SceneEvent::LetterCleared => None,
        })
        .collect()
}

#[test]
fn first_step_spawns_first_character() {
    let mut anim = make_anim("ABC", 1000.0, 500.0, 1.8, 7);
    let mut events = Vec::new();
    let frame = anim.step(0.0, &[], &MockGlyphs, &mut events);

    assert_eq!(events, vec![SceneEvent::LetterSpawned { ch: 'A' }]);
    assert_eq!(anim.phase(), Phase::Display);
    let letter = frame.letter.expect("letter visible");
    assert_eq!(letter.ch, 'A');
    assert!(letter.progress.abs() < 1e-6);
}

#[test]
fn phase_transitions_at_exact_thresholds() {
    // hold = 1000 * 1.8 = 1800 ms, blank ends at 2300 ms
    let mut anim = make_anim("ABC", 1000.0, 500.0, 1.8, 7);
    let mut events = Vec::new();

    anim.step(0.0, &[], &MockGlyphs, &mut events);
    events.clear();

    let frame = anim.step(1799.9, &[], &MockGlyphs, &mut events);
    assert!(frame.letter.is_some(), "letter must survive until the hold ends");
    assert!(events.is_empty());

    let frame = anim.step(1800.0, &[], &MockGlyphs, &mut events);
    assert!(frame.letter.is_none());
    assert_eq!(events, vec![SceneEvent::LetterCleared]);
    assert_eq!(anim.phase(), Phase::Blank);
    assert_eq!(frame.glow.intensity, 0.0, "glow drops with the letter");
    events.clear();

    let frame = anim.step(2299.9, &[], &MockGlyphs, &mut events);
    assert!(frame.letter.is_none());
    assert!(events.is_empty());

    let frame = anim.step(2300.0, &[], &MockGlyphs, &mut events);
    assert_eq!(events, vec![SceneEvent::LetterSpawned { ch: 'B' }]);
    assert_eq!(frame.letter.expect("respawned").ch, 'B');
}

#[test]
fn letter_recreated_within_one_cycle_of_frames() {
    // End-to-end: display=1000, blank=500, threshold=1.8; stepping at ~60fps
    // the letter must have been destroyed and recreated by t = 1801 + 500 + a
    // frame of slack.
    let mut anim = make_anim("ABC", 1000.0, 500.0, 1.8, 7);
    let mut events = Vec::new();
    let mut spawns = 0;
    let mut clears = 0;
    let mut t = 0.0;
    while t <= 1801.0 + 500.0 + 17.0 {
        events.clear();
        anim.step(t, &[], &MockGlyphs, &mut events);
        for e in &events {
            match e {
                SceneEvent::LetterSpawned { .. } => spawns += 1,
                SceneEvent::LetterCleared => clears += 1,
            }
        }
        t += 16.0;
    }
    assert!(clears >= 1, "letter never destroyed");
    assert!(spawns >= 2, "letter never recreated");
}

#[test]
fn sequence_cycles_in_order_and_wraps() {
    let mut anim = make_anim("ABC", 100.0, 50.0, 1.5, 1);
    let mut events = Vec::new();
    let mut all = Vec::new();
    let mut t = 0.0;
    // four full cycles of (100 * 1.5 + 50) = 200 ms each
    while t <= 4.0 * 200.0 + 10.0 {
        events.clear();
        anim.step(t, &[], &MockGlyphs, &mut events);
        all.extend(spawned_chars(&events));
        t += 5.0;
    }
    assert!(all.len() >= 4);
    // strict cyclic order: every character exactly once per full pass
    for (i, ch) in all.iter().enumerate() {
        assert_eq!(*ch, ['A', 'B', 'C'][i % 3], "out of order at spawn {i}");
    }
    // after k spawns the index sits at (k - 1) mod N
    assert_eq!(anim.sequence_index(), (all.len() - 1) % 3);
}

#[test]
fn single_character_sequence_recolors_deterministically() {
    let collect_colors = |seed: u64| -> Vec<[f32; 3]> {
        let mut anim = make_anim("A", 100.0, 50.0, 1.5, seed);
        let mut events = Vec::new();
        let mut colors = Vec::new();
        let mut t = 0.0;
        while colors.len() < 8 {
            events.clear();
            anim.step(t, &[], &MockGlyphs, &mut events);
            if spawned_chars(&events).first().is_some() {
                colors.push(anim.letter().expect("just spawned").color);
            }
            t += 5.0;
        }
        colors
    };

    // fixed seed reproduces the exact color choice sequence
    assert_eq!(collect_colors(42), collect_colors(42));
    // and the choice actually varies across recreations
    let colors = collect_colors(42);
    let first = colors[0];
    assert!(
        colors.iter().any(|c| *c != first),
        "palette choice never varied over 8 cycles"
    );
}

#[test]
fn progress_is_unbounded_above_one_during_hold() {
    let mut anim = make_anim("A", 100.0, 50.0, 3.0, 7);
    let mut events = Vec::new();
    anim.step(0.0, &[], &MockGlyphs, &mut events);
    let frame = anim.step(250.0, &[], &MockGlyphs, &mut events);
    let letter = frame.letter.expect("still holding");
    assert!((letter.progress - 2.5).abs() < 1e-4);
}

#[test]
fn invalid_configurations_are_rejected() {
    let base = SweepParams::default();

    let mut p = base.clone();
    p.sequence = String::new();
    assert!(matches!(
        SweepAnimation::new(p, 0).unwrap_err(),
        ConfigError::EmptySequence
    ));

    let mut p = base.clone();
    p.timing.display_ms = 0.0;
    assert!(matches!(
        SweepAnimation::new(p, 0).unwrap_err(),
        ConfigError::NonPositiveDisplay(_)
    ));

    let mut p = base.clone();
    p.timing.blank_ms = -1.0;
    assert!(matches!(
        SweepAnimation::new(p, 0).unwrap_err(),
        ConfigError::NonPositiveBlank(_)
    ));

    let mut p = base.clone();
    p.timing.transition_threshold = 0.5;
    assert!(matches!(
        SweepAnimation::new(p, 0).unwrap_err(),
        ConfigError::ThresholdBelowOne(_)
    ));

    let mut p = base.clone();
    p.palette.clear();
    assert!(matches!(
        SweepAnimation::new(p, 0).unwrap_err(),
        ConfigError::EmptyPalette
    ));

    let mut p = base;
    p.sequence = "A B".into();
    assert!(matches!(
        SweepAnimation::new(p, 0).unwrap_err(),
        ConfigError::WhitespaceInSequence(' ')
    ));
}

#[test]
fn sequencer_advances_with_wraparound() {
    let mut seq = Sequencer::new("AB").expect("valid");
    assert_eq!(seq.len(), 2);
    assert_eq!(seq.advance(), 'A', "first advance yields the first character");
    assert_eq!(seq.advance(), 'B');
    assert_eq!(seq.advance(), 'A');
    assert_eq!(seq.index(), 0);
}

#[test]
fn timing_hold_is_display_times_threshold() {
    let timing = SequenceTiming {
        display_ms: 1100.0,
        blank_ms: 1000.0,
        transition_threshold: 1.85,
    };
    assert!((timing.hold_ms() - 2035.0).abs() < 1e-9);
    assert!((timing.progress(550.0) - 0.5).abs() < 1e-6);
}
