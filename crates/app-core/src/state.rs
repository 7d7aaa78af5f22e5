//! Animation state shared with the frontends.
//!
//! [`SweepAnimation`] is an explicit state object: pointer handlers enqueue
//! [`PointerInput`]s, the frame loop drains them into [`SweepAnimation::step`]
//! with the current absolute time, and the step returns everything the
//! renderer needs for the frame. No wall clock, GPU handle or DOM type is
//! touched here, so the whole cycle runs under host-side tests.

use crate::error::ConfigError;
use crate::glow;
use crate::glyph::{GlyphBounds, GlyphSource};
use crate::motion::{DragTracker, PointerInput, Pulse, RotationState};
use crate::sequence::{Phase, SequenceTiming, Sequencer};
use crate::{LETTER_BASE_SCALE, LETTER_PALETTE};
use glam::{EulerRot, Mat4, Vec3};
use rand::prelude::*;

/// Simple right-handed camera description with perspective projection.
#[derive(Clone, Debug)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub aspect: f32,
    pub fovy_radians: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Camera {
    pub fn facing_letter(aspect: f32) -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, crate::CAMERA_Z),
            target: Vec3::ZERO,
            up: Vec3::Y,
            aspect,
            fovy_radians: crate::CAMERA_FOVY_RADIANS,
            znear: 0.1,
            zfar: 1000.0,
        }
    }

    /// Compute the clip-space projection matrix.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fovy_radians, self.aspect, self.znear, self.zfar)
    }

    /// Compute the view matrix that transforms world to view space.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }
}

/// Runtime parameters; everything else is a tuning constant.
#[derive(Clone, Debug)]
pub struct SweepParams {
    pub sequence: String,
    pub timing: SequenceTiming,
    pub palette: Vec<[f32; 3]>,
}

impl Default for SweepParams {
    fn default() -> Self {
        Self {
            sequence: crate::DEFAULT_SEQUENCE.to_string(),
            timing: SequenceTiming::default(),
            palette: LETTER_PALETTE.to_vec(),
        }
    }
}

/// The one live letter. Destroyed before the next one exists.
#[derive(Clone, Copy, Debug)]
pub struct Letter {
    pub ch: char,
    pub color: [f32; 3],
    pub bounds: GlyphBounds,
    pub spawned_at_ms: f64,
}

/// Lifecycle notifications for the renderer (mesh upload / teardown).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SceneEvent {
    LetterSpawned { ch: char },
    LetterCleared,
}

/// Per-frame shading parameters for the live letter.
#[derive(Clone, Copy, Debug)]
pub struct LetterFrame {
    pub ch: char,
    /// Normalized sweep progress; exceeds 1 during the lingering trail.
    pub progress: f32,
    pub color: [f32; 3],
    pub bounds: GlyphBounds,
    pub pulse: f32,
    pub orientation: Vec3,
    pub scale: Vec3,
}

impl LetterFrame {
    /// Model matrix: persistent orientation plus the pulse-boosted scale.
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_euler(
            EulerRot::XYZ,
            self.orientation.x,
            self.orientation.y,
            self.orientation.z,
        ) * Mat4::from_scale(self.scale)
    }
}

/// Background glow parameters; intensity zero while blank.
#[derive(Clone, Copy, Debug)]
pub struct GlowFrame {
    pub color: [f32; 3],
    pub intensity: f32,
    pub center_uv: [f32; 2],
}

impl GlowFrame {
    pub const OFF: Self = Self {
        color: [0.0, 0.0, 0.0],
        intensity: 0.0,
        center_uv: [0.5, 0.5],
    };
}

/// Everything the renderer consumes for one frame.
#[derive(Clone, Copy, Debug)]
pub struct FrameUniforms {
    pub letter: Option<LetterFrame>,
    pub glow: GlowFrame,
    pub bloom_strength: f32,
}

#[derive(Debug)]
pub struct SweepAnimation {
    params: SweepParams,
    sequencer: Sequencer,
    rng: StdRng,
    rotation: RotationState,
    pulse: Pulse,
    drag: DragTracker,
    letter: Option<Letter>,
    blank_until_ms: Option<f64>,
}

impl SweepAnimation {
    pub fn new(params: SweepParams, seed: u64) -> Result<Self, ConfigError> {
        params.timing.validate()?;
        if params.palette.is_empty() {
            return Err(ConfigError::EmptyPalette);
        }
        let sequencer = Sequencer::new(&params.sequence)?;
        let mut rng = StdRng::seed_from_u64(seed);
        let rotation = RotationState::with_random_velocity(&mut rng);
        Ok(Self {
            params,
            sequencer,
            rng,
            rotation,
            pulse: Pulse::default(),
            drag: DragTracker::default(),
            letter: None,
            blank_until_ms: None,
        })
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        if self.letter.is_some() {
            Phase::Display
        } else {
            Phase::Blank
        }
    }

    #[inline]
    pub fn letter(&self) -> Option<&Letter> {
        self.letter.as_ref()
    }

    #[inline]
    pub fn pulse_value(&self) -> f32 {
        self.pulse.value()
    }

    #[inline]
    pub fn rotation(&self) -> &RotationState {
        &self.rotation
    }

    #[inline]
    pub fn dragging(&self) -> bool {
        self.drag.dragging()
    }

    #[inline]
    pub fn sequence_index(&self) -> usize {
        self.sequencer.index()
    }

    /// Advance the animation by one frame.
    ///
    /// `now_ms` is absolute elapsed time from the host clock; `inputs` are
    /// the pointer events queued since the previous frame, in arrival order.
    /// Spawn/teardown notifications are appended to `out_events`.
    pub fn step(
        &mut self,
        now_ms: f64,
        inputs: &[PointerInput],
        glyphs: &dyn GlyphSource,
        out_events: &mut Vec<SceneEvent>,
    ) -> FrameUniforms {
        for input in inputs {
            match *input {
                PointerInput::Down { x, y } => {
                    self.drag.begin(x, y);
                    self.pulse.trigger();
                }
                PointerInput::Move { x, y } => {
                    if let Some((dx, dy)) = self.drag.delta(x, y) {
                        self.rotation.apply_drag(dx, dy);
                    }
                }
                PointerInput::Up => self.drag.end(),
            }
        }

        self.rotation.integrate(self.drag.dragging());

        let hold_ms = self.params.timing.hold_ms();
        if let Some(letter) = self.letter {
            if now_ms - letter.spawned_at_ms >= hold_ms {
                self.blank_until_ms =
                    Some(letter.spawned_at_ms + hold_ms + self.params.timing.blank_ms);
                self.letter = None;
                out_events.push(SceneEvent::LetterCleared);
                log::debug!("[sequence] clear {:?}", letter.ch);
            }
        }
        if self.letter.is_none() && self.blank_until_ms.map_or(true, |t| now_ms >= t) {
            self.spawn_letter(now_ms, glyphs, out_events);
        }

        let pulse = self.pulse.value();
        let letter_frame = self.letter.map(|l| {
            let progress = self.params.timing.progress(now_ms - l.spawned_at_ms);
            LetterFrame {
                ch: l.ch,
                progress,
                color: l.color,
                bounds: l.bounds,
                pulse,
                orientation: self.rotation.orientation,
                scale: LETTER_BASE_SCALE * glow::pulse_scale(pulse),
            }
        });
        let glow = match &letter_frame {
            Some(lf) => GlowFrame {
                color: lf.color,
                intensity: glow::glow_intensity(lf.progress, pulse),
                center_uv: [0.5, glow::glow_center_y(lf.progress)],
            },
            None => GlowFrame::OFF,
        };

        // Decay after the frame is built so the frame that processed a
        // pointer-down renders the full flash.
        self.pulse.decay();

        FrameUniforms {
            letter: letter_frame,
            glow,
            bloom_strength: glow::bloom_strength(pulse),
        }
    }

    fn spawn_letter(
        &mut self,
        now_ms: f64,
        glyphs: &dyn GlyphSource,
        out_events: &mut Vec<SceneEvent>,
    ) {
        let ch = self.sequencer.advance();
        let Some(bounds) = glyphs.bounds(ch) else {
            // Font misconfiguration; stay blank and retry after another pause
            // rather than spinning every frame.
            log::error!("[sequence] no glyph for {ch:?}; staying blank");
            self.blank_until_ms = Some(now_ms + self.params.timing.blank_ms);
            return;
        };
        assert!(
            !bounds.is_degenerate(),
            "degenerate glyph bounds for {ch:?}"
        );
        let color = *self
            .params
            .palette
            .choose(&mut self.rng)
            .unwrap_or(&LETTER_PALETTE[0]);
        self.letter = Some(Letter {
            ch,
            color,
            bounds,
            spawned_at_ms: now_ms,
        });
        self.blank_until_ms = None;
        out_events.push(SceneEvent::LetterSpawned { ch });
        log::debug!("[sequence] spawn {:?} color={:?}", ch, color);
    }
}
