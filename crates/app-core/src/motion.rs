//! Rotation, drag tracking and the pointer-down pulse.
//!
//! Damping, the velocity floor and the pulse decay are per-frame geometric
//! factors, matching the frame-locked feel of the effect; phase timing is
//! wall-clock-based and lives in [`crate::sequence`].

use crate::{
    INITIAL_VELOCITY_JITTER, MOMENTUM_MULTIPLIER, PULSE_DECAY, PULSE_EPSILON,
    ROTATION_DAMPING, ROTATION_SENSITIVITY, VELOCITY_FLOOR,
};
use glam::Vec3;
use rand::Rng;

/// Pointer input as delivered by the host, drained at the start of a frame.
/// Coordinates are pixels; only deltas matter to the motion model.
#[derive(Clone, Copy, Debug)]
pub enum PointerInput {
    Down { x: f32, y: f32 },
    Move { x: f32, y: f32 },
    Up,
}

/// Persistent 3-axis orientation and angular velocity.
#[derive(Clone, Copy, Debug)]
pub struct RotationState {
    pub orientation: Vec3,
    pub velocity: Vec3,
}

impl RotationState {
    /// Start with a small random tumble so the letter is never static.
    pub fn with_random_velocity(rng: &mut impl Rng) -> Self {
        let mut axis = || (rng.gen::<f32>() - 0.5) * INITIAL_VELOCITY_JITTER;
        Self {
            orientation: Vec3::ZERO,
            velocity: Vec3::new(axis(), axis(), axis()),
        }
    }

    /// Drag directly steers the orientation and re-seeds the velocity so the
    /// spin carries weight when the pointer is released.
    pub fn apply_drag(&mut self, dx: f32, dy: f32) {
        self.orientation.y += dx * ROTATION_SENSITIVITY;
        self.orientation.x += dy * ROTATION_SENSITIVITY;
        self.velocity.x = dy * MOMENTUM_MULTIPLIER;
        self.velocity.y = dx * MOMENTUM_MULTIPLIER;
    }

    /// Per-frame integration. While dragging the orientation is already
    /// steered by [`Self::apply_drag`], so damping and the floor are held off.
    pub fn integrate(&mut self, dragging: bool) {
        if dragging {
            return;
        }
        self.velocity *= ROTATION_DAMPING;
        self.velocity.x = floor_axis(self.velocity.x);
        self.velocity.y = floor_axis(self.velocity.y);
        self.velocity.z = floor_axis(self.velocity.z);
        self.orientation += self.velocity;
    }
}

/// Keep an axis at or above the ambient floor, preserving its sign and
/// defaulting to positive when it has fully stopped.
#[inline]
fn floor_axis(v: f32) -> f32 {
    if v.abs() < VELOCITY_FLOOR {
        VELOCITY_FLOOR.copysign(if v == 0.0 { 1.0 } else { v })
    } else {
        v
    }
}

/// One-shot decaying impulse triggered by pointer-down.
#[derive(Clone, Copy, Debug, Default)]
pub struct Pulse(f32);

impl Pulse {
    #[inline]
    pub fn trigger(&mut self) {
        self.0 = 1.0;
    }

    /// Geometric per-frame decay, snapped to exactly zero below epsilon so
    /// the value cannot linger as denormal noise.
    #[inline]
    pub fn decay(&mut self) {
        self.0 *= PULSE_DECAY;
        if self.0 < PULSE_EPSILON {
            self.0 = 0.0;
        }
    }

    #[inline]
    pub fn value(&self) -> f32 {
        self.0
    }
}

/// Pointer drag bookkeeping: whether a drag is live and where it last was.
#[derive(Clone, Copy, Debug, Default)]
pub struct DragTracker {
    dragging: bool,
    last_x: f32,
    last_y: f32,
}

impl DragTracker {
    pub fn begin(&mut self, x: f32, y: f32) {
        self.dragging = true;
        self.last_x = x;
        self.last_y = y;
    }

    /// Delta since the previous pointer position, or `None` when not
    /// dragging (hover moves are ignored).
    pub fn delta(&mut self, x: f32, y: f32) -> Option<(f32, f32)> {
        if !self.dragging {
            return None;
        }
        let d = (x - self.last_x, y - self.last_y);
        self.last_x = x;
        self.last_y = y;
        Some(d)
    }

    pub fn end(&mut self) {
        self.dragging = false;
    }

    #[inline]
    pub fn dragging(&self) -> bool {
        self.dragging
    }
}
