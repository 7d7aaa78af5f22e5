//! Pure mappings from sweep progress and pulse to glow, scale and bloom.

use crate::{
    BLOOM_PULSE_SPAN, BLOOM_STRENGTH_BASE, GLOW_FALL_RATE, GLOW_PULSE_GAIN, GLOW_RISE_END,
    GLOW_RISE_RATE, SCALE_PULSE_MULTIPLIER,
};

/// Background glow intensity over sweep progress: a linear rise until the
/// sweep nears the bottom, then a steeper linear fall clamped at zero, plus
/// the pulse contribution. Never negative for any progress in [0, inf).
#[inline]
pub fn glow_intensity(progress: f32, pulse: f32) -> f32 {
    let base = if progress < GLOW_RISE_END {
        progress * GLOW_RISE_RATE
    } else {
        ((1.0 - progress) * GLOW_FALL_RATE).max(0.0)
    };
    base + pulse * GLOW_PULSE_GAIN
}

/// Screen-space Y of the glow center, tracking the light band top-to-bottom.
#[inline]
pub fn glow_center_y(progress: f32) -> f32 {
    1.0 - progress
}

/// Bloom strength boosted by the pulse so the flash blooms with the boing.
#[inline]
pub fn bloom_strength(pulse: f32) -> f32 {
    BLOOM_STRENGTH_BASE + pulse * BLOOM_PULSE_SPAN
}

/// Uniform scale multiplier applied to the letter during a pulse. Bounded:
/// 1.0 at rest, 1 + multiplier at full pulse.
#[inline]
pub fn pulse_scale(pulse: f32) -> f32 {
    1.0 + pulse * SCALE_PULSE_MULTIPLIER
}
