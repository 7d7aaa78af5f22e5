use glam::Vec3;

// Shared visual tuning constants used by both web and native frontends.

// Character cycling
pub const DEFAULT_SEQUENCE: &str = "ARSENAL";
pub const DISPLAY_DURATION_MS: f64 = 1100.0;
pub const BLANK_DURATION_MS: f64 = 1000.0;
// Light clears completely when progress reaches roughly 1.85, so the letter
// is held past one full sweep before removal.
pub const TRANSITION_THRESHOLD: f64 = 1.85;

// Palette the spawn color is drawn from (0xFF3232, 0x4000FF, 0x00FF88)
pub const LETTER_PALETTE: [[f32; 3]; 3] = [
    [1.0, 0.196, 0.196], // hot red
    [0.251, 0.0, 1.0],   // violet blue
    [0.0, 1.0, 0.533],   // mint green
];

// Interaction / motion
pub const ROTATION_SENSITIVITY: f32 = 0.003; // orientation radians per dragged pixel
pub const MOMENTUM_MULTIPLIER: f32 = 0.002; // release velocity per dragged pixel
pub const ROTATION_DAMPING: f32 = 0.985; // per-frame velocity decay
pub const VELOCITY_FLOOR: f32 = 0.0008; // ambient tumble never drops below this
pub const INITIAL_VELOCITY_JITTER: f32 = 0.002; // spawn-time random velocity span

// Pulse ("boing" on pointer-down)
pub const PULSE_DECAY: f32 = 0.92; // per-frame geometric decay
pub const PULSE_EPSILON: f32 = 0.001; // snapped to zero below this
pub const SCALE_PULSE_MULTIPLIER: f32 = 0.15; // how much a full pulse enlarges the letter
pub const SHADER_PULSE_GAIN: f32 = 2.0; // shader brightness boost at full pulse

// Background glow curve over sweep progress
pub const GLOW_RISE_END: f32 = 0.8; // progress where the glow peaks
pub const GLOW_RISE_RATE: f32 = 0.6;
pub const GLOW_FALL_RATE: f32 = 2.4;
pub const GLOW_PULSE_GAIN: f32 = 0.5;

// Post-processing
pub const BLOOM_STRENGTH_BASE: f32 = 0.6;
pub const BLOOM_PULSE_SPAN: f32 = 1.5;
pub const BLOOM_THRESHOLD: f32 = 0.05;

// Camera
// Z distance shared by rendering and the letter shader's fresnel term.
pub const CAMERA_Z: f32 = 12.0;
pub const CAMERA_FOVY_RADIANS: f32 = 75.0 * core::f32::consts::PI / 180.0;

// Heavy, slightly squashed proportions applied on top of the glyph mesh
pub const LETTER_BASE_SCALE: Vec3 = Vec3::new(1.2, 0.82, 1.0);

// Glyph geometry style
pub const GLYPH_SIZE: f32 = 9.5;
pub const GLYPH_DEPTH: f32 = 3.5;
pub const GLYPH_CURVE_TOLERANCE: f32 = 0.02;
pub const GLYPH_BEVEL_THICKNESS: f32 = 0.5;
pub const GLYPH_BEVEL_SIZE: f32 = 0.3;
