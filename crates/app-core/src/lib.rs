pub mod constants;
pub mod error;
pub mod glow;
pub mod glyph;
pub mod motion;
pub mod sequence;
pub mod state;
pub mod tessellate;

// Shaders bundled as string constants
pub static LETTER_WGSL: &str = include_str!("../shaders/letter.wgsl");
pub static GLOW_WGSL: &str = include_str!("../shaders/glow.wgsl");
pub static POST_WGSL: &str = include_str!("../shaders/post.wgsl");

pub use constants::*;
pub use error::*;
pub use glyph::*;
pub use motion::*;
pub use sequence::*;
pub use state::*;
