use thiserror::Error;

/// Construction-time configuration failures. Runtime stepping never fails.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("character sequence must not be empty")]
    EmptySequence,
    #[error("character sequence contains unsupported whitespace {0:?}")]
    WhitespaceInSequence(char),
    #[error("display duration must be positive, got {0}")]
    NonPositiveDisplay(f64),
    #[error("blank duration must be positive, got {0}")]
    NonPositiveBlank(f64),
    #[error("transition threshold must be at least 1, got {0}")]
    ThresholdBelowOne(f64),
    #[error("color palette must not be empty")]
    EmptyPalette,
}

/// Font / glyph geometry failures surfaced by the production glyph source.
#[derive(Debug, Error)]
pub enum GlyphError {
    #[error("failed to parse font data")]
    FontParse,
    #[error("font has no outline for {0:?}")]
    MissingGlyph(char),
    #[error("glyph {0:?} produced a degenerate outline")]
    DegenerateOutline(char),
}
