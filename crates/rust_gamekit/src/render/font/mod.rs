//! TrueType fonts
//!
//! Glyphs are rasterized one code point at a time at a fixed reference
//! height and cached as single-channel textures. Layout metrics are kept in
//! font design units so any draw height can be derived from them.

mod config;
mod source;
mod text_unit;
mod truetype;

#[cfg(test)]
pub(crate) mod stub;

pub use config::FontConfig;
pub use source::{BitmapBox, FontdueSource, GlyphBitmap, GlyphSource};
pub use text_unit::{TextUnit, TextUnits};
pub(crate) use text_unit::split_lines;
pub use truetype::{
    blank_aspect_ratio, FontError, FontResult, GlyphMetrics, SharedFont, TruetypeFont,
    BLANK_CHARACTERS,
};

/// Reference pixel height glyph bitmaps are rasterized at
pub const HEIGHT_TO_LOAD: f32 = 128.0;

/// Design-unit advance that maps to one full text height
pub const ADVANCE_UNITS_PER_HEIGHT: f32 = 1000.0;
