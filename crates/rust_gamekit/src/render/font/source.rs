//! Glyph sources
//!
//! [`GlyphSource`] is the rasterizer boundary used by
//! [`TruetypeFont`](super::TruetypeFont). Metrics follow the stb_truetype
//! conventions: horizontal metrics in font design units, bitmap boxes in
//! pixels with y pointing down, and `scale` in pixels per design unit.

use fontdue::{Font, FontSettings};

use super::{FontError, FontResult};

/// Pixel bounding box of a rasterized glyph, y pointing down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BitmapBox {
    /// Left edge
    pub x0: i32,
    /// Top edge (negative above the baseline)
    pub y0: i32,
    /// Right edge
    pub x1: i32,
    /// Bottom edge
    pub y1: i32,
}

impl BitmapBox {
    /// Width in pixels
    pub fn width(&self) -> i32 {
        self.x1 - self.x0
    }

    /// Height in pixels
    pub fn height(&self) -> i32 {
        self.y1 - self.y0
    }
}

/// 8-bit coverage bitmap, rows top to bottom
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlyphBitmap {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// `width * height` coverage bytes
    pub pixels: Vec<u8>,
}

/// Font metrics and rasterization for single code points
pub trait GlyphSource {
    /// Font-wide `(ascent, descent)` in design units; descent is negative
    fn vertical_metrics(&self) -> (i32, i32);

    /// Design units per em
    fn units_per_em(&self) -> f32;

    /// `(advance_width, left_side_bearing)` in design units
    fn h_metrics(&self, ch: char) -> (i32, i32);

    /// Bitmap box at `scale` pixels per design unit
    fn bitmap_box(&self, ch: char, scale: f32) -> BitmapBox;

    /// Rasterize at `scale`; `None` when the glyph has no pixels
    fn rasterize(&self, ch: char, scale: f32) -> Option<GlyphBitmap>;
}

/// [`GlyphSource`] backed by `fontdue`
///
/// fontdue sizes glyphs in pixels per em, so a per-unit `scale` becomes
/// `scale * units_per_em`. Metrics requested at `units_per_em` pixels come
/// back in design units.
pub struct FontdueSource {
    font: Font,
}

impl FontdueSource {
    /// Parse TrueType/OpenType bytes
    pub fn from_bytes(data: &[u8]) -> FontResult<Self> {
        let font = Font::from_bytes(data, FontSettings::default())
            .map_err(|e| FontError::InvalidFont(e.to_string()))?;
        Ok(Self { font })
    }

    fn px(&self, scale: f32) -> f32 {
        scale * self.font.units_per_em()
    }
}

impl GlyphSource for FontdueSource {
    fn vertical_metrics(&self) -> (i32, i32) {
        let upm = self.font.units_per_em();
        self.font
            .horizontal_line_metrics(upm)
            .map_or((upm.round() as i32, 0), |m| {
                (m.ascent.round() as i32, m.descent.round() as i32)
            })
    }

    fn units_per_em(&self) -> f32 {
        self.font.units_per_em()
    }

    fn h_metrics(&self, ch: char) -> (i32, i32) {
        let metrics = self.font.metrics(ch, self.font.units_per_em());
        (
            metrics.advance_width.round() as i32,
            metrics.bounds.xmin.round() as i32,
        )
    }

    fn bitmap_box(&self, ch: char, scale: f32) -> BitmapBox {
        let m = self.font.metrics(ch, self.px(scale));
        BitmapBox {
            x0: m.xmin,
            y0: -(m.ymin + m.height as i32),
            x1: m.xmin + m.width as i32,
            y1: -m.ymin,
        }
    }

    fn rasterize(&self, ch: char, scale: f32) -> Option<GlyphBitmap> {
        let (m, pixels) = self.font.rasterize(ch, self.px(scale));
        if m.width == 0 || m.height == 0 {
            return None;
        }
        Some(GlyphBitmap {
            width: m.width as u32,
            height: m.height as u32,
            pixels,
        })
    }
}
