//! Glyph cache over a [`GlyphSource`]

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;

use thiserror::Error;

use super::source::{FontdueSource, GlyphBitmap, GlyphSource};
use super::{ADVANCE_UNITS_PER_HEIGHT, HEIGHT_TO_LOAD};
use crate::foundation::math::Vec2i;
use crate::render::backend::{BackendInstance, Filter, GraphicsBackend, RenderError, TextureId};
use crate::render::texture::Texture;

/// Result type for font operations
pub type FontResult<T> = Result<T, FontError>;

/// Font loading and glyph rasterization errors
#[derive(Error, Debug)]
pub enum FontError {
    /// Font file could not be read
    #[error("Font IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Font data could not be parsed
    #[error("Invalid font: {0}")]
    InvalidFont(String),

    /// The rasterizer produced no bitmap for a glyph
    #[error("Failed to rasterize glyph U+{code_point:04X}")]
    GlyphRaster {
        /// Unicode code point of the glyph
        code_point: u32,
    },

    /// The font was closed and its cache released
    #[error("Font has been closed")]
    Closed,

    /// Glyph texture upload failed
    #[error("Glyph upload failed: {0}")]
    Render(#[from] RenderError),
}

/// Characters drawn as empty space, with their width relative to height
pub const BLANK_CHARACTERS: &[(char, f32)] = &[(' ', 0.5), ('\u{3000}', 1.0)];

/// Width-to-height ratio of a blank character, `None` for anything else
pub fn blank_aspect_ratio(ch: char) -> Option<f32> {
    BLANK_CHARACTERS
        .iter()
        .find(|(blank, _)| *blank == ch)
        .map(|(_, ratio)| *ratio)
}

/// Layout data for one cached glyph
///
/// `pos0` and `pos1` are the bitmap corners in pixels at the reference
/// height, measured up from the bottom of the line box. Advance and bearing
/// are in font design units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlyphMetrics {
    /// Bottom-left corner of the bitmap
    pub pos0: Vec2i,
    /// Top-right corner of the bitmap
    pub pos1: Vec2i,
    /// Horizontal advance in design units
    pub advance_width: i32,
    /// Left side bearing in design units
    pub left_side_bearing: i32,
}

impl GlyphMetrics {
    /// Bitmap size in pixels
    pub fn size(&self) -> Vec2i {
        self.pos1 - self.pos0
    }
}

/// Font shared between configurations on one thread
pub type SharedFont = Rc<RefCell<TruetypeFont>>;

/// A glyph rasterized on the CPU, ready to upload to any backend
struct RasterGlyph {
    metrics: GlyphMetrics,
    bitmap: GlyphBitmap,
}

/// A TrueType font with a lazily filled glyph cache
///
/// Each glyph is rasterized once, on first use, and kept until
/// [`close`](Self::close). A glyph the rasterizer cannot produce is
/// remembered as missing and measures with the blank fallback, the same
/// width the renderer advances by. Textures are uploaded per backend, so a
/// font may be drawn through more than one [`GraphicsBackend`].
pub struct TruetypeFont {
    source: Box<dyn GlyphSource>,
    height_to_load: f32,
    scale: f32,
    ascent: i32,
    descent: i32,
    baseline: i32,
    /// `None` marks a code point that failed to rasterize
    glyphs: HashMap<char, Option<RasterGlyph>>,
    textures: HashMap<(BackendInstance, char), Texture>,
    closed: bool,
}

impl TruetypeFont {
    /// Load a font file at [`HEIGHT_TO_LOAD`]
    pub fn load<P: AsRef<Path>>(path: P) -> FontResult<Self> {
        Self::with_height(path, HEIGHT_TO_LOAD)
    }

    /// Load a font file rasterizing glyphs at `height_to_load` pixels
    pub fn with_height<P: AsRef<Path>>(path: P, height_to_load: f32) -> FontResult<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let font = Self::from_bytes(&data, height_to_load)?;

        log::info!("Loaded font {:?} ({} bytes)", path, data.len());
        Ok(font)
    }

    /// Parse font bytes already in memory
    pub fn from_bytes(data: &[u8], height_to_load: f32) -> FontResult<Self> {
        Self::from_source(Box::new(FontdueSource::from_bytes(data)?), height_to_load)
    }

    /// Build the cache over any glyph source
    pub fn from_source(source: Box<dyn GlyphSource>, height_to_load: f32) -> FontResult<Self> {
        let (ascent, descent) = source.vertical_metrics();
        if ascent <= descent {
            return Err(FontError::InvalidFont(format!(
                "ascent {} is not above descent {}",
                ascent, descent
            )));
        }

        let scale = height_to_load / (ascent - descent) as f32;
        let baseline = (ascent as f32 * scale) as i32;

        Ok(Self {
            source,
            height_to_load,
            scale,
            ascent,
            descent,
            baseline,
            glyphs: HashMap::new(),
            textures: HashMap::new(),
            closed: false,
        })
    }

    /// Wrap for sharing between [`FontConfig`](super::FontConfig)s
    pub fn shared(self) -> SharedFont {
        Rc::new(RefCell::new(self))
    }

    /// Reference pixel height of cached bitmaps
    pub fn height_to_load(&self) -> f32 {
        self.height_to_load
    }

    /// Pixels per design unit at the reference height
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Ascent in design units
    pub fn ascent(&self) -> i32 {
        self.ascent
    }

    /// Descent in design units, negative below the baseline
    pub fn descent(&self) -> i32 {
        self.descent
    }

    /// Baseline in pixels from the top of the line box
    pub fn baseline(&self) -> i32 {
        self.baseline
    }

    /// Metrics of `ch`, rasterizing it on the CPU on first request
    fn raster(&mut self, ch: char) -> FontResult<GlyphMetrics> {
        if self.closed {
            return Err(FontError::Closed);
        }
        if let Some(cached) = self.glyphs.get(&ch) {
            return cached
                .as_ref()
                .map(|g| g.metrics)
                .ok_or(FontError::GlyphRaster { code_point: ch as u32 });
        }

        let bbox = self.source.bitmap_box(ch, self.scale);
        let (advance_width, left_side_bearing) = self.source.h_metrics(ch);
        let Some(bitmap) = self.source.rasterize(ch, self.scale) else {
            log::debug!("No bitmap for U+{:04X}", ch as u32);
            self.glyphs.insert(ch, None);
            return Err(FontError::GlyphRaster { code_point: ch as u32 });
        };

        let h = self.height_to_load as i32;
        let metrics = GlyphMetrics {
            pos0: Vec2i::new(bbox.x0, h - (self.baseline + bbox.y1)),
            pos1: Vec2i::new(bbox.x1, h - (self.baseline + bbox.y0)),
            advance_width,
            left_side_bearing,
        };

        log::debug!(
            "Rasterized U+{:04X} {}x{} advance {}",
            ch as u32,
            bitmap.width,
            bitmap.height,
            advance_width
        );

        self.glyphs.insert(ch, Some(RasterGlyph { metrics, bitmap }));
        Ok(metrics)
    }

    /// Texture and metrics for `ch` on `gfx`, rasterizing on first request
    ///
    /// A cached texture that `gfx` no longer knows is uploaded again from
    /// the cached bitmap.
    pub fn get_or_load_glyph(
        &mut self,
        gfx: &mut dyn GraphicsBackend,
        ch: char,
    ) -> FontResult<(TextureId, GlyphMetrics)> {
        let metrics = self.raster(ch)?;

        let key = (gfx.instance(), ch);
        if let Some(texture) = self.textures.get(&key) {
            if gfx.texture_size(texture.id()).is_ok() {
                return Ok((texture.id(), metrics));
            }
            log::warn!("Glyph texture for U+{:04X} is gone, uploading again", ch as u32);
            self.textures.remove(&key);
        }

        let Some(Some(glyph)) = self.glyphs.get(&ch) else {
            return Err(FontError::GlyphRaster { code_point: ch as u32 });
        };
        let bitmap = &glyph.bitmap;
        let texture = Texture::load_grayscale(gfx, &bitmap.pixels, bitmap.width, bitmap.height)?;
        texture.set_min_filter(gfx, Filter::Linear)?;

        let id = texture.id();
        self.textures.insert(key, texture);
        Ok((id, metrics))
    }

    /// Advance width in design units, without rasterizing
    pub fn advance_width(&self, ch: char) -> i32 {
        match self.glyphs.get(&ch) {
            Some(Some(glyph)) => glyph.metrics.advance_width,
            _ => self.source.h_metrics(ch).0,
        }
    }

    /// Width-to-height ratio of a blank character, `None` for anything else
    pub fn blank_aspect_ratio(&self, ch: char) -> Option<f32> {
        blank_aspect_ratio(ch)
    }

    /// Width-to-height ratio `ch` is drawn with
    ///
    /// Blank characters use the blank table. Other glyphs are rasterized
    /// (CPU only, cached) so that a glyph which cannot be drawn measures
    /// with the same fallback the renderer advances by.
    pub fn char_aspect_ratio(&mut self, ch: char) -> f32 {
        if let Some(ratio) = blank_aspect_ratio(ch) {
            return ratio;
        }
        match self.raster(ch) {
            Ok(metrics) => metrics.advance_width as f32 / ADVANCE_UNITS_PER_HEIGHT,
            Err(_) => 0.0,
        }
    }

    /// Sum of the character aspect ratios of `s`
    pub fn string_aspect_ratio(&mut self, s: &str) -> f32 {
        s.chars().map(|ch| self.char_aspect_ratio(ch)).sum()
    }

    /// Number of glyphs rasterized successfully
    pub fn glyph_count(&self) -> usize {
        self.glyphs.values().filter(|g| g.is_some()).count()
    }

    /// Whether `ch` has been rasterized
    pub fn is_cached(&self, ch: char) -> bool {
        matches!(self.glyphs.get(&ch), Some(Some(_)))
    }

    /// Whether `ch` was tried and produced no bitmap
    pub fn is_missing(&self, ch: char) -> bool {
        matches!(self.glyphs.get(&ch), Some(None))
    }

    /// Whether [`close`](Self::close) has been called
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Delete every cached texture; later glyph loads fail
    ///
    /// Textures uploaded through `gfx` are deleted even if one deletion
    /// fails; the first failure is returned. Textures that belong to other
    /// backends cannot be reached from here and are only forgotten.
    pub fn close(&mut self, gfx: &mut dyn GraphicsBackend) -> FontResult<()> {
        let instance = gfx.instance();
        let mut first_error = None;
        let mut foreign = 0;
        for ((owner, _), texture) in self.textures.drain() {
            if owner != instance {
                foreign += 1;
                continue;
            }
            if let Err(e) = texture.delete(gfx) {
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }
        if foreign > 0 {
            log::warn!("Forgot {} glyph textures owned by other backends", foreign);
        }
        self.glyphs.clear();
        self.closed = true;

        first_error.map_or(Ok(()), |e| Err(e.into()))
    }
}

impl Drop for TruetypeFont {
    fn drop(&mut self) {
        if !self.textures.is_empty() {
            log::warn!(
                "TruetypeFont dropped with {} glyph textures still allocated",
                self.textures.len()
            );
        }
    }
}

impl std::fmt::Debug for TruetypeFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TruetypeFont")
            .field("height_to_load", &self.height_to_load)
            .field("scale", &self.scale)
            .field("ascent", &self.ascent)
            .field("descent", &self.descent)
            .field("baseline", &self.baseline)
            .field("glyphs", &self.glyphs.len())
            .field("textures", &self.textures.len())
            .field("closed", &self.closed)
            .finish()
    }
}
