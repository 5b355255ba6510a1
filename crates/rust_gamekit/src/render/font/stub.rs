//! Deterministic glyph source for tests

use std::cell::Cell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use super::source::{BitmapBox, GlyphBitmap, GlyphSource};

/// Every glyph is an 8x20 box sitting on the baseline; advance defaults to
/// 500 design units with 1000 units per em.
pub(crate) struct StubSource {
    vertical: (i32, i32),
    advances: HashMap<char, i32>,
    failing: HashSet<char>,
    raster_calls: Rc<Cell<usize>>,
}

impl StubSource {
    pub(crate) const DEFAULT_ADVANCE: i32 = 500;
    const BOX: BitmapBox = BitmapBox { x0: 2, y0: -20, x1: 10, y1: 0 };

    pub(crate) fn new() -> Self {
        Self {
            vertical: (800, -200),
            advances: HashMap::new(),
            failing: HashSet::new(),
            raster_calls: Rc::new(Cell::new(0)),
        }
    }

    pub(crate) fn with_advance(mut self, ch: char, advance: i32) -> Self {
        self.advances.insert(ch, advance);
        self
    }

    pub(crate) fn with_vertical(mut self, ascent: i32, descent: i32) -> Self {
        self.vertical = (ascent, descent);
        self
    }

    /// Make `rasterize` return `None` for `ch`
    pub(crate) fn failing(mut self, ch: char) -> Self {
        self.failing.insert(ch);
        self
    }

    /// Shared counter of `rasterize` calls
    pub(crate) fn raster_calls(&self) -> Rc<Cell<usize>> {
        Rc::clone(&self.raster_calls)
    }
}

impl GlyphSource for StubSource {
    fn vertical_metrics(&self) -> (i32, i32) {
        self.vertical
    }

    fn units_per_em(&self) -> f32 {
        1000.0
    }

    fn h_metrics(&self, ch: char) -> (i32, i32) {
        let advance = self.advances.get(&ch).copied().unwrap_or(Self::DEFAULT_ADVANCE);
        (advance, Self::BOX.x0)
    }

    fn bitmap_box(&self, _ch: char, _scale: f32) -> BitmapBox {
        Self::BOX
    }

    fn rasterize(&self, ch: char, _scale: f32) -> Option<GlyphBitmap> {
        self.raster_calls.set(self.raster_calls.get() + 1);
        if self.failing.contains(&ch) {
            return None;
        }
        let (width, height) = (Self::BOX.width() as u32, Self::BOX.height() as u32);
        Some(GlyphBitmap {
            width,
            height,
            pixels: vec![255; (width * height) as usize],
        })
    }
}
