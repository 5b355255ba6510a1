//! Immediate-mode 2D renderer
//!
//! Draws quads, line strips, textures and text through a
//! [`GraphicsBackend`]. All positions are normalized device coordinates;
//! text heights are in the same units.
//!
//! Glyph advances are `height * advance_width / 1000`, or the blank
//! fallback for a glyph that cannot be rasterized. Measuring and drawing
//! take the advance from the same place, so they agree exactly.

use super::backend::{BackendResult, GraphicsBackend, TextureId};
use super::font::{
    blank_aspect_ratio, split_lines, FontConfig, GlyphMetrics, TextUnit, TextUnits,
};
use super::texture::Texture;
use crate::foundation::math::{Color, Vec2f, Vec2i};

/// Width and height of the whole viewport in device coordinates
const SIZE_FULL: f32 = 2.0;

/// One positioned piece of a word-wrapped layout
#[derive(Debug, Clone)]
pub struct LaidOutLine {
    /// Characters drawn on this line by one run
    pub text: String,
    /// Bottom-left corner
    pub pos: Vec2f,
    /// Glyph height
    pub height: f32,
    /// Style of the run
    pub config: FontConfig,
}

/// Where a word-wrapped replay stopped
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WrapOutcome {
    /// Characters placed, never more than the budget
    pub consumed: usize,
    /// Pen position after the last placed character
    pub cursor: Vec2f,
    /// Whether every character of the chain fit in the budget
    pub complete: bool,
}

/// Result of [`Renderer::layout_text_units`]
#[derive(Debug, Clone)]
pub struct TextLayout {
    /// Pieces in drawing order
    pub lines: Vec<LaidOutLine>,
    /// Budget accounting and final pen position
    pub outcome: WrapOutcome,
}

/// 2D drawing front end over a graphics backend
pub struct Renderer<B: GraphicsBackend> {
    gfx: B,
}

impl<B: GraphicsBackend> Renderer<B> {
    /// Wrap a backend
    pub fn new(gfx: B) -> Self {
        Self { gfx }
    }

    /// Underlying backend
    pub fn backend(&self) -> &B {
        &self.gfx
    }

    /// Underlying backend, mutably
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.gfx
    }

    /// Give the backend back
    pub fn into_backend(self) -> B {
        self.gfx
    }

    /// Device-coordinate size of `p` pixels along each axis
    pub fn pixels(&self, p: i32) -> Vec2f {
        self.pixels_vec(Vec2i::new(p, p))
    }

    /// Device-coordinate size of a pixel vector
    pub fn pixels_vec(&self, p: Vec2i) -> Vec2f {
        let (w, h) = self.gfx.viewport_size();
        Vec2f::new(
            SIZE_FULL / w.max(1) as f32 * p.x as f32,
            SIZE_FULL / h.max(1) as f32 * p.y as f32,
        )
    }

    /// Color for subsequent draws
    pub fn set_color(&mut self, color: Color) {
        self.gfx.set_color(color);
    }

    /// Clear the color buffer
    pub fn clear_screen(&mut self, color: Color) {
        self.gfx.clear(color);
    }

    /// Solid rectangle
    pub fn draw_square(&mut self, pos: Vec2f, size: Vec2f) {
        self.gfx.draw_quad(pos, size);
    }

    /// Connected line segments
    pub fn render_line_strip(&mut self, points: &[Vec2f]) {
        self.gfx.draw_line_strip(points);
    }

    /// Draw part of a texture stretched over `size`
    pub fn render_texture(
        &mut self,
        texture: &Texture,
        pos: Vec2f,
        size: Vec2f,
        uv_start: Vec2f,
        uv_end: Vec2f,
    ) -> BackendResult<()> {
        texture.with_bound(&mut self.gfx, |gfx| {
            gfx.draw_textured_quad(pos, size, uv_start, uv_end);
        })
    }

    /// Draw a whole texture at `height`, keeping its aspect ratio
    ///
    /// Returns the drawn width.
    pub fn render_texture_aa(&mut self, texture: &Texture, pos: Vec2f, height: f32) -> BackendResult<f32> {
        self.draw_texture_aa(texture.id(), pos, height)
    }

    fn draw_texture_aa(&mut self, id: TextureId, pos: Vec2f, height: f32) -> BackendResult<f32> {
        let (w, h) = self.gfx.texture_size(id)?;
        let width = height * (w as f32 / h.max(1) as f32);

        self.gfx.bind_texture(id)?;
        self.gfx.draw_textured_quad(
            pos,
            Vec2f::new(width, height),
            Vec2f::zeros(),
            Vec2f::new(1.0, 1.0),
        );
        self.gfx.unbind_texture();
        Ok(width)
    }

    /// Glyph for `ch` and its advance at `height`
    ///
    /// The advance comes from [`TruetypeFont::char_aspect_ratio`], the same
    /// value the measuring functions use. Blank characters and glyphs that
    /// fail to load yield no texture.
    ///
    /// [`TruetypeFont::char_aspect_ratio`]: super::font::TruetypeFont::char_aspect_ratio
    fn glyph(&mut self, ch: char, height: f32, config: &FontConfig) -> (Option<(TextureId, GlyphMetrics)>, f32) {
        let mut font = config.font().borrow_mut();
        let advance = height * font.char_aspect_ratio(ch);
        if blank_aspect_ratio(ch).is_some() {
            return (None, advance);
        }

        match font.get_or_load_glyph(&mut self.gfx, ch) {
            Ok(glyph) => (Some(glyph), advance),
            Err(e) => {
                log::debug!("Glyph U+{:04X} unavailable: {}", ch as u32, e);
                (None, advance)
            }
        }
    }

    /// Horizontal advance of `ch` at `height`, loading the glyph if needed
    pub fn char_advance(&mut self, ch: char, height: f32, config: &FontConfig) -> f32 {
        self.glyph(ch, height, config).1
    }

    fn draw_glyph(&mut self, id: TextureId, metrics: &GlyphMetrics, pos: Vec2f, height: f32, config: &FontConfig) {
        let height_to_load = config.font().borrow().height_to_load();
        let offset = metrics.pos0.cast::<f32>() / height_to_load * height;
        let real_height = height * metrics.size().y as f32 / height_to_load;

        if let Err(e) = self.draw_texture_aa(id, pos + offset, real_height) {
            log::warn!("Failed to draw glyph texture {:?}: {}", id, e);
        }
    }

    /// Draw one character in the fill color
    ///
    /// Returns the advance: `height * advance_width / 1000`, or the blank
    /// fallback when the glyph is unavailable.
    pub fn render_char(&mut self, ch: char, pos: Vec2f, height: f32, config: &FontConfig) -> f32 {
        let (glyph, advance) = self.glyph(ch, height, config);
        if let Some((id, metrics)) = glyph {
            self.gfx.set_color(config.color());
            self.draw_glyph(id, &metrics, pos, height, config);
        }
        advance
    }

    /// Draw one character with its outline, then the fill on top
    ///
    /// The outline is the glyph redrawn in the stroke color at eight
    /// offsets per pixel of thickness. Without a stroke color this is
    /// [`render_char`](Self::render_char).
    pub fn render_char_with_border(&mut self, ch: char, pos: Vec2f, height: f32, config: &FontConfig) -> f32 {
        let Some(stroke) = config.stroke_color() else {
            return self.render_char(ch, pos, height, config);
        };

        let (glyph, advance) = self.glyph(ch, height, config);
        let Some((id, metrics)) = glyph else {
            return advance;
        };

        self.gfx.set_color(stroke);
        for p in 1..=config.thickness().max(1) {
            let d = self.pixels(p as i32);
            let offsets = [
                Vec2f::new(d.x, 0.0),
                Vec2f::new(-d.x, 0.0),
                Vec2f::new(0.0, d.y),
                Vec2f::new(0.0, -d.y),
                Vec2f::new(d.x, d.y),
                Vec2f::new(-d.x, -d.y),
                Vec2f::new(d.x, -d.y),
                Vec2f::new(-d.x, d.y),
            ];
            for offset in offsets {
                self.draw_glyph(id, &metrics, pos + offset, height, config);
            }
        }

        self.gfx.set_color(config.color());
        self.draw_glyph(id, &metrics, pos, height, config);
        advance
    }

    /// Draw a string without line separators starting at `pos`
    ///
    /// Each character advances by its glyph advance plus the configured
    /// spacing, trailing spacing included. Returns the total advance.
    pub fn render_string_line(&mut self, s: &str, pos: Vec2f, height: f32, config: &FontConfig) -> f32 {
        let mut offset = 0.0;
        for ch in s.chars() {
            let advance = self.render_char_with_border(ch, pos + Vec2f::new(offset, 0.0), height, config);
            offset += advance + config.spacing();
        }

        if config.has_overline() || config.has_underline() {
            self.gfx.set_color(config.line_color());
        }
        if config.has_overline() {
            self.gfx.draw_line_strip(&[
                pos + Vec2f::new(0.0, height),
                pos + Vec2f::new(offset, height),
            ]);
        }
        if config.has_underline() {
            self.gfx.draw_line_strip(&[pos, pos + Vec2f::new(offset, 0.0)]);
        }

        offset
    }

    /// Total advance [`render_string_line`](Self::render_string_line) would
    /// produce, from advance widths alone
    pub fn measure_string_line(&self, s: &str, height: f32, config: &FontConfig) -> f32 {
        let mut font = config.font().borrow_mut();
        let mut offset = 0.0;
        for ch in s.chars() {
            offset += height * font.char_aspect_ratio(ch) + config.spacing();
        }
        offset
    }

    /// Draw each line of `s`, one line height plus line spacing apart
    pub fn render_string_multi_line(&mut self, s: &str, pos: Vec2f, height: f32, config: &FontConfig) {
        for (i, line) in split_lines(s).into_iter().enumerate() {
            let line_pos = pos - Vec2f::new(0.0, (height + config.line_spacing()) * i as f32);
            self.render_string_line(line, line_pos, height, config);
        }
    }

    /// Draw a line whose visual centre lands on `pos`
    pub fn render_string_line_centered(&mut self, s: &str, pos: Vec2f, height: f32, config: &FontConfig) -> f32 {
        let start = pos - self.centering_offset(s, height, config);
        self.render_string_line(s, start, height, config)
    }

    /// Shift from the centre of a line to its bottom-left corner
    pub fn centering_offset(&self, s: &str, height: f32, config: &FontConfig) -> Vec2f {
        let len = s.chars().count();
        let gaps = len.saturating_sub(1) as f32;
        Vec2f::new(
            height * config.string_aspect_ratio(s) / 2.0 + config.spacing() * gaps / 2.0,
            height / 2.0,
        )
    }

    /// Draw each line of `s` centred on `pos`, stepping down per line
    pub fn render_string_multi_line_centered(&mut self, s: &str, pos: Vec2f, height: f32, config: &FontConfig) {
        for (i, line) in split_lines(s).into_iter().enumerate() {
            let line_pos = pos - Vec2f::new(0.0, (height + config.line_spacing()) * i as f32);
            self.render_string_line_centered(line, line_pos, height, config);
        }
    }

    /// Draw multi-line text, centred when the configuration asks for it
    pub fn render_string(&mut self, s: &str, pos: Vec2f, height: f32, config: &FontConfig) {
        if config.is_centered() {
            self.render_string_multi_line_centered(s, pos, height, config);
        } else {
            self.render_string_multi_line(s, pos, height, config);
        }
    }

    /// Word-wrap a text unit chain into lines no wider than `width`
    ///
    /// Walks the chain from its anchor. Inside a run, a line break is
    /// inserted before character `i` when the pen plus that character's
    /// advance would pass `anchor.x + width`. Only indices below
    /// `min(budget, last_index)` are checked, so the last character of a
    /// run never wraps, and a character at the start of a line is never
    /// pushed off it. Break units always start a new line. At most
    /// `char_count` characters are placed.
    pub fn layout_text_units(&mut self, width: f32, units: &TextUnits, char_count: usize) -> TextLayout {
        let anchor = units.anchor();
        let limit = anchor.x + width;
        let mut cursor = anchor;
        let mut line_empty = true;
        let mut budget = char_count;
        let mut lines = Vec::new();

        for unit in units.units() {
            if budget == 0 {
                break;
            }
            match unit {
                TextUnit::Break { height, config } => {
                    cursor = Vec2f::new(anchor.x, cursor.y - (height + config.line_spacing()));
                    line_empty = true;
                }
                TextUnit::Line { text, height, config } => {
                    let chars: Vec<char> = text.chars().collect();
                    let take = budget.min(chars.len());
                    let checked = budget.min(chars.len().saturating_sub(1));

                    let mut segment_start = 0;
                    let mut segment_pos = cursor;
                    for i in 0..take {
                        let advance = self.char_advance(chars[i], *height, config) + config.spacing();
                        if i < checked && !line_empty && cursor.x + advance > limit {
                            if i > segment_start {
                                lines.push(LaidOutLine {
                                    text: chars[segment_start..i].iter().collect(),
                                    pos: segment_pos,
                                    height: *height,
                                    config: config.clone(),
                                });
                            }
                            cursor = Vec2f::new(anchor.x, cursor.y - (height + config.line_spacing()));
                            segment_start = i;
                            segment_pos = cursor;
                        }
                        cursor.x += advance;
                        line_empty = false;
                    }
                    if take > segment_start {
                        lines.push(LaidOutLine {
                            text: chars[segment_start..take].iter().collect(),
                            pos: segment_pos,
                            height: *height,
                            config: config.clone(),
                        });
                    }
                    budget -= take;
                }
            }
        }

        let consumed = char_count - budget;
        TextLayout {
            lines,
            outcome: WrapOutcome {
                consumed,
                cursor,
                complete: consumed == units.char_count(),
            },
        }
    }

    /// Word-wrap and draw a text unit chain
    ///
    /// See [`layout_text_units`](Self::layout_text_units) for the wrapping
    /// rules.
    pub fn render_text_units(&mut self, width: f32, units: &TextUnits, char_count: usize) -> WrapOutcome {
        let layout = self.layout_text_units(width, units, char_count);
        for line in &layout.lines {
            self.render_string_line(&line.text, line.pos, line.height, &line.config);
        }
        layout.outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::color;
    use crate::render::font::stub::StubSource;
    use crate::render::font::{TruetypeFont, HEIGHT_TO_LOAD};
    use crate::render::headless::{DrawCommand, HeadlessBackend};
    use approx::assert_relative_eq;

    fn config_with(source: StubSource) -> FontConfig {
        let font = TruetypeFont::from_source(Box::new(source), HEIGHT_TO_LOAD).unwrap();
        FontConfig::new(font.shared())
    }

    fn config() -> FontConfig {
        config_with(StubSource::new())
    }

    fn renderer() -> Renderer<HeadlessBackend> {
        Renderer::new(HeadlessBackend::new(200, 100))
    }

    fn quad_positions(r: &Renderer<HeadlessBackend>) -> Vec<Vec2f> {
        r.backend()
            .textured_quads()
            .filter_map(|c| match c {
                DrawCommand::TexturedQuad { pos, .. } => Some(*pos),
                _ => None,
            })
            .collect()
    }

    fn line_texts(layout: &TextLayout) -> Vec<&str> {
        layout.lines.iter().map(|l| l.text.as_str()).collect()
    }

    #[test]
    fn test_pixels() {
        let r = renderer();
        let d = r.pixels(2);

        assert_relative_eq!(d.x, 0.02);
        assert_relative_eq!(d.y, 0.04);
    }

    #[test]
    fn test_glyph_quad_placement() {
        let mut r = renderer();
        let cfg = config();

        // height 1.28 makes one reference pixel 0.01 units
        let advance = r.render_char('A', Vec2f::new(0.5, 0.0), 1.28, &cfg);

        assert_relative_eq!(advance, 0.64);
        let quad = r.backend().textured_quads().next().cloned().unwrap();
        let DrawCommand::TexturedQuad { pos, size, color: c, texture } = quad else {
            panic!("expected textured quad");
        };
        assert!(texture.is_some());
        assert_eq!(c, color::white());
        assert_relative_eq!(pos.x, 0.52, epsilon = 1e-6);
        assert_relative_eq!(pos.y, 0.26, epsilon = 1e-6);
        assert_relative_eq!(size.y, 0.2, epsilon = 1e-6);
        assert_relative_eq!(size.x, 0.08, epsilon = 1e-6);
        assert_eq!(r.backend().bound_texture(), None);
    }

    #[test]
    fn test_string_line_total_includes_trailing_spacing() {
        let mut r = renderer();
        let cfg = config_with(StubSource::new().with_advance('B', 700)).with_spacing(0.01);

        let total = r.render_string_line("AB", Vec2f::zeros(), 0.2, &cfg);

        assert_relative_eq!(total, (0.5 * 0.2 + 0.01) + (0.7 * 0.2 + 0.01), epsilon = 1e-6);
        let xs: Vec<f32> = quad_positions(&r).iter().map(|p| p.x).collect();
        assert_eq!(xs.len(), 2);
        assert_relative_eq!(xs[1] - xs[0], 0.5 * 0.2 + 0.01, epsilon = 1e-6);
    }

    #[test]
    fn test_measure_matches_render() {
        let mut r = renderer();
        let source = StubSource::new()
            .with_advance('H', 611)
            .with_advance('e', 523)
            .with_advance('l', 227)
            .with_advance('o', 557);
        let cfg = config_with(source).with_spacing(0.013);

        let measured = r.measure_string_line("Hello World", 0.173, &cfg);
        let rendered = r.render_string_line("Hello World", Vec2f::zeros(), 0.173, &cfg);

        assert_eq!(measured.to_bits(), rendered.to_bits());
    }

    #[test]
    fn test_measure_matches_render_with_missing_glyph() {
        let mut r = renderer();
        let cfg = config_with(StubSource::new().failing('x'));

        // measured before the renderer ever asks for 'x'
        let measured = r.measure_string_line("AxA", 1.0, &cfg);
        let rendered = r.render_string_line("AxA", Vec2f::zeros(), 1.0, &cfg);

        assert_eq!(measured.to_bits(), rendered.to_bits());
        assert_relative_eq!(rendered, 1.0);
    }

    #[test]
    fn test_centering_ignores_missing_glyph() {
        let mut r = renderer();
        let cfg = config_with(StubSource::new().failing('x'));

        r.render_string_line_centered("AxA", Vec2f::zeros(), 1.0, &cfg);

        // two drawn glyphs of width 0.5 centred on 0, offset 0.02 from pen
        let positions = quad_positions(&r);
        assert_eq!(positions.len(), 2);
        assert_relative_eq!(positions[0].x - 2.0 / 128.0, -0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_stroke_draws_eight_offsets_per_pixel() {
        let mut r = renderer();
        let stroke = color::from_rgba8(255, 0, 0, 255);
        let cfg = config().with_stroke(stroke).with_thickness(2);

        r.render_char_with_border('A', Vec2f::zeros(), 1.0, &cfg);

        let colors: Vec<Color> = r
            .backend()
            .textured_quads()
            .filter_map(|c| match c {
                DrawCommand::TexturedQuad { color, .. } => Some(*color),
                _ => None,
            })
            .collect();
        assert_eq!(colors.len(), 2 * 8 + 1);
        assert!(colors[..16].iter().all(|c| *c == stroke));
        assert_eq!(colors[16], color::white());

        // diagonals are all four distinct corners
        let positions = quad_positions(&r);
        let first_ring = &positions[..8];
        for (i, a) in first_ring.iter().enumerate() {
            for b in &first_ring[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_blank_never_rasterized() {
        let source = StubSource::new().failing(' ');
        let calls = source.raster_calls();
        let mut r = renderer();
        let cfg = config_with(source);

        let advance = r.render_char(' ', Vec2f::zeros(), 0.3, &cfg);

        assert_relative_eq!(advance, 0.15);
        assert_eq!(calls.get(), 0);
        assert_eq!(r.backend().textured_quads().count(), 0);
    }

    #[test]
    fn test_failed_glyph_falls_back() {
        let mut r = renderer();
        let cfg = config_with(StubSource::new().failing('x'));

        let advance = r.render_char('x', Vec2f::zeros(), 0.3, &cfg);
        let total = r.render_string_line("AxA", Vec2f::zeros(), 1.0, &cfg);

        assert_eq!(advance, 0.0);
        assert_relative_eq!(total, 1.0);
        assert_eq!(r.backend().textured_quads().count(), 2);
    }

    #[test]
    fn test_centered_start() {
        let mut r = renderer();
        let cfg = config().with_spacing(0.02);
        let height = 1.28;

        r.render_string_line_centered("AB", Vec2f::zeros(), height, &cfg);

        let width = height * cfg.string_aspect_ratio("AB");
        let expected_x = -(width / 2.0 + 0.02 * 1.0 / 2.0);
        let first = quad_positions(&r)[0];
        // glyph offset is (0.02, 0.26) at this height
        assert_relative_eq!(first.x - 0.02, expected_x, epsilon = 1e-6);
        assert_relative_eq!(first.y - 0.26, -height / 2.0, epsilon = 1e-6);
    }

    #[test]
    fn test_decorations() {
        let mut r = renderer();
        let line_color = color::from_rgba8(0, 255, 0, 255);
        let cfg = config().with_overline(true).with_underline(true).with_line_color(line_color);

        let pos = Vec2f::new(0.1, 0.2);
        let total = r.render_string_line("AA", pos, 0.4, &cfg);

        let strips: Vec<_> = r
            .backend()
            .commands()
            .iter()
            .filter_map(|c| match c {
                DrawCommand::LineStrip { points, color } => Some((points.clone(), *color)),
                _ => None,
            })
            .collect();
        assert_eq!(strips.len(), 2);
        assert_eq!(strips[0].0, vec![pos + Vec2f::new(0.0, 0.4), pos + Vec2f::new(total, 0.4)]);
        assert_eq!(strips[1].0, vec![pos, pos + Vec2f::new(total, 0.0)]);
        assert!(strips.iter().all(|(_, c)| *c == line_color));
    }

    #[test]
    fn test_multi_line_steps_down() {
        let mut r = renderer();
        let cfg = config().with_line_spacing(0.05);

        r.render_string_multi_line("A\r\nA", Vec2f::zeros(), 0.1, &cfg);

        let positions = quad_positions(&r);
        assert_eq!(positions.len(), 2);
        assert_relative_eq!(positions[0].x, positions[1].x);
        assert_relative_eq!(positions[0].y - positions[1].y, 0.15, epsilon = 1e-6);
    }

    #[test]
    fn test_render_string_dispatches_on_centering() {
        let mut left = renderer();
        let mut centered = renderer();

        left.render_string("A", Vec2f::zeros(), 1.0, &config());
        centered.render_string("A", Vec2f::zeros(), 1.0, &config().with_centered(true));

        let dx = quad_positions(&left)[0].x - quad_positions(&centered)[0].x;
        assert_relative_eq!(dx, 0.25);
    }

    #[test]
    fn test_shared_font_draws_on_every_backend() {
        let mut first = renderer();
        let mut second = renderer();
        let cfg = config();

        let a = first.render_char('A', Vec2f::zeros(), 1.0, &cfg);
        let b = second.render_char('A', Vec2f::zeros(), 1.0, &cfg);

        assert_relative_eq!(a, b);
        assert_eq!(first.backend().textured_quads().count(), 1);
        assert_eq!(second.backend().textured_quads().count(), 1);
        assert_eq!(second.backend().live_textures(), 1);
    }

    // Each stub glyph advances 0.5 at height 1.

    #[test]
    fn test_wrap_breaks_before_crossing_index() {
        let mut r = renderer();
        let units = TextUnits::new("ABCD", Vec2f::zeros(), 1.0, config());

        let layout = r.layout_text_units(1.2, &units, usize::MAX);

        assert_eq!(line_texts(&layout), ["AB", "CD"]);
        assert_eq!(layout.lines[1].pos, Vec2f::new(0.0, -1.0));
        assert_eq!(layout.outcome.consumed, 4);
        assert!(layout.outcome.complete);
        assert_relative_eq!(layout.outcome.cursor.x, 1.0);
    }

    #[test]
    fn test_wrap_never_moves_last_char() {
        let mut r = renderer();
        let units = TextUnits::new("ABC", Vec2f::zeros(), 1.0, config());

        let layout = r.layout_text_units(1.2, &units, usize::MAX);

        assert_eq!(line_texts(&layout), ["ABC"]);
        assert_relative_eq!(layout.outcome.cursor.x, 1.5);
    }

    #[test]
    fn test_wrap_keeps_first_char_on_line() {
        let mut r = renderer();
        let units = TextUnits::new("ABC", Vec2f::zeros(), 1.0, config());

        let layout = r.layout_text_units(0.1, &units, usize::MAX);

        assert_eq!(line_texts(&layout), ["A", "BC"]);
    }

    #[test]
    fn test_wrap_budget_truncates() {
        let mut r = renderer();
        let units = TextUnits::new("ABCD", Vec2f::zeros(), 1.0, config()).chain("EF");

        let layout = r.layout_text_units(1.2, &units, 3);

        assert_eq!(line_texts(&layout), ["AB", "C"]);
        assert_eq!(layout.outcome.consumed, 3);
        assert!(!layout.outcome.complete);
    }

    #[test]
    fn test_wrap_break_unit_forces_newline() {
        let mut r = renderer();
        let cfg = config().with_line_spacing(0.25);
        let units = TextUnits::new("A", Vec2f::new(-0.5, 0.5), 1.0, cfg).br().chain("B");

        let layout = r.layout_text_units(10.0, &units, usize::MAX);

        assert_eq!(line_texts(&layout), ["A", "B"]);
        assert_eq!(layout.lines[1].pos, Vec2f::new(-0.5, 0.5 - 1.25));
    }

    #[test]
    fn test_wrap_runs_continue_on_same_line() {
        let mut r = renderer();
        let cfg = config();
        let units = TextUnits::new("AB", Vec2f::zeros(), 1.0, cfg.clone()).chain_with("CD", 1.0, cfg.with_color(color::black()));

        let layout = r.layout_text_units(10.0, &units, usize::MAX);

        assert_eq!(line_texts(&layout), ["AB", "CD"]);
        assert_eq!(layout.lines[1].pos, Vec2f::new(1.0, 0.0));
        assert_eq!(layout.lines[1].config.color(), color::black());
    }

    #[test]
    fn test_render_text_units_draws_layout() {
        let mut r = renderer();
        let units = TextUnits::new("ABCD", Vec2f::zeros(), 1.0, config());

        let outcome = r.render_text_units(1.2, &units, usize::MAX);

        assert_eq!(outcome.consumed, 4);
        let ys: Vec<f32> = quad_positions(&r).iter().map(|p| p.y).collect();
        assert_eq!(ys.len(), 4);
        assert_relative_eq!(ys[0] - ys[2], 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_render_texture_aa_returns_width() {
        let mut r = renderer();
        let tex = Texture::load_rgba(r.backend_mut(), &[0; 4 * 6], 3, 2).unwrap();

        let width = r.render_texture_aa(&tex, Vec2f::zeros(), 0.4).unwrap();

        assert_relative_eq!(width, 0.6, epsilon = 1e-6);
        assert_eq!(r.backend().bound_texture(), None);
    }
}
