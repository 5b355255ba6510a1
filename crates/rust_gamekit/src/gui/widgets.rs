//! GUI widget definitions

use crate::foundation::math::{color, BoundingRectangle, Color, Vec2f};
use crate::input::{MouseAction, MouseButton};
use crate::render::font::FontConfig;
use crate::render::{GraphicsBackend, Renderer};

use super::ClickResult;

/// Filled rectangle with an outline
#[derive(Debug, Clone)]
pub struct GuiBackground {
    /// Draw order
    pub z: i32,
    /// Bottom-left corner
    pub pos: Vec2f,
    /// Width and height
    pub size: Vec2f,
    /// Fill color
    pub fill: Color,
    /// Outline color; `None` draws no outline
    pub stroke: Option<Color>,
}

impl GuiBackground {
    /// Unoutlined rectangle
    pub fn new(z: i32, pos: Vec2f, size: Vec2f, fill: Color) -> Self {
        Self {
            z,
            pos,
            size,
            fill,
            stroke: None,
        }
    }

    /// Same background with an outline
    pub fn with_stroke(mut self, stroke: Color) -> Self {
        self.stroke = Some(stroke);
        self
    }

    /// Draw the fill, then the outline
    pub fn render<B: GraphicsBackend>(&self, renderer: &mut Renderer<B>) {
        renderer.set_color(self.fill);
        renderer.draw_square(self.pos, self.size);

        if let Some(stroke) = self.stroke {
            let (p, s) = (self.pos, self.size);
            renderer.set_color(stroke);
            renderer.render_line_strip(&[
                p,
                p + Vec2f::new(s.x, 0.0),
                p + s,
                p + Vec2f::new(0.0, s.y),
                p,
            ]);
        }
    }
}

/// Centered button caption
#[derive(Debug, Clone)]
pub struct ButtonLabel {
    /// Caption
    pub text: String,
    /// Glyph height
    pub height: f32,
    /// Caption style
    pub config: FontConfig,
}

/// Clickable rectangle reporting an action id
#[derive(Debug, Clone)]
pub struct GuiButton {
    /// Draw order
    pub z: i32,
    /// Clickable area
    pub bounds: BoundingRectangle,
    /// Fill color
    pub fill: Color,
    /// Caption centred in the bounds
    pub label: Option<ButtonLabel>,
    /// Reported by [`ClickResult::Clicked`] on a left press
    pub action_id: u32,
}

impl GuiButton {
    /// Gray unlabeled button
    pub fn new(z: i32, pos: Vec2f, size: Vec2f, action_id: u32) -> Self {
        Self {
            z,
            bounds: BoundingRectangle::new(pos, size),
            fill: color::grayscale(0.3),
            label: None,
            action_id,
        }
    }

    /// Same button with another fill
    pub fn with_fill(mut self, fill: Color) -> Self {
        self.fill = fill;
        self
    }

    /// Same button with a centred caption
    pub fn with_label(mut self, text: &str, height: f32, config: FontConfig) -> Self {
        self.label = Some(ButtonLabel {
            text: text.to_string(),
            height,
            config,
        });
        self
    }

    /// Draw the fill and the caption
    pub fn render<B: GraphicsBackend>(&self, renderer: &mut Renderer<B>) {
        renderer.set_color(self.fill);
        renderer.draw_square(self.bounds.pos, self.bounds.size);

        if let Some(label) = &self.label {
            let centre = self.bounds.pos + self.bounds.size / 2.0;
            renderer.render_string_line_centered(&label.text, centre, label.height, &label.config);
        }
    }

    /// Outside the bounds nothing happens; inside, a left press fires the
    /// action and anything else is swallowed
    pub fn handle_click(&self, cursor: Vec2f, button: MouseButton, action: MouseAction) -> ClickResult {
        if !self.bounds.contains(cursor) {
            return ClickResult::NotHandled;
        }
        if button == MouseButton::Left && action == MouseAction::Press {
            ClickResult::Clicked(self.action_id)
        } else {
            ClickResult::Consumed
        }
    }
}

/// Static text
#[derive(Debug, Clone)]
pub struct GuiText {
    /// Draw order
    pub z: i32,
    /// Anchor; the centre when the font config is centred
    pub pos: Vec2f,
    /// Glyph height
    pub height: f32,
    /// Text, possibly spanning several lines
    pub text: String,
    /// Text style
    pub config: FontConfig,
}

impl GuiText {
    /// Text node
    pub fn new(z: i32, pos: Vec2f, height: f32, text: &str, config: FontConfig) -> Self {
        Self {
            z,
            pos,
            height,
            text: text.to_string(),
            config,
        }
    }

    /// Draw the text
    pub fn render<B: GraphicsBackend>(&self, renderer: &mut Renderer<B>) {
        renderer.render_string(&self.text, self.pos, self.height, &self.config);
    }
}
