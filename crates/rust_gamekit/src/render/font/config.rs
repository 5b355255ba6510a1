//! Text styling

use std::rc::Rc;

use super::truetype::SharedFont;
use crate::foundation::math::{color, Color};

/// How a piece of text is drawn
///
/// Immutable value; every `with_*` method returns a modified copy sharing
/// the same font.
#[derive(Debug, Clone)]
pub struct FontConfig {
    font: SharedFont,
    color: Color,
    stroke_color: Option<Color>,
    thickness: u32,
    centered: bool,
    spacing: f32,
    line_spacing: f32,
    overline: bool,
    underline: bool,
    line_color: Color,
}

impl FontConfig {
    /// White, unstroked, left-aligned text with no extra spacing
    pub fn new(font: SharedFont) -> Self {
        Self {
            font,
            color: color::white(),
            stroke_color: None,
            thickness: 1,
            centered: false,
            spacing: 0.0,
            line_spacing: 0.0,
            overline: false,
            underline: false,
            line_color: color::white(),
        }
    }

    /// Font handle
    pub fn font(&self) -> &SharedFont {
        &self.font
    }

    /// Fill color
    pub fn color(&self) -> Color {
        self.color
    }

    /// Outline color, if the text is stroked
    pub fn stroke_color(&self) -> Option<Color> {
        self.stroke_color
    }

    /// Outline thickness in pixels
    pub fn thickness(&self) -> u32 {
        self.thickness
    }

    /// Whether positions name the text centre instead of its bottom-left
    pub fn is_centered(&self) -> bool {
        self.centered
    }

    /// Extra horizontal gap after each character
    pub fn spacing(&self) -> f32 {
        self.spacing
    }

    /// Extra vertical gap between lines
    pub fn line_spacing(&self) -> f32 {
        self.line_spacing
    }

    /// Whether a line is drawn along the top of each text line
    pub fn has_overline(&self) -> bool {
        self.overline
    }

    /// Whether a line is drawn along the bottom of each text line
    pub fn has_underline(&self) -> bool {
        self.underline
    }

    /// Color of overlines and underlines
    pub fn line_color(&self) -> Color {
        self.line_color
    }

    /// Same style with another font
    pub fn with_font(&self, font: SharedFont) -> Self {
        Self { font, ..self.clone() }
    }

    /// Same style with another fill color
    pub fn with_color(&self, color: Color) -> Self {
        Self { color, ..self.clone() }
    }

    /// Stroke the outline in `stroke_color`
    pub fn with_stroke(&self, stroke_color: Color) -> Self {
        Self {
            stroke_color: Some(stroke_color),
            ..self.clone()
        }
    }

    /// Drop the outline
    pub fn without_stroke(&self) -> Self {
        Self {
            stroke_color: None,
            ..self.clone()
        }
    }

    /// Outline thickness in pixels
    pub fn with_thickness(&self, thickness: u32) -> Self {
        Self { thickness, ..self.clone() }
    }

    /// Toggle centering
    pub fn with_centered(&self, centered: bool) -> Self {
        Self { centered, ..self.clone() }
    }

    /// Extra gap after each character
    pub fn with_spacing(&self, spacing: f32) -> Self {
        Self { spacing, ..self.clone() }
    }

    /// Extra gap between lines
    pub fn with_line_spacing(&self, line_spacing: f32) -> Self {
        Self {
            line_spacing,
            ..self.clone()
        }
    }

    /// Toggle the overline
    pub fn with_overline(&self, overline: bool) -> Self {
        Self { overline, ..self.clone() }
    }

    /// Toggle the underline
    pub fn with_underline(&self, underline: bool) -> Self {
        Self {
            underline,
            ..self.clone()
        }
    }

    /// Color of overlines and underlines
    pub fn with_line_color(&self, line_color: Color) -> Self {
        Self {
            line_color,
            ..self.clone()
        }
    }

    /// Width of `ch` relative to the text height
    pub fn char_aspect_ratio(&self, ch: char) -> f32 {
        self.font.borrow_mut().char_aspect_ratio(ch)
    }

    /// Width of `s` relative to the text height, spacing excluded
    pub fn string_aspect_ratio(&self, s: &str) -> f32 {
        self.font.borrow_mut().string_aspect_ratio(s)
    }

    /// Whether both configurations draw with the same font handle
    pub fn shares_font(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.font, &other.font)
    }
}
