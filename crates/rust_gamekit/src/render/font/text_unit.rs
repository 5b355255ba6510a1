//! Mixed-style text runs for word-wrapped rendering

use super::config::FontConfig;
use crate::foundation::math::Vec2f;

/// One run in a [`TextUnits`] chain
#[derive(Debug, Clone)]
pub enum TextUnit {
    /// Text continuing on the current line
    Line {
        /// Characters of the run, without line separators
        text: String,
        /// Glyph height
        height: f32,
        /// Style of the run
        config: FontConfig,
    },
    /// Forced line break
    Break {
        /// Height of the line being ended
        height: f32,
        /// Style supplying the line spacing
        config: FontConfig,
    },
}

impl TextUnit {
    /// Glyph height of the run
    pub fn height(&self) -> f32 {
        match self {
            TextUnit::Line { height, .. } | TextUnit::Break { height, .. } => *height,
        }
    }

    /// Style of the run
    pub fn config(&self) -> &FontConfig {
        match self {
            TextUnit::Line { config, .. } | TextUnit::Break { config, .. } => config,
        }
    }

    /// Text of the run; empty for breaks
    pub fn text(&self) -> &str {
        match self {
            TextUnit::Line { text, .. } => text,
            TextUnit::Break { .. } => "",
        }
    }
}

/// Ordered runs anchored at the bottom-left corner of the first line
///
/// Built left to right with [`chain`](Self::chain) and [`br`](Self::br);
/// line separators inside chained text become breaks.
///
/// ```rust,ignore
/// let units = TextUnits::new("Hello", Vec2f::new(-0.9, 0.8), 0.1, body.clone())
///     .chain_with(" world", 0.1, bold)
///     .br()
///     .chain("second line");
/// ```
#[derive(Debug, Clone)]
pub struct TextUnits {
    anchor: Vec2f,
    units: Vec<TextUnit>,
}

impl TextUnits {
    /// Start a chain at `anchor`
    pub fn new(text: &str, anchor: Vec2f, height: f32, config: FontConfig) -> Self {
        let units = Self {
            anchor,
            units: Vec::new(),
        };
        units.chain_with(text, height, config)
    }

    /// Append text in the style of the last run
    #[must_use]
    pub fn chain(self, text: &str) -> Self {
        let (height, config) = self.last_style();
        self.chain_with(text, height, config)
    }

    /// Append text in a new style
    #[must_use]
    pub fn chain_with(mut self, text: &str, height: f32, config: FontConfig) -> Self {
        let lines = split_lines(text);
        let last = lines.len() - 1;
        for (i, line) in lines.into_iter().enumerate() {
            self.units.push(TextUnit::Line {
                text: line.to_string(),
                height,
                config: config.clone(),
            });
            if i != last {
                self.units.push(TextUnit::Break {
                    height,
                    config: config.clone(),
                });
            }
        }
        self
    }

    /// Append a line break in the style of the last run
    #[must_use]
    pub fn br(mut self) -> Self {
        let (height, config) = self.last_style();
        self.units.push(TextUnit::Break { height, config });
        self
    }

    fn last_style(&self) -> (f32, FontConfig) {
        // `new` always pushes at least one unit
        let last = &self.units[self.units.len() - 1];
        (last.height(), last.config().clone())
    }

    /// Bottom-left corner of the first line
    pub fn anchor(&self) -> Vec2f {
        self.anchor
    }

    /// Runs in drawing order
    pub fn units(&self) -> &[TextUnit] {
        &self.units
    }

    /// Number of characters across all runs, breaks excluded
    pub fn char_count(&self) -> usize {
        self.units.iter().map(|u| u.text().chars().count()).sum()
    }
}

/// Split on `\n`, `\r\n` and lone `\r`
///
/// Always yields at least one line; a trailing separator yields a final
/// empty line.
pub(crate) fn split_lines(s: &str) -> Vec<&str> {
    let bytes = s.as_bytes();
    let mut lines = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\n' => {
                lines.push(&s[start..i]);
                start = i + 1;
            }
            b'\r' => {
                lines.push(&s[start..i]);
                if bytes.get(i + 1) == Some(&b'\n') {
                    i += 1;
                }
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    lines.push(&s[start..]);
    lines
}
