//! Headless graphics backend
//!
//! Keeps textures in memory and records every draw call as a
//! [`DrawCommand`]. Used for tests and for running layout code without a
//! graphics context.

use std::collections::BTreeMap;

use super::backend::{
    check_pixel_buffer, BackendInstance, BackendResult, Filter, GraphicsBackend, PixelFormat, RenderError,
    TextureId,
};
use crate::foundation::math::{Color, Vec2f};

/// A recorded backend call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Textured quad drawn with `texture` bound
    TexturedQuad {
        /// Bound texture at draw time
        texture: Option<TextureId>,
        /// Bottom-left corner
        pos: Vec2f,
        /// Width and height
        size: Vec2f,
        /// Color at draw time
        color: Color,
    },
    /// Solid quad
    Quad {
        /// Bottom-left corner
        pos: Vec2f,
        /// Width and height
        size: Vec2f,
        /// Color at draw time
        color: Color,
    },
    /// Line strip
    LineStrip {
        /// Strip vertices
        points: Vec<Vec2f>,
        /// Color at draw time
        color: Color,
    },
    /// Color buffer clear
    Clear(Color),
    /// Texture bound
    Bind(TextureId),
    /// Texture unbound
    Unbind,
}

/// In-memory texture
#[derive(Debug, Clone)]
pub struct HeadlessTexture {
    /// Pixel layout
    pub format: PixelFormat,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Uploaded pixels
    pub pixels: Vec<u8>,
    /// Minification filter
    pub min_filter: Filter,
    /// Magnification filter
    pub mag_filter: Filter,
}

/// Backend that records calls instead of drawing
#[derive(Debug)]
pub struct HeadlessBackend {
    instance: BackendInstance,
    textures: BTreeMap<TextureId, HeadlessTexture>,
    next_id: u32,
    bound: Option<TextureId>,
    color: Color,
    viewport: (u32, u32),
    commands: Vec<DrawCommand>,
}

impl HeadlessBackend {
    /// Create a backend with the given viewport size
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            instance: BackendInstance::unique(),
            textures: BTreeMap::new(),
            next_id: 1,
            bound: None,
            color: Color::new(1.0, 1.0, 1.0, 1.0),
            viewport: (width, height),
            commands: Vec::new(),
        }
    }

    /// Calls recorded so far
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Drain the recorded calls
    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Look up a live texture
    pub fn texture(&self, id: TextureId) -> Option<&HeadlessTexture> {
        self.textures.get(&id)
    }

    /// Number of textures not yet deleted
    pub fn live_textures(&self) -> usize {
        self.textures.len()
    }

    /// Currently bound texture
    pub fn bound_texture(&self) -> Option<TextureId> {
        self.bound
    }

    /// Textured quads recorded so far
    pub fn textured_quads(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::TexturedQuad { .. }))
    }
}

impl Default for HeadlessBackend {
    fn default() -> Self {
        Self::new(800, 600)
    }
}

impl GraphicsBackend for HeadlessBackend {
    fn instance(&self) -> BackendInstance {
        self.instance
    }

    fn create_texture(
        &mut self,
        format: PixelFormat,
        width: u32,
        height: u32,
        pixels: &[u8],
    ) -> BackendResult<TextureId> {
        check_pixel_buffer(format, width, height, pixels)?;

        let id = TextureId(self.next_id);
        self.next_id += 1;
        self.textures.insert(
            id,
            HeadlessTexture {
                format,
                width,
                height,
                pixels: pixels.to_vec(),
                min_filter: Filter::Nearest,
                mag_filter: Filter::Nearest,
            },
        );
        Ok(id)
    }

    fn set_min_filter(&mut self, texture: TextureId, filter: Filter) -> BackendResult<()> {
        let tex = self
            .textures
            .get_mut(&texture)
            .ok_or(RenderError::UnknownTexture(texture))?;
        tex.min_filter = filter;
        Ok(())
    }

    fn bind_texture(&mut self, texture: TextureId) -> BackendResult<()> {
        if !self.textures.contains_key(&texture) {
            return Err(RenderError::UnknownTexture(texture));
        }
        self.bound = Some(texture);
        self.commands.push(DrawCommand::Bind(texture));
        Ok(())
    }

    fn unbind_texture(&mut self) {
        self.bound = None;
        self.commands.push(DrawCommand::Unbind);
    }

    fn delete_texture(&mut self, texture: TextureId) -> BackendResult<()> {
        self.textures
            .remove(&texture)
            .ok_or(RenderError::UnknownTexture(texture))?;
        if self.bound == Some(texture) {
            self.bound = None;
        }
        Ok(())
    }

    fn texture_size(&self, texture: TextureId) -> BackendResult<(u32, u32)> {
        self.textures
            .get(&texture)
            .map(|t| (t.width, t.height))
            .ok_or(RenderError::UnknownTexture(texture))
    }

    fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    fn draw_textured_quad(&mut self, pos: Vec2f, size: Vec2f, _uv_start: Vec2f, _uv_end: Vec2f) {
        self.commands.push(DrawCommand::TexturedQuad {
            texture: self.bound,
            pos,
            size,
            color: self.color,
        });
    }

    fn draw_quad(&mut self, pos: Vec2f, size: Vec2f) {
        self.commands.push(DrawCommand::Quad {
            pos,
            size,
            color: self.color,
        });
    }

    fn draw_line_strip(&mut self, points: &[Vec2f]) {
        self.commands.push(DrawCommand::LineStrip {
            points: points.to_vec(),
            color: self.color,
        });
    }

    fn clear(&mut self, color: Color) {
        self.commands.push(DrawCommand::Clear(color));
    }

    fn viewport_size(&self) -> (u32, u32) {
        self.viewport
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = (width, height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_texture_lifecycle() {
        let mut gfx = HeadlessBackend::new(100, 100);
        let id = gfx.create_texture(PixelFormat::Alpha8, 2, 2, &[0, 1, 2, 3]).unwrap();

        assert_eq!(gfx.texture_size(id).unwrap(), (2, 2));
        assert_eq!(gfx.texture(id).unwrap().min_filter, Filter::Nearest);

        gfx.delete_texture(id).unwrap();
        assert_eq!(gfx.live_textures(), 0);
        assert!(gfx.bind_texture(id).is_err());
    }

    #[test]
    fn test_pixel_buffer_size_checked() {
        let mut gfx = HeadlessBackend::default();
        let result = gfx.create_texture(PixelFormat::Rgba8, 2, 2, &[0; 4]);

        assert!(matches!(
            result,
            Err(RenderError::PixelBufferSize { expected: 16, actual: 4 })
        ));
    }
}
