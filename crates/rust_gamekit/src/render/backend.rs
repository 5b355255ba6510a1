//! Backend abstraction trait for the rendering system
//!
//! The renderer, textures and glyph cache talk to the GPU only through
//! [`GraphicsBackend`]. The OpenGL implementation lives in
//! [`gl_backend`](super::gl_backend); [`headless`](super::headless) records
//! calls without a GPU.
//!
//! Coordinates are normalized device coordinates: `(-1, -1)` is the
//! bottom-left corner of the viewport and `(1, 1)` the top-right.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::foundation::math::{Color, Vec2f};
use thiserror::Error;

/// Result type for backend operations
pub type BackendResult<T> = Result<T, RenderError>;

/// Rendering errors
#[derive(Error, Debug)]
pub enum RenderError {
    /// Shader compilation or program linking failed
    #[error("Shader error: {0}")]
    Shader(String),

    /// GPU resource allocation failed
    #[error("Resource creation failed: {0}")]
    ResourceCreation(String),

    /// Texture handle does not belong to this backend or was deleted
    #[error("Unknown texture handle {0:?}")]
    UnknownTexture(TextureId),

    /// Pixel buffer does not match the declared size and format
    #[error("Pixel buffer has {actual} bytes, expected {expected}")]
    PixelBufferSize {
        /// Bytes required by width * height * channels
        expected: usize,
        /// Bytes supplied
        actual: usize,
    },

    /// Image decoding failed
    #[error("Image error: {0}")]
    Image(String),
}

/// Opaque handle to a backend texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub u32);

/// Identity of one backend object
///
/// Texture handles from different backends may share numeric values; caches
/// that outlive a single backend key their handles by this identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BackendInstance(u64);

impl BackendInstance {
    /// A value not handed out before in this process
    pub fn unique() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Pixel layout of an uploaded texture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// Four bytes per pixel
    Rgba8,
    /// One coverage byte per pixel, sampled as white with that alpha
    Alpha8,
}

impl PixelFormat {
    /// Bytes per pixel
    pub fn channels(self) -> usize {
        match self {
            PixelFormat::Rgba8 => 4,
            PixelFormat::Alpha8 => 1,
        }
    }
}

/// Texture sampling filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    /// Nearest-neighbor sampling
    Nearest,
    /// Bilinear sampling
    Linear,
}

/// Immediate-mode drawing interface
///
/// Every call executes on the thread owning the graphics context. Draw calls
/// use the color set by [`set_color`](Self::set_color) and, for textured
/// quads, the texture bound by [`bind_texture`](Self::bind_texture).
pub trait GraphicsBackend {
    /// Identity of this backend; its texture handles mean nothing elsewhere
    fn instance(&self) -> BackendInstance;

    /// Allocate a texture and upload `pixels`
    ///
    /// Both filters start as [`Filter::Nearest`].
    fn create_texture(
        &mut self,
        format: PixelFormat,
        width: u32,
        height: u32,
        pixels: &[u8],
    ) -> BackendResult<TextureId>;

    /// Change the minification filter of a texture
    fn set_min_filter(&mut self, texture: TextureId, filter: Filter) -> BackendResult<()>;

    /// Make `texture` the active sampling source
    fn bind_texture(&mut self, texture: TextureId) -> BackendResult<()>;

    /// Clear the active sampling source
    fn unbind_texture(&mut self);

    /// Release a texture; the handle must not be used afterwards
    fn delete_texture(&mut self, texture: TextureId) -> BackendResult<()>;

    /// Pixel size of a texture
    fn texture_size(&self, texture: TextureId) -> BackendResult<(u32, u32)>;

    /// Set the color used by subsequent draw calls
    fn set_color(&mut self, color: Color);

    /// Draw a quad with the bound texture
    ///
    /// `uv_start` maps to the top-left corner (`pos.y + size.y`) and
    /// `uv_end` to the bottom-right corner.
    fn draw_textured_quad(&mut self, pos: Vec2f, size: Vec2f, uv_start: Vec2f, uv_end: Vec2f);

    /// Draw a solid quad
    fn draw_quad(&mut self, pos: Vec2f, size: Vec2f);

    /// Draw connected line segments
    fn draw_line_strip(&mut self, points: &[Vec2f]);

    /// Clear the color buffer
    fn clear(&mut self, color: Color);

    /// Viewport size in pixels
    fn viewport_size(&self) -> (u32, u32);

    /// Resize the viewport
    fn set_viewport(&mut self, width: u32, height: u32);
}

/// Check a pixel buffer against its declared size
pub(crate) fn check_pixel_buffer(
    format: PixelFormat,
    width: u32,
    height: u32,
    pixels: &[u8],
) -> BackendResult<()> {
    let expected = width as usize * height as usize * format.channels();
    if pixels.len() == expected {
        Ok(())
    } else {
        Err(RenderError::PixelBufferSize {
            expected,
            actual: pixels.len(),
        })
    }
}
