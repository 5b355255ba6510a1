//! Texture resource
//!
//! A [`Texture`] owns exactly one backend handle. It is not `Clone`: the
//! handle is released once, through [`Texture::delete`].

use std::ops::{Deref, DerefMut};
use std::path::Path;

use super::backend::{BackendResult, Filter, GraphicsBackend, PixelFormat, RenderError, TextureId};

/// A 2D texture owned by the caller
#[derive(Debug, PartialEq, Eq)]
pub struct Texture {
    id: TextureId,
    width: u32,
    height: u32,
    format: PixelFormat,
}

impl Texture {
    /// Upload RGBA pixels, nearest filtering
    pub fn load_rgba(
        gfx: &mut dyn GraphicsBackend,
        pixels: &[u8],
        width: u32,
        height: u32,
    ) -> BackendResult<Self> {
        Self::load(gfx, PixelFormat::Rgba8, pixels, width, height)
    }

    /// Upload single-channel coverage pixels, nearest filtering
    pub fn load_grayscale(
        gfx: &mut dyn GraphicsBackend,
        pixels: &[u8],
        width: u32,
        height: u32,
    ) -> BackendResult<Self> {
        Self::load(gfx, PixelFormat::Alpha8, pixels, width, height)
    }

    /// Decode an image file and upload it as RGBA
    pub fn load_image<P: AsRef<Path>>(gfx: &mut dyn GraphicsBackend, path: P) -> BackendResult<Self> {
        let path = path.as_ref();
        let img = image::open(path)
            .map_err(|e| RenderError::Image(format!("{}: {}", path.display(), e)))?
            .to_rgba8();
        let (width, height) = img.dimensions();

        log::info!("Loaded image {}x{} from {:?}", width, height, path);

        Self::load_rgba(gfx, img.as_raw(), width, height)
    }

    fn load(
        gfx: &mut dyn GraphicsBackend,
        format: PixelFormat,
        pixels: &[u8],
        width: u32,
        height: u32,
    ) -> BackendResult<Self> {
        let id = gfx.create_texture(format, width, height, pixels)?;
        Ok(Self {
            id,
            width,
            height,
            format,
        })
    }

    /// Backend handle
    pub fn id(&self) -> TextureId {
        self.id
    }

    /// Size in pixels
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Pixel layout
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Width divided by height
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// Change the minification filter
    pub fn set_min_filter(&self, gfx: &mut dyn GraphicsBackend, filter: Filter) -> BackendResult<()> {
        gfx.set_min_filter(self.id, filter)
    }

    /// Make this texture the active sampling source
    pub fn bind(&self, gfx: &mut dyn GraphicsBackend) -> BackendResult<()> {
        gfx.bind_texture(self.id)
    }

    /// Clear the active sampling source
    pub fn unbind(&self, gfx: &mut dyn GraphicsBackend) {
        gfx.unbind_texture();
    }

    /// Bind and return a guard that unbinds when dropped
    pub fn bound<'a>(&self, gfx: &'a mut dyn GraphicsBackend) -> BackendResult<TextureGuard<'a>> {
        gfx.bind_texture(self.id)?;
        Ok(TextureGuard { gfx })
    }

    /// Run `f` with this texture bound; unbinds on every exit path
    pub fn with_bound<R>(
        &self,
        gfx: &mut dyn GraphicsBackend,
        f: impl FnOnce(&mut dyn GraphicsBackend) -> R,
    ) -> BackendResult<R> {
        let mut guard = self.bound(gfx)?;
        Ok(f(&mut *guard))
    }

    /// Release the backend handle
    pub fn delete(self, gfx: &mut dyn GraphicsBackend) -> BackendResult<()> {
        gfx.delete_texture(self.id)
    }
}

/// Keeps a texture bound for its lifetime
///
/// Dereferences to the backend so draw calls can go through the guard.
pub struct TextureGuard<'a> {
    gfx: &'a mut dyn GraphicsBackend,
}

impl<'a> Deref for TextureGuard<'a> {
    type Target = dyn GraphicsBackend + 'a;

    fn deref(&self) -> &Self::Target {
        self.gfx
    }
}

impl<'a> DerefMut for TextureGuard<'a> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.gfx
    }
}

impl Drop for TextureGuard<'_> {
    fn drop(&mut self) {
        self.gfx.unbind_texture();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::headless::{DrawCommand, HeadlessBackend};
    use crate::foundation::math::Vec2f;
    use std::panic::{catch_unwind, AssertUnwindSafe};

    #[test]
    fn test_grayscale_upload_defaults_to_nearest() {
        let mut gfx = HeadlessBackend::default();
        let tex = Texture::load_grayscale(&mut gfx, &[255; 6], 3, 2).unwrap();

        let stored = gfx.texture(tex.id()).unwrap();
        assert_eq!(stored.format, PixelFormat::Alpha8);
        assert_eq!(stored.min_filter, Filter::Nearest);
        assert_eq!(stored.mag_filter, Filter::Nearest);
        assert_eq!(tex.size(), (3, 2));
        assert!((tex.aspect_ratio() - 1.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_with_bound_unbinds() {
        let mut gfx = HeadlessBackend::default();
        let tex = Texture::load_rgba(&mut gfx, &[0; 4], 1, 1).unwrap();

        let drawn = tex
            .with_bound(&mut gfx, |g| {
                g.draw_textured_quad(Vec2f::zeros(), Vec2f::new(1.0, 1.0), Vec2f::zeros(), Vec2f::new(1.0, 1.0));
                7
            })
            .unwrap();

        assert_eq!(drawn, 7);
        assert_eq!(gfx.bound_texture(), None);
        assert_eq!(gfx.commands().last(), Some(&DrawCommand::Unbind));
    }

    #[test]
    fn test_guard_unbinds_on_panic() {
        let mut gfx = HeadlessBackend::default();
        let tex = Texture::load_rgba(&mut gfx, &[0; 4], 1, 1).unwrap();

        let result = catch_unwind(AssertUnwindSafe(|| {
            tex.with_bound(&mut gfx, |_| -> () { panic!("draw failed") }).ok();
        }));

        assert!(result.is_err());
        assert_eq!(gfx.bound_texture(), None);
    }

    #[test]
    fn test_delete_releases_handle() {
        let mut gfx = HeadlessBackend::default();
        let tex = Texture::load_rgba(&mut gfx, &[0; 8], 2, 1).unwrap();
        let id = tex.id();

        tex.delete(&mut gfx).unwrap();
        assert!(gfx.texture(id).is_none());
    }
}
