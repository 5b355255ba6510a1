//! # Rendering System
//!
//! Immediate-mode 2D drawing in normalized device coordinates.
//!
//! ## Architecture
//!
//! - **Backend**: [`GraphicsBackend`] is the only path to the GPU.
//!   [`GlBackend`] drives OpenGL 3.3 through `glow`; [`HeadlessBackend`]
//!   records calls for tests and offscreen layout.
//! - **Texture**: [`Texture`] owns one backend handle.
//! - **Font**: [`font::TruetypeFont`] rasterizes glyphs on demand and
//!   caches them as single-channel textures.
//! - **Renderer**: [`Renderer`] draws quads, textures and text, including
//!   word-wrapped [`font::TextUnits`] chains.

pub mod backend;
pub mod font;
pub mod gl_backend;
pub mod headless;
pub mod renderer;
pub mod texture;

pub use backend::{BackendInstance, BackendResult, Filter, GraphicsBackend, PixelFormat, RenderError, TextureId};
pub use gl_backend::GlBackend;
pub use headless::{DrawCommand, HeadlessBackend};
pub use renderer::{LaidOutLine, Renderer, TextLayout, WrapOutcome};
pub use texture::{Texture, TextureGuard};
