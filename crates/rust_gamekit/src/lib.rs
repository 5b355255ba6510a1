//! # Rust Gamekit
//!
//! Small building blocks for 2D games on GLFW and OpenGL.
//!
//! ## Features
//!
//! - **Text**: TrueType glyph cache, single and multi-line text, centering,
//!   outlines, and word-wrapped text chains
//! - **Rendering**: textured and solid quads through a swappable
//!   [`render::GraphicsBackend`] (OpenGL via `glow`, or headless)
//! - **Audio**: WAV and OGG decoding, rodio playback with distance gain
//! - **Windowing**: GLFW window, key edge tracking, joystick and keyboard
//!   direction controllers
//! - **GUI**: z-ordered backgrounds, buttons and text
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rust_gamekit::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     rust_gamekit::foundation::logging::init();
//!     let config = KitConfig::default();
//!
//!     let mut window = Window::create(&config.window)?;
//!     let (w, h) = window.framebuffer_size();
//!     let gfx = GlBackend::from_loader(|name| window.get_proc_address(name), w, h)?;
//!     let mut renderer = Renderer::new(gfx);
//!
//!     let font = TruetypeFont::load("assets/static/fonts/mono.ttf")?.shared();
//!     let text = FontConfig::new(font.clone()).with_centered(true);
//!
//!     while !window.should_close() {
//!         window.input_mut().update();
//!         window.poll_events();
//!         renderer.clear_screen(color::black());
//!         renderer.render_string("Hello", Vec2f::zeros(), 0.1, &text);
//!         window.swap_buffers();
//!     }
//!
//!     font.borrow_mut().close(renderer.backend_mut())?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod audio;
pub mod config;
pub mod foundation;
pub mod gui;
pub mod input;
pub mod render;
pub mod resources;
pub mod window;

/// Common imports for gamekit users
pub mod prelude {
    pub use crate::{
        audio::{AudioBackend, Sound, SoundBuffer, SourceParams, SourceState, WavInfo, WavParser},
        config::{Config, KitConfig},
        foundation::math::{color, BoundingRectangle, Color, Vec2f, Vec2i, Vec3f},
        gui::{ClickResult, GuiBackground, GuiButton, GuiNode, GuiScreen, GuiText},
        input::{Controller, ControllerManager, Direction, InputState, KeyCode, MouseAction, MouseButton},
        render::{
            font::{FontConfig, TextUnits, TruetypeFont},
            GlBackend, GraphicsBackend, HeadlessBackend, Renderer, Texture,
        },
        resources::ResourceManager,
        window::Window,
    };
}
