//! Window management using GLFW
//!
//! Opens an OpenGL 3.3 core window and routes its events into an
//! [`InputState`]. GLFW errors are logged at error level.

use std::ffi::c_void;

use glfw::Context;
use thiserror::Error;

use crate::config::WindowConfig;
use crate::foundation::math::Vec2i;
use crate::input::{InputState, JoystickSnapshot};

/// Window management errors
#[derive(Error, Debug)]
pub enum WindowError {
    /// GLFW could not be initialized
    #[error("GLFW initialization failed: {0}")]
    InitializationFailed(String),

    /// GLFW refused to open the window
    #[error("Window creation failed")]
    CreationFailed,
}

/// Result type for window operations
pub type WindowResult<T> = Result<T, WindowError>;

/// Position of the window after leaving fullscreen
const WINDOWED_POSITION: (i32, i32) = (50, 50);

/// Window size after leaving fullscreen, `(w, h) * 3 / 4`
fn windowed_size(width: i32, height: i32) -> (u32, u32) {
    ((width.max(1) * 3 / 4) as u32, (height.max(1) * 3 / 4) as u32)
}

/// GLFW window wrapper with proper resource management
pub struct Window {
    glfw: glfw::Glfw,
    window: glfw::PWindow,
    events: glfw::GlfwReceiver<(f64, glfw::WindowEvent)>,
    input: InputState,
}

impl Window {
    /// Initialize GLFW and open a window with a current GL context
    pub fn create(config: &WindowConfig) -> WindowResult<Self> {
        let mut glfw = glfw::init(glfw::log_errors)
            .map_err(|e| WindowError::InitializationFailed(format!("{:?}", e)))?;

        glfw.window_hint(glfw::WindowHint::ContextVersion(3, 3));
        glfw.window_hint(glfw::WindowHint::OpenGlProfile(glfw::OpenGlProfileHint::Core));
        glfw.window_hint(glfw::WindowHint::OpenGlForwardCompat(true));
        glfw.window_hint(glfw::WindowHint::Resizable(config.resizable));

        let (mut window, events) = glfw
            .create_window(
                config.width,
                config.height,
                &config.title,
                glfw::WindowMode::Windowed,
            )
            .ok_or(WindowError::CreationFailed)?;

        window.make_current();
        glfw.set_swap_interval(if config.vsync {
            glfw::SwapInterval::Sync(1)
        } else {
            glfw::SwapInterval::None
        });

        window.set_key_polling(true);
        window.set_cursor_pos_polling(true);
        window.set_mouse_button_polling(true);
        window.set_size_polling(true);
        window.set_framebuffer_size_polling(true);
        window.set_close_polling(true);

        let (width, height) = window.get_size();
        let mut input = InputState::new(width.max(0) as u32, height.max(0) as u32);
        let (cx, cy) = window.get_cursor_pos();
        input.cursor_moved(cx, cy);

        log::info!(
            "Created {}x{} window {:?}",
            config.width,
            config.height,
            config.title
        );

        Ok(Self {
            glfw,
            window,
            events,
            input,
        })
    }

    /// Whether the user asked to close the window
    pub fn should_close(&self) -> bool {
        self.window.should_close()
    }

    /// Request or cancel closing
    pub fn set_should_close(&mut self, should_close: bool) {
        self.window.set_should_close(should_close);
    }

    /// Present the back buffer
    pub fn swap_buffers(&mut self) {
        self.window.swap_buffers();
    }

    /// Poll GLFW, feed the input state, and return the events
    ///
    /// Call [`InputState::update`] before polling to close the previous frame.
    pub fn poll_events(&mut self) -> Vec<glfw::WindowEvent> {
        self.glfw.poll_events();
        let mut events = Vec::new();
        for (_, event) in glfw::flush_messages(&self.events) {
            self.input.handle_event(&event);
            events.push(event);
        }
        events
    }

    /// Input state fed by [`poll_events`](Self::poll_events)
    pub fn input(&self) -> &InputState {
        &self.input
    }

    /// Mutable input state
    pub fn input_mut(&mut self) -> &mut InputState {
        &mut self.input
    }

    /// Window size in screen coordinates
    pub fn size(&self) -> Vec2i {
        let (width, height) = self.window.get_size();
        Vec2i::new(width, height)
    }

    /// Framebuffer size in pixels
    pub fn framebuffer_size(&self) -> (u32, u32) {
        let (width, height) = self.window.get_framebuffer_size();
        (width.max(0) as u32, height.max(0) as u32)
    }

    /// Resize the client area in screen coordinates
    pub fn set_size(&mut self, size: Vec2i) {
        self.window.set_size(size.x, size.y);
    }

    /// Lock the client area to `numer:denom`
    pub fn set_aspect_ratio(&mut self, numer: u32, denom: u32) {
        self.window.set_aspect_ratio(numer, denom);
    }

    /// Constrain the client area between `min` and `max`
    pub fn set_size_limits(&mut self, min: Vec2i, max: Vec2i) {
        let dim = |v: i32| Some(v.max(0) as u32);
        self.window
            .set_size_limits(dim(min.x), dim(min.y), dim(max.x), dim(max.y));
    }

    /// Whether the window occupies a monitor
    pub fn is_fullscreen(&self) -> bool {
        self.window.with_window_mode(|mode| match mode {
            glfw::WindowMode::FullScreen(_) => true,
            glfw::WindowMode::Windowed => false,
        })
    }

    /// Switch to the primary monitor, or back to a windowed 3/4 size
    pub fn set_fullscreen(&mut self, fullscreen: bool) {
        if self.is_fullscreen() == fullscreen {
            return;
        }

        let (width, height) = self.window.get_size();
        let window = &mut self.window;
        if fullscreen {
            self.glfw.with_primary_monitor(|_, monitor| {
                let Some(monitor) = monitor else {
                    log::warn!("No primary monitor; staying windowed");
                    return;
                };
                let Some(mode) = monitor.get_video_mode() else {
                    log::warn!("Primary monitor has no video mode; staying windowed");
                    return;
                };
                window.set_monitor(
                    glfw::WindowMode::FullScreen(&*monitor),
                    0,
                    0,
                    mode.width,
                    mode.height,
                    None,
                );
            });
        } else {
            let (w, h) = windowed_size(width, height);
            window.set_monitor(
                glfw::WindowMode::Windowed,
                WINDOWED_POSITION.0,
                WINDOWED_POSITION.1,
                w,
                h,
                None,
            );
        }
    }

    /// GL function pointer lookup for `glow`
    pub fn get_proc_address(&mut self, name: &str) -> *const c_void {
        self.window.get_proc_address(name) as *const c_void
    }

    /// Read the first joystick
    pub fn joystick(&self) -> JoystickSnapshot {
        JoystickSnapshot::poll(&self.glfw, glfw::JoystickId::Joystick1)
    }

    /// Seconds since GLFW was initialized
    pub fn time(&self) -> f64 {
        self.glfw.get_time()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_windowed_size_is_three_quarters() {
        assert_eq!(windowed_size(1280, 960), (960, 720));
        assert_eq!(windowed_size(0, -5), (0, 0));
    }
}
