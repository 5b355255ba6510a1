//! Input management system
//!
//! [`InputState`] keeps the keys held during the current and the previous
//! frame, so edge queries ("pressed this frame") need no callbacks. The
//! window feeds it GLFW events; tests feed it directly.

pub mod controller;

pub use controller::{
    Controller, ControllerManager, Direction, HatController, JoystickController,
    JoystickSnapshot, KeyboardController,
};

use std::collections::{HashSet, VecDeque};

use crate::foundation::math::Vec2f;

/// Key codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A key
    A,
    /// B key
    B,
    /// C key
    C,
    /// D key
    D,
    /// E key
    E,
    /// F key
    F,
    /// G key
    G,
    /// H key
    H,
    /// I key
    I,
    /// J key
    J,
    /// K key
    K,
    /// L key
    L,
    /// M key
    M,
    /// N key
    N,
    /// O key
    O,
    /// P key
    P,
    /// Q key
    Q,
    /// R key
    R,
    /// S key
    S,
    /// T key
    T,
    /// U key
    U,
    /// V key
    V,
    /// W key
    W,
    /// X key
    X,
    /// Y key
    Y,
    /// Z key
    Z,
    /// Space key
    Space,
    /// Enter key
    Enter,
    /// Escape key
    Escape,
    /// Tab key
    Tab,
    /// Backspace key
    Backspace,
    /// Up arrow
    Up,
    /// Down arrow
    Down,
    /// Left arrow
    Left,
    /// Right arrow
    Right,
    /// F11, conventionally the fullscreen toggle
    F11,
}

impl KeyCode {
    /// Map a GLFW key; keys without a code are ignored
    pub fn from_glfw(key: glfw::Key) -> Option<Self> {
        use glfw::Key as G;
        Some(match key {
            G::A => KeyCode::A,
            G::B => KeyCode::B,
            G::C => KeyCode::C,
            G::D => KeyCode::D,
            G::E => KeyCode::E,
            G::F => KeyCode::F,
            G::G => KeyCode::G,
            G::H => KeyCode::H,
            G::I => KeyCode::I,
            G::J => KeyCode::J,
            G::K => KeyCode::K,
            G::L => KeyCode::L,
            G::M => KeyCode::M,
            G::N => KeyCode::N,
            G::O => KeyCode::O,
            G::P => KeyCode::P,
            G::Q => KeyCode::Q,
            G::R => KeyCode::R,
            G::S => KeyCode::S,
            G::T => KeyCode::T,
            G::U => KeyCode::U,
            G::V => KeyCode::V,
            G::W => KeyCode::W,
            G::X => KeyCode::X,
            G::Y => KeyCode::Y,
            G::Z => KeyCode::Z,
            G::Space => KeyCode::Space,
            G::Enter => KeyCode::Enter,
            G::Escape => KeyCode::Escape,
            G::Tab => KeyCode::Tab,
            G::Backspace => KeyCode::Backspace,
            G::Up => KeyCode::Up,
            G::Down => KeyCode::Down,
            G::Left => KeyCode::Left,
            G::Right => KeyCode::Right,
            G::F11 => KeyCode::F11,
            _ => return None,
        })
    }
}

/// Mouse buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Left mouse button
    Left,
    /// Right mouse button
    Right,
    /// Middle mouse button
    Middle,
    /// Any other button, by GLFW index
    Other(u8),
}

impl MouseButton {
    /// Map a GLFW mouse button
    pub fn from_glfw(button: glfw::MouseButton) -> Self {
        match button {
            glfw::MouseButton::Button1 => MouseButton::Left,
            glfw::MouseButton::Button2 => MouseButton::Right,
            glfw::MouseButton::Button3 => MouseButton::Middle,
            other => MouseButton::Other(other as u8),
        }
    }
}

/// What happened to a mouse button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseAction {
    /// Button went down
    Press,
    /// Button went up
    Release,
}

/// One queued mouse button event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseClick {
    /// Button involved
    pub button: MouseButton,
    /// Press or release
    pub action: MouseAction,
}

/// Window pixel coordinates to normalized device coordinates
///
/// `(x / w, 1 - y / h) * 2 - 1`: the top-left pixel maps to `(-1, 1)`.
pub fn cursor_to_ndc(x: f64, y: f64, width: u32, height: u32) -> Vec2f {
    let w = width.max(1) as f32;
    let h = height.max(1) as f32;
    Vec2f::new(x as f32 / w, 1.0 - y as f32 / h) * 2.0 - Vec2f::new(1.0, 1.0)
}

/// Keyboard, cursor and click state for one window
#[derive(Debug, Clone)]
pub struct InputState {
    keys: HashSet<KeyCode>,
    keys_prev: HashSet<KeyCode>,
    cursor: Vec2f,
    window_size: (u32, u32),
    clicks: VecDeque<MouseClick>,
}

impl InputState {
    /// Empty state for a window of the given pixel size
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            keys: HashSet::new(),
            keys_prev: HashSet::new(),
            cursor: Vec2f::zeros(),
            window_size: (width, height),
            clicks: VecDeque::new(),
        }
    }

    /// Feed one GLFW window event
    pub fn handle_event(&mut self, event: &glfw::WindowEvent) {
        match *event {
            glfw::WindowEvent::Key(key, _, action, _) => {
                if let Some(code) = KeyCode::from_glfw(key) {
                    self.key_event(code, action != glfw::Action::Release);
                }
            }
            glfw::WindowEvent::CursorPos(x, y) => self.cursor_moved(x, y),
            glfw::WindowEvent::MouseButton(button, action, _) => {
                let action = match action {
                    glfw::Action::Release => MouseAction::Release,
                    _ => MouseAction::Press,
                };
                self.mouse_event(MouseButton::from_glfw(button), action);
            }
            glfw::WindowEvent::Size(width, height) => {
                self.set_window_size(width.max(0) as u32, height.max(0) as u32);
            }
            _ => {}
        }
    }

    /// Record a key going down (`down`) or up; repeats count as down
    pub fn key_event(&mut self, key: KeyCode, down: bool) {
        if down {
            self.keys.insert(key);
        } else {
            self.keys.remove(&key);
        }
    }

    /// Record a cursor move in window pixels
    pub fn cursor_moved(&mut self, x: f64, y: f64) {
        self.cursor = cursor_to_ndc(x, y, self.window_size.0, self.window_size.1);
    }

    /// Queue a mouse button event
    pub fn mouse_event(&mut self, button: MouseButton, action: MouseAction) {
        self.clicks.push_back(MouseClick { button, action });
    }

    /// Window size used for cursor normalization
    pub fn set_window_size(&mut self, width: u32, height: u32) {
        self.window_size = (width, height);
    }

    /// Close the frame: the current keys become the previous keys
    pub fn update(&mut self) {
        self.keys_prev.clone_from(&self.keys);
    }

    /// Down now, up last frame
    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        !self.keys_prev.contains(&key) && self.keys.contains(&key)
    }

    /// Down now and last frame
    pub fn is_key_repeated(&self, key: KeyCode) -> bool {
        self.keys_prev.contains(&key) && self.keys.contains(&key)
    }

    /// Whether `key` is held this frame
    pub fn is_key_down(&self, key: KeyCode) -> bool {
        self.keys.contains(&key)
    }

    /// Down last frame, up now
    pub fn is_key_get_released(&self, key: KeyCode) -> bool {
        self.keys_prev.contains(&key) && !self.keys.contains(&key)
    }

    /// Up now
    pub fn is_key_released(&self, key: KeyCode) -> bool {
        !self.keys.contains(&key)
    }

    /// Forget every held key
    pub fn reset(&mut self) {
        self.keys.clear();
        self.keys_prev.clear();
    }

    /// Cursor in normalized device coordinates
    pub fn cursor_position(&self) -> Vec2f {
        self.cursor
    }

    /// Take the queued mouse button events, oldest first
    pub fn drain_clicks(&mut self) -> impl Iterator<Item = MouseClick> + '_ {
        self.clicks.drain(..)
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_key_transitions() {
        let mut input = InputState::default();

        input.key_event(KeyCode::Space, true);
        assert!(input.is_key_pressed(KeyCode::Space));
        assert!(!input.is_key_repeated(KeyCode::Space));
        assert!(input.is_key_down(KeyCode::Space));

        input.update();
        assert!(!input.is_key_pressed(KeyCode::Space));
        assert!(input.is_key_repeated(KeyCode::Space));

        input.key_event(KeyCode::Space, false);
        assert!(input.is_key_get_released(KeyCode::Space));
        assert!(input.is_key_released(KeyCode::Space));

        input.update();
        assert!(!input.is_key_get_released(KeyCode::Space));
        assert!(input.is_key_released(KeyCode::Space));
    }

    #[test]
    fn test_reset_clears_both_frames() {
        let mut input = InputState::default();
        input.key_event(KeyCode::A, true);
        input.update();

        input.reset();

        assert!(!input.is_key_down(KeyCode::A));
        assert!(!input.is_key_get_released(KeyCode::A));
    }

    #[test]
    fn test_cursor_ndc() {
        let mut input = InputState::new(800, 600);

        input.cursor_moved(0.0, 0.0);
        assert_relative_eq!(input.cursor_position(), Vec2f::new(-1.0, 1.0));

        input.cursor_moved(400.0, 300.0);
        assert_relative_eq!(input.cursor_position(), Vec2f::new(0.0, 0.0));

        input.cursor_moved(800.0, 600.0);
        assert_relative_eq!(input.cursor_position(), Vec2f::new(1.0, -1.0));
    }

    #[test]
    fn test_cursor_follows_resize() {
        let mut input = InputState::new(800, 600);
        input.set_window_size(400, 300);

        input.cursor_moved(400.0, 0.0);

        assert_relative_eq!(input.cursor_position(), Vec2f::new(1.0, 1.0));
    }

    #[test]
    fn test_clicks_queue_in_order() {
        let mut input = InputState::default();
        input.mouse_event(MouseButton::Left, MouseAction::Press);
        input.mouse_event(MouseButton::Left, MouseAction::Release);

        let clicks: Vec<_> = input.drain_clicks().collect();

        assert_eq!(
            clicks,
            vec![
                MouseClick { button: MouseButton::Left, action: MouseAction::Press },
                MouseClick { button: MouseButton::Left, action: MouseAction::Release },
            ]
        );
        assert_eq!(input.drain_clicks().count(), 0);
    }

    #[test]
    fn test_glfw_events() {
        let mut input = InputState::new(100, 100);

        input.handle_event(&glfw::WindowEvent::Key(
            glfw::Key::W,
            0,
            glfw::Action::Press,
            glfw::Modifiers::empty(),
        ));
        input.handle_event(&glfw::WindowEvent::Key(
            glfw::Key::F1,
            0,
            glfw::Action::Press,
            glfw::Modifiers::empty(),
        ));
        input.handle_event(&glfw::WindowEvent::MouseButton(
            glfw::MouseButton::Button2,
            glfw::Action::Press,
            glfw::Modifiers::empty(),
        ));
        input.handle_event(&glfw::WindowEvent::CursorPos(50.0, 50.0));

        assert!(input.is_key_down(KeyCode::W));
        assert_eq!(
            input.drain_clicks().next(),
            Some(MouseClick { button: MouseButton::Right, action: MouseAction::Press })
        );
        assert_relative_eq!(input.cursor_position(), Vec2f::zeros());
    }
}
