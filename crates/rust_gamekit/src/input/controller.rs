//! Directional controllers over keyboard and joystick

use std::collections::BTreeSet;

use super::{InputState, KeyCode};

/// Compass direction requested by a controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Direction {
    /// Up
    North,
    /// Right
    East,
    /// Down
    South,
    /// Left
    West,
}

/// Hat bit for up, as GLFW reports it
pub const HAT_UP: u8 = 0x01;
/// Hat bit for right
pub const HAT_RIGHT: u8 = 0x02;
/// Hat bit for down
pub const HAT_DOWN: u8 = 0x04;
/// Hat bit for left
pub const HAT_LEFT: u8 = 0x08;

/// Axis deflection beyond which a stick counts as pushed
pub const AXIS_THRESHOLD: f32 = 0.5;

/// Joystick state read once per frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JoystickSnapshot {
    /// Whether a joystick is connected
    pub present: bool,
    /// Axis positions in `-1.0..=1.0`
    pub axes: Vec<f32>,
    /// One bit set per hat, see [`HAT_UP`] and friends
    pub hats: Vec<u8>,
}

impl JoystickSnapshot {
    /// No joystick connected
    pub fn absent() -> Self {
        Self::default()
    }

    /// Read joystick `id` through GLFW
    pub fn poll(glfw: &glfw::Glfw, id: glfw::JoystickId) -> Self {
        let joystick = glfw.get_joystick(id);
        if !joystick.is_present() {
            return Self::absent();
        }
        Self {
            present: true,
            axes: joystick.get_axes(),
            hats: joystick
                .get_hats()
                .into_iter()
                .map(|hat| hat.bits() as u8)
                .collect(),
        }
    }
}

/// Something that turns input into a set of directions each frame
pub trait Controller {
    /// Directions requested during the last update
    fn directions(&self) -> &BTreeSet<Direction>;

    /// Whether updates produce directions
    fn is_enabled(&self) -> bool;

    /// Turn updates on or off
    fn set_enabled(&mut self, enabled: bool);

    /// Shorthand for `set_enabled(true)`
    fn enable(&mut self) {
        self.set_enabled(true);
    }

    /// Shorthand for `set_enabled(false)`
    fn disable(&mut self) {
        self.set_enabled(false);
    }
}

macro_rules! impl_controller {
    ($ty:ty) => {
        impl Controller for $ty {
            fn directions(&self) -> &BTreeSet<Direction> {
                &self.directions
            }

            fn is_enabled(&self) -> bool {
                self.enabled
            }

            fn set_enabled(&mut self, enabled: bool) {
                self.enabled = enabled;
            }
        }

        impl Default for $ty {
            fn default() -> Self {
                Self {
                    directions: BTreeSet::new(),
                    enabled: true,
                }
            }
        }
    };
}

/// Arrow keys and WASD
#[derive(Debug, Clone)]
pub struct KeyboardController {
    directions: BTreeSet<Direction>,
    enabled: bool,
}

impl KeyboardController {
    /// Read the held keys
    pub fn update(&mut self, input: &InputState) {
        self.directions.clear();
        if !self.enabled {
            return;
        }

        let bindings = [
            (KeyCode::Up, KeyCode::W, Direction::North),
            (KeyCode::Right, KeyCode::D, Direction::East),
            (KeyCode::Down, KeyCode::S, Direction::South),
            (KeyCode::Left, KeyCode::A, Direction::West),
        ];
        for (arrow, letter, direction) in bindings {
            if input.is_key_down(arrow) || input.is_key_down(letter) {
                self.directions.insert(direction);
            }
        }
    }
}

impl_controller!(KeyboardController);

/// First hat of a joystick
#[derive(Debug, Clone)]
pub struct HatController {
    directions: BTreeSet<Direction>,
    enabled: bool,
}

impl HatController {
    /// Read the first hat
    pub fn update(&mut self, joystick: &JoystickSnapshot) {
        self.directions.clear();
        if !self.enabled || !joystick.present {
            return;
        }
        let Some(&hat) = joystick.hats.first() else {
            return;
        };

        let bits = [
            (HAT_UP, Direction::North),
            (HAT_RIGHT, Direction::East),
            (HAT_DOWN, Direction::South),
            (HAT_LEFT, Direction::West),
        ];
        for (bit, direction) in bits {
            if hat & bit != 0 {
                self.directions.insert(direction);
            }
        }
    }
}

impl_controller!(HatController);

/// First two joystick axes; negative y points north
#[derive(Debug, Clone)]
pub struct JoystickController {
    directions: BTreeSet<Direction>,
    enabled: bool,
}

impl JoystickController {
    /// Read the first two axes
    pub fn update(&mut self, joystick: &JoystickSnapshot) {
        self.directions.clear();
        if !self.enabled || !joystick.present {
            return;
        }
        let (Some(&x), Some(&y)) = (joystick.axes.first(), joystick.axes.get(1)) else {
            return;
        };

        if y < -AXIS_THRESHOLD {
            self.directions.insert(Direction::North);
        }
        if x > AXIS_THRESHOLD {
            self.directions.insert(Direction::East);
        }
        if y > AXIS_THRESHOLD {
            self.directions.insert(Direction::South);
        }
        if x < -AXIS_THRESHOLD {
            self.directions.insert(Direction::West);
        }
    }
}

impl_controller!(JoystickController);

/// Union of keyboard, hat and stick
#[derive(Debug, Clone)]
pub struct ControllerManager {
    /// Arrow keys and WASD
    pub keyboard: KeyboardController,
    /// Joystick hat
    pub hat: HatController,
    /// Joystick stick
    pub joystick: JoystickController,
    directions: BTreeSet<Direction>,
    enabled: bool,
}

impl ControllerManager {
    /// Enabled manager with enabled children
    pub fn new() -> Self {
        Self {
            keyboard: KeyboardController::default(),
            hat: HatController::default(),
            joystick: JoystickController::default(),
            directions: BTreeSet::new(),
            enabled: true,
        }
    }

    /// Update every child controller and merge their directions
    ///
    /// A disabled manager keeps its last directions and leaves the
    /// children untouched.
    pub fn update(&mut self, input: &InputState, joystick: &JoystickSnapshot) {
        if !self.enabled {
            return;
        }

        self.keyboard.enable();
        self.hat.enable();
        self.joystick.enable();

        self.joystick.update(joystick);
        self.hat.update(joystick);
        self.keyboard.update(input);

        self.directions = self
            .joystick
            .directions()
            .iter()
            .chain(self.hat.directions())
            .chain(self.keyboard.directions())
            .copied()
            .collect();
    }
}

impl Default for ControllerManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Controller for ControllerManager {
    fn directions(&self) -> &BTreeSet<Direction> {
        &self.directions
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(dirs: &[Direction]) -> BTreeSet<Direction> {
        dirs.iter().copied().collect()
    }

    fn stick(x: f32, y: f32) -> JoystickSnapshot {
        JoystickSnapshot {
            present: true,
            axes: vec![x, y],
            hats: vec![0],
        }
    }

    #[test]
    fn test_keyboard_arrows_and_wasd() {
        let mut input = InputState::default();
        input.key_event(KeyCode::W, true);
        input.key_event(KeyCode::Right, true);
        let mut keyboard = KeyboardController::default();

        keyboard.update(&input);

        assert_eq!(keyboard.directions(), &set(&[Direction::North, Direction::East]));
    }

    #[test]
    fn test_disabled_controller_is_silent() {
        let mut input = InputState::default();
        input.key_event(KeyCode::S, true);
        let mut keyboard = KeyboardController::default();
        keyboard.update(&input);
        assert!(!keyboard.directions().is_empty());

        keyboard.disable();
        keyboard.update(&input);

        assert!(keyboard.directions().is_empty());
    }

    #[test]
    fn test_hat_bits() {
        let mut hat = HatController::default();
        let joystick = JoystickSnapshot {
            present: true,
            axes: vec![],
            hats: vec![HAT_DOWN | HAT_LEFT, HAT_UP],
        };

        hat.update(&joystick);

        assert_eq!(hat.directions(), &set(&[Direction::South, Direction::West]));
    }

    #[test]
    fn test_stick_threshold_and_inverted_y() {
        let mut controller = JoystickController::default();

        controller.update(&stick(0.4, -0.9));
        assert_eq!(controller.directions(), &set(&[Direction::North]));

        controller.update(&stick(-0.6, 0.6));
        assert_eq!(controller.directions(), &set(&[Direction::South, Direction::West]));

        controller.update(&stick(0.5, 0.5));
        assert!(controller.directions().is_empty());
    }

    #[test]
    fn test_absent_joystick() {
        let mut controller = JoystickController::default();
        controller.update(&JoystickSnapshot::absent());
        assert!(controller.directions().is_empty());
    }

    #[test]
    fn test_manager_union() {
        let mut input = InputState::default();
        input.key_event(KeyCode::A, true);
        let joystick = JoystickSnapshot {
            present: true,
            axes: vec![0.0, -1.0],
            hats: vec![HAT_RIGHT],
        };
        let mut manager = ControllerManager::new();

        manager.update(&input, &joystick);

        assert_eq!(
            manager.directions(),
            &set(&[Direction::North, Direction::East, Direction::West])
        );
    }

    #[test]
    fn test_manager_reenables_children() {
        let mut manager = ControllerManager::new();
        manager.keyboard.disable();
        let mut input = InputState::default();
        input.key_event(KeyCode::Up, true);

        manager.update(&input, &JoystickSnapshot::absent());

        assert!(manager.keyboard.is_enabled());
        assert_eq!(manager.directions(), &set(&[Direction::North]));
    }
}
