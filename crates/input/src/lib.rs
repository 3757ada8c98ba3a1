//! Input handling for keyboard and mouse.

use glam::Vec2;
use std::collections::HashSet;

/// Everything the viewer can be asked to do from the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    MoveForward,
    MoveBackward,
    MoveLeft,
    MoveRight,
    MoveUp,
    MoveDown,
    SpeedUp,
    SlowDown,
    CycleCameraMode,
    LaunchFlight,
    ResetFlight,
    ToggleSplitScreen,
    SwitchViewport,
    Quit,
}

impl Action {
    /// Physical key bound to this action.
    pub fn key(self) -> KeyCode {
        match self {
            Action::MoveForward => KeyCode::KeyW,
            Action::MoveBackward => KeyCode::KeyS,
            Action::MoveLeft => KeyCode::KeyA,
            Action::MoveRight => KeyCode::KeyD,
            Action::MoveUp => KeyCode::KeyE,
            Action::MoveDown => KeyCode::KeyQ,
            Action::SpeedUp => KeyCode::ShiftLeft,
            Action::SlowDown => KeyCode::ControlLeft,
            Action::CycleCameraMode => KeyCode::KeyC,
            Action::LaunchFlight => KeyCode::KeyF,
            Action::ResetFlight => KeyCode::KeyR,
            Action::ToggleSplitScreen => KeyCode::KeyV,
            Action::SwitchViewport => KeyCode::Tab,
            Action::Quit => KeyCode::Escape,
        }
    }
}

/// Manages input state for the current frame.
#[derive(Debug, Default)]
pub struct InputState {
    /// Keys currently held down.
    keys_held: HashSet<KeyCode>,
    /// Keys pressed this frame.
    keys_pressed: HashSet<KeyCode>,

    /// Mouse buttons currently held.
    mouse_held: HashSet<MouseButton>,
    /// Mouse buttons pressed this frame.
    mouse_pressed: HashSet<MouseButton>,

    /// Mouse position in window coordinates.
    mouse_position: Vec2,

    /// Whether right-click camera look is engaged.
    camera_look: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear per-frame state. Call at the end of each simulated frame.
    pub fn end_frame(&mut self) {
        self.keys_pressed.clear();
        self.mouse_pressed.clear();
    }

    /// Process a keyboard event.
    pub fn process_keyboard(&mut self, key: KeyCode, state: ElementState) {
        match state {
            ElementState::Pressed => {
                // Key repeat arrives as repeated presses; only the first counts as an edge.
                if !self.keys_held.contains(&key) {
                    self.keys_pressed.insert(key);
                }
                self.keys_held.insert(key);
            }
            ElementState::Released => {
                self.keys_held.remove(&key);
            }
        }
    }

    /// Process a mouse button event. Pressing the right button toggles camera look.
    pub fn process_mouse_button(&mut self, button: MouseButton, state: ElementState) {
        match state {
            ElementState::Pressed => {
                if !self.mouse_held.contains(&button) {
                    self.mouse_pressed.insert(button);
                    if button == MouseButton::Right {
                        self.camera_look = !self.camera_look;
                        log::debug!("Camera look {}", if self.camera_look { "on" } else { "off" });
                    }
                }
                self.mouse_held.insert(button);
            }
            ElementState::Released => {
                self.mouse_held.remove(&button);
            }
        }
    }

    /// Process cursor position update.
    pub fn process_cursor_position(&mut self, position: (f64, f64)) {
        self.mouse_position = Vec2::new(position.0 as f32, position.1 as f32);
    }

    // Query methods

    /// Check if a key is currently held.
    pub fn is_key_held(&self, key: KeyCode) -> bool {
        self.keys_held.contains(&key)
    }

    /// Check if a key was pressed this frame.
    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    /// Check if the key bound to an action is held.
    pub fn is_action_held(&self, action: Action) -> bool {
        self.is_key_held(action.key())
    }

    /// Check if the key bound to an action went down this frame.
    pub fn is_action_pressed(&self, action: Action) -> bool {
        self.is_key_pressed(action.key())
    }

    /// Check if a mouse button was pressed this frame.
    pub fn is_mouse_pressed(&self, button: MouseButton) -> bool {
        self.mouse_pressed.contains(&button)
    }

    /// Get the mouse position in window coordinates.
    pub fn mouse_position(&self) -> Vec2 {
        self.mouse_position
    }

    /// Whether pointer motion currently steers the camera.
    pub fn is_camera_look(&self) -> bool {
        self.camera_look
    }

    /// Force camera look on or off (e.g. when focus is lost).
    pub fn set_camera_look(&mut self, active: bool) {
        self.camera_look = active;
    }

    /// Drop all held state. Used when the window loses focus so keys do not stick.
    pub fn release_all(&mut self) {
        self.keys_held.clear();
        self.mouse_held.clear();
    }
}

// Re-export for convenience
pub use winit::event::{ElementState, MouseButton};
pub use winit::keyboard::KeyCode;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_press_is_edge_triggered() {
        let mut input = InputState::new();
        input.process_keyboard(KeyCode::KeyF, ElementState::Pressed);
        assert!(input.is_action_pressed(Action::LaunchFlight));
        input.end_frame();
        // Auto-repeat while held must not re-trigger.
        input.process_keyboard(KeyCode::KeyF, ElementState::Pressed);
        assert!(!input.is_action_pressed(Action::LaunchFlight));
        assert!(input.is_action_held(Action::LaunchFlight));
    }

    #[test]
    fn release_clears_held_state() {
        let mut input = InputState::new();
        input.process_keyboard(KeyCode::KeyW, ElementState::Pressed);
        input.process_keyboard(KeyCode::KeyW, ElementState::Released);
        assert!(!input.is_action_held(Action::MoveForward));
        // A fresh press after release is a new edge.
        input.end_frame();
        input.process_keyboard(KeyCode::KeyW, ElementState::Pressed);
        assert!(input.is_action_pressed(Action::MoveForward));
    }

    #[test]
    fn right_click_toggles_camera_look() {
        let mut input = InputState::new();
        input.process_mouse_button(MouseButton::Right, ElementState::Pressed);
        assert!(input.is_camera_look());
        input.process_mouse_button(MouseButton::Right, ElementState::Released);
        input.process_mouse_button(MouseButton::Right, ElementState::Pressed);
        assert!(!input.is_camera_look());
    }

    #[test]
    fn release_all_drops_held_keys() {
        let mut input = InputState::new();
        input.process_keyboard(KeyCode::KeyE, ElementState::Pressed);
        input.release_all();
        assert!(!input.is_action_held(Action::MoveUp));
    }
}
