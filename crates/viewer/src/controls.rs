//! Maps raw input state onto the per-frame control snapshot.

use glam::Vec2;
use input::{Action, InputState};
use sim::{Controls, Movement};

use crate::ui::UiAction;

/// Build this frame's controls from held keys, key edges and any button the UI
/// reported as clicked. `pointer` is the cursor position if it moved this frame.
pub fn controls_from_input(input: &InputState, pointer: Option<Vec2>, clicked: Option<UiAction>) -> Controls {
    let held = |action| input.is_action_held(action);
    let pressed = |action| input.is_action_pressed(action);

    Controls {
        movement: Movement {
            forward: held(Action::MoveForward),
            backward: held(Action::MoveBackward),
            left: held(Action::MoveLeft),
            right: held(Action::MoveRight),
            up: held(Action::MoveUp),
            down: held(Action::MoveDown),
            fast: held(Action::SpeedUp),
            slow: held(Action::SlowDown),
        },
        cycle_camera_mode: pressed(Action::CycleCameraMode) || clicked == Some(UiAction::Camera),
        launch: pressed(Action::LaunchFlight) || clicked == Some(UiAction::Launch),
        reset: pressed(Action::ResetFlight) || clicked == Some(UiAction::Reset),
        toggle_split_screen: pressed(Action::ToggleSplitScreen) || clicked == Some(UiAction::Split),
        switch_viewport: pressed(Action::SwitchViewport),
        pointer,
        camera_look: input.is_camera_look(),
    }
}

/// Controls for the second and later fixed steps of one frame: held state
/// carries over, one-shot actions and pointer motion were already consumed.
pub fn held_only(controls: &Controls) -> Controls {
    Controls {
        movement: controls.movement,
        camera_look: controls.camera_look,
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use input::{ElementState, KeyCode, MouseButton};

    #[test]
    fn held_keys_map_to_movement() {
        let mut input = InputState::new();
        input.process_keyboard(KeyCode::KeyW, ElementState::Pressed);
        input.process_keyboard(KeyCode::KeyQ, ElementState::Pressed);
        input.process_keyboard(KeyCode::ShiftLeft, ElementState::Pressed);

        let controls = controls_from_input(&input, None, None);
        assert!(controls.movement.forward && controls.movement.down && controls.movement.fast);
        assert!(!controls.movement.backward && !controls.movement.up && !controls.movement.slow);
        assert!(!controls.launch);
    }

    #[test]
    fn action_keys_fire_once() {
        let mut input = InputState::new();
        input.process_keyboard(KeyCode::KeyF, ElementState::Pressed);
        input.process_keyboard(KeyCode::KeyV, ElementState::Pressed);
        let controls = controls_from_input(&input, None, None);
        assert!(controls.launch && controls.toggle_split_screen);

        input.end_frame();
        let controls = controls_from_input(&input, None, None);
        assert!(!controls.launch && !controls.toggle_split_screen);
    }

    #[test]
    fn ui_clicks_trigger_the_same_actions() {
        let input = InputState::new();
        assert!(controls_from_input(&input, None, Some(UiAction::Launch)).launch);
        assert!(controls_from_input(&input, None, Some(UiAction::Reset)).reset);
        assert!(controls_from_input(&input, None, Some(UiAction::Camera)).cycle_camera_mode);
        assert!(controls_from_input(&input, None, Some(UiAction::Split)).toggle_split_screen);
    }

    #[test]
    fn pointer_and_look_pass_through() {
        let mut input = InputState::new();
        input.process_mouse_button(MouseButton::Right, ElementState::Pressed);
        let controls = controls_from_input(&input, Some(Vec2::new(3.0, 4.0)), None);
        assert!(controls.camera_look);
        assert_eq!(controls.pointer, Some(Vec2::new(3.0, 4.0)));
    }

    #[test]
    fn held_only_drops_one_shot_actions() {
        let controls = Controls {
            launch: true,
            reset: true,
            pointer: Some(Vec2::ONE),
            camera_look: true,
            movement: Movement {
                left: true,
                ..Default::default()
            },
            ..Default::default()
        };
        let next = held_only(&controls);
        assert!(!next.launch && !next.reset && next.pointer.is_none());
        assert!(next.camera_look && next.movement.left);
    }
}
