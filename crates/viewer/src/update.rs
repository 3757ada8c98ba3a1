//! Per-frame glue: clock, controls, simulation, then rendering.

use glam::Vec2;
use input::MouseButton;
use renderer::{viewport_rects, RenderError};
use sim::FrameOutput;

use crate::controls::{controls_from_input, held_only};
use crate::ui::{self, UiAction, UiStatus};

/// Most fixed steps simulated in one frame; older backlog is dropped.
const MAX_FIXED_STEPS_PER_FRAME: u32 = 8;

impl crate::State {
    /// Advance the simulation for this frame.
    pub(crate) fn update(&mut self) -> FrameOutput {
        self.time.update();

        let pointer = std::mem::take(&mut self.pointer_moved).then(|| self.cursor());
        let clicked = self.clicked_button();
        if let Some(action) = clicked {
            log::debug!("UI button {:?}", action);
        }
        let controls = controls_from_input(&self.input, pointer, clicked);

        let output = match self.time.fixed_timestep_seconds() {
            None => self.frame.advance(self.time.delta_seconds(), &controls),
            Some(step) => {
                let mut pending = controls;
                let mut output = None;
                self.time.limit_backlog(MAX_FIXED_STEPS_PER_FRAME);
                while self.time.should_fixed_update() {
                    output = Some(self.frame.advance(step, &pending));
                    pending = held_only(&pending);
                }
                // No step due yet: still apply this frame's actions and refresh the views.
                output.unwrap_or_else(|| self.frame.advance(0.0, &pending))
            }
        };

        self.input.end_frame();
        self.refresh_title();
        output
    }

    /// Draw the frame. Returns false when rendering can't continue.
    pub(crate) fn render(&mut self, output: &FrameOutput) -> bool {
        let (width, height) = self.renderer.dimensions();
        let buttons = ui::layout_buttons(height as f32);
        let hovered = if self.input.is_camera_look() {
            None
        } else {
            ui::hit_test(&buttons, self.cursor())
        };
        let interactive_viewport = if self.frame.is_split_screen() {
            viewport_rects(width, height, self.frame.viewport_count())
                .get(self.frame.interactive_rig())
                .copied()
        } else {
            None
        };
        let status = UiStatus {
            thrusting: self.frame.flight.is_thrusting(),
            split_screen: self.frame.is_split_screen(),
            interactive_viewport,
        };
        let overlay = ui::build_overlay(Vec2::new(width as f32, height as f32), &buttons, hovered, &status);

        match self.renderer.render(&self.frame.scene, output, &self.meshes, &overlay) {
            Ok(()) => true,
            Err(e) if e.is_fatal() => {
                log::error!("Rendering stopped: {}", e);
                false
            }
            Err(RenderError::Timeout) => {
                log::debug!("Surface timeout, skipping frame");
                true
            }
            Err(e) => {
                log::warn!("Frame skipped: {}", e);
                true
            }
        }
    }

    /// Button under the cursor if the left button went down this frame. Clicks
    /// are ignored while the pointer is steering the camera.
    fn clicked_button(&self) -> Option<UiAction> {
        if self.input.is_camera_look() || !self.input.is_mouse_pressed(MouseButton::Left) {
            return None;
        }
        let (_, height) = self.renderer.dimensions();
        ui::hit_test(&ui::layout_buttons(height as f32), self.cursor())
    }

    /// Publish the status line through the window title when it changes.
    fn refresh_title(&mut self) {
        let line = ui::status_line(&self.frame);
        if line != self.title {
            self.renderer.window.set_title(&line);
            self.title = line;
        }
    }
}
