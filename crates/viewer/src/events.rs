//! Window event handling for the viewer state.

use input::Action;
use winit::event::WindowEvent;
use winit::keyboard::PhysicalKey;

impl crate::State {
    /// Handle a window event. Returns true if the app should exit.
    pub(crate) fn handle_window_event(&mut self, event: WindowEvent) -> bool {
        match event {
            WindowEvent::CloseRequested => {
                self.running = false;
                true
            }
            WindowEvent::Resized(size) => {
                if size.width == 0 || size.height == 0 {
                    if !self.minimized {
                        log::info!("Window minimised, pausing");
                    }
                    self.minimized = true;
                } else {
                    if self.minimized {
                        log::info!("Window restored to {}x{}", size.width, size.height);
                        // Time spent minimised is neither simulated nor banked as fixed steps.
                        self.time.reset_clock();
                    }
                    self.minimized = false;
                    self.renderer.resize(size);
                    self.renderer.window.request_redraw();
                }
                false
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key) = event.physical_key {
                    self.input.process_keyboard(key, event.state);
                    if key == Action::Quit.key() && event.state.is_pressed() {
                        self.running = false;
                        return true;
                    }
                }
                false
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let was_looking = self.input.is_camera_look();
                self.input.process_mouse_button(button, state);
                if was_looking != self.input.is_camera_look() {
                    self.sync_cursor_visibility();
                }
                false
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.input.process_cursor_position((position.x, position.y));
                self.pointer_moved = true;
                false
            }
            WindowEvent::Focused(false) => {
                self.input.release_all();
                if self.input.is_camera_look() {
                    self.input.set_camera_look(false);
                    self.sync_cursor_visibility();
                }
                false
            }
            WindowEvent::RedrawRequested => {
                if !self.minimized {
                    let output = self.update();
                    if !self.render(&output) {
                        self.running = false;
                        return true;
                    }
                    self.renderer.window.request_redraw();
                }
                false
            }
            _ => false,
        }
    }

    fn sync_cursor_visibility(&self) {
        self.renderer.window.set_cursor_visible(!self.input.is_camera_look());
    }
}
