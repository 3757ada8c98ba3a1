//! Immediate-mode button bar and window-title status.
//!
//! Buttons are laid out in pixel space every frame, hit-tested against the
//! cursor and drawn as flat quads through the overlay pipeline.

use glam::Vec2;
use renderer::{OverlayBuilder, OverlayVertex, ViewportRect};
use sim::{FrameState, FLIGHT_DURATION};

const BUTTON_WIDTH: f32 = 96.0;
const BUTTON_HEIGHT: f32 = 32.0;
const BUTTON_GAP: f32 = 8.0;
const MARGIN: f32 = 16.0;
const HIGHLIGHT_THICKNESS: f32 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiAction {
    Launch,
    Reset,
    Camera,
    Split,
}

impl UiAction {
    pub const ALL: [UiAction; 4] = [UiAction::Launch, UiAction::Reset, UiAction::Camera, UiAction::Split];

    fn base_color(self) -> [f32; 3] {
        match self {
            UiAction::Launch => [0.2, 0.55, 0.25],
            UiAction::Reset => [0.6, 0.22, 0.2],
            UiAction::Camera => [0.2, 0.35, 0.65],
            UiAction::Split => [0.45, 0.3, 0.6],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Button {
    pub action: UiAction,
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Button {
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.x && p.x < self.x + self.w && p.y >= self.y && p.y < self.y + self.h
    }
}

/// Row of buttons along the bottom-left corner of the window.
pub fn layout_buttons(screen_height: f32) -> Vec<Button> {
    let y = (screen_height - MARGIN - BUTTON_HEIGHT).max(0.0);
    UiAction::ALL
        .iter()
        .enumerate()
        .map(|(i, &action)| Button {
            action,
            x: MARGIN + i as f32 * (BUTTON_WIDTH + BUTTON_GAP),
            y,
            w: BUTTON_WIDTH,
            h: BUTTON_HEIGHT,
        })
        .collect()
}

pub fn hit_test(buttons: &[Button], cursor: Vec2) -> Option<UiAction> {
    buttons.iter().find(|b| b.contains(cursor)).map(|b| b.action)
}

/// What the overlay reflects besides hover.
#[derive(Debug, Clone, Copy, Default)]
pub struct UiStatus {
    pub thrusting: bool,
    pub split_screen: bool,
    /// Outline drawn around the viewport that receives input, in split-screen.
    pub interactive_viewport: Option<ViewportRect>,
}

impl UiStatus {
    fn is_active(&self, action: UiAction) -> bool {
        match action {
            UiAction::Launch => self.thrusting,
            UiAction::Split => self.split_screen,
            UiAction::Reset | UiAction::Camera => false,
        }
    }
}

pub fn build_overlay(
    screen: Vec2,
    buttons: &[Button],
    hovered: Option<UiAction>,
    status: &UiStatus,
) -> Vec<OverlayVertex> {
    let mut builder = OverlayBuilder::new(screen.x, screen.y);

    if let Some(r) = status.interactive_viewport {
        builder.add_frame(
            r.x as f32,
            r.y as f32,
            r.width as f32,
            r.height as f32,
            HIGHLIGHT_THICKNESS,
            [1.0, 0.85, 0.3, 0.8],
        );
    }

    for button in buttons {
        let [r, g, b] = button.action.base_color();
        let lift = if hovered == Some(button.action) { 0.2 } else { 0.0 };
        builder.add_rect(button.x, button.y, button.w, button.h, [r + lift, g + lift, b + lift, 0.85]);
        if status.is_active(button.action) {
            builder.add_frame(button.x, button.y, button.w, button.h, 2.0, [1.0, 1.0, 1.0, 0.9]);
        }
    }

    builder.finish()
}

/// One-line status for the window title.
pub fn status_line(state: &FrameState) -> String {
    let flight = &state.flight;
    let phase = if !flight.active {
        "on pad".to_string()
    } else if flight.is_finished() {
        "landed".to_string()
    } else if flight.playing {
        format!("flying {:.0}/{:.0}s", flight.elapsed, FLIGHT_DURATION)
    } else {
        format!("paused {:.0}/{:.0}s", flight.elapsed, FLIGHT_DURATION)
    };

    let cameras: Vec<String> = state
        .rigs()
        .iter()
        .enumerate()
        .map(|(i, rig)| {
            let marker = if state.is_split_screen() && i == state.interactive_rig() { "*" } else { "" };
            format!("{}{}", rig.mode.label(), marker)
        })
        .collect();

    format!("Lander | {} | camera {}", phase, cameras.join(" / "))
}
