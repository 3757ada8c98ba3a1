//! Per-frame sequencing of camera rigs, flight and exhaust.
//!
//! [`FrameState::advance`] runs the steps in a fixed order. Exhaust emission and
//! camera resolution both read the vehicle pose computed earlier in the *same*
//! call, so neither lags the vehicle by a frame.

use engine_core::{Mat4, Transform, Vec2, Vec3, ViewBasis};

use crate::camera_rig::{CameraMode, CameraRig, Movement, RigSettings};
use crate::exhaust::{ExhaustState, ParticleInstance, ParticlePool};
use crate::path::FlightAnimation;
use crate::scene::SceneContext;

/// Most viewports shown side by side.
pub const MAX_VIEWPORTS: usize = 2;

/// Everything the user asked for this frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Controls {
    pub movement: Movement,
    pub cycle_camera_mode: bool,
    pub launch: bool,
    pub reset: bool,
    pub toggle_split_screen: bool,
    pub switch_viewport: bool,
    /// Latest absolute cursor position, if the cursor moved.
    pub pointer: Option<Vec2>,
    pub camera_look: bool,
}

/// Final camera for one viewport plus the exhaust billboards facing it.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportView {
    pub eye: Vec3,
    pub basis: ViewBasis,
    pub mode: CameraMode,
    pub interactive: bool,
    pub particles: Vec<ParticleInstance>,
}

impl ViewportView {
    pub fn view_matrix(&self) -> Mat4 {
        self.basis.view_matrix(self.eye)
    }
}

/// Transforms handed to the renderer for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameOutput {
    pub vehicle: Transform,
    pub vehicle_matrix: Mat4,
    /// Cosmetic 0..1 thrust factor from the flight curve.
    pub thrust: f32,
    pub views: Vec<ViewportView>,
}

/// All simulation state owned by the frame loop.
#[derive(Debug)]
pub struct FrameState {
    pub settings: RigSettings,
    pub flight: FlightAnimation,
    rigs: Vec<CameraRig>,
    interactive_rig: usize,
    pub exhaust: ParticlePool,
    pub scene: SceneContext,
}

impl Default for FrameState {
    fn default() -> Self {
        Self::new(RigSettings::default(), ParticlePool::new())
    }
}

impl FrameState {
    pub fn new(settings: RigSettings, exhaust: ParticlePool) -> Self {
        Self {
            settings,
            flight: FlightAnimation::default(),
            rigs: vec![CameraRig::default()],
            interactive_rig: 0,
            exhaust,
            scene: SceneContext::new(),
        }
    }

    pub fn rigs(&self) -> &[CameraRig] {
        &self.rigs
    }

    pub fn viewport_count(&self) -> usize {
        self.rigs.len()
    }

    pub fn interactive_rig(&self) -> usize {
        self.interactive_rig
    }

    pub fn is_split_screen(&self) -> bool {
        self.rigs.len() > 1
    }

    /// Switch between one and two viewports. The new rig starts as a copy of the
    /// first so the second view opens where the user already is.
    pub fn toggle_split_screen(&mut self) {
        if self.is_split_screen() {
            self.rigs.truncate(1);
            self.interactive_rig = 0;
            log::info!("Split-screen off");
        } else if self.rigs.len() < MAX_VIEWPORTS {
            let mut rig = self.rigs[0].clone();
            rig.forget_pointer();
            self.rigs.push(rig);
            log::info!("Split-screen on");
        }
    }

    /// Hand keyboard and pointer control to the next viewport.
    pub fn switch_viewport(&mut self) {
        if self.is_split_screen() {
            self.rigs[self.interactive_rig].forget_pointer();
            self.interactive_rig = (self.interactive_rig + 1) % self.rigs.len();
            log::debug!("Viewport {} is now interactive", self.interactive_rig);
        }
    }

    fn apply_actions(&mut self, controls: &Controls) {
        if controls.toggle_split_screen {
            self.toggle_split_screen();
        }
        if controls.switch_viewport {
            self.switch_viewport();
        }
        if controls.cycle_camera_mode {
            let mode = self.rigs[self.interactive_rig].cycle_mode();
            log::info!("Viewport {} camera: {}", self.interactive_rig, mode.label());
        }
        if controls.launch {
            self.flight.launch_or_toggle();
        }
        if controls.reset {
            self.flight.reset();
        }
    }

    fn exhaust_state(&self) -> ExhaustState {
        if self.flight.is_thrusting() {
            ExhaustState::Firing
        } else if self.flight.active {
            ExhaustState::Coasting
        } else {
            ExhaustState::AtRest
        }
    }

    /// Run one frame of simulation and produce what the renderer needs.
    pub fn advance(&mut self, dt: f32, controls: &Controls) -> FrameOutput {
        self.apply_actions(controls);

        let settings = self.settings;
        let interactive = self.interactive_rig;
        if let Some(pointer) = controls.pointer {
            self.rigs[interactive].pointer_moved(pointer, controls.camera_look, settings.mouse_sensitivity);
        }

        for rig in &mut self.rigs {
            rig.update_basis();
        }
        self.rigs[interactive].apply_movement(&controls.movement, &settings, dt);

        self.flight.advance(dt);
        let pose = self.flight.pose();
        let vehicle_matrix = pose.world_matrix();

        let state = self.exhaust_state();
        self.exhaust.step(dt, &vehicle_matrix, state);

        let views = self
            .rigs
            .iter()
            .enumerate()
            .map(|(i, rig)| {
                let view = rig.resolve(&self.flight, pose.position);
                ViewportView {
                    eye: view.eye,
                    basis: view.basis,
                    mode: rig.mode,
                    interactive: i == interactive,
                    particles: self.exhaust.instances(&view.basis).collect(),
                }
            })
            .collect();

        let vehicle = pose.transform();
        self.scene.attach_vehicle_lights(&vehicle);

        FrameOutput {
            vehicle,
            vehicle_matrix,
            thrust: pose.speed_scale,
            views,
        }
    }
}
