//! Camera rigs: orientation angles, free-fly movement, and the chase / ground
//! modes that track the vehicle.

use engine_core::{orthonormal_right, safe_normalize, Vec2, Vec3, ViewBasis, WORLD_UP};
use std::f32::consts::FRAC_PI_2;

use crate::path::{self, FlightAnimation};

/// How far behind the vehicle the chase camera trails.
pub const CHASE_FOLLOW_DISTANCE: f32 = 15.0;
/// Height of the chase camera above its trailing point.
pub const CHASE_HEIGHT: f32 = 5.0;
/// Fixed spectator spot for the ground camera.
pub const GROUND_CAMERA_POSITION: Vec3 = Vec3::new(30.0, 1.5, 60.0);
/// Where a fresh rig starts, and what it looks at.
pub const DEFAULT_EYE_POSITION: Vec3 = Vec3::new(45.0, 15.0, 85.0);
pub const DEFAULT_LOOK_TARGET: Vec3 = Vec3::new(0.0, 5.0, 15.0);

/// Behaviour of a rig when resolving the final view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CameraMode {
    /// Manual fly-through.
    #[default]
    Free,
    /// Trails the vehicle while it is flying.
    Chase,
    /// Pinned to the ground, tracking the vehicle.
    Ground,
}

impl CameraMode {
    /// Free → Chase → Ground → Free.
    pub fn next(self) -> Self {
        match self {
            CameraMode::Free => CameraMode::Chase,
            CameraMode::Chase => CameraMode::Ground,
            CameraMode::Ground => CameraMode::Free,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CameraMode::Free => "free",
            CameraMode::Chase => "chase",
            CameraMode::Ground => "ground",
        }
    }
}

/// Right-handed basis for the given angles.
///
/// `forward` comes from spherical coordinates (azimuth about +Y measured from
/// +Z, elevation above the horizon); `right = forward × up` and
/// `up = right × forward`. At ±π/2 elevation the cross product vanishes and the
/// azimuth's horizontal right vector is used instead.
pub fn compute_basis(azimuth: f32, elevation: f32) -> ViewBasis {
    let (sin_az, cos_az) = azimuth.sin_cos();
    let (sin_el, cos_el) = elevation.sin_cos();
    let forward = safe_normalize(Vec3::new(cos_el * sin_az, sin_el, cos_el * cos_az), Vec3::Z);
    let right = orthonormal_right(forward, Vec3::new(-cos_az, 0.0, sin_az));
    let up = safe_normalize(right.cross(forward), WORLD_UP);
    ViewBasis { forward, right, up }
}

/// Final eye and orientation for one viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedView {
    pub eye: Vec3,
    pub basis: ViewBasis,
}

/// Turn a rig's mode into a concrete view.
///
/// `Free` passes the rig through untouched. `Chase` falls back to `Free` while
/// the flight is inactive; otherwise it sits behind and above the vehicle along
/// its direction of travel. `Ground` always watches the vehicle from a fixed
/// spot. Coincident eye and target keep the rig's own basis.
pub fn resolve_camera_mode(
    mode: CameraMode,
    rig_position: Vec3,
    basis: ViewBasis,
    animation: &FlightAnimation,
    vehicle_position: Vec3,
) -> ResolvedView {
    match mode {
        CameraMode::Free => ResolvedView {
            eye: rig_position,
            basis,
        },
        CameraMode::Chase if !animation.active => ResolvedView {
            eye: rig_position,
            basis,
        },
        CameraMode::Chase => {
            let travel = path::evaluate(animation.elapsed, animation.start_position).direction;
            let eye = vehicle_position - travel * CHASE_FOLLOW_DISTANCE + WORLD_UP * CHASE_HEIGHT;
            ResolvedView {
                eye,
                basis: ViewBasis::look_at(eye, vehicle_position, basis),
            }
        }
        CameraMode::Ground => ResolvedView {
            eye: GROUND_CAMERA_POSITION,
            basis: ViewBasis::look_at(GROUND_CAMERA_POSITION, vehicle_position, basis),
        },
    }
}

/// Held movement keys for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Movement {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub fast: bool,
    pub slow: bool,
}

impl Movement {
    /// Unnormalized displacement direction in the given basis.
    pub fn direction(&self, basis: &ViewBasis) -> Vec3 {
        let axis = |pos: bool, neg: bool| (pos as i8 - neg as i8) as f32;
        basis.forward * axis(self.forward, self.backward)
            + basis.right * axis(self.right, self.left)
            + basis.up * axis(self.up, self.down)
    }

    /// Combined effect of the speed modifiers.
    pub fn speed_multiplier(&self, fast: f32, slow: f32) -> f32 {
        let mut m = 1.0;
        if self.fast {
            m *= fast;
        }
        if self.slow {
            m *= slow;
        }
        m
    }
}

/// Free-fly speeds and pointer sensitivity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigSettings {
    /// Units per second.
    pub movement_speed: f32,
    pub fast_multiplier: f32,
    pub slow_multiplier: f32,
    /// Radians per pixel of pointer motion.
    pub mouse_sensitivity: f32,
}

impl Default for RigSettings {
    fn default() -> Self {
        Self {
            movement_speed: 5.0,
            fast_multiplier: 2.0,
            slow_multiplier: 0.5,
            mouse_sensitivity: 0.01,
        }
    }
}

/// One independently controllable camera.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraRig {
    azimuth: f32,
    elevation: f32,
    pub eye_position: Vec3,
    pub mode: CameraMode,
    /// Last cursor position seen, `None` until the first motion event.
    last_pointer: Option<Vec2>,
    basis: ViewBasis,
}

impl Default for CameraRig {
    fn default() -> Self {
        Self::looking_at(DEFAULT_EYE_POSITION, DEFAULT_LOOK_TARGET)
    }
}

impl CameraRig {
    pub fn new(eye_position: Vec3, azimuth: f32, elevation: f32) -> Self {
        let elevation = clamp_elevation(elevation);
        Self {
            azimuth,
            elevation,
            eye_position,
            mode: CameraMode::Free,
            last_pointer: None,
            basis: compute_basis(azimuth, elevation),
        }
    }

    /// Rig at `eye` with angles chosen to face `target`.
    pub fn looking_at(eye: Vec3, target: Vec3) -> Self {
        let dir = safe_normalize(target - eye, Vec3::Z);
        let azimuth = dir.x.atan2(dir.z);
        let elevation = dir.y.clamp(-1.0, 1.0).asin();
        Self::new(eye, azimuth, elevation)
    }

    pub fn azimuth(&self) -> f32 {
        self.azimuth
    }

    pub fn elevation(&self) -> f32 {
        self.elevation
    }

    /// Basis as of the last [`CameraRig::update_basis`].
    pub fn basis(&self) -> ViewBasis {
        self.basis
    }

    /// Rotate by the given deltas; elevation is clamped afterwards.
    pub fn rotate(&mut self, d_azimuth: f32, d_elevation: f32) {
        self.azimuth += d_azimuth;
        self.elevation = clamp_elevation(self.elevation + d_elevation);
    }

    /// Feed an absolute cursor position. The delta from the previous position turns
    /// the camera only while `look_active`; the position is remembered either way so
    /// engaging look never jumps.
    pub fn pointer_moved(&mut self, position: Vec2, look_active: bool, sensitivity: f32) {
        if let (true, Some(last)) = (look_active, self.last_pointer) {
            let delta = position - last;
            self.rotate(-delta.x * sensitivity, -delta.y * sensitivity);
        }
        self.last_pointer = Some(position);
    }

    /// Forget the last cursor position, so the next motion event only primes it.
    pub fn forget_pointer(&mut self) {
        self.last_pointer = None;
    }

    /// Recompute the basis from the current angles.
    pub fn update_basis(&mut self) -> ViewBasis {
        self.basis = compute_basis(self.azimuth, self.elevation);
        self.basis
    }

    /// Move the eye along the rig's basis. Only free rigs move; chase and ground
    /// eyes are derived from the vehicle.
    pub fn apply_movement(&mut self, movement: &Movement, settings: &RigSettings, dt: f32) {
        if self.mode != CameraMode::Free {
            return;
        }
        let speed = settings.movement_speed
            * movement.speed_multiplier(settings.fast_multiplier, settings.slow_multiplier);
        self.eye_position += movement.direction(&self.basis) * speed * dt;
    }

    pub fn cycle_mode(&mut self) -> CameraMode {
        self.mode = self.mode.next();
        self.mode
    }

    /// Final view for this frame.
    pub fn resolve(&self, animation: &FlightAnimation, vehicle_position: Vec3) -> ResolvedView {
        resolve_camera_mode(self.mode, self.eye_position, self.basis, animation, vehicle_position)
    }
}

fn clamp_elevation(elevation: f32) -> f32 {
    if elevation.is_nan() {
        0.0
    } else {
        elevation.clamp(-FRAC_PI_2, FRAC_PI_2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::LAUNCH_PAD_POSITION;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn basis_is_orthonormal_inside_open_range() {
        let steps = 24;
        for i in 0..=steps {
            let azimuth = -std::f32::consts::PI + i as f32 * std::f32::consts::TAU / steps as f32;
            for j in 1..steps {
                let elevation = -FRAC_PI_2 + j as f32 * std::f32::consts::PI / steps as f32;
                let b = compute_basis(azimuth, elevation);
                assert!(b.is_orthonormal(1e-4), "az {} el {}: {:?}", azimuth, elevation, b);
            }
        }
    }

    #[test]
    fn basis_is_right_handed() {
        let b = compute_basis(0.7, 0.3);
        assert!(approx(b.right.cross(b.up), -b.forward));
    }

    #[test]
    fn basis_survives_vertical_elevation() {
        for elevation in [FRAC_PI_2, -FRAC_PI_2] {
            let b = compute_basis(1.2, elevation);
            assert!(b.forward.is_finite() && b.right.is_finite() && b.up.is_finite());
            assert!(b.is_orthonormal(1e-4), "{:?}", b);
        }
    }

    #[test]
    fn looking_up_level_forward_is_plus_z() {
        let b = compute_basis(0.0, 0.0);
        assert!(approx(b.forward, Vec3::Z));
        assert!(approx(b.right, -Vec3::X));
        assert!(approx(b.up, Vec3::Y));
    }

    #[test]
    fn elevation_clamped_after_rotation() {
        let mut rig = CameraRig::new(Vec3::ZERO, 0.0, 0.0);
        rig.rotate(0.0, 10.0);
        assert_eq!(rig.elevation(), FRAC_PI_2);
        rig.rotate(0.0, -25.0);
        assert_eq!(rig.elevation(), -FRAC_PI_2);
    }

    #[test]
    fn pointer_only_turns_while_look_active() {
        let mut rig = CameraRig::new(Vec3::ZERO, 0.0, 0.0);
        rig.pointer_moved(Vec2::new(100.0, 100.0), true, 0.01);
        // First event only primes the last position.
        assert_eq!(rig.azimuth(), 0.0);
        rig.pointer_moved(Vec2::new(150.0, 100.0), false, 0.01);
        assert_eq!(rig.azimuth(), 0.0);
        rig.pointer_moved(Vec2::new(160.0, 90.0), true, 0.01);
        assert!((rig.azimuth() + 0.1).abs() < 1e-6);
        assert!((rig.elevation() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn looking_at_faces_target() {
        let mut rig = CameraRig::looking_at(Vec3::new(10.0, 5.0, 0.0), Vec3::new(0.0, 5.0, 0.0));
        let b = rig.update_basis();
        assert!(approx(b.forward, -Vec3::X));
    }

    #[test]
    fn free_movement_uses_basis_and_modifiers() {
        let settings = RigSettings::default();
        let mut rig = CameraRig::new(Vec3::ZERO, 0.0, 0.0);
        rig.update_basis();
        let movement = Movement { forward: true, fast: true, ..Default::default() };
        rig.apply_movement(&movement, &settings, 0.5);
        assert!(approx(rig.eye_position, Vec3::new(0.0, 0.0, 5.0)));

        let movement = Movement { right: true, up: true, slow: true, ..Default::default() };
        rig.apply_movement(&movement, &settings, 1.0);
        assert!(approx(rig.eye_position, Vec3::new(-2.5, 2.5, 5.0)));
    }

    #[test]
    fn non_free_rigs_ignore_movement() {
        let settings = RigSettings::default();
        for mode in [CameraMode::Chase, CameraMode::Ground] {
            let mut rig = CameraRig::new(Vec3::ONE, 0.0, 0.0);
            rig.mode = mode;
            rig.apply_movement(&Movement { forward: true, ..Default::default() }, &settings, 1.0);
            assert_eq!(rig.eye_position, Vec3::ONE);
        }
    }

    #[test]
    fn mode_cycles_through_all_three() {
        let mut rig = CameraRig::default();
        assert_eq!(rig.mode, CameraMode::Free);
        assert_eq!(rig.cycle_mode(), CameraMode::Chase);
        assert_eq!(rig.cycle_mode(), CameraMode::Ground);
        assert_eq!(rig.cycle_mode(), CameraMode::Free);
    }

    #[test]
    fn free_mode_passes_rig_through() {
        let pos = Vec3::new(3.0, 4.0, 5.0);
        let basis = compute_basis(0.4, -0.2);
        let mut flight = FlightAnimation::default();
        for vehicle in [Vec3::ZERO, Vec3::new(-50.0, 20.0, 3.0)] {
            for active in [false, true] {
                flight.active = active;
                let view = resolve_camera_mode(CameraMode::Free, pos, basis, &flight, vehicle);
                assert_eq!(view.eye, pos);
                assert_eq!(view.basis, basis);
            }
        }
    }

    #[test]
    fn inactive_chase_behaves_like_free() {
        let pos = Vec3::new(-7.0, 2.0, 1.0);
        let basis = compute_basis(2.0, 0.5);
        let flight = FlightAnimation::default();
        let vehicle = Vec3::new(10.0, 0.0, 10.0);
        let chase = resolve_camera_mode(CameraMode::Chase, pos, basis, &flight, vehicle);
        let free = resolve_camera_mode(CameraMode::Free, pos, basis, &flight, vehicle);
        assert_eq!(chase, free);
    }

    #[test]
    fn active_chase_trails_and_faces_vehicle() {
        let mut flight = FlightAnimation::default();
        flight.launch_or_toggle();
        flight.advance(6.0);
        let sample = path::evaluate(6.0, LAUNCH_PAD_POSITION);
        let view = resolve_camera_mode(
            CameraMode::Chase,
            Vec3::ZERO,
            ViewBasis::default(),
            &flight,
            sample.position,
        );
        let expected_eye =
            sample.position - sample.direction * CHASE_FOLLOW_DISTANCE + Vec3::Y * CHASE_HEIGHT;
        assert!(approx(view.eye, expected_eye));
        let to_vehicle = (sample.position - view.eye).normalize();
        assert!(approx(view.basis.forward, to_vehicle));
        assert!(view.basis.is_orthonormal(1e-4));
    }

    #[test]
    fn ground_mode_watches_vehicle_even_when_idle() {
        let flight = FlightAnimation::default();
        let view = resolve_camera_mode(
            CameraMode::Ground,
            Vec3::ZERO,
            ViewBasis::default(),
            &flight,
            LAUNCH_PAD_POSITION,
        );
        assert_eq!(view.eye, GROUND_CAMERA_POSITION);
        let to_vehicle = (LAUNCH_PAD_POSITION - GROUND_CAMERA_POSITION).normalize();
        assert!(approx(view.basis.forward, to_vehicle));
    }

    #[test]
    fn ground_mode_with_vehicle_on_eye_keeps_basis() {
        let basis = compute_basis(0.3, 0.1);
        let view = resolve_camera_mode(
            CameraMode::Ground,
            Vec3::ZERO,
            basis,
            &FlightAnimation::default(),
            GROUND_CAMERA_POSITION,
        );
        assert_eq!(view.basis, basis);
    }
}
