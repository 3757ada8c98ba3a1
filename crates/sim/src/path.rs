//! Scripted launch-to-landing flight along a cubic Bézier arc.
//!
//! The vehicle leaves its launch pad, climbs along an arc of fixed height and
//! settles on the landing pad after [`FLIGHT_DURATION`] seconds. Evaluation is a
//! pure function of elapsed time so the chase camera and the exhaust emitter can
//! sample it freely.

use engine_core::{orthonormal_right, safe_normalize, Mat4, Transform, Vec3, WORLD_UP};

/// Length of the scripted flight in seconds.
pub const FLIGHT_DURATION: f32 = 12.0;
/// Where the vehicle sits before launch.
pub const LAUNCH_PAD_POSITION: Vec3 = Vec3::new(10.0, -0.5, 45.0);
/// Where the flight ends.
pub const LANDING_PAD_POSITION: Vec3 = Vec3::new(-20.0, -0.5, -30.0);
/// Height of both inner control points above their endpoints.
pub const ARC_HEIGHT: f32 = 40.0;

/// One sample of the flight curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathSample {
    pub position: Vec3,
    /// Unit direction of travel. World up when the tangent vanishes.
    pub direction: Vec3,
    /// Cosmetic 0..1 thrust factor, peaking mid-flight and zero at both ends.
    pub speed_scale: f32,
}

/// Cubic ease with zero slope at both ends.
pub fn smoothstep(u: f32) -> f32 {
    u * u * (3.0 - 2.0 * u)
}

// Written as a weighted sum so t == 0 and t == 1 return the endpoints exactly.
fn lerp(a: Vec3, b: Vec3, t: f32) -> Vec3 {
    a * (1.0 - t) + b * t
}

/// Evaluate the flight curve `elapsed` seconds after launch from `start`.
///
/// Time is clamped to `[0, FLIGHT_DURATION]`, eased with [`smoothstep`] and fed
/// through a de Casteljau construction of the arc `start → landing pad`.
pub fn evaluate(elapsed: f32, start: Vec3) -> PathSample {
    let u = if elapsed.is_nan() {
        0.0
    } else {
        (elapsed / FLIGHT_DURATION).clamp(0.0, 1.0)
    };
    let s = smoothstep(u);

    let lift = WORLD_UP * ARC_HEIGHT;
    let p0 = start;
    let p3 = LANDING_PAD_POSITION;
    let p1 = p0 + lift;
    let p2 = p3 + lift;

    let a = lerp(p0, p1, s);
    let b = lerp(p1, p2, s);
    let c = lerp(p2, p3, s);
    let d = lerp(a, b, s);
    let e = lerp(b, c, s);

    PathSample {
        position: lerp(d, e, s),
        direction: safe_normalize(e - d, WORLD_UP),
        speed_scale: 4.0 * s * (1.0 - s),
    }
}

/// Derived vehicle placement for one frame. Local +Y is the nose.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehiclePose {
    pub position: Vec3,
    pub x_axis: Vec3,
    pub y_axis: Vec3,
    pub z_axis: Vec3,
    pub direction: Vec3,
    pub speed_scale: f32,
}

impl VehiclePose {
    /// Upright and motionless at `position`.
    pub fn resting(position: Vec3) -> Self {
        Self {
            position,
            x_axis: Vec3::X,
            y_axis: Vec3::Y,
            z_axis: Vec3::Z,
            direction: WORLD_UP,
            speed_scale: 0.0,
        }
    }

    /// Nose pointed along the sampled direction of travel.
    pub fn from_sample(sample: &PathSample) -> Self {
        let y_axis = sample.direction;
        let x_axis = orthonormal_right(y_axis, Vec3::X);
        let z_axis = x_axis.cross(y_axis);
        Self {
            position: sample.position,
            x_axis,
            y_axis,
            z_axis,
            direction: sample.direction,
            speed_scale: sample.speed_scale,
        }
    }

    pub fn transform(&self) -> Transform {
        Transform::from_axes(self.position, self.x_axis, self.y_axis, self.z_axis)
    }

    pub fn world_matrix(&self) -> Mat4 {
        Mat4::from_cols(
            self.x_axis.extend(0.0),
            self.y_axis.extend(0.0),
            self.z_axis.extend(0.0),
            self.position.extend(1.0),
        )
    }
}

/// Launch / pause / reset state of the scripted flight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlightAnimation {
    pub active: bool,
    pub playing: bool,
    /// Seconds since launch. Only advances while active and playing.
    pub elapsed: f32,
    pub start_position: Vec3,
}

impl Default for FlightAnimation {
    fn default() -> Self {
        Self::new(LAUNCH_PAD_POSITION)
    }
}

impl FlightAnimation {
    pub fn new(start_position: Vec3) -> Self {
        Self {
            active: false,
            playing: false,
            elapsed: 0.0,
            start_position,
        }
    }

    /// Launch when idle, otherwise toggle pause.
    pub fn launch_or_toggle(&mut self) {
        if !self.active {
            self.active = true;
            self.playing = true;
            self.elapsed = 0.0;
            log::info!("Flight launched");
        } else {
            self.playing = !self.playing;
            log::info!(
                "Flight {} at {:.2}s",
                if self.playing { "resumed" } else { "paused" },
                self.elapsed
            );
        }
    }

    /// Back onto the launch pad.
    pub fn reset(&mut self) {
        self.active = false;
        self.playing = false;
        self.elapsed = 0.0;
        log::info!("Flight reset");
    }

    /// Running and unpaused: the engine is firing.
    pub fn is_thrusting(&self) -> bool {
        self.active && self.playing
    }

    /// Has the scripted flight reached its end point.
    pub fn is_finished(&self) -> bool {
        self.active && self.elapsed >= FLIGHT_DURATION
    }

    /// Advance flight time. Non-positive or non-finite deltas are ignored so
    /// elapsed time never runs backwards.
    pub fn advance(&mut self, dt: f32) {
        if self.is_thrusting() && dt.is_finite() && dt > 0.0 {
            self.elapsed += dt;
        }
    }

    /// Path sample for the current time, or `None` while inactive.
    pub fn sample(&self) -> Option<PathSample> {
        self.active.then(|| evaluate(self.elapsed, self.start_position))
    }

    /// Pose for this frame: on the curve while active, on the pad otherwise.
    pub fn pose(&self) -> VehiclePose {
        match self.sample() {
            Some(sample) => VehiclePose::from_sample(&sample),
            None => VehiclePose::resting(self.start_position),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const START: Vec3 = Vec3::new(10.0, -0.5, 45.0);

    #[test]
    fn non_positive_time_stays_on_start() {
        for t in [0.0, -0.001, -5.0, f32::NEG_INFINITY] {
            assert_eq!(evaluate(t, START).position, START, "t = {}", t);
        }
    }

    #[test]
    fn time_past_duration_freezes_on_landing_pad() {
        for t in [FLIGHT_DURATION, 12.5, 100.0, f32::INFINITY] {
            assert_eq!(evaluate(t, START).position, LANDING_PAD_POSITION, "t = {}", t);
        }
    }

    #[test]
    fn half_time_golden_position() {
        // smoothstep(0.5) == 0.5, so this is the Bézier midpoint:
        // (p0 + 3 p1 + 3 p2 + p3) / 8.
        let sample = evaluate(6.0, START);
        let expected = Vec3::new(-5.0, 29.5, 7.5);
        assert!(
            (sample.position - expected).length() < 1e-4,
            "got {:?}",
            sample.position
        );
        assert!((sample.speed_scale - 1.0).abs() < 1e-6);
        // Tangent at the apex is horizontal.
        assert!(sample.direction.y.abs() < 1e-5);
        assert!((sample.direction.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn evaluation_is_bit_identical_across_calls() {
        for t in [0.3, 2.0, 7.77, 11.9] {
            let a = evaluate(t, START);
            let b = evaluate(t, START);
            assert_eq!(a.position.to_array().map(f32::to_bits), b.position.to_array().map(f32::to_bits));
            assert_eq!(a.direction.to_array().map(f32::to_bits), b.direction.to_array().map(f32::to_bits));
        }
    }

    #[test]
    fn speed_scale_is_zero_at_both_ends() {
        assert_eq!(evaluate(0.0, START).speed_scale, 0.0);
        assert_eq!(evaluate(FLIGHT_DURATION, START).speed_scale, 0.0);
    }

    #[test]
    fn launch_tangent_points_straight_up() {
        let sample = evaluate(0.0, START);
        assert!((sample.direction - Vec3::Y).length() < 1e-6);
        assert!(sample.direction.is_finite());
    }

    #[test]
    fn launch_toggle_and_reset_lifecycle() {
        let mut flight = FlightAnimation::default();
        assert!(!flight.active);
        flight.advance(1.0);
        assert_eq!(flight.elapsed, 0.0);

        flight.launch_or_toggle();
        assert!(flight.is_thrusting());
        flight.advance(0.5);
        assert_eq!(flight.elapsed, 0.5);

        flight.launch_or_toggle();
        assert!(flight.active && !flight.playing);
        flight.advance(0.5);
        assert_eq!(flight.elapsed, 0.5);

        flight.launch_or_toggle();
        flight.advance(-3.0);
        assert_eq!(flight.elapsed, 0.5);

        flight.reset();
        assert_eq!(flight, FlightAnimation::default());
    }

    #[test]
    fn resting_pose_is_upright_on_the_pad() {
        let flight = FlightAnimation::default();
        let pose = flight.pose();
        assert_eq!(pose.position, LAUNCH_PAD_POSITION);
        assert_eq!(pose.world_matrix(), Mat4::from_translation(LAUNCH_PAD_POSITION));
    }

    #[test]
    fn flying_pose_points_nose_along_travel() {
        let mut flight = FlightAnimation::default();
        flight.launch_or_toggle();
        flight.advance(4.0);
        let pose = flight.pose();
        let sample = evaluate(4.0, LAUNCH_PAD_POSITION);
        assert_eq!(pose.position, sample.position);
        assert!((pose.y_axis - sample.direction).length() < 1e-6);
        assert!(pose.x_axis.dot(pose.y_axis).abs() < 1e-5);
        assert!((pose.z_axis.length() - 1.0).abs() < 1e-5);
        let nose = pose.world_matrix().transform_vector3(Vec3::Y);
        assert!((nose - sample.direction).length() < 1e-5);
    }
}
