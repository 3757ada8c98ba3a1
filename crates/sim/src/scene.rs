//! Lights and static objects for one frame, handed to the renderer by value.

use engine_core::{Transform, Vec3};

use crate::path::{LANDING_PAD_POSITION, LAUNCH_PAD_POSITION};

/// Maximum point lights the lit pipeline consumes.
pub const MAX_POINT_LIGHTS: usize = 4;

/// Height of a pad's deck below the vehicle's resting point.
pub const PAD_THICKNESS: f32 = 0.5;
pub const PAD_RADIUS: f32 = 4.0;
/// Terrain grid is centred on the origin and extends this far each way.
pub const TERRAIN_HALF_EXTENT: f32 = 120.0;
pub const TERRAIN_BASE_HEIGHT: f32 = -1.0;

/// Sun-like light with parallel rays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    /// Direction the light travels (towards the scene), unit length.
    pub direction: Vec3,
    pub color: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub color: Vec3,
    /// Distance at which the light has faded out.
    pub range: f32,
}

/// Which static mesh an object uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneObjectKind {
    Terrain,
    LaunchPad,
    LandingPad,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaticObject {
    pub kind: SceneObjectKind,
    pub transform: Transform,
    /// Tint multiplied with the mesh's vertex colors.
    pub color: [f32; 4],
}

/// Lights mounted on the vehicle, in vehicle-local space.
const VEHICLE_LIGHTS: [(Vec3, Vec3); 3] = [
    (Vec3::new(0.9, 0.6, 0.0), Vec3::new(1.0, 0.2, 0.2)),
    (Vec3::new(-0.9, 0.6, 0.0), Vec3::new(0.2, 1.0, 0.3)),
    (Vec3::new(0.0, 4.3, 0.0), Vec3::new(0.9, 0.9, 1.0)),
];
const VEHICLE_LIGHT_RANGE: f32 = 12.0;

/// Everything the lit pass needs besides the meshes themselves.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneContext {
    pub sun: DirectionalLight,
    pub ambient: Vec3,
    pub point_lights: Vec<PointLight>,
    pub objects: Vec<StaticObject>,
}

impl Default for SceneContext {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneContext {
    /// Terrain plus both pads, lit by a low sun. Vehicle lights start on the launch pad.
    pub fn new() -> Self {
        let pad = |kind, at: Vec3, color| StaticObject {
            kind,
            transform: Transform::from_position(at - Vec3::Y * PAD_THICKNESS),
            color,
        };
        let mut scene = Self {
            sun: DirectionalLight {
                direction: Vec3::new(-0.4, -1.0, -0.3).normalize(),
                color: Vec3::new(1.0, 0.95, 0.85),
            },
            ambient: Vec3::splat(0.12),
            point_lights: Vec::with_capacity(VEHICLE_LIGHTS.len()),
            objects: vec![
                StaticObject {
                    kind: SceneObjectKind::Terrain,
                    transform: Transform::default(),
                    color: [1.0, 1.0, 1.0, 1.0],
                },
                pad(SceneObjectKind::LaunchPad, LAUNCH_PAD_POSITION, [1.0, 1.0, 1.0, 1.0]),
                pad(SceneObjectKind::LandingPad, LANDING_PAD_POSITION, [1.0, 0.85, 0.7, 1.0]),
            ],
        };
        scene.attach_vehicle_lights(&Transform::from_position(LAUNCH_PAD_POSITION));
        scene
    }

    /// Move the vehicle-mounted lights with the vehicle.
    pub fn attach_vehicle_lights(&mut self, vehicle: &Transform) {
        self.point_lights.clear();
        self.point_lights.extend(VEHICLE_LIGHTS.iter().map(|&(offset, color)| PointLight {
            position: vehicle.transform_point(offset),
            color,
            range: VEHICLE_LIGHT_RANGE,
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_scene_has_terrain_and_both_pads() {
        let scene = SceneContext::new();
        let kinds: Vec<_> = scene.objects.iter().map(|o| o.kind).collect();
        assert_eq!(
            kinds,
            vec![SceneObjectKind::Terrain, SceneObjectKind::LaunchPad, SceneObjectKind::LandingPad]
        );
        assert!(scene.point_lights.len() <= MAX_POINT_LIGHTS);
        assert!((scene.sun.direction.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn vehicle_lights_follow_vehicle() {
        let mut scene = SceneContext::new();
        let moved = Transform::from_position(Vec3::new(0.0, 30.0, 0.0));
        scene.attach_vehicle_lights(&moved);
        assert_eq!(scene.point_lights.len(), VEHICLE_LIGHTS.len());
        assert!((scene.point_lights[2].position - Vec3::new(0.0, 34.3, 0.0)).length() < 1e-5);
    }
}
