//! GPU layout of the scene lights.

use bytemuck::{Pod, Zeroable};
use sim::{SceneContext, MAX_POINT_LIGHTS};

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct PointLightRaw {
    /// xyz = world position, w = range.
    pub position: [f32; 4],
    pub color: [f32; 4],
}

/// Light uniform shared by every viewport in a frame.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct LightUniform {
    /// Direction the sun's light travels, w unused.
    pub sun_direction: [f32; 4],
    pub sun_color: [f32; 4],
    pub ambient: [f32; 4],
    pub point_lights: [PointLightRaw; MAX_POINT_LIGHTS],
    /// x = number of valid entries in `point_lights`.
    pub count: [u32; 4],
}

impl Default for LightUniform {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl LightUniform {
    /// Pack the scene lights. Lights past [`MAX_POINT_LIGHTS`] are dropped.
    pub fn from_scene(scene: &SceneContext) -> Self {
        let mut uniform = Self {
            sun_direction: scene.sun.direction.extend(0.0).to_array(),
            sun_color: scene.sun.color.extend(1.0).to_array(),
            ambient: scene.ambient.extend(1.0).to_array(),
            ..Self::default()
        };
        if scene.point_lights.len() > MAX_POINT_LIGHTS {
            log::warn!(
                "{} point lights in scene, only {} are rendered",
                scene.point_lights.len(),
                MAX_POINT_LIGHTS
            );
        }
        let mut count = 0;
        for (slot, light) in uniform.point_lights.iter_mut().zip(&scene.point_lights) {
            *slot = PointLightRaw {
                position: light.position.extend(light.range).to_array(),
                color: light.color.extend(1.0).to_array(),
            };
            count += 1;
        }
        uniform.count[0] = count;
        uniform
    }
}
