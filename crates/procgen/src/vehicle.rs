//! Procedural rocket mesh for the lander.
//!
//! The base of the body sits at the local origin with the nose along +Y, so the
//! vehicle's world transform places its base on the pad and points the nose
//! along the direction of travel.

use glam::{Quat, Vec3};

use crate::mesh::GeneratedMesh;

/// Shape and colors of the generated rocket.
#[derive(Debug, Clone)]
pub struct VehicleConfig {
    pub body_radius: f32,
    pub body_height: f32,
    pub nose_height: f32,
    /// Radial segments for the body and nose.
    pub segments: u32,
    pub fin_count: u32,
    /// How far a fin reaches out from the body.
    pub fin_span: f32,
    pub fin_height: f32,
    pub body_color: [f32; 4],
    pub nose_color: [f32; 4],
    pub fin_color: [f32; 4],
}

impl Default for VehicleConfig {
    fn default() -> Self {
        Self {
            body_radius: 0.5,
            body_height: 3.0,
            nose_height: 1.0,
            segments: 24,
            fin_count: 4,
            fin_span: 0.45,
            fin_height: 1.2,
            body_color: [0.85, 0.86, 0.9, 1.0],
            nose_color: [0.8, 0.15, 0.1, 1.0],
            fin_color: [0.25, 0.25, 0.3, 1.0],
        }
    }
}

impl VehicleConfig {
    /// Height of the nose tip above the base.
    pub fn total_height(&self) -> f32 {
        self.body_height + self.nose_height
    }
}

/// Build the rocket: base plate, body, nose cone and double-sided fins.
pub fn generate_vehicle(config: &VehicleConfig) -> GeneratedMesh {
    let mut mesh = GeneratedMesh::new();
    let r = config.body_radius;

    mesh.add_disk(0.0, r, config.segments, false, config.body_color, config.body_color);
    mesh.add_band(0.0, r, config.body_height, r, config.segments, config.body_color);
    mesh.add_band(
        config.body_height,
        r,
        config.total_height(),
        0.0,
        config.segments,
        config.nose_color,
    );

    for i in 0..config.fin_count {
        let angle = i as f32 / config.fin_count as f32 * std::f32::consts::TAU;
        add_fin(&mut mesh, config, Quat::from_rotation_y(angle));
    }

    log::debug!(
        "Generated vehicle mesh: {} vertices, {} triangles",
        mesh.vertex_count(),
        mesh.triangle_count()
    );
    mesh
}

// Fin profile lies in the local XY plane on the +X side of the body.
fn add_fin(mesh: &mut GeneratedMesh, config: &VehicleConfig, rotation: Quat) {
    let r = config.body_radius;
    let tip = r + config.fin_span;
    let profile = [
        Vec3::new(r, 0.0, 0.0),
        Vec3::new(tip, 0.0, 0.0),
        Vec3::new(tip - config.fin_span * 0.4, config.fin_height * 0.75, 0.0),
        Vec3::new(r, config.fin_height, 0.0),
    ]
    .map(|p| rotation * p);

    let [a, b, c, d] = profile;
    mesh.add_flat_quad(a, b, c, d, config.fin_color);
    mesh.add_flat_quad(a, d, c, b, config.fin_color);
}
