//! GPU meshes and the fixed set the viewer draws.

use crate::vertex::{vertices_from_generated, Vertex};
use procgen::GeneratedMesh;
use sim::SceneObjectKind;
use wgpu::util::DeviceExt;

/// A GPU mesh with vertex and index buffers.
pub struct Mesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub num_indices: u32,
}

impl Mesh {
    /// Create a mesh from vertex and index data.
    pub fn new(device: &wgpu::Device, vertices: &[Vertex], indices: &[u32], label: &str) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Vertex Buffer", label)),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Index Buffer", label)),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            vertex_buffer,
            index_buffer,
            num_indices: indices.len() as u32,
        }
    }

    /// Upload procedurally generated geometry.
    pub fn from_generated(device: &wgpu::Device, mesh: &GeneratedMesh, label: &str) -> Self {
        if !mesh.is_valid() {
            log::warn!("Mesh '{}' has out-of-range indices or mismatched attributes", label);
        }
        Self::new(device, &vertices_from_generated(mesh), &mesh.indices, label)
    }

    /// Unit billboard quad (XY plane, facing +Z). Particle matrices supply the
    /// camera-facing rotation and the size.
    pub fn billboard_quad(device: &wgpu::Device, size: f32) -> Self {
        let (vertices, indices) = billboard_quad_data(size);
        Self::new(device, &vertices, &indices, "Billboard")
    }
}

fn billboard_quad_data(size: f32) -> ([Vertex; 4], [u32; 6]) {
    let half = size / 2.0;
    let vertices = [
        Vertex::new([-half, -half, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0]),
        Vertex::new([ half, -half, 0.0], [0.0, 0.0, 1.0], [1.0, 1.0]),
        Vertex::new([ half,  half, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0]),
        Vertex::new([-half,  half, 0.0], [0.0, 0.0, 1.0], [0.0, 0.0]),
    ];
    (vertices, [0, 1, 2, 2, 3, 0])
}

/// CPU geometry for everything in the scene, ready to upload.
pub struct SceneGeometry {
    pub terrain: GeneratedMesh,
    pub pad: GeneratedMesh,
    pub vehicle: GeneratedMesh,
}

/// Every mesh the frame draws. Both pads share one mesh.
pub struct SceneMeshes {
    pub terrain: Mesh,
    pub pad: Mesh,
    pub vehicle: Mesh,
    pub particle_quad: Mesh,
}

impl SceneMeshes {
    pub fn upload(device: &wgpu::Device, geometry: &SceneGeometry) -> Self {
        let meshes = Self {
            terrain: Mesh::from_generated(device, &geometry.terrain, "Terrain"),
            pad: Mesh::from_generated(device, &geometry.pad, "Pad"),
            vehicle: Mesh::from_generated(device, &geometry.vehicle, "Vehicle"),
            particle_quad: Mesh::billboard_quad(device, 1.0),
        };
        log::info!(
            "Uploaded scene meshes: terrain {} tris, pad {} tris, vehicle {} tris",
            geometry.terrain.triangle_count(),
            geometry.pad.triangle_count(),
            geometry.vehicle.triangle_count()
        );
        meshes
    }

    pub fn mesh_for(&self, kind: SceneObjectKind) -> &Mesh {
        match kind {
            SceneObjectKind::Terrain => &self.terrain,
            SceneObjectKind::LaunchPad | SceneObjectKind::LandingPad => &self.pad,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn billboard_quad_is_centred_and_front_facing() {
        let (vertices, indices) = billboard_quad_data(1.0);
        let centre = vertices.iter().fold([0.0f32; 3], |acc, v| {
            [acc[0] + v.position[0], acc[1] + v.position[1], acc[2] + v.position[2]]
        });
        assert_eq!(centre, [0.0, 0.0, 0.0]);
        assert_eq!(vertices[2].position, [0.5, 0.5, 0.0]);

        for tri in indices.chunks(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| glam::Vec3::from(vertices[i as usize].position));
            assert!((b - a).cross(c - a).z > 0.0);
        }
    }
}
