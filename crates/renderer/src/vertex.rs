//! Vertex types and layouts for rendering.

use bytemuck::{Pod, Zeroable};
use glam::Mat4;

/// Standard vertex with position, normal, UV coordinates, and color.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coords: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub fn new(position: [f32; 3], normal: [f32; 3], tex_coords: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            tex_coords,
            color: [1.0, 1.0, 1.0, 1.0],
        }
    }

    pub fn with_color(position: [f32; 3], normal: [f32; 3], tex_coords: [f32; 2], color: [f32; 4]) -> Self {
        Self {
            position,
            normal,
            tex_coords,
            color,
        }
    }

    const ATTRIBUTES: [wgpu::VertexAttribute; 4] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2, 3 => Float32x4];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Convert generated CPU mesh data into GPU vertices.
pub fn vertices_from_generated(mesh: &procgen::GeneratedMesh) -> Vec<Vertex> {
    mesh.positions
        .iter()
        .zip(&mesh.normals)
        .zip(&mesh.colors)
        .map(|((p, n), c)| Vertex::with_color(p.to_array(), n.to_array(), [0.0, 0.0], *c))
        .collect()
}

/// Instance data for instanced rendering.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct InstanceData {
    /// Model matrix (4x4), column major.
    pub model: [[f32; 4]; 4],
    /// Color tint, multiplied with the vertex color.
    pub color: [f32; 4],
}

impl InstanceData {
    pub fn new(model: [[f32; 4]; 4], color: [f32; 4]) -> Self {
        Self { model, color }
    }

    pub fn from_matrix(model: Mat4, color: [f32; 4]) -> Self {
        Self::new(model.to_cols_array_2d(), color)
    }

    /// Model columns at locations 4..=7, color at 8 (after the four vertex attributes).
    const ATTRIBUTES: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
        4 => Float32x4,
        5 => Float32x4,
        6 => Float32x4,
        7 => Float32x4,
        8 => Float32x4
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<InstanceData>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

impl Default for InstanceData {
    fn default() -> Self {
        Self::from_matrix(Mat4::IDENTITY, [1.0, 1.0, 1.0, 1.0])
    }
}

/// Vertex for screen-space UI overlay. Drawn as a plain triangle list.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct OverlayVertex {
    /// NDC position (x, y) in -1..1
    pub position: [f32; 2],
    /// RGBA color
    pub color: [f32; 4],
}

impl OverlayVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x4];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<OverlayVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Builds overlay geometry in pixel coordinates.
pub struct OverlayBuilder {
    pub vertices: Vec<OverlayVertex>,
    screen_w: f32,
    screen_h: f32,
}

impl OverlayBuilder {
    pub fn new(screen_w: f32, screen_h: f32) -> Self {
        Self {
            vertices: Vec::new(),
            screen_w: screen_w.max(1.0),
            screen_h: screen_h.max(1.0),
        }
    }

    /// Convert pixel coords (origin top-left) to NDC.
    fn px_to_ndc(&self, px: f32, py: f32) -> [f32; 2] {
        [(px / self.screen_w) * 2.0 - 1.0, 1.0 - (py / self.screen_h) * 2.0]
    }

    /// Add a solid-color rectangle. Coordinates in pixels.
    pub fn add_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: [f32; 4]) {
        let tl = self.px_to_ndc(x, y);
        let br = self.px_to_ndc(x + w, y + h);
        let corner = |position| OverlayVertex { position, color };
        let (tr, bl) = ([br[0], tl[1]], [tl[0], br[1]]);
        self.vertices
            .extend([corner(tl), corner(bl), corner(br), corner(tl), corner(br), corner(tr)]);
    }

    /// Rectangle outline of the given thickness, drawn inside the bounds.
    pub fn add_frame(&mut self, x: f32, y: f32, w: f32, h: f32, thickness: f32, color: [f32; 4]) {
        let t = thickness.min(w / 2.0).min(h / 2.0);
        self.add_rect(x, y, w, t, color);
        self.add_rect(x, y + h - t, w, t, color);
        self.add_rect(x, y + t, t, h - 2.0 * t, color);
        self.add_rect(x + w - t, y + t, t, h - 2.0 * t, color);
    }

    pub fn finish(self) -> Vec<OverlayVertex> {
        self.vertices
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn layouts_match_struct_sizes() {
        assert_eq!(std::mem::size_of::<Vertex>(), 48);
        assert_eq!(std::mem::size_of::<InstanceData>(), 80);
        assert_eq!(std::mem::size_of::<OverlayVertex>(), 24);
        assert_eq!(Vertex::layout().array_stride, 48);
        assert_eq!(InstanceData::layout().attributes.last().map(|a| a.offset), Some(64));
    }

    #[test]
    fn overlay_rect_covers_full_screen() {
        let mut builder = OverlayBuilder::new(800.0, 600.0);
        builder.add_rect(0.0, 0.0, 800.0, 600.0, [1.0; 4]);
        let verts = builder.finish();
        assert_eq!(verts.len(), 6);
        assert_eq!(verts[0].position, [-1.0, 1.0]);
        assert_eq!(verts[2].position, [1.0, -1.0]);
    }

    #[test]
    fn overlay_rect_is_counter_clockwise() {
        let mut builder = OverlayBuilder::new(100.0, 100.0);
        builder.add_rect(10.0, 10.0, 20.0, 20.0, [1.0; 4]);
        for tri in builder.vertices.chunks(3) {
            let [a, b, c] = [tri[0].position, tri[1].position, tri[2].position];
            let area = (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0]);
            assert!(area > 0.0);
        }
    }

    #[test]
    fn generated_mesh_converts_per_vertex() {
        let mut mesh = procgen::GeneratedMesh::new();
        mesh.add_flat_quad(Vec3::ZERO, Vec3::X, Vec3::new(1.0, 1.0, 0.0), Vec3::Y, [0.5, 0.25, 1.0, 1.0]);
        let verts = vertices_from_generated(&mesh);
        assert_eq!(verts.len(), 4);
        assert_eq!(verts[1].position, [1.0, 0.0, 0.0]);
        assert_eq!(verts[2].color, [0.5, 0.25, 1.0, 1.0]);
        assert_eq!(verts[0].normal, [0.0, 0.0, 1.0]);
    }
}
