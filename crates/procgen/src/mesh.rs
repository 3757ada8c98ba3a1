//! CPU-side mesh data produced by the generators, uploaded by the renderer.

use glam::Vec3;

/// Indexed triangle list with per-vertex normals and colors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeneratedMesh {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub colors: Vec<[f32; 4]>,
    pub indices: Vec<u32>,
}

impl GeneratedMesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Append a vertex and return its index.
    pub fn push_vertex(&mut self, position: Vec3, normal: Vec3, color: [f32; 4]) -> u32 {
        let index = self.positions.len() as u32;
        self.positions.push(position);
        self.normals.push(normal);
        self.colors.push(color);
        index
    }

    pub fn push_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.indices.extend_from_slice(&[a, b, c]);
    }

    /// Flat-shaded quad `a b c d` in counter-clockwise order.
    pub fn add_flat_quad(&mut self, a: Vec3, b: Vec3, c: Vec3, d: Vec3, color: [f32; 4]) {
        let normal = (b - a).cross(c - a).normalize_or_zero();
        let i = self.push_vertex(a, normal, color);
        self.push_vertex(b, normal, color);
        self.push_vertex(c, normal, color);
        self.push_vertex(d, normal, color);
        self.indices.extend_from_slice(&[i, i + 1, i + 2, i, i + 2, i + 3]);
    }

    /// Smooth-shaded band around the Y axis from radius `r0` at `y0` to `r1` at
    /// `y1`. A zero top radius closes it into a cone.
    pub fn add_band(&mut self, y0: f32, r0: f32, y1: f32, r1: f32, segments: u32, color: [f32; 4]) {
        let segments = segments.max(3);
        let base = self.positions.len() as u32;
        for i in 0..segments {
            let dir = ring_direction(i, segments);
            let normal = (dir * (y1 - y0) + Vec3::Y * (r0 - r1)).normalize_or_zero();
            self.push_vertex(dir * r0 + Vec3::Y * y0, normal, color);
            self.push_vertex(dir * r1 + Vec3::Y * y1, normal, color);
        }
        for i in 0..segments {
            let j = (i + 1) % segments;
            let (b0, t0) = (base + 2 * i, base + 2 * i + 1);
            let (b1, t1) = (base + 2 * j, base + 2 * j + 1);
            self.push_triangle(b0, b1, t1);
            if r1 > 0.0 {
                self.push_triangle(b0, t1, t0);
            }
        }
    }

    /// Flat disk at height `y`, facing up or down, shaded from `center_color` to
    /// `rim_color`.
    pub fn add_disk(
        &mut self,
        y: f32,
        radius: f32,
        segments: u32,
        facing_up: bool,
        center_color: [f32; 4],
        rim_color: [f32; 4],
    ) {
        let segments = segments.max(3);
        let normal = if facing_up { Vec3::Y } else { -Vec3::Y };
        let center = self.push_vertex(Vec3::Y * y, normal, center_color);
        for i in 0..segments {
            self.push_vertex(ring_direction(i, segments) * radius + Vec3::Y * y, normal, rim_color);
        }
        for i in 0..segments {
            let a = center + 1 + i;
            let b = center + 1 + (i + 1) % segments;
            if facing_up {
                self.push_triangle(center, a, b);
            } else {
                self.push_triangle(center, b, a);
            }
        }
    }

    /// Smallest box containing every vertex, or `None` when empty.
    #[cfg(test)]
    pub(crate) fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let first = *self.positions.first()?;
        Some(
            self.positions
                .iter()
                .fold((first, first), |(lo, hi), &p| (lo.min(p), hi.max(p))),
        )
    }

    /// Attribute arrays agree in length, indices are in range and form whole
    /// triangles, and normals are unit length.
    pub fn is_valid(&self) -> bool {
        let n = self.positions.len();
        self.normals.len() == n
            && self.colors.len() == n
            && self.indices.len() % 3 == 0
            && self.indices.iter().all(|&i| (i as usize) < n)
            && self.normals.iter().all(|v| (v.length() - 1.0).abs() < 1e-3)
            && self.positions.iter().all(|p| p.is_finite())
    }
}

/// Unit horizontal direction of segment `i`; segment 0 points along +Z and
/// the angle grows towards +X.
fn ring_direction(i: u32, segments: u32) -> Vec3 {
    let angle = i as f32 / segments as f32 * std::f32::consts::TAU;
    Vec3::new(angle.sin(), 0.0, angle.cos())
}
