//! Terrain generation using noise functions.
//!
//! A single square heightfield centred on the origin. Heights come from fractal
//! Perlin noise above a base level, and circular sites (the pads) are pressed
//! flat to that base level with a smooth rim so the pads sit on level ground.
//!
//! All noise is derived from `config.seed`, so the same seed always produces the
//! same terrain.

use glam::{Vec2, Vec3};
use noise::{NoiseFn, Perlin};

use crate::mesh::GeneratedMesh;

/// Derive a deterministic u32 noise seed from a world seed and an offset.
#[inline]
fn deterministic_noise_seed(seed: u64, offset: u64) -> u32 {
    ((seed.wrapping_add(offset))
        .wrapping_mul(0x9e3779b97f4a7c15_u64)
        .wrapping_add(offset.wrapping_mul(0x6c078965_u64))
        >> 32) as u32
}

/// A circle on the XZ plane that is kept at base height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatSite {
    pub center: Vec2,
    pub radius: f32,
    /// Width of the ring over which terrain eases back to full height.
    pub blend: f32,
}

impl FlatSite {
    pub fn new(center: Vec3, radius: f32, blend: f32) -> Self {
        Self {
            center: Vec2::new(center.x, center.z),
            radius,
            blend,
        }
    }

    /// 0 inside the site, 1 beyond the blend ring, smooth in between.
    fn influence(&self, x: f32, z: f32) -> f32 {
        let d = Vec2::new(x, z).distance(self.center);
        if d <= self.radius {
            0.0
        } else if self.blend <= 0.0 || d >= self.radius + self.blend {
            1.0
        } else {
            let t = (d - self.radius) / self.blend;
            t * t * (3.0 - 2.0 * t)
        }
    }
}

/// Configuration for terrain generation.
#[derive(Debug, Clone)]
pub struct TerrainConfig {
    /// Side length of the square in world units.
    pub size: f32,
    /// Number of vertices per side.
    pub resolution: u32,
    /// Maximum height above `base_height`.
    pub height_scale: f32,
    /// Noise frequency (lower = smoother).
    pub frequency: f64,
    /// Number of octaves for fractal noise.
    pub octaves: u32,
    /// Lacunarity (frequency multiplier per octave).
    pub lacunarity: f64,
    /// Persistence (amplitude multiplier per octave).
    pub persistence: f64,
    pub seed: u64,
    /// Lowest terrain level; flat sites sit exactly here.
    pub base_height: f32,
    pub flat_sites: Vec<FlatSite>,
    pub low_color: [f32; 4],
    pub high_color: [f32; 4],
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            size: 240.0,
            resolution: 97,
            height_scale: 12.0,
            frequency: 0.015,
            octaves: 4,
            lacunarity: 2.0,
            persistence: 0.5,
            seed: 0,
            base_height: -1.0,
            flat_sites: Vec::new(),
            low_color: [0.42, 0.38, 0.32, 1.0],
            high_color: [0.62, 0.6, 0.55, 1.0],
        }
    }
}

/// Generated terrain data.
#[derive(Debug)]
pub struct TerrainData {
    pub mesh: GeneratedMesh,
    pub heightmap: Vec<f32>,
    pub config: TerrainConfig,
}

impl TerrainData {
    /// Generate terrain from configuration. Resolution is raised to at least 2.
    pub fn generate(mut config: TerrainConfig) -> Self {
        config.resolution = config.resolution.max(2);
        let perlin = Perlin::new(deterministic_noise_seed(config.seed, 0));

        let res = config.resolution as usize;
        let step = config.size / (config.resolution - 1) as f32;
        let half = config.size / 2.0;

        let mut heightmap = Vec::with_capacity(res * res);
        let mut mesh = GeneratedMesh::new();
        for z in 0..res {
            for x in 0..res {
                let world_x = x as f32 * step - half;
                let world_z = z as f32 * step - half;

                let noise = Self::fractal_noise(&perlin, world_x as f64, world_z as f64, &config) as f32;
                let flatten = config
                    .flat_sites
                    .iter()
                    .map(|site| site.influence(world_x, world_z))
                    .fold(1.0_f32, f32::min);
                let height = config.base_height + noise * config.height_scale * flatten;
                heightmap.push(height);

                let color = lerp_color(config.low_color, config.high_color, noise * flatten);
                mesh.push_vertex(Vec3::new(world_x, height, world_z), Vec3::Y, color);
            }
        }

        for z in 0..(res - 1) {
            for x in 0..(res - 1) {
                let top_left = (z * res + x) as u32;
                let top_right = top_left + 1;
                let bottom_left = ((z + 1) * res + x) as u32;
                let bottom_right = bottom_left + 1;

                mesh.push_triangle(top_left, bottom_left, top_right);
                mesh.push_triangle(top_right, bottom_left, bottom_right);
            }
        }

        Self::calculate_normals(&mut mesh, res);
        log::info!(
            "Generated terrain: {}x{} vertices, {} flat sites",
            res,
            res,
            config.flat_sites.len()
        );

        Self {
            mesh,
            heightmap,
            config,
        }
    }

    /// Sample height at a world position, clamped to the terrain's edge.
    #[cfg(test)]
    fn sample_height(&self, x: f32, z: f32) -> f32 {
        let res = self.config.resolution as usize;
        let half_size = self.config.size / 2.0;
        let step = self.config.size / (self.config.resolution - 1) as f32;

        let gx = ((x + half_size) / step).max(0.0);
        let gz = ((z + half_size) / step).max(0.0);

        let x0 = (gx.floor() as usize).min(res - 2);
        let z0 = (gz.floor() as usize).min(res - 2);

        let fx = (gx - x0 as f32).clamp(0.0, 1.0);
        let fz = (gz - z0 as f32).clamp(0.0, 1.0);

        let h00 = self.heightmap[z0 * res + x0];
        let h10 = self.heightmap[z0 * res + x0 + 1];
        let h01 = self.heightmap[(z0 + 1) * res + x0];
        let h11 = self.heightmap[(z0 + 1) * res + x0 + 1];

        // Interpolate within the same triangle the mesh uses for this cell.
        if fx + fz <= 1.0 {
            h00 + fx * (h10 - h00) + fz * (h01 - h00)
        } else {
            h11 + (1.0 - fx) * (h01 - h11) + (1.0 - fz) * (h10 - h11)
        }
    }

    /// Noise in `[0, 1]`.
    fn fractal_noise(perlin: &Perlin, x: f64, z: f64, config: &TerrainConfig) -> f64 {
        let mut value = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = config.frequency;
        let mut max_value = 0.0;

        for _ in 0..config.octaves.max(1) {
            value += perlin.get([x * frequency, z * frequency]) * amplitude;
            max_value += amplitude;

            amplitude *= config.persistence;
            frequency *= config.lacunarity;
        }

        ((value / max_value + 1.0) * 0.5).clamp(0.0, 1.0)
    }

    fn calculate_normals(mesh: &mut GeneratedMesh, resolution: usize) {
        let mut normals = vec![Vec3::ZERO; mesh.positions.len()];

        for z in 0..(resolution - 1) {
            for x in 0..(resolution - 1) {
                let i0 = z * resolution + x;
                let i1 = i0 + 1;
                let i2 = (z + 1) * resolution + x;
                let i3 = i2 + 1;

                let [v0, v1, v2, v3] = [i0, i1, i2, i3].map(|i| mesh.positions[i]);

                let n1 = (v2 - v0).cross(v1 - v0).normalize_or_zero();
                normals[i0] += n1;
                normals[i2] += n1;
                normals[i1] += n1;

                let n2 = (v2 - v1).cross(v3 - v1).normalize_or_zero();
                normals[i1] += n2;
                normals[i2] += n2;
                normals[i3] += n2;
            }
        }

        for (normal, sum) in mesh.normals.iter_mut().zip(normals) {
            *normal = sum.try_normalize().unwrap_or(Vec3::Y);
        }
    }
}

fn lerp_color(a: [f32; 4], b: [f32; 4], t: f32) -> [f32; 4] {
    let t = t.clamp(0.0, 1.0);
    std::array::from_fn(|i| a[i] + (b[i] - a[i]) * t)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small(seed: u64) -> TerrainConfig {
        TerrainConfig {
            size: 64.0,
            resolution: 33,
            seed,
            ..Default::default()
        }
    }

    #[test]
    fn terrain_deterministic_same_seed() {
        let a = TerrainData::generate(small(98765));
        let b = TerrainData::generate(small(98765));
        assert_eq!(a.heightmap, b.heightmap);
    }

    #[test]
    fn terrain_different_seed_different_heights() {
        let a = TerrainData::generate(small(11111));
        let b = TerrainData::generate(small(22222));
        assert_ne!(a.heightmap, b.heightmap);
    }

    #[test]
    fn mesh_is_valid_and_faces_up() {
        let terrain = TerrainData::generate(small(5));
        assert!(terrain.mesh.is_valid());
        assert_eq!(terrain.mesh.triangle_count(), 32 * 32 * 2);
        assert!(terrain.mesh.normals.iter().all(|n| n.y > 0.0));
    }

    #[test]
    fn normals_follow_a_sloped_plane() {
        let res = 3;
        let mut mesh = GeneratedMesh::new();
        for z in 0..res {
            for x in 0..res {
                let p = Vec3::new(x as f32, 0.5 * x as f32, z as f32);
                mesh.push_vertex(p, Vec3::ZERO, [1.0; 4]);
            }
        }
        TerrainData::calculate_normals(&mut mesh, res);

        let expected = Vec3::new(-0.5, 1.0, 0.0).normalize();
        for (i, n) in mesh.normals.iter().enumerate() {
            assert!((*n - expected).length() < 1e-5, "vertex {}: {:?}", i, n);
        }
    }

    #[test]
    fn heights_stay_within_range() {
        let config = small(3);
        let terrain = TerrainData::generate(config.clone());
        let top = config.base_height + config.height_scale;
        assert!(terrain
            .heightmap
            .iter()
            .all(|&h| h >= config.base_height && h <= top));
    }

    #[test]
    fn flat_sites_are_level_with_base() {
        let site = FlatSite::new(Vec3::new(10.0, 0.0, -12.0), 5.0, 3.0);
        let config = TerrainConfig {
            flat_sites: vec![site],
            ..small(42)
        };
        let terrain = TerrainData::generate(config.clone());
        for (p, &h) in terrain.mesh.positions.iter().zip(&terrain.heightmap) {
            if Vec2::new(p.x, p.z).distance(site.center) <= site.radius {
                assert_eq!(h, config.base_height);
            }
        }
        assert_eq!(terrain.sample_height(10.0, -12.0), config.base_height);
    }

    #[test]
    fn sample_height_matches_grid_vertices() {
        let terrain = TerrainData::generate(small(9));
        for &i in &[0usize, 17, 33 * 5 + 4, 33 * 33 - 1] {
            let p = terrain.mesh.positions[i];
            assert!((terrain.sample_height(p.x, p.z) - p.y).abs() < 1e-4, "vertex {}", i);
        }
    }
}
