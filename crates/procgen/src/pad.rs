//! Launch and landing pad meshes: a short cylinder whose deck is at `thickness`.

use crate::mesh::GeneratedMesh;

#[derive(Debug, Clone)]
pub struct PadConfig {
    pub radius: f32,
    pub thickness: f32,
    pub segments: u32,
    pub deck_color: [f32; 4],
    /// Tint at the center of the deck, fading to `deck_color` at the rim.
    pub marker_color: [f32; 4],
    pub side_color: [f32; 4],
}

impl Default for PadConfig {
    fn default() -> Self {
        Self {
            radius: 4.0,
            thickness: 0.5,
            segments: 32,
            deck_color: [0.6, 0.6, 0.62, 1.0],
            marker_color: [0.95, 0.8, 0.2, 1.0],
            side_color: [0.35, 0.35, 0.38, 1.0],
        }
    }
}

/// The pad spans `y = 0` (footing) to `y = thickness` (deck).
pub fn generate_pad(config: &PadConfig) -> GeneratedMesh {
    let mut mesh = GeneratedMesh::new();
    mesh.add_disk(
        config.thickness,
        config.radius,
        config.segments,
        true,
        config.marker_color,
        config.deck_color,
    );
    mesh.add_band(
        0.0,
        config.radius,
        config.thickness,
        config.radius,
        config.segments,
        config.side_color,
    );
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deck_sits_at_thickness() {
        let config = PadConfig::default();
        let mesh = generate_pad(&config);
        assert!(mesh.is_valid());
        let (lo, hi) = mesh.bounds().unwrap();
        assert_eq!(lo.y, 0.0);
        assert_eq!(hi.y, config.thickness);
        assert!((hi.x - config.radius).abs() < 1e-5);
    }
}
