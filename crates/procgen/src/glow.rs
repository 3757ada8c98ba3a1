//! Soft radial glow sprite for exhaust particles.

/// RGBA8 image, row-major, tightly packed.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Square glow: a hot white core fading through orange to transparent at the
/// inscribed circle. Color channels are premultiplied by alpha for additive
/// blending.
pub fn generate_glow(size: u32) -> TextureData {
    let size = size.max(2);
    let mut pixels = Vec::with_capacity((size * size * 4) as usize);
    let center = (size - 1) as f32 / 2.0;

    for y in 0..size {
        for x in 0..size {
            let dx = (x as f32 - center) / center;
            let dy = (y as f32 - center) / center;
            let dist = (dx * dx + dy * dy).sqrt().min(1.0);

            let falloff = 1.0 - dist;
            let alpha = falloff * falloff;
            // Core is white, the rim warms to orange.
            let warm = [1.0, 0.55 + 0.45 * falloff, 0.2 + 0.8 * falloff * falloff];

            let to_byte = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
            pixels.extend_from_slice(&[
                to_byte(warm[0] * alpha),
                to_byte(warm[1] * alpha),
                to_byte(warm[2] * alpha),
                to_byte(alpha),
            ]);
        }
    }

    TextureData {
        width: size,
        height: size,
        pixels,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel(tex: &TextureData, x: u32, y: u32) -> [u8; 4] {
        let i = ((y * tex.width + x) * 4) as usize;
        [tex.pixels[i], tex.pixels[i + 1], tex.pixels[i + 2], tex.pixels[i + 3]]
    }

    #[test]
    fn glow_is_bright_at_center_and_clear_at_corners() {
        let tex = generate_glow(65);
        assert_eq!(tex.pixels.len(), 65 * 65 * 4);
        assert_eq!(pixel(&tex, 32, 32), [255, 255, 255, 255]);
        assert_eq!(pixel(&tex, 0, 0)[3], 0);
        assert_eq!(pixel(&tex, 64, 32)[3], 0);
    }

    #[test]
    fn alpha_falls_off_monotonically() {
        let tex = generate_glow(33);
        let row: Vec<u8> = (16..33).map(|x| pixel(&tex, x, 16)[3]).collect();
        assert!(row.windows(2).all(|w| w[0] >= w[1]));
    }
}
