//! Procedural ground texture used when brush accents need a canvas but no
//! custom texture was supplied
//!
//! The texture tiles seamlessly: noise is sampled on a torus mapping of the
//! texture coordinates.

use glam::Vec4;
use noise::{NoiseFn, Perlin};

use crate::pixel_grid::PixelGrid;

/// Seed for the fallback texture; fixed so repeated runs look the same
pub const GROUND_SEED: u32 = 123;

// Palette, 0-255 RGB
const DARK_GREEN: [f32; 3] = [40.0, 70.0, 30.0];
const MED_GREEN: [f32; 3] = [60.0, 110.0, 45.0];
const LIGHT_GREEN: [f32; 3] = [80.0, 140.0, 60.0];
const DRY_GREEN: [f32; 3] = [100.0, 150.0, 50.0];

/// Generate a grassy ground texture
///
/// # Arguments
/// * `size` - Side length, usually the heightmap resolution
/// * `seed` - Perlin seed
///
/// # Returns
/// * `PixelGrid` - Opaque `size` x `size` texture
pub fn ground_texture(size: u32, seed: u32) -> PixelGrid {
    let perlin = Perlin::new(seed);

    PixelGrid::from_fn(size, size, |x, y| {
        let (nx, ny) = torus_coords(x, y, size);

        // fBm: persistence 0.5, lacunarity 2.0
        let mut noise_value = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = 1.0;
        for _ in 0..4 {
            noise_value += amplitude * perlin.get([nx * frequency, ny * frequency, 5.0]);
            amplitude *= 0.5;
            frequency *= 2.0;
        }
        let n = ((noise_value + 1.0) / 2.0) as f32;

        let blade = ((perlin.get([nx * 16.0, ny * 16.0, 15.0]) + 1.0) / 2.0) as f32;

        let color = if n < 0.25 {
            blend_colors(&DARK_GREEN, &MED_GREEN, n / 0.25)
        } else if n < 0.6 {
            blend_colors(&MED_GREEN, &LIGHT_GREEN, (n - 0.25) / 0.35)
        } else {
            blend_colors(&LIGHT_GREEN, &DRY_GREEN, (n - 0.6) / 0.4)
        };

        let shade = 0.85 + blade * 0.3;
        Vec4::new(
            (color[0] * shade).clamp(0.0, 255.0) / 255.0,
            (color[1] * shade).clamp(0.0, 255.0) / 255.0,
            (color[2] * shade).clamp(0.0, 255.0) / 255.0,
            1.0,
        )
    })
}

/// Map texture coordinates onto a torus so noise wraps in both directions
fn torus_coords(x: u32, y: u32, size: u32) -> (f64, f64) {
    use std::f64::consts::PI;

    let u = x as f64 / size as f64;
    let v = y as f64 / size as f64;

    let angle_u = u * 2.0 * PI;
    let angle_v = v * 2.0 * PI;

    let nx = angle_u.cos() + angle_v.cos() * 0.5;
    let ny = angle_u.sin() + angle_v.sin() * 0.5;

    (nx, ny)
}

/// Blend two RGB colors, `t` clamped to [0, 1]
fn blend_colors(color1: &[f32; 3], color2: &[f32; 3], t: f32) -> [f32; 3] {
    let t = t.clamp(0.0, 1.0);
    [
        color1[0] * (1.0 - t) + color2[0] * t,
        color1[1] * (1.0 - t) + color2[1] * t,
        color1[2] * (1.0 - t) + color2[2] * t,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ground_texture_is_green_and_opaque() {
        let texture = ground_texture(32, GROUND_SEED);
        assert_eq!(texture.width(), 32);
        assert_eq!(texture.height(), 32);

        for pixel in texture.pixels() {
            assert_eq!(pixel.w, 1.0);
            assert!(pixel.y > pixel.x, "Green channel should be higher than red");
            assert!(pixel.y > pixel.z, "Green channel should be higher than blue");
        }
    }

    #[test]
    fn test_ground_texture_has_variation() {
        let texture = ground_texture(32, GROUND_SEED);
        let first = texture.pixels()[0];
        assert!(
            texture.pixels().iter().any(|p| *p != first),
            "Texture should have color variation"
        );
    }

    #[test]
    fn test_blend_colors() {
        let black = [0.0, 0.0, 0.0];
        let white = [255.0, 255.0, 255.0];

        assert_eq!(blend_colors(&black, &white, 0.5), [127.5, 127.5, 127.5]);
        assert_eq!(blend_colors(&black, &white, -1.0), black);
        assert_eq!(blend_colors(&black, &white, 2.0), white);
    }
}
