use glam::{IVec2, Vec4};

use crate::error::{GenError, Result};
use crate::pixel_grid::PixelGrid;

/// Weight of the stamp color when blending; 1.0 replaces the target outright
pub const BLEND_FACTOR: f32 = 1.0;

/// Side length a stamp needs to cover a brush of `radius`
pub fn stamp_size(radius: u32) -> u64 {
    2 * radius as u64 + 1
}

/// Linearly interpolate between two colors
///
/// Written as `a * (1 - t) + b * t` so that `t == 1.0` yields `b` exactly.
fn blend(a: Vec4, b: Vec4, t: f32) -> Vec4 {
    a * (1.0 - t) + b * t
}

/// Composite `stamp` into a copy of `target` inside a circle
///
/// # Arguments
/// * `target` - Texture to paint on; left untouched
/// * `stamp` - At least `2 * radius + 1` pixels on each side
/// * `center` - Target pixel under the stamp's center, may lie outside the target
/// * `radius` - Brush radius in pixels
///
/// # Returns
/// * `Result<PixelGrid>` - The composited texture, or `InvalidDimension` for an
///   undersized stamp
pub fn composite(
    target: &PixelGrid,
    stamp: &PixelGrid,
    center: IVec2,
    radius: u32,
) -> Result<PixelGrid> {
    let mut result = target.clone();
    composite_into(&mut result, stamp, center, radius)?;
    Ok(result)
}

/// Same as [`composite`], but paints straight into a texture the caller owns
///
/// Every offset `(dx, dy)` with `dx² + dy² <= radius²` reads the stamp at
/// `(dx + radius, dy + radius)` and writes the blend to `center + (dx, dy)`.
/// Writes that fall outside the target are dropped.
pub fn composite_into(
    target: &mut PixelGrid,
    stamp: &PixelGrid,
    center: IVec2,
    radius: u32,
) -> Result<()> {
    let needed = stamp_size(radius);
    if (stamp.width() as u64) < needed || (stamp.height() as u64) < needed {
        return Err(GenError::InvalidDimension(format!(
            "a brush of radius {} needs a {}x{} stamp, got {}x{}",
            radius,
            needed,
            needed,
            stamp.width(),
            stamp.height()
        )));
    }

    // Local coordinates never exceed 2 * radius, inside the stamp by the check above
    paint_circle(target, center, radius, |lx, ly| {
        stamp.get(lx as u32, ly as u32).unwrap_or_default()
    });
    Ok(())
}

/// Paint a stamp of any size over a circle, stretching it to the brush
///
/// Local coordinate `l` in `[0, 2r]` reads stamp pixel `floor(l * w / (2r + 1))`,
/// the same nearest-neighbor mapping the square resampler uses, so the result
/// matches [`composite_into`] with a stamp resampled to `2r + 1`. The stamp is
/// never resized, so the cost depends only on the part of the circle that
/// lands on the target.
pub fn composite_stretched_into(
    target: &mut PixelGrid,
    stamp: &PixelGrid,
    center: IVec2,
    radius: u32,
) -> Result<()> {
    stamp.ensure_non_empty("brush stamp")?;

    let span = stamp_size(radius) as u128;
    let (width, height) = (stamp.width() as u128, stamp.height() as u128);
    paint_circle(target, center, radius, |lx, ly| {
        let sx = (lx as u128 * width / span) as u32;
        let sy = (ly as u128 * height / span) as u32;
        stamp.get(sx, sy).unwrap_or_default()
    });
    Ok(())
}

/// Blend `sample(local_x, local_y)` into every target pixel of the circle
///
/// Only the circle's bounding box clamped to the target is visited.
fn paint_circle(
    target: &mut PixelGrid,
    center: IVec2,
    radius: u32,
    sample: impl Fn(u64, u64) -> Vec4,
) {
    if target.width() == 0 || target.height() == 0 {
        return;
    }
    let r = radius as i64;
    let (cx, cy) = (center.x as i64, center.y as i64);

    // Bounding box of the circle, clipped to the target
    let min_x = (cx - r).max(0);
    let max_x = (cx + r).min(target.width() as i64 - 1);
    let min_y = (cy - r).max(0);
    let max_y = (cy + r).min(target.height() as i64 - 1);

    for ty in min_y..=max_y {
        for tx in min_x..=max_x {
            let (dx, dy) = (tx - cx, ty - cy);

            // Squares of offsets up to 2^32 need more than 64 bits
            let distance_squared = (dx as i128).pow(2) + (dy as i128).pow(2);
            if distance_squared > (r as i128).pow(2) {
                continue;
            }

            let Some(current) = target.get(tx as u32, ty as u32) else {
                continue;
            };
            let color = sample((dx + r) as u64, (dy + r) as u64);
            target.set(tx as u32, ty as u32, blend(current, color, BLEND_FACTOR));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stamp_pattern(radius: u32) -> PixelGrid {
        let size = stamp_size(radius) as u32;
        PixelGrid::from_fn(size, size, |x, y| {
            Vec4::new(x as f32 / size as f32, y as f32 / size as f32, 0.25, 1.0)
        })
    }

    fn background(size: u32) -> PixelGrid {
        PixelGrid::from_fn(size, size, |x, y| {
            Vec4::new(0.9, 0.1, (x + y) as f32 / (2 * size) as f32, 0.5)
        })
    }

    #[test]
    fn test_circle_is_replaced_and_outside_untouched() {
        let radius = 3;
        let target = background(16);
        let stamp = stamp_pattern(radius);
        let center = IVec2::new(7, 8);

        let result = composite(&target, &stamp, center, radius).unwrap();

        for y in 0..16u32 {
            for x in 0..16u32 {
                let dx = x as i32 - center.x;
                let dy = y as i32 - center.y;
                if dx * dx + dy * dy <= (radius * radius) as i32 {
                    let expected = stamp.get((dx + radius as i32) as u32, (dy + radius as i32) as u32);
                    assert_eq!(result.get(x, y), expected, "inside pixel ({}, {})", x, y);
                } else {
                    assert_eq!(result.get(x, y), target.get(x, y), "outside pixel ({}, {})", x, y);
                }
            }
        }
    }

    #[test]
    fn test_clips_at_target_edges() {
        let radius = 4;
        let target = background(8);
        let stamp = stamp_pattern(radius);

        let result = composite(&target, &stamp, IVec2::new(0, 0), radius).unwrap();
        // Top-left pixel sits at offset (0, 0), the stamp center
        assert_eq!(result.get(0, 0), stamp.get(4, 4));
        assert_eq!(result.get(4, 0), stamp.get(8, 4));
        // (4, 4) is at distance² 32 > 16
        assert_eq!(result.get(4, 4), target.get(4, 4));

        let far = composite(&target, &stamp, IVec2::new(-20, 30), radius).unwrap();
        assert_eq!(far, target);
    }

    #[test]
    fn test_original_target_is_not_modified() {
        let target = background(8);
        let copy = target.clone();
        let _ = composite(&target, &stamp_pattern(2), IVec2::new(4, 4), 2).unwrap();
        assert_eq!(target, copy);
    }

    #[test]
    fn test_zero_radius_paints_center_only() {
        let target = background(4);
        let stamp = PixelGrid::filled(1, 1, Vec4::ONE);
        let result = composite(&target, &stamp, IVec2::new(2, 1), 0).unwrap();
        assert_eq!(result.get(2, 1), Some(Vec4::ONE));
        assert_eq!(result.get(1, 1), target.get(1, 1));
    }

    #[test]
    fn test_undersized_stamp_is_rejected() {
        let target = background(8);
        let stamp = stamp_pattern(1);
        assert!(matches!(
            composite(&target, &stamp, IVec2::new(4, 4), 2),
            Err(GenError::InvalidDimension(_))
        ));
    }

    #[test]
    fn test_stretched_stamp_matches_resampled_stamp() {
        let radius = 5;
        let target = background(16);
        let small = PixelGrid::from_fn(3, 4, |x, y| Vec4::new(x as f32, y as f32, 0.5, 1.0));
        let size = stamp_size(radius) as u32;
        let presized = crate::resample::resample(&small, size).unwrap();

        let expected = composite(&target, &presized, IVec2::new(6, 9), radius).unwrap();
        let mut stretched = target.clone();
        composite_stretched_into(&mut stretched, &small, IVec2::new(6, 9), radius).unwrap();
        assert_eq!(stretched, expected);
    }

    #[test]
    fn test_huge_radius_only_visits_the_target() {
        let target = background(8);
        let paint = Vec4::new(0.0, 0.0, 1.0, 1.0);
        let stamp = PixelGrid::filled(2, 2, paint);

        let mut painted = target.clone();
        composite_stretched_into(&mut painted, &stamp, IVec2::new(0, 0), u32::MAX).unwrap();
        assert!(painted.pixels().iter().all(|&c| c == paint));

        // Circle far away with its edge still short of the target
        let mut untouched = target.clone();
        composite_stretched_into(&mut untouched, &stamp, IVec2::new(i32::MIN, i32::MIN), 160_000)
            .unwrap();
        assert_eq!(untouched, target);
    }

    #[test]
    fn test_empty_stretched_stamp_is_rejected() {
        let mut target = background(4);
        let empty = PixelGrid::filled(0, 0, Vec4::ONE);
        assert!(matches!(
            composite_stretched_into(&mut target, &empty, IVec2::ZERO, 1),
            Err(GenError::InvalidDimension(_))
        ));
    }

    #[test]
    fn test_blend_with_full_factor_is_exact() {
        let a = Vec4::new(0.3, 0.123, 0.77, 0.5);
        let b = Vec4::new(0.7, 0.9, 0.01, 1.0);
        assert_eq!(blend(a, b, 1.0), b);
        assert_eq!(blend(a, b, 0.0), a);
    }
}
