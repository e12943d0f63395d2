use std::collections::HashMap;

use glam::{UVec2, Vec4};

use crate::error::{GenError, Result};
use crate::pixel_grid::PixelGrid;

/// Largest accepted object density
pub const MAX_OBJECT_DENSITY: f32 = 5.0;

/// A square region of the object map and its most frequent color
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tile {
    /// Top-left pixel of the tile
    pub origin: UVec2,
    /// Nominal side length, uniform across a scan
    pub size: u32,
    /// Part of the tile that lies inside the grid; smaller than `size` only at
    /// the right and bottom borders
    pub extent: UVec2,
    pub dominant_color: Vec4,
}

/// Fail with `InvalidConfiguration` unless `density` lies in `(0, MAX_OBJECT_DENSITY]`
pub fn validate_density(density: f32) -> Result<()> {
    if !density.is_finite() || density <= 0.0 || density > MAX_OBJECT_DENSITY {
        return Err(GenError::InvalidConfiguration(format!(
            "object density must be in (0, {}], got {}",
            MAX_OBJECT_DENSITY, density
        )));
    }
    Ok(())
}

/// Tile side length for an object density (tiles per 100 pixels)
///
/// `round(grid_height / (100 * density))`, never below 1. Very small densities
/// give tiles far larger than the grid; the size saturates at `u32::MAX`.
pub fn tile_size_for_density(grid_height: u32, density: f32) -> Result<u32> {
    validate_density(density)?;
    let size = (grid_height as f32 / (100.0 * density)).round();
    Ok((size as u32).max(1))
}

/// Split `grid` into `tile_size` tiles and find each tile's dominant color
///
/// Tiles come out lazily in row-major order. Border tiles are clipped to the
/// grid, never padded or skipped.
pub fn classify(grid: &PixelGrid, tile_size: u32) -> Result<TileScan<'_>> {
    if tile_size == 0 {
        return Err(GenError::InvalidConfiguration(
            "tile size must be non-zero".to_string(),
        ));
    }
    Ok(TileScan {
        grid,
        tile_size,
        next_origin: UVec2::ZERO,
    })
}

/// Iterator over the tiles of a grid, see [`classify`]
#[derive(Debug, Clone)]
pub struct TileScan<'a> {
    grid: &'a PixelGrid,
    tile_size: u32,
    next_origin: UVec2,
}

impl TileScan<'_> {
    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }
}

impl Iterator for TileScan<'_> {
    type Item = Tile;

    fn next(&mut self) -> Option<Tile> {
        let (width, height) = (self.grid.width(), self.grid.height());
        if width == 0 || self.next_origin.y >= height {
            return None;
        }

        let origin = self.next_origin;
        let extent = UVec2::new(
            self.tile_size.min(width - origin.x),
            self.tile_size.min(height - origin.y),
        );

        self.next_origin.x = origin.x.saturating_add(self.tile_size);
        if self.next_origin.x >= width {
            self.next_origin.x = 0;
            self.next_origin.y = origin.y.saturating_add(self.tile_size);
        }

        Some(Tile {
            origin,
            size: self.tile_size,
            extent,
            dominant_color: dominant_color(self.grid, origin, extent),
        })
    }
}

/// Most frequent color in a rectangle; ties go to the color seen first in
/// row-major order
fn dominant_color(grid: &PixelGrid, origin: UVec2, extent: UVec2) -> Vec4 {
    // Colors keyed by bit pattern, counts kept in first-seen order
    let mut slots: HashMap<[u32; 4], usize> = HashMap::new();
    let mut counts: Vec<(Vec4, u32)> = Vec::new();

    for y in origin.y..origin.y + extent.y {
        for x in origin.x..origin.x + extent.x {
            let Some(color) = grid.get(x, y) else {
                continue;
            };
            let key = color.to_array().map(f32::to_bits);
            let slot = *slots.entry(key).or_insert_with(|| {
                counts.push((color, 0));
                counts.len() - 1
            });
            counts[slot].1 += 1;
        }
    }

    let mut best: Option<(Vec4, u32)> = None;
    for &(color, count) in &counts {
        if best.map_or(true, |(_, best_count)| count > best_count) {
            best = Some((color, count));
        }
    }
    best.map(|(color, _)| color).unwrap_or_default()
}
