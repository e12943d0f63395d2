use glam::{Vec2, Vec4};
use serde::Serialize;

use crate::error::{GenError, Result};
use crate::pixel_grid::PixelGrid;

/// Perceptual luma of a color, alpha ignored
///
/// Uses the Rec. 601 weights `0.299 r + 0.587 g + 0.114 b`, so a neutral gray
/// `(v, v, v)` maps to `v`.
pub fn grayscale(color: Vec4) -> f32 {
    0.299 * color.x + 0.587 * color.y + 0.114 * color.z
}

/// Normalized terrain elevations in [0, 1], row-major like `PixelGrid`
#[derive(Debug, Clone, PartialEq)]
pub struct HeightField {
    width: u32,
    height: u32,
    heights: Vec<f32>,
}

impl HeightField {
    /// Convert a square grid into heights
    ///
    /// * `grid` - Square, non-empty heightmap grid
    /// * `invert` - Use `1 - gray` instead of `gray`
    /// * `scale` - Multiplier applied after inversion; the result is clamped to [0, 1]
    pub fn build(grid: &PixelGrid, invert: bool, scale: f32) -> Result<Self> {
        grid.ensure_square("heightmap")?;
        if !scale.is_finite() {
            return Err(GenError::InvalidConfiguration(format!(
                "height scale must be finite, got {}",
                scale
            )));
        }

        let heights = grid
            .pixels()
            .iter()
            .map(|&pixel| {
                let gray = grayscale(pixel);
                let value = if invert { 1.0 - gray } else { gray };
                (value * scale).clamp(0.0, 1.0)
            })
            .collect();

        Ok(HeightField {
            width: grid.width(),
            height: grid.height(),
            heights,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn heights(&self) -> &[f32] {
        &self.heights
    }

    pub fn get(&self, x: u32, y: u32) -> Option<f32> {
        if x < self.width && y < self.height {
            Some(self.heights[y as usize * self.width as usize + x as usize])
        } else {
            None
        }
    }

    /// Nearest normalized height under a planar position, clamped to the field
    pub fn sample(&self, position: Vec2) -> f32 {
        if self.heights.is_empty() {
            return 0.0;
        }
        let x = (position.x.max(0.0).floor() as u32).min(self.width - 1);
        let y = (position.y.max(0.0).floor() as u32).min(self.height - 1);
        self.get(x, y).unwrap_or(0.0)
    }
}

/// What the terrain host needs besides the heights themselves
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TerrainDescriptor {
    /// World extent along x
    pub size_x: f32,
    /// World extent along the planar y axis (world z)
    pub size_y: f32,
    /// World height of a normalized height of 1.0
    pub max_height: f32,
    /// Samples per side of the height field
    pub heightmap_resolution: u32,
}

impl TerrainDescriptor {
    /// One world unit per heightmap sample, as the terrain is laid out 1:1
    pub fn for_field(field: &HeightField, max_height: f32) -> Self {
        TerrainDescriptor {
            size_x: field.width() as f32,
            size_y: field.height() as f32,
            max_height,
            heightmap_resolution: field.width(),
        }
    }

    /// Scale from grid pixels to world units on each planar axis
    pub fn planar_scale(&self) -> Vec2 {
        let resolution = self.heightmap_resolution.max(1) as f32;
        Vec2::new(self.size_x / resolution, self.size_y / resolution)
    }
}
