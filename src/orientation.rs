use serde::{Deserialize, Serialize};

use crate::error::{GenError, Result};
use crate::pixel_grid::PixelGrid;

/// Clockwise quarter turns applied to every raster input
///
/// Serialized as degrees (`0`, `90`, `180`, `270`) in configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum Rotation {
    #[default]
    None,
    Quarter,
    Half,
    ThreeQuarters,
}

impl Rotation {
    /// Number of 90 degree clockwise steps
    pub fn steps(self) -> u32 {
        match self {
            Rotation::None => 0,
            Rotation::Quarter => 1,
            Rotation::Half => 2,
            Rotation::ThreeQuarters => 3,
        }
    }

    pub fn from_steps(steps: u32) -> Result<Self> {
        match steps {
            0 => Ok(Rotation::None),
            1 => Ok(Rotation::Quarter),
            2 => Ok(Rotation::Half),
            3 => Ok(Rotation::ThreeQuarters),
            _ => Err(GenError::InvalidConfiguration(format!(
                "rotation steps must be 0..=3, got {}",
                steps
            ))),
        }
    }
}

impl TryFrom<u32> for Rotation {
    type Error = String;

    fn try_from(degrees: u32) -> std::result::Result<Self, Self::Error> {
        match degrees {
            0 => Ok(Rotation::None),
            90 => Ok(Rotation::Quarter),
            180 => Ok(Rotation::Half),
            270 => Ok(Rotation::ThreeQuarters),
            other => Err(format!("rotation must be 0, 90, 180 or 270 degrees, got {}", other)),
        }
    }
}

impl From<Rotation> for u32 {
    fn from(rotation: Rotation) -> u32 {
        rotation.steps() * 90
    }
}

/// Reflect horizontally: every row's pixel order is reversed
pub fn mirror(grid: &PixelGrid) -> PixelGrid {
    let width = grid.width();
    PixelGrid::from_fn(width, grid.height(), |x, y| {
        grid.get(width - 1 - x, y).unwrap_or_default()
    })
}

/// Rotate 90 degrees clockwise `steps` times
///
/// Only square grids can be rotated; the resampler guarantees that for every
/// pipeline input. `steps == 0` hands back an unchanged copy for any shape.
pub fn rotate(grid: &PixelGrid, steps: u32) -> Result<PixelGrid> {
    let rotation = Rotation::from_steps(steps)?;
    if rotation == Rotation::None {
        return Ok(grid.clone());
    }
    grid.ensure_square("rotated grid")?;

    let mut current = grid.clone();
    for _ in 0..rotation.steps() {
        current = rotate_quarter(&current);
    }
    Ok(current)
}

/// One clockwise quarter turn of a square grid
///
/// The source pixel at row `r`, column `c` lands on row `c`, column `n - 1 - r`,
/// so the top-left corner moves to the top-right.
fn rotate_quarter(grid: &PixelGrid) -> PixelGrid {
    let n = grid.width();
    PixelGrid::from_fn(n, n, |x, y| grid.get(y, n - 1 - x).unwrap_or_default())
}

/// Mirror (if requested) and then rotate, the order every pipeline input uses
pub fn orient(grid: &PixelGrid, mirrored: bool, rotation: Rotation) -> Result<PixelGrid> {
    if mirrored {
        rotate(&mirror(grid), rotation.steps())
    } else {
        rotate(grid, rotation.steps())
    }
}
