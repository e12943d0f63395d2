use crate::error::{GenError, Result};
use crate::pixel_grid::PixelGrid;

/// Smallest power of two that fits the larger side of the grid
///
/// This is the resolution the heightmap is resampled to; the texture and the
/// object map are then resampled to the same size so all three line up.
pub fn heightmap_resolution(grid: &PixelGrid) -> u32 {
    grid.width().max(grid.height()).max(1).next_power_of_two()
}

/// Resample a grid to `target_size` x `target_size` with nearest-neighbor sampling
///
/// * `grid` - The source grid, any aspect ratio
/// * `target_size` - Side length of the square output
///
/// Destination pixel `(x, y)` takes the source pixel at
/// `(floor(x / target * width), floor(y / target * height))`. No interpolation
/// happens, so hard-edged object map colors survive unchanged.
pub fn resample(grid: &PixelGrid, target_size: u32) -> Result<PixelGrid> {
    if target_size == 0 {
        return Err(GenError::InvalidDimension(
            "resample target size must be non-zero".to_string(),
        ));
    }
    grid.ensure_non_empty("resample source")?;

    let src_width = grid.width() as u64;
    let src_height = grid.height() as u64;
    let target = target_size as u64;

    // Integer form of floor(i / target * src) avoids float rounding at the edges
    let result = PixelGrid::from_fn(target_size, target_size, |x, y| {
        let src_x = (x as u64 * src_width / target) as u32;
        let src_y = (y as u64 * src_height / target) as u32;
        grid.get(src_x, src_y).unwrap_or_default()
    });

    Ok(result)
}
