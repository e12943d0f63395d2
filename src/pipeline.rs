use glam::Vec2;
use rand::Rng;
use tracing::{debug, info, warn};

use crate::brush::composite_stretched_into;
use crate::config::{GenerationSettings, MaterialChoice};
use crate::error::Result;
use crate::height_field::{HeightField, TerrainDescriptor};
use crate::orientation::orient;
use crate::pixel_grid::{PixelGrid, decode};
use crate::placement::{Placement, TextureEdit, place};
use crate::resample::{heightmap_resolution, resample};
use crate::sinks::{ObjectSink, TerrainSink};
use crate::textures::{GROUND_SEED, ground_texture};
use crate::tiles::{classify, tile_size_for_density};

/// Result of one generation run, ready to hand to the host
#[derive(Debug, Clone)]
pub struct Generation {
    pub descriptor: TerrainDescriptor,
    pub height_field: HeightField,
    /// Final surface texture, with brush accents applied
    pub texture: Option<PixelGrid>,
    pub material: MaterialChoice,
    pub placements: Vec<Placement>,
}

impl Generation {
    /// Pass the terrain and every placement to the host sinks
    pub fn deliver(
        &self,
        terrain: &mut dyn TerrainSink,
        objects: &mut dyn ObjectSink,
    ) -> anyhow::Result<()> {
        terrain.apply_terrain(
            &self.descriptor,
            &self.height_field,
            self.texture.as_ref(),
            &self.material,
        )?;
        for placement in &self.placements {
            objects.instantiate(placement);
        }
        Ok(())
    }
}

/// Resample to `resolution` and orient, the path every raster input takes
pub fn prepare_raster(
    grid: &PixelGrid,
    resolution: u32,
    settings: &GenerationSettings,
) -> Result<PixelGrid> {
    let square = resample(grid, resolution)?;
    orient(&square, settings.mirror, settings.rotation)
}

/// Run the whole pipeline
///
/// Stages run in order: heightmap, then texture, then objects. Any failure
/// aborts the run, since every later stage depends on the heightmap's
/// resolution.
///
/// # Arguments
/// * `settings` - Raster inputs, orientation and element definitions
/// * `rng` - Source of the random offsets placements get inside their tiles
///
/// # Returns
/// * `Result<Generation>` - Height field, descriptor, final texture and
///   placements, or the first error any stage hit
pub fn generate<R: Rng + ?Sized>(
    settings: &GenerationSettings,
    rng: &mut R,
) -> Result<Generation> {
    settings.validate()?;

    // Heightmap first: its size fixes the resolution for every other raster
    let source = decode(&settings.heightmap)?;
    let resolution = heightmap_resolution(&source);
    debug!(
        width = source.width(),
        height = source.height(),
        resolution,
        "decoded heightmap"
    );

    let heightmap = prepare_raster(&source, resolution, settings)?;
    let height_field =
        HeightField::build(&heightmap, settings.invert_height, settings.height_scale)?;
    let descriptor = TerrainDescriptor::for_field(&height_field, settings.max_height);
    info!(
        resolution,
        max_height = descriptor.max_height,
        "height field ready"
    );

    // Texture and object map are brought onto the heightmap's grid
    let mut texture = match &settings.texture {
        Some(bytes) => Some(load_aligned("texture", bytes, resolution, settings)?),
        None => None,
    };

    let mut placements = Vec::new();
    if let Some(bytes) = &settings.object_map {
        let object_map = load_aligned("object map", bytes, resolution, settings)?;
        let tile_size = tile_size_for_density(object_map.height(), settings.object_density)?;
        let tiles = classify(&object_map, tile_size)?;
        debug!(tile_size, elements = settings.elements.len(), "classifying object map");

        // Placements sit on the terrain surface in world units
        let lookup = |planar: Vec2| height_field.sample(planar) * descriptor.max_height;
        let plan = place(tiles, &settings.elements, &descriptor, lookup, rng);

        // Brushes need a canvas even when the host supplied no texture
        if !plan.texture_edits.is_empty() {
            let canvas = texture.get_or_insert_with(|| {
                warn!("brush accents requested without a custom texture, using generated ground");
                ground_texture(resolution, GROUND_SEED)
            });
            apply_texture_edits(canvas, &plan.texture_edits)?;
        }

        info!(
            placements = plan.placements.len(),
            texture_edits = plan.texture_edits.len(),
            "objects placed"
        );
        placements = plan.placements;
    }

    Ok(Generation {
        descriptor,
        height_field,
        texture,
        material: settings.material.clone(),
        placements,
    })
}

/// Decode a secondary raster and bring it onto the heightmap's grid
fn load_aligned(
    what: &'static str,
    bytes: &[u8],
    resolution: u32,
    settings: &GenerationSettings,
) -> Result<PixelGrid> {
    let grid = decode(bytes)?;
    if grid.width() != resolution || grid.height() != resolution {
        warn!(
            what,
            width = grid.width(),
            height = grid.height(),
            resolution,
            "size differs from the heightmap, resampling"
        );
    }
    prepare_raster(&grid, resolution, settings)
}

/// Composite texture edits one after another in the order given
///
/// # Arguments
/// * `texture` - Canvas the edits are painted into
/// * `edits` - Brush accents in tile-scan order
///
/// # Returns
/// * `Result<()>` - `InvalidDimension` if an edit carries an empty stamp
///
/// Later edits overwrite earlier ones where brushes overlap. Stamps of any
/// size are stretched over their brush with nearest-neighbor sampling; only
/// the part of each brush that falls on the canvas is touched.
pub fn apply_texture_edits(texture: &mut PixelGrid, edits: &[TextureEdit<'_>]) -> Result<()> {
    for edit in edits {
        composite_stretched_into(texture, edit.stamp, edit.origin.as_ivec2(), edit.radius)?;
    }
    Ok(())
}
