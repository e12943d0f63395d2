use glam::{UVec2, Vec2, Vec3};
use rand::Rng;
use serde::Serialize;

use crate::height_field::TerrainDescriptor;
use crate::matcher::{self, ElementDefinition};
use crate::pixel_grid::PixelGrid;
use crate::tiles::Tile;

/// An element instance for the host to spawn
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Placement {
    /// Name of the element definition that produced it
    pub element: String,
    pub prototype_id: String,
    /// World position, y up
    pub position: Vec3,
}

/// A brush stamp to composite over one tile
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextureEdit<'a> {
    pub element: &'a str,
    /// Brush center, the tile's top-left pixel
    pub origin: UVec2,
    /// Brush radius, the tile size
    pub radius: u32,
    pub stamp: &'a PixelGrid,
}

/// Everything the placement pass decided, in tile-scan order
#[derive(Debug, Clone, Default)]
pub struct PlacementPlan<'a> {
    pub placements: Vec<Placement>,
    pub texture_edits: Vec<TextureEdit<'a>>,
}

/// Uniformly random planar point inside the part of the tile on the grid
///
/// Always within `[origin, origin + size)` on both axes.
pub fn random_position<R: Rng + ?Sized>(tile: &Tile, rng: &mut R) -> Vec2 {
    let extent = tile.extent.max(UVec2::ONE).min(UVec2::splat(tile.size.max(1)));
    let min = tile.origin.as_vec2();
    let max = (tile.origin + extent).as_vec2();
    Vec2::new(rng.gen_range(min.x..max.x), rng.gen_range(min.y..max.y))
}

/// Turn classified tiles into placements and texture edits
///
/// # Arguments
/// * `tiles` - Tiles from the object map scan
/// * `definitions` - Element definitions; every match in a tile takes effect
/// * `descriptor` - Scales planar grid coordinates to world units
/// * `height_lookup` - World height at a planar grid position
/// * `rng` - Source for the in-tile positions
///
/// # Returns
/// * `PlacementPlan` - Placements and brush edits, both in tile-scan order
pub fn place<'a, R: Rng + ?Sized>(
    tiles: impl IntoIterator<Item = Tile>,
    definitions: &'a [ElementDefinition],
    descriptor: &TerrainDescriptor,
    height_lookup: impl Fn(Vec2) -> f32,
    rng: &mut R,
) -> PlacementPlan<'a> {
    let scale = descriptor.planar_scale();
    let mut plan = PlacementPlan::default();

    for tile in tiles {
        for def in matcher::matches(tile.dominant_color, definitions) {
            // Spawned objects get a random spot in the tile, on the surface
            if let Some(spawn) = &def.spawn {
                let planar = random_position(&tile, rng);
                let world = planar * scale;
                plan.placements.push(Placement {
                    element: def.name.clone(),
                    prototype_id: spawn.prototype_id.clone(),
                    position: Vec3::new(world.x, height_lookup(planar), world.y),
                });
            }

            // Brushes are centered on the tile origin and span one tile
            if let Some(brush) = &def.brush {
                plan.texture_edits.push(TextureEdit {
                    element: &def.name,
                    origin: tile.origin,
                    radius: tile.size,
                    stamp: &brush.stamp,
                });
            }
        }
    }

    plan
}
