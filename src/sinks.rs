use crate::config::MaterialChoice;
use crate::height_field::{HeightField, TerrainDescriptor};
use crate::pixel_grid::PixelGrid;
use crate::placement::Placement;

/// Host side that turns a height field into terrain
pub trait TerrainSink {
    fn apply_terrain(
        &mut self,
        descriptor: &TerrainDescriptor,
        field: &HeightField,
        texture: Option<&PixelGrid>,
        material: &MaterialChoice,
    ) -> anyhow::Result<()>;
}

/// Host side that instantiates placed elements
///
/// Fire-and-forget: the generator does not wait on or inspect the outcome.
pub trait ObjectSink {
    fn instantiate(&mut self, placement: &Placement);
}
