//! Terrain forge
//!
//! Derives a terrain height field and surface texture from raster inputs and
//! scatters decorative elements guided by an object map.
//!
//! Every raster goes through the same path: [`resample::resample`] to the
//! heightmap's power-of-two resolution, then [`orientation::orient`]. The
//! heightmap becomes a [`height_field::HeightField`]; the object map is split
//! into tiles ([`tiles::classify`]) whose dominant colors are matched against
//! element definitions ([`matcher::matches`]) to produce placements and brush
//! accents ([`placement::place`], [`brush::composite`]).
//! [`pipeline::generate`] runs the whole thing.

pub mod brush;
pub mod config;
pub mod error;
pub mod export;
pub mod height_field;
pub mod matcher;
pub mod orientation;
pub mod pipeline;
pub mod pixel_grid;
pub mod placement;
pub mod resample;
pub mod sinks;
pub mod textures;
pub mod tiles;

pub use config::{GenerationSettings, GeneratorConfig, MaterialChoice};
pub use error::{GenError, Result};
pub use pipeline::{Generation, generate};
pub use pixel_grid::PixelGrid;
