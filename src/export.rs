use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use mesh_tools::GltfBuilder;
use mesh_tools::Triangle;
use serde::Serialize;
use tracing::info;

use crate::config::MaterialChoice;
use crate::height_field::{HeightField, TerrainDescriptor};
use crate::pixel_grid::PixelGrid;
use crate::placement::Placement;
use crate::sinks::{ObjectSink, TerrainSink};

/// Writes the terrain to an output directory
///
/// * `terrain.glb` - height field mesh
/// * `texture.png` - surface texture, when there is one
/// * `terrain.json` - descriptor and material choice
pub struct GlbTerrainExporter {
    out_dir: PathBuf,
}

#[derive(Serialize)]
struct TerrainManifest<'a> {
    descriptor: &'a TerrainDescriptor,
    material: &'a MaterialChoice,
    mesh: &'a str,
    texture: Option<&'a str>,
}

impl GlbTerrainExporter {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        GlbTerrainExporter {
            out_dir: out_dir.into(),
        }
    }
}

impl TerrainSink for GlbTerrainExporter {
    fn apply_terrain(
        &mut self,
        descriptor: &TerrainDescriptor,
        field: &HeightField,
        texture: Option<&PixelGrid>,
        material: &MaterialChoice,
    ) -> Result<()> {
        fs::create_dir_all(&self.out_dir)
            .with_context(|| format!("creating {}", self.out_dir.display()))?;

        let mesh_path = self.out_dir.join("terrain.glb");
        export_field_to_glb(field, descriptor, &mesh_path)?;
        info!(path = %mesh_path.display(), "wrote terrain mesh");

        if let Some(texture) = texture {
            let texture_path = self.out_dir.join("texture.png");
            texture
                .to_rgba_image()
                .save(&texture_path)
                .with_context(|| format!("writing {}", texture_path.display()))?;
            info!(path = %texture_path.display(), "wrote terrain texture");
        }

        let manifest = TerrainManifest {
            descriptor,
            material,
            mesh: "terrain.glb",
            texture: texture.map(|_| "texture.png"),
        };
        let manifest_path = self.out_dir.join("terrain.json");
        let writer = BufWriter::new(File::create(&manifest_path)?);
        serde_json::to_writer_pretty(writer, &manifest)?;

        Ok(())
    }
}

/// Collects placements so they can be written out as JSON
#[derive(Debug, Default)]
pub struct PlacementLog {
    placements: Vec<Placement>,
}

impl PlacementLog {
    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &self.placements)?;
        info!(path = %path.display(), count = self.placements.len(), "wrote placements");
        Ok(())
    }
}

impl ObjectSink for PlacementLog {
    fn instantiate(&mut self, placement: &Placement) {
        self.placements.push(placement.clone());
    }
}

/// Exports a height field as a GLB mesh
///
/// # Arguments
/// * `field` - Normalized heights
/// * `descriptor` - Planar scale and maximum height
/// * `output_path` - Where the GLB file is written
///
/// Vertex `(x, y)` of the field sits at world `(x * sx, h * max_height, y * sz)`,
/// the same frame placements are reported in.
pub fn export_field_to_glb(
    field: &HeightField,
    descriptor: &TerrainDescriptor,
    output_path: &Path,
) -> Result<()> {
    let mut builder = GltfBuilder::new();

    let width = field.width() as usize;
    let height = field.height() as usize;
    let scale = descriptor.planar_scale();

    let mut positions = Vec::with_capacity(width * height);
    let mut normals = Vec::with_capacity(width * height);
    let mut texcoords = Vec::with_capacity(width * height);
    let mut indices = Vec::with_capacity(width.saturating_sub(1) * height.saturating_sub(1) * 2);

    let u_span = (width.max(2) - 1) as f32;
    let v_span = (height.max(2) - 1) as f32;

    for y in 0..height {
        for x in 0..width {
            let h = field.get(x as u32, y as u32).unwrap_or(0.0) * descriptor.max_height;
            positions.push(mesh_tools::compat::point3::new(
                x as f32 * scale.x,
                h,
                y as f32 * scale.y,
            ));

            let normal = calculate_normal(field, x, y, scale.x, scale.y, descriptor.max_height);
            normals.push(mesh_tools::compat::vector3::new(normal.0, normal.1, normal.2));

            texcoords.push(mesh_tools::compat::vector2::new(
                x as f32 / u_span,
                y as f32 / v_span,
            ));
        }
    }

    for y in 0..height.saturating_sub(1) {
        for x in 0..width.saturating_sub(1) {
            let top_left = (y * width + x) as u32;
            let top_right = (y * width + x + 1) as u32;
            let bottom_left = ((y + 1) * width + x) as u32;
            let bottom_right = ((y + 1) * width + x + 1) as u32;

            indices.push(Triangle::new(top_left, bottom_left, top_right));
            indices.push(Triangle::new(top_right, bottom_left, bottom_right));
        }
    }

    let mesh_index = builder.create_simple_mesh(
        Some("TerrainMesh".to_string()),
        &positions,
        &indices,
        Some(normals),
        Some(texcoords),
        None,
    );

    let node = builder.add_node(Some("Terrain".to_string()), Some(mesh_index), None, None, None);
    builder.add_scene(Some("Main Scene".to_string()), Some(vec![node]));

    let path = output_path
        .to_str()
        .with_context(|| format!("non UTF-8 output path {}", output_path.display()))?;
    builder.export_glb(path)?;

    Ok(())
}

/// Surface normal by central differences, y up
fn calculate_normal(
    field: &HeightField,
    x: usize,
    y: usize,
    scale_x: f32,
    scale_z: f32,
    max_height: f32,
) -> (f32, f32, f32) {
    let get_height = |x: isize, y: isize| -> f32 {
        if x >= 0 && y >= 0 {
            field.get(x as u32, y as u32).unwrap_or(0.0) * max_height
        } else {
            0.0
        }
    };

    let x_i = x as isize;
    let y_i = y as isize;

    let dx = (get_height(x_i + 1, y_i) - get_height(x_i - 1, y_i)) / (2.0 * scale_x);
    let dz = (get_height(x_i, y_i + 1) - get_height(x_i, y_i - 1)) / (2.0 * scale_z);

    let (nx, ny, nz) = (-dx, 1.0, -dz);
    let length = (nx * nx + ny * ny + nz * nz).sqrt();
    if length > 0.0 {
        (nx / length, ny / length, nz / length)
    } else {
        (0.0, 1.0, 0.0)
    }
}
