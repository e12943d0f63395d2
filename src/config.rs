use std::fs;
use std::path::{Path, PathBuf};

use glam::Vec4;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{GenError, Result};
use crate::matcher::{DEFAULT_COLOR_TOLERANCE, ElementDefinition};
use crate::orientation::Rotation;
use crate::pixel_grid;
use crate::tiles::validate_density;

/// Material the host should put on the terrain
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub enum MaterialChoice {
    /// Host's stock terrain material
    #[default]
    Default,
    /// Host material identified by name
    Custom(String),
}

/// One element entry as written in the configuration file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementConfig {
    pub name: String,
    /// Object map color, RGBA in [0, 1]
    pub color: [f32; 4],
    #[serde(default = "default_tolerance")]
    pub tolerance: f32,
    /// Host prototype to spawn in matching tiles
    #[serde(default)]
    pub prefab: Option<String>,
    /// Stamp image painted over matching tiles
    #[serde(default)]
    pub brush: Option<PathBuf>,
}

/// Generator options as loaded from a TOML file
///
/// Paths are relative to the directory passed to [`GeneratorConfig::resolve`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub heightmap: PathBuf,
    pub max_height: f32,
    /// Multiplier on normalized heights, nominally 0..=1
    pub height_scale: f32,
    pub invert_height: bool,
    pub rotation: Rotation,
    pub mirror: bool,

    pub use_custom_texture: bool,
    pub texture: PathBuf,
    pub use_custom_material: bool,
    pub custom_material: Option<String>,

    pub generate_objects: bool,
    pub object_map: PathBuf,
    /// Tiles per 100 pixels, in (0, 5]
    pub object_density: f32,
    pub elements: Vec<ElementConfig>,

    /// Seed for object placement; random when absent
    pub seed: Option<u64>,
}

fn default_tolerance() -> f32 {
    DEFAULT_COLOR_TOLERANCE
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            heightmap: PathBuf::new(),
            max_height: 100.0,
            height_scale: 1.0,
            invert_height: false,
            rotation: Rotation::None,
            mirror: false,
            use_custom_texture: false,
            texture: PathBuf::new(),
            use_custom_material: false,
            custom_material: None,
            generate_objects: false,
            object_map: PathBuf::new(),
            object_density: 1.0,
            elements: Vec::new(),
            seed: None,
        }
    }
}

impl GeneratorConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| GenError::InvalidConfiguration(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(GenError::MissingResource {
                what: "configuration",
                path: path.to_path_buf(),
            });
        }
        let text = fs::read_to_string(path).map_err(|source| GenError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Read every referenced file and produce the settings for one run
    ///
    /// Optional inputs are only read when their toggle is on.
    pub fn resolve(&self, base_dir: &Path) -> Result<GenerationSettings> {
        let heightmap = read_input(base_dir, &self.heightmap, "heightmap")?;

        let texture = if self.use_custom_texture {
            Some(read_input(base_dir, &self.texture, "texture")?)
        } else {
            None
        };

        let material = match (self.use_custom_material, &self.custom_material) {
            (false, _) => MaterialChoice::Default,
            (true, Some(name)) if !name.is_empty() => MaterialChoice::Custom(name.clone()),
            (true, _) => return Err(GenError::MissingMaterial),
        };

        let (object_map, elements) = if self.generate_objects {
            let map = read_input(base_dir, &self.object_map, "object map")?;
            let elements = self
                .elements
                .iter()
                .map(|element| element.resolve(base_dir))
                .collect::<Result<Vec<_>>>()?;
            (Some(map), elements)
        } else {
            (None, Vec::new())
        };

        let settings = GenerationSettings {
            heightmap,
            max_height: self.max_height,
            height_scale: self.height_scale,
            invert_height: self.invert_height,
            rotation: self.rotation,
            mirror: self.mirror,
            texture,
            material,
            object_map,
            object_density: self.object_density,
            elements,
        };
        settings.validate()?;
        Ok(settings)
    }
}

impl ElementConfig {
    fn resolve(&self, base_dir: &Path) -> Result<ElementDefinition> {
        let [r, g, b, a] = self.color;
        let mut def = ElementDefinition::new(self.name.clone(), Vec4::new(r, g, b, a))
            .with_tolerance(self.tolerance);

        if let Some(prefab) = &self.prefab {
            def = def.with_spawn(prefab.clone());
        }
        if let Some(brush) = &self.brush {
            let bytes = read_input(base_dir, brush, "brush stamp")?;
            def = def.with_brush(pixel_grid::decode(&bytes)?);
        }
        Ok(def)
    }
}

fn read_input(base_dir: &Path, path: &Path, what: &'static str) -> Result<Vec<u8>> {
    if path.as_os_str().is_empty() {
        return Err(GenError::EmptyPath(what));
    }
    let full = base_dir.join(path);
    if !full.is_file() {
        return Err(GenError::MissingResource { what, path: full });
    }
    let bytes = fs::read(&full).map_err(|source| GenError::Io {
        path: full.clone(),
        source,
    })?;
    debug!(what, path = %full.display(), len = bytes.len(), "read input");
    Ok(bytes)
}

/// Everything one generation run needs, with files already read
///
/// Built once by [`GeneratorConfig::resolve`] (or by hand) and never changed
/// during the run.
#[derive(Debug, Clone)]
pub struct GenerationSettings {
    /// Encoded heightmap image
    pub heightmap: Vec<u8>,
    pub max_height: f32,
    pub height_scale: f32,
    pub invert_height: bool,
    pub rotation: Rotation,
    pub mirror: bool,
    /// Encoded decorative texture, if one should be applied
    pub texture: Option<Vec<u8>>,
    pub material: MaterialChoice,
    /// Encoded object map, if objects should be generated
    pub object_map: Option<Vec<u8>>,
    pub object_density: f32,
    pub elements: Vec<ElementDefinition>,
}

impl GenerationSettings {
    /// Settings for a heightmap alone, using the configuration defaults
    pub fn new(heightmap: Vec<u8>) -> Self {
        let defaults = GeneratorConfig::default();
        GenerationSettings {
            heightmap,
            max_height: defaults.max_height,
            height_scale: defaults.height_scale,
            invert_height: defaults.invert_height,
            rotation: defaults.rotation,
            mirror: defaults.mirror,
            texture: None,
            material: MaterialChoice::Default,
            object_map: None,
            object_density: defaults.object_density,
            elements: Vec::new(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.heightmap.is_empty() {
            return Err(GenError::EmptyPath("heightmap"));
        }
        if !self.max_height.is_finite() || self.max_height <= 0.0 {
            return Err(GenError::InvalidConfiguration(format!(
                "maximum height must be above 0, got {}",
                self.max_height
            )));
        }
        if !self.height_scale.is_finite() || self.height_scale < 0.0 {
            return Err(GenError::InvalidConfiguration(format!(
                "height scale must be finite and non-negative, got {}",
                self.height_scale
            )));
        }
        if self.object_map.is_some() {
            validate_density(self.object_density)?;
        }
        if matches!(&self.material, MaterialChoice::Custom(name) if name.is_empty()) {
            return Err(GenError::MissingMaterial);
        }
        for def in &self.elements {
            def.validate()?;
        }
        Ok(())
    }
}
