use glam::Vec4;

use crate::error::{GenError, Result};
use crate::pixel_grid::PixelGrid;

/// Default squared-distance tolerance for color matching
pub const DEFAULT_COLOR_TOLERANCE: f32 = 1.0;

/// Spawn an instance of a host prototype inside matching tiles
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnSpec {
    pub prototype_id: String,
}

/// Paint a stamp texture over matching tiles
#[derive(Debug, Clone, PartialEq)]
pub struct BrushSpec {
    pub stamp: PixelGrid,
}

/// A decorative element keyed by an object map color
#[derive(Debug, Clone, PartialEq)]
pub struct ElementDefinition {
    pub name: String,
    pub mapped_color: Vec4,
    /// Squared RGBA distance below which a tile color counts as a match
    pub color_tolerance: f32,
    pub spawn: Option<SpawnSpec>,
    pub brush: Option<BrushSpec>,
}

impl ElementDefinition {
    pub fn new(name: impl Into<String>, mapped_color: Vec4) -> Self {
        ElementDefinition {
            name: name.into(),
            mapped_color,
            color_tolerance: DEFAULT_COLOR_TOLERANCE,
            spawn: None,
            brush: None,
        }
    }

    pub fn with_tolerance(mut self, tolerance: f32) -> Self {
        self.color_tolerance = tolerance;
        self
    }

    pub fn with_spawn(mut self, prototype_id: impl Into<String>) -> Self {
        self.spawn = Some(SpawnSpec {
            prototype_id: prototype_id.into(),
        });
        self
    }

    pub fn with_brush(mut self, stamp: PixelGrid) -> Self {
        self.brush = Some(BrushSpec { stamp });
        self
    }

    /// Check that the tolerance is usable and the stamp, if any, has pixels
    pub fn validate(&self) -> Result<()> {
        if !self.color_tolerance.is_finite() || self.color_tolerance <= 0.0 {
            return Err(GenError::InvalidConfiguration(format!(
                "element '{}' has tolerance {}, expected a finite value above 0",
                self.name, self.color_tolerance
            )));
        }
        if let Some(brush) = &self.brush {
            brush.stamp.ensure_non_empty("brush stamp")?;
        }
        Ok(())
    }

    /// Whether `color` lies strictly within this element's tolerance
    pub fn matches(&self, color: Vec4) -> bool {
        color.distance_squared(self.mapped_color) < self.color_tolerance
    }
}

/// Every definition whose mapped color is close enough to `color`
///
/// Several definitions may match the same color; all of them are returned in
/// definition order and all of them take effect.
pub fn matches(color: Vec4, definitions: &[ElementDefinition]) -> Vec<&ElementDefinition> {
    definitions.iter().filter(|def| def.matches(color)).collect()
}
