//! Reflection Field Configuration

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Reflection surface and sampling grid parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct FieldConfig {
    // === Plane / Grid ===
    /// Half extent S of the plane; the grid spans [-S, S] on both axes (default: 180.0)
    pub half_extent: f64,
    /// Grid spacing (default: 1.0). `half_extent / grid_step` must be an integer.
    pub grid_step: f64,

    // === Peak Shape ===
    /// Fixed primary half-width w1 (default: 8.0)
    pub primary_width: f64,
    /// Secondary half-width at the probe row (default: 1.2)
    pub secondary_base: f64,
    /// Growth of the secondary half-width per unit of vertical offset (default: 0.02)
    pub secondary_slope: f64,
    /// Rotation of the peak's principal axes, degrees (default: 90.0)
    pub rotation_deg: f64,

    // === Evaluation ===
    /// Grids with more cells than this are filled in parallel (default: 4096)
    pub parallel_threshold: usize,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            half_extent: 180.0,
            grid_step: 1.0,

            primary_width: 8.0,
            secondary_base: 1.2,
            secondary_slope: 0.02,
            rotation_deg: 90.0,

            parallel_threshold: 4096,
        }
    }
}

impl FieldConfig {
    /// Number of grid steps between the plane edge and the centre sample.
    ///
    /// Only meaningful for a validated config.
    pub fn center_index(&self) -> usize {
        (self.half_extent / self.grid_step).round() as usize
    }

    /// Samples per grid axis (`2 * center_index + 1`).
    pub fn grid_size(&self) -> usize {
        self.center_index() * 2 + 1
    }
}
