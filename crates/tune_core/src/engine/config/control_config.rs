//! Control Configuration (knob step sizes and axis directions)

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Knob parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ControlConfig {
    // === Step Sizes ===
    /// Displacement of a single click (default: 1.0)
    pub small_step: f64,
    /// Displacement of a large click (default: 10.0)
    pub large_step: f64,

    // === Axis Directions ===
    /// Direction of the tuning axis in the plane, degrees (default: 5.0)
    pub tuning_angle_deg: f64,
    /// Direction of the matching axis in the plane, degrees (default: 150.0)
    ///
    /// Not orthogonal to the tuning axis: turning one knob drags the other
    /// coordinate along with it.
    pub matching_angle_deg: f64,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            small_step: 1.0,
            large_step: 10.0,

            tuning_angle_deg: 5.0,
            matching_angle_deg: 150.0,
        }
    }
}
