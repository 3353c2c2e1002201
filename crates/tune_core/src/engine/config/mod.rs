//! # Engine Configuration Module
//!
//! All simulation tunables live here instead of being scattered through the
//! engine as literals.
//!
//! ## Presets
//! - `reference()`: the reference trainer (361x361 grid)
//! - `coarse()`: half resolution, for cheap terminal rendering
//! - `fine()`: double resolution
//!
//! ## Usage
//! ```rust
//! use tune_core::engine::config::EngineConfig;
//!
//! let config = EngineConfig::default();
//! let coarse = EngineConfig::coarse();
//! assert!(coarse.validate().is_ok());
//! ```

mod control_config;
mod field_config;

pub use control_config::ControlConfig;
pub use field_config::FieldConfig;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TuningError};

/// Upper bound on grid cells; keeps a single evaluation inside a UI tick.
pub const MAX_GRID_CELLS: usize = 4_000_001;

/// Full engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default, JsonSchema)]
pub struct EngineConfig {
    /// Knob step sizes and axis directions
    #[serde(default)]
    pub control: ControlConfig,
    /// Reflection surface and grid
    #[serde(default)]
    pub field: FieldConfig,
}

impl EngineConfig {
    /// Reference trainer (default)
    pub fn reference() -> Self {
        Self::default()
    }

    /// Half resolution grid. The centre sample stays exact since 180 / 2 is integral.
    pub fn coarse() -> Self {
        let mut cfg = Self::default();
        cfg.field.grid_step = 2.0;
        cfg
    }

    /// Double resolution grid
    pub fn fine() -> Self {
        let mut cfg = Self::default();
        cfg.field.grid_step = 0.5;
        cfg
    }

    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a YAML config
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: EngineConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate configuration bounds
    pub fn validate(&self) -> Result<()> {
        let c = &self.control;
        let f = &self.field;

        // Control params
        if !c.small_step.is_finite() || c.small_step <= 0.0 {
            return Err(invalid(format!("small_step must be > 0, got {}", c.small_step)));
        }
        if !c.large_step.is_finite() || c.large_step < c.small_step {
            return Err(invalid(format!(
                "large_step must be >= small_step ({}), got {}",
                c.small_step, c.large_step
            )));
        }
        if !c.tuning_angle_deg.is_finite() || !c.matching_angle_deg.is_finite() {
            return Err(invalid("axis angles must be finite".to_string()));
        }

        // Grid params
        if !f.half_extent.is_finite() || f.half_extent <= 0.0 {
            return Err(invalid(format!("half_extent must be > 0, got {}", f.half_extent)));
        }
        // origins are drawn from [-S, S), whose width must be representable
        if !(2.0 * f.half_extent).is_finite() {
            return Err(invalid(format!("half_extent too large, got {}", f.half_extent)));
        }
        if !f.grid_step.is_finite() || f.grid_step <= 0.0 {
            return Err(invalid(format!("grid_step must be > 0, got {}", f.grid_step)));
        }
        let steps = f.half_extent / f.grid_step;
        if (steps - steps.round()).abs() > 1e-9 {
            return Err(invalid(format!(
                "half_extent ({}) must be a whole number of grid steps ({})",
                f.half_extent, f.grid_step
            )));
        }
        let size = steps.round() * 2.0 + 1.0;
        if size * size > MAX_GRID_CELLS as f64 {
            return Err(invalid(format!(
                "grid of {size}x{size} exceeds {MAX_GRID_CELLS} cells"
            )));
        }

        // Peak shape: w1 > 0 and w2 = base + slope * |dy| > 0 everywhere
        if !f.primary_width.is_finite() || f.primary_width <= 0.0 {
            return Err(invalid(format!("primary_width must be > 0, got {}", f.primary_width)));
        }
        if !f.secondary_base.is_finite() || f.secondary_base <= 0.0 {
            return Err(invalid(format!(
                "secondary_base must be > 0, got {}",
                f.secondary_base
            )));
        }
        if !f.secondary_slope.is_finite() || f.secondary_slope < 0.0 {
            return Err(invalid(format!(
                "secondary_slope must be >= 0, got {}",
                f.secondary_slope
            )));
        }
        if !f.rotation_deg.is_finite() {
            return Err(invalid("rotation_deg must be finite".to_string()));
        }

        Ok(())
    }
}

fn invalid(msg: String) -> TuningError {
    TuningError::InvalidConfig(msg)
}

// ========== Tests ==========

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.control.small_step, 1.0);
        assert_eq!(cfg.control.large_step, 10.0);
        assert_eq!(cfg.field.half_extent, 180.0);
        assert_eq!(cfg.field.grid_size(), 361);
        assert_eq!(cfg.field.center_index(), 180);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_presets_are_valid() {
        assert_eq!(EngineConfig::reference(), EngineConfig::default());

        let coarse = EngineConfig::coarse();
        assert!(coarse.validate().is_ok());
        assert_eq!(coarse.field.grid_size(), 181);

        let fine = EngineConfig::fine();
        assert!(fine.validate().is_ok());
        assert_eq!(fine.field.grid_size(), 721);
    }

    #[test]
    fn test_rejects_unrepresentable_extent() {
        let cfg = EngineConfig::from_json(r#"{"field":{"half_extent":1e308,"grid_step":1e308}}"#);
        assert!(matches!(cfg, Err(TuningError::InvalidConfig(_))));

        let mut cfg = EngineConfig::default();
        cfg.field.half_extent = 0.0;
        assert!(matches!(cfg.validate(), Err(TuningError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_uncentered_grid() {
        let mut cfg = EngineConfig::default();
        cfg.field.grid_step = 7.0;
        assert!(matches!(cfg.validate(), Err(TuningError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_non_positive_widths() {
        let mut cfg = EngineConfig::default();
        cfg.field.secondary_base = 0.0;
        assert!(cfg.validate().is_err());

        let mut cfg = EngineConfig::default();
        cfg.field.secondary_slope = -0.01;
        assert!(cfg.validate().is_err());

        let mut cfg = EngineConfig::default();
        cfg.field.primary_width = -8.0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_steps() {
        let mut cfg = EngineConfig::default();
        cfg.control.small_step = 0.0;
        assert!(cfg.validate().is_err());

        let mut cfg = EngineConfig::default();
        cfg.control.large_step = 0.5;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_rejects_oversized_grid() {
        let mut cfg = EngineConfig::default();
        cfg.field.grid_step = 0.01;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let cfg = EngineConfig::from_json(r#"{"field": {"grid_step": 2.0}}"#).unwrap();
        assert_eq!(cfg.field.grid_step, 2.0);
        assert_eq!(cfg.field.primary_width, 8.0);
        assert_eq!(cfg.control, ControlConfig::default());
    }

    #[test]
    fn test_yaml_config() {
        let yaml = "control:\n  large_step: 5.0\nfield:\n  half_extent: 90.0\n";
        let cfg = EngineConfig::from_yaml(yaml).unwrap();
        assert_eq!(cfg.control.large_step, 5.0);
        assert_eq!(cfg.field.grid_size(), 181);
    }

    #[test]
    fn test_invalid_json_config_rejected() {
        assert!(EngineConfig::from_json(r#"{"field": {"grid_step": -1.0}}"#).is_err());
        assert!(EngineConfig::from_json("not json").is_err());
    }

    #[test]
    fn test_config_serialization() {
        let cfg = EngineConfig::coarse();
        let json = cfg.to_json().unwrap();
        let parsed = EngineConfig::from_json(&json).unwrap();
        assert_eq!(parsed, cfg);
    }
}
