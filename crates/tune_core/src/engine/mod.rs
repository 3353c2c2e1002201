//! Simulation engine: knob commands in, reflection frames out.

pub mod config;
pub mod control;
pub mod field;
pub mod frame;
pub mod geometry;
pub mod registry;
pub mod session;
pub mod state;

#[cfg(test)]
mod proptests;

pub use config::{ControlConfig, EngineConfig, FieldConfig};
pub use control::{ControlAxis, ControlCommand, StepSize};
pub use field::{contour_levels, Normalization, ReflectionField, ReflectionGrid};
pub use frame::Frame;
pub use geometry::PlanePos;
pub use registry::{SessionInfo, SessionRegistry};
pub use session::TuningEngine;
pub use state::SimulationState;
