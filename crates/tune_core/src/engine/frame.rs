//! Frame: read-only snapshot handed to the renderer
//!
//! A renderer may draw any subset of a frame (2-D map with trace, centre-row
//! sweep, reflection gauges); which panels are visible is its own business.

use std::sync::Arc;

use serde::Serialize;
use sha2::{Digest, Sha256};

use super::field::ReflectionGrid;
use super::geometry::PlanePos;

#[derive(Debug, Clone, Serialize)]
pub struct Frame {
    /// Normalized reflection surface (shared between frames of the same step)
    pub grid: Arc<ReflectionGrid>,
    /// Visited probe positions, oldest first
    pub trace: Vec<PlanePos>,
    /// Current probe position
    pub probe: PlanePos,
    pub tuning_offset: f64,
    pub matching_offset: f64,
    /// Live reflection readout: field value at (0, 0)
    pub center_reflection: f64,
    /// Lowest readout since the last reset
    pub best_reflection: f64,
    /// True when the evaluation that produced this frame lowered the record
    pub improved: bool,
    pub quadrant: u8,
    pub epoch: u64,
}

impl Frame {
    /// Centre-row sweep: field along x at y = 0
    pub fn sweep(&self) -> &[f64] {
        self.grid.center_row()
    }

    /// Shared x/y axis of the grid
    pub fn axis(&self) -> &[f64] {
        self.grid.axis()
    }

    /// SHA-256 over grid values, trace and readouts (little-endian f64 bytes)
    pub fn checksum(&self) -> String {
        let mut hasher = Sha256::new();
        for v in self.grid.values() {
            hasher.update(v.to_le_bytes());
        }
        for (x, y) in &self.trace {
            hasher.update(x.to_le_bytes());
            hasher.update(y.to_le_bytes());
        }
        hasher.update(self.center_reflection.to_le_bytes());
        hasher.update(self.best_reflection.to_le_bytes());
        format!("{:x}", hasher.finalize())
    }
}
