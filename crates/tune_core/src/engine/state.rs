//! Simulation state of one training session
//!
//! Owned exclusively by [`TuningEngine`](super::session::TuningEngine).
//! A reset replaces the whole value instead of clearing fields one by one.

use rand::Rng;

use super::config::{ControlConfig, FieldConfig};
use super::control::{ControlAxis, ControlCommand};
use super::field::Normalization;
use super::geometry::{probe_position, PlanePos};

/// Record value before any sample has been taken
pub const INITIAL_BEST_REFLECTION: f64 = 1.0;

/// Number of cosmetic quadrant values
pub const QUADRANT_COUNT: u8 = 4;

#[derive(Debug, Clone)]
pub struct SimulationState {
    /// Probe position at zero offsets
    origin: PlanePos,
    /// Accumulated tuning displacement (clicks)
    tuning_offset: f64,
    /// Accumulated matching displacement (clicks)
    matching_offset: f64,
    /// Every evaluated probe position, oldest first
    trace: Vec<PlanePos>,
    /// Lowest centre reflection seen this epoch
    best_reflection: f64,
    /// Cosmetic session attribute in 0..4; renderers may use it for styling
    quadrant: u8,
    normalization: Normalization,
    /// Field evaluations this epoch
    evaluations: u64,
    /// Commands applied this epoch
    commands_applied: u64,
    /// Reset counter, 0 for the state created at construction
    epoch: u64,
}

impl SimulationState {
    /// Fresh state with origin drawn uniformly from [-S, S) x [-S, S)
    pub fn new<R: Rng + ?Sized>(rng: &mut R, field: &FieldConfig) -> Self {
        let s = field.half_extent;
        let x = rng.gen_range(-s..s);
        let y = rng.gen_range(-s..s);
        let quadrant = rng.gen_range(0..QUADRANT_COUNT);
        Self::with_origin((x, y), quadrant)
    }

    /// Fresh state at a known origin
    pub fn with_origin(origin: PlanePos, quadrant: u8) -> Self {
        Self {
            origin,
            tuning_offset: 0.0,
            matching_offset: 0.0,
            trace: Vec::new(),
            best_reflection: INITIAL_BEST_REFLECTION,
            quadrant: quadrant % QUADRANT_COUNT,
            normalization: Normalization::Unset,
            evaluations: 0,
            commands_applied: 0,
            epoch: 0,
        }
    }

    pub(crate) fn with_epoch(mut self, epoch: u64) -> Self {
        self.epoch = epoch;
        self
    }

    // ========================
    // Accessors
    // ========================

    pub fn origin(&self) -> PlanePos {
        self.origin
    }

    pub fn tuning_offset(&self) -> f64 {
        self.tuning_offset
    }

    pub fn matching_offset(&self) -> f64 {
        self.matching_offset
    }

    pub fn trace(&self) -> &[PlanePos] {
        &self.trace
    }

    pub fn best_reflection(&self) -> f64 {
        self.best_reflection
    }

    pub fn quadrant(&self) -> u8 {
        self.quadrant
    }

    pub fn normalization(&self) -> Normalization {
        self.normalization
    }

    pub fn evaluations(&self) -> u64 {
        self.evaluations
    }

    pub fn commands_applied(&self) -> u64 {
        self.commands_applied
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Current probe position
    pub fn probe_position(&self, control: &ControlConfig) -> PlanePos {
        probe_position(self.origin, self.tuning_offset, self.matching_offset, control)
    }

    // ========================
    // Mutation (engine only)
    // ========================

    pub(crate) fn apply_command(&mut self, command: ControlCommand, control: &ControlConfig) {
        let delta = command.displacement(control);
        match command.axis() {
            ControlAxis::Tuning => self.tuning_offset += delta,
            ControlAxis::Matching => self.matching_offset += delta,
        }
        self.commands_applied += 1;
    }

    pub(crate) fn record_visit(&mut self, position: PlanePos) {
        self.trace.push(position);
        self.evaluations += 1;
    }

    pub(crate) fn normalization_mut(&mut self) -> &mut Normalization {
        &mut self.normalization
    }

    /// Fold a centre reading into the record; true if it improved.
    pub(crate) fn record_reflection(&mut self, center: f64) -> bool {
        if center < self.best_reflection {
            self.best_reflection = center;
            true
        } else {
            false
        }
    }
}
