//! Tuning Engine
//!
//! Single-writer session: each command or reset runs to completion
//! (state mutation, field evaluation, frame assembly) before returning.
//! The engine owns its random generator; the same seed always produces the
//! same sequence of origins, across resets too.

use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::config::EngineConfig;
use super::control::ControlCommand;
use super::field::{ReflectionField, ReflectionGrid};
use super::frame::Frame;
use super::geometry::PlanePos;
use super::state::{SimulationState, QUADRANT_COUNT};
use crate::error::Result;

pub struct TuningEngine {
    config: EngineConfig,
    field: ReflectionField,
    seed: u64,
    rng: ChaCha8Rng,
    state: SimulationState,
    /// Grid of the latest evaluation
    grid: Arc<ReflectionGrid>,
    /// Whether the latest evaluation lowered the record
    improved: bool,
}

impl TuningEngine {
    /// Create an engine with a random origin drawn from `seed`.
    pub fn new(config: EngineConfig, seed: u64) -> Result<Self> {
        config.validate()?;
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let state = SimulationState::new(&mut rng, &config.field);
        Self::build(config, seed, rng, state)
    }

    /// Create an engine whose first epoch starts at `origin`.
    ///
    /// Later resets draw new origins from `seed` as usual.
    pub fn with_origin(config: EngineConfig, seed: u64, origin: PlanePos) -> Result<Self> {
        config.validate()?;
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let quadrant = rng.gen_range(0..QUADRANT_COUNT);
        let state = SimulationState::with_origin(origin, quadrant);
        Self::build(config, seed, rng, state)
    }

    fn build(
        config: EngineConfig,
        seed: u64,
        rng: ChaCha8Rng,
        mut state: SimulationState,
    ) -> Result<Self> {
        let field = ReflectionField::new(config.field.clone())?;
        let (grid, improved) = Self::evaluate_state(&field, &config, &mut state);
        let engine = Self { config, field, seed, rng, state, grid: Arc::new(grid), improved };
        tracing::info!(
            seed,
            origin = ?engine.state.origin(),
            quadrant = engine.state.quadrant(),
            "tuning engine created"
        );
        Ok(engine)
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Turn a knob and return the resulting frame.
    pub fn apply(&mut self, command: ControlCommand) -> Frame {
        self.state.apply_command(command, &self.config.control);
        self.evaluate();
        tracing::debug!(
            command = %command,
            tuning_offset = self.state.tuning_offset(),
            matching_offset = self.state.matching_offset(),
            center = self.grid.center_value(),
            best = self.state.best_reflection(),
            "applied control command"
        );
        self.current_frame()
    }

    /// Apply a widget button code (1..=8); other codes are rejected.
    pub fn apply_code(&mut self, code: i64) -> Result<Frame> {
        let command = ControlCommand::from_code(code)?;
        Ok(self.apply(command))
    }

    /// Apply commands in order, returning the last frame (None if empty).
    pub fn apply_all<I>(&mut self, commands: I) -> Option<Frame>
    where
        I: IntoIterator<Item = ControlCommand>,
    {
        let mut last = None;
        for command in commands {
            self.state.apply_command(command, &self.config.control);
            self.evaluate();
            last = Some(command);
        }
        last.map(|_| self.current_frame())
    }

    /// Start a new epoch at a freshly drawn origin.
    pub fn reset(&mut self) -> Frame {
        let epoch = self.state.epoch() + 1;
        self.state = SimulationState::new(&mut self.rng, &self.config.field).with_epoch(epoch);
        self.after_reset()
    }

    /// Start a new epoch at a known origin.
    pub fn reset_with_origin(&mut self, origin: PlanePos) -> Frame {
        let epoch = self.state.epoch() + 1;
        let quadrant = self.state.quadrant();
        self.state = SimulationState::with_origin(origin, quadrant).with_epoch(epoch);
        self.after_reset()
    }

    fn after_reset(&mut self) -> Frame {
        self.evaluate();
        tracing::info!(
            epoch = self.state.epoch(),
            origin = ?self.state.origin(),
            quadrant = self.state.quadrant(),
            "simulation reset"
        );
        self.current_frame()
    }

    /// Frame for the current state, without stepping the simulation.
    pub fn current_frame(&self) -> Frame {
        let state = &self.state;
        Frame {
            grid: Arc::clone(&self.grid),
            trace: state.trace().to_vec(),
            probe: state.probe_position(&self.config.control),
            tuning_offset: state.tuning_offset(),
            matching_offset: state.matching_offset(),
            center_reflection: self.grid.center_value(),
            best_reflection: state.best_reflection(),
            improved: self.improved,
            quadrant: state.quadrant(),
            epoch: state.epoch(),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    fn evaluate(&mut self) {
        let (grid, improved) = Self::evaluate_state(&self.field, &self.config, &mut self.state);
        self.grid = Arc::new(grid);
        self.improved = improved;
    }

    /// One evaluation: record the probe position, sample the field, update the record.
    fn evaluate_state(
        field: &ReflectionField,
        config: &EngineConfig,
        state: &mut SimulationState,
    ) -> (ReflectionGrid, bool) {
        let probe = state.probe_position(&config.control);
        state.record_visit(probe);

        let grid = field.evaluate(probe, state.normalization_mut());
        let improved = state.record_reflection(grid.center_value());
        (grid, improved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::state::INITIAL_BEST_REFLECTION;
    use crate::error::TuningError;

    const EPS: f64 = 1e-9;

    fn small_config() -> EngineConfig {
        let mut cfg = EngineConfig::default();
        cfg.field.half_extent = 40.0;
        cfg
    }

    fn centered_engine() -> TuningEngine {
        TuningEngine::with_origin(small_config(), 1, (0.0, 0.0)).unwrap()
    }

    #[test]
    fn test_construction_evaluates_once() {
        let engine = TuningEngine::new(EngineConfig::default(), 42).unwrap();
        assert_eq!(engine.state().trace().len(), 1);
        assert_eq!(engine.state().evaluations(), 1);
        assert!(engine.state().normalization().is_frozen());

        let frame = engine.current_frame();
        assert_eq!(frame.grid.size(), 361);
        assert_eq!(frame.probe, engine.state().origin());
        assert_eq!(frame.trace, vec![engine.state().origin()]);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut cfg = EngineConfig::default();
        cfg.field.secondary_base = -1.0;
        assert!(matches!(
            TuningEngine::new(cfg, 1),
            Err(TuningError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_bad_extent_rejected_before_drawing_origin() {
        for half_extent in [0.0, -5.0, f64::NAN] {
            let mut cfg = EngineConfig::default();
            cfg.field.half_extent = half_extent;
            assert!(matches!(
                TuningEngine::new(cfg.clone(), 1),
                Err(TuningError::InvalidConfig(_))
            ));
            assert!(matches!(
                TuningEngine::with_origin(cfg, 1, (0.0, 0.0)),
                Err(TuningError::InvalidConfig(_))
            ));
        }

        let mut cfg = EngineConfig::default();
        cfg.field.half_extent = 1e308;
        cfg.field.grid_step = 1e308;
        assert!(matches!(TuningEngine::new(cfg, 1), Err(TuningError::InvalidConfig(_))));
    }

    #[test]
    fn test_center_is_zero_at_zero_offset() {
        let engine = centered_engine();
        let frame = engine.current_frame();
        assert!(frame.center_reflection.abs() < EPS);
        assert_eq!(frame.best_reflection, frame.center_reflection);
    }

    #[test]
    fn test_scenario_tune_match_tune() {
        let mut engine = centered_engine();
        engine.apply(ControlCommand::TuneUp);
        engine.apply(ControlCommand::MatchUp);
        let frame = engine.apply(ControlCommand::TuneDown);

        assert_eq!(frame.tuning_offset, 0.0);
        assert_eq!(frame.matching_offset, 1.0);
        assert!((frame.probe.0 - 150f64.to_radians().cos()).abs() < EPS);
        assert!((frame.probe.1 - 150f64.to_radians().sin()).abs() < EPS);
        assert!((frame.probe.0 + 0.866).abs() < 1e-3);
        assert!((frame.probe.1 - 0.5).abs() < 1e-3);
        assert!(frame.center_reflection > 0.0);
        assert_eq!(frame.trace.len(), 4);
    }

    #[test]
    fn test_large_step_equals_ten_small_steps() {
        let mut large = TuningEngine::with_origin(small_config(), 3, (5.0, -5.0)).unwrap();
        let mut small = TuningEngine::with_origin(small_config(), 3, (5.0, -5.0)).unwrap();

        let a = large.apply(ControlCommand::TuneUpLarge);
        let b = small.apply_all(std::iter::repeat(ControlCommand::TuneUp).take(10)).unwrap();

        assert_eq!(large.state().tuning_offset(), small.state().tuning_offset());
        assert_eq!(a.probe, b.probe);
        assert_eq!(a.center_reflection, b.center_reflection);
        assert_eq!(a.grid, b.grid);
        assert_eq!(b.trace.len(), 11);
    }

    #[test]
    fn test_best_reflection_monotone() {
        let mut engine = TuningEngine::new(small_config(), 9).unwrap();
        let mut previous = engine.current_frame().best_reflection;
        for cmd in ControlCommand::ALL.iter().cycle().take(40) {
            let frame = engine.apply(*cmd);
            assert!(frame.best_reflection <= previous);
            assert!(frame.best_reflection <= frame.center_reflection);
            previous = frame.best_reflection;
        }
    }

    #[test]
    fn test_reset_restores_record_and_trace() {
        let mut engine = centered_engine();
        engine.apply(ControlCommand::MatchUpLarge);
        engine.apply(ControlCommand::TuneDown);

        let frame = engine.reset();
        assert_eq!(frame.trace.len(), 1);
        assert_eq!(frame.tuning_offset, 0.0);
        assert_eq!(frame.matching_offset, 0.0);
        assert_eq!(frame.epoch, 1);
        assert_eq!(engine.state().commands_applied(), 0);
        assert!(frame.best_reflection <= INITIAL_BEST_REFLECTION);
        assert_eq!(frame.best_reflection, frame.center_reflection);
    }

    #[test]
    fn test_double_reset_record_equals_center() {
        let mut engine = TuningEngine::new(small_config(), 5).unwrap();
        let first = engine.reset();
        let second = engine.reset();
        assert_eq!(first.best_reflection, first.center_reflection);
        assert_eq!(second.best_reflection, second.center_reflection);
        assert_ne!(first.probe, second.probe);
    }

    #[test]
    fn test_reset_with_origin_recenters() {
        let mut engine = TuningEngine::new(small_config(), 11).unwrap();
        engine.apply(ControlCommand::TuneUpLarge);
        let frame = engine.reset_with_origin((0.0, 0.0));
        assert!(frame.center_reflection.abs() < EPS);
        assert!(engine.state().normalization().is_frozen());
    }

    #[test]
    fn test_current_frame_does_not_mutate() {
        let mut engine = centered_engine();
        engine.apply(ControlCommand::TuneUp);
        let before = engine.state().evaluations();
        let a = engine.current_frame();
        let b = engine.current_frame();
        assert_eq!(engine.state().evaluations(), before);
        assert_eq!(a.trace, b.trace);
        assert!(Arc::ptr_eq(&a.grid, &b.grid));
        assert_eq!(a.checksum(), b.checksum());
    }

    #[test]
    fn test_apply_code() {
        let mut engine = centered_engine();
        let frame = engine.apply_code(4).unwrap();
        assert_eq!(frame.tuning_offset, 10.0);
        assert!(matches!(engine.apply_code(9), Err(TuningError::UnknownControlCode(9))));
        // rejected code leaves the state untouched
        assert_eq!(engine.state().commands_applied(), 1);
        assert_eq!(engine.state().trace().len(), 2);
    }

    #[test]
    fn test_same_seed_same_frames() {
        let commands = [
            ControlCommand::TuneUpLarge,
            ControlCommand::MatchDown,
            ControlCommand::MatchDownLarge,
            ControlCommand::TuneDown,
        ];
        let run = |seed: u64| -> Vec<String> {
            let mut engine = TuningEngine::new(small_config(), seed).unwrap();
            let mut sums: Vec<String> = commands.iter().map(|c| engine.apply(*c).checksum()).collect();
            sums.push(engine.reset().checksum());
            sums
        };
        assert_eq!(run(77), run(77));
        assert_ne!(run(77), run(78));
    }

    #[test]
    fn test_improved_flag() {
        let mut engine = TuningEngine::with_origin(small_config(), 2, (3.0, 0.0)).unwrap();
        // first sample of an epoch always sets the record
        assert!(engine.current_frame().improved);

        // matching up pulls the probe towards (0, 0)
        let closer = engine.apply(ControlCommand::MatchUp);
        assert!(closer.improved);
        assert_eq!(closer.best_reflection, closer.center_reflection);

        let away = engine.apply(ControlCommand::MatchDownLarge);
        assert!(!away.improved);
        assert!(away.center_reflection > away.best_reflection);
        assert!(!engine.current_frame().improved);
    }
}
