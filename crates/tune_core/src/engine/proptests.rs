//! Property-based tests for the engine invariants

use super::*;
use proptest::prelude::*;

const TOL: f64 = 1e-12;

fn small_config() -> EngineConfig {
    let mut cfg = EngineConfig::default();
    cfg.field.half_extent = 24.0;
    cfg
}

pub fn command_strategy() -> impl Strategy<Value = ControlCommand> {
    (0usize..8).prop_map(|i| ControlCommand::ALL[i])
}

pub fn large_command_strategy() -> impl Strategy<Value = ControlCommand> {
    prop_oneof![
        Just(ControlCommand::TuneDownLarge),
        Just(ControlCommand::TuneUpLarge),
        Just(ControlCommand::MatchDownLarge),
        Just(ControlCommand::MatchUpLarge),
    ]
}

pub fn origin_strategy() -> impl Strategy<Value = PlanePos> {
    (-24.0f64..24.0, -24.0f64..24.0)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// Property: every sample stays in [0, 1] for any reachable state
    #[test]
    fn prop_field_in_unit_range(
        origin in origin_strategy(),
        commands in prop::collection::vec(command_strategy(), 0..12)
    ) {
        let mut engine = TuningEngine::with_origin(small_config(), 0, origin).unwrap();
        for cmd in commands {
            let frame = engine.apply(cmd);
            prop_assert!(frame.grid.min_value() >= -TOL);
            prop_assert!(frame.grid.max_value() <= 1.0 + TOL);
            prop_assert!(frame.center_reflection >= -TOL);
        }
    }

    /// Property: the record never increases and never exceeds the readout
    #[test]
    fn prop_best_reflection_monotone(
        seed in any::<u64>(),
        commands in prop::collection::vec(command_strategy(), 1..20)
    ) {
        let mut engine = TuningEngine::new(small_config(), seed).unwrap();
        let mut previous = engine.current_frame().best_reflection;
        prop_assert!(previous <= 1.0);
        for cmd in commands {
            let frame = engine.apply(cmd);
            prop_assert!(frame.best_reflection <= previous);
            prop_assert!(frame.best_reflection <= frame.center_reflection);
            previous = frame.best_reflection;
        }
        let frame = engine.reset();
        prop_assert_eq!(frame.best_reflection, frame.center_reflection);
    }

    /// Property: trace holds one entry per command plus the initial sample
    #[test]
    fn prop_trace_length(
        seed in any::<u64>(),
        commands in prop::collection::vec(command_strategy(), 0..20)
    ) {
        let mut engine = TuningEngine::new(small_config(), seed).unwrap();
        let n = commands.len();
        engine.apply_all(commands);
        prop_assert_eq!(engine.current_frame().trace.len(), n + 1);
        prop_assert_eq!(engine.state().evaluations() as usize, n + 1);
    }

    /// Property: replaying the same commands from the same seed gives identical frames
    #[test]
    fn prop_deterministic_replay(
        seed in any::<u64>(),
        commands in prop::collection::vec(command_strategy(), 0..10)
    ) {
        let run = |cmds: &[ControlCommand]| {
            let mut engine = TuningEngine::new(small_config(), seed).unwrap();
            let mut sums = vec![engine.current_frame().checksum()];
            sums.extend(cmds.iter().map(|c| engine.apply(*c).checksum()));
            sums.push(engine.reset().checksum());
            sums
        };
        prop_assert_eq!(run(&commands), run(&commands));
    }

    /// Property: one large click lands where ten small clicks do
    #[test]
    fn prop_large_step_equivalence(origin in origin_strategy(), large in large_command_strategy()) {
        let small = ControlCommand::ALL
            .into_iter()
            .find(|c| c.axis() == large.axis() && c.sign() == large.sign() && c.step_size() == StepSize::Small)
            .unwrap();

        let mut a = TuningEngine::with_origin(small_config(), 0, origin).unwrap();
        let mut b = TuningEngine::with_origin(small_config(), 0, origin).unwrap();
        let fa = a.apply(large);
        let fb = b.apply_all(std::iter::repeat(small).take(10)).unwrap();

        prop_assert_eq!(fa.probe, fb.probe);
        prop_assert_eq!(fa.center_reflection, fb.center_reflection);
        prop_assert_eq!(&fa.grid, &fb.grid);
    }
}
