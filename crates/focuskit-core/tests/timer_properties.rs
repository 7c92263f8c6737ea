//! Property tests for the timer engine and streak recompute.

use std::collections::BTreeSet;

use chrono::{Duration, NaiveDate};
use focuskit_core::{current_streak, Event, PhaseSequence, StreakState, TimerEngine, TimerState};
use proptest::prelude::*;

fn durations() -> impl Strategy<Value = Vec<u64>> {
    prop::collection::vec(1u64..20, 1..8)
}

fn sequence(durations: &[u64]) -> PhaseSequence {
    PhaseSequence::from_pairs(
        durations
            .iter()
            .enumerate()
            .map(|(i, d)| (format!("Phase {i}"), *d)),
    )
    .unwrap()
}

#[derive(Debug, Clone)]
enum Op {
    Tick,
    Pause,
    Resume,
    Reset,
    Stop,
    Restart,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        6 => Just(Op::Tick),
        1 => Just(Op::Pause),
        1 => Just(Op::Resume),
        1 => Just(Op::Reset),
        1 => Just(Op::Stop),
        1 => Just(Op::Restart),
    ]
}

proptest! {
    #[test]
    fn ticking_total_duration_completes_every_phase_in_order(durations in durations()) {
        let mut engine = TimerEngine::new();
        engine.start(sequence(&durations)).unwrap();

        let total: u64 = durations.iter().sum();
        let mut completed = Vec::new();
        let mut finished = 0;
        for _ in 0..total {
            for event in engine.tick() {
                match event {
                    Event::PhaseCompleted { phase_index, .. } => completed.push(phase_index),
                    Event::SequenceCompleted { .. } => finished += 1,
                    _ => {}
                }
            }
        }

        prop_assert_eq!(completed, (0..durations.len()).collect::<Vec<_>>());
        prop_assert_eq!(finished, 1);
        prop_assert_eq!(engine.state(), TimerState::Finished);
        prop_assert_eq!(engine.phase_index(), durations.len() - 1);
        prop_assert!(engine.run().unwrap().sequence().all_completed());
    }

    #[test]
    fn invariants_hold_under_any_operation_order(
        durations in durations(),
        ops in prop::collection::vec(op(), 0..200),
    ) {
        let mut engine = TimerEngine::new();
        engine.start(sequence(&durations)).unwrap();
        let mut last_index = 0;

        for op in ops {
            let before = engine.run().cloned();
            match op {
                Op::Tick => {
                    engine.tick();
                    if let Some(before) = &before {
                        if before.state() != TimerState::Running {
                            prop_assert_eq!(engine.run(), Some(before));
                        }
                    }
                }
                Op::Pause => { engine.pause(); }
                Op::Resume => { engine.resume(); }
                Op::Reset => {
                    engine.reset();
                    last_index = 0;
                }
                Op::Stop => {
                    engine.stop();
                    last_index = 0;
                }
                Op::Restart => {
                    let _ = engine.restart();
                    last_index = 0;
                }
            }

            if let Some(run) = engine.run() {
                let phase = run.current_phase().unwrap();
                prop_assert!(run.remaining_secs() <= phase.duration_secs());
                prop_assert!(run.current_index() >= last_index);
                last_index = run.current_index();
                if run.state() == TimerState::Finished {
                    prop_assert!(run.sequence().all_completed());
                    prop_assert_eq!(run.current_index(), run.sequence().len() - 1);
                }
            }
        }
    }

    #[test]
    fn reset_always_returns_to_first_phase(
        durations in durations(),
        ticks in 0u64..60,
    ) {
        let mut engine = TimerEngine::new();
        engine.start(sequence(&durations)).unwrap();
        for _ in 0..ticks {
            engine.tick();
        }
        engine.reset();
        let run = engine.run().unwrap();
        prop_assert_eq!(run.current_index(), 0);
        prop_assert_eq!(run.remaining_secs(), durations[0]);
        prop_assert_eq!(run.state(), TimerState::Idle);
        prop_assert!(run.sequence().phases().iter().all(|p| !p.completed()));
    }

    #[test]
    fn streak_recompute_is_idempotent_and_bounded(
        offsets in prop::collection::btree_set(0i64..30, 0..30),
        today_offset in 0i64..30,
    ) {
        let base = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let days: BTreeSet<NaiveDate> = offsets.iter().map(|o| base + Duration::days(*o)).collect();
        let today = base + Duration::days(today_offset);

        let mut state = StreakState::from_parts(days.clone(), 0, 0);
        let first = state.recompute(today);
        let second = state.recompute(today);
        prop_assert_eq!(first, second);
        prop_assert!(state.best() >= state.current());
        prop_assert_eq!(first, current_streak(&days, today));
        prop_assert!(first as usize <= days.len());
        if !days.contains(&today) {
            prop_assert_eq!(first, 0);
        }
    }
}
