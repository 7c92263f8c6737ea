//! Interval timer engine.
//!
//! The engine is a tick-driven state machine. It does not use internal
//! threads or read the wall clock - the caller delivers one `tick()` per
//! elapsed second and each tick decrements exactly one second.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running <-> Paused
//!            |
//!            v
//!         Finished
//! any -> Idle (stop / reset)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new();
//! engine.start(sequence)?;
//! // Once per second:
//! for event in engine.tick() { /* PhaseCompleted, SequenceCompleted, ... */ }
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::phase::{Phase, PhaseSequence};
use crate::error::TimerError;
use crate::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Idle,
    Running,
    Paused,
    Finished,
}

/// One pass through a phase sequence.
///
/// Restored runs are checked against their sequence: the index must name a
/// phase and the countdown cannot exceed that phase's length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRun")]
pub struct TimerRun {
    sequence: PhaseSequence,
    current_index: usize,
    remaining_secs: u64,
    state: TimerState,
}

#[derive(Deserialize)]
struct RawRun {
    sequence: PhaseSequence,
    current_index: usize,
    remaining_secs: u64,
    state: TimerState,
}

impl TryFrom<RawRun> for TimerRun {
    type Error = TimerError;

    fn try_from(raw: RawRun) -> Result<Self, Self::Error> {
        if raw.sequence.is_empty() {
            return Err(TimerError::EmptySequence);
        }
        let phase = raw.sequence.get(raw.current_index).ok_or_else(|| {
            TimerError::InvalidRun(format!(
                "phase index {} out of range for {} phases",
                raw.current_index,
                raw.sequence.len()
            ))
        })?;
        if raw.remaining_secs > phase.duration_secs() {
            return Err(TimerError::InvalidRun(format!(
                "{}s remaining in a {}s phase",
                raw.remaining_secs,
                phase.duration_secs()
            )));
        }
        Ok(Self {
            sequence: raw.sequence,
            current_index: raw.current_index,
            remaining_secs: raw.remaining_secs,
            state: raw.state,
        })
    }
}

impl TimerRun {
    pub fn sequence(&self) -> &PhaseSequence {
        &self.sequence
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn current_phase(&self) -> Option<&Phase> {
        self.sequence.get(self.current_index)
    }
}

/// Core timer engine.
///
/// Holds at most one [`TimerRun`]. No run means `Idle`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimerEngine {
    #[serde(default)]
    run: Option<TimerRun>,
}

impl TimerEngine {
    pub fn new() -> Self {
        Self { run: None }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.run.as_ref().map(|r| r.state).unwrap_or(TimerState::Idle)
    }

    pub fn run(&self) -> Option<&TimerRun> {
        self.run.as_ref()
    }

    /// Whether the clock source should be delivering ticks.
    pub fn wants_ticks(&self) -> bool {
        self.state() == TimerState::Running
    }

    pub fn phase_index(&self) -> usize {
        self.run.as_ref().map(|r| r.current_index).unwrap_or(0)
    }

    pub fn remaining_secs(&self) -> u64 {
        self.run.as_ref().map(|r| r.remaining_secs).unwrap_or(0)
    }

    pub fn current_phase(&self) -> Option<&Phase> {
        self.run.as_ref().and_then(TimerRun::current_phase)
    }

    pub fn phase_total_secs(&self) -> u64 {
        self.current_phase().map(Phase::duration_secs).unwrap_or(0)
    }

    /// 0.0 .. 1.0 progress within current phase.
    pub fn phase_progress(&self) -> f64 {
        let total = self.phase_total_secs();
        if total == 0 {
            return 0.0;
        }
        1.0 - (self.remaining_secs() as f64 / total as f64)
    }

    /// 0.0 .. 100.0 progress across the entire sequence.
    pub fn sequence_progress_pct(&self) -> f64 {
        let Some(run) = self.run.as_ref() else {
            return 0.0;
        };
        let total = run.sequence.total_duration_secs() as f64;
        if total == 0.0 {
            return 0.0;
        }
        let done = run
            .sequence
            .cumulative_secs(run.current_index)
            .saturating_add(self.phase_total_secs().saturating_sub(run.remaining_secs));
        (done as f64 / total * 100.0).min(100.0)
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            state: self.state(),
            phase_index: self.phase_index(),
            phase_label: self
                .current_phase()
                .map(|p| p.label().to_string())
                .unwrap_or_default(),
            remaining_secs: self.remaining_secs(),
            phase_total_secs: self.phase_total_secs(),
            sequence_progress_pct: self.sequence_progress_pct(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin a new run at phase 0, replacing any existing run.
    pub fn start(&mut self, sequence: PhaseSequence) -> Result<Event, TimerError> {
        let mut sequence = sequence;
        sequence.clear_completed();
        let first = sequence.get(0).ok_or(TimerError::EmptySequence)?;
        let duration_secs = first.duration_secs();
        let event = Event::TimerStarted {
            phase_index: 0,
            label: first.label().to_string(),
            duration_secs,
            at: Utc::now(),
        };
        debug!(phases = sequence.len(), label = first.label(), "timer started");
        self.run = Some(TimerRun {
            remaining_secs: duration_secs,
            current_index: 0,
            state: TimerState::Running,
            sequence,
        });
        Ok(event)
    }

    /// Start the current run's sequence again from phase 0.
    pub fn restart(&mut self) -> Result<Event, TimerError> {
        let sequence = self
            .run
            .as_ref()
            .map(|r| r.sequence.clone())
            .ok_or(TimerError::EmptySequence)?;
        self.start(sequence)
    }

    pub fn pause(&mut self) -> Option<Event> {
        let run = self.run.as_mut()?;
        if run.state != TimerState::Running {
            return None;
        }
        run.state = TimerState::Paused;
        debug!(remaining_secs = run.remaining_secs, "timer paused");
        Some(Event::TimerPaused {
            remaining_secs: run.remaining_secs,
            at: Utc::now(),
        })
    }

    pub fn resume(&mut self) -> Option<Event> {
        let run = self.run.as_mut()?;
        if run.state != TimerState::Paused {
            return None;
        }
        run.state = TimerState::Running;
        debug!(remaining_secs = run.remaining_secs, "timer resumed");
        Some(Event::TimerResumed {
            remaining_secs: run.remaining_secs,
            at: Utc::now(),
        })
    }

    /// Clear the run. Returns `None` if there was nothing to stop.
    pub fn stop(&mut self) -> Option<Event> {
        self.run.take()?;
        debug!("timer stopped");
        Some(Event::TimerStopped { at: Utc::now() })
    }

    /// Rewind to phase 0 without starting.
    pub fn reset(&mut self) -> Option<Event> {
        let run = self.run.as_mut()?;
        run.sequence.clear_completed();
        run.current_index = 0;
        run.remaining_secs = run
            .sequence
            .get(0)
            .map(Phase::duration_secs)
            .unwrap_or(0);
        run.state = TimerState::Idle;
        debug!("timer reset");
        Some(Event::TimerReset { at: Utc::now() })
    }

    /// Advance one second. Does nothing unless `Running`.
    ///
    /// Returns the events produced by this tick, in order.
    pub fn tick(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        let Some(run) = self.run.as_mut() else {
            return events;
        };
        if run.state != TimerState::Running {
            return events;
        }

        run.remaining_secs = run.remaining_secs.saturating_sub(1);
        if run.remaining_secs > 0 {
            return events;
        }

        let index = run.current_index;
        let Some(phase) = run.sequence.get_mut(index) else {
            return events;
        };
        phase.set_completed(true);
        debug!(index, label = phase.label(), "phase completed");
        events.push(Event::PhaseCompleted {
            phase_index: index,
            label: phase.label().to_string(),
            at: Utc::now(),
        });

        match run.sequence.get(index + 1) {
            Some(next) => {
                run.current_index = index + 1;
                run.remaining_secs = next.duration_secs();
                events.push(Event::PhaseStarted {
                    phase_index: index + 1,
                    label: next.label().to_string(),
                    duration_secs: next.duration_secs(),
                    at: Utc::now(),
                });
            }
            None => {
                run.state = TimerState::Finished;
                debug!(phases = run.sequence.len(), "sequence completed");
                events.push(Event::SequenceCompleted {
                    phase_count: run.sequence.len(),
                    at: Utc::now(),
                });
            }
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn work_break() -> PhaseSequence {
        PhaseSequence::from_pairs([("Work", 2), ("Break", 1)]).unwrap()
    }

    #[test]
    fn start_pause_resume() {
        let mut engine = TimerEngine::new();
        assert_eq!(engine.state(), TimerState::Idle);

        assert!(engine.start(work_break()).is_ok());
        assert_eq!(engine.state(), TimerState::Running);
        assert!(engine.wants_ticks());

        assert!(engine.pause().is_some());
        assert_eq!(engine.state(), TimerState::Paused);
        assert!(!engine.wants_ticks());
        assert!(engine.pause().is_none());

        assert!(engine.resume().is_some());
        assert_eq!(engine.state(), TimerState::Running);
        assert!(engine.resume().is_none());
    }

    #[test]
    fn work_break_scenario() {
        let mut engine = TimerEngine::new();
        engine.start(work_break()).unwrap();
        assert_eq!(engine.remaining_secs(), 2);

        assert!(engine.tick().is_empty());
        assert_eq!(engine.remaining_secs(), 1);

        let events = engine.tick();
        assert!(matches!(
            events.first(),
            Some(Event::PhaseCompleted { phase_index: 0, .. })
        ));
        assert_eq!(engine.phase_index(), 1);
        assert_eq!(engine.remaining_secs(), 1);
        assert_eq!(engine.state(), TimerState::Running);

        let events = engine.tick();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], Event::PhaseCompleted { phase_index: 1, .. }));
        assert!(matches!(events[1], Event::SequenceCompleted { phase_count: 2, .. }));
        assert_eq!(engine.state(), TimerState::Finished);
        assert_eq!(engine.phase_index(), 1);

        let run = engine.run().unwrap();
        assert!(run.sequence().all_completed());
        assert_eq!(engine.sequence_progress_pct(), 100.0);
    }

    #[test]
    fn tick_after_finished_is_noop() {
        let mut engine = TimerEngine::new();
        engine
            .start(PhaseSequence::from_pairs([("Only", 1)]).unwrap())
            .unwrap();
        assert_eq!(engine.tick().len(), 2);
        assert!(engine.tick().is_empty());
        assert_eq!(engine.state(), TimerState::Finished);
    }

    #[test]
    fn tick_while_paused_or_idle_changes_nothing() {
        let mut engine = TimerEngine::new();
        assert!(engine.tick().is_empty());

        engine.start(work_break()).unwrap();
        engine.tick();
        engine.pause();
        let before = engine.run().cloned();
        assert!(engine.tick().is_empty());
        assert_eq!(engine.run().cloned(), before);

        engine.reset();
        let before = engine.run().cloned();
        assert!(engine.tick().is_empty());
        assert_eq!(engine.run().cloned(), before);
    }

    #[test]
    fn start_empty_sequence_fails() {
        let mut engine = TimerEngine::new();
        let err = engine.start(PhaseSequence::default()).unwrap_err();
        assert_eq!(err, TimerError::EmptySequence);
        assert_eq!(engine.state(), TimerState::Idle);
        assert!(engine.run().is_none());
    }

    #[test]
    fn reset_goes_to_beginning() {
        let mut engine = TimerEngine::new();
        engine.start(work_break()).unwrap();
        engine.tick();
        engine.tick();
        assert_eq!(engine.phase_index(), 1);

        assert!(engine.reset().is_some());
        assert_eq!(engine.phase_index(), 0);
        assert_eq!(engine.remaining_secs(), 2);
        assert_eq!(engine.state(), TimerState::Idle);
        assert!(engine
            .run()
            .unwrap()
            .sequence()
            .phases()
            .iter()
            .all(|p| !p.completed()));
    }

    #[test]
    fn reset_without_run_is_noop() {
        let mut engine = TimerEngine::new();
        assert!(engine.reset().is_none());
        assert_eq!(engine.state(), TimerState::Idle);
    }

    #[test]
    fn restart_after_reset_runs_again() {
        let mut engine = TimerEngine::new();
        engine.start(work_break()).unwrap();
        engine.tick();
        engine.reset();
        assert!(engine.restart().is_ok());
        assert_eq!(engine.state(), TimerState::Running);
        assert_eq!(engine.remaining_secs(), 2);

        engine.stop();
        assert_eq!(engine.restart().unwrap_err(), TimerError::EmptySequence);
    }

    #[test]
    fn stop_clears_run() {
        let mut engine = TimerEngine::new();
        assert!(engine.stop().is_none());
        engine.start(work_break()).unwrap();
        assert!(engine.stop().is_some());
        assert!(engine.run().is_none());
        assert_eq!(engine.state(), TimerState::Idle);
        assert_eq!(engine.remaining_secs(), 0);
    }

    #[test]
    fn start_replaces_previous_run() {
        let mut engine = TimerEngine::new();
        engine.start(work_break()).unwrap();
        engine.tick();
        engine.tick();
        engine
            .start(PhaseSequence::from_pairs([("Stretch", 5)]).unwrap())
            .unwrap();
        assert_eq!(engine.phase_index(), 0);
        assert_eq!(engine.remaining_secs(), 5);
        assert_eq!(engine.current_phase().map(Phase::label), Some("Stretch"));
    }

    #[test]
    fn snapshot_returns_valid_event() {
        let mut engine = TimerEngine::new();
        engine.start(work_break()).unwrap();
        engine.tick();
        match engine.snapshot() {
            Event::StateSnapshot {
                state,
                phase_index,
                phase_label,
                remaining_secs,
                phase_total_secs,
                sequence_progress_pct,
                ..
            } => {
                assert_eq!(state, TimerState::Running);
                assert_eq!(phase_index, 0);
                assert_eq!(phase_label, "Work");
                assert_eq!(remaining_secs, 1);
                assert_eq!(phase_total_secs, 2);
                assert!((sequence_progress_pct - 100.0 / 3.0).abs() < 1e-9);
            }
            other => panic!("Expected StateSnapshot, got {other:?}"),
        }
    }

    #[test]
    fn phase_progress_tracks_current_phase() {
        let mut engine = TimerEngine::new();
        assert_eq!(engine.phase_progress(), 0.0);
        engine
            .start(PhaseSequence::from_pairs([("Plank", 4), ("Rest", 2)]).unwrap())
            .unwrap();
        assert_eq!(engine.phase_progress(), 0.0);
        engine.tick();
        assert!((engine.phase_progress() - 0.25).abs() < 1e-9);
        for _ in 0..3 {
            engine.tick();
        }
        assert_eq!(engine.phase_index(), 1);
        assert_eq!(engine.phase_progress(), 0.0);
    }

    #[test]
    fn inconsistent_stored_runs_are_rejected() {
        let empty = r#"{"run":{"sequence":[],"current_index":0,
            "remaining_secs":0,"state":"running"}}"#;
        assert!(serde_json::from_str::<TimerEngine>(empty).is_err());

        let phase = r#"{"label":"Work","duration_secs":2}"#;
        let out_of_range = format!(
            r#"{{"run":{{"sequence":[{phase}],"current_index":1,"remaining_secs":1,"state":"running"}}}}"#
        );
        assert!(serde_json::from_str::<TimerEngine>(&out_of_range).is_err());

        let overlong = format!(
            r#"{{"run":{{"sequence":[{phase}],"current_index":0,"remaining_secs":999,"state":"paused"}}}}"#
        );
        assert!(serde_json::from_str::<TimerEngine>(&overlong).is_err());

        let valid = format!(
            r#"{{"run":{{"sequence":[{phase}],"current_index":0,"remaining_secs":2,"state":"paused"}}}}"#
        );
        let engine: TimerEngine = serde_json::from_str(&valid).unwrap();
        assert_eq!(engine.state(), TimerState::Paused);
        assert_eq!(engine.remaining_secs(), 2);
    }

    #[test]
    fn engine_survives_json_roundtrip_mid_run() {
        let mut engine = TimerEngine::new();
        engine.start(work_break()).unwrap();
        engine.tick();
        engine.tick();
        let json = serde_json::to_string(&engine).unwrap();
        let mut restored: TimerEngine = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.run(), engine.run());
        let events = restored.tick();
        assert!(matches!(events.last(), Some(Event::SequenceCompleted { .. })));
    }
}
