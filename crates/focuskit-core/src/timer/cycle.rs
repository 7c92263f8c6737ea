//! Work/break cycle driver for the focus timer.
//!
//! Wraps a [`TimerEngine`] running a single-phase sequence. When that
//! sequence completes the driver flips the mode, notifies the sink and
//! starts the alternate sequence, so the engine itself never knows about
//! work or breaks.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::engine::{TimerEngine, TimerState};
use super::phase::{Phase, PhaseSequence};
use crate::error::TimerError;
use crate::events::Event;
use crate::notify::{Notification, NotificationSink};

pub const DEFAULT_WORK_MINUTES: u64 = 25;
pub const DEFAULT_BREAK_MINUTES: u64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CycleMode {
    Work,
    Break,
}

impl CycleMode {
    pub fn toggled(self) -> Self {
        match self {
            CycleMode::Work => CycleMode::Break,
            CycleMode::Break => CycleMode::Work,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CycleMode::Work => "Work",
            CycleMode::Break => "Break",
        }
    }

    /// What to announce when this mode begins.
    pub fn notification(self) -> Notification {
        let (title, body) = match self {
            CycleMode::Work => ("Focus Time Started", "Let's focus!"),
            CycleMode::Break => ("Break Time Started", "Time to recharge!"),
        };
        Notification {
            title: title.into(),
            body: body.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleDriver {
    mode: CycleMode,
    work_minutes: u64,
    break_minutes: u64,
    #[serde(default)]
    engine: TimerEngine,
}

impl Default for CycleDriver {
    fn default() -> Self {
        Self {
            mode: CycleMode::Work,
            work_minutes: DEFAULT_WORK_MINUTES,
            break_minutes: DEFAULT_BREAK_MINUTES,
            engine: TimerEngine::new(),
        }
    }
}

impl CycleDriver {
    /// Create a driver in work mode. Both lengths must be at least a minute.
    pub fn new(work_minutes: u64, break_minutes: u64) -> Result<Self, TimerError> {
        Phase::from_minutes(CycleMode::Work.label(), work_minutes)?;
        Phase::from_minutes(CycleMode::Break.label(), break_minutes)?;
        Ok(Self {
            work_minutes,
            break_minutes,
            ..Self::default()
        })
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn mode(&self) -> CycleMode {
        self.mode
    }

    pub fn engine(&self) -> &TimerEngine {
        &self.engine
    }

    pub fn state(&self) -> TimerState {
        self.engine.state()
    }

    pub fn work_minutes(&self) -> u64 {
        self.work_minutes
    }

    pub fn break_minutes(&self) -> u64 {
        self.break_minutes
    }

    fn minutes_for(&self, mode: CycleMode) -> u64 {
        match mode {
            CycleMode::Work => self.work_minutes,
            CycleMode::Break => self.break_minutes,
        }
    }

    fn sequence_for(&self, mode: CycleMode) -> Result<PhaseSequence, TimerError> {
        Phase::from_minutes(mode.label(), self.minutes_for(mode)).map(PhaseSequence::single)
    }

    /// Seconds left in the current mode; a fresh full length when no run exists.
    pub fn remaining_secs(&self) -> u64 {
        match self.engine.run() {
            Some(_) => self.engine.remaining_secs(),
            None => self.minutes_for(self.mode).saturating_mul(60),
        }
    }

    pub fn snapshot(&self) -> Event {
        if self.engine.run().is_some() {
            return self.engine.snapshot();
        }
        let total = self.minutes_for(self.mode).saturating_mul(60);
        Event::StateSnapshot {
            state: TimerState::Idle,
            phase_index: 0,
            phase_label: self.mode.label().to_string(),
            remaining_secs: total,
            phase_total_secs: total,
            sequence_progress_pct: 0.0,
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start (or continue) counting down the current mode.
    ///
    /// Returns `Ok(None)` when already running.
    pub fn start(&mut self) -> Result<Option<Event>, TimerError> {
        match self.engine.state() {
            TimerState::Running => Ok(None),
            TimerState::Paused => Ok(self.engine.resume()),
            TimerState::Idle | TimerState::Finished => {
                let sequence = self.sequence_for(self.mode)?;
                self.engine.start(sequence).map(Some)
            }
        }
    }

    pub fn pause(&mut self) -> Option<Event> {
        self.engine.pause()
    }

    pub fn resume(&mut self) -> Option<Event> {
        self.engine.resume()
    }

    /// Rewind the current mode to its full length without starting.
    pub fn reset(&mut self) -> Option<Event> {
        self.engine.reset()
    }

    /// Drop the run and go back to an idle work timer.
    pub fn stop(&mut self) -> Option<Event> {
        self.mode = CycleMode::Work;
        self.engine.stop()
    }

    /// Change both lengths. An idle timer picks the new length up at once;
    /// a running or paused one at the next mode switch.
    pub fn set_durations(
        &mut self,
        work_minutes: u64,
        break_minutes: u64,
    ) -> Result<(), TimerError> {
        Phase::from_minutes(CycleMode::Work.label(), work_minutes)?;
        Phase::from_minutes(CycleMode::Break.label(), break_minutes)?;
        self.work_minutes = work_minutes;
        self.break_minutes = break_minutes;
        if matches!(self.engine.state(), TimerState::Idle | TimerState::Finished) {
            self.engine.stop();
        }
        Ok(())
    }

    /// Flip to the other mode and start it immediately.
    pub fn switch_mode(&mut self, sink: &dyn NotificationSink) -> Vec<Event> {
        self.mode = self.mode.toggled();
        debug!(mode = self.mode.label(), "cycle mode switched");
        sink.notify(&self.mode.notification());

        let mut events = vec![Event::ModeSwitched {
            mode: self.mode,
            at: Utc::now(),
        }];
        match self
            .sequence_for(self.mode)
            .and_then(|sequence| self.engine.start(sequence))
        {
            Ok(started) => events.push(started),
            Err(err) => warn!(error = %err, "could not start next cycle phase"),
        }
        events
    }

    /// Advance one second, switching modes when the current one runs out.
    pub fn tick(&mut self, sink: &dyn NotificationSink) -> Vec<Event> {
        let mut events = self.engine.tick();
        let finished = events
            .iter()
            .any(|e| matches!(e, Event::SequenceCompleted { .. }));
        if !finished {
            return events;
        }

        if self.mode == CycleMode::Work {
            // Lengths may have changed mid-run; report what was actually worked.
            let minutes = self
                .engine
                .current_phase()
                .map(|p| p.duration_secs() / 60)
                .unwrap_or(self.work_minutes);
            events.push(Event::FocusSessionCompleted {
                minutes,
                at: Utc::now(),
            });
        }
        events.extend(self.switch_mode(sink));
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::RecordingSink;

    fn tick_n(driver: &mut CycleDriver, sink: &dyn NotificationSink, n: u64) -> Vec<Event> {
        (0..n).flat_map(|_| driver.tick(sink)).collect()
    }

    #[test]
    fn rejects_zero_lengths() {
        assert!(CycleDriver::new(0, 5).is_err());
        assert!(CycleDriver::new(25, 0).is_err());
    }

    #[test]
    fn idle_driver_reports_full_work_length() {
        let driver = CycleDriver::new(25, 5).unwrap();
        assert_eq!(driver.state(), TimerState::Idle);
        assert_eq!(driver.remaining_secs(), 25 * 60);
        match driver.snapshot() {
            Event::StateSnapshot { phase_label, .. } => assert_eq!(phase_label, "Work"),
            other => panic!("Expected StateSnapshot, got {other:?}"),
        }
    }

    #[test]
    fn work_completion_switches_to_break_and_notifies() {
        let sink = RecordingSink::new();
        let mut driver = CycleDriver::new(1, 1).unwrap();
        driver.start().unwrap();

        let events = tick_n(&mut driver, &sink, 60);
        assert!(events
            .iter()
            .any(|e| matches!(e, Event::FocusSessionCompleted { minutes: 1, .. })));
        assert!(events
            .iter()
            .any(|e| matches!(e, Event::ModeSwitched { mode: CycleMode::Break, .. })));
        assert_eq!(driver.mode(), CycleMode::Break);
        assert_eq!(driver.state(), TimerState::Running);
        assert_eq!(driver.remaining_secs(), 60);

        let received = sink.received();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].title, "Break Time Started");
        assert_eq!(received[0].body, "Time to recharge!");
    }

    #[test]
    fn break_completion_returns_to_work_without_session() {
        let sink = RecordingSink::new();
        let mut driver = CycleDriver::new(1, 1).unwrap();
        driver.start().unwrap();
        tick_n(&mut driver, &sink, 60);

        let events = tick_n(&mut driver, &sink, 60);
        assert!(!events
            .iter()
            .any(|e| matches!(e, Event::FocusSessionCompleted { .. })));
        assert_eq!(driver.mode(), CycleMode::Work);
        assert_eq!(sink.received()[1].title, "Focus Time Started");
    }

    #[test]
    fn start_resumes_when_paused() {
        let mut driver = CycleDriver::new(1, 1).unwrap();
        driver.start().unwrap();
        driver.pause();
        let event = driver.start().unwrap();
        assert!(matches!(event, Some(Event::TimerResumed { .. })));
        assert!(driver.start().unwrap().is_none());
    }

    #[test]
    fn reset_keeps_mode_and_restores_length() {
        let sink = RecordingSink::new();
        let mut driver = CycleDriver::new(2, 1).unwrap();
        driver.start().unwrap();
        tick_n(&mut driver, &sink, 30);
        driver.reset();
        assert_eq!(driver.state(), TimerState::Idle);
        assert_eq!(driver.remaining_secs(), 120);
        assert_eq!(driver.mode(), CycleMode::Work);
    }

    #[test]
    fn set_durations_applies_to_idle_timer() {
        let mut driver = CycleDriver::new(25, 5).unwrap();
        driver.set_durations(50, 10).unwrap();
        assert_eq!(driver.remaining_secs(), 50 * 60);
        assert!(driver.set_durations(0, 10).is_err());
        assert_eq!(driver.work_minutes(), 50);
    }

    #[test]
    fn duration_change_mid_run_reports_worked_minutes() {
        let sink = RecordingSink::new();
        let mut driver = CycleDriver::new(1, 1).unwrap();
        driver.start().unwrap();
        driver.set_durations(50, 1).unwrap();
        assert_eq!(driver.remaining_secs(), 60);

        let events = tick_n(&mut driver, &sink, 60);
        let minutes: Vec<u64> = events
            .iter()
            .filter_map(|e| match e {
                Event::FocusSessionCompleted { minutes, .. } => Some(*minutes),
                _ => None,
            })
            .collect();
        assert_eq!(minutes, vec![1]);
        assert_eq!(driver.work_minutes(), 50);
    }

    #[test]
    fn corrupt_persisted_driver_loads_as_none() {
        use crate::storage::{load_json, KeyValueStore, MemoryStore, StoreKey};

        let store = MemoryStore::new();
        let stuck = r#"{"mode":"work","work_minutes":25,"break_minutes":5,
            "engine":{"run":{"sequence":[],"current_index":0,"remaining_secs":0,"state":"running"}}}"#;
        store.set(StoreKey::FocusTimer, stuck.as_bytes()).unwrap();
        assert!(load_json::<CycleDriver>(&store, StoreKey::FocusTimer).is_none());
    }

    #[test]
    fn switch_mode_starts_immediately() {
        let sink = RecordingSink::new();
        let mut driver = CycleDriver::default();
        let events = driver.switch_mode(&sink);
        assert_eq!(driver.mode(), CycleMode::Break);
        assert_eq!(driver.state(), TimerState::Running);
        assert!(matches!(events.last(), Some(Event::TimerStarted { .. })));
    }

    #[test]
    fn stop_returns_to_idle_work() {
        let sink = RecordingSink::new();
        let mut driver = CycleDriver::new(1, 1).unwrap();
        driver.start().unwrap();
        tick_n(&mut driver, &sink, 60);
        assert!(driver.stop().is_some());
        assert_eq!(driver.mode(), CycleMode::Work);
        assert_eq!(driver.state(), TimerState::Idle);
    }
}
