use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{CycleMode, TimerState};

/// Every state change of a timer produces an Event.
/// Front ends print or poll them; the focus tracker reacts to them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        phase_index: usize,
        label: String,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerResumed {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerStopped {
        at: DateTime<Utc>,
    },
    TimerReset {
        at: DateTime<Utc>,
    },
    PhaseCompleted {
        phase_index: usize,
        label: String,
        at: DateTime<Utc>,
    },
    /// The engine moved on to the next phase of the same run.
    PhaseStarted {
        phase_index: usize,
        label: String,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    SequenceCompleted {
        phase_count: usize,
        at: DateTime<Utc>,
    },
    /// Cycle driver flipped between work and break.
    ModeSwitched {
        mode: CycleMode,
        at: DateTime<Utc>,
    },
    /// A work phase ran to completion.
    FocusSessionCompleted {
        minutes: u64,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: TimerState,
        phase_index: usize,
        phase_label: String,
        remaining_secs: u64,
        phase_total_secs: u64,
        sequence_progress_pct: f64,
        at: DateTime<Utc>,
    },
}
