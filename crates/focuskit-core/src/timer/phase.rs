use serde::{Deserialize, Serialize};

use crate::error::TimerError;

/// One named, timed segment of a run.
///
/// The duration is validated on construction and again on deserialization,
/// so a `Phase` in hand always lasts at least one second.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPhase")]
pub struct Phase {
    label: String,
    duration_secs: u64,
    completed: bool,
}

#[derive(Deserialize)]
struct RawPhase {
    label: String,
    duration_secs: u64,
    #[serde(default)]
    completed: bool,
}

impl TryFrom<RawPhase> for Phase {
    type Error = TimerError;

    fn try_from(raw: RawPhase) -> Result<Self, Self::Error> {
        let mut phase = Phase::new(raw.label, raw.duration_secs)?;
        phase.completed = raw.completed;
        Ok(phase)
    }
}

impl Phase {
    pub fn new(label: impl Into<String>, duration_secs: u64) -> Result<Self, TimerError> {
        let label = label.into();
        if duration_secs == 0 {
            return Err(TimerError::InvalidPhase { label });
        }
        Ok(Self {
            label,
            duration_secs,
            completed: false,
        })
    }

    /// Convenience for minute-based phases (focus timer).
    ///
    /// Uses saturating arithmetic to prevent overflow with large values.
    pub fn from_minutes(label: impl Into<String>, minutes: u64) -> Result<Self, TimerError> {
        Self::new(label, minutes.saturating_mul(60))
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn duration_secs(&self) -> u64 {
        self.duration_secs
    }

    pub fn completed(&self) -> bool {
        self.completed
    }

    pub(crate) fn set_completed(&mut self, completed: bool) {
        self.completed = completed;
    }
}

/// Ordered list of phases the engine counts through.
///
/// A sequence may be empty while it is being edited; the engine refuses to
/// start one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhaseSequence {
    phases: Vec<Phase>,
}

impl PhaseSequence {
    pub fn new(phases: Vec<Phase>) -> Self {
        Self { phases }
    }

    /// Build from `(label, duration_secs)` pairs, failing on the first
    /// zero-length phase.
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self, TimerError>
    where
        I: IntoIterator<Item = (S, u64)>,
        S: Into<String>,
    {
        let phases = pairs
            .into_iter()
            .map(|(label, secs)| Phase::new(label, secs))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { phases })
    }

    /// A sequence holding exactly one phase.
    pub fn single(phase: Phase) -> Self {
        Self {
            phases: vec![phase],
        }
    }

    pub fn len(&self) -> usize {
        self.phases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Phase> {
        self.phases.get(index)
    }

    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    /// Saturates at `u64::MAX`.
    pub fn total_duration_secs(&self) -> u64 {
        self.phases
            .iter()
            .map(|p| p.duration_secs)
            .fold(0, u64::saturating_add)
    }

    /// Cumulative seconds up to (but not including) `index`.
    pub fn cumulative_secs(&self, index: usize) -> u64 {
        self.phases
            .iter()
            .take(index)
            .map(|p| p.duration_secs)
            .fold(0, u64::saturating_add)
    }

    pub fn all_completed(&self) -> bool {
        self.phases.iter().all(|p| p.completed)
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut Phase> {
        self.phases.get_mut(index)
    }

    pub(crate) fn clear_completed(&mut self) {
        for phase in &mut self.phases {
            phase.completed = false;
        }
    }

    /// Copy of this sequence with every `completed` flag cleared.
    pub fn fresh(&self) -> Self {
        let mut copy = self.clone();
        copy.clear_completed();
        copy
    }
}
