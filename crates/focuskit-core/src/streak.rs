//! Consecutive-day streaks.
//!
//! A streak is always recomputed from the full set of completed days,
//! anchored at a caller-supplied `today`. Nothing is incremented in place,
//! so marking days out of order (backfilling yesterday after today) gives
//! the same answer as marking them in order.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Length of the run of consecutive marked days ending at `today`.
///
/// Zero when `today` itself is not marked.
pub fn current_streak(days: &BTreeSet<NaiveDate>, today: NaiveDate) -> u32 {
    let mut count = 0;
    let mut day = today;
    while days.contains(&day) {
        count += 1;
        match day.pred_opt() {
            Some(previous) => day = previous,
            None => break,
        }
    }
    count
}

/// Stored streaks go through [`StreakState::from_parts`], so `best` is never
/// below `current` after loading.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawStreak")]
pub struct StreakState {
    completed_days: BTreeSet<NaiveDate>,
    current: u32,
    best: u32,
}

#[derive(Deserialize)]
struct RawStreak {
    #[serde(default)]
    completed_days: BTreeSet<NaiveDate>,
    #[serde(default)]
    current: u32,
    #[serde(default)]
    best: u32,
}

impl From<RawStreak> for StreakState {
    fn from(raw: RawStreak) -> Self {
        Self::from_parts(raw.completed_days, raw.current, raw.best)
    }
}

impl StreakState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore persisted state. `best` is raised to `current` if needed.
    pub fn from_parts(completed_days: BTreeSet<NaiveDate>, current: u32, best: u32) -> Self {
        Self {
            completed_days,
            current,
            best: best.max(current),
        }
    }

    pub fn completed_days(&self) -> &BTreeSet<NaiveDate> {
        &self.completed_days
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn best(&self) -> u32 {
        self.best
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.completed_days.contains(&day)
    }

    /// Recompute `current` from the day set; `best` only ever grows.
    pub fn recompute(&mut self, today: NaiveDate) -> u32 {
        self.current = current_streak(&self.completed_days, today);
        self.best = self.best.max(self.current);
        self.current
    }

    /// Mark `day` complete. Returns `false` if it already was.
    pub fn mark(&mut self, day: NaiveDate, today: NaiveDate) -> bool {
        let inserted = self.completed_days.insert(day);
        self.recompute(today);
        inserted
    }

    /// Clear the mark on `day`. Returns `false` if it was not marked.
    pub fn unmark(&mut self, day: NaiveDate, today: NaiveDate) -> bool {
        let removed = self.completed_days.remove(&day);
        self.recompute(today);
        removed
    }

    /// Flip the mark on `day`. Returns whether the day is now marked.
    pub fn toggle(&mut self, day: NaiveDate, today: NaiveDate) -> bool {
        if self.completed_days.contains(&day) {
            self.unmark(day, today);
            false
        } else {
            self.mark(day, today);
            true
        }
    }
}
