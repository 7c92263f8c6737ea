//! Focus-session history.
//!
//! Remembers the last completed focus session and which days had one, and
//! derives the focus streak from those days. Each value is stored under its
//! own key and loaded independently, so one corrupt entry only resets
//! itself.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::events::Event;
use crate::storage::{load_json, save_json, KeyValueStore, StoreKey};
use crate::streak::StreakState;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusStats {
    pub last_session_minutes: u64,
    pub last_session_at: Option<DateTime<Utc>>,
    pub current_streak: u32,
    pub best_streak: u32,
    pub focused_days: usize,
    pub focused_today: bool,
}

pub struct FocusTracker<'a> {
    store: &'a dyn KeyValueStore,
    last_session_minutes: u64,
    last_session_at: Option<DateTime<Utc>>,
    streak: StreakState,
}

impl<'a> FocusTracker<'a> {
    /// Load everything from `store`. Missing or unreadable keys default.
    pub fn load(store: &'a dyn KeyValueStore) -> Self {
        let days: BTreeSet<NaiveDate> =
            load_json(store, StoreKey::FocusedDays).unwrap_or_default();
        let current = load_json(store, StoreKey::CurrentStreak).unwrap_or_default();
        let best = load_json(store, StoreKey::BestStreak).unwrap_or_default();
        Self {
            store,
            last_session_minutes: load_json(store, StoreKey::LastSessionDuration)
                .unwrap_or_default(),
            last_session_at: load_json(store, StoreKey::LastSessionDate),
            streak: StreakState::from_parts(days, current, best),
        }
    }

    pub fn streak(&self) -> &StreakState {
        &self.streak
    }

    pub fn last_session_minutes(&self) -> u64 {
        self.last_session_minutes
    }

    pub fn last_session_at(&self) -> Option<DateTime<Utc>> {
        self.last_session_at
    }

    pub fn is_focused(&self, day: NaiveDate) -> bool {
        self.streak.contains(day)
    }

    /// Record a finished focus session and persist. Returns the new streak.
    pub fn complete_session(&mut self, minutes: u64, at: DateTime<Utc>, today: NaiveDate) -> u32 {
        self.last_session_minutes = minutes;
        self.last_session_at = Some(at);
        self.streak.mark(today, today);
        debug!(
            minutes,
            current = self.streak.current(),
            best = self.streak.best(),
            "focus session recorded"
        );
        self.save();
        self.streak.current()
    }

    /// React to a timer event. Only `FocusSessionCompleted` counts.
    pub fn record(&mut self, event: &Event, today: NaiveDate) -> bool {
        match event {
            Event::FocusSessionCompleted { minutes, at } => {
                self.complete_session(*minutes, *at, today);
                true
            }
            _ => false,
        }
    }

    /// Recompute the streak for `today` and persist the counters.
    pub fn refresh(&mut self, today: NaiveDate) -> u32 {
        let current = self.streak.recompute(today);
        self.save_counters();
        current
    }

    pub fn stats(&self, today: NaiveDate) -> FocusStats {
        FocusStats {
            last_session_minutes: self.last_session_minutes,
            last_session_at: self.last_session_at,
            current_streak: self.streak.current(),
            best_streak: self.streak.best(),
            focused_days: self.streak.completed_days().len(),
            focused_today: self.streak.contains(today),
        }
    }

    /// Write every key. Returns `false` if any write failed.
    pub fn save(&self) -> bool {
        let mut ok = save_json(
            self.store,
            StoreKey::LastSessionDuration,
            &self.last_session_minutes,
        );
        if let Some(at) = &self.last_session_at {
            ok &= save_json(self.store, StoreKey::LastSessionDate, at);
        }
        ok &= save_json(
            self.store,
            StoreKey::FocusedDays,
            self.streak.completed_days(),
        );
        ok &= self.save_counters();
        if !ok {
            warn!("focus history only partially saved");
        }
        ok
    }

    fn save_counters(&self) -> bool {
        let current = save_json(self.store, StoreKey::CurrentStreak, &self.streak.current());
        let best = save_json(self.store, StoreKey::BestStreak, &self.streak.best());
        current && best
    }
}
