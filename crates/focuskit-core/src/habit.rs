//! Daily habits with per-habit streaks.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::storage::{load_json, save_json, KeyValueStore, StoreKey};
use crate::streak::StreakState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Habit {
    pub id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub streak: StreakState,
}

impl Habit {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            created_at: Utc::now(),
            streak: StreakState::new(),
        }
    }
}

pub struct HabitTracker<'a> {
    store: &'a dyn KeyValueStore,
    habits: Vec<Habit>,
}

impl<'a> HabitTracker<'a> {
    pub fn load(store: &'a dyn KeyValueStore) -> Self {
        Self {
            store,
            habits: load_json(store, StoreKey::Habits).unwrap_or_default(),
        }
    }

    pub fn list(&self) -> &[Habit] {
        &self.habits
    }

    pub fn get(&self, id: Uuid) -> Option<&Habit> {
        self.habits.iter().find(|h| h.id == id)
    }

    /// Look up by full id or an unambiguous id prefix.
    pub fn find(&self, id_or_prefix: &str) -> Option<&Habit> {
        if let Ok(id) = Uuid::parse_str(id_or_prefix) {
            return self.get(id);
        }
        let mut matches = self
            .habits
            .iter()
            .filter(|h| h.id.to_string().starts_with(id_or_prefix));
        match (matches.next(), matches.next()) {
            (Some(only), None) => Some(only),
            _ => None,
        }
    }

    pub fn add(&mut self, title: impl Into<String>) -> Uuid {
        let habit = Habit::new(title);
        let id = habit.id;
        debug!(%id, title = %habit.title, "habit added");
        self.habits.push(habit);
        self.save();
        id
    }

    pub fn delete(&mut self, id: Uuid) -> bool {
        let before = self.habits.len();
        self.habits.retain(|h| h.id != id);
        let removed = self.habits.len() != before;
        if removed {
            self.save();
        }
        removed
    }

    /// Flip `day` for a habit and recompute its streak against `today`.
    ///
    /// Returns the updated habit, or `None` for an unknown id.
    pub fn toggle(&mut self, id: Uuid, day: NaiveDate, today: NaiveDate) -> Option<&Habit> {
        let index = self.habits.iter().position(|h| h.id == id)?;
        let marked = self.habits[index].streak.toggle(day, today);
        debug!(%id, %day, marked, current = self.habits[index].streak.current(), "habit toggled");
        self.save();
        self.habits.get(index)
    }

    /// Recompute every streak for `today`.
    pub fn refresh(&mut self, today: NaiveDate) {
        for habit in &mut self.habits {
            habit.streak.recompute(today);
        }
        self.save();
    }

    pub fn save(&self) -> bool {
        save_json(self.store, StoreKey::Habits, &self.habits)
    }
}
