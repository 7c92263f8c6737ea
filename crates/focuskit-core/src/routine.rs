//! Saved multi-step routines.
//!
//! A routine is a titled phase sequence. Running one is just starting a
//! [`TimerEngine`](crate::timer::TimerEngine) on [`RoutineLibrary::sequence`].

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::storage::{load_json, save_json, KeyValueStore, StoreKey};
use crate::timer::PhaseSequence;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Routine {
    pub id: Uuid,
    pub title: String,
    pub steps: PhaseSequence,
}

impl Routine {
    pub fn new(title: impl Into<String>, steps: PhaseSequence) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            steps,
        }
    }

    pub fn total_duration_secs(&self) -> u64 {
        self.steps.total_duration_secs()
    }
}

pub struct RoutineLibrary<'a> {
    store: &'a dyn KeyValueStore,
    routines: Vec<Routine>,
}

impl<'a> RoutineLibrary<'a> {
    pub fn load(store: &'a dyn KeyValueStore) -> Self {
        Self {
            store,
            routines: load_json(store, StoreKey::Routines).unwrap_or_default(),
        }
    }

    pub fn list(&self) -> &[Routine] {
        &self.routines
    }

    pub fn get(&self, id: Uuid) -> Option<&Routine> {
        self.routines.iter().find(|r| r.id == id)
    }

    /// Look up by full id or an unambiguous id prefix.
    pub fn find(&self, id_or_prefix: &str) -> Option<&Routine> {
        if let Ok(id) = Uuid::parse_str(id_or_prefix) {
            return self.get(id);
        }
        let mut matches = self
            .routines
            .iter()
            .filter(|r| r.id.to_string().starts_with(id_or_prefix));
        match (matches.next(), matches.next()) {
            (Some(only), None) => Some(only),
            _ => None,
        }
    }

    pub fn add(&mut self, title: impl Into<String>, steps: PhaseSequence) -> Uuid {
        let routine = Routine::new(title, steps.fresh());
        let id = routine.id;
        debug!(%id, title = %routine.title, steps = routine.steps.len(), "routine added");
        self.routines.push(routine);
        self.save();
        id
    }

    pub fn delete(&mut self, id: Uuid) -> bool {
        let before = self.routines.len();
        self.routines.retain(|r| r.id != id);
        let removed = self.routines.len() != before;
        if removed {
            self.save();
        }
        removed
    }

    /// The routine's steps ready to run, with completion flags cleared.
    pub fn sequence(&self, id: Uuid) -> Option<PhaseSequence> {
        self.get(id).map(|r| r.steps.fresh())
    }

    pub fn save(&self) -> bool {
        save_json(self.store, StoreKey::Routines, &self.routines)
    }
}
