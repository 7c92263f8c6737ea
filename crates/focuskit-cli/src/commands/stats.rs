use clap::Subcommand;
use focuskit_core::{FocusTracker, HabitTracker};
use serde::Serialize;

use super::{open_store, print_json, today, CmdResult};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Last focus session and focus streak
    Focus,
    /// Current and best streak per habit
    Habits,
}

#[derive(Serialize)]
struct HabitStreak<'a> {
    id: String,
    title: &'a str,
    current_streak: u32,
    best_streak: u32,
    done_today: bool,
}

pub fn run(action: StatsAction) -> CmdResult {
    let store = open_store()?;
    let today = today();

    match action {
        StatsAction::Focus => {
            let mut tracker = FocusTracker::load(&store);
            tracker.refresh(today);
            print_json(&tracker.stats(today))?;
        }
        StatsAction::Habits => {
            let mut tracker = HabitTracker::load(&store);
            tracker.refresh(today);
            let rows: Vec<HabitStreak<'_>> = tracker
                .list()
                .iter()
                .map(|h| HabitStreak {
                    id: h.id.to_string(),
                    title: &h.title,
                    current_streak: h.streak.current(),
                    best_streak: h.streak.best(),
                    done_today: h.streak.contains(today),
                })
                .collect();
            print_json(&rows)?;
        }
    }
    Ok(())
}
