use chrono::NaiveDate;
use clap::Subcommand;
use focuskit_core::HabitTracker;

use super::{open_store, print_json, today, CmdResult};

#[derive(Subcommand)]
pub enum HabitAction {
    /// Create a new habit
    Add {
        /// Habit title
        title: String,
    },
    /// List habits with their streaks
    List,
    /// Delete a habit
    Delete {
        /// Habit ID or unique prefix
        id: String,
    },
    /// Mark or unmark a day for a habit
    Toggle {
        /// Habit ID or unique prefix
        id: String,
        /// Day to toggle as YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

pub fn run(action: HabitAction) -> CmdResult {
    let store = open_store()?;
    let mut tracker = HabitTracker::load(&store);
    let today = today();

    match action {
        HabitAction::Add { title } => {
            let id = tracker.add(title);
            eprintln!("Habit created: {id}");
            if let Some(habit) = tracker.get(id) {
                print_json(habit)?;
            }
        }
        HabitAction::List => {
            tracker.refresh(today);
            print_json(tracker.list())?;
        }
        HabitAction::Delete { id } => {
            let habit_id = tracker
                .find(&id)
                .map(|h| h.id)
                .ok_or_else(|| format!("habit not found: {id}"))?;
            tracker.delete(habit_id);
            eprintln!("Habit deleted: {habit_id}");
        }
        HabitAction::Toggle { id, date } => {
            let habit_id = tracker
                .find(&id)
                .map(|h| h.id)
                .ok_or_else(|| format!("habit not found: {id}"))?;
            let day = date.unwrap_or(today);
            let habit = tracker
                .toggle(habit_id, day, today)
                .ok_or_else(|| format!("habit not found: {id}"))?;
            print_json(habit)?;
        }
    }
    Ok(())
}
