//! Routine management commands for CLI.

use clap::Subcommand;
use focuskit_core::{Phase, PhaseSequence, RoutineLibrary, Ticker, TimerEngine};

use super::{open_store, print_json, print_json_line, CmdResult};

#[derive(Subcommand)]
pub enum RoutineAction {
    /// Create a routine from ordered steps
    Add {
        /// Routine title
        title: String,
        /// Step as LABEL:DURATION, e.g. "Stretch:90" or "Shower:5m" (repeatable)
        #[arg(long = "step", required = true)]
        steps: Vec<String>,
    },
    /// List routines
    List,
    /// Show one routine
    Show {
        /// Routine ID or unique prefix
        id: String,
    },
    /// Delete a routine
    Delete {
        /// Routine ID or unique prefix
        id: String,
    },
    /// Run a routine live, one tick per second
    Run {
        /// Routine ID or unique prefix
        id: String,
    },
}

/// Parse `LABEL:DURATION`. Duration is seconds, or minutes with an `m` suffix.
fn parse_step(raw: &str) -> Result<Phase, Box<dyn std::error::Error>> {
    let (label, duration) = raw
        .rsplit_once(':')
        .ok_or_else(|| format!("step '{raw}' must look like LABEL:DURATION"))?;
    let label = label.trim();
    if label.is_empty() {
        return Err(format!("step '{raw}' has an empty label").into());
    }
    let duration = duration.trim();
    let phase = match duration.strip_suffix('m') {
        Some(minutes) => Phase::from_minutes(label, minutes.parse::<u64>()?)?,
        None => Phase::new(label, duration.trim_end_matches('s').parse::<u64>()?)?,
    };
    Ok(phase)
}

pub fn run(action: RoutineAction) -> CmdResult {
    let store = open_store()?;
    let mut library = RoutineLibrary::load(&store);

    match action {
        RoutineAction::Add { title, steps } => {
            let phases = steps
                .iter()
                .map(|s| parse_step(s))
                .collect::<Result<Vec<_>, _>>()?;
            let id = library.add(title, PhaseSequence::new(phases));
            eprintln!("Routine created: {id}");
            if let Some(routine) = library.get(id) {
                print_json(routine)?;
            }
        }
        RoutineAction::List => {
            print_json(library.list())?;
        }
        RoutineAction::Show { id } => {
            let routine = library
                .find(&id)
                .ok_or_else(|| format!("routine not found: {id}"))?;
            print_json(routine)?;
        }
        RoutineAction::Delete { id } => {
            let routine_id = library
                .find(&id)
                .map(|r| r.id)
                .ok_or_else(|| format!("routine not found: {id}"))?;
            library.delete(routine_id);
            eprintln!("Routine deleted: {routine_id}");
        }
        RoutineAction::Run { id } => {
            let routine_id = library
                .find(&id)
                .map(|r| r.id)
                .ok_or_else(|| format!("routine not found: {id}"))?;
            let sequence = library
                .sequence(routine_id)
                .ok_or_else(|| format!("routine not found: {id}"))?;
            run_live(sequence)?;
        }
    }
    Ok(())
}

fn run_live(sequence: PhaseSequence) -> CmdResult {
    let mut engine = TimerEngine::new();
    print_json_line(&engine.start(sequence)?)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let mut ticker = Ticker::every_second();
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        while engine.wants_ticks() {
            tokio::select! {
                _ = ticker.tick() => {
                    for event in engine.tick() {
                        print_json_line(&event)?;
                    }
                }
                _ = &mut ctrl_c => {
                    if let Some(event) = engine.stop() {
                        print_json_line(&event)?;
                    }
                }
            }
        }
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;

    tracing::debug!(state = ?engine.state(), "routine run ended");
    Ok(())
}
