use clap::Subcommand;
use focuskit_core::storage::{load_json, save_json};
use focuskit_core::{
    Config, CycleDriver, Event, FocusTracker, KeyValueStore, NotificationSink, StoreKey, Ticker,
};

use super::{open_store, print_json, print_json_line, sink_for, today, CmdResult};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start or continue the focus timer
    Start,
    /// Pause the running timer
    Pause,
    /// Resume a paused timer
    Resume,
    /// Stop and return to an idle work timer
    Stop,
    /// Rewind the current work or break to its full length
    Reset,
    /// Advance the timer by whole seconds
    Tick {
        /// Number of one-second ticks to deliver
        #[arg(long, default_value = "1")]
        count: u64,
    },
    /// Switch between work and break immediately
    Switch,
    /// Print current timer state as JSON
    Status,
    /// Run the timer live, one tick per second, until interrupted
    Run {
        /// Stop after this many completed focus sessions
        #[arg(long)]
        sessions: Option<u32>,
    },
}

/// Restore the persisted driver, applying configured lengths to an idle timer.
fn load_driver(
    store: &dyn KeyValueStore,
    config: &Config,
) -> Result<CycleDriver, Box<dyn std::error::Error>> {
    match load_json::<CycleDriver>(store, StoreKey::FocusTimer) {
        Some(mut driver) => {
            driver.set_durations(config.timer.work_minutes, config.timer.break_minutes)?;
            Ok(driver)
        }
        None => Ok(config.cycle_driver()?),
    }
}

fn save_driver(store: &dyn KeyValueStore, driver: &CycleDriver) {
    save_json(store, StoreKey::FocusTimer, driver);
}

/// Print events and feed completed focus sessions into the history.
/// Returns how many focus sessions completed.
fn handle_events(
    events: &[Event],
    tracker: &mut FocusTracker<'_>,
) -> Result<u32, Box<dyn std::error::Error>> {
    let mut sessions = 0;
    for event in events {
        print_json_line(event)?;
        if tracker.record(event, today()) {
            sessions += 1;
        }
    }
    Ok(sessions)
}

pub fn run(action: TimerAction, config: &Config) -> CmdResult {
    let store = open_store()?;
    let sink = sink_for(config);
    let mut driver = load_driver(&store, config)?;
    let mut tracker = FocusTracker::load(&store);

    match action {
        TimerAction::Start => match driver.start()? {
            Some(event) => print_json(&event)?,
            None => print_json(&driver.snapshot())?,
        },
        TimerAction::Pause => match driver.pause() {
            Some(event) => print_json(&event)?,
            None => print_json(&driver.snapshot())?,
        },
        TimerAction::Resume => match driver.resume() {
            Some(event) => print_json(&event)?,
            None => print_json(&driver.snapshot())?,
        },
        TimerAction::Stop => {
            driver.stop();
            print_json(&driver.snapshot())?;
        }
        TimerAction::Reset => {
            driver.reset();
            print_json(&driver.snapshot())?;
        }
        TimerAction::Tick { count } => {
            for _ in 0..count {
                let events = driver.tick(sink.as_ref());
                handle_events(&events, &mut tracker)?;
            }
            print_json_line(&driver.snapshot())?;
        }
        TimerAction::Switch => {
            let events = driver.switch_mode(sink.as_ref());
            handle_events(&events, &mut tracker)?;
        }
        TimerAction::Status => {
            print_json(&driver.snapshot())?;
        }
        TimerAction::Run { sessions } => {
            run_live(&mut driver, &store, &mut tracker, sink.as_ref(), sessions)?;
        }
    }

    save_driver(&store, &driver);
    Ok(())
}

fn run_live(
    driver: &mut CycleDriver,
    store: &dyn KeyValueStore,
    tracker: &mut FocusTracker<'_>,
    sink: &dyn NotificationSink,
    limit: Option<u32>,
) -> CmdResult {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        if let Some(event) = driver.start()? {
            print_json_line(&event)?;
        }

        let mut ticker = Ticker::every_second();
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);
        let mut completed = 0;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let events = driver.tick(sink);
                    if events.is_empty() {
                        continue;
                    }
                    completed += handle_events(&events, tracker)?;
                    save_driver(store, driver);
                    if limit.is_some_and(|n| completed >= n) {
                        if let Some(event) = driver.stop() {
                            print_json_line(&event)?;
                        }
                        break;
                    }
                }
                _ = &mut ctrl_c => {
                    if let Some(event) = driver.pause() {
                        print_json_line(&event)?;
                    }
                    break;
                }
            }
        }
        Ok::<(), Box<dyn std::error::Error>>(())
    })
}
