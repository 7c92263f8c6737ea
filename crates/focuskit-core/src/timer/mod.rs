mod cycle;
mod engine;
mod phase;

pub use cycle::{CycleDriver, CycleMode, DEFAULT_BREAK_MINUTES, DEFAULT_WORK_MINUTES};
pub use engine::{TimerEngine, TimerRun, TimerState};
pub use phase::{Phase, PhaseSequence};
