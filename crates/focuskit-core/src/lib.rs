//! # focuskit Core Library
//!
//! This library provides the core logic for focuskit: a focus timer,
//! step-by-step routines and daily habits. All operations are available via
//! the standalone `focuskit` CLI, which is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Timer Engine**: a tick-driven state machine over a phase sequence;
//!   the caller delivers one `tick()` per second
//! - **Cycle Driver**: alternates work and break sequences on top of the
//!   engine and announces each switch
//! - **Streaks**: consecutive-day counts recomputed from a day set
//! - **Storage**: typed key-value contract backed by SQLite, plus
//!   TOML-based configuration
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Core timer state machine
//! - [`CycleDriver`]: Work/break auto-cycling
//! - [`StreakState`]: Current and best streak
//! - [`KeyValueStore`]: Persistence contract
//! - [`Config`]: Application configuration management

pub mod clock;
pub mod error;
pub mod events;
pub mod focus;
pub mod habit;
pub mod notify;
pub mod routine;
pub mod storage;
pub mod streak;
pub mod timer;

pub use clock::Ticker;
pub use error::{ConfigError, CoreError, StoreError, TimerError};
pub use events::Event;
pub use focus::{FocusStats, FocusTracker};
pub use habit::{Habit, HabitTracker};
pub use notify::{LogSink, Notification, NotificationSink, NullSink, RecordingSink};
pub use routine::{Routine, RoutineLibrary};
pub use storage::{Config, KeyValueStore, MemoryStore, SqliteStore, StoreKey};
pub use streak::{current_streak, StreakState};
pub use timer::{CycleDriver, CycleMode, Phase, PhaseSequence, TimerEngine, TimerRun, TimerState};
