pub mod config;
pub mod habit;
pub mod routine;
pub mod stats;
pub mod timer;

use chrono::{Local, NaiveDate};
use focuskit_core::{Config, LogSink, NotificationSink, NullSink, SqliteStore};
use serde::Serialize;

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

pub fn open_store() -> Result<SqliteStore, Box<dyn std::error::Error>> {
    Ok(SqliteStore::open_default()?)
}

/// Calendar day in the user's local time zone.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn sink_for(config: &Config) -> Box<dyn NotificationSink> {
    if config.notifications.enabled {
        Box::new(LogSink)
    } else {
        Box::new(NullSink)
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// One compact JSON document per line, for event streams.
pub fn print_json_line<T: Serialize + ?Sized>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}
