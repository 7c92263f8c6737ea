//! One-second clock source for live timers.
//!
//! The engines never look at the wall clock; this ticker is what turns real
//! time into `tick()` calls. A late tick is delayed rather than bursted, so
//! a suspended process resumes counting where it left off.

use std::time::Duration;

use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

pub struct Ticker {
    interval: Interval,
}

impl Ticker {
    pub fn every_second() -> Self {
        Self::new(Duration::from_secs(1))
    }

    /// First tick fires one `period` from now, not immediately.
    pub fn new(period: Duration) -> Self {
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval }
    }

    pub async fn tick(&mut self) {
        self.interval.tick().await;
    }
}
