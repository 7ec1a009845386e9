//! Wall-clock pacing.

use std::thread;
use std::time::Duration;

use crate::commands::ElevatorId;
use crate::config::TimingConfig;
use crate::traits::Pacer;

/// Sleeps the worker thread for each floor travelled and each door dwell.
///
/// # Example
///
/// ```rust
/// use elevator_bank::config::TimingConfig;
/// use elevator_bank::hal::SleepPacer;
/// use std::time::Duration;
///
/// let pacer = SleepPacer::from_config(&TimingConfig::default());
/// assert_eq!(pacer.travel_time(), Duration::from_secs(1));
/// assert_eq!(pacer.dwell_time(), Duration::from_secs(3));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SleepPacer {
    travel: Duration,
    dwell: Duration,
}

impl SleepPacer {
    /// Creates a pacer with explicit durations.
    pub fn new(travel: Duration, dwell: Duration) -> Self {
        Self { travel, dwell }
    }

    /// Creates a pacer from the timing section of a config.
    pub fn from_config(timing: &TimingConfig) -> Self {
        Self::new(timing.travel(), timing.dwell())
    }

    /// Time per floor.
    pub fn travel_time(&self) -> Duration {
        self.travel
    }

    /// Time the doors stay open.
    pub fn dwell_time(&self) -> Duration {
        self.dwell
    }
}

impl Default for SleepPacer {
    fn default() -> Self {
        Self::from_config(&TimingConfig::default())
    }
}

impl Pacer for SleepPacer {
    fn travel(&self, _elevator: ElevatorId) {
        if !self.travel.is_zero() {
            thread::sleep(self.travel);
        }
    }

    fn dwell(&self, _elevator: ElevatorId) {
        if !self.dwell.is_zero() {
            thread::sleep(self.dwell);
        }
    }
}
