//! Wall-clock seam.
//!
//! The core evaluates against caller-supplied `EvalInstant`s; this module is
//! the only place the service reads a clock.

use std::sync::Mutex;

use chrono::Local;
use grc_risk::EvalInstant;

/// Source of the current instant for all service operations.
pub trait Clock {
    fn now(&self) -> EvalInstant;
}

impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
    fn now(&self) -> EvalInstant {
        (**self).now()
    }
}

/// Local wall clock. Time-of-day is local because trading-hours and
/// forbidden-point config is written in the operator's local time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> EvalInstant {
        let now = Local::now();
        EvalInstant::new(now.timestamp(), now.format("%H:%M:%S").to_string())
    }
}

/// Settable clock for tests and replay harnesses.
pub struct ManualClock {
    current: Mutex<EvalInstant>,
}

impl ManualClock {
    pub fn new(instant: EvalInstant) -> Self {
        Self {
            current: Mutex::new(instant),
        }
    }

    pub fn set(&self, instant: EvalInstant) {
        *self.current.lock().unwrap_or_else(|e| e.into_inner()) = instant;
    }

    /// Advance epoch seconds without touching the time-of-day string.
    pub fn advance(&self, secs: i64) {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        current.epoch_secs += secs;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> EvalInstant {
        self.current
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_produces_wellformed_time_of_day() {
        let instant = SystemClock.now();
        assert_eq!(instant.time_of_day.len(), 8);
        let parts: Vec<&str> = instant.time_of_day.split(':').collect();
        assert_eq!(parts.len(), 3);
        assert!(instant.epoch_secs > 0);
    }

    #[test]
    fn manual_clock_set_and_advance() {
        let clock = ManualClock::new(EvalInstant::new(1_000, "10:00:00"));
        assert_eq!(clock.now().epoch_secs, 1_000);

        clock.advance(600);
        assert_eq!(clock.now().epoch_secs, 1_600);
        assert_eq!(clock.now().time_of_day, "10:00:00");

        clock.set(EvalInstant::new(5_000, "11:30:00"));
        assert_eq!(clock.now(), EvalInstant::new(5_000, "11:30:00"));
    }
}
