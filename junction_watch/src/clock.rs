// THEORY:
// Every record the dashboard produces is stamped with a wall-clock label
// ("14:05:33"), and the peak-hour strategy needs the current hour. Both are
// read through the `Clock` trait so the engine can run against real local
// time in production and against a frozen instant in tests.

use chrono::{Local, Timelike};

/// Source of display timestamps.
pub trait Clock: Send + Sync {
    /// Current time formatted as `HH:MM:SS`.
    fn time_label(&self) -> String;
    /// Current hour of day, `0..24`.
    fn hour(&self) -> u32;
}

/// Local wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn time_label(&self) -> String {
        Local::now().format("%H:%M:%S").to_string()
    }

    fn hour(&self) -> u32 {
        Local::now().hour()
    }
}

/// A clock frozen at a fixed time of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock {
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

impl FixedClock {
    pub fn new(hour: u32, minute: u32, second: u32) -> Self {
        Self { hour: hour % 24, minute: minute % 60, second: second % 60 }
    }
}

impl Clock for FixedClock {
    fn time_label(&self) -> String {
        format!("{:02}:{:02}:{:02}", self.hour, self.minute, self.second)
    }

    fn hour(&self) -> u32 {
        self.hour
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_pads_label() {
        let clock = FixedClock::new(9, 5, 7);
        assert_eq!(clock.time_label(), "09:05:07");
        assert_eq!(clock.hour(), 9);
    }

    #[test]
    fn system_clock_label_shape() {
        let label = SystemClock.time_label();
        assert_eq!(label.len(), 8);
        assert_eq!(label.as_bytes()[2], b':');
        assert_eq!(label.as_bytes()[5], b':');
        assert!(SystemClock.hour() < 24);
    }
}
