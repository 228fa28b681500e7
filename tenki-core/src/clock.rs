//! Wall clock readings for the title strip

use core::fmt::Write;

use chrono::{DateTime, Local, TimeZone, Timelike};
use heapless::String;

/// Formatted clock fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockReading {
    /// e.g. `Sun. 06 05 2022`
    pub day: String<24>,
    /// e.g. `11:05:09`
    pub time: String<16>,
    /// Set during the last second of the day
    pub restart_due: bool,
}

impl ClockReading {
    pub fn from_datetime<Tz: TimeZone>(now: &DateTime<Tz>) -> Self
    where
        Tz::Offset: core::fmt::Display,
    {
        let mut day = String::new();
        let mut time = String::new();
        // Both formats have a fixed width well below capacity
        let _ = write!(day, "{}", now.format("%a. %m %d %Y"));
        let _ = write!(time, "{}", now.format("%H:%M:%S"));

        Self {
            day,
            time,
            restart_due: now.hour() == 23 && now.minute() == 59 && now.second() == 59,
        }
    }
}

/// Source of clock readings
pub trait WallClock {
    fn now(&self) -> ClockReading;
}

/// The host's local time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl WallClock for SystemClock {
    fn now(&self) -> ClockReading {
        ClockReading::from_datetime(&Local::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    #[test]
    fn test_formatting() {
        let jst = FixedOffset::east_opt(9 * 3600).unwrap();
        let now = jst.with_ymd_and_hms(2022, 6, 5, 11, 5, 9).unwrap();
        let reading = ClockReading::from_datetime(&now);
        assert_eq!(reading.day.as_str(), "Sun. 06 05 2022");
        assert_eq!(reading.time.as_str(), "11:05:09");
        assert!(!reading.restart_due);
    }

    #[test]
    fn test_restart_due_last_second_only() {
        let last = Utc.with_ymd_and_hms(2022, 6, 5, 23, 59, 59).unwrap();
        assert!(ClockReading::from_datetime(&last).restart_due);
        let before = Utc.with_ymd_and_hms(2022, 6, 5, 23, 59, 58).unwrap();
        assert!(!ClockReading::from_datetime(&before).restart_due);
    }
}
