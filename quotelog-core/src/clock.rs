//! Open/closed policy driving the polling scheduler.

use chrono::{DateTime, Timelike, Utc};
use quotelog_types::MarketHours;

/// Whether quotes should be polled at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketSession {
    /// Inside the configured UTC hour window.
    Open,
    /// Outside the window; the scheduler idles.
    Closed,
}

/// Pure function of wall-clock time to [`MarketSession`].
///
/// Only the UTC hour is consulted. Weekends and exchange holidays are not modelled,
/// so a Saturday afternoon counts as open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MarketClock {
    hours: MarketHours,
}

impl MarketClock {
    /// Build a clock for the given hour window.
    #[must_use]
    pub const fn new(hours: MarketHours) -> Self {
        Self { hours }
    }

    /// The configured hour window.
    #[must_use]
    pub const fn hours(&self) -> MarketHours {
        self.hours
    }

    /// True when `open_after_hour < hour(now) < close_before_hour`.
    #[must_use]
    pub fn is_open(&self, now: DateTime<Utc>) -> bool {
        let hour = now.hour();
        self.hours.open_after_hour < hour && hour < self.hours.close_before_hour
    }

    /// Session at `now`.
    #[must_use]
    pub fn session(&self, now: DateTime<Utc>) -> MarketSession {
        if self.is_open(now) {
            MarketSession::Open
        } else {
            MarketSession::Closed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 10, 8, hour, min, 0).unwrap()
    }

    #[test]
    fn default_window_is_13_to_20_inclusive() {
        let clock = MarketClock::default();
        assert!(clock.is_open(at(13, 0)));
        assert!(clock.is_open(at(20, 59)));
        assert!(!clock.is_open(at(12, 59)));
        assert!(!clock.is_open(at(21, 0)));
        assert!(!clock.is_open(at(0, 0)));
    }

    #[test]
    fn session_mirrors_is_open() {
        let clock = MarketClock::default();
        assert_eq!(clock.session(at(13, 0)), MarketSession::Open);
        assert_eq!(clock.session(at(12, 0)), MarketSession::Closed);
        assert_eq!(clock.session(at(21, 0)), MarketSession::Closed);
    }

    #[test]
    fn custom_window() {
        let clock = MarketClock::new(MarketHours {
            open_after_hour: 7,
            close_before_hour: 16,
        });
        assert!(clock.is_open(at(8, 0)));
        assert!(!clock.is_open(at(7, 30)));
        assert!(!clock.is_open(at(16, 0)));
    }

    #[test]
    fn weekends_are_not_special() {
        let saturday = Utc.with_ymd_and_hms(2024, 10, 12, 15, 0, 0).unwrap();
        assert!(MarketClock::default().is_open(saturday));
    }
}
