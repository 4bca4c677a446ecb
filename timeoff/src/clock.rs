//! Where "today" comes from.

use chrono::{Local, NaiveDate};

/// Source of the current calendar date.
///
/// Rules never read the system clock themselves; the handler asks its clock
/// once per command and passes the date down.
pub trait Clock: Send + Sync {
    /// Today's date.
    fn today(&self) -> NaiveDate;
}

/// The machine's local date.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock stuck on one date, for tests and replays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(NaiveDate);

impl FixedClock {
    /// Clock that always reports `today`.
    pub const fn new(today: NaiveDate) -> Self {
        Self(today)
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

impl<T: Clock + ?Sized> Clock for &T {
    fn today(&self) -> NaiveDate {
        (**self).today()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_reports_its_date() {
        let day = NaiveDate::from_ymd_opt(2026, 10, 18).expect("valid date");

        assert_eq!(FixedClock::new(day).today(), day);
    }

    fn read<C: Clock>(clock: C) -> NaiveDate {
        clock.today()
    }

    #[test]
    fn references_to_clocks_are_clocks() {
        let day = NaiveDate::from_ymd_opt(2026, 10, 18).expect("valid date");
        let clock = FixedClock::new(day);

        assert_eq!(read(&clock), day);
    }
}
