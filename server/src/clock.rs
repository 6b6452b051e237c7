//! Injected time source for the booking logic.
//!
//! All "date is in the past" checks compare against [Clock::today] instead of reading the wall
//! clock directly, so tests can pin "now" to a fixed day.

use chrono::NaiveDate;

pub trait Clock: Send + Sync {
    /// The current calendar day at the server's local day boundary.
    fn today(&self) -> NaiveDate;
}

/// The production clock, reading the server-local date.
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}

/// A clock pinned to a fixed day, for tests.
#[cfg(test)]
pub struct FixedClock(pub NaiveDate);

#[cfg(test)]
impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
