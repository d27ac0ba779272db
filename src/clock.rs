//! Calendar date source used for review scheduling and daily mission resets.
//!
//! All dates are date-only (`NaiveDate`); the whole game reads "today" from one
//! clock so review dates and mission resets never disagree.

use chrono::{Local, NaiveDate};

pub trait Clock: Send {
    fn today(&self) -> NaiveDate;
}

/// The device's local calendar date.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock pinned to a fixed date. Tests advance it with [`FixedClock::set`].
#[derive(Debug, Clone)]
pub struct FixedClock {
    date: std::sync::Arc<std::sync::Mutex<NaiveDate>>,
}

impl FixedClock {
    pub fn new(date: NaiveDate) -> Self {
        FixedClock {
            date: std::sync::Arc::new(std::sync::Mutex::new(date)),
        }
    }

    /// Move the clock; every clone observes the new date.
    pub fn set(&self, date: NaiveDate) {
        match self.date.lock() {
            Ok(mut g) => *g = date,
            Err(e) => *e.into_inner() = date,
        }
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        match self.date.lock() {
            Ok(g) => *g,
            Err(e) => *e.into_inner(),
        }
    }
}
