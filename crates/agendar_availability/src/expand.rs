// --- File: crates/agendar_availability/src/expand.rs ---
//! Inclusive calendar-day range expansion.
//!
//! All arithmetic happens on `NaiveDate`, never on local wall-clock instants,
//! so the host timezone can not shift a range off by one day.

use chrono::NaiveDate;

use crate::error::AvailabilityError;
use crate::models::{AvailabilityMap, DayAvailability};

/// Message attached to synthesized days no upstream rule produced.
pub const NO_EVENTS_MESSAGE: &str = "Sem eventos para agendamento";

/// An inclusive calendar date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, AvailabilityError> {
        if end < start {
            return Err(AvailabilityError::InvalidDateFormat(format!(
                "end date {} precedes start date {}",
                end, start
            )));
        }
        Ok(DateWindow { start, end })
    }

    pub fn single(date: NaiveDate) -> Self {
        DateWindow {
            start: date,
            end: date,
        }
    }

    /// Chronological iterator over every date in the window, inclusive.
    pub fn iter(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        let mut current = Some(self.start);
        let end = self.end;
        std::iter::from_fn(move || {
            let date = current?;
            if date > end {
                return None;
            }
            current = date.succ_opt();
            Some(date)
        })
    }
}

/// Parse a canonical YYYY-MM-DD date.
pub fn parse_date(value: &str) -> Result<NaiveDate, AvailabilityError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| AvailabilityError::InvalidDateFormat(value.to_string()))
}

/// Complete a partial map over the window: every missing date gets an
/// explicit unavailable entry carrying `missing_message`. Days the upstream
/// already produced pass through untouched.
pub fn fill_range(
    window: &DateWindow,
    mut partial: AvailabilityMap,
    missing_message: &str,
) -> AvailabilityMap {
    let mut complete = AvailabilityMap::new();
    for date in window.iter() {
        let key = date.format("%Y-%m-%d").to_string();
        let entry = partial
            .remove(&key)
            .unwrap_or_else(|| DayAvailability::unavailable(&key, missing_message));
        complete.insert(key, entry);
    }
    // Entries outside the window are dropped; the map's key set must equal
    // exactly the requested range.
    complete
}
