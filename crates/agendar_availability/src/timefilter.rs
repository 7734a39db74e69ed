// --- File: crates/agendar_availability/src/timefilter.rs ---
//! Removal of slots whose start has already elapsed "today".
//!
//! The business timezone decides both "is this date today" and "has this slot
//! passed". The caller supplies `now` already converted to that timezone, so
//! there is exactly one timezone source and the device timezone never leaks in.

use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;

use crate::models::DayAvailability;
use crate::slots::parse_label;

/// Keep only slots still in the future. Dates other than today pass through
/// unchanged; on today, a slot starting at or before `now` is dropped.
pub fn filter_elapsed(date: NaiveDate, slots: &[String], now: DateTime<Tz>) -> Vec<String> {
    if date != now.date_naive() {
        return slots.to_vec();
    }
    let wall = now.time();
    slots
        .iter()
        .filter(|label| match parse_label(label) {
            Ok(start) => start > wall,
            // Malformed labels are a programming error upstream; keep them
            // visible rather than silently eating them here.
            Err(_) => true,
        })
        .cloned()
        .collect()
}

/// Apply the elapsed filter to a day entry in place, keeping
/// `has_availability` consistent with the surviving slots.
pub fn apply(day: &mut DayAvailability, now: DateTime<Tz>) {
    let Ok(date) = crate::expand::parse_date(&day.date) else {
        return;
    };
    day.available_slots = filter_elapsed(date, &day.available_slots, now);
    day.has_availability = !day.available_slots.is_empty();
}
