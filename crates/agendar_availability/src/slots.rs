// --- File: crates/agendar_availability/src/slots.rs ---
//! The base-slot catalogue (working-hour grid).
//!
//! The catalogue is configuration, not a constant: an explicit label list
//! wins, otherwise the grid is derived from work start/end and the interval
//! between consecutive starts.

use agendar_config::ScheduleConfig;
use chrono::{NaiveTime, Timelike};

use crate::error::AvailabilityError;

const DEFAULT_WORK_START: &str = "13:30";
const DEFAULT_WORK_END: &str = "21:30";
const DEFAULT_INTERVAL_MINUTES: i64 = 120;
const DEFAULT_SLOT_DURATION_MINUTES: i64 = 60;

/// Ordered catalogue of bookable slot labels for one day.
#[derive(Debug, Clone)]
pub struct SlotCatalogue {
    slots: Vec<String>,
    duration_minutes: i64,
}

impl SlotCatalogue {
    /// Build the catalogue from schedule configuration.
    pub fn from_config(config: &ScheduleConfig) -> Self {
        let duration_minutes = config
            .slot_duration_minutes
            .unwrap_or(DEFAULT_SLOT_DURATION_MINUTES);

        if let Some(slots) = &config.base_slots {
            if !slots.is_empty() {
                return SlotCatalogue {
                    slots: slots.clone(),
                    duration_minutes,
                };
            }
        }

        let start = config.work_start.as_deref().unwrap_or(DEFAULT_WORK_START);
        let end = config.work_end.as_deref().unwrap_or(DEFAULT_WORK_END);
        let interval = config.interval_minutes.unwrap_or(DEFAULT_INTERVAL_MINUTES);
        SlotCatalogue {
            slots: derive_grid(start, end, interval),
            duration_minutes,
        }
    }

    /// The default catalogue (13:30 through 21:30, every two hours).
    pub fn default_catalogue() -> Self {
        SlotCatalogue {
            slots: derive_grid(
                DEFAULT_WORK_START,
                DEFAULT_WORK_END,
                DEFAULT_INTERVAL_MINUTES,
            ),
            duration_minutes: DEFAULT_SLOT_DURATION_MINUTES,
        }
    }

    /// Ordered base slot labels (HH:MM, ascending, no duplicates).
    pub fn base_slots(&self) -> &[String] {
        &self.slots
    }

    /// End label of a slot: start plus the slot duration, hour wrapping only.
    /// Business hours never cross midnight, so no day rollover is needed.
    pub fn slot_end(&self, label: &str) -> Result<String, AvailabilityError> {
        let start = parse_label(label)?;
        let total = start.hour() as i64 * 60 + start.minute() as i64 + self.duration_minutes;
        Ok(format!("{:02}:{:02}", (total / 60) % 24, total % 60))
    }

    /// The catalogue label whose start hour matches the given wall-clock hour.
    ///
    /// Busy intervals are mapped to booked slots through an exact hour match;
    /// an interval starting at an hour with no catalogue slot is ignored.
    pub fn label_for_hour(&self, hour: u32) -> Option<&str> {
        self.slots
            .iter()
            .find(|s| parse_label(s).map(|t| t.hour() == hour).unwrap_or(false))
            .map(|s| s.as_str())
    }

    /// Catalogue-adjacent labels (previous, next) of a slot, if any.
    pub fn neighbors(&self, label: &str) -> (Option<&str>, Option<&str>) {
        match self.slots.iter().position(|s| s == label) {
            Some(idx) => {
                let prev = idx.checked_sub(1).map(|i| self.slots[i].as_str());
                let next = self.slots.get(idx + 1).map(|s| s.as_str());
                (prev, next)
            }
            None => (None, None),
        }
    }
}

/// Parse an HH:MM label. Anything else is a programming error surfaced as
/// `InvalidSlotFormat`.
pub fn parse_label(label: &str) -> Result<NaiveTime, AvailabilityError> {
    NaiveTime::parse_from_str(label, "%H:%M")
        .map_err(|_| AvailabilityError::InvalidSlotFormat(label.to_string()))
}

fn derive_grid(start: &str, end: &str, interval_minutes: i64) -> Vec<String> {
    let (Ok(start), Ok(end)) = (parse_label(start), parse_label(end)) else {
        return Vec::new();
    };
    let interval = interval_minutes.max(1);
    let mut slots = Vec::new();
    let mut current = start.hour() as i64 * 60 + start.minute() as i64;
    let last = end.hour() as i64 * 60 + end.minute() as i64;
    while current <= last {
        slots.push(format!("{:02}:{:02}", current / 60, current % 60));
        current += interval;
    }
    slots
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalogue_is_the_half_hourly_grid() {
        let catalogue = SlotCatalogue::default_catalogue();
        assert_eq!(
            catalogue.base_slots(),
            &["13:30", "15:30", "17:30", "19:30", "21:30"]
        );
    }

    #[test]
    fn explicit_slot_list_wins_over_derivation() {
        let config = ScheduleConfig {
            base_slots: Some(vec!["09:00".into(), "10:00".into()]),
            work_start: Some("13:30".into()),
            ..Default::default()
        };
        let catalogue = SlotCatalogue::from_config(&config);
        assert_eq!(catalogue.base_slots(), &["09:00", "10:00"]);
    }

    #[test]
    fn grid_derivation_respects_interval() {
        let config = ScheduleConfig {
            work_start: Some("09:00".into()),
            work_end: Some("12:00".into()),
            interval_minutes: Some(60),
            ..Default::default()
        };
        let catalogue = SlotCatalogue::from_config(&config);
        assert_eq!(catalogue.base_slots(), &["09:00", "10:00", "11:00", "12:00"]);
    }

    #[test]
    fn slot_end_adds_the_duration() {
        let catalogue = SlotCatalogue::default_catalogue();
        assert_eq!(catalogue.slot_end("13:30").unwrap(), "14:30");
        assert_eq!(catalogue.slot_end("21:30").unwrap(), "22:30");
    }

    #[test]
    fn slot_end_wraps_the_hour_component_only() {
        let catalogue = SlotCatalogue::default_catalogue();
        assert_eq!(catalogue.slot_end("23:30").unwrap(), "00:30");
    }

    #[test]
    fn malformed_labels_are_invalid_slot_format() {
        let catalogue = SlotCatalogue::default_catalogue();
        assert!(matches!(
            catalogue.slot_end("25:99"),
            Err(AvailabilityError::InvalidSlotFormat(_))
        ));
        assert!(matches!(
            catalogue.slot_end("noon"),
            Err(AvailabilityError::InvalidSlotFormat(_))
        ));
    }

    #[test]
    fn label_for_hour_matches_exactly() {
        let catalogue = SlotCatalogue::default_catalogue();
        assert_eq!(catalogue.label_for_hour(15), Some("15:30"));
        assert_eq!(catalogue.label_for_hour(14), None);
    }

    #[test]
    fn neighbors_are_catalogue_adjacent() {
        let catalogue = SlotCatalogue::default_catalogue();
        assert_eq!(
            catalogue.neighbors("15:30"),
            (Some("13:30"), Some("17:30"))
        );
        assert_eq!(catalogue.neighbors("13:30"), (None, Some("15:30")));
        assert_eq!(catalogue.neighbors("21:30"), (Some("19:30"), None));
        assert_eq!(catalogue.neighbors("14:00"), (None, None));
    }
}
