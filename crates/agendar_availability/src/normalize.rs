// --- File: crates/agendar_availability/src/normalize.rs ---
//! Normalization of raw automation-backend payloads.
//!
//! The upstream has shipped at least five response shapes for the same data:
//! busy-interval lists, pre-filtered available lists, raw calendar events,
//! comma-joined compact strings and flat arrays of tagged values. This module
//! replaces the source's duplicated parsing branches with a single ordered
//! dispatch table of detector/parser pairs: the first dialect that both
//! matches and parses wins, everything else degrades to explicit unavailable
//! days. Normalization never fails; a malformed day never poisons siblings.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, Timelike, Utc};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};

use agendar_config::ScheduleConfig;

use crate::error::AvailabilityError;
use crate::expand::{self, DateWindow};
use crate::models::{AvailabilityMap, DayAvailability};
use crate::slots::SlotCatalogue;

pub const OPEN_DAY_MESSAGE: &str = "Dia disponível para agendamento";
pub const CLOSED_DAY_MESSAGE: &str = "Dia não disponível";
pub const CALENDAR_MESSAGE: &str = "Horários carregados do calendário";
pub const FULLY_BOOKED_MESSAGE: &str = "Dia totalmente ocupado";
pub const UNRECOGNIZED_MESSAGE: &str = "Formato de dados não reconhecido";

const DEFAULT_TIME_ZONE: &str = "America/Sao_Paulo";
const DEFAULT_ATTEND_NAME: &str = "Atender";
const DEFAULT_ATTEND_STATUS: &str = "confirmed";

/// Whether a booked slot also closes its catalogue neighbours.
///
/// The upstream added this rule and later retracted it ("REMOVIDO"), so it is
/// a policy, not a hardcoded behavior. Default: exact match only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdjacencyPolicy {
    Exact,
    ExcludeNeighbors,
}

/// Converts one raw upstream payload into per-day availability records.
pub struct Normalizer {
    catalogue: SlotCatalogue,
    tz: Tz,
    adjacency: AdjacencyPolicy,
    attend_name: String,
    attend_status: String,
}

struct Dialect {
    name: &'static str,
    detect: fn(&Value) -> bool,
    parse: fn(&Normalizer, &Value, &DateWindow) -> Option<AvailabilityMap>,
}

/// Dialects in priority order. The first whose detector and parser both
/// succeed is applied; later entries never re-derive what an earlier one
/// already computed.
const DIALECTS: &[Dialect] = &[
    Dialect {
        name: "precomputed-range",
        detect: detect_precomputed_range,
        parse: Normalizer::parse_precomputed_range,
    },
    Dialect {
        name: "precomputed-day",
        detect: detect_precomputed_day,
        parse: Normalizer::parse_precomputed_day,
    },
    Dialect {
        name: "busy-intervals",
        detect: detect_busy_intervals,
        parse: Normalizer::parse_busy_intervals,
    },
    Dialect {
        name: "available-list",
        detect: detect_available_list,
        parse: Normalizer::parse_available_list,
    },
    Dialect {
        name: "raw-calendar-events",
        detect: detect_raw_events,
        parse: Normalizer::parse_raw_events,
    },
    Dialect {
        name: "attend-events",
        detect: detect_attend_events,
        parse: Normalizer::parse_attend_events,
    },
    Dialect {
        name: "tagged-values",
        detect: detect_tagged_values,
        parse: Normalizer::parse_tagged_values,
    },
    Dialect {
        name: "compact-string",
        detect: detect_compact_string,
        parse: Normalizer::parse_compact_string,
    },
    Dialect {
        name: "empty-events",
        detect: detect_empty_events,
        parse: Normalizer::parse_empty_events,
    },
    Dialect {
        name: "stringly-events",
        detect: detect_stringly_events,
        parse: Normalizer::parse_stringly_events,
    },
];

impl Normalizer {
    pub fn new(
        catalogue: SlotCatalogue,
        tz: Tz,
        adjacency: AdjacencyPolicy,
        attend_name: impl Into<String>,
        attend_status: impl Into<String>,
    ) -> Self {
        Normalizer {
            catalogue,
            tz,
            adjacency,
            attend_name: attend_name.into(),
            attend_status: attend_status.into(),
        }
    }

    pub fn from_config(schedule: &ScheduleConfig) -> Result<Self, AvailabilityError> {
        let tz_name = schedule.time_zone.as_deref().unwrap_or(DEFAULT_TIME_ZONE);
        let tz = Tz::from_str(tz_name)
            .map_err(|_| AvailabilityError::InvalidTimezone(tz_name.to_string()))?;
        Ok(Normalizer::new(
            SlotCatalogue::from_config(schedule),
            tz,
            if schedule.exclude_adjacent {
                AdjacencyPolicy::ExcludeNeighbors
            } else {
                AdjacencyPolicy::Exact
            },
            schedule
                .attend_event_name
                .as_deref()
                .unwrap_or(DEFAULT_ATTEND_NAME),
            schedule
                .attend_event_status
                .as_deref()
                .unwrap_or(DEFAULT_ATTEND_STATUS),
        ))
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    pub fn catalogue(&self) -> &SlotCatalogue {
        &self.catalogue
    }

    /// Normalize one raw payload into a complete map over the window.
    ///
    /// Every date in the window is present exactly once in the output; days
    /// no dialect produced become explicit unavailable entries.
    pub fn normalize(&self, raw: &Value, window: &DateWindow) -> AvailabilityMap {
        match self.dispatch(raw, window) {
            Some((name, partial)) => {
                debug!(dialect = name, days = partial.len(), "payload recognized");
                expand::fill_range(window, partial, expand::NO_EVENTS_MESSAGE)
            }
            None => {
                warn!("unrecognized automation payload; serving unavailable days");
                expand::fill_range(window, AvailabilityMap::new(), UNRECOGNIZED_MESSAGE)
            }
        }
    }

    fn dispatch(&self, raw: &Value, window: &DateWindow) -> Option<(&'static str, AvailabilityMap)> {
        for dialect in DIALECTS {
            if (dialect.detect)(raw) {
                if let Some(partial) = (dialect.parse)(self, raw, window) {
                    return Some((dialect.name, partial));
                }
                debug!(dialect = dialect.name, "detector matched but parse fell through");
            }
        }
        None
    }

    // --- Dialect parsers ---

    /// Upstream already computed the per-day map; trust it, do not re-derive.
    fn parse_precomputed_range(&self, raw: &Value, _window: &DateWindow) -> Option<AvailabilityMap> {
        let map = raw
            .get("weeklyAvailability")
            .or_else(|| raw.get("agendarAvailability"))?
            .as_object()?;
        let mut out = AvailabilityMap::new();
        for (date, value) in map {
            match serde_json::from_value::<DayAvailability>(value.clone()) {
                Ok(mut day) => {
                    if day.date.is_empty() {
                        day.date = date.clone();
                    }
                    out.insert(date.clone(), day);
                }
                Err(err) => {
                    // One malformed day degrades alone; its siblings survive.
                    warn!(%date, %err, "discarding malformed precomputed day");
                    out.insert(
                        date.clone(),
                        DayAvailability::unavailable(date, UNRECOGNIZED_MESSAGE),
                    );
                }
            }
        }
        Some(out)
    }

    /// Daily payload that already carries `availableSlots`/`bookedSlots`.
    fn parse_precomputed_day(&self, raw: &Value, window: &DateWindow) -> Option<AvailabilityMap> {
        let available = string_array(raw.get("availableSlots")?)?;
        let booked = raw
            .get("bookedSlots")
            .and_then(string_array)
            .unwrap_or_default();
        let key = window.start.format("%Y-%m-%d").to_string();
        let mut out = AvailabilityMap::new();
        out.insert(
            key.clone(),
            DayAvailability::with_slots(key, available, booked, CALENDAR_MESSAGE),
        );
        Some(out)
    }

    /// `occupied.busy`: ISO intervals of occupied time. The slot whose start
    /// hour matches (in the business timezone) is booked; the rest of the
    /// catalogue stays open, subject to the adjacency policy.
    fn parse_busy_intervals(&self, raw: &Value, window: &DateWindow) -> Option<AvailabilityMap> {
        let busy = raw.pointer("/occupied/busy")?.as_array()?;
        let mut booked_by_day: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for interval in busy {
            let Some(start) = interval.get("start").and_then(Value::as_str) else {
                warn!("busy interval without start; skipping");
                continue;
            };
            match self.slot_for_instant(start) {
                Some((date, label)) => booked_by_day.entry(date).or_default().push(label),
                None => debug!(start, "busy interval start maps to no catalogue slot"),
            }
        }
        Some(self.days_from_booked(booked_by_day, window))
    }

    /// `available`: intervals the upstream already filtered down to free time.
    fn parse_available_list(&self, raw: &Value, _window: &DateWindow) -> Option<AvailabilityMap> {
        let available = raw.get("available")?.as_array()?;
        let mut open_by_day: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for interval in available {
            let Some(start) = interval.get("start").and_then(Value::as_str) else {
                continue;
            };
            if let Some((date, label)) = self.slot_for_instant(start) {
                open_by_day.entry(date).or_default().push(label);
            }
        }
        let mut out = AvailabilityMap::new();
        for (date, labels) in open_by_day {
            let open = self.in_catalogue_order(&labels);
            out.insert(
                date.clone(),
                DayAvailability::with_slots(date, open, Vec::new(), CALENDAR_MESSAGE),
            );
        }
        Some(out)
    }

    /// `events[].start.dateTime`: raw calendar events; starts mark slots booked.
    fn parse_raw_events(&self, raw: &Value, window: &DateWindow) -> Option<AvailabilityMap> {
        let events = raw.get("events")?.as_array()?;
        let mut booked_by_day: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for event in events {
            let Some(start) = event.pointer("/start/dateTime").and_then(Value::as_str) else {
                warn!("calendar event without start.dateTime; skipping");
                continue;
            };
            if let Some((date, label)) = self.slot_for_instant(start) {
                booked_by_day.entry(date).or_default().push(label);
            }
        }
        Some(self.days_from_booked(booked_by_day, window))
    }

    /// `events[] = {name, status, start}`: the attend marker opens whole days.
    fn parse_attend_events(&self, raw: &Value, _window: &DateWindow) -> Option<AvailabilityMap> {
        let events = raw.get("events")?.as_array()?;
        let mut out = AvailabilityMap::new();
        for event in events {
            let name = clean_marker(event.get("name"));
            let status = clean_marker(event.get("status"));
            let start = event.get("start").and_then(Value::as_str);
            let (Some(name), Some(status), Some(start)) = (name, status, start) else {
                warn!("attend event missing name/status/start; skipping");
                continue;
            };
            let Some(date) = utc_date_key(start) else {
                warn!(start, "attend event with unparseable start; skipping");
                continue;
            };
            // Last event for a date wins, matching the upstream behavior.
            out.insert(date.clone(), self.attend_day(date, name, status));
        }
        Some(out)
    }

    /// `events[] = {value}`: flat tagged values in fixed batches of three
    /// (name, status, start) reconstructing one logical event per batch.
    fn parse_tagged_values(&self, raw: &Value, _window: &DateWindow) -> Option<AvailabilityMap> {
        let events = raw.get("events")?.as_array()?;
        let values: Vec<String> = events
            .iter()
            .filter_map(|item| clean_marker(item.get("value")))
            .collect();
        let mut out = AvailabilityMap::new();
        for batch in values.chunks(3) {
            let [name, status, start] = batch else {
                debug!(len = batch.len(), "incomplete tagged-value batch; skipping");
                continue;
            };
            if name != &self.attend_name || status != &self.attend_status {
                debug!(%name, %status, "tagged event is not an open attend day");
                continue;
            }
            let Some(date) = utc_date_key(start) else {
                warn!(%start, "tagged event with unparseable date; skipping");
                continue;
            };
            out.insert(
                date.clone(),
                self.attend_day(date, name.clone(), status.clone()),
            );
        }
        Some(out)
    }

    /// `events.value = "<name>,<status>,<iso>"`: one event as a joined string.
    fn parse_compact_string(&self, raw: &Value, _window: &DateWindow) -> Option<AvailabilityMap> {
        let compact = raw.pointer("/events/value")?.as_str()?;
        let parts: Vec<&str> = compact.split(',').collect();
        if parts.len() < 3 {
            warn!(compact, "compact payload needs at least three parts");
            return None;
        }
        let name = strip_quotes(parts[0]);
        let status = strip_quotes(parts[1]);
        let date = utc_date_key(parts[2].trim())?;
        let mut out = AvailabilityMap::new();
        out.insert(date.clone(), self.attend_day(date, name, status));
        Some(out)
    }

    /// An events array with nothing in it: a recognized shape meaning
    /// "no events", not an unrecognized payload.
    fn parse_empty_events(&self, _raw: &Value, _window: &DateWindow) -> Option<AvailabilityMap> {
        Some(AvailabilityMap::new())
    }

    /// `events` arrived as a string. Try to re-parse it as JSON and dispatch
    /// again; failing that, harvest ISO timestamps and open those days.
    fn parse_stringly_events(&self, raw: &Value, window: &DateWindow) -> Option<AvailabilityMap> {
        let text = raw.get("events")?.as_str()?;
        if let Ok(parsed) = serde_json::from_str::<Value>(text) {
            let wrapped = serde_json::json!({ "events": parsed });
            if let Some((name, map)) = self.dispatch(&wrapped, window) {
                debug!(inner_dialect = name, "stringly events re-parsed as JSON");
                return Some(map);
            }
        }
        static ISO_STAMP: Lazy<Regex> = Lazy::new(|| {
            Regex::new(r"\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(?:\.\d{3})?Z").unwrap()
        });
        let mut out = AvailabilityMap::new();
        for stamp in ISO_STAMP.find_iter(text) {
            if let Some(date) = utc_date_key(stamp.as_str()) {
                out.insert(
                    date.clone(),
                    self.attend_day(
                        date,
                        self.attend_name.clone(),
                        self.attend_status.clone(),
                    ),
                );
            }
        }
        if out.is_empty() {
            None
        } else {
            Some(out)
        }
    }

    // --- Shared helpers ---

    /// Map an ISO instant to (business-timezone date key, catalogue label)
    /// by exact start-hour match.
    fn slot_for_instant(&self, instant: &str) -> Option<(String, String)> {
        let parsed = DateTime::parse_from_rfc3339(instant).ok()?;
        let local = parsed.with_timezone(&self.tz);
        let label = self.catalogue.label_for_hour(local.hour())?.to_string();
        Some((local.date_naive().format("%Y-%m-%d").to_string(), label))
    }

    /// Build one day entry per window date from booked labels:
    /// available = base − booked, minus the neighbours under the
    /// ExcludeNeighbors policy.
    fn days_from_booked(
        &self,
        mut booked_by_day: BTreeMap<String, Vec<String>>,
        window: &DateWindow,
    ) -> AvailabilityMap {
        let mut out = AvailabilityMap::new();
        for date in window.iter() {
            let key = date.format("%Y-%m-%d").to_string();
            let raw_booked = booked_by_day.remove(&key).unwrap_or_default();
            let booked = self.in_catalogue_order(&raw_booked);
            let available: Vec<String> = self
                .catalogue
                .base_slots()
                .iter()
                .filter(|slot| !booked.contains(slot))
                .filter(|slot| match self.adjacency {
                    AdjacencyPolicy::Exact => true,
                    AdjacencyPolicy::ExcludeNeighbors => {
                        let (prev, next) = self.catalogue.neighbors(slot);
                        let prev_booked = prev.is_some_and(|p| booked.iter().any(|b| b == p));
                        let next_booked = next.is_some_and(|n| booked.iter().any(|b| b == n));
                        !prev_booked && !next_booked
                    }
                })
                .cloned()
                .collect();
            let message = if available.is_empty() {
                FULLY_BOOKED_MESSAGE
            } else {
                CALENDAR_MESSAGE
            };
            out.insert(
                key.clone(),
                DayAvailability::with_slots(key, available, booked, message),
            );
        }
        out
    }

    /// Dedupe and sort labels into catalogue order, dropping strays.
    fn in_catalogue_order(&self, labels: &[String]) -> Vec<String> {
        self.catalogue
            .base_slots()
            .iter()
            .filter(|slot| labels.contains(slot))
            .cloned()
            .collect()
    }

    /// A whole-day entry driven by the attend marker: fully open when the
    /// cleaned name/status match, explicitly closed otherwise.
    fn attend_day(&self, date: String, name: String, status: String) -> DayAvailability {
        let open = name == self.attend_name && status == self.attend_status;
        DayAvailability {
            date: date.clone(),
            has_availability: open,
            available_slots: if open {
                self.catalogue.base_slots().to_vec()
            } else {
                Vec::new()
            },
            booked_slots: Vec::new(),
            event_name: Some(name),
            event_status: Some(status),
            message: if open {
                OPEN_DAY_MESSAGE.to_string()
            } else {
                CLOSED_DAY_MESSAGE.to_string()
            },
        }
    }
}

// --- Dialect detectors ---

fn detect_precomputed_range(raw: &Value) -> bool {
    raw.get("weeklyAvailability").is_some_and(Value::is_object)
        || raw.get("agendarAvailability").is_some_and(Value::is_object)
}

fn detect_precomputed_day(raw: &Value) -> bool {
    raw.get("availableSlots").is_some_and(Value::is_array)
}

fn detect_busy_intervals(raw: &Value) -> bool {
    raw.pointer("/occupied/busy").is_some_and(Value::is_array)
}

fn detect_available_list(raw: &Value) -> bool {
    raw.get("available").is_some_and(Value::is_array)
}

fn first_event(raw: &Value) -> Option<&Value> {
    raw.get("events")?.as_array()?.first()
}

fn detect_raw_events(raw: &Value) -> bool {
    first_event(raw).is_some_and(|e| e.pointer("/start/dateTime").is_some())
}

fn detect_attend_events(raw: &Value) -> bool {
    first_event(raw).is_some_and(|e| e.get("name").is_some() && e.get("status").is_some())
}

fn detect_tagged_values(raw: &Value) -> bool {
    first_event(raw).is_some_and(|e| e.get("value").is_some())
}

fn detect_compact_string(raw: &Value) -> bool {
    raw.pointer("/events/value").is_some_and(Value::is_string)
}

fn detect_empty_events(raw: &Value) -> bool {
    raw.get("events")
        .and_then(Value::as_array)
        .is_some_and(|a| a.is_empty())
}

fn detect_stringly_events(raw: &Value) -> bool {
    raw.get("events").is_some_and(Value::is_string)
}

// --- Field helpers ---

/// The upstream double-encodes strings now and then; strip stray quotes
/// before any marker comparison.
fn strip_quotes(value: &str) -> String {
    value.trim().trim_matches('"').trim().to_string()
}

fn clean_marker(value: Option<&Value>) -> Option<String> {
    value.and_then(Value::as_str).map(strip_quotes)
}

/// Date key (YYYY-MM-DD) of an ISO instant, read in UTC the way the
/// upstream's own day bucketing does.
fn utc_date_key(instant: &str) -> Option<String> {
    let parsed = DateTime::parse_from_rfc3339(instant).ok()?;
    Some(
        parsed
            .with_timezone(&Utc)
            .date_naive()
            .format("%Y-%m-%d")
            .to_string(),
    )
}

fn string_array(value: &Value) -> Option<Vec<String>> {
    value.as_array().map(|items| {
        items
            .iter()
            .filter_map(Value::as_str)
            .map(|s| s.to_string())
            .collect()
    })
}
