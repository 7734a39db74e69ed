// --- File: crates/agendar_widget/src/controller.rs ---
//! Booking-form state machine.
//!
//! Pure and synchronous: inputs are [`Event`]s (user actions and network
//! results), outputs are [`Command`]s the embedding shell executes against
//! the [`AvailabilityClient`](crate::client::AvailabilityClient). No I/O
//! happens here, which is what makes every transition unit-testable.
//!
//! Day fetches are tagged with a monotonically increasing token; a response
//! carrying a stale token belongs to a superseded date selection and is
//! discarded instead of overwriting newer UI state.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, NaiveTime, TimeZone};
use chrono_tz::Tz;
use serde_json::{json, Value};
use tracing::debug;

use agendar_availability::error::AvailabilityError;
use agendar_availability::models::{AvailabilityMap, DayAvailability};
use agendar_availability::slots::{parse_label, SlotCatalogue};
use agendar_config::AppConfig;

/// Size of the visible date window opened on mount.
pub const DEFAULT_VISIBLE_DAYS: u32 = 8;

/// Personal fields the form must fill before a submit goes out. Date, time
/// and datetime come from the current selection, not from the form.
pub const REQUIRED_FORM_FIELDS: &[&str] = &[
    "name", "rg", "cpf", "email", "phone", "fetiche", "conheceu", "duration", "reason",
];

const VALIDATION_MESSAGE: &str = "Preencha todos os campos obrigatórios e escolha um horário.";

const DEFAULT_TIME_ZONE: &str = "America/Sao_Paulo";

/// What the mount fetch covers: a rolling window of slot-level days, or the
/// current calendar month at day granularity (attend-marker scheduling).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeKind {
    SlotWindow,
    AttendMonth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    DateSelecting,
    SlotLoading,
    SlotSelecting,
    Submitting,
    Success,
    Failed,
}

/// Why a day renders no selectable slots. Each case gets its own message so
/// "nothing here" never looks like an error when it is not one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyState {
    UpstreamError,
    FullyBookedToday,
    FullyBookedFuture,
    TodayElapsed,
    NoEvents,
}

impl EmptyState {
    pub fn message(&self) -> &'static str {
        match self {
            EmptyState::UpstreamError => {
                "Não foi possível carregar os horários. Tente novamente."
            }
            EmptyState::FullyBookedToday => "Todos os horários de hoje já estão ocupados.",
            EmptyState::FullyBookedFuture => "Dia totalmente ocupado.",
            EmptyState::TodayElapsed => "Os horários de hoje já passaram.",
            EmptyState::NoEvents => "Sem eventos para agendamento neste dia.",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Mounted,
    RangeLoaded(AvailabilityMap),
    RangeFailed { reason: String },
    DateSelected(String),
    SlotsLoaded { token: u64, day: DayAvailability },
    SlotsFailed { token: u64, reason: String },
    SlotChosen(String),
    FieldChanged { field: String, value: String },
    SubmitRequested,
    SubmitSucceeded { message: Option<String> },
    SubmitFailed { reason: String },
    RefreshRequested,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    FetchRange { start_date: String, end_date: String },
    FetchAgendarRange { start_date: String, end_date: String },
    FetchDay { date: String, token: u64 },
    InvalidateCache { date: String },
    SubmitBooking { payload: Value },
}

/// The booking form. One mutable owner, event-driven, no shared state.
pub struct BookingFormController {
    tz: Tz,
    visible_days: u32,
    range_kind: RangeKind,
    catalogue: SlotCatalogue,
    show_booked_slots: bool,
    phase: Phase,
    days: AvailabilityMap,
    selected_date: Option<String>,
    selected_slot: Option<String>,
    fields: BTreeMap<String, String>,
    token: u64,
    empty_state: Option<EmptyState>,
    error: Option<String>,
    validation_error: Option<String>,
}

impl BookingFormController {
    pub fn new(tz: Tz, visible_days: u32) -> Self {
        BookingFormController {
            tz,
            visible_days: visible_days.max(1),
            range_kind: RangeKind::SlotWindow,
            catalogue: SlotCatalogue::default_catalogue(),
            show_booked_slots: true,
            phase: Phase::Idle,
            days: AvailabilityMap::new(),
            selected_date: None,
            selected_slot: None,
            fields: BTreeMap::new(),
            token: 0,
            empty_state: None,
            error: None,
            validation_error: None,
        }
    }

    /// Builds the controller from the application configuration: window
    /// size, slot catalogue, timezone and booked-slot display all come from
    /// the `ui`/`schedule` sections.
    pub fn from_config(config: &AppConfig) -> Result<Self, AvailabilityError> {
        let tz_name = config
            .schedule
            .time_zone
            .as_deref()
            .unwrap_or(DEFAULT_TIME_ZONE);
        let tz = Tz::from_str(tz_name)
            .map_err(|_| AvailabilityError::InvalidTimezone(tz_name.to_string()))?;
        let mut controller = BookingFormController::new(
            tz,
            config.ui.max_dates.unwrap_or(DEFAULT_VISIBLE_DAYS),
        );
        controller.catalogue = SlotCatalogue::from_config(&config.schedule);
        controller.show_booked_slots = config.ui.show_booked_slots;
        Ok(controller)
    }

    /// Selects what the mount fetch covers. Attend-marker deployments use
    /// the calendar-month, day-granularity range.
    pub fn with_range_kind(mut self, kind: RangeKind) -> Self {
        self.range_kind = kind;
        self
    }

    /// Feed one event; returns the commands the shell must execute.
    pub fn handle(&mut self, event: Event, now: DateTime<Tz>) -> Vec<Command> {
        match event {
            Event::Mounted => self.on_mounted(now),
            Event::RangeLoaded(map) => self.on_range_loaded(map),
            Event::RangeFailed { reason } => {
                self.phase = Phase::DateSelecting;
                self.empty_state = Some(EmptyState::UpstreamError);
                self.error = Some(reason);
                Vec::new()
            }
            Event::DateSelected(date) => self.on_date_selected(date),
            Event::SlotsLoaded { token, day } => self.on_slots_loaded(token, day, now),
            Event::SlotsFailed { token, reason } => self.on_slots_failed(token, reason),
            Event::SlotChosen(slot) => {
                self.on_slot_chosen(slot);
                Vec::new()
            }
            Event::FieldChanged { field, value } => {
                self.fields.insert(field, value);
                self.validation_error = None;
                Vec::new()
            }
            Event::SubmitRequested => self.on_submit_requested(),
            Event::SubmitSucceeded { message } => self.on_submit_succeeded(message),
            Event::SubmitFailed { reason } => {
                self.phase = Phase::Failed;
                self.error = Some(reason);
                Vec::new()
            }
            Event::RefreshRequested => self.on_refresh(),
        }
    }

    fn on_mounted(&mut self, now: DateTime<Tz>) -> Vec<Command> {
        self.phase = Phase::DateSelecting;
        match self.range_kind {
            RangeKind::SlotWindow => {
                let window = visible_window(now.date_naive(), self.visible_days);
                let start = window.first().cloned().unwrap_or_default();
                let end = window.last().cloned().unwrap_or_default();
                vec![Command::FetchRange {
                    start_date: start,
                    end_date: end,
                }]
            }
            RangeKind::AttendMonth => {
                let (start, end) = month_bounds(now.date_naive());
                vec![Command::FetchAgendarRange {
                    start_date: start,
                    end_date: end,
                }]
            }
        }
    }

    fn on_range_loaded(&mut self, map: AvailabilityMap) -> Vec<Command> {
        self.days = map;
        self.error = None;
        self.empty_state = None;
        match self.first_available_date() {
            Some(date) => self.start_day_fetch(date),
            None => {
                self.phase = Phase::DateSelecting;
                self.selected_date = self.days.keys().next().cloned();
                Vec::new()
            }
        }
    }

    fn on_date_selected(&mut self, date: String) -> Vec<Command> {
        if self.phase == Phase::Submitting {
            // the triggering control is disabled while a submit is in flight
            return Vec::new();
        }
        self.start_day_fetch(date)
    }

    fn start_day_fetch(&mut self, date: String) -> Vec<Command> {
        self.selected_date = Some(date.clone());
        self.selected_slot = None;
        self.empty_state = None;
        self.error = None;
        self.phase = Phase::SlotLoading;
        self.token += 1;
        vec![Command::FetchDay {
            date,
            token: self.token,
        }]
    }

    fn on_slots_loaded(&mut self, token: u64, day: DayAvailability, now: DateTime<Tz>) -> Vec<Command> {
        if token != self.token {
            debug!(token, current = self.token, "discarding stale day response");
            return Vec::new();
        }
        self.phase = Phase::SlotSelecting;
        self.empty_state = if day.available_slots.is_empty() {
            Some(self.classify_empty_day(&day, now))
        } else {
            None
        };
        self.days.insert(day.date.clone(), day);
        Vec::new()
    }

    fn on_slots_failed(&mut self, token: u64, reason: String) -> Vec<Command> {
        if token != self.token {
            debug!(token, current = self.token, "discarding stale day failure");
            return Vec::new();
        }
        self.phase = Phase::SlotSelecting;
        self.empty_state = Some(EmptyState::UpstreamError);
        self.error = Some(reason);
        Vec::new()
    }

    fn on_slot_chosen(&mut self, slot: String) {
        if self.phase != Phase::SlotSelecting {
            return;
        }
        let selectable = self
            .current_day()
            .map(|day| day.available_slots.contains(&slot))
            .unwrap_or(false);
        if selectable {
            self.selected_slot = Some(slot);
            self.validation_error = None;
        }
    }

    fn on_submit_requested(&mut self) -> Vec<Command> {
        if self.phase != Phase::SlotSelecting {
            return Vec::new();
        }
        let Some(payload) = self.build_payload() else {
            // fails closed: nothing leaves the widget until the form is whole
            self.validation_error = Some(VALIDATION_MESSAGE.to_string());
            return Vec::new();
        };
        self.phase = Phase::Submitting;
        vec![Command::SubmitBooking { payload }]
    }

    fn on_submit_succeeded(&mut self, _message: Option<String>) -> Vec<Command> {
        if self.phase != Phase::Submitting {
            return Vec::new();
        }
        self.phase = Phase::Success;
        let mut commands = Vec::new();
        if let (Some(date), Some(slot)) = (self.selected_date.clone(), self.selected_slot.clone()) {
            // optimistic move: the booked slot flips locally, no refetch
            if let Some(day) = self.days.get_mut(&date) {
                day.available_slots.retain(|s| s != &slot);
                if !day.booked_slots.contains(&slot) {
                    day.booked_slots.push(slot);
                    day.booked_slots.sort();
                }
                day.has_availability = !day.available_slots.is_empty();
            }
            commands.push(Command::InvalidateCache { date });
        }
        self.fields.clear();
        self.selected_slot = None;
        self.validation_error = None;
        self.error = None;
        self.selected_date = self.first_available_date();
        commands
    }

    fn on_refresh(&mut self) -> Vec<Command> {
        let Some(date) = self.selected_date.clone() else {
            return Vec::new();
        };
        self.phase = Phase::SlotLoading;
        self.selected_slot = None;
        self.empty_state = None;
        self.token += 1;
        vec![
            Command::InvalidateCache { date: date.clone() },
            Command::FetchDay {
                date,
                token: self.token,
            },
        ]
    }

    fn build_payload(&self) -> Option<Value> {
        let date = self.selected_date.as_deref()?;
        let slot = self.selected_slot.as_deref()?;
        for field in REQUIRED_FORM_FIELDS {
            if self
                .fields
                .get(*field)
                .map(|v| v.trim().is_empty())
                .unwrap_or(true)
            {
                return None;
            }
        }
        let mut payload = json!({
            "date": date,
            "time": slot,
            "datetime": self.compose_datetime(date, slot)?,
        });
        for (field, value) in &self.fields {
            payload[field] = json!(value);
        }
        Some(payload)
    }

    fn compose_datetime(&self, date: &str, slot: &str) -> Option<String> {
        let day = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
        let time = NaiveTime::parse_from_str(slot, "%H:%M").ok()?;
        self.tz
            .from_local_datetime(&day.and_time(time))
            .single()
            .map(|instant| instant.to_rfc3339())
    }

    fn first_available_date(&self) -> Option<String> {
        self.days
            .values()
            .find(|day| day.has_availability)
            .map(|day| day.date.clone())
    }

    fn current_day(&self) -> Option<&DayAvailability> {
        self.days.get(self.selected_date.as_deref()?)
    }

    /// Which empty-state applies when a day renders zero selectable slots.
    /// The elapsed case is derived from the clock against the catalogue, not
    /// from server-side messages, which the daily payload does not carry.
    fn classify_empty_day(&self, day: &DayAvailability, now: DateTime<Tz>) -> EmptyState {
        let is_today = day.date == now.format("%Y-%m-%d").to_string();
        if !day.booked_slots.is_empty() {
            return if is_today {
                EmptyState::FullyBookedToday
            } else {
                EmptyState::FullyBookedFuture
            };
        }
        if is_today && self.catalogue_elapsed(now) {
            EmptyState::TodayElapsed
        } else {
            EmptyState::NoEvents
        }
    }

    /// Whether every catalogue slot start is already behind the clock.
    fn catalogue_elapsed(&self, now: DateTime<Tz>) -> bool {
        let slots = self.catalogue.base_slots();
        !slots.is_empty()
            && slots.iter().all(|label| {
                parse_label(label)
                    .map(|start| start <= now.time())
                    .unwrap_or(false)
            })
    }

    // --- Render accessors ---

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn days(&self) -> &AvailabilityMap {
        &self.days
    }

    pub fn selected_date(&self) -> Option<&str> {
        self.selected_date.as_deref()
    }

    pub fn selected_slot(&self) -> Option<&str> {
        self.selected_slot.as_deref()
    }

    /// Booked slots of the selected day, rendered non-interactive. Empty
    /// when the configuration hides them.
    pub fn booked_slots(&self) -> &[String] {
        if !self.show_booked_slots {
            return &[];
        }
        self.current_day()
            .map(|day| day.booked_slots.as_slice())
            .unwrap_or(&[])
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn empty_state(&self) -> Option<EmptyState> {
        self.empty_state
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn validation_error(&self) -> Option<&str> {
        self.validation_error.as_deref()
    }

    /// Whether the triggering controls must be disabled (an operation is in
    /// flight).
    pub fn is_busy(&self) -> bool {
        matches!(self.phase, Phase::SlotLoading | Phase::Submitting)
    }
}

/// The dates rendered by the picker: `count` consecutive days from `today`.
pub fn visible_window(today: NaiveDate, count: u32) -> Vec<String> {
    (0..count.max(1) as i64)
        .filter_map(|offset| today.checked_add_signed(Duration::days(offset)))
        .map(|date| date.format("%Y-%m-%d").to_string())
        .collect()
}

/// First and last day of `date`'s calendar month, `%Y-%m-%d` formatted.
pub fn month_bounds(date: NaiveDate) -> (String, String) {
    let first = date.with_day(1).unwrap_or(date);
    let last = first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(date);
    (
        first.format("%Y-%m-%d").to_string(),
        last.format("%Y-%m-%d").to_string(),
    )
}
