// --- File: crates/agendar_availability/src/models.rs ---
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// Canonical per-day availability. One entry per calendar date.
///
/// Invariants: `available_slots` and `booked_slots` are disjoint, both drawn
/// from the base-slot catalogue, and `has_availability` mirrors
/// `!available_slots.is_empty()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct DayAvailability {
    /// Calendar date, canonical form YYYY-MM-DD.
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub has_availability: bool,
    /// Ascending HH:MM labels, no duplicates.
    #[serde(default)]
    pub available_slots: Vec<String>,
    /// Already occupied labels; informational, may be hidden by the UI.
    #[serde(default)]
    pub booked_slots: Vec<String>,
    /// Provenance: upstream event that produced the availability signal.
    #[serde(default)]
    pub event_name: Option<String>,
    #[serde(default)]
    pub event_status: Option<String>,
    /// Human-readable explanation ("no events", "fully booked", ...).
    #[serde(default)]
    pub message: String,
}

impl DayAvailability {
    /// An explicitly unavailable day with a diagnostic message.
    pub fn unavailable(date: impl Into<String>, message: impl Into<String>) -> Self {
        DayAvailability {
            date: date.into(),
            has_availability: false,
            available_slots: Vec::new(),
            booked_slots: Vec::new(),
            event_name: None,
            event_status: None,
            message: message.into(),
        }
    }

    /// A day with the given open/booked slot labels.
    pub fn with_slots(
        date: impl Into<String>,
        available: Vec<String>,
        booked: Vec<String>,
        message: impl Into<String>,
    ) -> Self {
        let has_availability = !available.is_empty();
        DayAvailability {
            date: date.into(),
            has_availability,
            available_slots: available,
            booked_slots: booked,
            event_name: None,
            event_status: None,
            message: message.into(),
        }
    }
}

/// Date-keyed availability. BTreeMap keeps keys in lexicographic order,
/// which for YYYY-MM-DD strings equals chronological order.
pub type AvailabilityMap = BTreeMap<String, DayAvailability>;

/// Query parameters accepted by `GET /availability`.
///
/// Either `date` (single day) or `startDate`+`endDate` (inclusive range);
/// `checkAgendar=true` switches the range answer to the day-granularity
/// attend-event variant.
#[derive(Deserialize, Debug, Default)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityQuery {
    pub date: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[serde(default)]
    pub check_agendar: Option<bool>,
}

#[derive(Serialize, Debug)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct DailyAvailabilityResponse {
    pub success: bool,
    pub date: String,
    pub available_slots: Vec<String>,
    pub booked_slots: Vec<String>,
    pub timezone: String,
    pub last_updated: String,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Serialize, Debug)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct WeeklyAvailabilityResponse {
    pub success: bool,
    pub start_date: String,
    pub end_date: String,
    pub weekly_availability: AvailabilityMap,
    pub timezone: String,
    pub last_updated: String,
    pub source: String,
}

#[derive(Serialize, Debug)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct AgendarAvailabilityResponse {
    pub success: bool,
    pub start_date: String,
    pub end_date: String,
    pub agendar_availability: AvailabilityMap,
    pub timezone: String,
    pub last_updated: String,
    pub source: String,
}

#[derive(Serialize, Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ErrorResponse {
    pub success: bool,
    pub reason: String,
}

impl ErrorResponse {
    pub fn new(reason: impl Into<String>) -> Self {
        ErrorResponse {
            success: false,
            reason: reason.into(),
        }
    }
}
