// --- File: crates/agendar_booking/src/logic.rs ---
//! Booking payload validation.
//!
//! The booking payload is kept as raw JSON: the calendar scenario consumes
//! extra fields the server never interprets, so validation checks presence
//! and shape without locking down the schema.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// Fields a booking must carry, non-empty after trimming.
pub const REQUIRED_FIELDS: &[&str] = &[
    "date", "time", "datetime", "name", "rg", "cpf", "email", "phone", "fetiche", "conheceu",
    "duration", "reason",
];

static EMAIL_SHAPE: Lazy<Regex> = Lazy::new(|| Regex::new(r".+@.+\..+").unwrap());

#[derive(Error, Debug, PartialEq, Eq)]
pub enum BookingError {
    #[error("campo obrigatório ausente ou vazio: {0}")]
    MissingField(String),
    #[error("e-mail em formato inválido")]
    InvalidEmail,
    #[error("datetime em formato inválido")]
    InvalidDateTime,
    #[error("o agendamento precisa estar no futuro")]
    PastDateTime,
}

#[derive(Serialize, Debug)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
}

#[derive(Serialize, Debug)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct BookingErrorResponse {
    pub success: bool,
    pub reason: String,
}

impl BookingErrorResponse {
    pub fn new(reason: impl Into<String>) -> Self {
        BookingErrorResponse {
            success: false,
            reason: reason.into(),
        }
    }
}

#[derive(Serialize, Debug)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct VerifyResponse {
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Minimal shape check for an email address, matching the upstream gate.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_SHAPE.is_match(email)
}

/// Checks a raw booking payload: every required field present and non-blank,
/// a plausible email, and a booking instant strictly in the future.
pub fn validate_booking(data: &Value, now: DateTime<Utc>) -> Result<(), BookingError> {
    for field in REQUIRED_FIELDS {
        let present = match data.get(field) {
            Some(Value::String(s)) => !s.trim().is_empty(),
            Some(Value::Null) | None => false,
            Some(Value::Bool(b)) => *b,
            Some(_) => true,
        };
        if !present {
            return Err(BookingError::MissingField(field.to_string()));
        }
    }

    let email = data.get("email").and_then(Value::as_str).unwrap_or_default();
    if !is_valid_email(email) {
        return Err(BookingError::InvalidEmail);
    }

    let datetime = data
        .get("datetime")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let instant = DateTime::parse_from_rfc3339(datetime)
        .map_err(|_| BookingError::InvalidDateTime)?
        .with_timezone(&Utc);
    if instant <= now {
        return Err(BookingError::PastDateTime);
    }
    Ok(())
}

/// The email out of a booking payload, for the pre-booking gate.
pub fn booking_email(data: &Value) -> Option<&str> {
    data.get("email").and_then(Value::as_str)
}
