// --- File: crates/agendar_availability/src/error.rs ---
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AvailabilityError {
    /// A slot label that is not HH:MM. Programming or configuration error.
    #[error("Invalid slot format: {0}")]
    InvalidSlotFormat(String),
    #[error("Invalid date format: {0}")]
    InvalidDateFormat(String),
    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),
}
