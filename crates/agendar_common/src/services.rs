// --- File: crates/agendar_common/src/services.rs ---
//! Service abstractions for the automation backend.
//!
//! The availability and booking features never talk to Make directly; they go
//! through the [`AutomationService`] trait so handlers can be tested against
//! in-memory stubs and the webhook plumbing stays in one crate.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Type alias for a boxed future that returns a Result
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// Errors surfaced by automation-backend calls.
#[derive(Error, Debug)]
pub enum AutomationError {
    #[error("automation backend request failed: {0}")]
    Transport(String),
    #[error("automation backend answered {status}: {body}")]
    Status { status: u16, body: String },
    #[error("automation backend response was not decodable: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for AutomationError {
    fn from(err: reqwest::Error) -> Self {
        AutomationError::Transport(err.to_string())
    }
}

/// Result of the pre-booking email gate.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VerifyOutcome {
    pub allowed: bool,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Acknowledgment returned by the automation backend for a created booking.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct BookingOutcome {
    #[serde(default)]
    pub event_id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// A trait for the workflow-automation backend that fronts the calendar.
///
/// The raw fetches deliberately return [`serde_json::Value`]: the upstream has
/// shipped at least five different payload shapes and the normalizer, not the
/// transport, decides what to make of them.
pub trait AutomationService: Send + Sync {
    /// Fetch the raw occupied/busy feed for a single date.
    fn fetch_day_raw(&self, date: &str) -> BoxFuture<'_, Value, AutomationError>;

    /// Fetch the raw event feed for an inclusive date range.
    fn fetch_range_raw(&self, start_date: &str, end_date: &str)
        -> BoxFuture<'_, Value, AutomationError>;

    /// Forward a booking payload to the calendar.
    fn create_booking(&self, booking: Value) -> BoxFuture<'_, BookingOutcome, AutomationError>;

    /// Check an email against the allow/deny list.
    fn verify_email(&self, email: &str) -> BoxFuture<'_, VerifyOutcome, AutomationError>;
}
