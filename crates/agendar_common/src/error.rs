// --- File: crates/agendar_common/src/error.rs ---
use thiserror::Error;

use crate::services::AutomationError;

/// The shared error taxonomy for Agendar failures.
///
/// Feature crates keep their own concrete error enums and convert into this
/// taxonomy at the HTTP boundary, where [`HttpStatusCode`] decides the
/// response status.
#[derive(Error, Debug)]
pub enum AgendarError {
    /// Malformed date, missing required field. Surfaced immediately, no retry.
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// The automation backend answered with a payload shape we do not
    /// recognize. Recovered locally by falling back to an unavailable day.
    #[error("Unrecognized upstream payload: {0}")]
    UpstreamFormatError(String),

    /// Network failure or non-2xx from the automation backend. Retryable.
    #[error("Automation backend unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The email allow/deny gate rejected the caller.
    #[error("Authorization denied: {0}")]
    AuthorizationDenied(String),

    /// Missing or unusable configuration.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// A trait for converting errors to HTTP status codes.
pub trait HttpStatusCode {
    /// Returns the HTTP status code for this error.
    fn status_code(&self) -> u16;
}

impl HttpStatusCode for AgendarError {
    fn status_code(&self) -> u16 {
        match self {
            AgendarError::ValidationError(_) => 400,
            AgendarError::UpstreamFormatError(_) => 200, // absorbed, never a hard failure
            AgendarError::UpstreamUnavailable(_) => 502,
            AgendarError::AuthorizationDenied(_) => 403,
            AgendarError::ConfigError(_) => 500,
        }
    }
}

impl From<AutomationError> for AgendarError {
    fn from(err: AutomationError) -> Self {
        match err {
            AutomationError::Transport(msg) => AgendarError::UpstreamUnavailable(msg),
            AutomationError::Status { status, body } => {
                AgendarError::UpstreamUnavailable(format!("status {status}: {body}"))
            }
            AutomationError::Decode(msg) => AgendarError::UpstreamFormatError(msg),
        }
    }
}
