// --- File: crates/agendar_common/src/lib.rs ---

// Declare modules within this crate
pub mod error; // Error handling
pub mod http; // HTTP utilities
pub mod logging; // Logging utilities
pub mod services; // Automation-backend abstraction

// Re-export error types and utilities for easier access
pub use error::{AgendarError, HttpStatusCode};

// Re-export HTTP utilities for easier access
pub use http::HTTP_CLIENT;

// Re-export logging utilities for easier access
pub use logging::{init, init_with_level, log_error};

pub use services::{AutomationError, AutomationService, BookingOutcome, BoxFuture, VerifyOutcome};
