// --- File: crates/agendar_widget/src/lib.rs ---
// Declare modules within this crate
pub mod cache;
pub mod client;
pub mod controller;

pub use cache::AvailabilityCache;
pub use client::{AvailabilityClient, BookingAck, ClientError, VerifyVerdict};
pub use controller::{BookingFormController, Command, EmptyState, Event, Phase, RangeKind};
