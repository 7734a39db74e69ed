// --- File: crates/agendar_make/src/lib.rs ---
// Declare modules within this crate
pub mod client;

pub use client::MakeAutomationService;
