// --- File: crates/agendar_common/src/http.rs ---
pub mod client;

pub use client::HTTP_CLIENT;
