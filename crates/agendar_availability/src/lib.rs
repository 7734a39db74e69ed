// --- File: crates/agendar_availability/src/lib.rs ---
// Declare modules within this crate
pub mod doc;
pub mod error;
pub mod expand;
pub mod handlers;
pub mod models;
pub mod normalize;
#[cfg(test)]
mod normalize_proptest;
#[cfg(test)]
mod normalize_test;
pub mod routes;
pub mod slots;
pub mod timefilter;
