// --- File: crates/agendar_common/src/http/client.rs ---
use once_cell::sync::Lazy;
use reqwest::Client;
use std::time::Duration;

/// Default timeout for HTTP requests in seconds.
///
/// The automation backend has unpredictable latency; everything that talks to
/// it goes through a client carrying this bound.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// A static HTTP client that can be reused across the application.
pub static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
        .build()
        .expect("Failed to create HTTP client")
});
