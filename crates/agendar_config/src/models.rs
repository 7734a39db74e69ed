// --- File: crates/agendar_config/src/models.rs ---

use serde::{Deserialize, Serialize};

// --- General Server Config ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

// --- Schedule Config ---
// The slot catalogue is configuration, not a constant: deployments differ
// on working hours and grid spacing.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ScheduleConfig {
    /// IANA timezone all slot times are interpreted in. Defaults to
    /// America/Sao_Paulo regardless of the host timezone.
    pub time_zone: Option<String>,
    /// Explicit base slot labels (HH:MM). Wins over the derived grid.
    pub base_slots: Option<Vec<String>>,
    /// Duration of one slot in minutes. Defaults to 60.
    pub slot_duration_minutes: Option<i64>,
    /// Start of the working day, HH:MM. Defaults to 13:30.
    pub work_start: Option<String>,
    /// Last bookable start, HH:MM. Defaults to 21:30.
    pub work_end: Option<String>,
    /// Gap between consecutive slot starts in minutes. Defaults to 120.
    pub interval_minutes: Option<i64>,
    /// When true, a booked slot also closes the slot immediately before and
    /// after it. Policy flag, off by default.
    #[serde(default)]
    pub exclude_adjacent: bool,
    /// Event name marking "this day accepts bookings". Defaults to "Atender".
    pub attend_event_name: Option<String>,
    /// Event status required alongside the attend marker. Defaults to "confirmed".
    pub attend_event_status: Option<String>,
}

// --- Automation Backend (Make) Config ---
// Holds the webhook URLs. The API key is a secret loaded via AGENDAR_MAKE__API_KEY.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct MakeConfig {
    /// Webhook answering the single-day busy feed.
    pub availability_url: String,
    /// Webhook answering the date-range event feed.
    pub events_url: String,
    /// Webhook that creates the calendar booking.
    pub booking_url: String,
    /// Webhook implementing the email allow/deny check.
    pub verify_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

// --- Cache Config ---
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct CacheConfig {
    /// TTL for cached day availability, in seconds. Defaults to 300.
    pub ttl_seconds: Option<u64>,
}

// --- Widget / UI Config ---
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct UiConfig {
    /// Size of the visible date window. Defaults to 8.
    pub max_dates: Option<u32>,
    /// Whether booked slots are rendered (non-interactive) next to open ones.
    #[serde(default)]
    pub show_booked_slots: bool,
}

// --- Unified App Configuration ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    // Server config is mandatory
    pub server: ServerConfig,

    /// Serve the default catalogue when the daily upstream check fails.
    /// Range queries never fall back; they surface the error instead.
    #[serde(default)]
    pub use_daily_fallback: bool,

    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub make: Option<MakeConfig>,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub ui: UiConfig,
}
