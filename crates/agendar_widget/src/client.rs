// --- File: crates/agendar_widget/src/client.rs ---
//! HTTP client for the availability/booking API.
//!
//! Wraps reqwest with a bounded timeout and the day cache; every failure is
//! a typed [`ClientError`] so the widget can render a retry affordance
//! instead of crashing.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use agendar_availability::models::{AvailabilityMap, DayAvailability};

use crate::cache::AvailabilityCache;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("falha de rede: {0}")]
    Transport(String),
    #[error("o servidor respondeu {status}: {reason}")]
    Status { status: u16, reason: String },
    #[error("resposta ilegível: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Transport(err.to_string())
    }
}

/// Acknowledgment of a submitted booking.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingAck {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub event_id: Option<String>,
}

/// Verdict of the email allow-list check.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyVerdict {
    pub allowed: bool,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DailyPayload {
    date: String,
    #[serde(default)]
    available_slots: Vec<String>,
    #[serde(default)]
    booked_slots: Vec<String>,
    #[serde(default)]
    note: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RangePayload {
    weekly_availability: AvailabilityMap,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AgendarPayload {
    agendar_availability: AvailabilityMap,
}

#[derive(Deserialize, Default)]
struct FailurePayload {
    #[serde(default)]
    reason: Option<String>,
}

/// Client over the `/api` surface, with a TTL cache for single-day lookups.
pub struct AvailabilityClient {
    base_url: String,
    http: Client,
    cache: AvailabilityCache,
}

impl AvailabilityClient {
    pub fn new(base_url: impl Into<String>, cache: AvailabilityCache) -> Result<Self, ClientError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| ClientError::Transport(err.to_string()))?;
        Ok(AvailabilityClient {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
            cache,
        })
    }

    /// Availability for one date, served from cache within the TTL.
    pub async fn fetch_day(
        &mut self,
        date: &str,
        now: DateTime<Utc>,
    ) -> Result<DayAvailability, ClientError> {
        if let Some(cached) = self.cache.get(date, now) {
            debug!(date, "day availability served from cache");
            return Ok(cached.clone());
        }
        let url = format!("{}/availability", self.base_url);
        let response = self.http.get(&url).query(&[("date", date)]).send().await?;
        let payload: DailyPayload = decode(response).await?;
        let day = DayAvailability::with_slots(
            payload.date,
            payload.available_slots,
            payload.booked_slots,
            payload.note.unwrap_or_default(),
        );
        self.cache.insert(date, day.clone(), now);
        Ok(day)
    }

    /// Availability for an inclusive date range. Never cached; range answers
    /// supersede whole windows at once.
    pub async fn fetch_range(
        &self,
        start_date: &str,
        end_date: &str,
    ) -> Result<AvailabilityMap, ClientError> {
        let url = format!("{}/availability", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[("startDate", start_date), ("endDate", end_date)])
            .send()
            .await?;
        let payload: RangePayload = decode(response).await?;
        Ok(payload.weekly_availability)
    }

    /// Day-granularity range driven by the attend-event marker.
    pub async fn fetch_agendar_range(
        &self,
        start_date: &str,
        end_date: &str,
    ) -> Result<AvailabilityMap, ClientError> {
        let url = format!("{}/availability", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[
                ("checkAgendar", "true"),
                ("startDate", start_date),
                ("endDate", end_date),
            ])
            .send()
            .await?;
        let payload: AgendarPayload = decode(response).await?;
        Ok(payload.agendar_availability)
    }

    /// Submit a booking and evict the booked date from the cache on success.
    pub async fn submit_booking(&mut self, booking: Value) -> Result<BookingAck, ClientError> {
        let date = booking
            .get("date")
            .and_then(Value::as_str)
            .map(str::to_string);
        let url = format!("{}/booking", self.base_url);
        let response = self.http.post(&url).json(&booking).send().await?;
        let ack: BookingAck = decode(response).await?;
        if ack.success {
            if let Some(date) = date {
                self.cache.invalidate(&date);
            }
        }
        Ok(ack)
    }

    pub async fn verify_email(&self, email: &str) -> Result<VerifyVerdict, ClientError> {
        let url = format!("{}/verify", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(&serde_json::json!({ "email": email }))
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        // 403 still carries a well-formed verdict body
        serde_json::from_str(&body).map_err(|err| {
            if status.is_success() {
                ClientError::Decode(err.to_string())
            } else {
                ClientError::Status {
                    status: status.as_u16(),
                    reason: body,
                }
            }
        })
    }

    pub fn invalidate(&mut self, date: &str) {
        self.cache.invalidate(date);
    }

    pub fn cache(&mut self) -> &mut AvailabilityCache {
        &mut self.cache
    }
}

async fn decode<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        let failure: FailurePayload = serde_json::from_str(&body).unwrap_or_default();
        warn!(status = status.as_u16(), "request rejected by the server");
        return Err(ClientError::Status {
            status: status.as_u16(),
            reason: failure.reason.unwrap_or(body),
        });
    }
    serde_json::from_str(&body).map_err(|err| ClientError::Decode(err.to_string()))
}
