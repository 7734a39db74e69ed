// --- File: crates/agendar_make/src/client.rs ---
//! Make.com webhook transport.
//!
//! Thin HTTP layer behind [`AutomationService`]: availability feeds are GET
//! webhooks keyed by query parameters, booking and verification are POST
//! webhooks with JSON bodies. No payload interpretation happens here; the
//! raw JSON goes to the normalizer untouched.

use reqwest::{RequestBuilder, Response};
use serde_json::Value;
use tracing::{debug, warn};

use agendar_common::http::HTTP_CLIENT;
use agendar_common::services::{
    AutomationError, AutomationService, BookingOutcome, BoxFuture, VerifyOutcome,
};
use agendar_config::MakeConfig;

const API_KEY_HEADER: &str = "X-Api-Key";

/// [`AutomationService`] implementation over the configured Make webhooks.
pub struct MakeAutomationService {
    config: MakeConfig,
}

impl MakeAutomationService {
    pub fn new(config: MakeConfig) -> Self {
        MakeAutomationService { config }
    }

    fn with_headers(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.api_key {
            Some(key) => request.header(API_KEY_HEADER, key),
            None => request,
        }
    }

    async fn json_body(response: Response) -> Result<Value, AutomationError> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            warn!(status = status.as_u16(), "webhook answered with an error");
            return Err(AutomationError::Status {
                status: status.as_u16(),
                body,
            });
        }
        serde_json::from_str(&body).map_err(|err| {
            warn!(%err, "webhook body was not JSON");
            AutomationError::Decode(err.to_string())
        })
    }
}

impl AutomationService for MakeAutomationService {
    fn fetch_day_raw(&self, date: &str) -> BoxFuture<'_, Value, AutomationError> {
        let request = self.with_headers(
            HTTP_CLIENT
                .get(&self.config.availability_url)
                .query(&[("date", date)]),
        );
        let date = date.to_string();
        Box::pin(async move {
            debug!(date, "fetching daily availability feed");
            let response = request.send().await?;
            Self::json_body(response).await
        })
    }

    fn fetch_range_raw(
        &self,
        start_date: &str,
        end_date: &str,
    ) -> BoxFuture<'_, Value, AutomationError> {
        let request = self.with_headers(
            HTTP_CLIENT
                .get(&self.config.events_url)
                .query(&[("startDate", start_date), ("endDate", end_date)]),
        );
        let start = start_date.to_string();
        let end = end_date.to_string();
        Box::pin(async move {
            debug!(start, end, "fetching range event feed");
            let response = request.send().await?;
            Self::json_body(response).await
        })
    }

    fn create_booking(&self, booking: Value) -> BoxFuture<'_, BookingOutcome, AutomationError> {
        let request = self.with_headers(HTTP_CLIENT.post(&self.config.booking_url).json(&booking));
        Box::pin(async move {
            debug!("forwarding booking to the calendar webhook");
            let response = request.send().await?;
            let status = response.status();
            let body = response.text().await?;
            if !status.is_success() {
                warn!(status = status.as_u16(), "booking webhook rejected the request");
                return Err(AutomationError::Status {
                    status: status.as_u16(),
                    body,
                });
            }
            // The scenario sometimes acknowledges with plain text instead of
            // JSON; a 2xx is a created booking either way.
            Ok(serde_json::from_str(&body).unwrap_or_else(|_| BookingOutcome {
                event_id: None,
                message: Some(body),
            }))
        })
    }

    fn verify_email(&self, email: &str) -> BoxFuture<'_, VerifyOutcome, AutomationError> {
        let request = self.with_headers(
            HTTP_CLIENT
                .post(&self.config.verify_url)
                .json(&serde_json::json!({ "email": email })),
        );
        Box::pin(async move {
            debug!("checking email against the allow list");
            let response = request.send().await?;
            let status = response.status();
            let body = response.text().await?;
            if !status.is_success() {
                warn!(status = status.as_u16(), "verification webhook failed");
                return Err(AutomationError::Status {
                    status: status.as_u16(),
                    body,
                });
            }
            // Anything that is not an explicit {allowed: true} denies.
            Ok(serde_json::from_str(&body).unwrap_or_default())
        })
    }
}
