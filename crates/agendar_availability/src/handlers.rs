// --- File: crates/agendar_availability/src/handlers.rs ---
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use tracing::{info, warn};

use agendar_common::services::{AutomationError, AutomationService};
use agendar_common::{AgendarError, HttpStatusCode};
use agendar_config::AppConfig;

use crate::expand::{parse_date, DateWindow};
use crate::models::{
    AgendarAvailabilityResponse, AvailabilityQuery, DailyAvailabilityResponse, ErrorResponse,
    WeeklyAvailabilityResponse,
};
use crate::normalize::{Normalizer, CALENDAR_MESSAGE};
use crate::timefilter;

pub const LIVE_SOURCE: &str = "Make.com Webhook";
pub const FALLBACK_SOURCE: &str = "Fallback Mode";
const FALLBACK_NOTE: &str = "Horários padrão; agenda temporariamente indisponível";
const UPSTREAM_DOWN_REASON: &str = "Serviço de agenda temporariamente indisponível";

// Shared state for the availability handlers.
#[derive(Clone)]
pub struct AvailabilityState {
    pub config: Arc<AppConfig>,
    pub automation: Arc<dyn AutomationService>,
}

type HandlerError = (StatusCode, Json<ErrorResponse>);

fn bad_request(reason: &str) -> HandlerError {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(reason)))
}

/// Status for a failed upstream call, via the shared taxonomy. Format
/// failures are absorbed by the normalizer, so when the call itself fails
/// they still surface as a gateway error here.
fn upstream_failure(err: AutomationError, reason: &str) -> HandlerError {
    let err = AgendarError::from(err);
    warn!(%err, "automation backend call failed");
    let status = match err.status_code() {
        200 => StatusCode::BAD_GATEWAY,
        code => StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_GATEWAY),
    };
    (status, Json(ErrorResponse::new(reason)))
}

/// Handler for `GET /availability`.
///
/// Three shapes behind one route, switched on the query parameters:
/// `?date=` (single day, with catalogue fallback on upstream failure),
/// `?startDate=&endDate=` (inclusive range) and the same range with
/// `?checkAgendar=true` (day-granularity attend variant).
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/availability",
    params(AvailabilityQuery),
    responses(
        (status = 200, description = "Availability for the requested day or range", body = WeeklyAvailabilityResponse),
        (status = 400, description = "Missing or malformed query parameters", body = ErrorResponse),
        (status = 502, description = "Automation backend unreachable on a range query", body = ErrorResponse)
    ),
    tag = "Availability"
))]
pub async fn get_availability_handler(
    State(state): State<Arc<AvailabilityState>>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Response, HandlerError> {
    let normalizer = Normalizer::from_config(&state.config.schedule).map_err(|err| {
        let err = AgendarError::ConfigError(err.to_string());
        warn!(%err, "schedule configuration is unusable");
        (
            StatusCode::from_u16(err.status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            Json(ErrorResponse::new("Configuração de agenda inválida")),
        )
    })?;

    if query.check_agendar.unwrap_or(false) {
        return agendar_range(&state, &normalizer, &query).await;
    }
    if query.date.is_some() {
        return daily(&state, &normalizer, &query).await;
    }
    if query.start_date.is_some() || query.end_date.is_some() {
        return weekly_range(&state, &normalizer, &query).await;
    }
    Err(bad_request(
        "Parâmetro date ou startDate/endDate é obrigatório",
    ))
}

async fn daily(
    state: &AvailabilityState,
    normalizer: &Normalizer,
    query: &AvailabilityQuery,
) -> Result<Response, HandlerError> {
    let day = parse_date(query.date.as_deref().unwrap_or_default())
        .map_err(|_| bad_request("Formato de data inválido, use YYYY-MM-DD"))?;
    // chrono accepts unpadded input; fill_range keys are always %Y-%m-%d,
    // so the lookup and the echoed date must use the canonical form
    let date = day.format("%Y-%m-%d").to_string();
    let date = date.as_str();
    let window = DateWindow::single(day);
    let tz = normalizer.timezone();
    let now = Utc::now().with_timezone(&tz);

    match state.automation.fetch_day_raw(date).await {
        Ok(raw) => {
            let days = normalizer.normalize(&raw, &window);
            // fill_range guarantees the requested date is present
            let mut entry = days
                .get(date)
                .cloned()
                .unwrap_or_else(|| crate::models::DayAvailability::unavailable(date, ""));
            timefilter::apply(&mut entry, now);
            info!(
                date,
                available = entry.available_slots.len(),
                booked = entry.booked_slots.len(),
                "serving daily availability"
            );
            Ok(Json(DailyAvailabilityResponse {
                success: true,
                date: date.to_string(),
                available_slots: entry.available_slots,
                booked_slots: entry.booked_slots,
                timezone: tz.to_string(),
                last_updated: now.to_rfc3339(),
                source: LIVE_SOURCE.to_string(),
                note: None,
            })
            .into_response())
        }
        Err(err) if state.config.use_daily_fallback => {
            warn!(%err, date, "daily upstream failed; serving catalogue fallback");
            let mut entry = crate::models::DayAvailability::with_slots(
                date,
                normalizer.catalogue().base_slots().to_vec(),
                Vec::new(),
                CALENDAR_MESSAGE,
            );
            timefilter::apply(&mut entry, now);
            Ok(Json(DailyAvailabilityResponse {
                success: true,
                date: date.to_string(),
                available_slots: entry.available_slots,
                booked_slots: entry.booked_slots,
                timezone: tz.to_string(),
                last_updated: now.to_rfc3339(),
                source: FALLBACK_SOURCE.to_string(),
                note: Some(FALLBACK_NOTE.to_string()),
            })
            .into_response())
        }
        Err(err) => {
            warn!(date, "daily upstream failed; fallback disabled");
            Err(upstream_failure(err, UPSTREAM_DOWN_REASON))
        }
    }
}

async fn weekly_range(
    state: &AvailabilityState,
    normalizer: &Normalizer,
    query: &AvailabilityQuery,
) -> Result<Response, HandlerError> {
    let (window, start, end) = range_window(query)?;
    let tz = normalizer.timezone();
    let now = Utc::now().with_timezone(&tz);

    let raw = state
        .automation
        .fetch_range_raw(&start, &end)
        .await
        .map_err(|err| {
            warn!(start, end, "range upstream failed");
            upstream_failure(err, UPSTREAM_DOWN_REASON)
        })?;
    let mut days = normalizer.normalize(&raw, &window);
    if let Some(today) = days.get_mut(&now.format("%Y-%m-%d").to_string()) {
        timefilter::apply(today, now);
    }
    info!(start, end, days = days.len(), "serving weekly availability");
    Ok(Json(WeeklyAvailabilityResponse {
        success: true,
        start_date: start,
        end_date: end,
        weekly_availability: days,
        timezone: tz.to_string(),
        last_updated: now.to_rfc3339(),
        source: LIVE_SOURCE.to_string(),
    })
    .into_response())
}

async fn agendar_range(
    state: &AvailabilityState,
    normalizer: &Normalizer,
    query: &AvailabilityQuery,
) -> Result<Response, HandlerError> {
    let (window, start, end) = range_window(query)?;
    let tz = normalizer.timezone();
    let now = Utc::now().with_timezone(&tz);

    let raw = state
        .automation
        .fetch_range_raw(&start, &end)
        .await
        .map_err(|err| {
            warn!(start, end, "agendar upstream failed");
            upstream_failure(err, UPSTREAM_DOWN_REASON)
        })?;
    let days = normalizer.normalize(&raw, &window);
    info!(start, end, days = days.len(), "serving agendar availability");
    Ok(Json(AgendarAvailabilityResponse {
        success: true,
        start_date: start,
        end_date: end,
        agendar_availability: days,
        timezone: tz.to_string(),
        last_updated: now.to_rfc3339(),
        source: LIVE_SOURCE.to_string(),
    })
    .into_response())
}

fn range_window(query: &AvailabilityQuery) -> Result<(DateWindow, String, String), HandlerError> {
    let (Some(start), Some(end)) = (query.start_date.as_deref(), query.end_date.as_deref()) else {
        return Err(bad_request(
            "Parâmetros startDate e endDate são obrigatórios",
        ));
    };
    let start_day =
        parse_date(start).map_err(|_| bad_request("startDate inválida, use YYYY-MM-DD"))?;
    let end_day = parse_date(end).map_err(|_| bad_request("endDate inválida, use YYYY-MM-DD"))?;
    let window = DateWindow::new(start_day, end_day)
        .map_err(|_| bad_request("endDate deve ser igual ou posterior a startDate"))?;
    Ok((window, start.to_string(), end.to_string()))
}
