// --- File: crates/agendar_booking/src/handlers.rs ---
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use agendar_common::services::AutomationService;
use agendar_common::{log_error, AgendarError, HttpStatusCode};
use agendar_config::AppConfig;

use crate::logic::{
    booking_email, is_valid_email, validate_booking, BookingError, BookingErrorResponse,
    BookingResponse, VerifyResponse,
};

const INVALID_BOOKING_REASON: &str = "Dados de agendamento inválidos.";
const DENIED_REASON: &str = "E-mail não autorizado para agendamentos.";
const VERIFY_FAILED_REASON: &str = "Falha na verificação (upstream).";
const BOOKING_FAILED_REASON: &str = "Falha ao criar agendamento no calendário.";
const BOOKED_MESSAGE: &str = "Agendamento criado com sucesso!";
const INVALID_EMAIL_REASON: &str = "E-mail inválido.";

// Shared state for the booking handlers.
#[derive(Clone)]
pub struct BookingState {
    pub config: Arc<AppConfig>,
    pub automation: Arc<dyn AutomationService>,
}

#[derive(Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct VerifyRequest {
    pub email: String,
}

type BookingFailure = (StatusCode, Json<BookingErrorResponse>);

/// Maps a taxonomy error to its response status, pairing it with the
/// user-facing (Portuguese) reason.
fn failure(err: AgendarError, reason: impl Into<String>) -> BookingFailure {
    log_error(&err, "booking request rejected");
    let status = match err.status_code() {
        200 => StatusCode::BAD_GATEWAY,
        code => StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_GATEWAY),
    };
    (status, Json(BookingErrorResponse::new(reason)))
}

/// Handler for `POST /booking`.
///
/// Validation first, then the email allow-list gate, then the calendar
/// webhook. The gate runs before any calendar write so a denied email never
/// reaches the scenario.
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/booking",
    request_body = Value,
    responses(
        (status = 200, description = "Booking created", body = BookingResponse),
        (status = 400, description = "Invalid booking payload", body = BookingErrorResponse),
        (status = 403, description = "Email denied by the allow list", body = BookingErrorResponse),
        (status = 502, description = "Automation backend failure", body = BookingErrorResponse)
    ),
    tag = "Booking"
))]
pub async fn create_booking_handler(
    State(state): State<Arc<BookingState>>,
    Json(payload): Json<Value>,
) -> Result<Json<BookingResponse>, BookingFailure> {
    if let Err(err) = validate_booking(&payload, Utc::now()) {
        let reason = match err {
            BookingError::InvalidEmail => INVALID_EMAIL_REASON,
            _ => INVALID_BOOKING_REASON,
        };
        return Err(failure(
            AgendarError::ValidationError(err.to_string()),
            reason,
        ));
    }

    // validate_booking already guarantees the field is present
    let email = booking_email(&payload).unwrap_or_default().to_string();
    match state.automation.verify_email(&email).await {
        Ok(outcome) if outcome.allowed => {}
        Ok(outcome) => {
            let reason = outcome.reason.unwrap_or_else(|| DENIED_REASON.to_string());
            return Err(failure(
                AgendarError::AuthorizationDenied(reason.clone()),
                reason,
            ));
        }
        Err(err) => {
            warn!("email gate unreachable; refusing the booking");
            return Err(failure(AgendarError::from(err), VERIFY_FAILED_REASON));
        }
    }

    match state.automation.create_booking(payload).await {
        Ok(outcome) => {
            info!(event_id = ?outcome.event_id, "booking created");
            Ok(Json(BookingResponse {
                success: true,
                message: BOOKED_MESSAGE.to_string(),
                event_id: outcome.event_id,
            }))
        }
        Err(err) => {
            warn!("calendar webhook failed");
            Err(failure(AgendarError::from(err), BOOKING_FAILED_REASON))
        }
    }
}

/// Handler for `POST /verify`: the standalone email allow-list check.
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/verify",
    request_body = VerifyRequest,
    responses(
        (status = 200, description = "Email allowed", body = VerifyResponse),
        (status = 400, description = "Malformed email", body = VerifyResponse),
        (status = 403, description = "Email denied", body = VerifyResponse),
        (status = 502, description = "Automation backend failure", body = VerifyResponse)
    ),
    tag = "Booking"
))]
pub async fn verify_email_handler(
    State(state): State<Arc<BookingState>>,
    Json(request): Json<VerifyRequest>,
) -> (StatusCode, Json<VerifyResponse>) {
    if !is_valid_email(&request.email) {
        return (
            StatusCode::BAD_REQUEST,
            Json(VerifyResponse {
                allowed: false,
                reason: Some(INVALID_EMAIL_REASON.to_string()),
            }),
        );
    }

    match state.automation.verify_email(&request.email).await {
        Ok(outcome) if outcome.allowed => (
            StatusCode::OK,
            Json(VerifyResponse {
                allowed: true,
                reason: None,
            }),
        ),
        Ok(outcome) => (
            StatusCode::FORBIDDEN,
            Json(VerifyResponse {
                allowed: false,
                reason: Some(outcome.reason.unwrap_or_else(|| "Não autorizado.".to_string())),
            }),
        ),
        Err(err) => {
            warn!(%err, "verification webhook unreachable");
            (
                StatusCode::BAD_GATEWAY,
                Json(VerifyResponse {
                    allowed: false,
                    reason: Some(VERIFY_FAILED_REASON.to_string()),
                }),
            )
        }
    }
}
