// --- File: crates/agendar_booking/src/doc.rs ---

#![allow(dead_code)]
#![cfg(feature = "openapi")]
use utoipa::OpenApi;

use crate::handlers::VerifyRequest;
use crate::logic::{BookingErrorResponse, BookingResponse, VerifyResponse};

#[utoipa::path(
    post,
    path = "/booking",
    request_body(content = serde_json::Value, example = json!({
        "date": "2025-08-25",
        "time": "15:30",
        "datetime": "2025-08-25T15:30:00-03:00",
        "name": "Ana Souza",
        "rg": "12.345.678-9",
        "cpf": "123.456.789-09",
        "email": "ana@example.com",
        "phone": "+55 11 91234-5678",
        "fetiche": "—",
        "conheceu": "Instagram",
        "duration": "60",
        "reason": "Primeira sessão"
    })),
    responses(
        (status = 200, description = "Booking created", body = BookingResponse,
         example = json!({
             "success": true,
             "message": "Agendamento criado com sucesso!",
             "eventId": "evt_123"
         })
        ),
        (status = 400, description = "Invalid booking payload", body = BookingErrorResponse),
        (status = 403, description = "Email denied by the allow list", body = BookingErrorResponse),
        (status = 502, description = "Automation backend failure", body = BookingErrorResponse)
    )
)]
fn doc_create_booking_handler() {}

#[utoipa::path(
    post,
    path = "/verify",
    request_body = VerifyRequest,
    responses(
        (status = 200, description = "Email allowed", body = VerifyResponse,
         example = json!({ "allowed": true })),
        (status = 403, description = "Email denied", body = VerifyResponse,
         example = json!({ "allowed": false, "reason": "Não autorizado." }))
    )
)]
fn doc_verify_email_handler() {}

#[derive(OpenApi)]
#[openapi(
    paths(doc_create_booking_handler, doc_verify_email_handler),
    components(schemas(BookingResponse, BookingErrorResponse, VerifyResponse, VerifyRequest)),
    tags((name = "Booking", description = "Appointment booking and email verification"))
)]
pub struct BookingApiDoc;
