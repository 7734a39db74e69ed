// --- File: crates/agendar_availability/src/doc.rs ---

#![allow(dead_code)]
#![cfg(feature = "openapi")]
use utoipa::OpenApi;

use crate::models::{
    AgendarAvailabilityResponse, DailyAvailabilityResponse, DayAvailability, ErrorResponse,
    WeeklyAvailabilityResponse,
};

#[utoipa::path(
    get,
    path = "/availability",
    params(
        ("date" = Option<String>, Query, description = "Single day in YYYY-MM-DD format", example = "2025-08-25", format = "date"),
        ("startDate" = Option<String>, Query, description = "Range start in YYYY-MM-DD format", example = "2025-08-25", format = "date"),
        ("endDate" = Option<String>, Query, description = "Range end in YYYY-MM-DD format, inclusive", example = "2025-09-01", format = "date"),
        ("checkAgendar" = Option<bool>, Query, description = "Day-granularity attend-event variant over the range", example = false)
    ),
    responses(
        (status = 200, description = "Daily availability", body = DailyAvailabilityResponse,
         example = json!({
             "success": true,
             "date": "2025-08-25",
             "availableSlots": ["13:30", "15:30", "17:30", "19:30", "21:30"],
             "bookedSlots": [],
             "timezone": "America/Sao_Paulo",
             "lastUpdated": "2025-08-25T09:00:00-03:00",
             "source": "Make.com Webhook"
         })
        ),
        (status = 400, description = "Missing or malformed parameters", body = ErrorResponse),
        (status = 502, description = "Automation backend unreachable on a range query", body = ErrorResponse)
    )
)]
fn doc_get_availability_handler() {}

#[derive(OpenApi)]
#[openapi(
    paths(doc_get_availability_handler),
    components(schemas(
        DayAvailability,
        DailyAvailabilityResponse,
        WeeklyAvailabilityResponse,
        AgendarAvailabilityResponse,
        ErrorResponse
    )),
    tags((name = "Availability", description = "Appointment availability endpoints"))
)]
pub struct AvailabilityApiDoc;
