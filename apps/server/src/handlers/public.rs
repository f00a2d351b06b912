//! Public read-only endpoints: the service catalog, the taken-slot feed the
//! booking calendar polls, and per-service availability for a given day.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, NaiveDate, Timelike, Utc};
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::models::{AvailabilityQuery, BookingSummary, ErrorBody, Service};
use crate::rules::{self, Minutes};
use crate::AppState;

#[derive(Serialize)]
pub struct ServicesResponse {
    pub services: Vec<Service>,
}

#[derive(Serialize)]
pub struct BookingsResponse {
    pub bookings: Vec<BookingSummary>,
}

#[derive(Serialize)]
pub struct AvailabilityResponse {
    /// "HH:MM" business-local start times still open on the requested day.
    pub times: Vec<String>,
}

/// GET /api/services — active catalog rows in display order.
pub async fn list_services(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ServicesResponse>, StatusCode> {
    let services = sqlx::query_as::<_, Service>(
        "SELECT id, name, description, price_cents, duration_min, is_active, sort_order, service_type
         FROM services WHERE is_active = 1 ORDER BY sort_order ASC",
    )
    .fetch_all(&state.db)
    .await
    .map_err(|e| {
        tracing::error!("list_services: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(Json(ServicesResponse { services }))
}

/// GET /api/bookings — start instants of every non-cancelled booking.
/// Deliberately thin: no names, no contact info, just which minutes are taken.
pub async fn list_booked_slots(
    State(state): State<Arc<AppState>>,
) -> Result<Json<BookingsResponse>, StatusCode> {
    let bookings = sqlx::query_as::<_, BookingSummary>(
        "SELECT id, start_at FROM bookings WHERE status != 'CANCELLED' ORDER BY start_at ASC",
    )
    .fetch_all(&state.db)
    .await
    .map_err(|e| {
        tracing::error!("list_booked_slots: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(Json(BookingsResponse { bookings }))
}

/// GET /api/availability?serviceId=N&date=YYYY-MM-DD — open start times for
/// one service on one business-local day. Unknown or inactive services get an
/// empty list rather than an error, same as a day with no windows.
pub async fn availability(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<AvailabilityResponse>, (StatusCode, Json<ErrorBody>)> {
    let date = NaiveDate::parse_from_str(&query.date, "%Y-%m-%d").map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorBody::new("Invalid date.")),
        )
    })?;

    let service = sqlx::query_as::<_, Service>(
        "SELECT id, name, description, price_cents, duration_min, is_active, sort_order, service_type
         FROM services WHERE id = ? AND is_active = 1",
    )
    .bind(query.service_id)
    .fetch_optional(&state.db)
    .await
    .map_err(|e| {
        tracing::error!("availability: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody::new("Internal error")),
        )
    })?;

    let Some(service) = service else {
        return Ok(Json(AvailabilityResponse { times: vec![] }));
    };

    let service_type = rules::validate::service_type_of(&service);
    let open = rules::resolve(service_type, date);
    if open.is_empty() {
        return Ok(Json(AvailabilityResponse { times: vec![] }));
    }

    let existing: Vec<DateTime<Utc>> = sqlx::query_scalar(
        "SELECT start_at FROM bookings WHERE status != 'CANCELLED'",
    )
    .fetch_all(&state.db)
    .await
    .map_err(|e| {
        tracing::error!("availability: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody::new("Internal error")),
        )
    })?;

    // Minutes of this business-local day already taken by any service.
    let taken: BTreeSet<Minutes> = existing
        .iter()
        .map(|t| t.with_timezone(&state.business_offset))
        .filter(|local| local.date_naive() == date)
        .map(|local| (local.hour() * 60 + local.minute()) as Minutes)
        .collect();

    let times = open
        .into_iter()
        .filter(|m| !taken.contains(m))
        .map(rules::format_hhmm)
        .collect();

    Ok(Json(AvailabilityResponse { times }))
}
