//! Admin session endpoints and the booking dashboard.
//!
//! Sessions are stateless HMAC cookies minted from the shared admin secret,
//! so every handler just re-verifies the cookie instead of hitting storage.

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::auth;
use crate::models::{
    AdminBookingAction, AdminBookingId, AdminLoginRequest, BookingDetail, ErrorBody, OkBody,
};
use crate::AppState;

#[derive(Serialize)]
pub struct AdminBookingsResponse {
    pub bookings: Vec<BookingDetail>,
}

fn db_error(ctx: &str, e: sqlx::Error) -> (StatusCode, Json<ErrorBody>) {
    tracing::error!("{}: {}", ctx, e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody::new("Internal error")),
    )
}

/// POST /api/admin/login — exchange the admin password for a session cookie.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AdminLoginRequest>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorBody>)> {
    if !auth::verify_password(&body.password, &state.admin_secret) {
        tracing::warn!("admin login rejected");
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(ErrorBody::new("Invalid password")),
        ));
    }

    let token = auth::issue_token(&state.admin_secret);
    Ok((
        [(header::SET_COOKIE, auth::session_cookie(&token))],
        Json(OkBody::ok()),
    ))
}

/// POST /api/admin/logout — expire the session cookie.
pub async fn logout() -> impl IntoResponse {
    ([(header::SET_COOKIE, auth::clear_cookie())], Json(OkBody::ok()))
}

/// GET /api/admin/me — session probe for the dashboard shell.
pub async fn me(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<OkBody>, (StatusCode, Json<ErrorBody>)> {
    auth::require_admin(&headers, &state.admin_secret)?;
    Ok(Json(OkBody::ok()))
}

/// GET /api/admin/bookings — most recent bookings with their service names.
pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<AdminBookingsResponse>, (StatusCode, Json<ErrorBody>)> {
    auth::require_admin(&headers, &state.admin_secret)?;

    let bookings = sqlx::query_as::<_, BookingDetail>(
        "SELECT b.id, s.name AS service_name, b.customer_name, b.email, b.phone,
                b.start_at, b.notes, b.pet_count, b.status, b.total_cents, b.created_at
         FROM bookings b
         JOIN services s ON s.id = b.service_id
         ORDER BY b.created_at DESC
         LIMIT 200",
    )
    .fetch_all(&state.db)
    .await
    .map_err(|e| db_error("admin list_bookings", e))?;

    Ok(Json(AdminBookingsResponse { bookings }))
}

/// PATCH /api/admin/bookings — confirm or cancel one booking.
/// Cancelling frees the slot immediately; the partial unique index ignores
/// CANCELLED rows.
pub async fn update_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<AdminBookingAction>,
) -> Result<Json<OkBody>, (StatusCode, Json<ErrorBody>)> {
    auth::require_admin(&headers, &state.admin_secret)?;

    let status = match body.action.as_str() {
        "confirm" => "CONFIRMED",
        "cancel" => "CANCELLED",
        _ => {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorBody::new("Unknown action")),
            ))
        }
    };

    let updated = sqlx::query("UPDATE bookings SET status = ? WHERE id = ?")
        .bind(status)
        .bind(body.id)
        .execute(&state.db)
        .await
        .map_err(|e| db_error("admin update_booking", e))?
        .rows_affected();

    if updated == 0 {
        return Err((
            StatusCode::NOT_FOUND,
            Json(ErrorBody::new("Booking not found")),
        ));
    }

    tracing::info!(booking_id = body.id, status, "booking status changed");
    Ok(Json(OkBody::ok()))
}

/// DELETE /api/admin/bookings — remove a booking entirely.
pub async fn delete_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<AdminBookingId>,
) -> Result<Json<OkBody>, (StatusCode, Json<ErrorBody>)> {
    auth::require_admin(&headers, &state.admin_secret)?;

    let deleted = sqlx::query("DELETE FROM bookings WHERE id = ?")
        .bind(body.id)
        .execute(&state.db)
        .await
        .map_err(|e| db_error("admin delete_booking", e))?
        .rows_affected();

    if deleted == 0 {
        return Err((
            StatusCode::NOT_FOUND,
            Json(ErrorBody::new("Booking not found")),
        ));
    }

    tracing::info!(booking_id = body.id, "booking deleted");
    Ok(Json(OkBody::ok()))
}
