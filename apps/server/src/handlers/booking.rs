//! POST /api/book — the one write path the public can reach.
//!
//! The handler only fetches context and persists; every acceptance decision
//! lives in `rules::validate`. The unique index on active booking starts is
//! the last line of defense against two requests racing past the in-memory
//! conflict check.

use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::models::{BookCreated, BookRequest, ErrorBody, Service};
use crate::notify::NewBookingAlert;
use crate::rules::{validate, Rejection, ValidationContext};
use crate::AppState;

fn rejection_response(r: Rejection) -> (StatusCode, Json<ErrorBody>) {
    let status = if r.is_conflict() {
        StatusCode::CONFLICT
    } else {
        StatusCode::BAD_REQUEST
    };
    (status, Json(ErrorBody::new(r.to_string())))
}

fn internal_error(e: impl std::fmt::Display) -> (StatusCode, Json<ErrorBody>) {
    tracing::error!("create_booking: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody::new("Internal error")),
    )
}

pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BookRequest>,
) -> Result<Json<BookCreated>, (StatusCode, Json<ErrorBody>)> {
    // ── Pre-fetch everything the validator needs ──

    let service = match req.service_id {
        Some(id) => sqlx::query_as::<_, Service>(
            "SELECT id, name, description, price_cents, duration_min, is_active, sort_order, service_type
             FROM services WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&state.db)
        .await
        .map_err(internal_error)?,
        None => None,
    };

    let addon_ids: BTreeSet<i64> = req.add_ons.iter().copied().collect();
    let mut addons: Vec<Service> = Vec::with_capacity(addon_ids.len());
    for id in &addon_ids {
        let row = sqlx::query_as::<_, Service>(
            "SELECT id, name, description, price_cents, duration_min, is_active, sort_order, service_type
             FROM services WHERE id = ? AND is_active = 1",
        )
        .bind(id)
        .fetch_optional(&state.db)
        .await
        .map_err(internal_error)?;
        if let Some(row) = row {
            addons.push(row);
        }
    }

    let existing_starts: Vec<DateTime<Utc>> =
        sqlx::query_scalar("SELECT start_at FROM bookings WHERE status != 'CANCELLED'")
            .fetch_all(&state.db)
            .await
            .map_err(internal_error)?;

    // ── Validate ──

    let ctx = ValidationContext {
        service: service.as_ref(),
        addons: &addons,
        existing_starts: &existing_starts,
        business_offset: state.business_offset,
    };
    let validated = validate(&req, &ctx).map_err(rejection_response)?;

    // Safe after validation: MissingFields covers absence of these.
    let service = service.as_ref().ok_or_else(|| {
        internal_error("service row vanished after validation")
    })?;
    let customer_name = req.customer_name.as_deref().unwrap_or("").trim();
    let email = req.email.as_deref().unwrap_or("").trim();
    let phone = req.phone.as_deref().unwrap_or("").trim();
    let notes = req.notes.as_deref().unwrap_or("").trim();

    // ── Persist ──

    let result = sqlx::query(
        "INSERT INTO bookings
            (service_id, customer_name, email, phone, start_at, notes, pet_count, status, total_cents)
         VALUES (?, ?, ?, ?, ?, ?, ?, 'PENDING', ?)",
    )
    .bind(service.id)
    .bind(customer_name)
    .bind(email)
    .bind(phone)
    .bind(validated.start_utc)
    .bind(notes)
    .bind(validated.pet_count as i64)
    .bind(validated.total_cents)
    .execute(&state.db)
    .await;

    let booking_id = match result {
        Ok(done) => done.last_insert_rowid(),
        // Two requests raced past the conflict check; the index caught the loser.
        Err(e) if e
            .as_database_error()
            .is_some_and(|db| db.is_unique_violation()) =>
        {
            return Err(rejection_response(Rejection::SlotTaken));
        }
        Err(e) => return Err(internal_error(e)),
    };

    tracing::info!(
        booking_id,
        service = %service.name,
        service_type = ?validated.service_type,
        start = %validated.start_utc,
        "booking created"
    );

    let start_local = validated
        .start_utc
        .with_timezone(&state.business_offset)
        .format("%Y-%m-%d %H:%M")
        .to_string();
    state.notifier.spawn_new_booking(NewBookingAlert {
        booking_id,
        service_name: service.name.clone(),
        customer_name: customer_name.to_string(),
        email: email.to_string(),
        phone: phone.to_string(),
        start_local,
        pet_count: validated.pet_count,
        total_cents: validated.total_cents,
        notes: notes.to_string(),
    });

    Ok(Json(BookCreated {
        ok: true,
        booking_id,
    }))
}
