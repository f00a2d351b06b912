use std::collections::BTreeSet;

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Timelike, Utc};
use thiserror::Error;

use crate::models::{BookRequest, Service};

use super::availability;
use super::classify::{self, ServiceType};
use super::conflict;
use super::pricing::{self, WalkTier};
use super::slots::Minutes;

/// Why a booking request was turned down. Expected rejections are values,
/// not panics; the handler maps each to a status code and `{error}` body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("Missing fields.")]
    MissingFields,
    #[error("Invalid date/time.")]
    InvalidDateTime,
    #[error("Service not found.")]
    ServiceNotFound,
    #[error("This service supports at most {max} pets per booking.")]
    UnsupportedPetCount { max: u32 },
    #[error("Selected time is outside availability for this service.")]
    OutsideAvailability,
    #[error("That time was just booked. Please select another slot.")]
    SlotTaken,
}

impl Rejection {
    /// SlotTaken gets its own 409 so clients can prompt a retry with a
    /// different slot instead of treating it as a generic failure.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::SlotTaken)
    }
}

/// Everything the validator needs, pre-fetched by the handler. Keeps the
/// validation itself pure and synchronous.
pub struct ValidationContext<'a> {
    /// The requested service row, if the id resolved at all.
    pub service: Option<&'a Service>,
    /// Resolved rows for the requested add-on ids (active only).
    pub addons: &'a [Service],
    /// Start instants of every non-cancelled booking.
    pub existing_starts: &'a [DateTime<Utc>],
    /// Window/day rules are evaluated in this fixed business-local offset.
    pub business_offset: FixedOffset,
}

/// A request that passed every check, ready to persist as PENDING.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedBooking {
    pub start_utc: DateTime<Utc>,
    pub service_type: ServiceType,
    pub pet_count: u32,
    pub total_cents: i64,
}

/// The stored tag wins when present and recognized; display-name parsing is
/// the fallback for legacy catalog rows.
pub fn service_type_of(service: &Service) -> ServiceType {
    service
        .service_type
        .as_deref()
        .and_then(classify::from_tag)
        .unwrap_or_else(|| classify::classify(&service.name))
}

/// Accepts RFC 3339, or a naive `YYYY-MM-DDTHH:MM[:SS]` taken as
/// business-local time (what date+time pickers submit).
fn parse_start(raw: &str, offset: FixedOffset) -> Option<DateTime<FixedOffset>> {
    if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
        return Some(t.with_timezone(&offset));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return offset.from_local_datetime(&naive).single();
        }
    }
    None
}

/// Run the full acceptance pipeline, short-circuiting on the first failure.
/// Never trusts the client: classification, slot membership and conflicts
/// are all recomputed here from the pre-fetched context.
pub fn validate(req: &BookRequest, ctx: &ValidationContext) -> Result<ValidatedBooking, Rejection> {
    let name = req.customer_name.as_deref().map(str::trim).unwrap_or("");
    let email = req.email.as_deref().map(str::trim).unwrap_or("");
    let phone = req.phone.as_deref().map(str::trim).unwrap_or("");
    let start_raw = req.start.as_deref().map(str::trim).unwrap_or("");
    if req.service_id.is_none()
        || name.is_empty()
        || email.is_empty()
        || phone.is_empty()
        || start_raw.is_empty()
    {
        return Err(Rejection::MissingFields);
    }

    let local = parse_start(start_raw, ctx.business_offset).ok_or(Rejection::InvalidDateTime)?;

    let service = ctx
        .service
        .filter(|s| s.is_active)
        .ok_or(Rejection::ServiceNotFound)?;
    let service_type = service_type_of(service);

    // Add-on ids must all resolve to active add-on services.
    let requested: BTreeSet<i64> = req.add_ons.iter().copied().collect();
    if ctx.addons.len() != requested.len()
        || ctx.addons.iter().any(|a| {
            !requested.contains(&a.id)
                || !a.is_active
                || service_type_of(a) != ServiceType::AddOn
        })
    {
        return Err(Rejection::ServiceNotFound);
    }

    let pet_count = req.pet_count.unwrap_or(1);
    if pet_count == 0 {
        return Err(Rejection::UnsupportedPetCount { max: 1 });
    }
    if let Some(max) = service_type.max_pets() {
        if pet_count > max {
            return Err(Rejection::UnsupportedPetCount { max });
        }
    }

    let minute_of_day = (local.hour() * 60 + local.minute()) as Minutes;
    let allowed = availability::resolve(service_type, local.date_naive());
    if !allowed.contains(&minute_of_day) {
        return Err(Rejection::OutsideAvailability);
    }

    let start_utc = conflict::normalize_minute(local.with_timezone(&Utc));
    if conflict::is_taken(ctx.existing_starts, start_utc) {
        return Err(Rejection::SlotTaken);
    }

    let walk_tier = WalkTier::from_service(service.duration_min, &service.name);
    let addon_cents: Vec<i64> = ctx.addons.iter().map(|a| a.price_cents).collect();
    let total_cents = pricing::compute_total(
        service_type,
        service.price_cents,
        pet_count,
        walk_tier,
        &addon_cents,
    );

    Ok(ValidatedBooking {
        start_utc,
        service_type,
        pet_count,
        total_cents,
    })
}
