use chrono::{DateTime, Timelike, Utc};

/// Zero out seconds and sub-second precision. Every instant we compare or
/// store goes through this first; the conflict check below relies on it.
pub fn normalize_minute(t: DateTime<Utc>) -> DateTime<Utc> {
    t.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(t)
}

/// Whether `candidate` collides with an existing booking. `existing` must
/// already be restricted to non-cancelled bookings — a cancelled booking
/// frees its slot.
pub fn is_taken(existing: &[DateTime<Utc>], candidate: DateTime<Utc>) -> bool {
    let wanted = normalize_minute(candidate);
    existing.iter().any(|t| normalize_minute(*t) == wanted)
}
