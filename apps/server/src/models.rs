use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Database models ──

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price_cents: i64,
    pub duration_min: i64,
    pub is_active: bool,
    pub sort_order: i64,
    /// Stable classification tag ('walk', 'dropin', ...). Nullable: legacy
    /// rows fall back to name-based classification.
    pub service_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: i64,
    pub author: String,
    pub rating: i64,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

/// Minimal projection the public calendar needs: which minutes are taken.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct BookingSummary {
    pub id: i64,
    #[serde(rename = "start")]
    pub start_at: DateTime<Utc>,
}

/// Admin dashboard row (booking joined with its service).
#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BookingDetail {
    pub id: i64,
    pub service_name: String,
    pub customer_name: String,
    pub email: String,
    pub phone: String,
    pub start_at: DateTime<Utc>,
    pub notes: String,
    pub pet_count: i64,
    pub status: String,
    pub total_cents: i64,
    pub created_at: DateTime<Utc>,
}

// ── API request/response types ──

/// The booking wire contract. Every field optional so presence checks are
/// ours to make (a missing field is a 400 rejection, not a deserialization
/// error).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookRequest {
    pub service_id: Option<i64>,
    pub customer_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// ISO-8601; naive values are interpreted in business-local time.
    pub start: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    pub pet_count: Option<u32>,
    #[serde(default)]
    pub add_ons: Vec<i64>,
}

#[derive(Debug, Serialize)]
pub struct BookCreated {
    pub ok: bool,
    #[serde(rename = "bookingId")]
    pub booking_id: i64,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { error: msg.into() }
    }
}

#[derive(Debug, Serialize)]
pub struct OkBody {
    pub ok: bool,
}

impl OkBody {
    pub fn ok() -> Self {
        Self { ok: true }
    }
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    #[serde(rename = "serviceId")]
    pub service_id: i64,
    /// YYYY-MM-DD, business-local.
    pub date: String,
}

#[derive(Debug, Deserialize)]
pub struct AdminLoginRequest {
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct AdminBookingAction {
    pub id: i64,
    /// "confirm" or "cancel".
    pub action: String,
}

#[derive(Debug, Deserialize)]
pub struct AdminBookingId {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateReviewRequest {
    pub author: Option<String>,
    pub rating: Option<i64>,
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ContactRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub message: Option<String>,
    /// Honeypot field; bots fill it, humans never see it.
    #[serde(default)]
    pub website: Option<String>,
}
