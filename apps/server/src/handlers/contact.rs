use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::models::{ContactRequest, ErrorBody, OkBody};
use crate::AppState;

/// POST /api/contact — relay a general inquiry to the operator.
/// The hidden `website` field is a honeypot: when a bot fills it we answer
/// success and drop the message.
pub async fn submit_contact(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ContactRequest>,
) -> Result<Json<OkBody>, (StatusCode, Json<ErrorBody>)> {
    if body.website.as_deref().is_some_and(|w| !w.trim().is_empty()) {
        tracing::info!("contact honeypot tripped, dropping message");
        return Ok(Json(OkBody::ok()));
    }

    let name = body.name.as_deref().map(str::trim).unwrap_or("");
    let email = body.email.as_deref().map(str::trim).unwrap_or("");
    let message = body.message.as_deref().map(str::trim).unwrap_or("");
    if name.is_empty() || email.is_empty() || message.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorBody::new("Missing fields.")),
        ));
    }

    state
        .notifier
        .spawn_inquiry(name.to_string(), email.to_string(), message.to_string());

    Ok(Json(OkBody::ok()))
}
