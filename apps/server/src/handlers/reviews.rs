use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::models::{CreateReviewRequest, ErrorBody, Review};
use crate::AppState;

#[derive(Serialize)]
pub struct ReviewsResponse {
    pub reviews: Vec<Review>,
}

/// GET /api/reviews — newest first, capped.
pub async fn list_reviews(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ReviewsResponse>, StatusCode> {
    let reviews = sqlx::query_as::<_, Review>(
        "SELECT id, author, rating, comment, created_at
         FROM reviews ORDER BY created_at DESC LIMIT 100",
    )
    .fetch_all(&state.db)
    .await
    .map_err(|e| {
        tracing::error!("list_reviews: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(Json(ReviewsResponse { reviews }))
}

#[derive(Serialize)]
pub struct ReviewCreated {
    pub review: Review,
}

/// POST /api/reviews — visitor-submitted review, shown without moderation.
pub async fn create_review(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateReviewRequest>,
) -> Result<Json<ReviewCreated>, (StatusCode, Json<ErrorBody>)> {
    let author = body.author.as_deref().map(str::trim).unwrap_or("");
    let comment = body.comment.as_deref().map(str::trim).unwrap_or("");
    if author.is_empty() || comment.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorBody::new("Missing fields.")),
        ));
    }
    let rating = body.rating.unwrap_or(0);
    if !(1..=5).contains(&rating) {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorBody::new("Rating must be between 1 and 5.")),
        ));
    }

    let db_error = |e: sqlx::Error| {
        tracing::error!("create_review: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody::new("Internal error")),
        )
    };

    let id = sqlx::query("INSERT INTO reviews (author, rating, comment) VALUES (?, ?, ?)")
        .bind(author)
        .bind(rating)
        .bind(comment)
        .execute(&state.db)
        .await
        .map_err(db_error)?
        .last_insert_rowid();

    let review = sqlx::query_as::<_, Review>(
        "SELECT id, author, rating, comment, created_at FROM reviews WHERE id = ?",
    )
    .bind(id)
    .fetch_one(&state.db)
    .await
    .map_err(db_error)?;

    Ok(Json(ReviewCreated { review }))
}
