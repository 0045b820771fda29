use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use uuid::Uuid;

use crate::app::AppState;
use crate::authz::{require_role, Role};
use crate::errors::AppResult;
use crate::jwt::MaybeSession;
use crate::models::review::{Review, ReviewCreateRequest};
use crate::routes::novels::fetch_novel;
use crate::utils::utc_now;

pub fn routes() -> Router<AppState> {
    Router::new().route("/", post(create_review))
}

#[utoipa::path(
    post,
    path = "/api/reviews",
    tag = "Reviews",
    request_body = ReviewCreateRequest,
    responses(
        (status = 201, description = "Review created", body = Review),
        (status = 401, description = "No session"),
        (status = 404, description = "Novel not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn create_review(
    State(state): State<AppState>,
    MaybeSession(session): MaybeSession,
    Json(payload): Json<ReviewCreateRequest>,
) -> AppResult<(StatusCode, Json<Review>)> {
    let session = require_role(session.as_ref(), Role::Reader)?;
    payload.validate()?;
    fetch_novel(&state, payload.novel_id).await?;

    let id = Uuid::new_v4();
    let now = utc_now();

    sqlx::query(
        "INSERT INTO reviews (id, novel_id, user_id, rating, body, created_at) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(payload.novel_id)
    .bind(session.user_id)
    .bind(payload.rating)
    .bind(&payload.body)
    .bind(now)
    .execute(&state.pool)
    .await?;

    let review = Review {
        id,
        novel_id: payload.novel_id,
        user_id: session.user_id,
        rating: payload.rating,
        body: payload.body,
        created_at: now,
    };

    Ok((StatusCode::CREATED, Json(review)))
}
