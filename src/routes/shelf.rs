//! Reader shelf actions: wishlist and likes, both toggles.

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::app::AppState;
use crate::authz::{require_role, Role};
use crate::errors::AppResult;
use crate::jwt::MaybeSession;
use crate::models::novel::{DbNovel, Novel};
use crate::routes::novels::fetch_novel;
use crate::utils::utc_now;

pub fn wishlist_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_wishlist))
        .route("/:novel_id", post(toggle_wishlist))
}

pub fn like_routes() -> Router<AppState> {
    Router::new().route("/:novel_id", post(toggle_like))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ToggleResponse {
    /// True if the entry exists after the toggle.
    pub active: bool,
}

#[utoipa::path(
    get,
    path = "/api/wishlist",
    tag = "Shelf",
    responses((status = 200, description = "Novels on the wishlist", body = [Novel])),
    security(("bearerAuth" = []))
)]
pub async fn list_wishlist(
    State(state): State<AppState>,
    MaybeSession(session): MaybeSession,
) -> AppResult<Json<Vec<Novel>>> {
    let session = require_role(session.as_ref(), Role::Reader)?;

    let novels = sqlx::query_as::<_, DbNovel>(
        "SELECT n.id, n.author_id, n.title, n.synopsis, n.status, \
           (SELECT COUNT(*) FROM likes l WHERE l.novel_id = n.id) AS like_count, \
           n.created_at, n.updated_at, n.deleted_at \
         FROM novels n \
         JOIN wishlist w ON w.novel_id = n.id \
         WHERE w.user_id = ? AND n.deleted_at IS NULL \
         ORDER BY w.created_at DESC",
    )
    .bind(session.user_id)
    .fetch_all(&state.pool)
    .await?;

    let novels: Vec<Novel> = novels
        .into_iter()
        .map(Novel::try_from)
        .collect::<Result<_, _>>()?;

    Ok(Json(novels))
}

#[utoipa::path(
    post,
    path = "/api/wishlist/{novel_id}",
    tag = "Shelf",
    params(("novel_id" = Uuid, Path, description = "Novel id")),
    responses((status = 200, description = "Wishlist entry toggled", body = ToggleResponse)),
    security(("bearerAuth" = []))
)]
pub async fn toggle_wishlist(
    State(state): State<AppState>,
    MaybeSession(session): MaybeSession,
    Path(novel_id): Path<Uuid>,
) -> AppResult<Json<ToggleResponse>> {
    let session = require_role(session.as_ref(), Role::Reader)?;
    fetch_novel(&state, novel_id).await?;

    let active = toggle_entry(&state, "wishlist", session.user_id, novel_id).await?;
    Ok(Json(ToggleResponse { active }))
}

#[utoipa::path(
    post,
    path = "/api/likes/{novel_id}",
    tag = "Shelf",
    params(("novel_id" = Uuid, Path, description = "Novel id")),
    responses((status = 200, description = "Like toggled", body = ToggleResponse)),
    security(("bearerAuth" = []))
)]
pub async fn toggle_like(
    State(state): State<AppState>,
    MaybeSession(session): MaybeSession,
    Path(novel_id): Path<Uuid>,
) -> AppResult<Json<ToggleResponse>> {
    let session = require_role(session.as_ref(), Role::Reader)?;
    fetch_novel(&state, novel_id).await?;

    let active = toggle_entry(&state, "likes", session.user_id, novel_id).await?;
    Ok(Json(ToggleResponse { active }))
}

/// Insert-or-delete on a (user_id, novel_id) join table.
async fn toggle_entry(
    state: &AppState,
    table: &str,
    user_id: Uuid,
    novel_id: Uuid,
) -> AppResult<bool> {
    let exists_sql = format!("SELECT COUNT(1) FROM {table} WHERE user_id = ? AND novel_id = ?");
    let count: i64 = sqlx::query_scalar(&exists_sql)
        .bind(user_id)
        .bind(novel_id)
        .fetch_one(&state.pool)
        .await?;

    if count > 0 {
        let delete_sql = format!("DELETE FROM {table} WHERE user_id = ? AND novel_id = ?");
        sqlx::query(&delete_sql)
            .bind(user_id)
            .bind(novel_id)
            .execute(&state.pool)
            .await?;
        Ok(false)
    } else {
        let insert_sql =
            format!("INSERT INTO {table} (user_id, novel_id, created_at) VALUES (?, ?, ?)");
        sqlx::query(&insert_sql)
            .bind(user_id)
            .bind(novel_id)
            .bind(utc_now())
            .execute(&state.pool)
            .await?;
        Ok(true)
    }
}
