//! Moderation endpoints: user listing, role assignment, novel takedown.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, put};
use axum::{Json, Router};
use uuid::Uuid;

use crate::app::AppState;
use crate::authz::{require_role, Role};
use crate::errors::{AppError, AppResult};
use crate::jwt::MaybeSession;
use crate::models::user::{DbUser, UpdateRoleRequest, User};
use crate::utils::utc_now;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/:id/role", put(set_user_role))
        .route("/novels/:id", delete(take_down_novel))
}

#[utoipa::path(
    get,
    path = "/api/admin/users",
    tag = "Admin",
    responses((status = 200, description = "All active users", body = [User])),
    security(("bearerAuth" = []))
)]
pub async fn list_users(
    State(state): State<AppState>,
    MaybeSession(session): MaybeSession,
) -> AppResult<Json<Vec<User>>> {
    require_role(session.as_ref(), Role::Admin)?;

    let users = sqlx::query_as::<_, DbUser>(
        "SELECT id, name, email, password_hash, role, created_at, updated_at, deleted_at FROM users WHERE deleted_at IS NULL ORDER BY created_at ASC",
    )
    .fetch_all(&state.pool)
    .await?;

    let users: Vec<User> = users
        .into_iter()
        .map(User::try_from)
        .collect::<Result<_, _>>()?;

    Ok(Json(users))
}

#[utoipa::path(
    put,
    path = "/api/admin/users/{id}/role",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "User id")),
    request_body = UpdateRoleRequest,
    responses(
        (status = 200, description = "Role updated", body = User),
        (status = 404, description = "User not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn set_user_role(
    State(state): State<AppState>,
    MaybeSession(session): MaybeSession,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateRoleRequest>,
) -> AppResult<Json<User>> {
    require_role(session.as_ref(), Role::Admin)?;

    // unrecognized requests floor to reader rather than erroring; the stored
    // value is always persistable
    let role = Role::normalize_user(Some(&payload.role));

    let result = sqlx::query("UPDATE users SET role = ?, updated_at = ? WHERE id = ? AND deleted_at IS NULL")
        .bind(role.as_str())
        .bind(utc_now())
        .bind(id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found("user not found"));
    }

    let user = sqlx::query_as::<_, DbUser>(
        "SELECT id, name, email, password_hash, role, created_at, updated_at, deleted_at FROM users WHERE id = ? AND deleted_at IS NULL",
    )
    .bind(id)
    .fetch_one(&state.pool)
    .await?;

    Ok(Json(user.try_into()?))
}

#[utoipa::path(
    delete,
    path = "/api/admin/novels/{id}",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "Novel id")),
    responses(
        (status = 204, description = "Novel taken down"),
        (status = 404, description = "Novel not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn take_down_novel(
    State(state): State<AppState>,
    MaybeSession(session): MaybeSession,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    require_role(session.as_ref(), Role::Admin)?;

    let result = sqlx::query("UPDATE novels SET deleted_at = ? WHERE id = ? AND deleted_at IS NULL")
        .bind(utc_now())
        .bind(id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found("novel not found"));
    }

    Ok(StatusCode::NO_CONTENT)
}
