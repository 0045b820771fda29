//! Writer endpoints. All queries are scoped to the session's own novels.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use uuid::Uuid;

use crate::app::AppState;
use crate::authz::{require_role, Role};
use crate::errors::{AppError, AppResult};
use crate::jwt::{MaybeSession, Session};
use crate::models::chapter::{Chapter, ChapterCreateRequest};
use crate::models::novel::{validate_status, DbNovel, Novel, NovelCreateRequest, NovelUpdateRequest};
use crate::utils::utc_now;

const NOVEL_COLUMNS: &str = "n.id, n.author_id, n.title, n.synopsis, n.status, \
     (SELECT COUNT(*) FROM likes l WHERE l.novel_id = n.id) AS like_count, \
     n.created_at, n.updated_at, n.deleted_at";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/novels", get(list_own_novels).post(create_novel))
        .route("/novels/:id", put(update_novel))
        .route("/novels/:id/chapters", post(publish_chapter))
}

#[utoipa::path(
    get,
    path = "/api/author/novels",
    tag = "Author",
    responses((status = 200, description = "Own novels", body = [Novel])),
    security(("bearerAuth" = []))
)]
pub async fn list_own_novels(
    State(state): State<AppState>,
    MaybeSession(session): MaybeSession,
) -> AppResult<Json<Vec<Novel>>> {
    let session = require_role(session.as_ref(), Role::Writer)?;

    let sql = format!(
        "SELECT {NOVEL_COLUMNS} FROM novels n WHERE n.author_id = ? AND n.deleted_at IS NULL ORDER BY n.created_at DESC",
    );
    let novels = sqlx::query_as::<_, DbNovel>(&sql)
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
    path = "/api/author/novels",
    tag = "Author",
    request_body = NovelCreateRequest,
    responses((status = 201, description = "Novel created", body = Novel)),
    security(("bearerAuth" = []))
)]
pub async fn create_novel(
    State(state): State<AppState>,
    MaybeSession(session): MaybeSession,
    Json(payload): Json<NovelCreateRequest>,
) -> AppResult<(StatusCode, Json<Novel>)> {
    let session = require_role(session.as_ref(), Role::Writer)?;
    let status = validate_status(payload.status)?;

    let now = utc_now();
    let novel_id = Uuid::new_v4();

    sqlx::query(
        "INSERT INTO novels (id, author_id, title, synopsis, status, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(novel_id)
    .bind(session.user_id)
    .bind(&payload.title)
    .bind(&payload.synopsis)
    .bind(&status)
    .bind(now)
    .bind(now)
    .execute(&state.pool)
    .await?;

    let novel = fetch_own_novel(&state, session, novel_id).await?;
    Ok((StatusCode::CREATED, Json(novel.try_into()?)))
}

#[utoipa::path(
    put,
    path = "/api/author/novels/{id}",
    tag = "Author",
    params(("id" = Uuid, Path, description = "Novel id")),
    request_body = NovelUpdateRequest,
    responses(
        (status = 200, description = "Novel updated", body = Novel),
        (status = 404, description = "Not found or not owned")
    ),
    security(("bearerAuth" = []))
)]
pub async fn update_novel(
    State(state): State<AppState>,
    MaybeSession(session): MaybeSession,
    Path(id): Path<Uuid>,
    Json(payload): Json<NovelUpdateRequest>,
) -> AppResult<Json<Novel>> {
    let session = require_role(session.as_ref(), Role::Writer)?;
    let existing = fetch_own_novel(&state, session, id).await?;

    let title = payload.title.unwrap_or(existing.title);
    let synopsis = payload.synopsis.or(existing.synopsis);
    let status = match payload.status {
        Some(status) => validate_status(Some(status))?,
        None => existing.status,
    };

    sqlx::query(
        "UPDATE novels SET title = ?, synopsis = ?, status = ?, updated_at = ? WHERE id = ? AND author_id = ?",
    )
    .bind(&title)
    .bind(&synopsis)
    .bind(&status)
    .bind(utc_now())
    .bind(id)
    .bind(session.user_id)
    .execute(&state.pool)
    .await?;

    let novel = fetch_own_novel(&state, session, id).await?;
    Ok(Json(novel.try_into()?))
}

#[utoipa::path(
    post,
    path = "/api/author/novels/{id}/chapters",
    tag = "Author",
    params(("id" = Uuid, Path, description = "Novel id")),
    request_body = ChapterCreateRequest,
    responses(
        (status = 201, description = "Chapter published", body = Chapter),
        (status = 404, description = "Not found or not owned")
    ),
    security(("bearerAuth" = []))
)]
pub async fn publish_chapter(
    State(state): State<AppState>,
    MaybeSession(session): MaybeSession,
    Path(id): Path<Uuid>,
    Json(payload): Json<ChapterCreateRequest>,
) -> AppResult<(StatusCode, Json<Chapter>)> {
    let session = require_role(session.as_ref(), Role::Writer)?;
    fetch_own_novel(&state, session, id).await?;

    let next_number: i64 =
        sqlx::query_scalar("SELECT COALESCE(MAX(number), 0) + 1 FROM chapters WHERE novel_id = ?")
            .bind(id)
            .fetch_one(&state.pool)
            .await?;

    let chapter = Chapter {
        id: Uuid::new_v4(),
        novel_id: id,
        number: next_number,
        title: payload.title,
        content: payload.content,
        published_at: utc_now(),
    };

    sqlx::query(
        "INSERT INTO chapters (id, novel_id, number, title, content, published_at) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(chapter.id)
    .bind(chapter.novel_id)
    .bind(chapter.number)
    .bind(&chapter.title)
    .bind(&chapter.content)
    .bind(chapter.published_at)
    .execute(&state.pool)
    .await?;

    Ok((StatusCode::CREATED, Json(chapter)))
}

async fn fetch_own_novel(state: &AppState, session: &Session, id: Uuid) -> AppResult<DbNovel> {
    let sql = format!(
        "SELECT {NOVEL_COLUMNS} FROM novels n WHERE n.id = ? AND n.author_id = ? AND n.deleted_at IS NULL",
    );
    sqlx::query_as::<_, DbNovel>(&sql)
        .bind(id)
        .bind(session.user_id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| AppError::not_found("novel not found"))
}
