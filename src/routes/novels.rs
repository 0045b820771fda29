use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Duration;
use serde::Deserialize;
use uuid::Uuid;

use crate::app::AppState;
use crate::errors::{AppError, AppResult};
use crate::models::chapter::{Chapter, ChapterSummary};
use crate::models::novel::{DbNovel, Novel};
use crate::models::review::Review;
use crate::utils::utc_now;

const TRENDING_WINDOW_DAYS: i64 = 7;
const TRENDING_LIMIT: i64 = 20;

const NOVEL_COLUMNS: &str = "n.id, n.author_id, n.title, n.synopsis, n.status, \
     (SELECT COUNT(*) FROM likes l WHERE l.novel_id = n.id) AS like_count, \
     n.created_at, n.updated_at, n.deleted_at";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_novels))
        .route("/:id", get(get_novel))
        .route("/:id/chapters", get(list_chapters))
        .route("/:id/chapters/:number", get(get_chapter))
        .route("/:id/reviews", get(list_reviews))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub sort: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/novels",
    tag = "Novels",
    params(("sort" = Option<String>, Query, description = "Set to `trending` to rank by recent likes")),
    responses((status = 200, description = "List novels", body = [Novel]))
)]
pub async fn list_novels(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Novel>>> {
    let novels = match query.sort.as_deref() {
        Some("trending") => {
            let cutoff = utc_now() - Duration::days(TRENDING_WINDOW_DAYS);
            let sql = format!(
                "SELECT {NOVEL_COLUMNS} FROM novels n WHERE n.deleted_at IS NULL \
                 ORDER BY (SELECT COUNT(*) FROM likes l2 WHERE l2.novel_id = n.id AND l2.created_at >= ?) DESC, \
                 n.created_at DESC LIMIT ?",
            );
            sqlx::query_as::<_, DbNovel>(&sql)
                .bind(cutoff)
                .bind(TRENDING_LIMIT)
                .fetch_all(&state.pool)
                .await?
        }
        _ => {
            let sql = format!(
                "SELECT {NOVEL_COLUMNS} FROM novels n WHERE n.deleted_at IS NULL ORDER BY n.created_at DESC",
            );
            sqlx::query_as::<_, DbNovel>(&sql).fetch_all(&state.pool).await?
        }
    };

    let novels: Vec<Novel> = novels
        .into_iter()
        .map(Novel::try_from)
        .collect::<Result<_, _>>()?;

    Ok(Json(novels))
}

#[utoipa::path(
    get,
    path = "/api/novels/{id}",
    tag = "Novels",
    params(("id" = Uuid, Path, description = "Novel id")),
    responses(
        (status = 200, description = "Novel detail", body = Novel),
        (status = 404, description = "Novel not found")
    )
)]
pub async fn get_novel(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Novel>> {
    let novel = fetch_novel(&state, id).await?;
    Ok(Json(novel.try_into()?))
}

#[utoipa::path(
    get,
    path = "/api/novels/{id}/chapters",
    tag = "Novels",
    params(("id" = Uuid, Path, description = "Novel id")),
    responses((status = 200, description = "Chapter listing", body = [ChapterSummary]))
)]
pub async fn list_chapters(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Vec<ChapterSummary>>> {
    fetch_novel(&state, id).await?;

    let chapters = sqlx::query_as::<_, ChapterSummary>(
        "SELECT id, novel_id, number, title, published_at FROM chapters WHERE novel_id = ? ORDER BY number ASC",
    )
    .bind(id)
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(chapters))
}

#[utoipa::path(
    get,
    path = "/api/novels/{id}/chapters/{number}",
    tag = "Novels",
    params(
        ("id" = Uuid, Path, description = "Novel id"),
        ("number" = i64, Path, description = "Chapter number")
    ),
    responses(
        (status = 200, description = "Chapter body", body = Chapter),
        (status = 404, description = "Chapter not found")
    )
)]
pub async fn get_chapter(
    State(state): State<AppState>,
    Path((id, number)): Path<(Uuid, i64)>,
) -> AppResult<Json<Chapter>> {
    fetch_novel(&state, id).await?;

    let chapter = sqlx::query_as::<_, Chapter>(
        "SELECT id, novel_id, number, title, content, published_at FROM chapters WHERE novel_id = ? AND number = ?",
    )
    .bind(id)
    .bind(number)
    .fetch_optional(&state.pool)
    .await?
    .ok_or_else(|| AppError::not_found("chapter not found"))?;

    Ok(Json(chapter))
}

#[utoipa::path(
    get,
    path = "/api/novels/{id}/reviews",
    tag = "Novels",
    params(("id" = Uuid, Path, description = "Novel id")),
    responses((status = 200, description = "Reviews for the novel", body = [Review]))
)]
pub async fn list_reviews(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Vec<Review>>> {
    fetch_novel(&state, id).await?;

    let reviews = sqlx::query_as::<_, Review>(
        "SELECT id, novel_id, user_id, rating, body, created_at FROM reviews WHERE novel_id = ? ORDER BY created_at DESC",
    )
    .bind(id)
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(reviews))
}

pub(crate) async fn fetch_novel(state: &AppState, id: Uuid) -> AppResult<DbNovel> {
    let sql = format!("SELECT {NOVEL_COLUMNS} FROM novels n WHERE n.id = ? AND n.deleted_at IS NULL");
    sqlx::query_as::<_, DbNovel>(&sql)
        .bind(id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| AppError::not_found("novel not found"))
}
