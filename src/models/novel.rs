use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::errors::AppError;

pub const STATUS_ONGOING: &str = "ongoing";
pub const STATUS_COMPLETED: &str = "completed";
pub const STATUS_HIATUS: &str = "hiatus";

const STATUSES: &[&str] = &[STATUS_ONGOING, STATUS_COMPLETED, STATUS_HIATUS];

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Novel {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub synopsis: Option<String>,
    #[schema(example = "ongoing")]
    pub status: String,
    pub like_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Row shape for novel queries; `like_count` comes from a correlated subquery.
#[derive(Debug, Clone, FromRow)]
pub struct DbNovel {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub synopsis: Option<String>,
    pub status: String,
    pub like_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl TryFrom<DbNovel> for Novel {
    type Error = AppError;

    fn try_from(value: DbNovel) -> Result<Self, Self::Error> {
        Ok(Novel {
            id: value.id,
            author_id: value.author_id,
            title: value.title,
            synopsis: value.synopsis,
            status: value.status,
            like_count: value.like_count,
            created_at: value.created_at,
            updated_at: value.updated_at,
            deleted_at: value.deleted_at,
        })
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct NovelCreateRequest {
    #[schema(example = "The Clockwork Orchard")]
    pub title: String,
    #[schema(example = "A gardener discovers her trees tick.")]
    pub synopsis: Option<String>,
    #[schema(example = "ongoing")]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct NovelUpdateRequest {
    pub title: Option<String>,
    pub synopsis: Option<String>,
    pub status: Option<String>,
}

/// Validates a publication status, defaulting absent values to `ongoing`.
pub fn validate_status(status: Option<String>) -> Result<String, AppError> {
    let status = status.unwrap_or_else(|| STATUS_ONGOING.to_string());
    if STATUSES.contains(&status.as_str()) {
        Ok(status)
    } else {
        Err(AppError::bad_request(format!(
            "status must be one of: {}",
            STATUSES.join(", ")
        )))
    }
}
