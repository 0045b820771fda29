use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Chapter {
    pub id: Uuid,
    pub novel_id: Uuid,
    pub number: i64,
    pub title: String,
    pub content: String,
    pub published_at: DateTime<Utc>,
}

/// Chapter listing entry, without the body text.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct ChapterSummary {
    pub id: Uuid,
    pub novel_id: Uuid,
    pub number: i64,
    pub title: String,
    pub published_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChapterCreateRequest {
    #[schema(example = "Chapter One: Winding")]
    pub title: String,
    #[schema(example = "The orchard gate had not been oiled in years...")]
    pub content: String,
}
