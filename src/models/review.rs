use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::errors::AppError;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Review {
    pub id: Uuid,
    pub novel_id: Uuid,
    pub user_id: Uuid,
    pub rating: i64,
    pub body: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReviewCreateRequest {
    pub novel_id: Uuid,
    #[schema(example = 4)]
    pub rating: i64,
    #[schema(example = "Slow start, wonderful payoff.")]
    pub body: Option<String>,
}

impl ReviewCreateRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if !(1..=5).contains(&self.rating) {
            return Err(AppError::bad_request("rating must be between 1 and 5"));
        }
        Ok(())
    }
}
