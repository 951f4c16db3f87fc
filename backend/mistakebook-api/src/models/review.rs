use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A bounded run of ratings. `end_time` is `None` while the session is active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSession {
    pub id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub mistakes_reviewed: i64,

    #[sqlx(skip)]
    #[serde(default)]
    pub review_entries: Vec<ReviewEntry>,
}

/// Immutable record of one mastery change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ReviewEntry {
    pub id: String,
    pub mistake_id: String,
    pub session_id: String,
    pub old_mastery_level: i32,
    pub new_mastery_level: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewEntryRequest {
    #[validate(
        required(message = "Missing required field: mistakeId"),
        length(min = 1, message = "Missing required field: mistakeId")
    )]
    pub mistake_id: Option<String>,

    #[validate(
        required(message = "Missing required field: sessionId"),
        length(min = 1, message = "Missing required field: sessionId")
    )]
    pub session_id: Option<String>,

    #[validate(
        required(message = "Missing required field: oldMasteryLevel"),
        range(min = 0, max = 5, message = "Mastery level must be between 0 and 5")
    )]
    pub old_mastery_level: Option<i32>,

    #[validate(
        required(message = "Missing required field: newMasteryLevel"),
        range(min = 0, max = 5, message = "Mastery level must be between 0 and 5")
    )]
    pub new_mastery_level: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionQuery {
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewQueueQuery {
    pub user_id: Option<String>,
}
