use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// User-defined label. `(name, user_id)` is unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: String,
    pub name: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTagRequest {
    #[validate(
        required(message = "Missing required field: name"),
        length(min = 1, message = "Missing required field: name")
    )]
    pub name: Option<String>,

    #[validate(
        required(message = "Missing required field: userId"),
        length(min = 1, message = "Missing required field: userId")
    )]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateTagRequest {
    #[validate(
        required(message = "Missing required field: name"),
        length(min = 1, message = "Missing required field: name")
    )]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagListQuery {
    pub user_id: Option<String>,
}
