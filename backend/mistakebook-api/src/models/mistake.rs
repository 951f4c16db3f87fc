use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::tag::Tag;

pub const MIN_MASTERY_LEVEL: i32 = 0;
pub const MAX_MASTERY_LEVEL: i32 = 5;

/// A recorded mistake with its tags flattened out of the join table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Mistake {
    pub id: String,
    pub content: String,
    pub correct_answer: String,
    pub explanation: Option<String>,
    pub error_reason: Option<String>,
    /// Inline data URI, never a reference to external storage.
    pub image_url: Option<String>,
    pub mastery_level: i32,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,

    #[sqlx(skip)]
    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl Mistake {
    pub fn has_any_tag(&self, tag_ids: &[String]) -> bool {
        self.tags.iter().any(|tag| tag_ids.contains(&tag.id))
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateMistakeRequest {
    #[validate(
        required(message = "Missing required field: content"),
        length(min = 1, message = "Missing required field: content")
    )]
    pub content: Option<String>,

    #[validate(
        required(message = "Missing required field: correctAnswer"),
        length(min = 1, message = "Missing required field: correctAnswer")
    )]
    pub correct_answer: Option<String>,

    pub explanation: Option<String>,
    pub error_reason: Option<String>,
    pub image_url: Option<String>,

    #[validate(
        required(message = "Missing required field: userId"),
        length(min = 1, message = "Missing required field: userId")
    )]
    pub user_id: Option<String>,

    /// Tag ids to link
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

/// PUT /api/mistakes/{id}. Omitted fields keep their stored value; an empty
/// string clears an optional text field; `tags` replaces the whole set.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMistakeRequest {
    #[validate(length(min = 1, message = "Content must not be empty"))]
    pub content: Option<String>,

    #[validate(length(min = 1, message = "Correct answer must not be empty"))]
    pub correct_answer: Option<String>,

    pub explanation: Option<String>,
    pub error_reason: Option<String>,
    pub image_url: Option<String>,

    #[validate(range(
        min = 0,
        max = 5,
        message = "Mastery level must be between 0 and 5"
    ))]
    pub mastery_level: Option<i32>,

    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MistakeListQuery {
    pub user_id: Option<String>,
    /// Comma separated tag ids
    pub tag_ids: Option<String>,
    pub q: Option<String>,
}

impl MistakeListQuery {
    pub fn selected_tag_ids(&self) -> Vec<String> {
        self.tag_ids
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn search_query(&self) -> &str {
        self.q.as_deref().unwrap_or_default()
    }
}
