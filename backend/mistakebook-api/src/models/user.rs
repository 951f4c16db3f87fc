use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// User row. Only one user exists in practice (see `default_user_seed`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: Option<String>,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// POST /api/users - find-or-create by email
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub name: Option<String>,

    #[validate(
        required(message = "Missing required field: email"),
        email(message = "Invalid email format")
    )]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserQuery {
    pub email: Option<String>,
}
