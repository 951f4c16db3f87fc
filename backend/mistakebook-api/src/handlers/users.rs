use axum::{
    extract::{Query, State},
    Json,
};
use std::sync::Arc;

use crate::{
    error::AppResult,
    extractors::AppJson,
    handlers::require_param,
    models::user::{CreateUserRequest, User, UserQuery},
    services::{user_service::UserService, AppState},
};

/// POST /api/users - find-or-create by email
pub async fn find_or_create_user(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<CreateUserRequest>,
) -> AppResult<Json<User>> {
    tracing::info!("Find-or-create user for email={:?}", req.email);

    let user = UserService::new(state.db.clone()).find_or_create(req).await?;
    Ok(Json(user))
}

/// GET /api/users?email=
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UserQuery>,
) -> AppResult<Json<User>> {
    let email = require_param(query.email, "email")?;

    let user = UserService::new(state.db.clone())
        .get_by_email(&email)
        .await?;
    Ok(Json(user))
}
