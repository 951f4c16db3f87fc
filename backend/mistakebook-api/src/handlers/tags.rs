use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::{
    error::AppResult,
    extractors::AppJson,
    handlers::require_param,
    metrics::track_db_operation,
    models::tag::{CreateTagRequest, Tag, TagListQuery, UpdateTagRequest},
    services::{tag_service::TagService, AppState},
};

/// GET /api/tags?userId=
pub async fn list_tags(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TagListQuery>,
) -> AppResult<Json<Vec<Tag>>> {
    let user_id = require_param(query.user_id, "userId")?;

    let service = TagService::new(state.db.clone());
    let tags = track_db_operation("list", "tags", service.list_for_user(&user_id)).await?;
    Ok(Json(tags))
}

/// POST /api/tags
pub async fn create_tag(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<CreateTagRequest>,
) -> AppResult<Json<Tag>> {
    tracing::info!("Creating tag {:?} for user_id={:?}", req.name, req.user_id);

    let service = TagService::new(state.db.clone());
    let tag = track_db_operation("insert", "tags", service.create(req)).await?;
    Ok(Json(tag))
}

/// PUT /api/tags/{id}
pub async fn update_tag(
    State(state): State<Arc<AppState>>,
    Path(tag_id): Path<String>,
    AppJson(req): AppJson<UpdateTagRequest>,
) -> AppResult<Json<Tag>> {
    tracing::info!("Renaming tag {}", tag_id);

    let tag = TagService::new(state.db.clone())
        .rename(&tag_id, req)
        .await?;
    Ok(Json(tag))
}

/// DELETE /api/tags/{id}
pub async fn delete_tag(
    State(state): State<Arc<AppState>>,
    Path(tag_id): Path<String>,
) -> AppResult<Json<Value>> {
    tracing::info!("Deleting tag {}", tag_id);

    TagService::new(state.db.clone()).delete(&tag_id).await?;
    Ok(Json(json!({ "success": true })))
}
