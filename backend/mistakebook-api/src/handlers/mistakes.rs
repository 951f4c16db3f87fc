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
    models::mistake::{CreateMistakeRequest, Mistake, MistakeListQuery, UpdateMistakeRequest},
    services::{filter::MistakeFilter, mistake_service::MistakeService, AppState},
};

/// GET /api/mistakes?userId=[&tagIds=a,b][&q=text]
pub async fn list_mistakes(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MistakeListQuery>,
) -> AppResult<Json<Vec<Mistake>>> {
    let filter = MistakeFilter::new(query.selected_tag_ids(), query.search_query());
    let user_id = require_param(query.user_id, "userId")?;

    let service = MistakeService::new(state.db.clone());
    let mistakes = track_db_operation("list", "mistakes", service.list_for_user(&user_id)).await?;

    if filter.is_empty() {
        return Ok(Json(mistakes));
    }

    tracing::debug!(
        "Filtering {} mistakes by {} tags and query {:?}",
        mistakes.len(),
        filter.tag_ids.len(),
        filter.query
    );
    Ok(Json(filter.apply(&mistakes)))
}

/// POST /api/mistakes
pub async fn create_mistake(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<CreateMistakeRequest>,
) -> AppResult<Json<Mistake>> {
    tracing::info!("Creating mistake for user_id={:?}", req.user_id);

    let service = MistakeService::new(state.db.clone());
    let mistake = track_db_operation("insert", "mistakes", service.create(req)).await?;
    Ok(Json(mistake))
}

/// GET /api/mistakes/{id}
pub async fn get_mistake(
    State(state): State<Arc<AppState>>,
    Path(mistake_id): Path<String>,
) -> AppResult<Json<Mistake>> {
    let mistake = MistakeService::new(state.db.clone())
        .get(&mistake_id)
        .await?;
    Ok(Json(mistake))
}

/// PUT /api/mistakes/{id}
pub async fn update_mistake(
    State(state): State<Arc<AppState>>,
    Path(mistake_id): Path<String>,
    AppJson(req): AppJson<UpdateMistakeRequest>,
) -> AppResult<Json<Mistake>> {
    tracing::info!("Updating mistake {}", mistake_id);

    let service = MistakeService::new(state.db.clone());
    let mistake =
        track_db_operation("update", "mistakes", service.update(&mistake_id, req)).await?;
    Ok(Json(mistake))
}

/// DELETE /api/mistakes/{id}
pub async fn delete_mistake(
    State(state): State<Arc<AppState>>,
    Path(mistake_id): Path<String>,
) -> AppResult<Json<Value>> {
    tracing::info!("Deleting mistake {}", mistake_id);

    MistakeService::new(state.db.clone())
        .delete(&mistake_id)
        .await?;
    Ok(Json(json!({ "success": true })))
}
