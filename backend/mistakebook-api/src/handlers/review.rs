use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::{
    error::AppResult,
    extractors::AppJson,
    handlers::require_param,
    metrics::track_db_operation,
    models::{
        mistake::Mistake,
        review::{
            CreateReviewEntryRequest, ReviewEntry, ReviewQueueQuery, ReviewSession, SessionQuery,
        },
    },
    services::{review_service::ReviewService, AppState},
};

/// POST /api/review - start an empty session
pub async fn create_session(State(state): State<Arc<AppState>>) -> AppResult<Json<ReviewSession>> {
    let session = ReviewService::new(state.db.clone())
        .create_session()
        .await?;
    Ok(Json(session))
}

/// GET /api/review[?sessionId=] - one session, or all of them newest first
pub async fn get_sessions(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SessionQuery>,
) -> AppResult<Response> {
    let service = ReviewService::new(state.db.clone());

    match query.session_id.filter(|id| !id.is_empty()) {
        Some(session_id) => {
            let session = service.get_session(&session_id).await?;
            Ok(Json(session).into_response())
        }
        None => {
            let sessions =
                track_db_operation("list", "review_sessions", service.list_sessions()).await?;
            Ok(Json(sessions).into_response())
        }
    }
}

/// POST /api/review/{id}/end
pub async fn end_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> AppResult<Json<ReviewSession>> {
    tracing::info!("Ending review session {}", session_id);

    let session = ReviewService::new(state.db.clone())
        .end_session(&session_id)
        .await?;
    Ok(Json(session))
}

/// POST /api/review/entries - record a rating
pub async fn create_entry(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<CreateReviewEntryRequest>,
) -> AppResult<Json<ReviewEntry>> {
    let service = ReviewService::new(state.db.clone());
    let entry = track_db_operation("insert", "review_entries", service.record_entry(req)).await?;
    Ok(Json(entry))
}

/// GET /api/review/queue?userId= - mistakes in review order
pub async fn review_queue(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ReviewQueueQuery>,
) -> AppResult<Json<Vec<Mistake>>> {
    let user_id = require_param(query.user_id, "userId")?;

    let queue = ReviewService::new(state.db.clone())
        .review_queue(&user_id)
        .await?;
    Ok(Json(queue))
}
