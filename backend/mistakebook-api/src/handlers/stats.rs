use axum::{
    extract::{Query, State},
    Json,
};
use std::sync::Arc;

use crate::{
    error::AppResult,
    handlers::require_param,
    models::stats::{StatsQuery, StudyStats},
    services::{stats_service::StatsService, AppState},
};

/// GET /api/stats?userId=
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StatsQuery>,
) -> AppResult<Json<StudyStats>> {
    let user_id = require_param(query.user_id, "userId")?;

    let stats = StatsService::new(state.db.clone())
        .user_stats(&user_id)
        .await?;
    Ok(Json(stats))
}
