use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use base64::{engine::general_purpose, Engine as _};
use serde_json::json;
use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::metrics;
use crate::services::AppState;

pub mod mistakes;
pub mod review;
pub mod stats;
pub mod tags;
pub mod users;

/// Query parameters arrive optional; a missing or empty one is a 400.
pub(crate) fn require_param(value: Option<String>, name: &str) -> AppResult<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::validation(format!("Missing required parameter: {}", name)))
}

pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let database = match tokio::time::timeout(
        std::time::Duration::from_secs(1),
        sqlx::query("SELECT 1").execute(&state.db),
    )
    .await
    {
        Ok(Ok(_)) => json!({ "status": "healthy", "message": "SQLite connection successful" }),
        Ok(Err(e)) => json!({ "status": "unhealthy", "error": format!("SQLite error: {}", e) }),
        Err(_) => json!({ "status": "unhealthy", "error": "SQLite timeout after 1s" }),
    };

    let healthy = database.get("status").and_then(|v| v.as_str()) == Some("healthy");
    let (status_code, status) = if healthy {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        status_code,
        Json(json!({
            "status": status,
            "service": "mistakebook-api",
            "version": env!("CARGO_PKG_VERSION"),
            "dependencies": { "database": database }
        })),
    )
}

pub async fn metrics_handler() -> impl IntoResponse {
    match metrics::render_metrics() {
        Ok(metrics_text) => (StatusCode::OK, metrics_text),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to render metrics: {}", e),
        ),
    }
}

/// Protects /metrics with HTTP Basic Auth (`metrics.auth` = "user:password")
pub async fn metrics_auth_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let encoded = auth_header
        .strip_prefix("Basic ")
        .ok_or(StatusCode::UNAUTHORIZED)?;
    let decoded = general_purpose::STANDARD
        .decode(encoded)
        .map_err(|_| StatusCode::UNAUTHORIZED)?;
    let credentials = String::from_utf8(decoded).map_err(|_| StatusCode::UNAUTHORIZED)?;

    if credentials != state.config.metrics_auth {
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_param_rejects_missing_and_blank() {
        assert!(require_param(None, "userId").is_err());
        assert!(require_param(Some("  ".to_string()), "userId").is_err());
        assert_eq!(require_param(Some("u1".to_string()), "userId").unwrap(), "u1");
    }
}
