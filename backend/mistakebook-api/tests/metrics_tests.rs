mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::create_test_app;
use mistakebook_api::metrics::REVIEW_SESSIONS_ACTIVE;
use serde_json::json;

// The gauge is process-global, so this binary holds a single test.
#[tokio::test]
async fn test_active_sessions_gauge_follows_open_sessions() {
    let app = create_test_app().await;
    assert_eq!(REVIEW_SESSIONS_ACTIVE.get(), 0);

    // A session left open by an earlier run of the server
    sqlx::query(
        "INSERT INTO review_sessions (id, start_time, end_time, mistakes_reviewed) \
         VALUES ('earlier-run', ?, NULL, 3)",
    )
    .bind(Utc::now() - Duration::days(1))
    .execute(&app.state.db)
    .await
    .unwrap();

    let (status, _) = app.post("/api/review/earlier-run/end", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(REVIEW_SESSIONS_ACTIVE.get(), 0);

    let (_, first) = app.post("/api/review", json!({})).await;
    app.post("/api/review", json!({})).await;
    assert_eq!(REVIEW_SESSIONS_ACTIVE.get(), 2);

    let end_first = format!("/api/review/{}/end", first["id"].as_str().unwrap());
    app.post(&end_first, json!({})).await;
    app.post(&end_first, json!({})).await;
    assert_eq!(REVIEW_SESSIONS_ACTIVE.get(), 1);
}
