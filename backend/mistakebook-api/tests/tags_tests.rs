mod common;

use axum::http::StatusCode;
use common::create_test_app;
use serde_json::json;

#[tokio::test]
async fn test_tags_are_listed_alphabetically_per_user() {
    let app = create_test_app().await;
    let ann = app.create_user("ann@example.com").await;
    let bob = app.create_user("bob@example.com").await;

    app.create_tag(&ann, "geometry").await;
    app.create_tag(&ann, "algebra").await;
    app.create_tag(&bob, "physics").await;

    let (status, body) = app.get(&format!("/api/tags?userId={}", ann)).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["algebra", "geometry"]);
}

#[tokio::test]
async fn test_duplicate_tag_name_conflicts_only_within_one_user() {
    let app = create_test_app().await;
    let ann = app.create_user("ann@example.com").await;
    let bob = app.create_user("bob@example.com").await;

    app.create_tag(&ann, "algebra").await;

    let (status, body) = app
        .post("/api/tags", json!({ "name": "algebra", "userId": ann }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Tag already exists");

    // Same name for another user is fine
    let (status, _) = app
        .post("/api/tags", json!({ "name": "algebra", "userId": bob }))
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_create_tag_validation() {
    let app = create_test_app().await;
    let ann = app.create_user("ann@example.com").await;

    let (status, _) = app.post("/api/tags", json!({ "userId": ann })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.post("/api/tags", json!({ "name": "algebra" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.get("/api/tags").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .post("/api/tags", json!({ "name": "algebra", "userId": "ghost" }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "User not found");
}

#[tokio::test]
async fn test_rename_tag() {
    let app = create_test_app().await;
    let ann = app.create_user("ann@example.com").await;
    let algebra = app.create_tag(&ann, "algebra").await;
    app.create_tag(&ann, "geometry").await;

    let (status, body) = app
        .put(&format!("/api/tags/{}", algebra), json!({ "name": "linear algebra" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "linear algebra");
    assert_eq!(body["id"], algebra.as_str());

    // Keeping its own name is not a conflict
    let (status, _) = app
        .put(&format!("/api/tags/{}", algebra), json!({ "name": "linear algebra" }))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .put(&format!("/api/tags/{}", algebra), json!({ "name": "geometry" }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Tag name already exists");

    let (status, _) = app
        .put("/api/tags/missing", json!({ "name": "anything" }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.put(&format!("/api/tags/{}", algebra), json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_tag_detaches_it_from_mistakes() {
    let app = create_test_app().await;
    let ann = app.create_user("ann@example.com").await;
    let algebra = app.create_tag(&ann, "algebra").await;
    let mistake = app.create_mistake(&ann, "2x = 4", &[&algebra]).await;

    let (status, body) = app.delete(&format!("/api/tags/{}", algebra)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, body) = app
        .get(&format!("/api/mistakes/{}", mistake["id"].as_str().unwrap()))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["tags"].as_array().unwrap().is_empty());
    assert_eq!(app.count_rows("SELECT COUNT(*) FROM mistake_tags").await, 0);

    let (status, _) = app.delete(&format!("/api/tags/{}", algebra)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_long_tag_names_are_kept_verbatim() {
    let app = create_test_app().await;
    let ann = app.create_user("ann@example.com").await;
    let long_name = "x".repeat(60);

    let (status, body) = app
        .post("/api/tags", json!({ "name": long_name, "userId": ann }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], long_name.as_str());

    let renamed = "y".repeat(120);
    let (status, body) = app
        .put(
            &format!("/api/tags/{}", body["id"].as_str().unwrap()),
            json!({ "name": renamed }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], renamed.as_str());

    let (status, _) = app
        .post("/api/tags", json!({ "name": "", "userId": ann }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
