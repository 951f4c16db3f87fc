#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use mistakebook_api::{config::Config, create_router, services::AppState};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

#[derive(Clone)]
pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
}

/// Full router over a fresh in-memory database.
pub async fn create_test_app() -> TestApp {
    create_test_app_with_config(Config::in_memory()).await
}

pub async fn create_test_app_with_config(config: Config) -> TestApp {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();

    let state = Arc::new(
        AppState::new(config)
            .await
            .expect("Failed to initialize test app state"),
    );

    TestApp {
        router: create_router(state.clone()),
        state,
    }
}

impl TestApp {
    pub async fn request(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                builder = builder.header("content-type", "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request("GET", uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request("POST", uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request("PUT", uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.request("DELETE", uri, None).await
    }

    pub async fn create_user(&self, email: &str) -> String {
        let (status, body) = self
            .post("/api/users", json!({ "name": "Tester", "email": email }))
            .await;
        assert_eq!(status, StatusCode::OK, "create user failed: {}", body);
        body["id"].as_str().unwrap().to_string()
    }

    pub async fn create_tag(&self, user_id: &str, name: &str) -> String {
        let (status, body) = self
            .post("/api/tags", json!({ "name": name, "userId": user_id }))
            .await;
        assert_eq!(status, StatusCode::OK, "create tag failed: {}", body);
        body["id"].as_str().unwrap().to_string()
    }

    pub async fn create_mistake(&self, user_id: &str, content: &str, tag_ids: &[&str]) -> Value {
        let (status, body) = self
            .post(
                "/api/mistakes",
                json!({
                    "content": content,
                    "correctAnswer": format!("answer for {}", content),
                    "userId": user_id,
                    "tags": tag_ids,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "create mistake failed: {}", body);
        body
    }

    pub async fn count_rows(&self, sql: &str) -> i64 {
        sqlx::query_scalar(sql)
            .fetch_one(&self.state.db)
            .await
            .unwrap()
    }
}

pub fn tag_names(mistake: &Value) -> Vec<String> {
    let mut names: Vec<String> = mistake["tags"]
        .as_array()
        .unwrap()
        .iter()
        .map(|tag| tag["name"].as_str().unwrap().to_string())
        .collect();
    names.sort();
    names
}
