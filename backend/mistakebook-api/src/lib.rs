use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method},
    middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod metrics;
pub mod middlewares;
pub mod models;
pub mod services;
pub mod store;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use services::AppState;

pub fn create_router(app_state: Arc<AppState>) -> Router {
    // The web UI is served from a different origin during development
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE])
        .allow_origin(tower_http::cors::Any);

    Router::new()
        .route("/health", get(handlers::health_check))
        .route(
            "/metrics",
            get(handlers::metrics_handler).layer(middleware::from_fn_with_state(
                app_state.clone(),
                handlers::metrics_auth_middleware,
            )),
        )
        .nest(
            "/api",
            api_routes()
                .layer(DefaultBodyLimit::max(app_state.config.max_body_bytes))
                .layer(cors),
        )
        .with_state(app_state)
        .layer(CompressionLayer::new())
        .layer(middleware::from_fn(middlewares::trace::trace_context_middleware))
        .layer(middleware::from_fn(middlewares::metrics::metrics_middleware))
        .layer(TraceLayer::new_for_http())
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/users",
            get(handlers::users::get_user).post(handlers::users::find_or_create_user),
        )
        .route(
            "/tags",
            get(handlers::tags::list_tags).post(handlers::tags::create_tag),
        )
        .route(
            "/tags/{id}",
            put(handlers::tags::update_tag).delete(handlers::tags::delete_tag),
        )
        .route(
            "/mistakes",
            get(handlers::mistakes::list_mistakes).post(handlers::mistakes::create_mistake),
        )
        .route(
            "/mistakes/{id}",
            get(handlers::mistakes::get_mistake)
                .put(handlers::mistakes::update_mistake)
                .delete(handlers::mistakes::delete_mistake),
        )
        .route(
            "/review",
            get(handlers::review::get_sessions).post(handlers::review::create_session),
        )
        .route("/review/queue", get(handlers::review::review_queue))
        .route("/review/entries", post(handlers::review::create_entry))
        .route("/review/{id}/end", post(handlers::review::end_session))
        .route("/stats", get(handlers::stats::get_stats))
}
