use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;

use crate::metrics::{HTTP_REQUESTS_TOTAL, HTTP_REQUEST_DURATION_SECONDS};

/// Literal path segments of the routes this API serves. Any other segment is a
/// client-chosen id.
const ROUTE_SEGMENTS: &[&str] = &[
    "api", "users", "tags", "mistakes", "review", "queue", "entries", "end", "stats", "health",
    "metrics",
];

/// Records request count and latency per method and route label.
pub async fn metrics_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let route = route_label(req.uri().path());

    let response = next.run(req).await;

    let status = response.status().as_u16().to_string();

    HTTP_REQUESTS_TOTAL
        .with_label_values(&[&method, &route, &status])
        .inc();
    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[&method, &route])
        .observe(start.elapsed().as_secs_f64());

    response
}

/// `/api/review/<anything>/end` -> `/api/review/{id}/end`. Ids are free-form
/// strings, so every segment outside the route vocabulary is folded.
fn route_label(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            if segment.is_empty() || ROUTE_SEGMENTS.contains(&segment) {
                segment
            } else {
                "{id}"
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}
