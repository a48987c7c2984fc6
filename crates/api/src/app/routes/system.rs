use axum::{http::StatusCode, response::Response};

use crate::app::errors;

pub async fn health() -> Response {
    errors::ok(StatusCode::OK, "ok", serde_json::json!({ "status": "ok" }))
}
