use axum::{http::StatusCode, Json};
use serde_json::{json, Value};

pub mod calendar;
pub mod library;
pub mod series;
pub mod sessions;

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
