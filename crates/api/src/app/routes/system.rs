use axum::{http::StatusCode, Json};
use serde_json::{json, Value};

pub async fn home() -> Json<Value> {
    Json(json!({ "message": "You are on home page" }))
}

pub async fn health() -> StatusCode {
    StatusCode::OK
}
