/*
 * Responsibility
 * - GET /public/health (疎通用)
 * - 公開パス: gate はトークンを見ずに通す
 */
use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "ok"})))
}
