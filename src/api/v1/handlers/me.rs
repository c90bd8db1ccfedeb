/*
 * Responsibility
 * - GET /api/v1/me
 * - 検証済みトークンの主体情報を返す (下流 handler が claims を使える例)
 */
use axum::Json;

use crate::api::v1::{dto::me::MeResponse, extractors::AuthCtxExtractor};

pub async fn me(AuthCtxExtractor(ctx): AuthCtxExtractor) -> Json<MeResponse> {
    Json(MeResponse::from_claims(&ctx.claims))
}
