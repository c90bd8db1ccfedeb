//! Request gate stage: classify -> verify bearer JWT -> AuthCtx を extensions に入れる
//!
//! - 公開パスはトークンを一切見ずに通す
//! - それ以外は `Authorization: Bearer <jwt>` を検証し、失敗時は 401 で終了 (リトライなし)
//! - 成功時は検証済み claims を `AuthCtx` として extensions に格納する

use axum::{
    Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::{IntoResponse, Response},
};

use crate::api::v1::extractors::AuthCtx;
use crate::error::AppError;
use crate::services::auth::{Decision, gate::fingerprint};
use crate::state::AppState;

/// Router 全体 (fallback を含む) に gate を掛ける。
///
/// 例：
/// ```ignore
/// let router = Router::new().route(...).fallback(not_found);
/// let router = middleware::auth::access::apply(router, state.clone());
/// let app = router.with_state(state);
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // axum 0.8 の from_fn は State extractor を受け取れないため、`from_fn_with_state` で明示的に state を渡す
    router.layer(middleware::from_fn_with_state(state, access_middleware))
}

async fn access_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let decision = state
        .gate
        .decide(req.method(), req.uri().path(), req.headers())
        .await;

    match decision {
        Decision::Allow(None) => next.run(req).await,
        Decision::Allow(Some(claims)) => {
            let ctx = AuthCtx::new(claims);
            tracing::debug!(sub = ?ctx.subject(), "request authenticated");
            // middleware → extractor への受け渡し
            req.extensions_mut().insert(ctx);
            next.run(req).await
        }
        Decision::Deny(denial) => {
            let token = crate::services::auth::bearer::extract(req.headers())
                .ok()
                .map(fingerprint);
            tracing::warn!(
                method = %req.method(),
                path = %req.uri().path(),
                reason = denial.reason.as_str(),
                error = %denial.error,
                token = ?token,
                "request denied"
            );
            AppError::from(denial).into_response()
        }
    }
}
