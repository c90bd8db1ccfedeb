/*
 * Responsibility
 * - Handler から見える「認証済みコンテキスト」の型
 * - gate middleware が検証して request extensions に格納し、handler はこの型だけを受け取る
 *
 * Notes
 * - JWT の検証ロジックは middleware/services 側の責務
 * - リクエストごとに生成・消費され、永続化しない
 */
use crate::services::auth::Claims;

/// 認証済みのリクエストに付与されるコンテキスト
///
/// - `claims` は検証済みトークンの claims (sub/iss/aud/exp/scope と独自 claim)
#[derive(Debug, Clone)]
pub struct AuthCtx {
    pub claims: Claims,
}

impl AuthCtx {
    pub fn new(claims: Claims) -> Self {
        Self { claims }
    }

    pub fn subject(&self) -> Option<&str> {
        self.claims.sub.as_deref()
    }
}
