/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - 認証の要否は gate のルール表で決まる (ここでは route_layer を使わない)
 */
use axum::{Router, routing::get};

use crate::api::v1::handlers::me::me;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/me", get(me))
}
