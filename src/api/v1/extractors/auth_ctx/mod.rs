/*!
 * 検証済み claims を handler に渡す extractor
 *
 * Responsibility:
 * - gate middleware が extensions に格納した AuthCtx (検証済みトークンの Claims) を取り出す
 * - AuthCtx が無い = gate を通っていないので 401 を返す
 * - axum 依存 (FromRequestParts) は core、型は types に置く
 */

mod core;
mod types;

pub use core::AuthCtxExtractor;
pub use types::AuthCtx;
