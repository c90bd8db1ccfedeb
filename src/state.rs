/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - gate: 公開ルール表 + トークン検証器 (起動時に構築、以後不変)
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;

use crate::services::auth::RequestGate;

#[derive(Clone, Debug)]
pub struct AppState {
    pub gate: Arc<RequestGate>,
}

impl AppState {
    pub fn new(gate: Arc<RequestGate>) -> Self {
        Self { gate }
    }
}
