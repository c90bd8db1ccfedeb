/*
 * Responsibility
 * - tokio runtime 起動
 * - app::run() の呼び出し（ロジックは置かない）
 */
use anyhow::Result;

use footstars_resource_server::app;

#[tokio::main]
async fn main() -> Result<()> {
    app::run().await
}
