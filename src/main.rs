/*
 * Responsibility
 * - tokio runtime
 * - calls app::run() (no logic here)
 */
use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    oauth_guard::app::run().await
}
