use std::time::Duration;

use sqlx::{PgPool, postgres::PgPoolOptions};

/// Connects the pool and brings the schema up to date. Every handler shares
/// this pool; per-request work checks connections out as needed.
pub async fn connect(database_url: &str) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(16)
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(300))
        .connect(database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}
