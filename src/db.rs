use std::time::Duration;

use anyhow::Context;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

/// Opens the pool named by `DATABASE_URL` and brings the schema up to date.
pub async fn init() -> anyhow::Result<SqlitePool> {
    let url = std::env::var("DATABASE_URL").context("DATABASE_URL not set")?;
    let pool = connect(&url).await?;

    sqlx::migrate!()
        .run(&pool)
        .await
        .context("failed to apply migrations")?;

    Ok(pool)
}

/// Pool without the migration step, shared with the ops CLI.
pub async fn connect(url: &str) -> anyhow::Result<SqlitePool> {
    let options = url
        .parse::<SqliteConnectOptions>()
        .with_context(|| format!("invalid DATABASE_URL: {url}"))?
        .create_if_missing(true);

    SqlitePoolOptions::new()
        .max_connections(8)
        .acquire_timeout(Duration::from_secs(5))
        .connect_with(options)
        .await
        .context("failed to open database")
}
