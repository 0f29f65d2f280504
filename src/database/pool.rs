use crate::error::Result;
use sqlx::{postgres::PgPoolOptions, Executor, PgPool};
use std::time::Duration;

/// Opens the pool. Every connection gets a server-side `statement_timeout`
/// shorter than `store_timeout`, so a slow statement is aborted by Postgres
/// before the caller's deadline leaves its outcome unknown.
pub async fn create_pool(database_url: &str, store_timeout: Duration) -> Result<PgPool> {
    let statement_timeout_ms = statement_timeout(store_timeout).as_millis();
    let pool = PgPoolOptions::new()
        .max_connections(20)
        .acquire_timeout(store_timeout)
        .after_connect(move |conn, _meta| {
            Box::pin(async move {
                let sql = format!("SET statement_timeout = {}", statement_timeout_ms);
                conn.execute(sql.as_str()).await?;
                Ok(())
            })
        })
        .connect(database_url)
        .await?;
    Ok(pool)
}

fn statement_timeout(store_timeout: Duration) -> Duration {
    (store_timeout * 4 / 5).max(Duration::from_millis(1))
}
