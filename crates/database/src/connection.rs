use crate::error::DbError;
use configuration::DatabaseConfig;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Connection, SqlitePool};
use std::str::FromStr;
use std::time::Duration;

/// Establishes a connection pool to the SQLite database.
///
/// The database file is created if it does not exist yet, and the pool is
/// pinged once before it is handed out so that a broken configuration fails
/// here rather than on the first write.
pub async fn connect(config: &DatabaseConfig) -> Result<SqlitePool, DbError> {
    let options = SqliteConnectOptions::from_str(&config.url)
        .map_err(|e| DbError::ConnectionConfigError(e.to_string()))?
        .create_if_missing(true);

    // Connections never expire: an in-memory database lives exactly as long
    // as its connection.
    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    ping(&pool).await?;
    tracing::debug!(url = %config.url, "Connected to the product store.");

    Ok(pool)
}

/// Opens a private in-memory database with the schema applied.
pub async fn connect_in_memory() -> Result<SqlitePool, DbError> {
    let config = DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
    };
    let pool = connect(&config).await?;
    run_migrations(&pool).await?;
    Ok(pool)
}

/// Checks that a connection can be acquired and answers.
pub async fn ping(pool: &SqlitePool) -> Result<(), DbError> {
    let mut conn = pool.acquire().await?;
    conn.ping().await?;
    Ok(())
}

/// Applies the embedded migrations, ensuring the `products` table exists.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), DbError> {
    // Use a relative path from the crate root
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Waits for checked-out connections to return and closes the pool.
pub async fn close(pool: &SqlitePool) {
    pool.close().await;
    tracing::debug!("Product store closed.");
}
