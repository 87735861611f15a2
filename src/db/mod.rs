// src/db/mod.rs
// SQLite storage for recommendations

pub mod recommendations;
pub mod schema;

use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use tracing::info;

use crate::error::Result;

pub use recommendations::SqliteRecommendationRepository;

/// Open a pool for `database_url` and make sure the schema exists
pub async fn connect(database_url: &str, max_connections: u32) -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections.max(1))
        .connect(database_url)
        .await?;
    schema::ensure_schema(&pool).await?;
    info!(database_url, "Recommendation store opened");
    Ok(pool)
}

/// Single-connection in-memory pool. The connection is never recycled,
/// since closing it would discard the database.
pub async fn connect_in_memory() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await?;
    schema::ensure_schema(&pool).await?;
    Ok(pool)
}
