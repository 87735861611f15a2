// src/db/schema.rs
// Table definitions, applied idempotently at startup

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::Result;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS database_recommendations (
        id          TEXT PRIMARY KEY NOT NULL,
        database_id TEXT NOT NULL,
        name        TEXT NOT NULL,
        is_read     BOOLEAN NOT NULL DEFAULT 0,
        vote        TEXT,
        hide        BOOLEAN,
        params      TEXT,
        created_at  TEXT NOT NULL
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_database_recommendations_database
        ON database_recommendations (database_id, created_at)
    "#,
    // One live recommendation per (database, kind)
    r#"
    CREATE UNIQUE INDEX IF NOT EXISTS idx_database_recommendations_name
        ON database_recommendations (database_id, name)
    "#,
];

pub async fn ensure_schema(pool: &SqlitePool) -> Result<()> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    debug!("Recommendation schema ready");
    Ok(())
}
