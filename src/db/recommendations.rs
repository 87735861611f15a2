// src/db/recommendations.rs
// RecommendationRepository backed by SQLite

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{RecommendationError, Result};
use crate::notifications::{NewRecommendations, RecommendationPublisher};
use crate::recommendation::kind::RecommendationKind;
use crate::recommendation::ports::RecommendationRepository;
use crate::recommendation::types::{
    AnalysisRecommendation, ClientMetadata, NewRecommendation, Recommendation,
    RecommendationsResponse, SessionMetadata, UpdateRecommendation, Vote,
};

const SELECT_COLUMNS: &str =
    "SELECT id, database_id, name, is_read, vote, hide, params, created_at FROM database_recommendations";

#[derive(Debug, sqlx::FromRow)]
struct RecommendationRow {
    id: String,
    database_id: String,
    name: String,
    is_read: bool,
    vote: Option<String>,
    hide: Option<bool>,
    params: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<RecommendationRow> for Recommendation {
    type Error = RecommendationError;

    fn try_from(row: RecommendationRow) -> Result<Self> {
        let params = row.params.as_deref().map(serde_json::from_str).transpose()?;
        Ok(Recommendation {
            id: row.id,
            database_id: row.database_id,
            name: row.name,
            read: row.is_read,
            vote: row.vote.as_deref().and_then(Vote::parse),
            hide: row.hide,
            params,
            created_at: row.created_at,
        })
    }
}

/// SQLite implementation of the recommendation repository.
///
/// Every successful create is announced on the optional publisher so the
/// notification relay can push it to clients.
#[derive(Clone)]
pub struct SqliteRecommendationRepository {
    pool: SqlitePool,
    publisher: Option<RecommendationPublisher>,
}

impl SqliteRecommendationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool, publisher: None }
    }

    pub fn with_publisher(mut self, publisher: RecommendationPublisher) -> Self {
        self.publisher = Some(publisher);
        self
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn find(&self, id: &str, database_id: Option<&str>) -> Result<Option<Recommendation>> {
        let row: Option<RecommendationRow> = match database_id {
            Some(database_id) => {
                sqlx::query_as(&format!("{SELECT_COLUMNS} WHERE id = ? AND database_id = ?"))
                    .bind(id)
                    .bind(database_id)
                    .fetch_optional(&self.pool)
                    .await?
            }
            None => {
                sqlx::query_as(&format!("{SELECT_COLUMNS} WHERE id = ?"))
                    .bind(id)
                    .fetch_optional(&self.pool)
                    .await?
            }
        };
        row.map(Recommendation::try_from).transpose()
    }
}

#[async_trait]
impl RecommendationRepository for SqliteRecommendationRepository {
    async fn create(&self, session: &SessionMetadata, entity: NewRecommendation) -> Result<Recommendation> {
        debug!(session_id = %session.session_id, database_id = %entity.database_id, name = %entity.name, "Creating recommendation");

        let recommendation = Recommendation {
            id: Uuid::new_v4().to_string(),
            database_id: entity.database_id,
            name: entity.name,
            read: false,
            vote: None,
            hide: None,
            params: entity.params,
            created_at: Utc::now().trunc_subsecs(6),
        };
        let params = recommendation.params.as_ref().map(serde_json::to_string).transpose()?;

        sqlx::query(
            r#"
            INSERT INTO database_recommendations (id, database_id, name, is_read, params, created_at)
            VALUES (?, ?, ?, 0, ?, ?)
            "#,
        )
        .bind(&recommendation.id)
        .bind(&recommendation.database_id)
        .bind(&recommendation.name)
        .bind(params)
        // Fixed-width timestamps keep text ordering chronological
        .bind(recommendation.created_at.to_rfc3339_opts(SecondsFormat::Micros, true))
        .execute(&self.pool)
        .await?;

        if let Some(publisher) = &self.publisher {
            publisher.publish(NewRecommendations {
                database_id: recommendation.database_id.clone(),
                recommendations: vec![recommendation.clone()],
            });
        }

        Ok(recommendation)
    }

    async fn list(&self, ctx: &ClientMetadata) -> Result<RecommendationsResponse> {
        debug!(database_id = %ctx.database_id, "Getting recommendations list");

        let rows: Vec<RecommendationRow> = sqlx::query_as(&format!(
            "{SELECT_COLUMNS} WHERE database_id = ? ORDER BY created_at DESC, rowid DESC"
        ))
        .bind(&ctx.database_id)
        .fetch_all(&self.pool)
        .await?;

        let recommendations = rows
            .into_iter()
            .filter_map(|row| {
                let id = row.id.clone();
                match Recommendation::try_from(row) {
                    Ok(recommendation) => Some(recommendation),
                    Err(e) => {
                        warn!(database_id = %ctx.database_id, id = %id, "Skipping unreadable recommendation: {}", e);
                        None
                    }
                }
            })
            .collect();

        let total_unread = self.get_total_unread(&ctx.session, &ctx.database_id).await?;

        Ok(RecommendationsResponse {
            recommendations,
            total_unread,
        })
    }

    async fn read(&self, ctx: &ClientMetadata) -> Result<()> {
        let result = sqlx::query("UPDATE database_recommendations SET is_read = 1 WHERE database_id = ?")
            .bind(&ctx.database_id)
            .execute(&self.pool)
            .await?;
        debug!(database_id = %ctx.database_id, marked = result.rows_affected(), "Marked recommendations as read");
        Ok(())
    }

    async fn update(&self, ctx: &ClientMetadata, id: &str, patch: UpdateRecommendation) -> Result<Recommendation> {
        if self.find(id, Some(&ctx.database_id)).await?.is_none() {
            warn!(database_id = %ctx.database_id, id, "Recommendation to update was not found");
            return Err(RecommendationError::NotFound(id.to_string()));
        }

        sqlx::query(
            r#"
            UPDATE database_recommendations
            SET vote = COALESCE(?, vote), hide = COALESCE(?, hide)
            WHERE id = ? AND database_id = ?
            "#,
        )
        .bind(patch.vote.map(|v| v.as_str()))
        .bind(patch.hide)
        .bind(id)
        .bind(&ctx.database_id)
        .execute(&self.pool)
        .await?;

        debug!(database_id = %ctx.database_id, id, "Updated recommendation");

        self.find(id, Some(&ctx.database_id))
            .await?
            .ok_or_else(|| RecommendationError::NotFound(id.to_string()))
    }

    async fn is_exist(&self, ctx: &ClientMetadata, name: &str) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM database_recommendations WHERE database_id = ? AND name = ?)",
        )
        .bind(&ctx.database_id)
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn is_exist_multi(&self, ctx: &ClientMetadata, names: &[String]) -> Result<HashMap<String, bool>> {
        if names.is_empty() {
            return Ok(HashMap::new());
        }

        let mut query: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT name FROM database_recommendations WHERE database_id = ");
        query.push_bind(&ctx.database_id);
        query.push(" AND name IN (");
        let mut separated = query.separated(", ");
        for name in names {
            separated.push_bind(name);
        }
        separated.push_unseparated(")");

        let found: HashSet<String> = query
            .build_query_scalar::<String>()
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .collect();

        Ok(names
            .iter()
            .map(|name| (name.clone(), found.contains(name)))
            .collect())
    }

    async fn get(&self, session: &SessionMetadata, id: &str) -> Result<Option<Recommendation>> {
        let recommendation = self.find(id, None).await?;
        if recommendation.is_none() {
            debug!(session_id = %session.session_id, id, "Recommendation not found");
        }
        Ok(recommendation)
    }

    async fn sync(&self, ctx: &ClientMetadata, recommendations: &[AnalysisRecommendation]) -> Result<()> {
        let mut ordered: Vec<&AnalysisRecommendation> = recommendations.iter().collect();
        ordered.sort_by_key(|r| RecommendationKind::priority_of(&r.name));

        let mut seen = HashSet::new();
        let mut created = 0usize;
        for recommendation in ordered {
            if !seen.insert(recommendation.name.as_str()) {
                continue;
            }
            if self.is_exist(ctx, &recommendation.name).await? {
                continue;
            }
            let entity = NewRecommendation {
                database_id: ctx.database_id.clone(),
                name: recommendation.name.clone(),
                params: recommendation.params.clone(),
            };
            match self.create(&ctx.session, entity).await {
                Ok(_) => created += 1,
                // Inserted by a concurrent live check since the existence check
                Err(e) if e.is_unique_violation() => {
                    debug!(database_id = %ctx.database_id, name = %recommendation.name, "Recommendation already created concurrently");
                }
                Err(e) => return Err(e),
            }
        }

        debug!(database_id = %ctx.database_id, created, "Synchronized analysis recommendations");
        Ok(())
    }

    async fn delete(&self, ctx: &ClientMetadata, id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM database_recommendations WHERE database_id = ? AND id = ?")
            .bind(&ctx.database_id)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            warn!(database_id = %ctx.database_id, id, "Recommendation to delete was not found");
            return Err(RecommendationError::NotFound(id.to_string()));
        }

        debug!(database_id = %ctx.database_id, id, "Deleted recommendation");
        Ok(())
    }

    async fn get_total_unread(&self, _session: &SessionMetadata, database_id: &str) -> Result<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM database_recommendations WHERE database_id = ? AND is_read = 0",
        )
        .bind(database_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count.max(0) as u64)
    }
}
