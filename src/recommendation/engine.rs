// src/recommendation/engine.rs
// Orchestrates live checks, persistence, analysis sync and deletion

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use futures::future::join_all;
use serde_json::{Value, json};
use tracing::{debug, error, info, warn};

use super::kind::RecommendationKind;
use super::ports::{AnalyticsSink, DatabaseDirectory, RecommendationRepository};
use super::scanner::Scanner;
use super::types::{
    AnalysisRecommendation, ClientMetadata, DeleteResult, NewRecommendation, Recommendation,
    RecommendationsResponse, UpdateRecommendation,
};
use crate::error::Result;

pub const RECOMMENDATION_GENERATED_EVENT: &str = "INSIGHTS_RECOMMENDATION_GENERATED";

/// Result of a batched live check: one entry per requested kind,
/// `Some` only for recommendations created by this call.
pub type CheckResults = HashMap<RecommendationKind, Option<Recommendation>>;

/// Entry point for everything recommendation related.
///
/// Holds no mutable state of its own. At most one recommendation per
/// `(database_id, name)` is kept by checking existence before creating;
/// the check and the create are separate calls, so two concurrent checks
/// for the same pair can still both create unless the repository rejects
/// the second insert.
pub struct RecommendationEngine {
    repository: Arc<dyn RecommendationRepository>,
    scanner: Scanner,
    directory: Arc<dyn DatabaseDirectory>,
    analytics: Arc<dyn AnalyticsSink>,
}

impl RecommendationEngine {
    pub fn new(
        repository: Arc<dyn RecommendationRepository>,
        scanner: Scanner,
        directory: Arc<dyn DatabaseDirectory>,
        analytics: Arc<dyn AnalyticsSink>,
    ) -> Self {
        Self {
            repository,
            scanner,
            directory,
            analytics,
        }
    }

    pub fn scanner(&self) -> &Scanner {
        &self.scanner
    }

    /// Persist a recommendation and report it to analytics.
    /// Only the repository write can fail this call; reporting runs detached.
    pub async fn create(&self, ctx: &ClientMetadata, entity: NewRecommendation) -> Result<Recommendation> {
        let recommendation = self.repository.create(&ctx.session, entity).await?;
        self.track_created(ctx, &recommendation);
        Ok(recommendation)
    }

    fn track_created(&self, ctx: &ClientMetadata, recommendation: &Recommendation) {
        let directory = Arc::clone(&self.directory);
        let analytics = Arc::clone(&self.analytics);
        let ctx = ctx.clone();
        let name = recommendation.name.clone();
        let database_id = recommendation.database_id.clone();

        tokio::spawn(async move {
            let provider = match directory.get(&ctx).await {
                Ok(info) => info.provider,
                Err(e) => {
                    debug!(database_id = %ctx.database_id, "Database lookup for analytics failed: {}", e);
                    None
                }
            };

            let payload = json!({
                "recommendationName": name,
                "databaseId": database_id,
                "provider": provider,
            });

            if let Err(e) = analytics.emit(RECOMMENDATION_GENERATED_EVENT, payload).await {
                warn!(database_id = %ctx.database_id, "Failed to emit recommendation analytics: {}", e);
            }
        });
    }

    /// Pin the logical index: `ctx.db`, else the directory's value, else 0
    async fn resolve_db(&self, ctx: &ClientMetadata) -> Result<ClientMetadata> {
        if ctx.db.is_some() {
            return Ok(ctx.clone());
        }
        let info = self.directory.get(ctx).await?;
        Ok(ctx.with_db(info.db.unwrap_or(0)))
    }

    pub async fn list(&self, ctx: &ClientMetadata) -> Result<RecommendationsResponse> {
        let ctx = self.resolve_db(ctx).await?;
        debug!(database_id = %ctx.database_id, db = ?ctx.db, "Listing recommendations");
        self.repository.list(&ctx).await
    }

    pub async fn get(&self, ctx: &ClientMetadata, id: &str) -> Result<Option<Recommendation>> {
        self.repository.get(&ctx.session, id).await
    }

    /// Evaluate several kinds against the same data and create what is reached.
    ///
    /// Never fails: any error outside a single kind's branch yields an empty
    /// map, so callers can attach this to their own work without guarding it.
    pub async fn check_multi(&self, ctx: &ClientMetadata, kinds: &[RecommendationKind], data: &Value) -> CheckResults {
        match self.try_check_multi(ctx, kinds, data).await {
            Ok(results) => results,
            Err(e) => {
                error!(database_id = %ctx.database_id, ?kinds, "Failed to check recommendations: {}", e);
                HashMap::new()
            }
        }
    }

    /// Fallible form of [`RecommendationEngine::check_multi`]
    pub async fn try_check_multi(
        &self,
        ctx: &ClientMetadata,
        kinds: &[RecommendationKind],
        data: &Value,
    ) -> Result<CheckResults> {
        let ctx = self.resolve_db(ctx).await?;

        let mut seen = HashSet::new();
        let kinds: Vec<RecommendationKind> = kinds.iter().copied().filter(|k| seen.insert(*k)).collect();
        let names: Vec<String> = kinds.iter().map(|k| k.as_str().to_string()).collect();

        let existing = self.repository.is_exist_multi(&ctx, &names).await?;

        let evaluations = kinds.iter().map(|&kind| {
            let ctx = &ctx;
            let existing = &existing;
            async move {
                if existing.get(kind.as_str()).copied().unwrap_or(false) {
                    return (kind, None);
                }
                let Some(candidate) = self.scanner.evaluate(ctx, kind, data).await else {
                    return (kind, None);
                };
                match self.create(ctx, candidate.into_new(&ctx.database_id)).await {
                    Ok(recommendation) => {
                        info!(database_id = %ctx.database_id, %kind, "Recommendation created");
                        (kind, Some(recommendation))
                    }
                    Err(e) if e.is_unique_violation() => {
                        debug!(database_id = %ctx.database_id, %kind, "Recommendation created concurrently elsewhere");
                        (kind, None)
                    }
                    Err(e) => {
                        warn!(database_id = %ctx.database_id, %kind, "Failed to create recommendation: {}", e);
                        (kind, None)
                    }
                }
            }
        });

        Ok(join_all(evaluations).await.into_iter().collect())
    }

    /// Single-kind [`RecommendationEngine::check_multi`]. Never fails.
    pub async fn check(&self, ctx: &ClientMetadata, kind: RecommendationKind, data: &Value) -> Option<Recommendation> {
        self.check_multi(ctx, &[kind], data).await.remove(&kind).flatten()
    }

    /// Mark all recommendations of the database as read
    pub async fn read(&self, ctx: &ClientMetadata) -> Result<()> {
        debug!(database_id = %ctx.database_id, "Marking recommendations as read");
        self.repository.read(ctx).await
    }

    pub async fn update(&self, ctx: &ClientMetadata, id: &str, patch: UpdateRecommendation) -> Result<Recommendation> {
        debug!(database_id = %ctx.database_id, id, "Updating recommendation");
        self.repository.update(ctx, id, patch).await
    }

    /// Merge recommendations from a full analysis pass. Idempotent: names that
    /// already exist for the database are not created again.
    pub async fn sync(&self, ctx: &ClientMetadata, recommendations: &[AnalysisRecommendation]) -> Result<()> {
        debug!(
            database_id = %ctx.database_id,
            count = recommendations.len(),
            "Synchronizing analysis recommendations"
        );
        self.repository.sync(ctx, recommendations).await
    }

    pub async fn delete(&self, ctx: &ClientMetadata, id: &str) -> Result<()> {
        self.repository.delete(ctx, id).await
    }

    /// Delete every id independently. Never fails; `affected` counts successes.
    pub async fn bulk_delete(&self, ctx: &ClientMetadata, ids: &[String]) -> DeleteResult {
        let deletions = ids.iter().map(|id| async move {
            match self.delete(ctx, id).await {
                Ok(()) => 1,
                Err(e) => {
                    warn!(database_id = %ctx.database_id, id = %id, "Failed to delete recommendation: {}", e);
                    0
                }
            }
        });

        let affected: usize = join_all(deletions).await.into_iter().sum();
        debug!(database_id = %ctx.database_id, affected, requested = ids.len(), "Bulk delete finished");
        DeleteResult { affected }
    }
}
