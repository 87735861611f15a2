// src/recommendation/ports.rs

//! Collaborators the engine consumes. All storage, directory, feature and
//! analytics access goes through these traits; no direct I/O in engine logic.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;

use super::types::{
    AnalysisRecommendation, ClientMetadata, DatabaseInfo, NewRecommendation, Recommendation,
    RecommendationsResponse, SessionMetadata, UpdateRecommendation,
};
use crate::error::Result;

/// Storage for recommendations
#[async_trait]
pub trait RecommendationRepository: Send + Sync {
    /// Persist a new recommendation and return it with id and timestamp assigned
    async fn create(&self, session: &SessionMetadata, entity: NewRecommendation) -> Result<Recommendation>;

    /// All recommendations of `ctx.database_id`, newest first, plus the unread count
    async fn list(&self, ctx: &ClientMetadata) -> Result<RecommendationsResponse>;

    /// Mark every recommendation of `ctx.database_id` as read
    async fn read(&self, ctx: &ClientMetadata) -> Result<()>;

    /// Apply vote/hide changes and return the updated row
    async fn update(&self, ctx: &ClientMetadata, id: &str, patch: UpdateRecommendation) -> Result<Recommendation>;

    async fn is_exist(&self, ctx: &ClientMetadata, name: &str) -> Result<bool>;

    /// Existence of each name for `ctx.database_id`; every requested name is present in the map
    async fn is_exist_multi(&self, ctx: &ClientMetadata, names: &[String]) -> Result<HashMap<String, bool>>;

    async fn get(&self, session: &SessionMetadata, id: &str) -> Result<Option<Recommendation>>;

    /// Create analysis recommendations that are not yet present for `ctx.database_id`
    async fn sync(&self, ctx: &ClientMetadata, recommendations: &[AnalysisRecommendation]) -> Result<()>;

    /// Delete one recommendation of `ctx.database_id`; missing ids are `NotFound`
    async fn delete(&self, ctx: &ClientMetadata, id: &str) -> Result<()>;

    async fn get_total_unread(&self, session: &SessionMetadata, database_id: &str) -> Result<u64>;
}

/// Global feature switches
#[async_trait]
pub trait FeatureGate: Send + Sync {
    async fn is_feature_enabled(&self, flag: &str) -> Result<bool>;
}

/// Lookup of configured databases
#[async_trait]
pub trait DatabaseDirectory: Send + Sync {
    async fn get(&self, ctx: &ClientMetadata) -> Result<DatabaseInfo>;
}

/// Fire-and-forget analytics events. The engine emits from a detached
/// task, so a slow sink never holds up the write that triggered it.
#[async_trait]
pub trait AnalyticsSink: Send + Sync {
    async fn emit(&self, event: &str, payload: Value) -> Result<()>;
}
