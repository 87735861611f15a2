// src/recommendation/adapters.rs
// In-process implementations of the feature, directory and analytics ports

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

use super::ports::{AnalyticsSink, DatabaseDirectory, FeatureGate};
use super::types::{ClientMetadata, DatabaseInfo};
use crate::error::{RecommendationError, Result};

/// Feature gate backed by a fixed set of enabled flags
#[derive(Debug, Default)]
pub struct StaticFeatureGate {
    enabled: RwLock<HashSet<String>>,
}

impl StaticFeatureGate {
    pub fn new<I, S>(flags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            enabled: RwLock::new(flags.into_iter().map(Into::into).collect()),
        }
    }

    pub fn set(&self, flag: &str, enabled: bool) -> Result<()> {
        let mut flags = self
            .enabled
            .write()
            .map_err(|e| RecommendationError::FeatureGate(e.to_string()))?;
        if enabled {
            flags.insert(flag.to_string());
        } else {
            flags.remove(flag);
        }
        Ok(())
    }
}

#[async_trait]
impl FeatureGate for StaticFeatureGate {
    async fn is_feature_enabled(&self, flag: &str) -> Result<bool> {
        let flags = self
            .enabled
            .read()
            .map_err(|e| RecommendationError::FeatureGate(e.to_string()))?;
        Ok(flags.contains(flag))
    }
}

/// Directory holding database descriptions registered up front
#[derive(Debug, Default)]
pub struct StaticDatabaseDirectory {
    databases: RwLock<HashMap<String, DatabaseInfo>>,
}

impl StaticDatabaseDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, info: DatabaseInfo) -> Result<()> {
        let mut databases = self
            .databases
            .write()
            .map_err(|e| RecommendationError::Directory(e.to_string()))?;
        databases.insert(info.id.clone(), info);
        Ok(())
    }
}

#[async_trait]
impl DatabaseDirectory for StaticDatabaseDirectory {
    async fn get(&self, ctx: &ClientMetadata) -> Result<DatabaseInfo> {
        let databases = self
            .databases
            .read()
            .map_err(|e| RecommendationError::Directory(e.to_string()))?;
        databases
            .get(&ctx.database_id)
            .cloned()
            .ok_or_else(|| RecommendationError::Directory(format!("database {} is not configured", ctx.database_id)))
    }
}

/// Analytics sink that records events in the log
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAnalytics;

#[async_trait]
impl AnalyticsSink for TracingAnalytics {
    async fn emit(&self, event: &str, payload: Value) -> Result<()> {
        info!(target: "analytics", event, %payload, "Analytics event");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recommendation::types::SessionMetadata;

    #[tokio::test]
    async fn test_feature_gate_toggles() {
        let gate = StaticFeatureGate::new(["insightsRecommendations"]);
        assert!(gate.is_feature_enabled("insightsRecommendations").await.unwrap());
        assert!(!gate.is_feature_enabled("other").await.unwrap());

        gate.set("insightsRecommendations", false).unwrap();
        assert!(!gate.is_feature_enabled("insightsRecommendations").await.unwrap());
    }

    #[tokio::test]
    async fn test_directory_lookup() {
        let directory = StaticDatabaseDirectory::new();
        directory
            .insert(DatabaseInfo {
                id: "db-1".into(),
                db: Some(66),
                provider: Some("RE_CLOUD".into()),
            })
            .unwrap();

        let found = directory
            .get(&ClientMetadata::new(SessionMetadata::default(), "db-1", None))
            .await
            .unwrap();
        assert_eq!(found.db, Some(66));

        let missing = directory
            .get(&ClientMetadata::new(SessionMetadata::default(), "db-2", None))
            .await;
        assert!(matches!(missing, Err(RecommendationError::Directory(_))));
    }
}
