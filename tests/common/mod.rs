// tests/common/mod.rs
// Shared in-memory doubles for integration tests

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;

use dbrec::notifications::{NotificationChannel, RecommendationNotification};
use dbrec::recommendation::{
    AnalysisRecommendation, AnalyticsSink, ClientMetadata, DatabaseDirectory, DatabaseInfo, FeatureGate,
    NewRecommendation, Recommendation, RecommendationRepository, RecommendationsResponse, SessionMetadata,
    Strategy, StrategyResult, UpdateRecommendation,
};
use dbrec::{RecommendationError, Result};

fn injected(what: &str) -> RecommendationError {
    anyhow::anyhow!("injected {} failure", what).into()
}

pub fn ctx(database_id: &str) -> ClientMetadata {
    ClientMetadata::new(SessionMetadata::default(), database_id, None)
}

/// Repository double with failure injection and call recording
#[derive(Default)]
pub struct MemoryRepository {
    rows: Mutex<Vec<Recommendation>>,
    next_id: AtomicUsize,
    pub fail_create: AtomicBool,
    pub fail_exists: AtomicBool,
    pub fail_unread: AtomicBool,
    pub fail_delete_ids: Mutex<HashSet<String>>,
    pub list_dbs: Mutex<Vec<Option<u32>>>,
    pub unread_lookups: AtomicUsize,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> Vec<Recommendation> {
        self.rows.lock().unwrap().clone()
    }

    pub fn count(&self, database_id: &str, name: &str) -> usize {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.database_id == database_id && r.name == name)
            .count()
    }

    pub fn fail_delete(&self, id: &str) {
        self.fail_delete_ids.lock().unwrap().insert(id.to_string());
    }
}

#[async_trait]
impl RecommendationRepository for MemoryRepository {
    async fn create(&self, _session: &SessionMetadata, entity: NewRecommendation) -> Result<Recommendation> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(injected("create"));
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let recommendation = Recommendation {
            id: id.to_string(),
            database_id: entity.database_id,
            name: entity.name,
            read: false,
            vote: None,
            hide: None,
            params: entity.params,
            created_at: Utc::now(),
        };
        self.rows.lock().unwrap().push(recommendation.clone());
        Ok(recommendation)
    }

    async fn list(&self, ctx: &ClientMetadata) -> Result<RecommendationsResponse> {
        self.list_dbs.lock().unwrap().push(ctx.db);
        let recommendations: Vec<Recommendation> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|r| r.database_id == ctx.database_id)
            .cloned()
            .collect();
        let total_unread = recommendations.iter().filter(|r| !r.read).count() as u64;
        Ok(RecommendationsResponse {
            recommendations,
            total_unread,
        })
    }

    async fn read(&self, ctx: &ClientMetadata) -> Result<()> {
        for row in self.rows.lock().unwrap().iter_mut() {
            if row.database_id == ctx.database_id {
                row.read = true;
            }
        }
        Ok(())
    }

    async fn update(&self, ctx: &ClientMetadata, id: &str, patch: UpdateRecommendation) -> Result<Recommendation> {
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .iter_mut()
            .find(|r| r.id == id && r.database_id == ctx.database_id)
            .ok_or_else(|| RecommendationError::NotFound(id.to_string()))?;
        if patch.vote.is_some() {
            row.vote = patch.vote;
        }
        if patch.hide.is_some() {
            row.hide = patch.hide;
        }
        Ok(row.clone())
    }

    async fn is_exist(&self, ctx: &ClientMetadata, name: &str) -> Result<bool> {
        if self.fail_exists.load(Ordering::SeqCst) {
            return Err(injected("exists"));
        }
        Ok(self.count(&ctx.database_id, name) > 0)
    }

    async fn is_exist_multi(&self, ctx: &ClientMetadata, names: &[String]) -> Result<HashMap<String, bool>> {
        if self.fail_exists.load(Ordering::SeqCst) {
            return Err(injected("exists"));
        }
        Ok(names
            .iter()
            .map(|name| (name.clone(), self.count(&ctx.database_id, name) > 0))
            .collect())
    }

    async fn get(&self, _session: &SessionMetadata, id: &str) -> Result<Option<Recommendation>> {
        Ok(self.rows.lock().unwrap().iter().find(|r| r.id == id).cloned())
    }

    async fn sync(&self, ctx: &ClientMetadata, recommendations: &[AnalysisRecommendation]) -> Result<()> {
        for recommendation in recommendations {
            if !self.is_exist(ctx, &recommendation.name).await? {
                self.create(
                    &ctx.session,
                    NewRecommendation {
                        database_id: ctx.database_id.clone(),
                        name: recommendation.name.clone(),
                        params: recommendation.params.clone(),
                    },
                )
                .await?;
            }
        }
        Ok(())
    }

    async fn delete(&self, ctx: &ClientMetadata, id: &str) -> Result<()> {
        if self.fail_delete_ids.lock().unwrap().contains(id) {
            return Err(injected("delete"));
        }
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|r| !(r.id == id && r.database_id == ctx.database_id));
        if rows.len() == before {
            return Err(RecommendationError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn get_total_unread(&self, _session: &SessionMetadata, database_id: &str) -> Result<u64> {
        self.unread_lookups.fetch_add(1, Ordering::SeqCst);
        if self.fail_unread.load(Ordering::SeqCst) {
            return Err(injected("unread"));
        }
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.database_id == database_id && !r.read)
            .count() as u64)
    }
}

/// Strategy double returning a fixed outcome and counting calls
pub struct FixedStrategy {
    reached: bool,
    fail: bool,
    pub calls: AtomicUsize,
}

impl FixedStrategy {
    pub fn reached() -> Self {
        Self {
            reached: true,
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn not_reached() -> Self {
        Self {
            reached: false,
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            reached: false,
            fail: true,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Strategy for FixedStrategy {
    async fn evaluate(&self, _data: &Value) -> Result<StrategyResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(injected("strategy"));
        }
        Ok(if self.reached {
            StrategyResult::reached(None)
        } else {
            StrategyResult::not_reached()
        })
    }
}

/// Feature gate with one switch for every flag
pub struct SwitchGate(pub AtomicBool);

impl SwitchGate {
    pub fn on() -> Self {
        Self(AtomicBool::new(true))
    }

    pub fn off() -> Self {
        Self(AtomicBool::new(false))
    }
}

#[async_trait]
impl FeatureGate for SwitchGate {
    async fn is_feature_enabled(&self, _flag: &str) -> Result<bool> {
        Ok(self.0.load(Ordering::SeqCst))
    }
}

/// Directory double returning the same answer for every database
pub struct FixedDirectory {
    pub db: Option<u32>,
    pub provider: Option<String>,
    pub fail: bool,
}

impl FixedDirectory {
    pub fn with_db(db: Option<u32>) -> Self {
        Self {
            db,
            provider: Some("RE_CLOUD".to_string()),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            db: None,
            provider: None,
            fail: true,
        }
    }
}

#[async_trait]
impl DatabaseDirectory for FixedDirectory {
    async fn get(&self, ctx: &ClientMetadata) -> Result<DatabaseInfo> {
        if self.fail {
            return Err(RecommendationError::Directory(format!("{} unavailable", ctx.database_id)));
        }
        Ok(DatabaseInfo {
            id: ctx.database_id.clone(),
            db: self.db,
            provider: self.provider.clone(),
        })
    }
}

#[derive(Default)]
pub struct RecordingAnalytics {
    pub events: Mutex<Vec<(String, Value)>>,
    pub fail: AtomicBool,
    /// Never complete `emit`
    pub stall: AtomicBool,
}

impl RecordingAnalytics {
    pub fn events(&self) -> Vec<(String, Value)> {
        self.events.lock().unwrap().clone()
    }

    /// Events are emitted from a detached task; poll until `count` arrived
    pub async fn wait_for(&self, count: usize) -> Vec<(String, Value)> {
        for _ in 0..200 {
            let events = self.events();
            if events.len() >= count {
                return events;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        self.events()
    }
}

#[async_trait]
impl AnalyticsSink for RecordingAnalytics {
    async fn emit(&self, event: &str, payload: Value) -> Result<()> {
        if self.stall.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(RecommendationError::Analytics("sink offline".to_string()));
        }
        self.events.lock().unwrap().push((event.to_string(), payload));
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingChannel {
    pub published: Mutex<Vec<(String, RecommendationNotification)>>,
    pub fail: AtomicBool,
}

impl RecordingChannel {
    pub fn published(&self) -> Vec<(String, RecommendationNotification)> {
        self.published.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationChannel for RecordingChannel {
    async fn publish(&self, database_id: &str, notification: RecommendationNotification) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(RecommendationError::Notification("socket closed".to_string()));
        }
        self.published
            .lock()
            .unwrap()
            .push((database_id.to_string(), notification));
        Ok(())
    }
}
