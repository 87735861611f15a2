// src/recommendation/types.rs
// Data model shared by the engine, its ports and adapters

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::kind::RecommendationKind;

/// Who is asking. Only threaded through to ports and logs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionMetadata {
    pub user_id: String,
    pub session_id: String,
}

/// Addressing context of every engine operation: session, database and
/// logical database index (unresolved when `db` is `None`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientMetadata {
    pub session: SessionMetadata,
    pub database_id: String,
    pub db: Option<u32>,
}

impl ClientMetadata {
    pub fn new(session: SessionMetadata, database_id: impl Into<String>, db: Option<u32>) -> Self {
        Self {
            session,
            database_id: database_id.into(),
            db,
        }
    }

    /// Copy of this context with the logical index pinned
    pub fn with_db(&self, db: u32) -> Self {
        Self {
            db: Some(db),
            ..self.clone()
        }
    }
}

/// User feedback on a recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Vote {
    #[serde(rename = "very useful")]
    VeryUseful,
    #[serde(rename = "useful")]
    Useful,
    #[serde(rename = "not useful")]
    NotUseful,
}

impl Vote {
    pub fn as_str(&self) -> &'static str {
        match self {
            Vote::VeryUseful => "very useful",
            Vote::Useful => "useful",
            Vote::NotUseful => "not useful",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "very useful" => Some(Vote::VeryUseful),
            "useful" => Some(Vote::Useful),
            "not useful" => Some(Vote::NotUseful),
            _ => None,
        }
    }
}

/// Persisted finding: database `database_id` exhibits condition `name`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub id: String,
    pub database_id: String,
    pub name: String,
    pub read: bool,
    pub vote: Option<Vote>,
    pub hide: Option<bool>,
    pub params: Option<Value>,
    pub created_at: DateTime<Utc>,
}

/// Not-yet-persisted recommendation, as produced by a reached strategy
/// or handed to the engine directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRecommendation {
    pub database_id: String,
    pub name: String,
    pub params: Option<Value>,
}

/// Output of the scanner for a reached strategy
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationCandidate {
    pub kind: RecommendationKind,
    pub params: Option<Value>,
}

impl RecommendationCandidate {
    pub fn into_new(self, database_id: impl Into<String>) -> NewRecommendation {
        NewRecommendation {
            database_id: database_id.into(),
            name: self.kind.as_str().to_string(),
            params: self.params,
        }
    }
}

/// Recommendation discovered by a full database-analysis pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecommendation {
    pub name: String,
    #[serde(default)]
    pub params: Option<Value>,
}

/// Partial update of user feedback fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateRecommendation {
    pub vote: Option<Vote>,
    pub hide: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationsResponse {
    pub recommendations: Vec<Recommendation>,
    pub total_unread: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResult {
    pub affected: usize,
}

/// What the database directory knows about a configured database
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseInfo {
    pub id: String,
    pub db: Option<u32>,
    pub provider: Option<String>,
}
