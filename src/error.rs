// src/error.rs
// Error types for the recommendation engine

use thiserror::Error;

/// Main error type for the recommendation library
#[derive(Error, Debug)]
pub enum RecommendationError {
    #[error("recommendation not found: {0}")]
    NotFound(String),

    #[error("unknown recommendation kind: {0}")]
    UnknownKind(String),

    #[error("strategy {kind} failed: {reason}")]
    Strategy { kind: String, reason: String },

    #[error("database directory error: {0}")]
    Directory(String),

    #[error("feature gate error: {0}")]
    FeatureGate(String),

    #[error("analytics error: {0}")]
    Analytics(String),

    #[error("notification error: {0}")]
    Notification(String),

    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

/// Convenience type alias for Result using RecommendationError
pub type Result<T> = std::result::Result<T, RecommendationError>;

impl RecommendationError {
    /// Build a strategy failure for the given kind
    pub fn strategy(kind: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        RecommendationError::Strategy {
            kind: kind.into(),
            reason: reason.to_string(),
        }
    }

    /// True when the underlying storage rejected a write because of a unique index
    pub fn is_unique_violation(&self) -> bool {
        match self {
            RecommendationError::Db(sqlx::Error::Database(db_err)) => db_err.is_unique_violation(),
            _ => false,
        }
    }
}
