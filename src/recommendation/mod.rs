// src/recommendation/mod.rs

//! Recommendation engine
//!
//! - Kinds and data model
//! - Strategies: one evaluation rule per kind, looked up through a registry
//! - Scanner: feature-gated, fail-closed dispatch of a single strategy
//! - Engine: dedup guard, batched live checks, analysis sync, deletion
//! - Ports: repository, feature gate, database directory, analytics

pub mod adapters;
pub mod engine;
pub mod kind;
pub mod ports;
pub mod scanner;
pub mod strategies;
pub mod types;

pub use self::adapters::{StaticDatabaseDirectory, StaticFeatureGate, TracingAnalytics};
pub use self::engine::{CheckResults, RECOMMENDATION_GENERATED_EVENT, RecommendationEngine};
pub use self::kind::RecommendationKind;
pub use self::ports::{AnalyticsSink, DatabaseDirectory, FeatureGate, RecommendationRepository};
pub use self::scanner::Scanner;
pub use self::strategies::{Strategy, StrategyRegistry, StrategyResult};
pub use self::types::*;
