// src/recommendation/strategies/mod.rs
// Pluggable evaluation rules, one per recommendation kind

//! Each strategy inspects arbitrary JSON input and reports whether its
//! condition is reached. Strategies never persist anything; the scanner
//! wraps a reached result into a candidate.

mod keys;
mod server;
mod values;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::kind::RecommendationKind;
use crate::error::{RecommendationError, Result};

pub use keys::{
    BigHashesStrategy, BigSetsStrategy, BigStringsStrategy, CompressionForListStrategy,
    UseSmallerKeysStrategy,
};
pub use server::{AvoidLogicalDatabasesStrategy, LuaScriptStrategy};
pub use values::{RtsStrategy, StringToJsonStrategy};

/// Transient outcome of one evaluation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StrategyResult {
    pub is_reached: bool,
    pub params: Option<Value>,
}

impl StrategyResult {
    pub fn not_reached() -> Self {
        Self::default()
    }

    pub fn reached(params: Option<Value>) -> Self {
        Self {
            is_reached: true,
            params,
        }
    }

    /// Reached with `{ "keys": [key] }`, the shape used by per-key rules
    pub fn reached_for_key(key: &str) -> Self {
        Self::reached(Some(serde_json::json!({ "keys": [key] })))
    }
}

/// Evaluation logic for one recommendation kind
#[async_trait]
pub trait Strategy: Send + Sync {
    /// Inspect `data`. Malformed input is an error, never a positive result.
    async fn evaluate(&self, data: &Value) -> Result<StrategyResult>;
}

/// Decode strategy input into its typed shape
pub(crate) fn parse_input<T: DeserializeOwned>(kind: RecommendationKind, data: &Value) -> Result<T> {
    T::deserialize(data).map_err(|e| RecommendationError::strategy(kind.as_str(), e))
}

/// Lookup table from kind to strategy. Built once at startup.
#[derive(Clone, Default)]
pub struct StrategyRegistry {
    strategies: HashMap<RecommendationKind, Arc<dyn Strategy>>,
}

impl StrategyRegistry {
    /// Empty registry; every lookup fails until strategies are registered
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every bundled strategy
    pub fn with_defaults() -> Self {
        Self::new()
            .with(RecommendationKind::AvoidLogicalDatabases, AvoidLogicalDatabasesStrategy)
            .with(RecommendationKind::BigHashes, BigHashesStrategy)
            .with(RecommendationKind::BigSets, BigSetsStrategy)
            .with(RecommendationKind::BigStrings, BigStringsStrategy)
            .with(RecommendationKind::CompressionForList, CompressionForListStrategy)
            .with(RecommendationKind::UseSmallerKeys, UseSmallerKeysStrategy)
            .with(RecommendationKind::StringToJson, StringToJsonStrategy)
            .with(RecommendationKind::Rts, RtsStrategy)
            .with(RecommendationKind::LuaScript, LuaScriptStrategy)
    }

    /// Builder-style registration; replaces any previous strategy for `kind`
    pub fn with(mut self, kind: RecommendationKind, strategy: impl Strategy + 'static) -> Self {
        self.register(kind, Arc::new(strategy));
        self
    }

    pub fn register(&mut self, kind: RecommendationKind, strategy: Arc<dyn Strategy>) {
        self.strategies.insert(kind, strategy);
    }

    pub fn get(&self, kind: RecommendationKind) -> Result<Arc<dyn Strategy>> {
        self.strategies
            .get(&kind)
            .cloned()
            .ok_or_else(|| RecommendationError::UnknownKind(kind.as_str().to_string()))
    }

    pub fn contains(&self, kind: RecommendationKind) -> bool {
        self.strategies.contains_key(&kind)
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}
