// src/recommendation/scanner.rs
// Feature-gated dispatch of a single strategy

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error, warn};

use super::kind::RecommendationKind;
use super::ports::FeatureGate;
use super::strategies::StrategyRegistry;
use super::types::{ClientMetadata, RecommendationCandidate};
use crate::error::{RecommendationError, Result};

/// Runs one strategy behind the recommendations feature flag.
///
/// Purely computational: no persistence, no side effects. Any failure
/// (disabled gate lookup, unregistered kind, strategy error) means "not reached".
pub struct Scanner {
    registry: StrategyRegistry,
    feature_gate: Arc<dyn FeatureGate>,
    feature_flag: String,
}

impl Scanner {
    pub fn new(
        registry: StrategyRegistry,
        feature_gate: Arc<dyn FeatureGate>,
        feature_flag: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            feature_gate,
            feature_flag: feature_flag.into(),
        }
    }

    pub fn registry(&self) -> &StrategyRegistry {
        &self.registry
    }

    /// Evaluate `kind` against `data`; `None` unless the strategy is reached
    pub async fn evaluate(
        &self,
        ctx: &ClientMetadata,
        kind: RecommendationKind,
        data: &Value,
    ) -> Option<RecommendationCandidate> {
        match self.try_evaluate(kind, data).await {
            Ok(candidate) => candidate,
            Err(e @ RecommendationError::UnknownKind(_)) => {
                error!(database_id = %ctx.database_id, %kind, "Recommendation kind is not registered: {}", e);
                None
            }
            Err(e) => {
                warn!(database_id = %ctx.database_id, %kind, "Recommendation strategy failed: {}", e);
                None
            }
        }
    }

    /// Fallible form of [`Scanner::evaluate`]; `Ok(None)` when disabled or not reached
    pub async fn try_evaluate(
        &self,
        kind: RecommendationKind,
        data: &Value,
    ) -> Result<Option<RecommendationCandidate>> {
        if !self.feature_gate.is_feature_enabled(&self.feature_flag).await? {
            debug!(%kind, flag = %self.feature_flag, "Recommendations disabled, skipping strategy");
            return Ok(None);
        }

        let strategy = self.registry.get(kind)?;
        let result = strategy.evaluate(data).await?;

        if !result.is_reached {
            return Ok(None);
        }

        Ok(Some(RecommendationCandidate {
            kind,
            params: result.params,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recommendation::adapters::StaticFeatureGate;
    use crate::recommendation::strategies::{Strategy, StrategyResult};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const FLAG: &str = "insightsRecommendations";

    struct CountingStrategy {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Strategy for CountingStrategy {
        async fn evaluate(&self, _data: &Value) -> Result<StrategyResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(StrategyResult::reached(Some(json!({ "n": 1 }))))
        }
    }

    struct FailingStrategy;

    #[async_trait]
    impl Strategy for FailingStrategy {
        async fn evaluate(&self, _data: &Value) -> Result<StrategyResult> {
            Err(RecommendationError::strategy("bigSets", "boom"))
        }
    }

    fn ctx() -> ClientMetadata {
        ClientMetadata::new(Default::default(), "db-1", Some(0))
    }

    #[tokio::test]
    async fn test_disabled_gate_skips_strategy() {
        let calls = Arc::new(AtomicUsize::new(0));
        let registry = StrategyRegistry::new().with(
            RecommendationKind::BigSets,
            CountingStrategy { calls: calls.clone() },
        );
        let scanner = Scanner::new(registry, Arc::new(StaticFeatureGate::default()), FLAG);

        let result = scanner.evaluate(&ctx(), RecommendationKind::BigSets, &json!({})).await;
        assert!(result.is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_reached_strategy_yields_candidate() {
        let calls = Arc::new(AtomicUsize::new(0));
        let registry = StrategyRegistry::new().with(
            RecommendationKind::BigSets,
            CountingStrategy { calls: calls.clone() },
        );
        let scanner = Scanner::new(registry, Arc::new(StaticFeatureGate::new([FLAG])), FLAG);

        let candidate = scanner
            .evaluate(&ctx(), RecommendationKind::BigSets, &json!({}))
            .await
            .unwrap();
        assert_eq!(candidate.kind, RecommendationKind::BigSets);
        assert_eq!(candidate.params, Some(json!({ "n": 1 })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failing_strategy_is_not_reached() {
        let registry = StrategyRegistry::new().with(RecommendationKind::BigSets, FailingStrategy);
        let scanner = Scanner::new(registry, Arc::new(StaticFeatureGate::new([FLAG])), FLAG);

        assert!(scanner.evaluate(&ctx(), RecommendationKind::BigSets, &json!({})).await.is_none());
        assert!(scanner.try_evaluate(RecommendationKind::BigSets, &json!({})).await.is_err());
    }

    #[tokio::test]
    async fn test_unregistered_kind_is_not_reached() {
        let scanner = Scanner::new(StrategyRegistry::new(), Arc::new(StaticFeatureGate::new([FLAG])), FLAG);
        let result = scanner.try_evaluate(RecommendationKind::LuaScript, &json!({})).await;
        assert!(matches!(result, Err(RecommendationError::UnknownKind(_))));
        assert!(scanner.evaluate(&ctx(), RecommendationKind::LuaScript, &json!({})).await.is_none());
    }

    #[tokio::test]
    async fn test_malformed_data_for_bundled_strategy() {
        let scanner = Scanner::new(
            StrategyRegistry::with_defaults(),
            Arc::new(StaticFeatureGate::new([FLAG])),
            FLAG,
        );
        let result = scanner
            .evaluate(&ctx(), RecommendationKind::AvoidLogicalDatabases, &json!("not an object"))
            .await;
        assert!(result.is_none());
    }
}
