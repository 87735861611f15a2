// src/recommendation/strategies/values.rs
// Content-based rules evaluated against key values

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use super::{Strategy, StrategyResult, parse_input};
use crate::error::Result;
use crate::recommendation::kind::RecommendationKind;

/// Plain string that actually holds a JSON document
pub struct StringToJsonStrategy;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StringValue {
    value: String,
    key_name: String,
}

#[async_trait]
impl Strategy for StringToJsonStrategy {
    async fn evaluate(&self, data: &Value) -> Result<StrategyResult> {
        let input: StringValue = parse_input(RecommendationKind::StringToJson, data)?;
        let is_document = matches!(
            serde_json::from_str::<Value>(input.value.trim()),
            Ok(Value::Object(_) | Value::Array(_))
        );
        if is_document {
            return Ok(StrategyResult::reached_for_key(&input.key_name));
        }
        Ok(StrategyResult::not_reached())
    }
}

/// Sorted set whose scores are timestamps: a time series in disguise
pub struct RtsStrategy;

// Unix time between 2001 and 2286, in seconds or in milliseconds
const TIMESTAMP_SECONDS_MIN: f64 = 1_000_000_000.0;
const TIMESTAMP_SECONDS_MAX: f64 = 9_999_999_999.0;
const TIMESTAMP_MILLIS_MIN: f64 = 1_000_000_000_000.0;
const TIMESTAMP_MILLIS_MAX: f64 = 9_999_999_999_999.0;

#[derive(Debug, Deserialize)]
struct Member {
    score: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SortedSetMembers {
    members: Vec<Member>,
    key_name: String,
}

fn looks_like_timestamp(score: f64) -> bool {
    if score.fract() != 0.0 {
        return false;
    }
    (TIMESTAMP_SECONDS_MIN..=TIMESTAMP_SECONDS_MAX).contains(&score)
        || (TIMESTAMP_MILLIS_MIN..=TIMESTAMP_MILLIS_MAX).contains(&score)
}

#[async_trait]
impl Strategy for RtsStrategy {
    async fn evaluate(&self, data: &Value) -> Result<StrategyResult> {
        let input: SortedSetMembers = parse_input(RecommendationKind::Rts, data)?;
        if input.members.iter().any(|m| looks_like_timestamp(m.score)) {
            return Ok(StrategyResult::reached_for_key(&input.key_name));
        }
        Ok(StrategyResult::not_reached())
    }
}
