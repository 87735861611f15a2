// src/recommendation/strategies/keys.rs
// Size-based rules evaluated against key info and key counts

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use super::{Strategy, StrategyResult, parse_input};
use crate::error::Result;
use crate::recommendation::kind::RecommendationKind;

pub const BIG_HASHES_LENGTH: u64 = 5_000;
pub const BIG_SETS_LENGTH: u64 = 5_000;
pub const BIG_STRINGS_SIZE: u64 = 100_000;
pub const COMPRESSION_FOR_LIST_LENGTH: u64 = 1_000;
pub const USE_SMALLER_KEYS_TOTAL: u64 = 1_000_000;

/// Key info as returned by a key lookup
#[derive(Debug, Deserialize)]
struct KeyInfo {
    name: String,
    #[serde(rename = "type")]
    key_type: String,
    #[serde(default)]
    length: Option<u64>,
    #[serde(default)]
    size: Option<u64>,
}

impl KeyInfo {
    fn is(&self, key_type: &str) -> bool {
        self.key_type == key_type
    }
}

fn key_info(kind: RecommendationKind, data: &Value) -> Result<KeyInfo> {
    parse_input(kind, data)
}

/// Hash with too many fields
pub struct BigHashesStrategy;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HashFields {
    total: u64,
    key_name: String,
}

#[async_trait]
impl Strategy for BigHashesStrategy {
    async fn evaluate(&self, data: &Value) -> Result<StrategyResult> {
        let input: HashFields = parse_input(RecommendationKind::BigHashes, data)?;
        if input.total > BIG_HASHES_LENGTH {
            return Ok(StrategyResult::reached_for_key(&input.key_name));
        }
        Ok(StrategyResult::not_reached())
    }
}

/// Set with too many members
pub struct BigSetsStrategy;

#[async_trait]
impl Strategy for BigSetsStrategy {
    async fn evaluate(&self, data: &Value) -> Result<StrategyResult> {
        let info = key_info(RecommendationKind::BigSets, data)?;
        if info.is("set") && info.length.unwrap_or(0) > BIG_SETS_LENGTH {
            return Ok(StrategyResult::reached_for_key(&info.name));
        }
        Ok(StrategyResult::not_reached())
    }
}

/// String value larger than [`BIG_STRINGS_SIZE`] bytes
pub struct BigStringsStrategy;

#[async_trait]
impl Strategy for BigStringsStrategy {
    async fn evaluate(&self, data: &Value) -> Result<StrategyResult> {
        let info = key_info(RecommendationKind::BigStrings, data)?;
        if info.is("string") && info.size.unwrap_or(0) > BIG_STRINGS_SIZE {
            return Ok(StrategyResult::reached_for_key(&info.name));
        }
        Ok(StrategyResult::not_reached())
    }
}

/// Long list that would benefit from compression
pub struct CompressionForListStrategy;

#[async_trait]
impl Strategy for CompressionForListStrategy {
    async fn evaluate(&self, data: &Value) -> Result<StrategyResult> {
        let info = key_info(RecommendationKind::CompressionForList, data)?;
        if info.is("list") && info.length.unwrap_or(0) > COMPRESSION_FOR_LIST_LENGTH {
            return Ok(StrategyResult::reached_for_key(&info.name));
        }
        Ok(StrategyResult::not_reached())
    }
}

/// Database holding more keys than is healthy. Input is the bare key count.
pub struct UseSmallerKeysStrategy;

#[async_trait]
impl Strategy for UseSmallerKeysStrategy {
    async fn evaluate(&self, data: &Value) -> Result<StrategyResult> {
        let total: u64 = parse_input(RecommendationKind::UseSmallerKeys, data)?;
        Ok(StrategyResult {
            is_reached: total > USE_SMALLER_KEYS_TOTAL,
            params: None,
        })
    }
}
