// src/recommendation/strategies/server.rs
// Server-level rules: logical database usage and script cache

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use super::{Strategy, StrategyResult, parse_input};
use crate::error::Result;
use crate::recommendation::kind::RecommendationKind;

pub const LUA_SCRIPT_CACHED: u64 = 10;

/// Switching away from logical database 0
pub struct AvoidLogicalDatabasesStrategy;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DbSwitch {
    db: u32,
    prev_db: u32,
}

#[async_trait]
impl Strategy for AvoidLogicalDatabasesStrategy {
    async fn evaluate(&self, data: &Value) -> Result<StrategyResult> {
        let switch: DbSwitch = parse_input(RecommendationKind::AvoidLogicalDatabases, data)?;
        Ok(StrategyResult {
            is_reached: switch.db != switch.prev_db && switch.db > 0,
            params: None,
        })
    }
}

/// Too many scripts held in the server's script cache
pub struct LuaScriptStrategy;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScriptCache {
    cached_scripts: u64,
}

#[async_trait]
impl Strategy for LuaScriptStrategy {
    async fn evaluate(&self, data: &Value) -> Result<StrategyResult> {
        let cache: ScriptCache = parse_input(RecommendationKind::LuaScript, data)?;
        Ok(StrategyResult {
            is_reached: cache.cached_scripts > LUA_SCRIPT_CACHED,
            params: None,
        })
    }
}
