// src/config/mod.rs
// Environment-based configuration for the recommendation engine

use std::str::FromStr;
use tracing::{debug, warn};

pub const DEFAULT_DATABASE_URL: &str = "sqlite:recommendations.db?mode=rwc";
pub const DEFAULT_FEATURE_FLAG: &str = "insightsRecommendations";

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    // ── Database Configuration
    pub database_url: String,
    pub sqlite_max_connections: u32,

    // ── Feature Gate
    pub feature_flag: String,
    pub recommendations_enabled: bool,

    // ── Notification Relay
    pub notify_capacity: usize,

    // ── Logging Configuration
    pub log_level: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            sqlite_max_connections: 5,
            feature_flag: DEFAULT_FEATURE_FLAG.to_string(),
            recommendations_enabled: true,
            notify_capacity: 100,
            log_level: "info".to_string(),
        }
    }
}

/// Parse `key` via `lookup`, falling back to `default` when missing or unparsable.
/// Trailing `# comments` and surrounding whitespace are ignored.
fn var_or<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(val) => {
            let clean_val = val.split('#').next().unwrap_or("").trim();
            match clean_val.parse::<T>() {
                Ok(parsed) => {
                    debug!(key, value = clean_val, "Config value from environment");
                    parsed
                }
                Err(_) => {
                    warn!(key, value = %val, "Config value failed to parse, using default");
                    default
                }
            }
        }
        None => default,
    }
}

impl EngineConfig {
    /// Load from `.env` (if present) and the process environment
    pub fn from_env() -> Self {
        if dotenvy::dotenv().is_err() {
            debug!(".env file not found, using environment variables and defaults");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let config = Self {
            database_url: var_or(&lookup, "DATABASE_URL", defaults.database_url),
            sqlite_max_connections: var_or(
                &lookup,
                "SQLITE_MAX_CONNECTIONS",
                defaults.sqlite_max_connections,
            ),
            feature_flag: var_or(&lookup, "RECOMMENDATIONS_FEATURE_FLAG", defaults.feature_flag),
            recommendations_enabled: var_or(
                &lookup,
                "RECOMMENDATIONS_ENABLED",
                defaults.recommendations_enabled,
            ),
            notify_capacity: var_or(
                &lookup,
                "RECOMMENDATIONS_NOTIFY_CAPACITY",
                defaults.notify_capacity,
            ),
            log_level: var_or(&lookup, "LOG_LEVEL", defaults.log_level),
        };

        // A zero-capacity mpsc channel panics on construction
        if config.notify_capacity == 0 {
            warn!("RECOMMENDATIONS_NOTIFY_CAPACITY must be positive, using 1");
            return Self {
                notify_capacity: 1,
                ..config
            };
        }
        config
    }

    /// Get a human-readable summary of the configuration
    pub fn summary(&self) -> String {
        format!(
            "Recommendations Config:\n\
            - Database: {} (max {} connections)\n\
            - Feature flag: {} ({})\n\
            - Notification queue: {}\n\
            - Log level: {}",
            self.database_url,
            self.sqlite_max_connections,
            self.feature_flag,
            if self.recommendations_enabled { "ON" } else { "OFF" },
            self.notify_capacity,
            self.log_level,
        )
    }
}
