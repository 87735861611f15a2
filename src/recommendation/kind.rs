// src/recommendation/kind.rs
// Closed set of recommendation kinds known to this engine

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

/// Identifier of one recommendation type.
///
/// The string form (camelCase, except `RTS`) is what gets persisted in the
/// `name` column and exchanged with analysis passes. Declaration order is the
/// priority order used when reconciling analysis results.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    AsRefStr,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum RecommendationKind {
    #[serde(rename = "RTS")]
    #[strum(serialize = "RTS")]
    Rts,
    StringToJson,
    AvoidLogicalDatabases,
    UseSmallerKeys,
    BigHashes,
    BigSets,
    BigStrings,
    CompressionForList,
    LuaScript,
}

impl RecommendationKind {
    /// Wire name, e.g. `bigHashes`
    pub fn as_str(&self) -> &str {
        self.as_ref()
    }

    /// Parse a persisted name; `None` for names this build does not know
    pub fn parse(name: &str) -> Option<Self> {
        name.parse().ok()
    }

    /// Position in the reconciliation order (lower first)
    pub fn priority(&self) -> usize {
        Self::iter().position(|k| k == *self).unwrap_or(usize::MAX)
    }

    /// Reconciliation rank of an arbitrary name; unknown names sort last
    pub fn priority_of(name: &str) -> usize {
        Self::parse(name).map_or(usize::MAX, |k| k.priority())
    }

    pub fn all() -> Vec<Self> {
        Self::iter().collect()
    }
}
