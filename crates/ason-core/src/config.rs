//! Conversion limits.
//!
//! Hosts may keep these in a JSON settings file; every field is optional
//! and falls back to its default.

use serde::{Deserialize, Serialize};

use crate::engine::{DEFAULT_MAX_DEPTH, DEFAULT_NODE_LIMIT};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Maximum nesting of containers plus delegation hops during conversion,
    /// and of expressions read on the bridge's behalf.
    pub max_depth: usize,

    /// Node budget handed to the engine for every combine step.
    pub node_limit: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        BridgeConfig {
            max_depth: DEFAULT_MAX_DEPTH,
            node_limit: DEFAULT_NODE_LIMIT,
        }
    }
}

impl BridgeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a configuration from JSON, e.g. `{"max_depth": 64}`.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
